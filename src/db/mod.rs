pub mod connection;
pub mod poll_store;
pub mod user_store;
pub mod vote_store;
