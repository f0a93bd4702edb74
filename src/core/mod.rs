pub mod client;
pub mod config;
pub mod raw;
pub mod shared;
pub mod transaction;
