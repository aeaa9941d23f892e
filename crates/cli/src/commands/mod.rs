pub mod agile;
pub mod auth;
pub mod config;
pub mod search;
pub mod tickets;
