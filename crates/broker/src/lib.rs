pub mod config;
pub mod error;
pub mod http_api;
pub mod search;
