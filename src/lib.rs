pub mod api;
pub mod cli;
pub mod config;
pub mod export;
pub mod utils;
