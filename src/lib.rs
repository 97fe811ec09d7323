pub mod card;
pub mod cli;
pub mod config;
pub mod error;
pub mod server;
pub mod solvedac;
pub mod storage;
pub mod utils;
