pub mod cli;
pub mod config;
pub mod domain;
pub mod errors;
pub mod fetcher;
pub mod services;
pub mod storage;
