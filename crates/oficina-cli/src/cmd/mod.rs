pub mod client;
pub mod config;
pub mod init;
pub mod order;
pub mod service;
