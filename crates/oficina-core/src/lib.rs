pub mod client;
pub mod config;
pub mod document;
pub mod error;
pub mod io;
pub mod order;
pub mod paths;
pub mod registry;
pub mod service;
pub mod shop;
pub mod store;

pub use error::{OficinaError, Result};
pub use shop::Shop;
