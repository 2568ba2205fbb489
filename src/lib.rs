pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod services;
pub mod state;
pub mod store;
pub mod storefront;
pub mod utils;
