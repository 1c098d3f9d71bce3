pub mod app;
pub mod clock;
pub mod config;
pub mod error;
pub mod events;
pub mod managers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod stores;
pub mod utils;
