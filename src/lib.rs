pub mod app;
pub mod config;
pub mod http;
pub mod model;
pub mod query;
pub mod services;
