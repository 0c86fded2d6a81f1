pub mod config;
pub mod error;
pub mod inference;
pub mod routes;
pub mod service;
pub mod upload;
