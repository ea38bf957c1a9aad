pub mod app;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod repository;
pub mod security;
pub mod services;

pub use app::AppServices;
pub use error::{AppError, Result};
