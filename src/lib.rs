pub mod auth;
pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod moderation;
pub mod repository;
pub mod service;
pub mod state;
pub mod store;
pub mod validation;

pub use db::create_pool;
