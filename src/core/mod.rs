// src/core/mod.rs
//! Configuration, storage and the inference client

pub mod config_manager;
pub mod database;
pub mod fs_ops;
pub mod ollama_client;

pub use config_manager::ConfigManager;
pub use database::{Database, JobRepository};
pub use fs_ops::FsOps;
pub use ollama_client::OllamaClient;
