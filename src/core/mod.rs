// src/core/mod.rs

pub mod models;
pub mod window;
pub mod classifier;
pub mod aggregator;
pub mod summary;
pub mod reporting;
pub mod file_system;
