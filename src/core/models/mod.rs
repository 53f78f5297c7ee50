// src/core/models/mod.rs

pub mod common;
pub mod tender;
pub mod bid;

pub use common::*;
pub use tender::*;
pub use bid::*;
