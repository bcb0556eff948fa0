//! Core types and configuration for the condo explorer pipeline.
//!
//! This crate provides shared types used across all other crates:
//! - Listing, price tier and building summary types
//! - Filter criteria
//! - Configuration structures
//! - Common error types

pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use types::*;
