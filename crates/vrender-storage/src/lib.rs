//! Cloudflare R2 artifact publisher.
//!
//! This crate provides:
//! - Final artifact upload
//! - Public URL construction
//! - Connectivity checking for readiness probes

pub mod client;
pub mod error;

pub use client::{R2Client, R2Config};
pub use error::{StorageError, StorageResult};
