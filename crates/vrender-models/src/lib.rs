//! Shared data models for the vrender backend.
//!
//! This crate provides Serde-serializable types for:
//! - Render requests (wire shape + validated domain shape)
//! - Asset references
//! - The canonical encoding profile all assets are normalized into
//! - Request identifiers

pub mod profile;
pub mod request;
pub mod request_id;

// Re-export common types
pub use profile::{AudioProfile, CanonicalProfile, VideoProfile};
pub use request::{
    AssetRef, RenderInput, RenderRequest, RenderRequestBody, RequestValidationError, Scene,
    SceneInput,
};
pub use request_id::RequestId;
