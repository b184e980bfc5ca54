//! Render pipeline controller.
//!
//! Sequences the composition stages (fetch, normalize, compose, concat,
//! background track, mix, publish), enforces the failure-abort policy, and
//! owns the per-request workspace lifecycle.

pub mod config;
pub mod controller;
pub mod error;
pub mod plan;
pub mod workspace;

pub use config::PipelineConfig;
pub use controller::{PipelineStage, RenderPipeline};
pub use error::{PipelineError, PipelineResult, TranscodeStage};
pub use plan::{AssetJob, AssetKind};
pub use workspace::Workspace;
