//! FFmpeg CLI wrapper for the render pipeline.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building with multi-input support
//! - A runner with per-invocation timeouts and output verification
//! - FFprobe inspection (duration, stream composition)
//! - Remote asset fetching into a local destination
//! - The composition operations: normalize, scene merge, concat,
//!   background-track build, final mix

#![deny(unreachable_patterns)]

pub mod audio_track;
pub mod command;
pub mod compose;
pub mod concat;
pub mod error;
pub mod fetch;
pub mod filters;
pub mod mix;
pub mod normalize;
pub mod probe;

pub use audio_track::build_background_track;
pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
pub use compose::merge_scene;
pub use concat::{concat_clips, write_concat_list};
pub use error::{MediaError, MediaResult};
pub use fetch::download_asset;
pub use filters::{
    background_fade_filter, native_mix_filter, silent_audio_source, BACKGROUND_ATTENUATION,
    FADE_SECS,
};
pub use mix::mix_with_background;
pub use normalize::{expand_still_image, normalize_audio, normalize_cover, normalize_video};
pub use probe::{probe_media, AudioPresence, MediaInfo};
