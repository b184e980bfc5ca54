//! Per-asset normalization to the canonical profile.
//!
//! Scene videos are rewritten video-only: their audio always comes from the
//! narration track in the compose stage. Covers instead gain a silent
//! canonical audio track, so every concat input shares one stream layout
//! and the demuxer's stream-copy join cannot drop the narration streams.
//! Normalizing an already-canonical clip re-applies the same target
//! arguments, so the observable profile does not change.

use std::path::Path;

use vrender_models::profile::COVER_IMAGE_DURATION_SECS;
use vrender_models::{AudioProfile, VideoProfile};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::MediaResult;
use crate::filters::silent_audio_source;

/// Build the command rewriting a video into the canonical video profile.
pub fn normalize_video_command(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    profile: &VideoProfile,
) -> FfmpegCommand {
    FfmpegCommand::new(output)
        .input(input)
        .video_filter(profile.scale_pad_filter())
        .output_args(profile.to_ffmpeg_args())
        .no_audio()
}

/// Build the command rewriting an audio asset into the canonical audio profile.
pub fn normalize_audio_command(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    profile: &AudioProfile,
) -> FfmpegCommand {
    FfmpegCommand::new(output)
        .input(input)
        .no_video()
        .output_args(profile.to_ffmpeg_args())
}

/// Build the command rewriting a cover video into the canonical profile
/// with a silent canonical audio track in place of narration.
pub fn normalize_cover_command(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    video: &VideoProfile,
    audio: &AudioProfile,
) -> FfmpegCommand {
    FfmpegCommand::new(output)
        .input(input)
        .input_with_args(["-f", "lavfi"], silent_audio_source(audio))
        .map("0:v")
        .map("1:a")
        .video_filter(video.scale_pad_filter())
        .output_args(video.to_ffmpeg_args())
        .output_args(audio.to_ffmpeg_args())
        .shortest()
}

/// Build the command expanding a still image into a fixed-duration video
/// with a silent canonical audio track.
pub fn expand_still_image_command(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    video: &VideoProfile,
    audio: &AudioProfile,
) -> FfmpegCommand {
    FfmpegCommand::new(output)
        .input_with_args(["-loop", "1"], input)
        .input_with_args(["-f", "lavfi"], silent_audio_source(audio))
        .map("0:v")
        .map("1:a")
        .duration(COVER_IMAGE_DURATION_SECS)
        .video_filter(video.scale_pad_filter())
        .output_args(video.to_ffmpeg_args())
        .output_args(audio.to_ffmpeg_args())
}

/// Rewrite a fetched video into the canonical video profile, scaling to fit
/// and padding to preserve aspect ratio.
pub async fn normalize_video(
    runner: &FfmpegRunner,
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    profile: &VideoProfile,
) -> MediaResult<()> {
    runner
        .run(&normalize_video_command(input, output, profile))
        .await
}

/// Rewrite a fetched audio asset into the canonical sample rate, channel
/// count, and bitrate.
pub async fn normalize_audio(
    runner: &FfmpegRunner,
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    profile: &AudioProfile,
) -> MediaResult<()> {
    runner
        .run(&normalize_audio_command(input, output, profile))
        .await
}

/// Rewrite a cover clip into the canonical profile, silence standing in for
/// the narration track the scene clips carry.
pub async fn normalize_cover(
    runner: &FfmpegRunner,
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    video: &VideoProfile,
    audio: &AudioProfile,
) -> MediaResult<()> {
    runner
        .run(&normalize_cover_command(input, output, video, audio))
        .await
}

/// Expand a still-image cover into a fixed-duration canonical video.
pub async fn expand_still_image(
    runner: &FfmpegRunner,
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    video: &VideoProfile,
    audio: &AudioProfile,
) -> MediaResult<()> {
    runner
        .run(&expand_still_image_command(input, output, video, audio))
        .await
}
