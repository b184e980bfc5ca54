//! Duration-matched background-track construction.

use std::path::Path;

use vrender_models::AudioProfile;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::MediaResult;
use crate::filters::background_fade_filter;

/// Build the command that loops the music source indefinitely, truncates it
/// at `target_duration`, and applies the fade-in/fade-out envelope.
pub fn background_track_command(
    music: impl AsRef<Path>,
    output: impl AsRef<Path>,
    target_duration: f64,
    profile: &AudioProfile,
) -> FfmpegCommand {
    FfmpegCommand::new(output)
        .input_with_args(["-stream_loop", "-1"], music)
        .duration(target_duration)
        .audio_filter(background_fade_filter(target_duration))
        .no_video()
        .output_args(profile.to_ffmpeg_args())
}

/// Produce a background track whose duration matches the merged video.
pub async fn build_background_track(
    runner: &FfmpegRunner,
    music: impl AsRef<Path>,
    output: impl AsRef<Path>,
    target_duration: f64,
    profile: &AudioProfile,
) -> MediaResult<()> {
    runner
        .run(&background_track_command(
            music,
            output,
            target_duration,
            profile,
        ))
        .await
}
