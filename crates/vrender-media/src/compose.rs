//! Per-scene audio/video merge.

use std::path::Path;

use vrender_models::AudioProfile;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::MediaResult;

/// Build the command merging one scene's normalized video with its
/// normalized narration audio.
///
/// The video stream is stream-copied (it is already canonical); the clip is
/// trimmed to the shorter of the two inputs.
pub fn merge_scene_command(
    video: impl AsRef<Path>,
    audio: impl AsRef<Path>,
    output: impl AsRef<Path>,
    profile: &AudioProfile,
) -> FfmpegCommand {
    FfmpegCommand::new(output)
        .input(video)
        .input(audio)
        .map("0:v:0")
        .map("1:a:0")
        .output_args(["-c:v", "copy"])
        .output_args(profile.to_ffmpeg_args())
        .shortest()
}

/// Merge one scene's video and audio into a single playable clip.
pub async fn merge_scene(
    runner: &FfmpegRunner,
    video: impl AsRef<Path>,
    audio: impl AsRef<Path>,
    output: impl AsRef<Path>,
    profile: &AudioProfile,
) -> MediaResult<()> {
    runner
        .run(&merge_scene_command(video, audio, output, profile))
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_maps_video_and_narration() {
        let cmd = merge_scene_command("v.mp4", "a.m4a", "clip.mp4", &AudioProfile::default());
        let args = cmd.build_args();

        assert!(args.windows(2).any(|w| w == ["-map", "0:v:0"]));
        assert!(args.windows(2).any(|w| w == ["-map", "1:a:0"]));
        assert!(args.windows(2).any(|w| w == ["-c:v", "copy"]));
        assert!(args.contains(&"-shortest".to_string()));
    }
}
