//! Final audio mix: merged video plus background track.

use std::path::Path;

use vrender_models::AudioProfile;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::MediaResult;
use crate::filters::native_mix_filter;
use crate::probe::AudioPresence;

/// Build the mix command for the resolved audio-presence state.
///
/// - [`AudioPresence::WithNativeAudio`]: native audio at full gain mixed
///   with the attenuated background track; duration follows the first
///   input (the merged video).
/// - [`AudioPresence::SilentVideo`]: the background track is mapped
///   directly onto the picture stream, no mixing filter; duration is the
///   shorter of the two inputs.
///
/// The video stream is copied unaltered in both cases.
pub fn mix_command(
    merged_video: impl AsRef<Path>,
    background_track: impl AsRef<Path>,
    output: impl AsRef<Path>,
    presence: AudioPresence,
    profile: &AudioProfile,
) -> FfmpegCommand {
    let base = FfmpegCommand::new(output)
        .input(merged_video)
        .input(background_track);

    match presence {
        AudioPresence::WithNativeAudio => base
            .filter_complex(native_mix_filter())
            .map("0:v")
            .map("[aout]")
            .output_args(["-c:v", "copy"])
            .output_args(profile.to_ffmpeg_args()),
        AudioPresence::SilentVideo => base
            .map("0:v")
            .map("1:a")
            .output_args(["-c:v", "copy"])
            .output_args(profile.to_ffmpeg_args())
            .shortest(),
    }
}

/// Combine the merged video with the background track.
pub async fn mix_with_background(
    runner: &FfmpegRunner,
    merged_video: impl AsRef<Path>,
    background_track: impl AsRef<Path>,
    output: impl AsRef<Path>,
    presence: AudioPresence,
    profile: &AudioProfile,
) -> MediaResult<()> {
    runner
        .run(&mix_command(
            merged_video,
            background_track,
            output,
            presence,
            profile,
        ))
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_audio_path_mixes_both_sources() {
        let cmd = mix_command(
            "merged.mp4",
            "bg.m4a",
            "final.mp4",
            AudioPresence::WithNativeAudio,
            &AudioProfile::default(),
        );
        let args = cmd.build_args();

        let fc_pos = args.iter().position(|a| a == "-filter_complex").unwrap();
        assert!(args[fc_pos + 1].contains("volume=0.15"));
        assert!(args[fc_pos + 1].contains("amix=inputs=2:duration=first"));
        assert!(args.windows(2).any(|w| w == ["-map", "0:v"]));
        assert!(args.windows(2).any(|w| w == ["-map", "[aout]"]));
        assert!(args.windows(2).any(|w| w == ["-c:v", "copy"]));
    }

    #[test]
    fn test_silent_video_path_maps_track_directly() {
        let cmd = mix_command(
            "merged.mp4",
            "bg.m4a",
            "final.mp4",
            AudioPresence::SilentVideo,
            &AudioProfile::default(),
        );
        let args = cmd.build_args();

        assert!(!args.contains(&"-filter_complex".to_string()));
        assert!(args.windows(2).any(|w| w == ["-map", "0:v"]));
        assert!(args.windows(2).any(|w| w == ["-map", "1:a"]));
        assert!(args.contains(&"-shortest".to_string()));
        assert!(args.windows(2).any(|w| w == ["-c:v", "copy"]));
    }
}
