//! FFmpeg filter definitions for the composition pipeline.

use vrender_models::AudioProfile;

/// Fade-in/fade-out length for the background track, in seconds.
pub const FADE_SECS: f64 = 3.0;

/// Fixed attenuation applied to the background track when mixed under
/// native audio.
pub const BACKGROUND_ATTENUATION: f64 = 0.15;

/// Audio fade filter for the background track.
///
/// Fade-in starts at 0; fade-out ends at `target_duration`, with its start
/// clamped to 0 so clips shorter than the fade length still get a valid
/// window.
pub fn background_fade_filter(target_duration: f64) -> String {
    let fade_out_start = (target_duration - FADE_SECS).max(0.0);
    format!(
        "afade=t=in:ss=0:d={fade},afade=t=out:st={start:.3}:d={fade}",
        fade = FADE_SECS,
        start = fade_out_start,
    )
}

/// Filter graph mixing native audio (full gain) with the attenuated
/// background track.
///
/// Output duration follows the first input (the merged video), applied
/// consistently on every mixing path.
pub fn native_mix_filter() -> String {
    format!(
        "[1:a]volume={vol}[bg];[0:a][bg]amix=inputs=2:duration=first[aout]",
        vol = BACKGROUND_ATTENUATION,
    )
}

/// Lavfi source generating silence in the canonical audio format.
///
/// Stands in for a narration track on clips that have none, so every
/// concat input carries the same stream layout.
pub fn silent_audio_source(profile: &AudioProfile) -> String {
    let layout = if profile.channels == 1 { "mono" } else { "stereo" };
    format!(
        "anullsrc=channel_layout={}:sample_rate={}",
        layout, profile.sample_rate,
    )
}
