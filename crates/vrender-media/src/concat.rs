//! Ordered clip concatenation via the concat demuxer.

use std::path::{Path, PathBuf};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::MediaResult;

/// Render the concat demuxer list file for an ordered clip sequence.
///
/// Entries appear in input order; single quotes inside a path are escaped
/// per the demuxer's quoting rules.
pub fn write_concat_list(clips: &[PathBuf]) -> String {
    clips
        .iter()
        .map(|p| {
            format!(
                "file '{}'\n",
                p.to_string_lossy().replace('\'', "'\\''")
            )
        })
        .collect()
}

/// Build the concat command. Inputs must already share the canonical
/// profile; streams are copied, never re-encoded.
pub fn concat_command(list_path: impl AsRef<Path>, output: impl AsRef<Path>) -> FfmpegCommand {
    FfmpegCommand::new(output)
        .input_with_args(["-f", "concat", "-safe", "0"], list_path)
        .output_args(["-c", "copy"])
}

/// Join the ordered clip sequence into one continuous video.
pub async fn concat_clips(
    runner: &FfmpegRunner,
    clips: &[PathBuf],
    list_path: impl AsRef<Path>,
    output: impl AsRef<Path>,
) -> MediaResult<()> {
    let list_path = list_path.as_ref();
    tokio::fs::write(list_path, write_concat_list(clips)).await?;
    runner.run(&concat_command(list_path, output)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_preserves_input_order() {
        let clips = vec![
            PathBuf::from("/work/clip_0.mp4"),
            PathBuf::from("/work/clip_1.mp4"),
            PathBuf::from("/work/clip_2.mp4"),
        ];
        let list = write_concat_list(&clips);
        let lines: Vec<&str> = list.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "file '/work/clip_0.mp4'");
        assert_eq!(lines[1], "file '/work/clip_1.mp4'");
        assert_eq!(lines[2], "file '/work/clip_2.mp4'");
    }

    #[test]
    fn test_list_escapes_single_quotes() {
        let clips = vec![PathBuf::from("/work/it's.mp4")];
        let list = write_concat_list(&clips);
        assert_eq!(list, "file '/work/it'\\''s.mp4'\n");
    }

    #[test]
    fn test_concat_command_stream_copies() {
        let cmd = concat_command("list.txt", "merged.mp4");
        let args = cmd.build_args();

        assert!(args.windows(2).any(|w| w == ["-f", "concat"]));
        assert!(args.windows(2).any(|w| w == ["-safe", "0"]));
        assert!(args.windows(2).any(|w| w == ["-c", "copy"]));
    }
}
