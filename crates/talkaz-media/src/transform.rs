//! Trim, mux and chroma-key composite transforms.
//!
//! Each transform is split into a pure command constructor (so the exact
//! FFmpeg arguments are unit-testable) and an async runner that executes it.
//! A failed transform never leaves its output file behind.

use std::path::Path;
use tracing::{info, warn};

use crate::command::{FfmpegCommand, ToolRunner};
use crate::config::EncodingConfig;
use crate::error::{MediaError, MediaResult};
use crate::geometry::OverlayGeometry;

/// Chroma-key parameters for FFmpeg's `chromakey` filter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChromaKey {
    pub color: &'static str,
    pub similarity: f32,
    pub blend: f32,
}

/// Pure green screen mandated by the stylization and video prompts.
///
/// Must stay in sync with the `#00FF00` background the prompt templates ask for.
pub const CHROMA_KEY: ChromaKey = ChromaKey {
    color: "0x00FF00",
    similarity: 0.3,
    blend: 0.1,
};

impl ChromaKey {
    pub fn filter(&self) -> String {
        format!("chromakey={}:{}:{}", self.color, self.similarity, self.blend)
    }
}

/// Cut `input` to `duration` seconds with stream copy on both tracks.
pub fn trim_command(input: &Path, duration: f64, output: &Path) -> FfmpegCommand {
    FfmpegCommand::new(output)
        .input(input)
        .duration(duration)
        .video_codec("copy")
        .audio_codec("copy")
}

/// Copy `video`'s picture and re-encode `audio` to AAC.
///
/// No `-shortest`: the caller trims the video to the audio length first, so
/// the container duration follows the audio.
pub fn mux_command(
    video: &Path,
    audio: &Path,
    output: &Path,
    encoding: &EncodingConfig,
) -> FfmpegCommand {
    FfmpegCommand::new(output)
        .input(video)
        .input(audio)
        .map("0:v:0")
        .map("1:a:0")
        .video_codec("copy")
        .audio_codec(encoding.audio_codec.clone())
        .audio_bitrate(encoding.audio_bitrate.clone())
}

/// Filter graph: scale the background to the canvas, key out and shrink the
/// foreground, overlay it at the computed position.
///
/// The overlay ends with the foreground (`shortest=1`). The looped background
/// never ends on its own, and a silent foreground gives `-shortest` no second
/// stream to stop on.
pub fn composite_filter(geometry: &OverlayGeometry, key: &ChromaKey) -> String {
    format!(
        "[1:v]scale={w}:{h}[bg];[0:v]{key},scale={fw}:{fh}[fg];[bg][fg]overlay={x}:{y}:shortest=1[out]",
        w = geometry.canvas_width,
        h = geometry.canvas_height,
        key = key.filter(),
        fw = geometry.fg_width,
        fh = geometry.fg_height,
        x = geometry.x,
        y = geometry.y,
    )
}

/// Composite a keyed `foreground` video over a looped still `background`.
pub fn composite_command(
    foreground: &Path,
    background: &Path,
    output: &Path,
    geometry: &OverlayGeometry,
    encoding: &EncodingConfig,
) -> FfmpegCommand {
    FfmpegCommand::new(output)
        .input(foreground)
        .looped_input(background)
        .filter_complex(composite_filter(geometry, &CHROMA_KEY))
        .map("[out]")
        .map("0:a?")
        .video_codec(encoding.codec.clone())
        .preset(encoding.preset.clone())
        .crf(encoding.crf)
        .output_args(["-pix_fmt", "yuv420p"])
        .audio_codec("copy")
        .shortest()
        .faststart()
}

/// Run a transform; on failure remove any partial output and return a
/// `Transcode` error carrying FFmpeg's stderr.
pub async fn run_transcode(
    runner: &ToolRunner,
    step: &str,
    cmd: &FfmpegCommand,
) -> MediaResult<()> {
    let output_path = cmd.output_path().to_path_buf();

    let result = match runner.output(&cmd.build_args()).await {
        Ok(output) if output.success() => {
            if output_path.exists() {
                Ok(())
            } else {
                Err(MediaError::transcode_failed(
                    format!("{} produced no output file", step),
                    output.stderr_text(),
                    output.exit_code(),
                ))
            }
        }
        Ok(output) => {
            let stderr = output.stderr_text();
            Err(MediaError::transcode_failed(
                format!(
                    "{} failed (exit code {:?}): {}",
                    step,
                    output.exit_code(),
                    stderr.as_deref().unwrap_or("no error output")
                ),
                stderr,
                output.exit_code(),
            ))
        }
        Err(e) => Err(e),
    };

    match &result {
        Ok(()) => info!(step, output = %output_path.display(), "Transform completed"),
        Err(e) => {
            warn!(step, error = %e, "Transform failed, removing partial output");
            if let Err(rm) = tokio::fs::remove_file(&output_path).await {
                if rm.kind() != std::io::ErrorKind::NotFound {
                    warn!(path = %output_path.display(), error = %rm, "Failed to remove partial output");
                }
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn joined(cmd: &FfmpegCommand) -> String {
        cmd.build_args().join(" ")
    }

    #[test]
    fn test_trim_is_stream_copy() {
        let cmd = trim_command(Path::new("v.mp4"), 7.0, Path::new("t.mp4"));
        let args = joined(&cmd);
        assert!(args.contains("-i v.mp4 -t 7.000000 -c:v copy -c:a copy t.mp4"));
    }

    #[test]
    fn test_trim_keeps_sub_millisecond_durations() {
        let cmd = trim_command(Path::new("v.mp4"), 0.0004, Path::new("t.mp4"));
        assert!(joined(&cmd).contains("-t 0.000400 "));
    }

    #[test]
    fn test_mux_copies_video_and_encodes_aac() {
        let cmd = mux_command(
            Path::new("t.mp4"),
            Path::new("a.mp3"),
            Path::new("m.mp4"),
            &EncodingConfig::default(),
        );
        let args = joined(&cmd);
        assert!(args.contains("-i t.mp4 -i a.mp3"));
        assert!(args.contains("-map 0:v:0 -map 1:a:0"));
        assert!(args.contains("-c:v copy -c:a aac"));
        assert!(!args.contains("-shortest"));
        assert!(args.ends_with("m.mp4"));
    }

    #[test]
    fn test_composite_filter_graph() {
        let g = OverlayGeometry::compute(1080, 1920, 0.6).unwrap();
        assert_eq!(
            composite_filter(&g, &CHROMA_KEY),
            "[1:v]scale=1080:1920[bg];[0:v]chromakey=0x00FF00:0.3:0.1,scale=648:1152[fg];[bg][fg]overlay=216:768:shortest=1[out]"
        );
    }

    #[test]
    fn test_composite_command_loops_background_and_copies_audio() {
        let g = OverlayGeometry::compute(720, 1280, 0.5).unwrap();
        let cmd = composite_command(
            Path::new("fg.mp4"),
            Path::new("bg.jpg"),
            Path::new("out.mp4"),
            &g,
            &EncodingConfig::default(),
        );
        let args = joined(&cmd);
        assert!(args.contains("-i fg.mp4 -loop 1 -i bg.jpg"));
        assert!(args.contains("-map [out] -map 0:a?"));
        assert!(args.contains("-c:a copy"));
        assert!(args.contains("-shortest"));
        assert!(args.contains("-c:v libx264"));
        assert!(args.contains("-pix_fmt yuv420p"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failed_transform_removes_partial_output() {
        let dir = tempfile::TempDir::new().unwrap();
        let output: PathBuf = dir.path().join("out.mp4");
        std::fs::write(&output, b"partial").unwrap();

        // `false` ignores its arguments and exits 1.
        let runner = ToolRunner::new("false");
        let cmd = trim_command(Path::new("in.mp4"), 1.0, &output);
        let err = run_transcode(&runner, "trim", &cmd).await.unwrap_err();

        assert!(matches!(err, MediaError::Transcode { exit_code: Some(1), .. }));
        assert!(err.to_string().contains("trim failed"));
        assert!(!output.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_success_without_output_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let output = dir.path().join("never.mp4");
        let runner = ToolRunner::new("true");
        let cmd = trim_command(Path::new("in.mp4"), 1.0, &output);
        let err = run_transcode(&runner, "trim", &cmd).await.unwrap_err();
        assert!(err.to_string().contains("no output file"));
    }
}
