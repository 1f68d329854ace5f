//! FFprobe duration and frame-size inspection.
//!
//! Both probes ask ffprobe for bare values (`noprint_wrappers=1:nokey=1`) and
//! parse its plain-text stdout.

use std::path::Path;
use tracing::debug;

use crate::command::ToolRunner;
use crate::error::{MediaError, MediaResult};

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

fn duration_args(path: &Path) -> Vec<String> {
    vec![
        "-v".to_string(),
        "error".to_string(),
        "-show_entries".to_string(),
        "format=duration".to_string(),
        "-of".to_string(),
        "default=noprint_wrappers=1:nokey=1".to_string(),
        path_arg(path),
    ]
}

fn size_args(path: &Path) -> Vec<String> {
    vec![
        "-v".to_string(),
        "error".to_string(),
        "-select_streams".to_string(),
        "v:0".to_string(),
        "-show_entries".to_string(),
        "stream=width,height".to_string(),
        "-of".to_string(),
        "default=noprint_wrappers=1:nokey=1".to_string(),
        path_arg(path),
    ]
}

/// Probe the container-level duration of a media file, in seconds.
pub async fn probe_duration(runner: &ToolRunner, path: impl AsRef<Path>) -> MediaResult<f64> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }

    let output = runner.output(&duration_args(path)).await?;
    if !output.success() {
        let stderr = output.stderr_text();
        return Err(MediaError::probe_failed(
            format!(
                "duration probe exited with {:?}: {}",
                output.exit_code(),
                stderr.as_deref().unwrap_or("no error output")
            ),
            stderr,
        ));
    }

    let duration = parse_duration(&output.stdout)?;
    debug!(path = %path.display(), duration, "Probed duration");
    Ok(duration)
}

/// Probe the first video stream's frame size as `(width, height)`.
pub async fn probe_video_size(
    runner: &ToolRunner,
    path: impl AsRef<Path>,
) -> MediaResult<(u32, u32)> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }

    let output = runner.output(&size_args(path)).await?;
    if !output.success() {
        let stderr = output.stderr_text();
        return Err(MediaError::probe_failed(
            format!(
                "size probe exited with {:?}: {}",
                output.exit_code(),
                stderr.as_deref().unwrap_or("no error output")
            ),
            stderr,
        ));
    }

    let size = parse_video_size(&output.stdout)?;
    debug!(path = %path.display(), width = size.0, height = size.1, "Probed video size");
    Ok(size)
}

/// Parse a duration line; must be a finite number greater than zero.
pub(crate) fn parse_duration(stdout: &str) -> MediaResult<f64> {
    let value = stdout.trim();
    let duration: f64 = value
        .parse()
        .map_err(|_| MediaError::probe_failed(format!("unparseable duration '{}'", value), None))?;

    if !duration.is_finite() || duration <= 0.0 {
        return Err(MediaError::probe_failed(
            format!("duration must be positive, got {}", duration),
            None,
        ));
    }

    Ok(duration)
}

/// Parse exactly two lines: width then height.
pub(crate) fn parse_video_size(stdout: &str) -> MediaResult<(u32, u32)> {
    let lines: Vec<&str> = stdout
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let [width, height] = lines.as_slice() else {
        return Err(MediaError::probe_failed(
            format!("expected width and height lines, got {:?}", lines),
            None,
        ));
    };

    let parse = |s: &str, what: &str| -> MediaResult<u32> {
        match s.parse::<u32>() {
            Ok(v) if v > 0 => Ok(v),
            _ => Err(MediaError::probe_failed(format!("invalid {} '{}'", what, s), None)),
        }
    };

    Ok((parse(width, "width")?, parse(height, "height")?))
}
