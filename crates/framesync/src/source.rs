//! Frame sources: pull decoded grayscale frames one at a time.
//!
//! [`FfmpegFrameSource`] shells out to ffmpeg and reads raw 8-bit gray frames
//! from its stdout. [`MemoryFrameSource`] replays frames held in memory.

use crate::result::{SyncError, SyncResult};
use image::GrayImage;
use std::collections::VecDeque;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};

/// Produces frames in presentation order.
pub trait FrameSource {
    /// Next frame, or `Ok(None)` at end of stream.
    fn next_frame(&mut self) -> SyncResult<Option<GrayImage>>;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn next_frame(&mut self) -> SyncResult<Option<GrayImage>> {
        (**self).next_frame()
    }
}

/// Frames held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryFrameSource {
    frames: VecDeque<GrayImage>,
}

impl MemoryFrameSource {
    /// Create a source that yields `frames` in order
    #[must_use]
    pub fn new(frames: impl IntoIterator<Item = GrayImage>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }

    /// Frames not yet pulled
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl FrameSource for MemoryFrameSource {
    fn next_frame(&mut self) -> SyncResult<Option<GrayImage>> {
        Ok(self.frames.pop_front())
    }
}

/// Build ffprobe arguments for JSON stream metadata.
#[must_use]
pub fn build_ffprobe_args(video_path: &Path) -> Vec<String> {
    vec![
        "-v".to_string(),
        "quiet".to_string(),
        "-print_format".to_string(),
        "json".to_string(),
        "-show_streams".to_string(),
        video_path.to_string_lossy().to_string(),
    ]
}

/// Build ffmpeg arguments that decode `video_path` to raw gray frames on stdout.
#[must_use]
pub fn build_ffmpeg_args(video_path: &Path) -> Vec<String> {
    vec![
        "-v".to_string(),
        "error".to_string(),
        "-i".to_string(),
        video_path.to_string_lossy().to_string(),
        "-f".to_string(),
        "rawvideo".to_string(),
        "-pix_fmt".to_string(),
        "gray".to_string(),
        "pipe:1".to_string(),
    ]
}

/// Width and height of the first video stream.
///
/// # Errors
///
/// Returns `SyncError::Ffmpeg` if ffprobe is missing, fails, or reports no
/// usable video stream.
pub fn probe_dimensions(video_path: &Path) -> SyncResult<(u32, u32)> {
    let output = Command::new("ffprobe")
        .args(build_ffprobe_args(video_path))
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| SyncError::ffmpeg(format!("Failed to execute ffprobe: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(SyncError::ffmpeg(format!(
            "ffprobe exited with {}: {stderr}",
            output.status
        )));
    }

    parse_ffprobe_dimensions(&String::from_utf8_lossy(&output.stdout))
}

/// Extract the first video stream's dimensions from ffprobe JSON.
pub fn parse_ffprobe_dimensions(json: &str) -> SyncResult<(u32, u32)> {
    let parsed: serde_json::Value = serde_json::from_str(json)
        .map_err(|e| SyncError::ffmpeg(format!("Failed to parse ffprobe JSON: {e}")))?;

    let stream = parsed
        .get("streams")
        .and_then(|s| s.as_array())
        .ok_or_else(|| SyncError::ffmpeg("ffprobe output missing 'streams' array"))?
        .iter()
        .find(|s| s.get("codec_type").and_then(|t| t.as_str()) == Some("video"))
        .ok_or_else(|| SyncError::ffmpeg("No video stream found"))?;

    let dim = |key: &str| {
        stream
            .get(key)
            .and_then(serde_json::Value::as_u64)
            .and_then(|v| u32::try_from(v).ok())
            .filter(|&v| v > 0)
            .ok_or_else(|| SyncError::ffmpeg(format!("video stream has no usable {key}")))
    };
    Ok((dim("width")?, dim("height")?))
}

/// Decodes a video file through an ffmpeg child process.
///
/// The child is killed and reaped when the source is dropped.
#[derive(Debug)]
pub struct FfmpegFrameSource {
    path: PathBuf,
    width: u32,
    height: u32,
    child: Child,
    stdout: ChildStdout,
    frames_read: u64,
    finished: bool,
}

impl FfmpegFrameSource {
    /// Open `video_path`, probing its dimensions with ffprobe.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Ffmpeg` if probing or spawning fails.
    pub fn open(video_path: &Path) -> SyncResult<Self> {
        let (width, height) = probe_dimensions(video_path)?;
        Self::with_dimensions(video_path, width, height)
    }

    /// Open `video_path` with known frame dimensions.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Ffmpeg` if ffmpeg cannot be started.
    pub fn with_dimensions(video_path: &Path, width: u32, height: u32) -> SyncResult<Self> {
        if width == 0 || height == 0 {
            return Err(SyncError::configuration(format!(
                "frame size {width}x{height} is empty"
            )));
        }
        if !video_path.exists() {
            return Err(SyncError::ffmpeg(format!(
                "Video file not found: {}",
                video_path.display()
            )));
        }

        let mut child = Command::new("ffmpeg")
            .args(build_ffmpeg_args(video_path))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| SyncError::ffmpeg(format!("Failed to execute ffmpeg: {e}")))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| SyncError::ffmpeg("ffmpeg stdout was not captured"))?;

        tracing::debug!(
            path = %video_path.display(),
            width,
            height,
            "started ffmpeg decoder"
        );

        Ok(Self {
            path: video_path.to_path_buf(),
            width,
            height,
            child,
            stdout,
            frames_read: 0,
            finished: false,
        })
    }

    /// Frame width
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Frame height
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Frames decoded so far
    #[must_use]
    pub const fn frames_read(&self) -> u64 {
        self.frames_read
    }

    fn finish(&mut self) -> SyncResult<()> {
        self.finished = true;
        let status = self.child.wait()?;
        if !status.success() {
            return Err(SyncError::ffmpeg(format!(
                "ffmpeg exited with {status} while decoding {}",
                self.path.display()
            )));
        }
        Ok(())
    }
}

impl FrameSource for FfmpegFrameSource {
    fn next_frame(&mut self) -> SyncResult<Option<GrayImage>> {
        if self.finished {
            return Ok(None);
        }
        let frame_len = self.width as usize * self.height as usize;
        let mut buf = vec![0u8; frame_len];
        let filled = read_full(&mut self.stdout, &mut buf)?;

        if filled == 0 {
            self.finish()?;
            return Ok(None);
        }
        if filled < frame_len {
            self.finished = true;
            return Err(SyncError::ffmpeg(format!(
                "truncated frame {}: got {filled} of {frame_len} bytes",
                self.frames_read
            )));
        }

        self.frames_read += 1;
        GrayImage::from_raw(self.width, self.height, buf)
            .map(Some)
            .ok_or_else(|| SyncError::ffmpeg("frame buffer size mismatch"))
    }
}

impl Drop for FfmpegFrameSource {
    fn drop(&mut self) {
        if !self.finished {
            let _ = self.child.kill();
        }
        let _ = self.child.wait();
    }
}

/// Fill `buf` from `reader`, stopping early only at end of stream.
fn read_full(reader: &mut impl Read, buf: &mut [u8]) -> SyncResult<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_memory_source_order() {
        let frames = (0..3u8).map(|i| GrayImage::from_pixel(2, 2, Luma([i])));
        let mut source = MemoryFrameSource::new(frames);
        assert_eq!(source.remaining(), 3);
        for i in 0..3u8 {
            let frame = source.next_frame().unwrap().unwrap();
            assert_eq!(frame.get_pixel(0, 0).0[0], i);
        }
        assert!(source.next_frame().unwrap().is_none());
        assert!(source.next_frame().unwrap().is_none());
    }

    #[test]
    fn test_boxed_source() {
        let mut source: Box<dyn FrameSource> =
            Box::new(MemoryFrameSource::new([GrayImage::new(1, 1)]));
        assert!(source.next_frame().unwrap().is_some());
        assert!(source.next_frame().unwrap().is_none());
    }

    #[test]
    fn test_build_ffmpeg_args() {
        let args = build_ffmpeg_args(Path::new("/tmp/match.avi"));
        assert_eq!(
            args,
            [
                "-v",
                "error",
                "-i",
                "/tmp/match.avi",
                "-f",
                "rawvideo",
                "-pix_fmt",
                "gray",
                "pipe:1"
            ]
        );
    }

    #[test]
    fn test_build_ffprobe_args() {
        let args = build_ffprobe_args(Path::new("match.avi"));
        assert_eq!(args.len(), 6);
        assert_eq!(args[3], "json");
        assert_eq!(args[5], "match.avi");
    }

    #[test]
    fn test_parse_ffprobe_dimensions() {
        let json = r#"{"streams": [
            {"codec_type": "audio", "codec_name": "pcm_s16le"},
            {"codec_type": "video", "codec_name": "ffv1", "width": 643, "height": 528}
        ]}"#;
        assert_eq!(parse_ffprobe_dimensions(json).unwrap(), (643, 528));
    }

    #[test]
    fn test_parse_ffprobe_no_video() {
        let json = r#"{"streams": [{"codec_type": "audio"}]}"#;
        let err = parse_ffprobe_dimensions(json).unwrap_err();
        assert!(err.to_string().contains("No video stream"));
    }

    #[test]
    fn test_parse_ffprobe_zero_width() {
        let json = r#"{"streams": [{"codec_type": "video", "width": 0, "height": 10}]}"#;
        assert!(parse_ffprobe_dimensions(json).is_err());
    }

    #[test]
    fn test_parse_ffprobe_invalid_json() {
        assert!(parse_ffprobe_dimensions("not json").is_err());
        assert!(parse_ffprobe_dimensions("{}").is_err());
    }

    #[test]
    fn test_missing_video_file() {
        let err = FfmpegFrameSource::with_dimensions(Path::new("/nonexistent/match.avi"), 4, 4)
            .unwrap_err();
        assert!(matches!(err, SyncError::Ffmpeg { .. }));
    }

    #[test]
    fn test_empty_dimensions_rejected() {
        let err =
            FfmpegFrameSource::with_dimensions(Path::new("match.avi"), 0, 4).unwrap_err();
        assert!(matches!(err, SyncError::Configuration { .. }));
    }

    #[test]
    fn test_read_full_short_stream() {
        let mut data: &[u8] = &[1, 2, 3];
        let mut buf = [0u8; 5];
        assert_eq!(read_full(&mut data, &mut buf).unwrap(), 3);
        assert_eq!(&buf[..3], &[1, 2, 3]);
    }

    #[test]
    fn test_read_full_exact() {
        let mut data: &[u8] = &[9; 8];
        let mut buf = [0u8; 4];
        assert_eq!(read_full(&mut data, &mut buf).unwrap(), 4);
        assert_eq!(read_full(&mut data, &mut buf).unwrap(), 4);
        assert_eq!(read_full(&mut data, &mut buf).unwrap(), 0);
    }
}
