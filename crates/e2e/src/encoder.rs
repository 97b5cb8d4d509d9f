//! Video encoding
//!
//! Frames are handed to an external encoder process as raw RGB on stdin.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use image::RgbImage;
use tracing::{debug, info, warn};

use crate::error::{E2eError, E2eResult};

/// Sequential frame sink producing one video file
pub trait VideoEncoder {
    fn encode_image(&mut self, frame: &RgbImage) -> E2eResult<()>;

    /// Flush and close the output
    fn finish(self: Box<Self>) -> E2eResult<()>;
}

/// Opens an encoder for one output file
pub trait EncoderFactory: Send + Sync {
    fn create(&self, output: &Path, fps: u32) -> E2eResult<Box<dyn VideoEncoder>>;
}

/// Spawns `ffmpeg` (or a compatible binary) per video
#[derive(Debug, Clone)]
pub struct FfmpegEncoderFactory {
    binary: String,
}

impl FfmpegEncoderFactory {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for FfmpegEncoderFactory {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl EncoderFactory for FfmpegEncoderFactory {
    fn create(&self, output: &Path, fps: u32) -> E2eResult<Box<dyn VideoEncoder>> {
        Ok(Box::new(FfmpegEncoder {
            binary: self.binary.clone(),
            output: output.to_path_buf(),
            fps: fps.max(1),
            process: None,
        }))
    }
}

struct Process {
    child: Child,
    stdin: ChildStdin,
    width: u32,
    height: u32,
}

/// H.264 mp4 encoder backed by an external process.
///
/// The process is started on the first frame, once the frame size is known.
/// All frames must share that size.
pub struct FfmpegEncoder {
    binary: String,
    output: PathBuf,
    fps: u32,
    process: Option<Process>,
}

impl FfmpegEncoder {
    fn spawn(&self, width: u32, height: u32) -> E2eResult<Process> {
        debug!(
            "Starting {} for {} ({}x{} @ {} fps)",
            self.binary,
            self.output.display(),
            width,
            height,
            self.fps
        );

        let mut child = Command::new(&self.binary)
            .args(["-y", "-loglevel", "error", "-f", "rawvideo", "-pixel_format", "rgb24"])
            .arg("-video_size")
            .arg(format!("{}x{}", width, height))
            .arg("-framerate")
            .arg(self.fps.to_string())
            .args(["-i", "-", "-c:v", "libx264", "-pix_fmt", "yuv420p"])
            .arg(&self.output)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| E2eError::Encoder(format!("failed to start {}: {}", self.binary, e)))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| E2eError::Encoder("encoder stdin unavailable".to_string()))?;

        Ok(Process {
            child,
            stdin,
            width,
            height,
        })
    }
}

impl VideoEncoder for FfmpegEncoder {
    fn encode_image(&mut self, frame: &RgbImage) -> E2eResult<()> {
        if self.process.is_none() {
            self.process = Some(self.spawn(frame.width(), frame.height())?);
        }

        let process = match self.process.as_mut() {
            Some(process) => process,
            None => return Err(E2eError::Encoder("encoder not started".to_string())),
        };

        if (frame.width(), frame.height()) != (process.width, process.height) {
            return Err(E2eError::Encoder(format!(
                "frame is {}x{}, video is {}x{}",
                frame.width(),
                frame.height(),
                process.width,
                process.height
            )));
        }

        process.stdin.write_all(frame.as_raw())?;
        Ok(())
    }

    fn finish(mut self: Box<Self>) -> E2eResult<()> {
        let Some(Process { child, stdin, .. }) = self.process.take() else {
            return Err(E2eError::Encoder(format!(
                "no frames written to {}",
                self.output.display()
            )));
        };

        // Closing stdin ends the input stream
        drop(stdin);
        let output = child.wait_with_output()?;

        if !output.status.success() {
            return Err(E2eError::Encoder(format!(
                "{} exited with {}: {}",
                self.binary,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        info!("Video saved to {}", self.output.display());
        Ok(())
    }
}

impl Drop for FfmpegEncoder {
    /// An encoder dropped before `finish` produced no usable video: stop the
    /// process and remove whatever it wrote.
    fn drop(&mut self) {
        let Some(mut process) = self.process.take() else {
            return;
        };

        if let Err(e) = process.child.kill() {
            debug!("Encoder process already gone: {}", e);
        }
        drop(process.stdin);
        if let Err(e) = process.child.wait() {
            warn!("Failed to reap {}: {}", self.binary, e);
        }

        match std::fs::remove_file(&self.output) {
            Ok(()) => debug!("Removed partial video {}", self.output.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove partial video {}: {}", self.output.display(), e),
        }
    }
}
