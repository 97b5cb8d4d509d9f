//! Frame recorder
//!
//! Persists screenshots into a test's screenshot folder when the recording
//! policy accepts them.

use std::path::{Path, PathBuf};

use lumen_common::{FrameKind, VideoConfig};
use tracing::{debug, trace};
use uuid::Uuid;

use crate::context::TestData;
use crate::driver::TakesScreenshot;
use crate::error::E2eResult;

/// Decides, from the candidate filename, whether a frame is persisted
pub trait RecordingPolicy {
    fn should_record(&self, file_name: &str) -> bool;
}

impl RecordingPolicy for VideoConfig {
    fn should_record(&self, file_name: &str) -> bool {
        VideoConfig::should_record(self, file_name)
    }
}

impl<F> RecordingPolicy for F
where
    F: Fn(&str) -> bool,
{
    fn should_record(&self, file_name: &str) -> bool {
        self(file_name)
    }
}

/// A persisted screenshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub kind: FrameKind,
    pub path: PathBuf,
}

pub struct FrameRecorder {
    screenshot_folder: PathBuf,
    policy: Box<dyn RecordingPolicy>,
}

impl FrameRecorder {
    pub fn new(screenshot_folder: impl Into<PathBuf>, policy: impl RecordingPolicy + 'static) -> Self {
        Self {
            screenshot_folder: screenshot_folder.into(),
            policy: Box::new(policy),
        }
    }

    /// Recorder writing into the test's folder, gated by the video configuration
    pub fn for_test(test: &TestData, video: &VideoConfig) -> Self {
        Self::new(test.screenshot_folder.clone(), video.clone())
    }

    pub fn screenshot_folder(&self) -> &Path {
        &self.screenshot_folder
    }

    /// Capture and persist a frame of the given kind.
    ///
    /// Returns `Ok(None)` when the policy declines it. Capture and write
    /// failures are returned to the caller.
    pub fn record(&self, kind: FrameKind, source: &dyn TakesScreenshot) -> E2eResult<Option<Frame>> {
        let file_name = kind.file_name(&Uuid::new_v4().to_string());

        if !self.policy.should_record(&file_name) {
            trace!("Not recording {} frame", kind);
            return Ok(None);
        }

        let png = source.screenshot_png()?;
        std::fs::create_dir_all(&self.screenshot_folder)?;

        let path = self.screenshot_folder.join(file_name);
        std::fs::write(&path, png)?;
        debug!("Saved {} frame to {}", kind, path.display());

        Ok(Some(Frame { kind, path }))
    }
}
