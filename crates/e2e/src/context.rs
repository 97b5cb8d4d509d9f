//! Per-test execution context
//!
//! Every worker owns one driver session and builds one context per test.
//! The context travels explicitly: it is attached to the events a test fires
//! and handed to the components that need it. Nothing here is global.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use lumen_common::{Size, VideoConfig};
use uuid::Uuid;

use crate::driver::WindowSize;
use crate::error::{E2eError, E2eResult};
use crate::report::ReportSink;

/// Identity and artifact locations of one test
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestData {
    pub class_name: String,
    pub method_name: String,
    /// `<reportRoot>/screenshots/<className>/<methodName>`
    pub screenshot_folder: PathBuf,
    /// `<reportRoot>/videos/<className>/<methodName>/<uuid>.mp4`
    pub video_path: PathBuf,
}

impl TestData {
    pub fn new(report_root: &Path, class_name: &str, method_name: &str) -> Self {
        let screenshot_folder = report_root
            .join("screenshots")
            .join(class_name)
            .join(method_name);
        let video_path = report_root
            .join("videos")
            .join(class_name)
            .join(method_name)
            .join(format!("{}.mp4", Uuid::new_v4()));

        Self {
            class_name: class_name.to_string(),
            method_name: method_name.to_string(),
            screenshot_folder,
            video_path,
        }
    }

    /// Create the screenshot folder and the video's parent folder
    pub fn create_folders(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.screenshot_folder)?;
        if let Some(parent) = self.video_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

/// Opaque handle consumers receive through an event
pub trait ExecutionContext {
    fn test_data(&self) -> &TestData;

    fn video(&self) -> &VideoConfig;

    fn report(&self) -> &dyn ReportSink;

    /// Live size of the browser window
    fn window_size(&self) -> E2eResult<Size>;
}

/// The context of a test running on the current worker
pub struct TestContext<'a> {
    test: TestData,
    video: VideoConfig,
    report: Arc<dyn ReportSink>,
    window: Option<&'a dyn WindowSize>,
}

impl<'a> TestContext<'a> {
    pub fn new(test: TestData, video: VideoConfig, report: Arc<dyn ReportSink>) -> Self {
        Self {
            test,
            video,
            report,
            window: None,
        }
    }

    /// Attach the live window used for video sizing
    pub fn with_window(mut self, window: &'a dyn WindowSize) -> Self {
        self.window = Some(window);
        self
    }
}

impl ExecutionContext for TestContext<'_> {
    fn test_data(&self) -> &TestData {
        &self.test
    }

    fn video(&self) -> &VideoConfig {
        &self.video
    }

    fn report(&self) -> &dyn ReportSink {
        self.report.as_ref()
    }

    fn window_size(&self) -> E2eResult<Size> {
        match self.window {
            Some(window) => window.current_window_size(),
            None => Err(E2eError::Driver(format!(
                "no window attached to test {}.{}",
                self.test.class_name, self.test.method_name
            ))),
        }
    }
}
