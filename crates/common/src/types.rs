//! Core types for Lumen

use serde::{Deserialize, Serialize};

/// Reason attached to events fired before a lifecycle phase
pub const BEFORE: &str = "before";

/// Reason attached to events fired after a lifecycle phase
pub const AFTER: &str = "after";

/// Tag for whole-run (suite) lifecycle events
pub const SUITE: &str = "suite";

/// Tag for test-class lifecycle events
pub const CLASS: &str = "class";

/// Tag for single-test lifecycle events
pub const TEST: &str = "test";

/// Outcome of a test, a class or the whole run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    Successful,
    Failed,
    Aborted,
    Disabled,
}

impl Outcome {
    /// Report status this outcome is rendered with
    pub fn status(&self) -> Status {
        match self {
            Outcome::Successful => Status::Pass,
            Outcome::Failed => Status::Fail,
            Outcome::Aborted | Outcome::Disabled => Status::Skip,
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Successful => write!(f, "SUCCESSFUL"),
            Outcome::Failed => write!(f, "FAILED"),
            Outcome::Aborted => write!(f, "ABORTED"),
            Outcome::Disabled => write!(f, "DISABLED"),
        }
    }
}

/// Report status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Pass,
    Fail,
    Skip,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Pass => write!(f, "PASS"),
            Status::Fail => write!(f, "FAIL"),
            Status::Skip => write!(f, "SKIP"),
        }
    }
}

/// Capture phase a frame was taken in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FrameKind {
    AutoBefore,
    AutoAfter,
    Manual,
}

impl FrameKind {
    /// Value used as screenshot filename prefix and in configuration
    pub fn as_str(&self) -> &'static str {
        match self {
            FrameKind::AutoBefore => "autoBefore",
            FrameKind::AutoAfter => "autoAfter",
            FrameKind::Manual => "manual",
        }
    }

    /// Screenshot filename for this kind, suffixed with a unique id
    pub fn file_name(&self, id: &str) -> String {
        format!("{}-{}.png", self.as_str(), id)
    }
}

impl std::fmt::Display for FrameKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Width and height in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Position in pixels, relative to the top-left corner of the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
