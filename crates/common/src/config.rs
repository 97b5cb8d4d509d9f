//! Configuration model
//!
//! Configuration is loaded from YAML. String values may reference
//! variables with `${NAME}` or `${NAME:-default}`; see [`Interpolator`].

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{info, trace, warn};

use crate::types::FrameKind;
use crate::Result;

/// Default regex used to extract locators from an element's textual form
pub const DEFAULT_LOCATOR_REGEX: &str = r"\s->\s([\w:\s\-.#]+)";

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\{(?P<name>[\w.]+)(:-(?P<default>[\w~.:/\\]+))?\}")
        .expect("placeholder pattern is valid")
});

/// Resolves `${NAME}` / `${NAME:-default}` placeholders.
///
/// Explicit variables win over environment variables. A placeholder with no
/// value and no default is left in place and reported at warn level.
#[derive(Debug, Clone, Default)]
pub struct Interpolator {
    vars: HashMap<String, String>,
}

impl Interpolator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_vars(vars: HashMap<String, String>) -> Self {
        Self { vars }
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }

    fn lookup(&self, name: &str) -> Option<String> {
        self.vars
            .get(name)
            .cloned()
            .or_else(|| std::env::var(name).ok())
    }

    /// Interpolate every placeholder in `value`. `key` only names the
    /// configuration entry in log lines.
    pub fn interpolate(&self, value: &str, key: &str) -> String {
        let interpolated = PLACEHOLDER.replace_all(value, |caps: &regex::Captures<'_>| {
            let placeholder = &caps[0];
            let name = &caps["name"];

            if let Some(resolved) = self.lookup(name) {
                trace!("Interpolated '{}' for key '{}'", placeholder, key);
                return resolved;
            }

            match caps.name("default") {
                Some(default) => {
                    trace!(
                        "No variable found to interpolate '{}' for key '{}'. Using default '{}'",
                        placeholder,
                        key,
                        default.as_str()
                    );
                    default.as_str().to_string()
                }
                None => {
                    warn!("No variable found to interpolate '{}' for key '{}'", placeholder, key);
                    placeholder.to_string()
                }
            }
        });

        interpolated.into_owned()
    }
}

/// Severity an intercepted call is reported with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Severity {
    Off,
    Trace,
    Debug,
    Info,
    Warn,
    /// Anything else found in configuration. Reported once per call as a
    /// configuration warning and never dispatched.
    Unrecognized(String),
}

impl From<String> for Severity {
    fn from(value: String) -> Self {
        match value.to_ascii_uppercase().as_str() {
            "OFF" => Severity::Off,
            "TRACE" => Severity::Trace,
            "DEBUG" => Severity::Debug,
            "INFO" => Severity::Info,
            "WARN" => Severity::Warn,
            _ => Severity::Unrecognized(value),
        }
    }
}

impl From<Severity> for String {
    fn from(value: Severity) -> Self {
        match value {
            Severity::Off => "OFF".to_string(),
            Severity::Trace => "TRACE".to_string(),
            Severity::Debug => "DEBUG".to_string(),
            Severity::Info => "INFO".to_string(),
            Severity::Warn => "WARN".to_string(),
            Severity::Unrecognized(raw) => raw,
        }
    }
}

impl Default for Severity {
    fn default() -> Self {
        Self::Off
    }
}

/// What an intercepted-call hook reports
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTemplate {
    /// Message with `{}` (sequential) or `{N}` (indexed) placeholders
    #[serde(default)]
    pub message: String,

    #[serde(default)]
    pub level: Severity,

    /// Milliseconds to wait before processing the hook
    #[serde(default)]
    pub wait: u64,
}

impl EventTemplate {
    pub fn new(message: impl Into<String>, level: Severity) -> Self {
        Self {
            message: message.into(),
            level,
            wait: 0,
        }
    }

    pub fn with_wait(mut self, wait: u64) -> Self {
        self.wait = wait;
        self
    }
}

/// Templates for intercepted-call hooks, keyed by hook name
/// (`beforeClick`, `afterAnyWebDriverCall`, `onError`, ...)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsConfig {
    #[serde(default = "default_locator_regex")]
    pub locator_regex: String,

    #[serde(flatten)]
    pub templates: BTreeMap<String, EventTemplate>,
}

fn default_locator_regex() -> String {
    DEFAULT_LOCATOR_REGEX.to_string()
}

impl Default for EventsConfig {
    fn default() -> Self {
        let templates = DEFAULT_TEMPLATES
            .iter()
            .map(|(hook, message, level)| {
                (
                    hook.to_string(),
                    EventTemplate::new(*message, Severity::from(level.to_string())),
                )
            })
            .collect();

        Self {
            locator_regex: default_locator_regex(),
            templates,
        }
    }
}

impl EventsConfig {
    /// Parse from YAML, interpolating every template message
    pub fn from_yaml(yaml: &str, interpolator: &Interpolator) -> Result<Self> {
        let mut config: EventsConfig = serde_yaml::from_str(yaml)?;
        for (hook, template) in config.templates.iter_mut() {
            template.message = interpolator.interpolate(&template.message, hook);
        }
        config.locator_regex = interpolator.interpolate(&config.locator_regex, "locatorRegex");
        Ok(config)
    }

    pub fn from_file(path: &Path, interpolator: &Interpolator) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_yaml(&content, interpolator)?;
        info!("Events configuration loaded from {}", path.display());
        Ok(config)
    }

    pub fn template(&self, hook: &str) -> Option<&EventTemplate> {
        self.templates.get(hook)
    }

    pub fn set(&mut self, hook: impl Into<String>, template: EventTemplate) {
        self.templates.insert(hook.into(), template);
    }
}

/// Video recording configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VideoConfig {
    /// Frame kinds to record. Empty disables the video.
    pub frames: Vec<FrameKind>,

    /// Output width; below 1 means "use the live window width"
    pub width: u32,

    /// Output height; below 1 means "use the live window height"
    pub height: u32,

    /// Height of browser chrome subtracted from the live window height
    pub menu_bars_height: u32,

    pub skip_duplicate_frames: bool,

    pub fps: u32,

    /// External encoder binary
    pub encoder: String,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            frames: Vec::new(),
            width: 0,
            height: 0,
            menu_bars_height: 60,
            skip_duplicate_frames: true,
            fps: 1,
            encoder: "ffmpeg".to_string(),
        }
    }
}

impl VideoConfig {
    pub fn from_yaml(yaml: &str, interpolator: &Interpolator) -> Result<Self> {
        let mut config: VideoConfig = serde_yaml::from_str(yaml)?;
        config.encoder = interpolator.interpolate(&config.encoder, "encoder");
        Ok(config)
    }

    pub fn is_disabled(&self) -> bool {
        self.frames.is_empty()
    }

    /// Whether a screenshot with this filename should be persisted
    pub fn should_record(&self, file_name: &str) -> bool {
        !self.is_disabled()
            && self
                .frames
                .iter()
                .any(|frame| file_name.starts_with(frame.as_str()))
    }
}

/// Built-in hook templates: (hook, message, level)
const DEFAULT_TEMPLATES: &[(&str, &str, &str)] = &[
    ("beforeAnyCall", "Calling {1} on {0} with {2}", "OFF"),
    ("afterAnyCall", "Called {1} on {0} with {2}, got {3}", "OFF"),
    ("onError", "Error calling {1} on {0} with {2}: {3}", "WARN"),
    ("beforeAnyWebDriverCall", "Calling {1} with {2}", "OFF"),
    ("afterAnyWebDriverCall", "Called {1} with {2}, got {3}", "OFF"),
    ("beforeGet", "Visiting {1}", "INFO"),
    ("afterGet", "Visited {1}", "DEBUG"),
    ("beforeGetCurrentUrl", "Getting current url", "TRACE"),
    ("afterGetCurrentUrl", "Current url is {1}", "TRACE"),
    ("beforeGetTitle", "Getting title", "TRACE"),
    ("afterGetTitle", "Title is {1}", "TRACE"),
    ("beforeFindElement", "Finding element {1}", "TRACE"),
    ("afterFindElement", "Element {1} found", "TRACE"),
    ("beforeFindElements", "Finding elements {1}", "TRACE"),
    ("afterFindElements", "Elements {1} found: {2}", "TRACE"),
    ("beforeGetPageSource", "Getting page source", "TRACE"),
    ("afterGetPageSource", "Page source retrieved", "TRACE"),
    ("beforeClose", "Closing window", "DEBUG"),
    ("afterClose", "Window closed", "TRACE"),
    ("beforeQuit", "Quitting driver", "DEBUG"),
    ("afterQuit", "Driver quit", "TRACE"),
    ("beforeGetWindowHandle", "Getting window handle", "TRACE"),
    ("afterGetWindowHandle", "Window handle is {1}", "TRACE"),
    ("beforeGetWindowHandles", "Getting window handles", "TRACE"),
    ("afterGetWindowHandles", "Window handles are {1}", "TRACE"),
    ("beforeExecuteScript", "Executing script {1}", "DEBUG"),
    ("afterExecuteScript", "Script {1} returned {2}", "TRACE"),
    ("beforeExecuteAsyncScript", "Executing async script {1}", "DEBUG"),
    ("afterExecuteAsyncScript", "Async script {1} returned {2}", "TRACE"),
    ("beforeGetWindowSize", "Getting window size", "TRACE"),
    ("afterGetWindowSize", "Window size is {1}", "TRACE"),
    ("beforeAnyNavigationCall", "Navigation {1} with {2}", "OFF"),
    ("afterAnyNavigationCall", "Navigation {1} with {2} done", "OFF"),
    ("beforeTo", "Navigating to {1}", "INFO"),
    ("afterTo", "Navigated to {1}", "DEBUG"),
    ("beforeBack", "Going back", "INFO"),
    ("afterBack", "Went back", "DEBUG"),
    ("beforeForward", "Going forward", "INFO"),
    ("afterForward", "Went forward", "DEBUG"),
    ("beforeRefresh", "Refreshing page", "INFO"),
    ("afterRefresh", "Page refreshed", "DEBUG"),
    ("beforeAnyAlertCall", "Alert {1}", "OFF"),
    ("afterAnyAlertCall", "Alert {1} done", "OFF"),
    ("beforeAccept", "Accepting alert", "INFO"),
    ("afterAccept", "Alert accepted", "DEBUG"),
    ("beforeDismiss", "Dismissing alert", "INFO"),
    ("afterDismiss", "Alert dismissed", "DEBUG"),
    ("beforeAnyOptionsCall", "Options {1} with {2}", "OFF"),
    ("afterAnyOptionsCall", "Options {1} with {2} done", "OFF"),
    ("beforeAddCookie", "Adding cookie {1}", "DEBUG"),
    ("afterAddCookie", "Cookie {1} added", "TRACE"),
    ("beforeDeleteCookieNamed", "Deleting cookie {1}", "DEBUG"),
    ("afterDeleteCookieNamed", "Cookie {1} deleted", "TRACE"),
    ("beforeDeleteAllCookies", "Deleting all cookies", "DEBUG"),
    ("afterDeleteAllCookies", "All cookies deleted", "TRACE"),
    ("beforeAnyWebElementCall", "Calling {1} on {0} with {2}", "OFF"),
    ("afterAnyWebElementCall", "Called {1} on {0} with {2}, got {3}", "OFF"),
    ("beforeClick", "Clicking on {0}", "INFO"),
    ("afterClick", "Clicked on {0}", "DEBUG"),
    ("beforeSubmit", "Submitting {0}", "INFO"),
    ("afterSubmit", "Submitted {0}", "DEBUG"),
    ("beforeSendKeys", "Sending keys {1} to {0}", "INFO"),
    ("afterSendKeys", "Sent keys {1} to {0}", "DEBUG"),
    ("beforeClear", "Clearing {0}", "INFO"),
    ("afterClear", "Cleared {0}", "DEBUG"),
    ("beforeGetTagName", "Getting tag name of {0}", "TRACE"),
    ("afterGetTagName", "Tag name of {0} is {1}", "TRACE"),
    ("beforeGetAttribute", "Getting attribute {1} of {0}", "TRACE"),
    ("afterGetAttribute", "Attribute {1} of {0} is {2}", "DEBUG"),
    ("beforeGetText", "Getting text of {0}", "TRACE"),
    ("afterGetText", "Text of {0} is {1}", "DEBUG"),
    ("beforeGetCssValue", "Getting css property {1} of {0}", "TRACE"),
    ("afterGetCssValue", "Css property {1} of {0} is {2}", "DEBUG"),
    ("beforeIsDisplayed", "Checking if {0} is displayed", "TRACE"),
    ("afterIsDisplayed", "Element {0} is displayed: {1}", "DEBUG"),
    ("beforeIsEnabled", "Checking if {0} is enabled", "TRACE"),
    ("afterIsEnabled", "Element {0} is enabled: {1}", "DEBUG"),
    ("beforeIsSelected", "Checking if {0} is selected", "TRACE"),
    ("afterIsSelected", "Element {0} is selected: {1}", "DEBUG"),
    ("beforeGetLocation", "Getting location of {0}", "TRACE"),
    ("afterGetLocation", "Location of {0} is {1}", "TRACE"),
    ("beforeGetSize", "Getting size of {0}", "TRACE"),
    ("afterGetSize", "Size of {0} is {1}", "TRACE"),
    ("beforeFindWebElement", "Finding element {1} inside {0}", "TRACE"),
    ("afterFindWebElement", "Element {1} found inside {0}", "TRACE"),
    ("beforeFindWebElements", "Finding elements {1} inside {0}", "TRACE"),
    ("afterFindWebElements", "Elements {1} found inside {0}: {2}", "TRACE"),
];
