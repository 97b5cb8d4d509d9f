//! Call interception hooks
//!
//! [`EventsListener`] turns intercepted calls into log lines, report entries
//! and frames, following the template configured for each hook.
//!
//! Hook order for one call:
//!
//! ```text
//! beforeAnyCall -> beforeAny<Group>Call -> before<Op> -> call
//!     -> after<Op> -> afterAny<Group>Call -> afterAnyCall
//!     (or onError when the call fails)
//! ```

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use lumen_common::{EventTemplate, EventsConfig, FrameKind, Severity};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::{debug, info, trace, warn, Level};

use crate::driver::TakesScreenshot;
use crate::error::{E2eError, E2eResult};
use crate::operation::{Arg, Call, AFTER_ANY_CALL, BEFORE_ANY_CALL, ON_ERROR};
use crate::recorder::{Frame, FrameRecorder};
use crate::report::ReportSink;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{(\d*)\}").expect("placeholder pattern is valid"));

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<.*?>").expect("tag pattern is valid"));

/// The two renderings of one hook message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    /// Markup-free, for the log
    pub plain: String,
    /// Arguments wrapped in `<code>`, for the report
    pub annotated: String,
}

pub struct EventsListener {
    config: EventsConfig,
    locator: Regex,
    report: Arc<dyn ReportSink>,
    recorder: FrameRecorder,
}

impl EventsListener {
    pub fn new(
        config: EventsConfig,
        report: Arc<dyn ReportSink>,
        recorder: FrameRecorder,
    ) -> lumen_common::Result<Self> {
        let locator =
            Regex::new(&config.locator_regex).map_err(|e| lumen_common::Error::InvalidPattern {
                pattern: config.locator_regex.clone(),
                source: e,
            })?;

        Ok(Self {
            config,
            locator,
            report,
            recorder,
        })
    }

    /// Run `delegate` surrounded by the hooks of `call`.
    ///
    /// Hook failures are logged and never change the delegate's result.
    pub fn intercept<T>(
        &self,
        call: &Call,
        source: &dyn TakesScreenshot,
        delegate: impl FnOnce() -> E2eResult<T>,
        result: impl FnOnce(&T) -> Option<Arg>,
    ) -> E2eResult<T> {
        if let Err(e) = self.before(call, source) {
            warn!("Before hooks of {} failed: {}", call.operation, e);
        }

        match delegate() {
            Ok(value) => {
                if let Err(e) = self.after(call, result(&value), source) {
                    warn!("After hooks of {} failed: {}", call.operation, e);
                }
                Ok(value)
            }
            Err(err) => {
                if let Err(e) = self.on_error(call, &err, source) {
                    warn!("Error hook of {} failed: {}", call.operation, e);
                }
                Err(err)
            }
        }
    }

    /// Run every before hook. All hooks run; the first failure is returned.
    pub fn before(&self, call: &Call, source: &dyn TakesScreenshot) -> E2eResult<()> {
        let generic = call.generic_args();
        let group = call.operation.group();

        first_failure([
            self.on_hook(BEFORE_ANY_CALL, &generic, FrameKind::AutoBefore, source),
            self.on_hook(&group.before_hook(), &generic, FrameKind::AutoBefore, source),
            self.on_hook(
                &call.operation.before_hook(),
                &call.specific_args(),
                FrameKind::AutoBefore,
                source,
            ),
        ])
    }

    /// Run every after hook, appending `result` to the arguments when present
    pub fn after(&self, call: &Call, result: Option<Arg>, source: &dyn TakesScreenshot) -> E2eResult<()> {
        let mut generic = call.generic_args();
        let mut specific = call.specific_args();
        if let Some(result) = result {
            generic.push(result.clone());
            specific.push(result);
        }
        let group = call.operation.group();

        first_failure([
            self.on_hook(&call.operation.after_hook(), &specific, FrameKind::AutoAfter, source),
            self.on_hook(&group.after_hook(), &generic, FrameKind::AutoAfter, source),
            self.on_hook(AFTER_ANY_CALL, &generic, FrameKind::AutoAfter, source),
        ])
    }

    pub fn on_error(&self, call: &Call, error: &E2eError, source: &dyn TakesScreenshot) -> E2eResult<()> {
        let mut args = call.generic_args();
        args.push(Arg::value(error));
        self.on_hook(ON_ERROR, &args, FrameKind::AutoAfter, source)
    }

    /// Record a frame outside of any hook
    pub fn record_manual(&self, source: &dyn TakesScreenshot) -> E2eResult<Option<Frame>> {
        self.recorder.record(FrameKind::Manual, source)
    }

    fn on_hook(
        &self,
        hook: &str,
        args: &[Arg],
        kind: FrameKind,
        source: &dyn TakesScreenshot,
    ) -> E2eResult<()> {
        let Some(template) = self.config.template(hook) else {
            return Ok(());
        };

        self.process(hook, template, args, kind, source)
    }

    fn process(
        &self,
        hook: &str,
        template: &EventTemplate,
        args: &[Arg],
        kind: FrameKind,
        source: &dyn TakesScreenshot,
    ) -> E2eResult<()> {
        if template.wait > 0 {
            trace!("Waiting {} ms before {}", template.wait, hook);
            thread::sleep(Duration::from_millis(template.wait));
        }

        let level = match &template.level {
            Severity::Off => return Ok(()),
            Severity::Unrecognized(raw) => {
                warn!("Invalid level '{}' configured for hook {}, not logging", raw, hook);
                return Ok(());
            }
            level => level,
        };

        if !is_enabled(level) {
            return Ok(());
        }

        let rendered = self.render(&template.message, args);
        let frame = self.recorder.record(kind, source);

        match level {
            Severity::Trace => trace!("{}", rendered.plain),
            Severity::Debug => debug!("{}", rendered.plain),
            Severity::Info => info!("{}", rendered.plain),
            _ => warn!("{}", rendered.plain),
        }

        match level {
            Severity::Warn => self.report.warning(&rendered.annotated),
            _ => self.report.info(&rendered.annotated),
        }

        frame.map(|_| ())
    }

    /// Substitute `args` into `message`.
    ///
    /// `{}` takes the next argument, `{N}` the argument at index `N`.
    /// A placeholder without a matching argument is kept as is.
    pub fn render(&self, message: &str, args: &[Arg]) -> Rendered {
        let rendered: Vec<String> = args.iter().map(|arg| self.render_arg(arg)).collect();

        let substitute = |annotate: bool| {
            let mut next = 0;
            PLACEHOLDER
                .replace_all(message, |caps: &Captures<'_>| {
                    let index = match caps[1].parse::<usize>() {
                        Ok(index) => index,
                        Err(_) => {
                            next += 1;
                            next - 1
                        }
                    };

                    match rendered.get(index) {
                        Some(value) if annotate => format!("<code>{}</code>", value),
                        Some(value) => value.clone(),
                        None => {
                            if annotate {
                                warn!("No argument at index {} for message '{}'", index, message);
                            }
                            caps[0].to_string()
                        }
                    }
                })
                .into_owned()
        };

        Rendered {
            plain: TAG.replace_all(&substitute(false), "").into_owned(),
            annotated: substitute(true),
        }
    }

    fn render_arg(&self, arg: &Arg) -> String {
        match arg {
            Arg::Value(value) => value.clone(),
            Arg::Element(repr) => self.locator_chain(repr),
            Arg::List(items) => format!(
                "[{}]",
                items
                    .iter()
                    .map(|item| self.render_arg(item))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        }
    }

    /// Locators captured from an element's textual form, joined with ` -> `.
    /// Falls back to the raw text when nothing is captured.
    pub fn locator_chain(&self, repr: &str) -> String {
        let locators: Vec<&str> = self
            .locator
            .captures_iter(repr)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str())
            .collect();

        if locators.is_empty() {
            repr.to_string()
        } else {
            locators.join(" -> ")
        }
    }
}

fn is_enabled(level: &Severity) -> bool {
    match level {
        Severity::Trace => tracing::enabled!(Level::TRACE),
        Severity::Debug => tracing::enabled!(Level::DEBUG),
        Severity::Info => tracing::enabled!(Level::INFO),
        Severity::Warn => tracing::enabled!(Level::WARN),
        Severity::Off | Severity::Unrecognized(_) => false,
    }
}

fn first_failure<const N: usize>(results: [E2eResult<()>; N]) -> E2eResult<()> {
    results.into_iter().collect::<E2eResult<Vec<()>>>().map(|_| ())
}
