//! Events and event filters
//!
//! An [`Event`] is what gets dispatched: its fields are literal values.
//! An [`EventFilter`] is what a consumer declares: its id and reason fields
//! are regular expressions matched against the whole literal value.

use std::collections::BTreeSet;
use std::fmt;

use lumen_common::{Interpolator, Outcome};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::context::ExecutionContext;

/// A dispatched occurrence. Lives only for the duration of a dispatch.
#[derive(Clone, Default)]
pub struct Event<'a> {
    pub primary_id: Option<String>,
    pub secondary_id: Option<String>,
    pub tags: Option<BTreeSet<String>>,
    pub reason: Option<String>,
    pub result: Option<Outcome>,
    pub context: Option<&'a dyn ExecutionContext>,
}

impl<'a> Event<'a> {
    pub fn builder() -> EventBuilder<'a> {
        EventBuilder::default()
    }
}

impl fmt::Debug for Event<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("primary_id", &self.primary_id)
            .field("secondary_id", &self.secondary_id)
            .field("tags", &self.tags)
            .field("reason", &self.reason)
            .field("result", &self.result)
            .field("context", &self.context.is_some())
            .finish()
    }
}

#[derive(Default)]
pub struct EventBuilder<'a> {
    event: Event<'a>,
}

impl<'a> EventBuilder<'a> {
    pub fn primary_id(mut self, id: impl Into<String>) -> Self {
        self.event.primary_id = Some(id.into());
        self
    }

    pub fn secondary_id(mut self, id: impl Into<String>) -> Self {
        self.event.secondary_id = Some(id.into());
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.event.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.event.reason = Some(reason.into());
        self
    }

    pub fn result(mut self, result: Outcome) -> Self {
        self.event.result = Some(result);
        self
    }

    pub fn context(mut self, context: &'a dyn ExecutionContext) -> Self {
        self.event.context = Some(context);
        self
    }

    pub fn build(self) -> Event<'a> {
        self.event
    }
}

/// A regular expression that must match a whole value
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    pub fn new(source: &str) -> lumen_common::Result<Self> {
        let regex = Regex::new(&format!("^(?:{})$", source)).map_err(|e| {
            lumen_common::Error::InvalidPattern {
                pattern: source.to_string(),
                source: e,
            }
        })?;

        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_full_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

impl TryFrom<String> for Pattern {
    type Error = lumen_common::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Pattern::new(&value)
    }
}

impl From<Pattern> for String {
    fn from(value: Pattern) -> Self {
        value.source
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pattern({:?})", self.source)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

/// What a consumer wants to receive
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventFilter {
    #[serde(default)]
    pub primary_id: Option<Pattern>,
    #[serde(default)]
    pub secondary_id: Option<Pattern>,
    #[serde(default)]
    pub tags: Option<BTreeSet<String>>,
    #[serde(default)]
    pub reason: Option<Pattern>,
    #[serde(default)]
    pub result: Option<Outcome>,
}

impl EventFilter {
    pub fn builder() -> EventFilterBuilder {
        EventFilterBuilder::default()
    }

    /// Parse a list of filters from YAML, resolving `${NAME}` placeholders first
    pub fn list_from_yaml(
        yaml: &str,
        interpolator: &Interpolator,
    ) -> lumen_common::Result<Vec<Self>> {
        let yaml = interpolator.interpolate(yaml, "filters");
        Ok(serde_yaml::from_str(&yaml)?)
    }
}

/// Collects raw patterns; they are compiled by [`EventFilterBuilder::build`]
#[derive(Debug, Default)]
pub struct EventFilterBuilder {
    primary_id: Option<String>,
    secondary_id: Option<String>,
    tags: Option<BTreeSet<String>>,
    reason: Option<String>,
    result: Option<Outcome>,
}

impl EventFilterBuilder {
    pub fn primary_id(mut self, pattern: impl Into<String>) -> Self {
        self.primary_id = Some(pattern.into());
        self
    }

    pub fn secondary_id(mut self, pattern: impl Into<String>) -> Self {
        self.secondary_id = Some(pattern.into());
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    pub fn reason(mut self, pattern: impl Into<String>) -> Self {
        self.reason = Some(pattern.into());
        self
    }

    pub fn result(mut self, result: Outcome) -> Self {
        self.result = Some(result);
        self
    }

    pub fn build(self) -> lumen_common::Result<EventFilter> {
        let compile = |raw: Option<String>| raw.as_deref().map(Pattern::new).transpose();

        Ok(EventFilter {
            primary_id: compile(self.primary_id)?,
            secondary_id: compile(self.secondary_id)?,
            tags: self.tags,
            reason: compile(self.reason)?,
            result: self.result,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_requires_full_match() {
        let pattern = Pattern::new("Test.*").unwrap();
        assert!(pattern.is_full_match("Test1"));
        assert!(!pattern.is_full_match("MyTest1"));

        let literal = Pattern::new("before").unwrap();
        assert!(literal.is_full_match("before"));
        assert!(!literal.is_full_match("beforeAll"));
    }

    #[test]
    fn test_pattern_alternation_is_anchored_as_a_whole() {
        let pattern = Pattern::new("before|after").unwrap();
        assert!(pattern.is_full_match("after"));
        assert!(!pattern.is_full_match("afterwards"));
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        assert!(matches!(
            Pattern::new("(unclosed"),
            Err(lumen_common::Error::InvalidPattern { .. })
        ));
        assert!(EventFilter::builder().reason("[").build().is_err());
    }

    #[test]
    fn test_filters_from_yaml() {
        let yaml = r#"
- reason: before
  tags: [suite]
- primaryId: "${LUMEN_TEST_CLASS:-Login}.*"
  result: FAILED
"#;
        let filters = EventFilter::list_from_yaml(yaml, &Interpolator::new()).unwrap();
        assert_eq!(filters.len(), 2);
        assert_eq!(filters[0].reason.as_ref().unwrap().as_str(), "before");
        assert!(filters[0].tags.as_ref().unwrap().contains("suite"));
        assert!(filters[0].primary_id.is_none());
        assert_eq!(filters[1].primary_id.as_ref().unwrap().as_str(), "Login.*");
        assert_eq!(filters[1].result, Some(Outcome::Failed));
        assert!(filters[1].tags.is_none());
    }

    #[test]
    fn test_event_builder() {
        let event = Event::builder()
            .primary_id("Class")
            .secondary_id("method")
            .reason("after")
            .tags(["test"])
            .result(Outcome::Successful)
            .build();

        assert_eq!(event.primary_id.as_deref(), Some("Class"));
        assert_eq!(event.secondary_id.as_deref(), Some("method"));
        assert!(event.context.is_none());
        assert!(format!("{:?}", event).contains("context: false"));
    }
}
