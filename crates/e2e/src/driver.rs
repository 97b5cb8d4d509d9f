//! Browser driver capability surface
//!
//! These traits describe what the pipeline needs from a browser session.
//! Concrete drivers live outside this crate; [`crate::monitored`] wraps
//! any implementation to intercept its calls.

use std::fmt;

use lumen_common::{Point, Size};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::E2eResult;

/// Element locator strategy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum By {
    Id(String),
    Name(String),
    ClassName(String),
    TagName(String),
    CssSelector(String),
    XPath(String),
    LinkText(String),
}

impl fmt::Display for By {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            By::Id(v) => write!(f, "id: {}", v),
            By::Name(v) => write!(f, "name: {}", v),
            By::ClassName(v) => write!(f, "class name: {}", v),
            By::TagName(v) => write!(f, "tag name: {}", v),
            By::CssSelector(v) => write!(f, "css selector: {}", v),
            By::XPath(v) => write!(f, "xpath: {}", v),
            By::LinkText(v) => write!(f, "link text: {}", v),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    pub name: String,
    pub value: String,
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

/// Source of PNG screenshots
pub trait TakesScreenshot {
    fn screenshot_png(&self) -> E2eResult<Vec<u8>>;
}

/// Live window size query
pub trait WindowSize {
    fn current_window_size(&self) -> E2eResult<Size>;
}

/// A located page element.
///
/// The `Display` form is expected to nest the locators that produced the
/// element, e.g. `[[Chrome (4f2a)] -> id: form] -> css selector: .submit`.
pub trait WebElement: fmt::Display {
    fn click(&self) -> E2eResult<()>;
    fn submit(&self) -> E2eResult<()>;
    fn send_keys(&self, keys: &str) -> E2eResult<()>;
    fn clear(&self) -> E2eResult<()>;
    fn tag_name(&self) -> E2eResult<String>;
    fn attribute(&self, name: &str) -> E2eResult<Option<String>>;
    fn text(&self) -> E2eResult<String>;
    fn css_value(&self, property: &str) -> E2eResult<String>;
    fn is_displayed(&self) -> E2eResult<bool>;
    fn is_enabled(&self) -> E2eResult<bool>;
    fn is_selected(&self) -> E2eResult<bool>;
    fn location(&self) -> E2eResult<Point>;
    fn size(&self) -> E2eResult<Size>;

    fn find_element(&self, by: &By) -> E2eResult<Self>
    where
        Self: Sized;

    fn find_elements(&self, by: &By) -> E2eResult<Vec<Self>>
    where
        Self: Sized;
}

/// A browser session, including its navigation, alert and options calls
pub trait WebDriver: TakesScreenshot + fmt::Display {
    type Element: WebElement;

    fn get(&self, url: &str) -> E2eResult<()>;
    fn current_url(&self) -> E2eResult<String>;
    fn title(&self) -> E2eResult<String>;
    fn find_element(&self, by: &By) -> E2eResult<Self::Element>;
    fn find_elements(&self, by: &By) -> E2eResult<Vec<Self::Element>>;
    fn page_source(&self) -> E2eResult<String>;
    fn close(&self) -> E2eResult<()>;
    fn quit(&self) -> E2eResult<()>;
    fn window_handle(&self) -> E2eResult<String>;
    fn window_handles(&self) -> E2eResult<Vec<String>>;
    fn execute_script(&self, script: &str, args: &[Value]) -> E2eResult<Value>;
    fn execute_async_script(&self, script: &str, args: &[Value]) -> E2eResult<Value>;
    fn window_size(&self) -> E2eResult<Size>;

    // navigation
    fn to(&self, url: &str) -> E2eResult<()>;
    fn back(&self) -> E2eResult<()>;
    fn forward(&self) -> E2eResult<()>;
    fn refresh(&self) -> E2eResult<()>;

    // alert
    fn accept_alert(&self) -> E2eResult<()>;
    fn dismiss_alert(&self) -> E2eResult<()>;

    // options
    fn add_cookie(&self, cookie: &Cookie) -> E2eResult<()>;
    fn delete_cookie_named(&self, name: &str) -> E2eResult<()>;
    fn delete_all_cookies(&self) -> E2eResult<()>;
}

impl<D: WebDriver> WindowSize for D {
    fn current_window_size(&self) -> E2eResult<Size> {
        self.window_size()
    }
}
