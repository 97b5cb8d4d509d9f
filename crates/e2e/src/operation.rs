//! Intercepted operations and the hooks they trigger

use std::fmt;

/// Hook triggered before every intercepted call
pub const BEFORE_ANY_CALL: &str = "beforeAnyCall";

/// Hook triggered after every successful intercepted call
pub const AFTER_ANY_CALL: &str = "afterAnyCall";

/// Hook triggered when an intercepted call fails
pub const ON_ERROR: &str = "onError";

/// Capability an operation belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Group {
    WebDriver,
    WebElement,
    Navigation,
    Alert,
    Options,
}

impl Group {
    pub fn as_str(&self) -> &'static str {
        match self {
            Group::WebDriver => "WebDriver",
            Group::WebElement => "WebElement",
            Group::Navigation => "Navigation",
            Group::Alert => "Alert",
            Group::Options => "Options",
        }
    }

    pub fn before_hook(&self) -> String {
        format!("beforeAny{}Call", self.as_str())
    }

    pub fn after_hook(&self) -> String {
        format!("afterAny{}Call", self.as_str())
    }
}

macro_rules! operations {
    ($($variant:ident => $method:literal, $group:ident;)+) => {
        /// Every intercepted call
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Operation {
            $($variant,)+
        }

        impl Operation {
            pub const ALL: &'static [Operation] = &[$(Operation::$variant,)+];

            /// Hook name suffix, e.g. `GetText` in `beforeGetText`
            pub fn name(&self) -> &'static str {
                match self {
                    $(Operation::$variant => stringify!($variant),)+
                }
            }

            /// Call name as rendered in messages
            pub fn method(&self) -> &'static str {
                match self {
                    $(Operation::$variant => $method,)+
                }
            }

            pub fn group(&self) -> Group {
                match self {
                    $(Operation::$variant => Group::$group,)+
                }
            }
        }
    };
}

operations! {
    Get => "get", WebDriver;
    GetCurrentUrl => "getCurrentUrl", WebDriver;
    GetTitle => "getTitle", WebDriver;
    FindElement => "findElement", WebDriver;
    FindElements => "findElements", WebDriver;
    GetPageSource => "getPageSource", WebDriver;
    Close => "close", WebDriver;
    Quit => "quit", WebDriver;
    GetWindowHandle => "getWindowHandle", WebDriver;
    GetWindowHandles => "getWindowHandles", WebDriver;
    ExecuteScript => "executeScript", WebDriver;
    ExecuteAsyncScript => "executeAsyncScript", WebDriver;
    GetWindowSize => "getWindowSize", WebDriver;
    To => "to", Navigation;
    Back => "back", Navigation;
    Forward => "forward", Navigation;
    Refresh => "refresh", Navigation;
    Accept => "accept", Alert;
    Dismiss => "dismiss", Alert;
    AddCookie => "addCookie", Options;
    DeleteCookieNamed => "deleteCookieNamed", Options;
    DeleteAllCookies => "deleteAllCookies", Options;
    Click => "click", WebElement;
    Submit => "submit", WebElement;
    SendKeys => "sendKeys", WebElement;
    Clear => "clear", WebElement;
    GetTagName => "getTagName", WebElement;
    GetAttribute => "getAttribute", WebElement;
    GetText => "getText", WebElement;
    GetCssValue => "getCssValue", WebElement;
    IsDisplayed => "isDisplayed", WebElement;
    IsEnabled => "isEnabled", WebElement;
    IsSelected => "isSelected", WebElement;
    GetLocation => "getLocation", WebElement;
    GetSize => "getSize", WebElement;
    FindWebElement => "findElement", WebElement;
    FindWebElements => "findElements", WebElement;
}

impl Operation {
    pub fn before_hook(&self) -> String {
        format!("before{}", self.name())
    }

    pub fn after_hook(&self) -> String {
        format!("after{}", self.name())
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.method())
    }
}

/// A call argument, receiver or return value as seen by the hooks
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arg {
    Value(String),
    /// Textual form of an element; rendered as its locator chain
    Element(String),
    List(Vec<Arg>),
}

impl Arg {
    pub fn value(value: impl fmt::Display) -> Self {
        Arg::Value(value.to_string())
    }

    pub fn element(element: &impl fmt::Display) -> Self {
        Arg::Element(element.to_string())
    }

    pub fn elements<'a, E: fmt::Display + 'a>(elements: impl IntoIterator<Item = &'a E>) -> Self {
        Arg::List(elements.into_iter().map(Arg::element).collect())
    }

    pub fn values<T: fmt::Display>(values: impl IntoIterator<Item = T>) -> Self {
        Arg::List(values.into_iter().map(Arg::value).collect())
    }
}

/// One intercepted call: the receiver, the operation and its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub target: Arg,
    pub operation: Operation,
    pub args: Vec<Arg>,
}

impl Call {
    pub fn new(target: Arg, operation: Operation) -> Self {
        Self {
            target,
            operation,
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: Arg) -> Self {
        self.args.push(arg);
        self
    }

    /// `[target, operation, [args]]`, the layout of the any-call and group hooks
    pub fn generic_args(&self) -> Vec<Arg> {
        vec![
            self.target.clone(),
            Arg::value(self.operation),
            Arg::List(self.args.clone()),
        ]
    }

    /// `[target, args...]`, the layout of operation-specific hooks
    pub fn specific_args(&self) -> Vec<Arg> {
        std::iter::once(self.target.clone())
            .chain(self.args.iter().cloned())
            .collect()
    }
}
