//! Monitored driver
//!
//! Decorators implementing the driver capability traits by delegating every
//! call to a wrapped driver, surrounded by the [`EventsListener`] hooks.
//! A monitored driver belongs to one worker thread; it is not `Send`.

use std::fmt;
use std::rc::Rc;

use lumen_common::{Point, Size};
use serde_json::Value;

use crate::driver::{By, Cookie, TakesScreenshot, WebDriver, WebElement};
use crate::error::E2eResult;
use crate::listener::EventsListener;
use crate::operation::{Arg, Call, Operation};
use crate::recorder::Frame;

pub struct MonitoredDriver<D: WebDriver> {
    driver: Rc<D>,
    listener: Rc<EventsListener>,
}

impl<D: WebDriver> MonitoredDriver<D> {
    pub fn new(driver: Rc<D>, listener: EventsListener) -> Self {
        Self {
            driver,
            listener: Rc::new(listener),
        }
    }

    /// The wrapped driver; calls made on it are not intercepted
    pub fn inner(&self) -> &D {
        &self.driver
    }

    pub fn listener(&self) -> &EventsListener {
        &self.listener
    }

    /// Record a manual frame, subject to the recording policy
    pub fn screenshot_frame(&self) -> E2eResult<Option<Frame>> {
        self.listener.record_manual(self.driver.as_ref())
    }

    fn call(&self, operation: Operation) -> Call {
        Call::new(Arg::value(self.driver.as_ref()), operation)
    }

    fn intercept<T>(
        &self,
        call: Call,
        delegate: impl FnOnce(&D) -> E2eResult<T>,
        result: impl FnOnce(&T) -> Option<Arg>,
    ) -> E2eResult<T> {
        let driver = self.driver.as_ref();
        self.listener
            .intercept(&call, driver, || delegate(driver), result)
    }

    fn wrap(&self, element: D::Element) -> MonitoredElement<D> {
        MonitoredElement {
            element,
            driver: self.driver.clone(),
            listener: self.listener.clone(),
        }
    }
}

impl<D: WebDriver> Clone for MonitoredDriver<D> {
    fn clone(&self) -> Self {
        Self {
            driver: self.driver.clone(),
            listener: self.listener.clone(),
        }
    }
}

impl<D: WebDriver> fmt::Display for MonitoredDriver<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.driver.as_ref(), f)
    }
}

impl<D: WebDriver> TakesScreenshot for MonitoredDriver<D> {
    fn screenshot_png(&self) -> E2eResult<Vec<u8>> {
        self.driver.screenshot_png()
    }
}

fn none<T>(_: &T) -> Option<Arg> {
    None
}

/// Escape markup so page sources survive tag stripping and report rendering
fn escape_markup(source: &str) -> String {
    source
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

impl<D: WebDriver> WebDriver for MonitoredDriver<D> {
    type Element = MonitoredElement<D>;

    fn get(&self, url: &str) -> E2eResult<()> {
        let call = self.call(Operation::Get).arg(Arg::value(url));
        self.intercept(call, |d| d.get(url), none)
    }

    fn current_url(&self) -> E2eResult<String> {
        self.intercept(self.call(Operation::GetCurrentUrl), |d| d.current_url(), |url| {
            Some(Arg::value(url))
        })
    }

    fn title(&self) -> E2eResult<String> {
        self.intercept(self.call(Operation::GetTitle), |d| d.title(), |title| {
            Some(Arg::value(title))
        })
    }

    fn find_element(&self, by: &By) -> E2eResult<Self::Element> {
        let call = self.call(Operation::FindElement).arg(Arg::value(by));
        self.intercept(call, |d| d.find_element(by), |e| Some(Arg::element(e)))
            .map(|e| self.wrap(e))
    }

    fn find_elements(&self, by: &By) -> E2eResult<Vec<Self::Element>> {
        let call = self.call(Operation::FindElements).arg(Arg::value(by));
        let elements = self.intercept(call, |d| d.find_elements(by), |es| Some(Arg::elements(es)))?;
        Ok(elements.into_iter().map(|e| self.wrap(e)).collect())
    }

    fn page_source(&self) -> E2eResult<String> {
        self.intercept(self.call(Operation::GetPageSource), |d| d.page_source(), |source| {
            Some(Arg::value(escape_markup(source)))
        })
    }

    fn close(&self) -> E2eResult<()> {
        self.intercept(self.call(Operation::Close), |d| d.close(), none)
    }

    fn quit(&self) -> E2eResult<()> {
        self.intercept(self.call(Operation::Quit), |d| d.quit(), none)
    }

    fn window_handle(&self) -> E2eResult<String> {
        self.intercept(self.call(Operation::GetWindowHandle), |d| d.window_handle(), |h| {
            Some(Arg::value(h))
        })
    }

    fn window_handles(&self) -> E2eResult<Vec<String>> {
        self.intercept(self.call(Operation::GetWindowHandles), |d| d.window_handles(), |hs| {
            Some(Arg::values(hs))
        })
    }

    fn execute_script(&self, script: &str, args: &[Value]) -> E2eResult<Value> {
        let call = self
            .call(Operation::ExecuteScript)
            .arg(Arg::value(script))
            .arg(Arg::values(args));
        self.intercept(call, |d| d.execute_script(script, args), |v| Some(Arg::value(v)))
    }

    fn execute_async_script(&self, script: &str, args: &[Value]) -> E2eResult<Value> {
        let call = self
            .call(Operation::ExecuteAsyncScript)
            .arg(Arg::value(script))
            .arg(Arg::values(args));
        self.intercept(call, |d| d.execute_async_script(script, args), |v| {
            Some(Arg::value(v))
        })
    }

    fn window_size(&self) -> E2eResult<Size> {
        self.intercept(self.call(Operation::GetWindowSize), |d| d.window_size(), |s| {
            Some(Arg::value(s))
        })
    }

    fn to(&self, url: &str) -> E2eResult<()> {
        let call = self.call(Operation::To).arg(Arg::value(url));
        self.intercept(call, |d| d.to(url), none)
    }

    fn back(&self) -> E2eResult<()> {
        self.intercept(self.call(Operation::Back), |d| d.back(), none)
    }

    fn forward(&self) -> E2eResult<()> {
        self.intercept(self.call(Operation::Forward), |d| d.forward(), none)
    }

    fn refresh(&self) -> E2eResult<()> {
        self.intercept(self.call(Operation::Refresh), |d| d.refresh(), none)
    }

    fn accept_alert(&self) -> E2eResult<()> {
        self.intercept(self.call(Operation::Accept), |d| d.accept_alert(), none)
    }

    fn dismiss_alert(&self) -> E2eResult<()> {
        self.intercept(self.call(Operation::Dismiss), |d| d.dismiss_alert(), none)
    }

    fn add_cookie(&self, cookie: &Cookie) -> E2eResult<()> {
        let call = self.call(Operation::AddCookie).arg(Arg::value(cookie));
        self.intercept(call, |d| d.add_cookie(cookie), none)
    }

    fn delete_cookie_named(&self, name: &str) -> E2eResult<()> {
        let call = self.call(Operation::DeleteCookieNamed).arg(Arg::value(name));
        self.intercept(call, |d| d.delete_cookie_named(name), none)
    }

    fn delete_all_cookies(&self) -> E2eResult<()> {
        self.intercept(self.call(Operation::DeleteAllCookies), |d| d.delete_all_cookies(), none)
    }
}

/// An element found through a [`MonitoredDriver`]
pub struct MonitoredElement<D: WebDriver> {
    element: D::Element,
    driver: Rc<D>,
    listener: Rc<EventsListener>,
}

impl<D: WebDriver> MonitoredElement<D> {
    pub fn inner(&self) -> &D::Element {
        &self.element
    }

    fn call(&self, operation: Operation) -> Call {
        Call::new(Arg::element(&self.element), operation)
    }

    fn intercept<T>(
        &self,
        call: Call,
        delegate: impl FnOnce(&D::Element) -> E2eResult<T>,
        result: impl FnOnce(&T) -> Option<Arg>,
    ) -> E2eResult<T> {
        self.listener.intercept(
            &call,
            self.driver.as_ref(),
            || delegate(&self.element),
            result,
        )
    }

    fn wrap(&self, element: D::Element) -> Self {
        Self {
            element,
            driver: self.driver.clone(),
            listener: self.listener.clone(),
        }
    }
}

impl<D: WebDriver> fmt::Display for MonitoredElement<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.element, f)
    }
}

impl<D: WebDriver> WebElement for MonitoredElement<D> {
    fn click(&self) -> E2eResult<()> {
        self.intercept(self.call(Operation::Click), |e| e.click(), none)
    }

    fn submit(&self) -> E2eResult<()> {
        self.intercept(self.call(Operation::Submit), |e| e.submit(), none)
    }

    fn send_keys(&self, keys: &str) -> E2eResult<()> {
        let call = self.call(Operation::SendKeys).arg(Arg::value(keys));
        self.intercept(call, |e| e.send_keys(keys), none)
    }

    fn clear(&self) -> E2eResult<()> {
        self.intercept(self.call(Operation::Clear), |e| e.clear(), none)
    }

    fn tag_name(&self) -> E2eResult<String> {
        self.intercept(self.call(Operation::GetTagName), |e| e.tag_name(), |t| {
            Some(Arg::value(t))
        })
    }

    fn attribute(&self, name: &str) -> E2eResult<Option<String>> {
        let call = self.call(Operation::GetAttribute).arg(Arg::value(name));
        self.intercept(call, |e| e.attribute(name), |v| {
            Some(Arg::value(v.as_deref().unwrap_or("null")))
        })
    }

    fn text(&self) -> E2eResult<String> {
        self.intercept(self.call(Operation::GetText), |e| e.text(), |t| Some(Arg::value(t)))
    }

    fn css_value(&self, property: &str) -> E2eResult<String> {
        let call = self.call(Operation::GetCssValue).arg(Arg::value(property));
        self.intercept(call, |e| e.css_value(property), |v| Some(Arg::value(v)))
    }

    fn is_displayed(&self) -> E2eResult<bool> {
        self.intercept(self.call(Operation::IsDisplayed), |e| e.is_displayed(), |b| {
            Some(Arg::value(b))
        })
    }

    fn is_enabled(&self) -> E2eResult<bool> {
        self.intercept(self.call(Operation::IsEnabled), |e| e.is_enabled(), |b| {
            Some(Arg::value(b))
        })
    }

    fn is_selected(&self) -> E2eResult<bool> {
        self.intercept(self.call(Operation::IsSelected), |e| e.is_selected(), |b| {
            Some(Arg::value(b))
        })
    }

    fn location(&self) -> E2eResult<Point> {
        self.intercept(self.call(Operation::GetLocation), |e| e.location(), |p| {
            Some(Arg::value(p))
        })
    }

    fn size(&self) -> E2eResult<Size> {
        self.intercept(self.call(Operation::GetSize), |e| e.size(), |s| Some(Arg::value(s)))
    }

    fn find_element(&self, by: &By) -> E2eResult<Self> {
        let call = self.call(Operation::FindWebElement).arg(Arg::value(by));
        self.intercept(call, |e| e.find_element(by), |found| Some(Arg::element(found)))
            .map(|found| self.wrap(found))
    }

    fn find_elements(&self, by: &By) -> E2eResult<Vec<Self>> {
        let call = self.call(Operation::FindWebElements).arg(Arg::value(by));
        let found = self.intercept(call, |e| e.find_elements(by), |es| Some(Arg::elements(es)))?;
        Ok(found.into_iter().map(|e| self.wrap(e)).collect())
    }
}
