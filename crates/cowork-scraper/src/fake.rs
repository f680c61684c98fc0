//! Scripted in-memory [`PageDriver`] for exercising the scraping stages
//! without a browser.
//!
//! CSS and id locators are evaluated against the page markup with the
//! `scraper` crate. XPath locators only match when registered with
//! [`FakePage::with_xpath_hit`].

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use scraper::{Html, Selector};

use crate::driver::PageDriver;
use crate::error::ScraperError;
use crate::locator::Locator;

/// Calls observed by a [`FakeDriver`], in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeCall {
    Navigate(String),
    Click(Locator),
    Escape,
    ScrollToBottom,
    Close,
}

/// One scripted page.
#[derive(Debug, Clone, Default)]
pub struct FakePage {
    stages: Vec<String>,
    stage: usize,
    advance_on: Option<Locator>,
    xpath_hits: HashSet<String>,
    hidden: HashSet<Locator>,
    intercept_until_escape: HashSet<Locator>,
    heights: Vec<u64>,
    navigation_delay: Option<Duration>,
    navigation_error: bool,
}

impl FakePage {
    #[must_use]
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            stages: vec![html.into()],
            ..Self::default()
        }
    }

    /// A page whose markup advances one stage each time `advance_on` is
    /// clicked. `advance_on` stays clickable until the last stage is shown.
    #[must_use]
    pub fn staged(stages: Vec<String>, advance_on: Locator) -> Self {
        Self {
            stages,
            advance_on: Some(advance_on),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_xpath_hit(mut self, expression: impl Into<String>) -> Self {
        self.xpath_hits.insert(expression.into());
        self
    }

    /// Present in the markup but never displayed.
    #[must_use]
    pub fn with_hidden(mut self, locator: Locator) -> Self {
        self.hidden.insert(locator);
        self
    }

    /// Clicks on `locator` are intercepted until Escape has been pressed.
    #[must_use]
    pub fn intercepting(mut self, locator: Locator) -> Self {
        self.intercept_until_escape.insert(locator);
        self
    }

    /// Successive `scrollHeight` readings; the last one repeats.
    #[must_use]
    pub fn with_heights(mut self, heights: Vec<u64>) -> Self {
        self.heights = heights;
        self
    }

    /// Navigation takes `delay` to complete.
    #[must_use]
    pub fn loading_for(mut self, delay: Duration) -> Self {
        self.navigation_delay = Some(delay);
        self
    }

    /// Navigation fails outright.
    #[must_use]
    pub fn unreachable() -> Self {
        Self {
            navigation_error: true,
            ..Self::default()
        }
    }

    fn markup(&self) -> &str {
        self.stages
            .get(self.stage)
            .or_else(|| self.stages.last())
            .map_or("", String::as_str)
    }

    fn has_more_stages(&self) -> bool {
        self.stage + 1 < self.stages.len()
    }

    fn count(&self, locator: &Locator) -> Result<usize, ScraperError> {
        if self.advance_on.as_ref() == Some(locator) {
            return Ok(usize::from(self.has_more_stages()));
        }
        match locator {
            Locator::Css(selector) => {
                let selector = Selector::parse(selector).map_err(|e| ScraperError::Script {
                    reason: format!("invalid selector {selector}: {e}"),
                })?;
                Ok(Html::parse_document(self.markup()).select(&selector).count())
            }
            Locator::Id(id) => {
                let any_id = Selector::parse("[id]").map_err(|e| ScraperError::Script {
                    reason: e.to_string(),
                })?;
                Ok(Html::parse_document(self.markup())
                    .select(&any_id)
                    .filter(|el| el.value().id() == Some(id.as_str()))
                    .count())
            }
            Locator::XPath(expression) => Ok(usize::from(self.xpath_hits.contains(expression))),
        }
    }
}

/// A browser stand-in serving [`FakePage`]s by URL.
#[derive(Debug, Default)]
pub struct FakeDriver {
    pages: HashMap<String, FakePage>,
    current: Option<String>,
    calls: Vec<FakeCall>,
    escape_pressed: bool,
    scrolls_on_page: usize,
    broken: bool,
}

impl FakeDriver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A driver whose every call fails, as after a lost browser session.
    #[must_use]
    pub fn broken() -> Self {
        Self {
            broken: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_page(mut self, url: impl Into<String>, page: FakePage) -> Self {
        self.pages.insert(url.into(), page);
        self
    }

    /// Serves `page` as if `url` had already been navigated to.
    #[must_use]
    pub fn showing(mut self, url: impl Into<String>, page: FakePage) -> Self {
        let url = url.into();
        self.pages.insert(url.clone(), page);
        self.current = Some(url);
        self
    }

    #[must_use]
    pub fn calls(&self) -> &[FakeCall] {
        &self.calls
    }

    #[must_use]
    pub fn clicks_on(&self, locator: &Locator) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, FakeCall::Click(l) if l == locator))
            .count()
    }

    #[must_use]
    pub fn clicks(&self) -> Vec<&Locator> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                FakeCall::Click(l) => Some(l),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn navigations(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                FakeCall::Navigate(url) => Some(url.as_str()),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn count_of(&self, expected: &FakeCall) -> usize {
        self.calls.iter().filter(|call| *call == expected).count()
    }

    fn check_alive(&self) -> Result<(), ScraperError> {
        if self.broken {
            return Err(ScraperError::Script {
                reason: "session lost".to_string(),
            });
        }
        Ok(())
    }

    fn page(&self) -> Result<&FakePage, ScraperError> {
        self.check_alive()?;
        self.current
            .as_ref()
            .and_then(|url| self.pages.get(url))
            .ok_or_else(|| ScraperError::Script {
                reason: "no page loaded".to_string(),
            })
    }

    fn page_mut(&mut self) -> Result<&mut FakePage, ScraperError> {
        self.check_alive()?;
        self.current
            .as_ref()
            .and_then(|url| self.pages.get_mut(url))
            .ok_or_else(|| ScraperError::Script {
                reason: "no page loaded".to_string(),
            })
    }

    fn is_shown(&self, locator: &Locator) -> Result<bool, ScraperError> {
        let page = self.page()?;
        Ok(page.count(locator)? > 0 && !page.hidden.contains(locator))
    }
}

impl PageDriver for FakeDriver {
    async fn navigate(&mut self, url: &str) -> Result<(), ScraperError> {
        self.check_alive()?;
        self.calls.push(FakeCall::Navigate(url.to_string()));
        self.escape_pressed = false;
        self.scrolls_on_page = 0;

        let Some(page) = self.pages.get(url) else {
            return Err(ScraperError::Script {
                reason: format!("net::ERR_NAME_NOT_RESOLVED at {url}"),
            });
        };
        if page.navigation_error {
            return Err(ScraperError::Script {
                reason: format!("net::ERR_CONNECTION_REFUSED at {url}"),
            });
        }
        if let Some(delay) = page.navigation_delay {
            tokio::time::sleep(delay).await;
        }
        self.current = Some(url.to_string());
        Ok(())
    }

    async fn page_source(&mut self) -> Result<String, ScraperError> {
        Ok(self.page()?.markup().to_string())
    }

    async fn count(&mut self, locator: &Locator) -> Result<usize, ScraperError> {
        self.page()?.count(locator)
    }

    async fn is_displayed(&mut self, locator: &Locator) -> Result<bool, ScraperError> {
        self.is_shown(locator)
    }

    async fn is_clickable(&mut self, locator: &Locator) -> Result<bool, ScraperError> {
        self.is_shown(locator)
    }

    async fn click(&mut self, locator: &Locator) -> Result<(), ScraperError> {
        if !self.is_shown(locator)? {
            return Err(ScraperError::NoSuchElement {
                locator: locator.to_string(),
            });
        }
        let escape_pressed = self.escape_pressed;
        let page = self.page_mut()?;
        if page.intercept_until_escape.contains(locator) && !escape_pressed {
            return Err(ScraperError::ClickIntercepted {
                locator: locator.to_string(),
            });
        }
        if page.advance_on.as_ref() == Some(locator) && page.has_more_stages() {
            page.stage += 1;
        }
        self.calls.push(FakeCall::Click(locator.clone()));
        Ok(())
    }

    async fn press_escape(&mut self) -> Result<(), ScraperError> {
        self.check_alive()?;
        self.calls.push(FakeCall::Escape);
        self.escape_pressed = true;
        Ok(())
    }

    async fn scroll_to_bottom(&mut self) -> Result<(), ScraperError> {
        self.page()?;
        self.calls.push(FakeCall::ScrollToBottom);
        self.scrolls_on_page += 1;
        Ok(())
    }

    async fn scroll_height(&mut self) -> Result<u64, ScraperError> {
        let heights = &self.page()?.heights;
        let index = self.scrolls_on_page.min(heights.len().saturating_sub(1));
        Ok(heights.get(index).copied().unwrap_or(1000))
    }

    async fn close(&mut self) -> Result<(), ScraperError> {
        self.calls.push(FakeCall::Close);
        Ok(())
    }
}
