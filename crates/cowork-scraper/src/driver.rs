//! The browser capability the scraping stages are written against, plus the
//! bounded-wait and delay helpers shared by every stage.

use std::fmt;
use std::time::Duration;

use tokio::time::Instant;

use crate::error::ScraperError;
use crate::locator::Locator;

/// Narrow interface over a live browser tab.
///
/// Implemented by [`crate::ChromeSession`] for real runs and by the scripted
/// driver in `fake` for tests.
#[allow(async_fn_in_trait)]
pub trait PageDriver {
    /// Loads `url` in the tab.
    async fn navigate(&mut self, url: &str) -> Result<(), ScraperError>;

    /// Serialized DOM of the current document.
    async fn page_source(&mut self) -> Result<String, ScraperError>;

    async fn count(&mut self, locator: &Locator) -> Result<usize, ScraperError>;

    /// `true` when the first match is rendered with a non-empty box.
    async fn is_displayed(&mut self, locator: &Locator) -> Result<bool, ScraperError>;

    /// `true` when the first match is displayed and not disabled.
    async fn is_clickable(&mut self, locator: &Locator) -> Result<bool, ScraperError>;

    /// Programmatic click on the first match (`element.click()` in page
    /// script, not a synthesized pointer event).
    ///
    /// The click fires even when an overlay covers the target. Returns
    /// [`ScraperError::ClickIntercepted`] when the page rejects it.
    async fn click(&mut self, locator: &Locator) -> Result<(), ScraperError>;

    /// Sends an Escape keystroke to the page.
    async fn press_escape(&mut self) -> Result<(), ScraperError>;

    async fn scroll_to_bottom(&mut self) -> Result<(), ScraperError>;

    /// Current `document.body.scrollHeight`.
    async fn scroll_height(&mut self) -> Result<u64, ScraperError>;

    /// Tears the session down. Further calls are no-ops.
    async fn close(&mut self) -> Result<(), ScraperError>;
}

/// Every delay and wait bound used while driving the browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timings {
    pub consent_settle: Duration,
    pub consent_selector_wait: Duration,
    pub consent_retry_wait: Duration,
    pub after_click_pause: Duration,
    pub listing_container_wait: Duration,
    pub listing_settle: Duration,
    pub listing_scroll_delay: Duration,
    pub show_more_wait: Duration,
    pub listing_growth_wait: Duration,
    pub detail_ready_wait: Duration,
    pub detail_navigation_timeout: Duration,
    pub detail_scroll_delay: Duration,
    pub detail_final_pause: Duration,
    pub poll_interval: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            consent_settle: Duration::from_secs(3),
            consent_selector_wait: Duration::from_secs(10),
            consent_retry_wait: Duration::from_secs(5),
            after_click_pause: Duration::from_secs(1),
            listing_container_wait: Duration::from_secs(60),
            listing_settle: Duration::from_secs(2),
            listing_scroll_delay: Duration::from_millis(1500),
            show_more_wait: Duration::from_secs(10),
            listing_growth_wait: Duration::from_secs(20),
            detail_ready_wait: Duration::from_secs(20),
            detail_navigation_timeout: Duration::from_secs(20),
            detail_scroll_delay: Duration::from_secs(2),
            detail_final_pause: Duration::from_secs(2),
            poll_interval: Duration::from_millis(250),
        }
    }
}

impl Timings {
    /// No delays, and every wait checks exactly once.
    #[must_use]
    pub fn immediate() -> Self {
        Self {
            consent_settle: Duration::ZERO,
            consent_selector_wait: Duration::ZERO,
            consent_retry_wait: Duration::ZERO,
            after_click_pause: Duration::ZERO,
            listing_container_wait: Duration::ZERO,
            listing_settle: Duration::ZERO,
            listing_scroll_delay: Duration::ZERO,
            show_more_wait: Duration::ZERO,
            listing_growth_wait: Duration::ZERO,
            detail_ready_wait: Duration::ZERO,
            // Navigation still needs room to complete against an in-memory page.
            detail_navigation_timeout: Duration::from_secs(5),
            detail_scroll_delay: Duration::ZERO,
            detail_final_pause: Duration::ZERO,
            poll_interval: Duration::ZERO,
        }
    }

    #[must_use]
    pub fn with_page_load_timeout(mut self, timeout: Duration) -> Self {
        self.detail_navigation_timeout = timeout;
        self
    }
}

/// Something a bounded wait polls for.
#[derive(Debug, Clone, Copy)]
pub enum Condition<'a> {
    Present(&'a Locator),
    Visible(&'a Locator),
    Clickable(&'a Locator),
    CountAbove(&'a Locator, usize),
}

impl Condition<'_> {
    async fn holds<D: PageDriver>(&self, driver: &mut D) -> Result<bool, ScraperError> {
        match *self {
            Condition::Present(locator) => Ok(driver.count(locator).await? > 0),
            Condition::Visible(locator) => driver.is_displayed(locator).await,
            Condition::Clickable(locator) => driver.is_clickable(locator).await,
            Condition::CountAbove(locator, n) => Ok(driver.count(locator).await? > n),
        }
    }
}

impl fmt::Display for Condition<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Present(l) => write!(f, "presence of {l}"),
            Condition::Visible(l) => write!(f, "visibility of {l}"),
            Condition::Clickable(l) => write!(f, "{l} to be clickable"),
            Condition::CountAbove(l, n) => write!(f, "more than {n} matches of {l}"),
        }
    }
}

/// Polls `condition` until it holds or `timeout` elapses.
///
/// The condition is always checked at least once, so a zero timeout is a
/// single check. Probe errors count as "not yet".
///
/// # Errors
///
/// Returns [`ScraperError::Timeout`] if the condition never held.
pub async fn wait_for<D: PageDriver>(
    driver: &mut D,
    condition: Condition<'_>,
    timeout: Duration,
    poll_interval: Duration,
) -> Result<(), ScraperError> {
    let started = Instant::now();
    loop {
        match condition.holds(driver).await {
            Ok(true) => return Ok(()),
            Ok(false) => {}
            Err(err) => tracing::trace!(error = %err, "wait check failed for {condition}"),
        }

        let elapsed = started.elapsed();
        if elapsed >= timeout {
            return Err(ScraperError::Timeout {
                what: condition.to_string(),
                waited_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            });
        }

        let step = poll_interval.min(timeout - elapsed);
        if step.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(step).await;
        }
    }
}

/// Sleeps for `delay`, skipping the timer entirely when it is zero.
pub async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}
