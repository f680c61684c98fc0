//! Stage two: load one detail page, coax lazy content in by scrolling, and
//! run the field rules over the result.

use cowork_core::DetailRecord;

use crate::driver::{pause, wait_for, Condition, PageDriver, Timings};
use crate::error::ScraperError;
use crate::fields::parse_detail;
use crate::locator::Locator;

/// Scroll cycles attempted before giving up on further lazy loading.
pub const MAX_SCROLL_CYCLES: usize = 3;

/// Extracts a [`DetailRecord`] from `url`.
///
/// Never fails: a page that cannot be loaded yields the all-sentinel record.
pub async fn extract<D: PageDriver>(driver: &mut D, url: &str, timings: &Timings) -> DetailRecord {
    tracing::info!(url, "scraping details");
    match load_and_snapshot(driver, url, timings).await {
        Ok(html) => {
            let record = parse_detail(&html);
            tracing::info!(url, found = record.found_count(), "details extracted");
            record
        }
        Err(err @ ScraperError::Timeout { .. }) => {
            tracing::warn!(url, error = %err, "timeout loading detail page");
            DetailRecord::default()
        }
        Err(err) => {
            tracing::warn!(url, error = %err, "error loading detail page");
            DetailRecord::default()
        }
    }
}

async fn load_and_snapshot<D: PageDriver>(
    driver: &mut D,
    url: &str,
    timings: &Timings,
) -> Result<String, ScraperError> {
    match tokio::time::timeout(timings.detail_navigation_timeout, driver.navigate(url)).await {
        Ok(result) => result?,
        Err(_) => {
            return Err(ScraperError::Timeout {
                what: format!("navigation to {url}"),
                waited_ms: u64::try_from(timings.detail_navigation_timeout.as_millis())
                    .unwrap_or(u64::MAX),
            })
        }
    }

    let body = Locator::css("body");
    wait_for(
        driver,
        Condition::Present(&body),
        timings.detail_ready_wait,
        timings.poll_interval,
    )
    .await?;

    let cycles = scroll_until_stable(driver, timings).await?;
    tracing::debug!(url, cycles, "scrolling finished");
    pause(timings.detail_final_pause).await;

    driver.page_source().await
}

/// Scrolls to the bottom until the page height stops growing, at most
/// [`MAX_SCROLL_CYCLES`] times. Returns the number of scrolls issued.
async fn scroll_until_stable<D: PageDriver>(
    driver: &mut D,
    timings: &Timings,
) -> Result<usize, ScraperError> {
    let mut last_height = driver.scroll_height().await?;
    let mut scrolls = 0;

    while scrolls < MAX_SCROLL_CYCLES {
        driver.scroll_to_bottom().await?;
        scrolls += 1;
        pause(timings.detail_scroll_delay).await;

        let height = driver.scroll_height().await?;
        if height == last_height {
            break;
        }
        last_height = height;
    }
    Ok(scrolls)
}

#[cfg(test)]
#[path = "detail_test.rs"]
mod tests;
