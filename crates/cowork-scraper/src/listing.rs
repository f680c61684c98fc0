//! Stage one: load the directory, exhaust its "show more" pagination and
//! turn the rows into [`ListingEntry`] values.

use std::sync::LazyLock;

use cowork_core::ListingEntry;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::consent;
use crate::driver::{pause, wait_for, Condition, PageDriver, Timings};
use crate::error::ScraperError;
use crate::locator::Locator;

pub const LISTING_CONTAINER: &str = "div.view-content";
pub const LISTING_ROW: &str = "div.view-content > div.views-row";
pub const SHOW_MORE_XPATH: &str = "//a[contains(text(), 'Mostrar más')]";

/// Default cap on "show more" iterations.
pub const MAX_PAGINATION_CLICKS: usize = 150;

static ROW_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(LISTING_ROW).expect("valid row selector"));
static TITLE_LINK_SEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("div.spaces-list-title > a").expect("valid title link selector")
});
static NESTED_TITLE_LINK_SEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("div.spaces-list-title h2 a").expect("valid nested title link selector")
});
static H2_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h2").expect("valid h2"));

#[derive(Debug, Clone)]
pub struct ListingOptions {
    pub timings: Timings,
    pub max_pagination_clicks: usize,
}

impl Default for ListingOptions {
    fn default() -> Self {
        Self {
            timings: Timings::default(),
            max_pagination_clicks: MAX_PAGINATION_CLICKS,
        }
    }
}

/// Counters from the pagination loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListingStats {
    /// Successful "show more" clicks that grew the list.
    pub clicks: usize,
    /// Loop iterations, including the final one that found no control.
    pub iterations: usize,
}

/// Collects every listing entry reachable from `entry_url`.
///
/// # Errors
///
/// Returns [`ScraperError::InvalidUrl`] before touching the browser if
/// `entry_url` is not an absolute URL, [`ScraperError::Timeout`] if the
/// listings container never becomes visible, or any navigation / page-source
/// error.
pub async fn collect<D: PageDriver>(
    driver: &mut D,
    entry_url: &str,
    options: &ListingOptions,
) -> Result<Vec<ListingEntry>, ScraperError> {
    collect_with_stats(driver, entry_url, options)
        .await
        .map(|(entries, _)| entries)
}

/// Same as [`collect`], also reporting pagination counters.
///
/// # Errors
///
/// See [`collect`].
pub async fn collect_with_stats<D: PageDriver>(
    driver: &mut D,
    entry_url: &str,
    options: &ListingOptions,
) -> Result<(Vec<ListingEntry>, ListingStats), ScraperError> {
    let timings = &options.timings;
    Url::parse(entry_url).map_err(|err| ScraperError::InvalidUrl {
        url: entry_url.to_string(),
        reason: err.to_string(),
    })?;

    tracing::info!(url = entry_url, "navigating to listing page");
    driver.navigate(entry_url).await?;
    consent::dismiss(driver, timings).await;

    tracing::info!("waiting for listings container");
    let container = Locator::css(LISTING_CONTAINER);
    wait_for(
        driver,
        Condition::Visible(&container),
        timings.listing_container_wait,
        timings.poll_interval,
    )
    .await?;
    pause(timings.listing_settle).await;

    let stats = load_all_rows(driver, options).await;
    tracing::info!(
        clicks = stats.clicks,
        iterations = stats.iterations,
        "finished loading listings"
    );

    let html = driver.page_source().await?;
    let entries = parse_listing(&html, entry_url);
    if entries.is_empty() {
        tracing::warn!("no listings found");
    } else {
        tracing::info!(count = entries.len(), "found listings for processing");
    }
    Ok((entries, stats))
}

/// Clicks "show more" until it disappears, stops growing the list, or the
/// iteration cap is reached.
async fn load_all_rows<D: PageDriver>(driver: &mut D, options: &ListingOptions) -> ListingStats {
    let timings = &options.timings;
    let rows = Locator::css(LISTING_ROW);
    let show_more = Locator::xpath(SHOW_MORE_XPATH);
    let mut stats = ListingStats::default();

    while stats.iterations < options.max_pagination_clicks {
        stats.iterations += 1;

        match show_more_once(driver, timings, &rows, &show_more).await {
            Ok(()) => stats.clicks += 1,
            Err(err) if err.is_absence() => {
                tracing::info!("no more 'Mostrar más' buttons, proceeding");
                return stats;
            }
            Err(err) => {
                tracing::warn!(error = %err, "pagination step failed, continuing");
            }
        }
    }

    tracing::warn!(
        cap = options.max_pagination_clicks,
        "pagination cap reached"
    );
    stats
}

async fn show_more_once<D: PageDriver>(
    driver: &mut D,
    timings: &Timings,
    rows: &Locator,
    show_more: &Locator,
) -> Result<(), ScraperError> {
    driver.scroll_to_bottom().await?;
    pause(timings.listing_scroll_delay).await;

    let current = driver.count(rows).await?;
    tracing::info!(count = current, "current listings");

    wait_for(
        driver,
        Condition::Clickable(show_more),
        timings.show_more_wait,
        timings.poll_interval,
    )
    .await?;
    driver.click(show_more).await?;

    wait_for(
        driver,
        Condition::CountAbove(rows, current),
        timings.listing_growth_wait,
        timings.poll_interval,
    )
    .await?;
    pause(timings.listing_scroll_delay).await;
    Ok(())
}

/// Parses listing rows out of `html`, resolving links against `base_url`.
///
/// Rows without a usable name or link keep the sentinel for that field
/// rather than being dropped.
#[must_use]
pub fn parse_listing(html: &str, base_url: &str) -> Vec<ListingEntry> {
    let document = Html::parse_document(html);
    let base = Url::parse(base_url).ok();
    if base.is_none() {
        tracing::warn!(base_url, "base URL does not parse, links will be N/A");
    }

    document
        .select(&ROW_SEL)
        .map(|row| parse_row(row, base.as_ref()))
        .collect()
}

fn parse_row(row: ElementRef<'_>, base: Option<&Url>) -> ListingEntry {
    let Some(anchor) = row
        .select(&TITLE_LINK_SEL)
        .next()
        .or_else(|| row.select(&NESTED_TITLE_LINK_SEL).next())
    else {
        return ListingEntry::new(None, None);
    };

    let name = anchor
        .select(&H2_SEL)
        .next()
        .map_or_else(|| trimmed_text(anchor), trimmed_text);

    let link = anchor
        .value()
        .attr("href")
        .and_then(|href| base.and_then(|b| b.join(href).ok()))
        .map(String::from);

    ListingEntry::new(Some(name), link)
}

fn trimmed_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

#[cfg(test)]
#[path = "listing_test.rs"]
mod tests;
