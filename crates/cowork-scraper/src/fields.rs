//! Field rules for detail pages.
//!
//! Each rule reads one parsed document and returns `None` when the page does
//! not carry the field. [`parse_detail`] applies all of them and fills the
//! gaps with the sentinel.

use std::sync::LazyLock;

use cowork_core::{or_not_available, DetailRecord, NOT_AVAILABLE};
use scraper::{ElementRef, Html, Selector};

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid selector")
}

static DESCRIPTION_ENCODED: LazyLock<Selector> = LazyLock::new(|| {
    selector(r#"div.field-name-body div.field-item.even[property="content:encoded"]"#)
});
static DESCRIPTION_ANY: LazyLock<Selector> =
    LazyLock::new(|| selector("div.field-name-body div.field-item.even"));
static ADDRESS: LazyLock<Selector> = LazyLock::new(|| {
    selector("div.space-info div.field-name-field-coworking-address div.field-item.even")
});
static PHONE: LazyLock<Selector> = LazyLock::new(|| {
    selector("div.space-info div.field-name-field-coworking-telefono div.field-item.even")
});
static WEBSITE: LazyLock<Selector> = LazyLock::new(|| {
    selector("div.space-info div.field-name-field-coworking-web div.field-item.even a")
});
static FIELD_LABEL: LazyLock<Selector> = LazyLock::new(|| selector("h2.field-label"));
static TERM_NAME: LazyLock<Selector> = LazyLock::new(|| selector("span.term-name"));
static BASIC_INFO: LazyLock<Selector> =
    LazyLock::new(|| selector("div.space-info div.basic-info.clearfix"));
static INFO_ITEM: LazyLock<Selector> = LazyLock::new(|| selector("div.info-item"));
static INFO_LABEL: LazyLock<Selector> = LazyLock::new(|| selector(".info-item-label"));
static INFO_VALUE: LazyLock<Selector> = LazyLock::new(|| selector(".info-item-value"));
static RATE_BLOCK: LazyLock<Selector> =
    LazyLock::new(|| selector("section.space-rates div.block.block-views.clearfix"));
static RATE_TITLE: LazyLock<Selector> = LazyLock::new(|| selector("h2.block-title"));
static RATE_ROW: LazyLock<Selector> = LazyLock::new(|| selector("div.views-row"));
static RATE_PLAN: LazyLock<Selector> =
    LazyLock::new(|| selector(".views-field-title .field-content a"));
static RATE_TYPE: LazyLock<Selector> = LazyLock::new(|| {
    selector(".col-field-tarifa-pase-tipo .field-content, .col-field-tarifa-tipo .field-content")
});
static RATE_PRICE: LazyLock<Selector> =
    LazyLock::new(|| selector(".col-field-tarifa-precio-billing-price .field-content"));
static GALLERY_IMAGE: LazyLock<Selector> =
    LazyLock::new(|| selector("div.photoswipe-gallery a.photoswipe[href]"));

const SERVICES_HEADING: &str = "Servicios";
const RATE_TITLE_PREFIX: &str = "Tarifas de ";
const UNKNOWN_CATEGORY: &str = "Unknown";

/// Trimmed text nodes concatenated without a separator.
fn stripped_text(element: ElementRef<'_>) -> String {
    element.text().map(str::trim).collect()
}

/// Trimmed, non-empty text nodes joined with `separator`.
fn joined_text(element: ElementRef<'_>, separator: &str) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

#[must_use]
pub fn description(doc: &Html) -> Option<String> {
    doc.select(&DESCRIPTION_ENCODED)
        .next()
        .or_else(|| doc.select(&DESCRIPTION_ANY).next())
        .map(|el| joined_text(el, "\n"))
        .and_then(non_empty)
}

#[must_use]
pub fn address(doc: &Html) -> Option<String> {
    doc.select(&ADDRESS)
        .next()
        .map(stripped_text)
        .and_then(non_empty)
}

#[must_use]
pub fn phone(doc: &Html) -> Option<String> {
    doc.select(&PHONE).next().map(stripped_text).and_then(non_empty)
}

#[must_use]
pub fn website(doc: &Html) -> Option<String> {
    doc.select(&WEBSITE)
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(str::trim)
        .map(String::from)
        .and_then(non_empty)
}

/// Service names listed under the "Servicios" heading, joined with `"; "`.
#[must_use]
pub fn services(doc: &Html) -> Option<String> {
    let heading = doc
        .select(&FIELD_LABEL)
        .find(|h| stripped_text(*h) == SERVICES_HEADING)?;

    let items = heading
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "div" && el.value().classes().any(|c| c == "field-items"))?;

    let names: Vec<String> = items
        .select(&TERM_NAME)
        .map(stripped_text)
        .filter(|name| !name.is_empty())
        .collect();
    non_empty(names.join("; "))
}

/// Values from the basic-info box.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BasicMetrics {
    pub surface_area: Option<String>,
    pub private_offices: Option<String>,
    pub meeting_rooms_count: Option<String>,
    pub capacity: Option<String>,
}

impl BasicMetrics {
    /// Routes one labelled value. Keywords are tried in a fixed order and the
    /// first one contained in the lower-cased label wins.
    fn route(&mut self, label: &str, value: String) {
        let label = label.to_lowercase();
        let slot = if label.contains("superficie") {
            &mut self.surface_area
        } else if label.contains("despachos") {
            &mut self.private_offices
        } else if label.contains("salas") {
            &mut self.meeting_rooms_count
        } else if label.contains("capacidad") {
            &mut self.capacity
        } else {
            tracing::debug!(label = %label, "ignoring basic-info item");
            return;
        };
        *slot = Some(value);
    }
}

#[must_use]
pub fn basic_metrics(doc: &Html) -> BasicMetrics {
    let mut metrics = BasicMetrics::default();
    let Some(container) = doc.select(&BASIC_INFO).next() else {
        return metrics;
    };

    for item in container.select(&INFO_ITEM) {
        let (Some(label), Some(value)) = (
            item.select(&INFO_LABEL).next(),
            item.select(&INFO_VALUE).next(),
        ) else {
            continue;
        };
        metrics.route(&stripped_text(label), stripped_text(value));
    }
    metrics
}

/// One row of a rate block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceRow {
    pub category: String,
    pub plan: String,
    /// Parsed for completeness; not part of the formatted output.
    pub kind: String,
    pub price: String,
}

impl PriceRow {
    #[must_use]
    pub fn formatted(&self) -> String {
        format!(
            "Category: {}, Plan: {}, Price: {}",
            self.category, self.plan, self.price
        )
    }
}

/// Every rate row on the page, in block-then-row order.
#[must_use]
pub fn price_rows(doc: &Html) -> Vec<PriceRow> {
    let mut rows = Vec::new();
    for block in doc.select(&RATE_BLOCK) {
        let category = block
            .select(&RATE_TITLE)
            .next()
            .map_or_else(
                || UNKNOWN_CATEGORY.to_string(),
                |title| stripped_text(title).replace(RATE_TITLE_PREFIX, ""),
            );

        for row in block.select(&RATE_ROW) {
            rows.push(PriceRow {
                category: category.clone(),
                plan: rate_cell(row, &RATE_PLAN),
                kind: rate_cell(row, &RATE_TYPE),
                price: rate_cell(row, &RATE_PRICE),
            });
        }
    }
    rows
}

fn rate_cell(row: ElementRef<'_>, sel: &Selector) -> String {
    or_not_available(row.select(sel).next().map(stripped_text))
}

/// Rows formatted and joined with `" || "`. `None` when there are no rows.
#[must_use]
pub fn format_prices(rows: &[PriceRow]) -> Option<String> {
    if rows.is_empty() {
        return None;
    }
    Some(
        rows.iter()
            .map(PriceRow::formatted)
            .collect::<Vec<_>>()
            .join(" || "),
    )
}

#[must_use]
pub fn image_url(doc: &Html) -> Option<String> {
    doc.select(&GALLERY_IMAGE)
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(str::trim)
        .map(String::from)
        .and_then(non_empty)
}

/// Applies every field rule to a detail page snapshot.
#[must_use]
pub fn parse_detail(html: &str) -> DetailRecord {
    let doc = Html::parse_document(html);
    let metrics = basic_metrics(&doc);
    let prices = price_rows(&doc);
    tracing::debug!(count = prices.len(), "rate rows found");

    let record = DetailRecord {
        description: or_not_available(description(&doc)),
        website: or_not_available(website(&doc)),
        phone: or_not_available(phone(&doc)),
        address: or_not_available(address(&doc)),
        services_list: or_not_available(services(&doc)),
        detailed_prices: or_not_available(format_prices(&prices)),
        surface_area: or_not_available(metrics.surface_area),
        private_offices: or_not_available(metrics.private_offices),
        meeting_rooms_count: or_not_available(metrics.meeting_rooms_count),
        capacity: or_not_available(metrics.capacity),
        image_url: or_not_available(image_url(&doc)),
    };

    for (field, value) in record.fields() {
        if value == NOT_AVAILABLE {
            tracing::debug!(field, "not found");
        } else {
            tracing::debug!(field, value, "extracted");
        }
    }
    record
}

#[cfg(test)]
#[path = "fields_test.rs"]
mod tests;
