//! Row types produced by the two scraping stages.
//!
//! Every field is a plain string. A value that could not be found is stored as
//! [`NOT_AVAILABLE`] rather than left empty, so every exported row carries the
//! same columns.

use serde::{Deserialize, Serialize};

/// Sentinel meaning "field not found".
pub const NOT_AVAILABLE: &str = "N/A";

/// Returns `true` unless `value` is the sentinel.
#[must_use]
pub fn is_available(value: &str) -> bool {
    value != NOT_AVAILABLE
}

/// Collapses `None` and blank strings to the sentinel.
#[must_use]
pub fn or_not_available(value: Option<String>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// One row of the directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingEntry {
    #[serde(rename = "Name")]
    pub name: String,
    /// Absolute URL of the detail page, or the sentinel.
    #[serde(rename = "Link")]
    pub link: String,
}

impl ListingEntry {
    #[must_use]
    pub fn new(name: Option<String>, link: Option<String>) -> Self {
        Self {
            name: or_not_available(name),
            link: or_not_available(link),
        }
    }

    #[must_use]
    pub fn has_link(&self) -> bool {
        is_available(&self.link)
    }
}

/// Attributes extracted from a single detail page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailRecord {
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Website")]
    pub website: String,
    #[serde(rename = "Phone")]
    pub phone: String,
    #[serde(rename = "Address")]
    pub address: String,
    /// Service names joined with `"; "`.
    #[serde(rename = "Services_List")]
    pub services_list: String,
    /// Formatted rate rows joined with `" || "`.
    #[serde(rename = "Detailed_Prices")]
    pub detailed_prices: String,
    #[serde(rename = "Surface_Area")]
    pub surface_area: String,
    #[serde(rename = "Private_Offices")]
    pub private_offices: String,
    #[serde(rename = "Meeting_Rooms_Count")]
    pub meeting_rooms_count: String,
    #[serde(rename = "Capacity")]
    pub capacity: String,
    #[serde(rename = "Image_URL")]
    pub image_url: String,
}

impl Default for DetailRecord {
    fn default() -> Self {
        let na = || NOT_AVAILABLE.to_string();
        Self {
            description: na(),
            website: na(),
            phone: na(),
            address: na(),
            services_list: na(),
            detailed_prices: na(),
            surface_area: na(),
            private_offices: na(),
            meeting_rooms_count: na(),
            capacity: na(),
            image_url: na(),
        }
    }
}

impl DetailRecord {
    /// Column name and value pairs in export order.
    #[must_use]
    pub fn fields(&self) -> [(&'static str, &str); 11] {
        [
            ("Description", &self.description),
            ("Website", &self.website),
            ("Phone", &self.phone),
            ("Address", &self.address),
            ("Services_List", &self.services_list),
            ("Detailed_Prices", &self.detailed_prices),
            ("Surface_Area", &self.surface_area),
            ("Private_Offices", &self.private_offices),
            ("Meeting_Rooms_Count", &self.meeting_rooms_count),
            ("Capacity", &self.capacity),
            ("Image_URL", &self.image_url),
        ]
    }

    /// Number of fields holding something other than the sentinel.
    #[must_use]
    pub fn found_count(&self) -> usize {
        self.fields()
            .iter()
            .filter(|(_, value)| is_available(value))
            .count()
    }

    /// `true` when every field is either non-empty or exactly the sentinel.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.fields()
            .iter()
            .all(|(_, value)| !value.trim().is_empty())
    }
}

/// The unit written to the output table: a listing entry plus its details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CombinedRecord {
    #[serde(flatten)]
    pub entry: ListingEntry,
    #[serde(flatten)]
    pub details: DetailRecord,
}

impl CombinedRecord {
    #[must_use]
    pub fn new(entry: ListingEntry, details: DetailRecord) -> Self {
        Self { entry, details }
    }

    /// An entry whose detail page was never visited.
    #[must_use]
    pub fn pass_through(entry: ListingEntry) -> Self {
        Self {
            entry,
            details: DetailRecord::default(),
        }
    }
}
