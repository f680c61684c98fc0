pub mod chrome;
pub mod consent;
pub mod detail;
pub mod driver;
pub mod error;
#[cfg(any(test, feature = "test-utils"))]
pub mod fake;
pub mod fields;
pub mod listing;
pub mod locator;

pub use chrome::{ChromeOptions, ChromeSession};
pub use consent::{ConsentOutcome, CONSENT_RULES};
pub use detail::extract;
pub use driver::{PageDriver, Timings};
pub use error::ScraperError;
pub use fields::parse_detail;
pub use listing::{collect, collect_with_stats, parse_listing, ListingOptions, ListingStats};
pub use locator::Locator;
