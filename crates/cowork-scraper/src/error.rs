use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("browser protocol error: {0}")]
    Cdp(#[from] chromiumoxide::error::CdpError),

    #[error("failed to launch browser: {0}")]
    Launch(String),

    #[error("timed out after {waited_ms}ms waiting for {what}")]
    Timeout { what: String, waited_ms: u64 },

    #[error("no element matches {locator}")]
    NoSuchElement { locator: String },

    #[error("click on {locator} was rejected by the page")]
    ClickIntercepted { locator: String },

    #[error("page script failed: {reason}")]
    Script { reason: String },

    #[error("invalid URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl ScraperError {
    /// Timeouts and missing elements mean "the page does not have it (yet)"
    /// rather than a broken session.
    #[must_use]
    pub fn is_absence(&self) -> bool {
        matches!(
            self,
            ScraperError::Timeout { .. } | ScraperError::NoSuchElement { .. }
        )
    }
}
