//! Best-effort dismissal of cookie/consent overlays.
//!
//! [`CONSENT_RULES`] is tried top to bottom. Site-specific buttons come first,
//! generic keyword matches last; the order decides which button wins when a
//! page carries several candidates.

use crate::driver::{pause, wait_for, Condition, PageDriver, Timings};
use crate::error::ScraperError;
use crate::locator::Locator;

/// One row of the consent rule table.
#[derive(Debug, Clone, Copy)]
pub struct ConsentRule {
    kind: fn(String) -> Locator,
    pub selector: &'static str,
    pub label: &'static str,
}

impl ConsentRule {
    #[must_use]
    pub fn locator(&self) -> Locator {
        (self.kind)(self.selector.to_string())
    }
}

const fn css(selector: &'static str, label: &'static str) -> ConsentRule {
    ConsentRule {
        kind: Locator::Css,
        selector,
        label,
    }
}

const fn xpath(selector: &'static str, label: &'static str) -> ConsentRule {
    ConsentRule {
        kind: Locator::XPath,
        selector,
        label,
    }
}

const fn id(selector: &'static str, label: &'static str) -> ConsentRule {
    ConsentRule {
        kind: Locator::Id,
        selector,
        label,
    }
}

pub const CONSENT_RULES: &[ConsentRule] = &[
    css("#sliding-popup #popup-buttons button.agree-button", "eu-cookie-compliance popup"),
    css("button.agree-button", "agree button"),
    xpath("//button[contains(., 'Acepto')]", "button 'Acepto'"),
    css("button.cky-btn.cky-btn-accept", "cookieyes accept"),
    id("hs-eu-confirmation-button", "hubspot confirmation"),
    xpath("//button[contains(., 'Aceptar todas')]", "button 'Aceptar todas'"),
    xpath("//button[contains(., 'Aceptar todo')]", "button 'Aceptar todo'"),
    xpath("//a[contains(., 'Aceptar todas')]", "link 'Aceptar todas'"),
    xpath("//a[contains(., 'Aceptar todo')]", "link 'Aceptar todo'"),
    xpath("//button[contains(., 'Accept All')]", "button 'Accept All'"),
    xpath("//button[contains(., 'Accept cookies')]", "button 'Accept cookies'"),
    xpath("//a[contains(., 'Accept All')]", "link 'Accept All'"),
    xpath("//a[contains(., 'Accept cookies')]", "link 'Accept cookies'"),
    xpath(
        "//button[contains(translate(text(), 'ABCDEFGHIJKLMNOPQRSTUVWXYZ', 'abcdefghijklmnopqrstuvwxyz'), 'aceptar')]",
        "button text ~ aceptar",
    ),
    xpath(
        "//button[contains(translate(text(), 'ABCDEFGHIJKLMNOPQRSTUVWXYZ', 'abcdefghijklmnopqrstuvwxyz'), 'cookies')]",
        "button text ~ cookies",
    ),
    css(r#"button[aria-label*="accept"]"#, "aria-label ~ accept"),
    css(r#"button[name*="accept"]"#, "name ~ accept"),
    css(r#"button[title*="accept"]"#, "title ~ accept"),
    xpath(
        "//button[contains(@class, 'cookie') and (contains(text(), 'Accept') or contains(text(), 'Aceptar'))]",
        "cookie-class button",
    ),
    css(r#"[id*="cookie"][id*="accept"]"#, "id ~ cookie+accept"),
    css(r#"[class*="cookie"][class*="accept"]"#, "class ~ cookie+accept"),
];

/// What [`dismiss`] ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsentOutcome {
    Clicked { label: &'static str },
    ClickedAfterEscape { label: &'static str },
    NotFound,
}

/// Tries to close a consent overlay on the current page. Never fails.
pub async fn dismiss<D: PageDriver>(driver: &mut D, timings: &Timings) -> ConsentOutcome {
    dismiss_with_rules(driver, timings, CONSENT_RULES).await
}

pub(crate) async fn dismiss_with_rules<D: PageDriver>(
    driver: &mut D,
    timings: &Timings,
    rules: &[ConsentRule],
) -> ConsentOutcome {
    tracing::info!("checking for cookie consent pop-up");
    pause(timings.consent_settle).await;

    for rule in rules {
        let locator = rule.locator();
        if wait_for(
            driver,
            Condition::Clickable(&locator),
            timings.consent_selector_wait,
            timings.poll_interval,
        )
        .await
        .is_err()
        {
            continue;
        }

        tracing::debug!(label = rule.label, %locator, "attempting consent click");
        match driver.click(&locator).await {
            Ok(()) => {
                tracing::info!(label = rule.label, "cookie consent accepted");
                pause(timings.after_click_pause).await;
                return ConsentOutcome::Clicked { label: rule.label };
            }
            Err(ScraperError::ClickIntercepted { .. }) => {
                tracing::info!(
                    label = rule.label,
                    "consent click intercepted, pressing Escape and retrying"
                );
                if retry_after_escape(driver, timings, &locator).await {
                    tracing::info!(label = rule.label, "cookie consent accepted after Escape");
                    pause(timings.after_click_pause).await;
                    return ConsentOutcome::ClickedAfterEscape { label: rule.label };
                }
            }
            Err(err) => {
                tracing::debug!(label = rule.label, error = %err, "consent click failed");
            }
        }
    }

    tracing::info!("no cookie consent button found, pressing Escape");
    if let Err(err) = driver.press_escape().await {
        tracing::debug!(error = %err, "fallback Escape failed");
    } else {
        pause(timings.after_click_pause).await;
    }
    ConsentOutcome::NotFound
}

async fn retry_after_escape<D: PageDriver>(
    driver: &mut D,
    timings: &Timings,
    locator: &Locator,
) -> bool {
    if let Err(err) = driver.press_escape().await {
        tracing::debug!(error = %err, "Escape keystroke failed");
        return false;
    }
    pause(timings.after_click_pause).await;

    if wait_for(
        driver,
        Condition::Clickable(locator),
        timings.consent_retry_wait,
        timings.poll_interval,
    )
    .await
    .is_err()
    {
        return false;
    }
    driver.click(locator).await.is_ok()
}

#[cfg(test)]
#[path = "consent_test.rs"]
mod tests;
