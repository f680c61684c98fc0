//! [`PageDriver`] backed by a headless Chromium over the DevTools protocol.

use std::path::PathBuf;
use std::time::Duration;

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::input::{DispatchKeyEventParams, DispatchKeyEventType};
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::Page;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use tokio::task::JoinHandle;

use crate::driver::PageDriver;
use crate::error::ScraperError;
use crate::locator::Locator;

/// Launch settings for [`ChromeSession`].
#[derive(Debug, Clone)]
pub struct ChromeOptions {
    pub headless: bool,
    pub window_width: u32,
    pub window_height: u32,
    pub user_agent: String,
    pub chrome_executable: Option<PathBuf>,
    pub page_load_timeout: Duration,
}

impl ChromeOptions {
    #[must_use]
    pub fn from_config(config: &cowork_core::AppConfig) -> Self {
        Self {
            headless: config.headless,
            window_width: config.window_width,
            window_height: config.window_height,
            user_agent: config.user_agent.clone(),
            chrome_executable: config.chrome_executable.clone(),
            page_load_timeout: Duration::from_secs(config.page_load_timeout_secs),
        }
    }
}

/// One browser process with a single working tab.
pub struct ChromeSession {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
    page_load_timeout: Duration,
    closed: bool,
}

impl ChromeSession {
    /// Launches Chromium and opens a blank tab.
    ///
    /// The sandbox is disabled and `/dev/shm` usage is turned off so the
    /// browser runs inside containers.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Launch`] if the launch config is rejected, or
    /// [`ScraperError::Cdp`] if the process cannot be started or the tab
    /// cannot be opened.
    pub async fn launch(options: &ChromeOptions) -> Result<Self, ScraperError> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .window_size(options.window_width, options.window_height)
            .arg("--disable-dev-shm-usage")
            .arg(format!("--user-agent={}", options.user_agent));
        if !options.headless {
            builder = builder.with_head();
        }
        if let Some(path) = &options.chrome_executable {
            builder = builder.chrome_executable(path);
        }
        let config = builder.build().map_err(ScraperError::Launch)?;

        let (browser, mut handler) = Browser::launch(config).await?;
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(err) = event {
                    tracing::debug!(error = %err, "cdp handler event error");
                }
            }
        });

        let page = browser.new_page("about:blank").await?;
        tracing::info!(
            headless = options.headless,
            width = options.window_width,
            height = options.window_height,
            "browser launched"
        );

        Ok(Self {
            browser,
            page,
            handler_task,
            page_load_timeout: options.page_load_timeout,
            closed: false,
        })
    }

    async fn run_script(&self, script: String) -> Result<(), ScraperError> {
        self.page.evaluate_expression(expression(script)).await?;
        Ok(())
    }

    async fn eval<T: DeserializeOwned>(&self, script: String) -> Result<T, ScraperError> {
        let result = self.page.evaluate_expression(expression(script)).await?;
        result
            .into_value::<T>()
            .map_err(|e| ScraperError::Script {
                reason: e.to_string(),
            })
    }
}

fn expression(script: String) -> EvaluateParams {
    let mut params = EvaluateParams::new(script);
    params.return_by_value = Some(true);
    params
}

fn visibility_script(locator: &Locator, require_enabled: bool) -> String {
    let enabled_check = if require_enabled { " && !el.disabled" } else { "" };
    format!(
        "(function() {{ const el = {first}; if (!el) return false; \
         const s = window.getComputedStyle(el); const r = el.getBoundingClientRect(); \
         return s.display !== 'none' && s.visibility !== 'hidden' \
         && r.width > 0 && r.height > 0{enabled_check}; }})()",
        first = locator.js_first(),
    )
}

fn click_script(locator: &Locator) -> String {
    format!(
        "(function() {{ const el = {first}; if (!el) return 'missing'; \
         try {{ el.click(); }} catch (e) {{ return 'refused'; }} \
         return 'clicked'; }})()",
        first = locator.js_first(),
    )
}

/// Key down and key up for Escape, dispatched to the page without focusing
/// any element first.
fn escape_key_events() -> Result<[DispatchKeyEventParams; 2], ScraperError> {
    let event = |kind: DispatchKeyEventType| {
        DispatchKeyEventParams::builder()
            .r#type(kind)
            .key("Escape")
            .code("Escape")
            .windows_virtual_key_code(27)
            .native_virtual_key_code(27)
            .build()
            .map_err(|reason| ScraperError::Script { reason })
    };
    Ok([
        event(DispatchKeyEventType::KeyDown)?,
        event(DispatchKeyEventType::KeyUp)?,
    ])
}

impl PageDriver for ChromeSession {
    async fn navigate(&mut self, url: &str) -> Result<(), ScraperError> {
        match tokio::time::timeout(self.page_load_timeout, self.page.goto(url)).await {
            Ok(result) => {
                result?;
                Ok(())
            }
            Err(_) => Err(ScraperError::Timeout {
                what: format!("page load of {url}"),
                waited_ms: u64::try_from(self.page_load_timeout.as_millis()).unwrap_or(u64::MAX),
            }),
        }
    }

    async fn page_source(&mut self) -> Result<String, ScraperError> {
        Ok(self.page.content().await?)
    }

    async fn count(&mut self, locator: &Locator) -> Result<usize, ScraperError> {
        self.eval(format!("{}.length", locator.js_all())).await
    }

    async fn is_displayed(&mut self, locator: &Locator) -> Result<bool, ScraperError> {
        self.eval(visibility_script(locator, false)).await
    }

    async fn is_clickable(&mut self, locator: &Locator) -> Result<bool, ScraperError> {
        self.eval(visibility_script(locator, true)).await
    }

    async fn click(&mut self, locator: &Locator) -> Result<(), ScraperError> {
        let outcome: String = self.eval(click_script(locator)).await?;
        match outcome.as_str() {
            "clicked" => Ok(()),
            "refused" => Err(ScraperError::ClickIntercepted {
                locator: locator.to_string(),
            }),
            _ => Err(ScraperError::NoSuchElement {
                locator: locator.to_string(),
            }),
        }
    }

    async fn press_escape(&mut self) -> Result<(), ScraperError> {
        for event in escape_key_events()? {
            self.page.execute(event).await?;
        }
        Ok(())
    }

    async fn scroll_to_bottom(&mut self) -> Result<(), ScraperError> {
        self.run_script("window.scrollTo(0, document.body.scrollHeight)".to_string())
            .await
    }

    async fn scroll_height(&mut self) -> Result<u64, ScraperError> {
        self.eval("document.body.scrollHeight".to_string()).await
    }

    async fn close(&mut self) -> Result<(), ScraperError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let close_result = self.browser.close().await;
        if let Err(err) = self.browser.wait().await {
            tracing::warn!(error = %err, "failed waiting for browser process to exit");
        }
        self.handler_task.abort();
        close_result?;
        tracing::info!("browser closed");
        Ok(())
    }
}

impl Drop for ChromeSession {
    fn drop(&mut self) {
        if !self.closed {
            self.handler_task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn click_script_clicks_without_hit_testing() {
        let js = click_script(&Locator::xpath("//a[contains(text(), 'Mostrar más')]"));

        assert!(js.contains("el.click()"), "{js}");
        assert!(!js.contains("elementFromPoint"), "{js}");
        assert!(js.contains("'refused'"), "{js}");
    }

    #[test]
    fn escape_is_a_key_down_then_key_up() {
        let [down, up] = escape_key_events().unwrap();

        assert_eq!(down.r#type, DispatchKeyEventType::KeyDown);
        assert_eq!(up.r#type, DispatchKeyEventType::KeyUp);
        assert_eq!(down.key.as_deref(), Some("Escape"));
        assert_eq!(up.key.as_deref(), Some("Escape"));
        assert_eq!(down.windows_virtual_key_code, Some(27));
    }
}
