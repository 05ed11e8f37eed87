use crate::actions::{BrowserActions, BrowserSession, ControlState, SessionLauncher};
use crate::error::{BrowserError, Result};
use crate::fingerprint::{FingerprintConfig, STEALTH_SCRIPT};
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams;
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::Page;
use futures_util::stream::StreamExt;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use storefront_core::BrowserSettings;
use tokio::task::JoinHandle;

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Launches headless Chrome sessions.
#[derive(Debug, Clone, Default)]
pub struct BrowserEngine {
    executable: Option<PathBuf>,
}

impl BrowserEngine {
    /// Create an engine that locates Chrome on the system
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine that runs a specific Chrome binary
    pub fn with_executable(path: impl Into<PathBuf>) -> Self {
        Self {
            executable: Some(path.into()),
        }
    }

    fn browser_config(
        &self,
        settings: &BrowserSettings,
        fingerprint: &FingerprintConfig,
    ) -> Result<BrowserConfig> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .window_size(fingerprint.viewport_width, fingerprint.viewport_height)
            .viewport(Viewport {
                width: fingerprint.viewport_width,
                height: fingerprint.viewport_height,
                ..Viewport::default()
            })
            .request_timeout(Duration::from_millis(settings.request_timeout_ms))
            .args(fingerprint.launch_args());

        if !settings.headless {
            builder = builder.with_head();
        }
        if let Some(path) = &self.executable {
            builder = builder.chrome_executable(path);
        }

        builder.build().map_err(BrowserError::ChromiumError)
    }
}

#[async_trait::async_trait]
impl SessionLauncher for BrowserEngine {
    type Session = ChromeSession;

    async fn launch(&self, settings: &BrowserSettings) -> Result<ChromeSession> {
        let fingerprint = FingerprintConfig::from_settings(settings);
        let config = self.browser_config(settings, &fingerprint)?;

        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;

        // Spawn browser handler
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("browser handler stopped: {}", e);
                    break;
                }
            }
        });

        let page = match open_page(&browser, &fingerprint).await {
            Ok(page) => page,
            Err(e) => {
                let _ = browser.close().await;
                handler.abort();
                return Err(e);
            }
        };

        tracing::debug!(
            user_agent = %fingerprint.user_agent,
            headless = settings.headless,
            "browser session started"
        );

        Ok(ChromeSession {
            browser,
            page,
            handler: Some(handler),
            navigation_timeout: Duration::from_millis(settings.navigation_timeout_ms),
        })
    }
}

async fn open_page(browser: &Browser, fingerprint: &FingerprintConfig) -> Result<Page> {
    let page = browser
        .new_page("about:blank")
        .await
        .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;

    page.set_user_agent(SetUserAgentOverrideParams::new(fingerprint.user_agent.clone()))
        .await
        .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;

    if fingerprint.stealth {
        page.evaluate_on_new_document(AddScriptToEvaluateOnNewDocumentParams::new(
            STEALTH_SCRIPT,
        ))
        .await
        .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;
    }

    Ok(page)
}

/// One Chrome process with a single open page.
pub struct ChromeSession {
    browser: Browser,
    page: Page,
    handler: Option<JoinHandle<()>>,
    navigation_timeout: Duration,
}

#[derive(Deserialize)]
struct ControlSnapshot {
    found: bool,
    class: String,
    disabled: bool,
}

impl ChromeSession {
    fn ensure_open(&self) -> Result<()> {
        if self.handler.is_none() {
            return Err(BrowserError::SessionClosed);
        }
        Ok(())
    }

    async fn eval<T: DeserializeOwned>(&self, script: String) -> Result<T> {
        self.ensure_open()?;
        self.page
            .evaluate(script)
            .await
            .map_err(|e| BrowserError::ScriptError(e.to_string()))?
            .into_value()
            .map_err(|e| BrowserError::ScriptError(e.to_string()))
    }

    async fn poll_until<F, Fut>(&self, timeout_ms: u64, what: &str, mut check: F) -> Result<()>
    where
        F: FnMut() -> Fut + Send,
        Fut: std::future::Future<Output = Result<bool>> + Send,
    {
        let poll = async {
            loop {
                match check().await {
                    Ok(true) => return,
                    Ok(false) => {}
                    Err(e) => tracing::trace!("poll for {} failed: {}", what, e),
                }
                tokio::time::sleep(POLL_INTERVAL).await;
            }
        };

        tokio::time::timeout(Duration::from_millis(timeout_ms), poll)
            .await
            .map_err(|_| BrowserError::Timeout(format!("{what} after {timeout_ms}ms")))
    }
}

fn js_string(selector: &str) -> Result<String> {
    serde_json::to_string(selector).map_err(|e| BrowserError::ScriptError(e.to_string()))
}

#[async_trait::async_trait]
impl BrowserActions for ChromeSession {
    async fn navigate(&self, url: &str) -> Result<()> {
        self.ensure_open()?;
        tracing::debug!("navigating to {}", url);

        match tokio::time::timeout(self.navigation_timeout, self.page.goto(url)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(BrowserError::NavigationError(format!("{url}: {e}"))),
            Err(_) => Err(BrowserError::Timeout(format!(
                "navigating to {url} after {}ms",
                self.navigation_timeout.as_millis()
            ))),
        }
    }

    async fn wait_for_selector(&self, selector: &str, timeout_ms: u64) -> Result<()> {
        self.ensure_open()?;
        self.poll_until(timeout_ms, &format!("waiting for {selector}"), || async {
            Ok::<_, BrowserError>(self.count(selector).await? > 0)
        })
        .await
    }

    async fn count(&self, selector: &str) -> Result<usize> {
        let script = format!(
            "document.querySelectorAll({}).length",
            js_string(selector)?
        );
        self.eval(script).await
    }

    async fn control_state(&self, selector: &str) -> Result<Option<ControlState>> {
        let script = format!(
            r"(() => {{
                const el = document.querySelector({});
                if (!el) {{ return {{ found: false, class: '', disabled: false }}; }}
                return {{
                    found: true,
                    class: el.getAttribute('class') || '',
                    disabled: el.disabled === true || el.getAttribute('aria-disabled') === 'true',
                }};
            }})()",
            js_string(selector)?
        );
        let snapshot: ControlSnapshot = self.eval(script).await?;
        Ok(snapshot.found.then_some(ControlState {
            class: snapshot.class,
            disabled: snapshot.disabled,
        }))
    }

    async fn click(&self, selector: &str) -> Result<()> {
        self.ensure_open()?;
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|_| BrowserError::SelectorNotFound(selector.to_string()))?;

        element
            .scroll_into_view()
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;
        element
            .click()
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;
        Ok(())
    }

    async fn wait_for_load(&self, timeout_ms: u64) -> Result<()> {
        self.ensure_open()?;
        self.poll_until(timeout_ms, "waiting for document", || async {
            let state: String = self.eval("document.readyState".to_string()).await?;
            Ok::<_, BrowserError>(state != "loading")
        })
        .await
    }

    async fn scroll_to_bottom(&self) -> Result<()> {
        let _: serde_json::Value = self
            .eval("window.scrollTo(0, document.body.scrollHeight); true".to_string())
            .await?;
        Ok(())
    }

    async fn content(&self) -> Result<String> {
        self.ensure_open()?;
        self.page
            .content()
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))
    }
}

#[async_trait::async_trait]
impl BrowserSession for ChromeSession {
    async fn close(&mut self) -> Result<()> {
        let Some(handler) = self.handler.take() else {
            return Ok(());
        };

        if let Err(e) = self.page.clone().close().await {
            tracing::debug!("page close failed: {}", e);
        }

        let result = self
            .browser
            .close()
            .await
            .map(|_| ())
            .map_err(|e| BrowserError::ChromiumError(e.to_string()));

        if let Err(e) = self.browser.wait().await {
            tracing::debug!("waiting for browser exit failed: {}", e);
        }
        handler.abort();
        tracing::debug!("browser session closed");
        result
    }
}

impl Drop for ChromeSession {
    fn drop(&mut self) {
        if let Some(handler) = self.handler.take() {
            tracing::warn!("browser session dropped without close");
            handler.abort();
        }
    }
}
