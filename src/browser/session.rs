//! Chromium session lifecycle
//!
//! One browser and one page per crawl invocation. The CDP event handler runs
//! on a background task that is aborted during teardown; [`BrowserSession::close`]
//! must run on every exit path from a crawl so sessions never leak across
//! scheduled runs.

use crate::config::BrowserConfig;
use crate::{HarvestError, Result};
use chromiumoxide::browser::{Browser, BrowserConfig as ChromeConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// An exclusively-owned browser-automation session
pub struct BrowserSession {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
    navigation_timeout: Duration,
}

impl BrowserSession {
    /// Launches the browser and opens a single blank page
    pub async fn launch(config: &BrowserConfig) -> Result<Self> {
        let mut builder = ChromeConfig::builder()
            .window_size(1280, 900)
            .args(vec![
                "--lang=en-US",
                "--no-sandbox",
                "--disable-blink-features=AutomationControlled",
            ]);
        if !config.headless {
            builder = builder.with_head();
        }
        let chrome_config = builder
            .arg(format!("--user-agent={USER_AGENT}"))
            .build()
            .map_err(HarvestError::BrowserLaunch)?;

        let (browser, mut handler) = Browser::launch(chrome_config).await?;

        // The handler stream must be polled for the CDP connection to work.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser.new_page("about:blank").await?;

        tracing::debug!("Browser launched (headless={})", config.headless);

        Ok(Self {
            browser,
            page,
            handler_task,
            navigation_timeout: Duration::from_millis(config.navigation_timeout_ms),
        })
    }

    /// Navigates to `url` and waits for the load to settle, bounded by the
    /// configured navigation timeout
    pub async fn goto(&self, url: &str) -> Result<()> {
        let navigation = async {
            self.page.goto(url).await?;
            self.page.wait_for_navigation().await?;
            Ok::<(), chromiumoxide::error::CdpError>(())
        };

        match tokio::time::timeout(self.navigation_timeout, navigation).await {
            Ok(result) => {
                result?;
                Ok(())
            }
            Err(_) => Err(HarvestError::NavigationTimeout {
                url: url.to_string(),
            }),
        }
    }

    /// Waits for an in-flight navigation (e.g. after a form submit)
    pub async fn wait_for_navigation(&self) -> Result<()> {
        match tokio::time::timeout(self.navigation_timeout, self.page.wait_for_navigation()).await {
            Ok(result) => {
                result?;
                Ok(())
            }
            Err(_) => Err(HarvestError::NavigationTimeout {
                url: self.current_url().await.unwrap_or_default(),
            }),
        }
    }

    /// Returns an HTML snapshot of the current page
    pub async fn html(&self) -> Result<String> {
        Ok(self.page.content().await?)
    }

    /// Scrolls down one viewport-fraction to trigger lazy-loaded content
    pub async fn scroll_page_fraction(&self) -> Result<()> {
        self.page
            .evaluate("window.scrollBy(0, document.body.scrollHeight / 3)")
            .await?;
        Ok(())
    }

    /// Types `text` into the first element matching `selector`
    pub async fn type_into(&self, selector: &str, text: &str) -> Result<()> {
        let element = self.page.find_element(selector).await?;
        element.click().await?;
        element.type_str(text).await?;
        Ok(())
    }

    /// Clicks the first element matching `selector`
    pub async fn click(&self, selector: &str) -> Result<()> {
        self.page.find_element(selector).await?.click().await?;
        Ok(())
    }

    /// The current page URL, if any
    pub async fn current_url(&self) -> Result<String> {
        Ok(self.page.url().await?.unwrap_or_default())
    }

    /// Gracefully closes the browser and stops the CDP handler task
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            tracing::warn!("Error during browser shutdown: {}", e);
        }
        let _ = self.browser.wait().await;
        self.handler_task.abort();
        tracing::debug!("Browser closed.");
    }
}
