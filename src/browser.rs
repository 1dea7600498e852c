use crate::client::{LoginOutcome, PortalClient};
use crate::config::PortalConfig;
use crate::error::{PortalError, Result};
use crate::extract::extract_report;
use crate::models::{Credentials, GradeReport};
use chromiumoxide::Page;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::element::Element;
use futures::StreamExt;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Selectors tried in order to find the username input on a live page.
const USERNAME_SELECTORS: &[&str] = &[
    "input[type='text']",
    "input[type='email']",
    "input[name*='user']",
    "input[name*='login']",
];

const PASSWORD_SELECTOR: &str = "input[type='password']";

const SUBMIT_SELECTORS: &[&str] = &["button[type='submit']", "input[type='submit']", "form button"];

/// Extraction strategy of last resort: drive a real (headless) browser
/// through the login form and read the rendered DOM.
///
/// This path exists for portals whose forms are JavaScript-gated and
/// invisible to the static client. It owns a browser process, which must be
/// torn down on every exit path, success, failure, or timeout.
pub struct BrowserExtractor {
    config: PortalConfig,
}

impl BrowserExtractor {
    pub fn new(config: PortalConfig) -> Self {
        Self { config }
    }

    pub async fn fetch_grades(&self, credentials: &Credentials) -> Result<GradeReport> {
        let browser_config = BrowserConfig::builder()
            .request_timeout(self.config.request_timeout)
            .build()
            .map_err(PortalError::Browser)?;

        let (mut browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| PortalError::Browser(format!("failed to launch browser: {e}")))?;
        let handler_task = tokio::spawn(async move { while handler.next().await.is_some() {} });

        // Login, a handful of navigations, and a safety margin.
        let budget = self.config.request_timeout * (self.config.grade_paths.len() as u32 + 3);
        let result = match timeout(budget, self.drive(&browser, credentials)).await {
            Ok(result) => result,
            Err(_) => Err(PortalError::Browser(
                "browser navigation timed out".to_string(),
            )),
        };

        // Teardown runs regardless of how `drive` ended; leaking a browser
        // process across requests is a defect, not a tradeoff.
        if let Err(e) = browser.close().await {
            warn!(error = %e, "browser close failed");
        }
        browser.wait().await.ok();
        handler_task.abort();

        result
    }

    fn page_url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    async fn drive(&self, browser: &Browser, credentials: &Credentials) -> Result<GradeReport> {
        let page = browser
            .new_page(self.page_url(&self.config.login_path))
            .await
            .map_err(cdp)?;
        page.wait_for_navigation().await.map_err(cdp)?;

        let username_input = find_first(&page, USERNAME_SELECTORS)
            .await
            .ok_or_else(|| PortalError::Browser("no username input on login page".to_string()))?;
        username_input.click().await.map_err(cdp)?;
        username_input
            .type_str(&credentials.username)
            .await
            .map_err(cdp)?;

        let password_input = page
            .find_element(PASSWORD_SELECTOR)
            .await
            .map_err(|_| PortalError::Browser("no password input on login page".to_string()))?;
        password_input.click().await.map_err(cdp)?;
        password_input
            .type_str(credentials.password())
            .await
            .map_err(cdp)?;

        match find_first(&page, SUBMIT_SELECTORS).await {
            Some(button) => button.click().await.map(drop).map_err(cdp)?,
            None => password_input.press_key("Enter").await.map(drop).map_err(cdp)?,
        }
        page.wait_for_navigation().await.map_err(cdp)?;

        let post_login = page.content().await.map_err(cdp)?;
        if let LoginOutcome::Rejected(reason) = PortalClient::judge_login(&post_login) {
            return Err(PortalError::AuthFailed(reason));
        }

        for path in &self.config.grade_paths {
            if let Err(e) = page.goto(self.page_url(path)).await {
                debug!(path, error = %e, "browser navigation failed");
                continue;
            }
            page.wait_for_navigation().await.ok();
            let Ok(html) = page.content().await else {
                continue;
            };
            if let Some(report) = extract_report(&html, &credentials.username) {
                return Ok(report);
            }
        }

        Err(PortalError::ExtractionExhausted)
    }
}

async fn find_first(page: &Page, selectors: &[&str]) -> Option<Element> {
    for selector in selectors {
        if let Ok(element) = page.find_element(*selector).await {
            return Some(element);
        }
    }
    None
}

fn cdp(error: chromiumoxide::error::CdpError) -> PortalError {
    PortalError::Browser(error.to_string())
}
