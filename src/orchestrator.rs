use crate::browser::BrowserExtractor;
use crate::client::{LoginOutcome, PortalClient};
use crate::config::{PortalConfig, RetryConfig};
use crate::error::{PortalError, Result};
use crate::extract::extract_report;
use crate::models::{Credentials, GradeReport};
use crate::parsers::{grades, login_form};
use async_trait::async_trait;
use rand::Rng;
use scraper::Html;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

/// Anything that can turn credentials into a grade report.
///
/// The conversation layer depends on this seam rather than on the concrete
/// orchestrator, so it can be exercised without a portal.
#[async_trait]
pub trait GradeFetcher: Send + Sync {
    async fn fetch_grades(&self, credentials: &Credentials) -> Result<GradeReport>;
}

/// Wraps one full authenticate+extract attempt with bounded retries.
///
/// Every attempt is end-to-end: a fresh [`PortalClient`] (fresh cookie jar),
/// fresh login-form discovery, fresh login, fresh extraction. Failures of any
/// kind count as that attempt's failure; the last attempt's error is the one
/// surfaced. Credentials pass through unmodified; erasing them is the
/// conversation layer's job.
pub struct Orchestrator {
    portal: PortalConfig,
    retry: RetryConfig,
}

impl Orchestrator {
    pub fn new(portal: PortalConfig, retry: RetryConfig) -> Self {
        Self { portal, retry }
    }

    fn backoff_delay(&self) -> Duration {
        let jitter_ms = self.retry.jitter.as_millis() as u64;
        let jitter = if jitter_ms == 0 {
            0
        } else {
            rand::rng().random_range(0..=jitter_ms)
        };
        self.retry.backoff + Duration::from_millis(jitter)
    }

    async fn attempt(&self, credentials: &Credentials) -> Result<GradeReport> {
        match self.static_attempt(credentials).await {
            Ok(report) => Ok(report),
            Err(err) if self.portal.browser_fallback => {
                warn!(error = %err, "static extraction failed, trying rendered browser");
                match BrowserExtractor::new(self.portal.clone())
                    .fetch_grades(credentials)
                    .await
                {
                    Ok(report) => Ok(report),
                    // A credential rejection seen over plain HTTP is more
                    // actionable than whatever the browser failed with later.
                    Err(_) if err.is_auth_failure() => Err(err),
                    Err(browser_err) => Err(browser_err),
                }
            }
            Err(err) => Err(err),
        }
    }

    /// The static fetch-and-parse pipeline: login, then walk the candidate
    /// grade paths, then fall back to a dashboard summary.
    async fn static_attempt(&self, credentials: &Credentials) -> Result<GradeReport> {
        let client = PortalClient::new(&self.portal)?;

        let login_page = client.fetch_login_page().await?;
        let form = login_form::discover_login_form(&login_page);

        let post_login = client.submit_login(&form, credentials).await?;
        match PortalClient::judge_login(&post_login) {
            LoginOutcome::Authenticated => debug!("authenticated-area marker found"),
            LoginOutcome::Rejected(reason) => return Err(PortalError::AuthFailed(reason)),
            // Neither marker present: proceed optimistically and let the
            // protected fetches settle it.
            LoginOutcome::Indeterminate => debug!("login outcome indeterminate, proceeding"),
        }

        let mut denied = None;
        for path in &self.portal.grade_paths {
            match client.fetch_protected(path).await {
                Ok(html) => {
                    if let Some(report) = extract_report(&html, &credentials.username) {
                        info!(path, courses = report.courses.len(), "grade data extracted");
                        return Ok(report);
                    }
                    debug!(path, "page fetched but no strategy matched");
                }
                Err(err @ PortalError::Forbidden(_)) => {
                    debug!(path, "access denied");
                    denied = Some(err);
                }
                Err(err) => debug!(path, error = %err, "grade path fetch failed"),
            }
        }

        if let Ok(html) = client.fetch_protected(&self.portal.dashboard_path).await {
            info!("no grade path matched, building dashboard summary");
            let document = Html::parse_document(&html);
            return Ok(grades::dashboard_report(&document, &credentials.username));
        }

        // Consistent 401/403s are an authorization problem, not a parsing one.
        Err(denied.unwrap_or(PortalError::ExtractionExhausted))
    }
}

#[async_trait]
impl GradeFetcher for Orchestrator {
    async fn fetch_grades(&self, credentials: &Credentials) -> Result<GradeReport> {
        let mut last_err = None;

        for attempt_no in 0..=self.retry.max_retries {
            if attempt_no > 0 {
                let delay = self.backoff_delay();
                debug!(attempt = attempt_no + 1, ?delay, "backing off before retry");
                sleep(delay).await;
            }

            match timeout(self.retry.attempt_timeout, self.attempt(credentials)).await {
                Ok(Ok(report)) => return Ok(report),
                Ok(Err(err)) => {
                    warn!(attempt = attempt_no + 1, error = %err, "attempt failed");
                    last_err = Some(err);
                }
                Err(_) => {
                    warn!(attempt = attempt_no + 1, "attempt exceeded wall-clock budget");
                    last_err = Some(PortalError::AttemptTimeout(self.retry.attempt_timeout));
                }
            }
        }

        Err(last_err.unwrap_or(PortalError::ExtractionExhausted))
    }
}
