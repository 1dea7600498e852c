use crate::config::{DEFAULT_USER_AGENT, PortalConfig};
use crate::error::{PortalError, Result};
use crate::models::{Credentials, LoginForm};
use reqwest::StatusCode;
use reqwest::cookie::Jar;
use reqwest::header::{HeaderMap, HeaderValue, REFERER, USER_AGENT};
use scraper::{Html, Selector};
use std::sync::Arc;
use tracing::debug;

/// Markers whose presence on the post-login page means we are looking at an
/// authenticated area.
const SUCCESS_MARKERS: &[&str] = &[
    "a[href*=\"logout\"]",
    "a[href*=\"dashboard\"]",
    "a[href*=\"student\"]",
    "form[action*=\"logout\"]",
];

/// Conventional error/alert elements a failed login renders.
const ERROR_MARKERS: &[&str] = &[
    ".alert-danger",
    ".invalid-feedback",
    ".error",
    "[class*=\"login-error\"]",
];

/// What the post-login markup says about whether the login worked.
///
/// The judgment is heuristic: the portal's markup is not contractually
/// known, so `Indeterminate` is a real outcome and callers proceed
/// optimistically on it rather than guessing either way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Authenticated,
    /// The portal rendered an explicit error; the payload is its text.
    Rejected(String),
    Indeterminate,
}

/// HTTP session against the portal for exactly one authenticate+extract
/// attempt.
///
/// All requests share one cookie jar so that cookies set while fetching the
/// login page and during the login POST are carried into the protected
/// resource GETs. A client is never reused across attempts or chats; each
/// retry constructs a fresh one so a poisoned half-authenticated cookie
/// state cannot leak forward.
pub struct PortalClient {
    http: reqwest::Client,
    config: PortalConfig,
}

impl PortalClient {
    pub fn new(config: &PortalConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            config
                .user_agent
                .parse()
                .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_USER_AGENT)),
        );

        let http = reqwest::Client::builder()
            .cookie_provider(Arc::new(Jar::default()))
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            http,
            config: config.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    /// Retrieves the login form markup, establishing any pre-login cookies.
    pub async fn fetch_login_page(&self) -> Result<String> {
        let response = self
            .http
            .get(self.url(&self.config.login_path))
            .send()
            .await?
            .error_for_status()?;
        Ok(response.text().await?)
    }

    /// Posts credentials using the discovered field names and returns the
    /// resulting markup. Does not itself judge whether the login worked;
    /// see [`PortalClient::judge_login`].
    pub async fn submit_login(
        &self,
        form: &LoginForm,
        credentials: &Credentials,
    ) -> Result<String> {
        let login_url = self.url(&self.config.login_path);
        debug!(
            username_field = %form.username_field,
            has_token = form.token_value.is_some(),
            "submitting login form"
        );

        let response = self
            .http
            .post(&login_url)
            .header(REFERER, &login_url)
            .form(&form.form_params(credentials))
            .send()
            .await?;

        if matches!(
            response.status(),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            return Err(PortalError::AuthFailed(
                "the portal refused the credentials".to_string(),
            ));
        }

        let response = response.error_for_status()?;
        Ok(response.text().await?)
    }

    /// Fetches a page that requires the authenticated session.
    pub async fn fetch_protected(&self, path: &str) -> Result<String> {
        let response = self.http.get(self.url(path)).send().await?;
        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(PortalError::Forbidden(path.to_string()))
            }
            _ => {
                let response = response.error_for_status()?;
                Ok(response.text().await?)
            }
        }
    }

    /// Judges login success from post-login markup.
    ///
    /// Success markers win over error markers; an error marker only counts
    /// when it actually carries text, since many templates ship empty alert
    /// placeholders. Neither marker present yields `Indeterminate`.
    pub fn judge_login(html: &str) -> LoginOutcome {
        let document = Html::parse_document(html);

        for marker in SUCCESS_MARKERS {
            let selector = Selector::parse(marker).unwrap();
            if document.select(&selector).next().is_some() {
                return LoginOutcome::Authenticated;
            }
        }

        for marker in ERROR_MARKERS {
            let selector = Selector::parse(marker).unwrap();
            for element in document.select(&selector) {
                let text = element
                    .text()
                    .collect::<String>()
                    .split_whitespace()
                    .collect::<Vec<_>>()
                    .join(" ");
                if !text.is_empty() {
                    return LoginOutcome::Rejected(text);
                }
            }
        }

        LoginOutcome::Indeterminate
    }
}
