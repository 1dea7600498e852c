use std::env;
use std::time::Duration;

/// User agent presented on every portal request. Some portals answer scripted
/// clients with a stripped-down page, so we look like a desktop browser.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/100.0.0.0 Safari/537.36";

/// Where the portal lives and how to talk to it.
///
/// None of these values are contractually stable on the portal side; the
/// defaults mirror the deployment this crate was written against and every
/// one of them can be overridden through the environment.
#[derive(Debug, Clone)]
pub struct PortalConfig {
    /// Scheme + host, no trailing slash.
    pub base_url: String,
    /// Path of the HTML login form.
    pub login_path: String,
    /// Candidate paths for the results page, tried in order.
    pub grade_paths: Vec<String>,
    /// Fallback page queried when no grade path yields data.
    pub dashboard_path: String,
    /// Per-request timeout. Bounded; retries are handled above this layer.
    pub request_timeout: Duration,
    pub user_agent: String,
    /// Whether the rendered-browser extractor may run when the static
    /// fetch-and-parse path fails.
    pub browser_fallback: bool,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: "https://portal.ju.edu.et".to_string(),
            login_path: "/login".to_string(),
            grade_paths: [
                "/student/grade",
                "/student/grades",
                "/student/transcript",
                "/grades",
                "/transcript",
                "/student/academic-record",
            ]
            .iter()
            .map(|p| p.to_string())
            .collect(),
            dashboard_path: "/student/dashboard".to_string(),
            request_timeout: Duration::from_secs(30),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            browser_fallback: true,
        }
    }
}

impl PortalConfig {
    /// Builds a config from the environment, falling back to the defaults.
    ///
    /// Recognized variables: `PORTAL_BASE_URL`, `PORTAL_LOGIN_PATH`,
    /// `PORTAL_TIMEOUT_SECS`, `PORTAL_BROWSER_FALLBACK`. Credentials are
    /// never read from the environment.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = Self::default();
        if let Ok(base_url) = env::var("PORTAL_BASE_URL") {
            config.base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Ok(login_path) = env::var("PORTAL_LOGIN_PATH") {
            config.login_path = login_path;
        }
        if let Ok(secs) = env::var("PORTAL_TIMEOUT_SECS") {
            if let Ok(secs) = secs.parse::<u64>() {
                config.request_timeout = Duration::from_secs(secs);
            }
        }
        if let Ok(flag) = env::var("PORTAL_BROWSER_FALLBACK") {
            config.browser_fallback = !matches!(flag.as_str(), "0" | "false" | "off");
        }
        config
    }
}

/// Retry policy for one orchestrated fetch.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Extra end-to-end attempts after the first one.
    pub max_retries: u32,
    /// Fixed delay between attempts. The remote fails transiently rather
    /// than under load, so there is no exponential growth.
    pub backoff: Duration,
    /// Upper bound of the uniform random jitter added to each backoff, so
    /// that many chats retrying at once do not hit the portal in lockstep.
    pub jitter: Duration,
    /// Wall-clock bound on a single attempt, including the browser path.
    pub attempt_timeout: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            backoff: Duration::from_secs(2),
            jitter: Duration::from_millis(500),
            attempt_timeout: Duration::from_secs(120),
        }
    }
}
