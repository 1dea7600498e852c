// Module layout: pure HTML->data functions live under parsers/, everything
// that owns I/O or state sits beside them.
mod browser;
mod client;
mod config;
mod conversation;
mod error;
mod extract;
mod format;
mod models;
mod orchestrator;
mod parsers;
mod transport;

pub use browser::BrowserExtractor;
pub use client::{LoginOutcome, PortalClient};
pub use config::{DEFAULT_USER_AGENT, PortalConfig, RetryConfig};
pub use conversation::{GradeBot, Step};
pub use error::{PortalError, Result};
pub use extract::extract_report;
pub use format::{format_error, format_report};
pub use models::*;
pub use orchestrator::{GradeFetcher, Orchestrator};
pub use parsers::grades::{dashboard_report, extract_cgpa, extract_from_tables, extract_student_info};
pub use parsers::login_form::discover_login_form;
pub use parsers::text_scan::extract_from_text;
pub use transport::{ChatTransport, MessageId};
