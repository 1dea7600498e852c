use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One-shot login credentials collected from a chat.
///
/// The password is held as a [`SecretString`] so it is redacted from any
/// `Debug` output and zeroized when the value is dropped. A `Credentials`
/// value is owned by exactly one fetch attempt and never stored anywhere.
pub struct Credentials {
    /// The portal username, also used as the fallback student ID.
    pub username: String,
    password: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }

    /// Exposes the password for the duration of a form submission.
    pub fn password(&self) -> &str {
        self.password.expose_secret()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// The shape of the portal's login form, discovered per attempt from the
/// freshly fetched login page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginForm {
    /// Name of the anti-forgery token field, when one was found.
    pub token_field: Option<String>,
    /// Value of the anti-forgery token, when one was found.
    pub token_value: Option<String>,
    /// Name of the username input.
    pub username_field: String,
    /// Name of the password input.
    pub password_field: String,
}

impl Default for LoginForm {
    /// The literal fallbacks used when discovery finds nothing recognizable.
    fn default() -> Self {
        Self {
            token_field: None,
            token_value: None,
            username_field: "username".to_string(),
            password_field: "password".to_string(),
        }
    }
}

impl LoginForm {
    /// Builds the form body for the login POST.
    pub fn form_params(&self, credentials: &Credentials) -> Vec<(String, String)> {
        let mut params = vec![
            (self.username_field.clone(), credentials.username.clone()),
            (self.password_field.clone(), credentials.password().to_string()),
        ];
        if let (Some(field), Some(value)) = (&self.token_field, &self.token_value) {
            params.push((field.clone(), value.clone()));
        }
        params
    }
}

/// One row of grade data extracted from the portal.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Course {
    /// The course code (e.g., "CS101"), or a synthesized placeholder when the
    /// heuristic extractor produced the row.
    pub code: String,
    /// The course name, or a placeholder when not discoverable.
    pub name: String,
    /// Credit hours as displayed by the portal, or a placeholder.
    pub credit: String,
    /// The awarded grade (letter or GPA-scale numeric).
    pub grade: String,
}

/// Best-effort student identity scraped from the results page.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct StudentInfo {
    /// Display name, defaulting to "Student" when not found.
    pub name: String,
    /// Student ID, defaulting to the submitted username when not found.
    pub id: String,
    /// Program or department, defaulting to "N/A" when not found.
    pub program: String,
}

/// The normalized result of one successful extraction attempt.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct GradeReport {
    pub student: StudentInfo,
    /// Extracted courses in document order. May be empty for a dashboard
    /// fallback report; `student` is always populated.
    pub courses: Vec<Course>,
    /// CGPA/GPA as displayed, or a sentinel ("Not available", "Check portal").
    pub cgpa: String,
    /// Human-readable one-liner describing what was found.
    pub summary: String,
    /// Academic snippets collected from dashboard cards when no grade table
    /// was reachable.
    pub academic_info: Vec<String>,
}
