use crate::error::PortalError;
use crate::models::GradeReport;

/// Chat clients truncate long messages; past this many rows the user is
/// better served by the portal itself.
const MAX_TABLE_ROWS: usize = 15;

/// Renders a grade report as Markdown display text.
pub fn format_report(report: &GradeReport) -> String {
    let mut out = String::new();
    out.push_str("🎓 *Grade Report*\n\n");
    out.push_str(&format!("👤 *Name:* {}\n", report.student.name));
    out.push_str(&format!("🆔 *ID:* {}\n", report.student.id));
    out.push_str(&format!("📚 *Program:* {}\n\n", report.student.program));

    if !report.academic_info.is_empty() {
        out.push_str("📋 *Academic information:*\n");
        for info in &report.academic_info {
            out.push_str(&format!("• {info}\n"));
        }
        out.push('\n');
    }

    if report.courses.is_empty() {
        out.push_str(&format!("ℹ️ {}\n", report.summary));
        out.push_str("Please check your grades directly on the university portal.\n");
    } else {
        out.push_str("📊 *Course grades:*\n```\n");
        out.push_str("Code       | Grade\n");
        out.push_str("---------- | -----\n");
        for course in report.courses.iter().take(MAX_TABLE_ROWS) {
            let code: String = course.code.chars().take(10).collect();
            out.push_str(&format!("{code:<10} | {}\n", course.grade));
        }
        out.push_str("```\n");
        out.push_str(&format!("📈 *CGPA/GPA:* {}\n", report.cgpa));
        out.push_str(&format!("📖 *Total courses:* {}\n", report.courses.len()));
    }

    out.push_str(&format!(
        "\n🔄 *Last updated:* {}",
        chrono::Local::now().format("%Y-%m-%d")
    ));
    out
}

/// Renders a failure as display text. The three user-actionable cases are
/// kept distinct: bad credentials (fix them), portal unavailable (wait),
/// and logged-in-but-no-data (consult the portal).
pub fn format_error(error: &PortalError) -> String {
    let hint = match error {
        PortalError::AuthFailed(_) | PortalError::Forbidden(_) => {
            "Login failed. Please check your username and password."
        }
        PortalError::Request(_) | PortalError::AttemptTimeout(_) => {
            "The university portal is currently unavailable. Please try again later."
        }
        PortalError::ExtractionExhausted => {
            "Logged in, but no grade data was found. Please check the portal directly."
        }
        PortalError::Browser(_) | PortalError::Transport(_) => {
            "Failed to fetch from the university portal. Please try again later."
        }
    };
    format!("❌ *Error*\n\n{hint}")
}
