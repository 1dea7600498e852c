use crate::models::GradeReport;
use crate::parsers::{grades, text_scan};
use scraper::Html;
use tracing::debug;

/// One self-contained algorithm for turning markup into grade data.
/// Returning `None` means "not applicable, try the next one".
type Strategy = fn(&Html, &str) -> Option<GradeReport>;

/// Static extraction strategies, cheapest first. The rendered-browser path
/// is not in this list; it replaces the whole fetch pipeline rather than a
/// single parse step.
const STRATEGIES: &[(&str, Strategy)] = &[
    ("table-scan", grades::extract_from_tables),
    ("text-scan", text_scan::extract_from_text),
];

/// Runs the strategy chain over fetched markup, first success wins.
pub fn extract_report(html: &str, username: &str) -> Option<GradeReport> {
    let document = Html::parse_document(html);
    for (name, strategy) in STRATEGIES {
        if let Some(report) = strategy(&document, username) {
            debug!(
                strategy = name,
                courses = report.courses.len(),
                "extraction strategy matched"
            );
            return Some(report);
        }
    }
    None
}
