use crate::models::{Course, GradeReport};
use crate::parsers::grades::{extract_cgpa, extract_student_info};
use regex::Regex;
use scraper::Html;
use std::sync::LazyLock;

/// A letter grade (`A`, `B+`, `C-`, ...) or a GPA-scale number (`3.75`).
static GRADE_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[A-F][+-]?|[0-4](?:\.[0-9]+)?)$").unwrap());

/// Lines longer than this are prose, not grade records.
const MAX_LINE_LEN: usize = 100;

/// Heuristic line-scan extractor, used when no grade table matched.
///
/// Splits the page's visible text into lines and accepts a line as a course
/// record when its trailing token looks like a grade. Course codes are not
/// recoverable on such pages, so each accepted line gets a sequential
/// placeholder code.
pub fn extract_from_text(document: &Html, username: &str) -> Option<GradeReport> {
    let page_text = document.root_element().text().collect::<String>();

    let mut courses = Vec::new();
    for line in page_text.lines() {
        let line = line.trim();
        if line.is_empty() || line.len() >= MAX_LINE_LEN {
            continue;
        }
        let mut tokens = line.split_whitespace();
        let Some(last) = tokens.next_back() else {
            continue;
        };
        if !GRADE_TOKEN_RE.is_match(last) {
            continue;
        }
        let name = tokens.collect::<Vec<_>>().join(" ");
        if name.is_empty() {
            // A lone grade token carries no course to attach it to.
            continue;
        }

        courses.push(Course {
            code: format!("COURSE-{:02}", courses.len() + 1),
            name,
            credit: "-".to_string(),
            grade: last.to_string(),
        });
    }

    if courses.is_empty() {
        return None;
    }

    Some(GradeReport {
        student: extract_student_info(document, username),
        cgpa: extract_cgpa(document),
        summary: format!("Found {} items", courses.len()),
        courses,
        academic_info: Vec::new(),
    })
}
