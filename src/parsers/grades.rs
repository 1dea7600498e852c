use crate::models::{Course, GradeReport, StudentInfo};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

/// A table is a candidate grade table if its flattened text mentions any of
/// these words.
const GRADE_TABLE_VOCAB: &[&str] = &["grade", "credit", "course", "code", "subject", "result"];

/// Selectors tried in order when hunting for the student's display name.
const NAME_SELECTORS: &[&str] = &[
    ".student-name",
    ".profile-name",
    ".user-name",
    "[class*=\"student-name\"]",
];

const ID_SELECTORS: &[&str] = &[".student-id", ".registration-no", "[class*=\"student-id\"]"];

const PROGRAM_SELECTORS: &[&str] = &[".program", ".department", "[class*=\"program\"]"];

/// A CGPA/GPA label followed (within a short window) by a 0.0-4.x number.
static CGPA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bC?GPA\b[^0-9]{0,24}([0-4](?:\.[0-9]+)?)").unwrap());

fn flatten_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn first_text(document: &Html, selectors: &[&str]) -> Option<String> {
    for raw in selectors {
        let selector = Selector::parse(raw).unwrap();
        if let Some(element) = document.select(&selector).next() {
            let text = flatten_text(element);
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}

/// Best-effort student identity from the page, with the defaults the rest of
/// the pipeline relies on: `id` falls back to the submitted username.
pub fn extract_student_info(document: &Html, username: &str) -> StudentInfo {
    StudentInfo {
        name: first_text(document, NAME_SELECTORS).unwrap_or_else(|| "Student".to_string()),
        id: first_text(document, ID_SELECTORS).unwrap_or_else(|| username.to_string()),
        program: first_text(document, PROGRAM_SELECTORS).unwrap_or_else(|| "N/A".to_string()),
    }
}

/// CGPA wherever the page happens to put it. Absence is a sentinel string,
/// never an error.
pub fn extract_cgpa(document: &Html) -> String {
    if let Some(text) = first_text(document, &[".cgpa", ".gpa", "[class*=\"gpa\"]"]) {
        return text;
    }
    let page_text = document.root_element().text().collect::<String>();
    if let Some(caps) = CGPA_RE.captures(&page_text) {
        return caps[1].to_string();
    }
    "Not available".to_string()
}

/// Structured-table extractor: scans every candidate grade table and turns
/// qualifying rows into courses, in document order.
///
/// Returns `None` when no candidate table produced a single course, which
/// tells the strategy chain to try the next extractor.
pub fn extract_from_tables(document: &Html, username: &str) -> Option<GradeReport> {
    let table_selector = Selector::parse("table").unwrap();
    let row_selector = Selector::parse("tr").unwrap();
    let cell_selector = Selector::parse("td").unwrap();
    let header_selector = Selector::parse("th").unwrap();

    let mut courses = Vec::new();

    for table in document.select(&table_selector) {
        let flattened = flatten_text(table).to_ascii_lowercase();
        if !GRADE_TABLE_VOCAB.iter().any(|word| flattened.contains(word)) {
            continue;
        }

        for row in table.select(&row_selector) {
            if row.select(&header_selector).next().is_some() {
                continue;
            }
            let cells: Vec<String> = row
                .select(&cell_selector)
                .map(|cell| flatten_text(cell))
                .collect();
            if cells.len() < 2 {
                continue;
            }

            let code = cells[0].clone();
            let grade = cells[cells.len() - 1].clone();
            if code.is_empty() || grade.is_empty() {
                continue;
            }
            // Tables that build their header row out of <td> cells.
            if matches!(grade.to_ascii_lowercase().as_str(), "grade" | "result") {
                continue;
            }

            courses.push(Course {
                code,
                name: if cells.len() >= 3 && !cells[1].is_empty() {
                    cells[1].clone()
                } else {
                    "N/A".to_string()
                },
                credit: if cells.len() >= 4 && !cells[2].is_empty() {
                    cells[2].clone()
                } else {
                    "-".to_string()
                },
                grade,
            });
        }
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

/// Dashboard fallback: no grade table was reachable, so report who the
/// student is, collect any academic snippets from dashboard cards, and point
/// the user back at the portal. Always produces a report.
pub fn dashboard_report(document: &Html, username: &str) -> GradeReport {
    let mut academic_info = Vec::new();
    for raw in [".card", ".panel", ".widget"] {
        let selector = Selector::parse(raw).unwrap();
        for element in document.select(&selector) {
            let text = flatten_text(element);
            if text.contains("GPA") || text.contains("Grade") || text.contains("Credit") {
                academic_info.push(text);
            }
        }
    }

    GradeReport {
        student: StudentInfo {
            name: first_text(document, &[".user-name", ".profile-name"])
                .unwrap_or_else(|| "Student".to_string()),
            id: username.to_string(),
            program: "N/A".to_string(),
        },
        courses: Vec::new(),
        cgpa: "Check portal".to_string(),
        summary: "Accessed dashboard. Use the university portal for detailed grades.".to_string(),
        academic_info,
    }
}
