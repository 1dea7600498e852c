// tests/format_test.rs

use gradebot_core::{
    Course, GradeReport, PortalError, StudentInfo, format_error, format_report,
};

fn course(code: &str, grade: &str) -> Course {
    Course {
        code: code.to_string(),
        name: "N/A".to_string(),
        credit: "-".to_string(),
        grade: grade.to_string(),
    }
}

fn report_with(courses: Vec<Course>) -> GradeReport {
    GradeReport {
        student: StudentInfo {
            name: "Abebe Kebede".to_string(),
            id: "ru1234".to_string(),
            program: "Computer Science".to_string(),
        },
        cgpa: "3.75".to_string(),
        summary: format!("Found {} items", courses.len()),
        courses,
        academic_info: Vec::new(),
    }
}

#[test]
fn report_renders_identity_table_and_cgpa() {
    let text = format_report(&report_with(vec![
        course("CS101", "A"),
        course("MA201", "B+"),
    ]));

    assert!(text.contains("Abebe Kebede"));
    assert!(text.contains("ru1234"));
    assert!(text.contains("CS101      | A"));
    assert!(text.contains("MA201      | B+"));
    assert!(text.contains("*CGPA/GPA:* 3.75"));
    assert!(text.contains("*Total courses:* 2"));
}

#[test]
fn long_course_lists_are_capped_but_counted_in_full() {
    let courses: Vec<Course> = (1..=20).map(|i| course(&format!("CS{i:03}"), "B")).collect();
    let text = format_report(&report_with(courses));

    assert!(text.contains("CS015"));
    assert!(!text.contains("CS016"));
    assert!(text.contains("*Total courses:* 20"));
}

#[test]
fn wide_course_codes_keep_the_column_aligned() {
    let text = format_report(&report_with(vec![course("VERYLONGCODE999", "A")]));
    // Truncated to the 10-character column.
    assert!(text.contains("VERYLONGCO | A"));
    assert!(!text.contains("VERYLONGCODE999"));
}

#[test]
fn empty_course_list_points_back_at_the_portal() {
    let mut report = report_with(Vec::new());
    report.summary = "Accessed dashboard. Use the university portal for detailed grades.".to_string();
    report.academic_info = vec!["Current GPA standing: 3.2".to_string()];

    let text = format_report(&report);
    assert!(text.contains("Accessed dashboard"));
    assert!(text.contains("• Current GPA standing: 3.2"));
    assert!(text.contains("check your grades directly"));
    assert!(!text.contains("Course grades"));
}

#[test]
fn error_texts_distinguish_the_three_user_actions() {
    let bad_creds = format_error(&PortalError::AuthFailed("banner text".to_string()));
    assert!(bad_creds.contains("check your username and password"));

    let no_data = format_error(&PortalError::ExtractionExhausted);
    assert!(no_data.contains("no grade data was found"));

    let resource = format_error(&PortalError::Browser("launch failed".to_string()));
    assert!(resource.contains("Failed to fetch"));

    // All three are distinct messages.
    assert_ne!(bad_creds, no_data);
    assert_ne!(no_data, resource);
    assert_ne!(bad_creds, resource);
}
