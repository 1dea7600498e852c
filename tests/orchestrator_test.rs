// tests/orchestrator_test.rs

use gradebot_core::{
    Credentials, GradeFetcher, Orchestrator, PortalConfig, PortalError, Result, RetryConfig,
    format_error,
};
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

const LOGIN_PAGE: &str = r#"
    <html><body><form method="post" action="/login">
        <input name="_token" value="tok-1">
        <input type="text" name="username">
        <input type="password" name="password">
    </form></body></html>
"#;

const POST_LOGIN_OK: &str = r#"<html><body><a href="/logout">Logout</a></body></html>"#;

const GRADE_PAGE: &str = r#"
    <html><body>
    <table>
        <tr><th>Code</th><th>Course</th><th>Credit</th><th>Grade</th></tr>
        <tr><td>CS101</td><td>Intro to CS</td><td>3</td><td>A</td></tr>
        <tr><td>MA201</td><td>Calculus</td><td>4</td><td>B+</td></tr>
    </table>
    </body></html>
"#;

/// Matches requests that carry no cookie header at all.
struct NoCookie;

impl Match for NoCookie {
    fn matches(&self, request: &Request) -> bool {
        !request.headers.contains_key("cookie")
    }
}

fn test_config(server: &MockServer) -> PortalConfig {
    PortalConfig {
        base_url: server.uri(),
        request_timeout: Duration::from_secs(5),
        browser_fallback: false,
        ..PortalConfig::default()
    }
}

fn fast_retry(max_retries: u32) -> RetryConfig {
    RetryConfig {
        max_retries,
        backoff: Duration::from_millis(50),
        jitter: Duration::ZERO,
        attempt_timeout: Duration::from_secs(10),
    }
}

async fn mount_happy_portal(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(LOGIN_PAGE, "text/html"))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(POST_LOGIN_OK, "text/html"))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/student/grade"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(GRADE_PAGE, "text/html"))
        .mount(server)
        .await;
}

#[tokio::test]
async fn end_to_end_attempt_extracts_grades() -> Result<()> {
    let server = MockServer::start().await;
    mount_happy_portal(&server).await;

    let orchestrator = Orchestrator::new(test_config(&server), fast_retry(0));
    let credentials = Credentials::new("alice", "secret");
    let report = orchestrator.fetch_grades(&credentials).await?;

    assert_eq!(report.courses.len(), 2);
    assert_eq!(report.courses[0].code, "CS101");
    assert_eq!(report.courses[1].grade, "B+");
    assert_eq!(report.student.id, "alice");
    assert_eq!(report.summary, "Found 2 items");
    Ok(())
}

#[tokio::test]
async fn two_failures_then_success_retries_with_backoff() -> Result<()> {
    let server = MockServer::start().await;

    // First two login-page fetches blow up; the third attempt gets a portal.
    Mock::given(method("GET"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    mount_happy_portal(&server).await;

    let orchestrator = Orchestrator::new(test_config(&server), fast_retry(2));
    let credentials = Credentials::new("alice", "secret");

    let started = Instant::now();
    let report = orchestrator.fetch_grades(&credentials).await?;
    let elapsed = started.elapsed();

    assert_eq!(report.courses.len(), 2);
    // Backoff ran exactly twice: once before each retry.
    assert!(
        elapsed >= Duration::from_millis(100),
        "expected two 50ms backoffs, got {elapsed:?}"
    );
    server.verify().await;
    Ok(())
}

#[tokio::test]
async fn login_error_banner_surfaces_as_bad_credentials() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(LOGIN_PAGE, "text/html"))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"<html><div class="alert-danger">Invalid username or password.</div></html>"#,
            "text/html",
        ))
        .expect(2)
        .mount(&server)
        .await;

    // Transient rejections are retried; a persistent one is surfaced.
    let orchestrator = Orchestrator::new(test_config(&server), fast_retry(1));
    let credentials = Credentials::new("alice", "wrong");
    let err = orchestrator.fetch_grades(&credentials).await.unwrap_err();

    assert!(matches!(err, PortalError::AuthFailed(_)));
    assert!(format_error(&err).contains("check your username and password"));
    server.verify().await;
    Ok(())
}

#[tokio::test]
async fn each_retry_starts_with_a_fresh_cookie_jar() -> Result<()> {
    let server = MockServer::start().await;

    // Attempt one: hands out a cookie, then fails the login POST.
    Mock::given(method("GET"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "stale=1; Path=/")
                .set_body_raw(LOGIN_PAGE, "text/html"),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    // Attempt two only matches if the stale cookie was NOT replayed.
    Mock::given(method("GET"))
        .and(path("/login"))
        .and(NoCookie)
        .respond_with(ResponseTemplate::new(200).set_body_raw(LOGIN_PAGE, "text/html"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(POST_LOGIN_OK, "text/html"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/student/grade"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(GRADE_PAGE, "text/html"))
        .mount(&server)
        .await;

    let orchestrator = Orchestrator::new(test_config(&server), fast_retry(1));
    let credentials = Credentials::new("alice", "secret");
    let report = orchestrator.fetch_grades(&credentials).await?;

    assert_eq!(report.courses.len(), 2);
    server.verify().await;
    Ok(())
}

#[tokio::test]
async fn consistent_denial_is_an_authorization_failure_not_a_parse_failure() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(LOGIN_PAGE, "text/html"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(POST_LOGIN_OK, "text/html"))
        .mount(&server)
        .await;
    // Every protected page, dashboard included, rejects the session.
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let orchestrator = Orchestrator::new(test_config(&server), fast_retry(0));
    let credentials = Credentials::new("alice", "secret");
    let err = orchestrator.fetch_grades(&credentials).await.unwrap_err();

    assert!(matches!(err, PortalError::Forbidden(_)));
    assert!(format_error(&err).contains("username and password"));
    Ok(())
}

#[tokio::test]
async fn dashboard_fallback_produces_a_report_without_courses() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(LOGIN_PAGE, "text/html"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(POST_LOGIN_OK, "text/html"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/student/dashboard"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"<html><div class="user-name">Hana T.</div>
               <div class="card">Current GPA standing: 3.2</div></html>"#,
            "text/html",
        ))
        .mount(&server)
        .await;
    // Every grade path serves prose no strategy can use.
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "<html><p>No records are published at this time for this term</p></html>",
            "text/html",
        ))
        .mount(&server)
        .await;

    let orchestrator = Orchestrator::new(test_config(&server), fast_retry(0));
    let credentials = Credentials::new("ru0007", "secret");
    let report = orchestrator.fetch_grades(&credentials).await?;

    assert!(report.courses.is_empty());
    assert_eq!(report.student.name, "Hana T.");
    assert_eq!(report.student.id, "ru0007");
    assert_eq!(report.cgpa, "Check portal");
    assert_eq!(report.academic_info.len(), 1);
    Ok(())
}

#[tokio::test]
async fn slow_portal_hits_the_attempt_wall_clock_bound() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_secs(5))
                .set_body_raw(LOGIN_PAGE, "text/html"),
        )
        .mount(&server)
        .await;

    let retry = RetryConfig {
        max_retries: 0,
        backoff: Duration::from_millis(10),
        jitter: Duration::ZERO,
        attempt_timeout: Duration::from_millis(200),
    };
    let orchestrator = Orchestrator::new(test_config(&server), retry);
    let credentials = Credentials::new("alice", "secret");
    let err = orchestrator.fetch_grades(&credentials).await.unwrap_err();

    assert!(matches!(err, PortalError::AttemptTimeout(_)));
    assert!(format_error(&err).contains("currently unavailable"));
    Ok(())
}
