use crate::models::LoginForm;
use scraper::{Html, Selector};

/// Hidden-input names conventionally used for anti-forgery tokens, in
/// priority order. Laravel-style `_token` comes first because that is what
/// the portal family this crate targets actually serves.
const TOKEN_FIELD_NAMES: &[&str] = &[
    "_token",
    "csrf_token",
    "__RequestVerificationToken",
    "authenticity_token",
];

/// Name fragments that mark an input as the username field even when its
/// type attribute is unhelpful.
const USERNAME_HINTS: &[&str] = &["user", "email", "login"];

/// Inspects login-page markup and derives the field names to post.
///
/// Discovery never fails: anything that cannot be located degrades to the
/// literal defaults `"username"`/`"password"` (and no token), so an odd or
/// empty page can still produce a best-effort login attempt.
pub fn discover_login_form(html: &str) -> LoginForm {
    let document = Html::parse_document(html);
    let mut form = LoginForm::default();

    // Conventionally named token inputs first.
    for name in TOKEN_FIELD_NAMES {
        let selector = Selector::parse(&format!("input[name=\"{name}\"]")).unwrap();
        if let Some(value) = document
            .select(&selector)
            .next()
            .and_then(|input| input.value().attr("value"))
        {
            form.token_field = Some((*name).to_string());
            form.token_value = Some(value.to_string());
            break;
        }
    }

    // Then any hidden input whose name mentions a token.
    if form.token_value.is_none() {
        let hidden = Selector::parse("input[type=\"hidden\"]").unwrap();
        for input in document.select(&hidden) {
            let Some(name) = input.value().attr("name") else {
                continue;
            };
            if !name.to_ascii_lowercase().contains("token") {
                continue;
            }
            if let Some(value) = input.value().attr("value") {
                form.token_field = Some(name.to_string());
                form.token_value = Some(value.to_string());
                break;
            }
        }
    }

    // Meta tag fallback. There is no input name to post under, so the value
    // goes out under the conventional `_token` key.
    if form.token_value.is_none() {
        let meta = Selector::parse("meta[name=\"csrf-token\"]").unwrap();
        if let Some(content) = document
            .select(&meta)
            .next()
            .and_then(|tag| tag.value().attr("content"))
        {
            form.token_field = Some("_token".to_string());
            form.token_value = Some(content.to_string());
        }
    }

    let input_selector = Selector::parse("input").unwrap();
    let mut username_field = None;
    let mut password_field = None;

    for input in document.select(&input_selector) {
        let element = input.value();
        let Some(name) = element.attr("name") else {
            continue;
        };
        let input_type = element.attr("type").unwrap_or("text").to_ascii_lowercase();

        if input_type == "password" {
            if password_field.is_none() {
                password_field = Some(name.to_string());
            }
            continue;
        }
        if username_field.is_some() {
            continue;
        }
        if matches!(
            input_type.as_str(),
            "hidden" | "submit" | "button" | "checkbox" | "radio"
        ) {
            continue;
        }

        let lower = name.to_ascii_lowercase();
        if lower.contains("token") {
            continue;
        }
        let semantic = USERNAME_HINTS.iter().any(|hint| lower.contains(hint));
        if input_type == "text" || input_type == "email" || semantic {
            username_field = Some(name.to_string());
        }
    }

    if let Some(name) = username_field {
        form.username_field = name;
    }
    if let Some(name) = password_field {
        form.password_field = name;
    }

    form
}
