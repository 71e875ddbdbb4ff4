use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde_json::{Value, json};

use crate::{api::AppState, error::AppError, warning};

/// Turns a named template and its data map into an HTML page.
///
/// Handlers only assemble data; which markup a template name stands for is
/// entirely up to the implementation.
pub trait Renderer: Send + Sync {
    fn render(&self, template: &str, data: &Value) -> Result<String, AppError>;
}

/// Minimal renderer that lays the data map out as an HTML document.
///
/// Used when no template set is plugged in, so every page stays reachable.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainRenderer;

impl Renderer for PlainRenderer {
    fn render(&self, template: &str, data: &Value) -> Result<String, AppError> {
        let title = data
            .get("Title")
            .and_then(Value::as_str)
            .unwrap_or("Groupie Tracker");
        let body = serde_json::to_string_pretty(data)
            .map_err(|e| AppError::Internal(format!("cannot render {}: {}", template, e)))?;

        let banner = match data.get("Error").and_then(Value::as_str) {
            Some(msg) => format!("<p class=\"error\">{}</p>\n", escape_html(msg)),
            None => String::new(),
        };

        Ok(format!(
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n</head>\n<body data-template=\"{template}\">\n<h1>{title}</h1>\n{banner}<pre>{body}</pre>\n</body>\n</html>\n",
            title = escape_html(title),
            template = escape_html(template),
            banner = banner,
            body = escape_html(&body),
        ))
    }
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Renders `template` with `status`, falling back to a bare 500 when the
/// renderer fails.
pub fn render_page(state: &AppState, status: StatusCode, template: &str, data: Value) -> Response {
    match state.renderer.render(template, &data) {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            warning!("Cannot render {}: {}", template, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error - rendering failed",
            )
                .into_response()
        }
    }
}

/// Renders the error page for `err` with the status it maps to.
pub fn render_error(state: &AppState, err: &AppError) -> Response {
    let status = err.status_code();
    if status.is_server_error() {
        warning!("{}", err);
    }

    let data = json!({
        "Title": error_title(status),
        "StatusCode": status.as_u16(),
        "Message": err.to_string(),
    });
    render_page(state, status, "error.html", data)
}

fn error_title(status: StatusCode) -> &'static str {
    match status {
        StatusCode::NOT_FOUND => "Page not found",
        StatusCode::BAD_REQUEST => "Bad request",
        StatusCode::METHOD_NOT_ALLOWED => "Method not allowed",
        StatusCode::INTERNAL_SERVER_ERROR => "Server error",
        _ => "Error",
    }
}
