//! Page template rendering.
//!
//! Templates are embedded at compile time and registered once in a global
//! minijinja environment. Handlers render into `Html<String>` responses.

use axum::response::Html;
use minijinja::{Environment, Value};
use std::sync::OnceLock;

use crate::core::error::AppError;

/// Global template environment
static TEMPLATE_ENV: OnceLock<Environment<'static>> = OnceLock::new();

fn env() -> &'static Environment<'static> {
    TEMPLATE_ENV.get_or_init(|| {
        let mut env = Environment::new();
        let templates: &[(&str, &str)] = &[
            ("index.html", include_str!("../../templates/index.html")),
            ("login.html", include_str!("../../templates/login.html")),
            ("register.html", include_str!("../../templates/register.html")),
            ("result.html", include_str!("../../templates/result.html")),
            ("dashboard.html", include_str!("../../templates/dashboard.html")),
            ("admin.html", include_str!("../../templates/admin.html")),
        ];
        for (name, source) in templates {
            env.add_template(name, source)
                .unwrap_or_else(|e| panic!("invalid template '{}': {}", name, e));
        }
        env
    })
}

/// Render a template to an HTML response
pub fn render(name: &str, ctx: Value) -> Result<Html<String>, AppError> {
    let template = env()
        .get_template(name)
        .map_err(|e| AppError::Internal(format!("Template '{}' not found: {}", name, e)))?;

    let body = template
        .render(ctx)
        .map_err(|e| AppError::Internal(format!("Failed to render '{}': {}", name, e)))?;

    Ok(Html(body))
}

/// Render the shared result page: a titled message with a back link.
///
/// `kind` ends up in a data attribute so results stay machine-distinguishable.
pub fn render_result(
    kind: &str,
    title: &str,
    message: &str,
    back_href: &str,
    back_label: &str,
) -> Result<Html<String>, AppError> {
    render(
        "result.html",
        minijinja::context! {
            kind => kind,
            title => title,
            message => message,
            back_href => back_href,
            back_label => back_label,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_templates_registered() {
        for name in [
            "index.html",
            "login.html",
            "register.html",
            "result.html",
            "dashboard.html",
            "admin.html",
        ] {
            assert!(env().get_template(name).is_ok(), "missing template {}", name);
        }
    }

    #[test]
    fn test_result_page_carries_kind_and_message() {
        let Html(body) =
            render_result("conflict-email", "Registration failed", "Email already in use", "/register", "Back")
                .unwrap();
        assert!(body.contains("data-result=\"conflict-email\""));
        assert!(body.contains("Email already in use"));
    }
}
