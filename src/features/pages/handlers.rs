use axum::response::Html;

use crate::core::error::Result;
use crate::shared::templates;

pub async fn index() -> Result<Html<String>> {
    templates::render("index.html", minijinja::context! {})
}

pub async fn login_page() -> Result<Html<String>> {
    templates::render("login.html", minijinja::context! {})
}

pub async fn register_page() -> Result<Html<String>> {
    templates::render("register.html", minijinja::context! {})
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_landing_page_renders() {
        let Html(body) = index().await.unwrap();
        assert!(body.contains("Welcome to EDMS"));
    }

    #[tokio::test]
    async fn test_forms_render() {
        let Html(login) = login_page().await.unwrap();
        assert!(login.contains("action=\"/loginSubmit\""));

        let Html(register) = register_page().await.unwrap();
        assert!(register.contains("action=\"/registerSubmit\""));
        assert!(register.contains("confirm_pass"));
    }
}
