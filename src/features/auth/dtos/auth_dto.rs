use serde::Deserialize;

/// Registration form fields (urlencoded POST from the register page)
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub first_name: String,
    pub last_name: String,
    pub userid: String,
    pub email: String,
    pub password: String,
    pub confirm_pass: String,
    pub phone: Option<String>,
    /// Accepted but defaulted to contributor when absent or unknown
    pub role: Option<String>,
}

impl RegisterForm {
    /// Trimmed phone value, None when the field was left empty
    pub fn phone_value(&self) -> Option<&str> {
        self.phone.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

/// Login form fields
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub userid: String,
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_value_ignores_blank_input() {
        let mut form = RegisterForm {
            first_name: "A".into(),
            last_name: "B".into(),
            userid: "ab".into(),
            email: "ab@example.com".into(),
            password: "pw".into(),
            confirm_pass: "pw".into(),
            phone: Some("   ".into()),
            role: None,
        };
        assert_eq!(form.phone_value(), None);

        form.phone = Some(" 123-456-7890 ".into());
        assert_eq!(form.phone_value(), Some("123-456-7890"));

        form.phone = None;
        assert_eq!(form.phone_value(), None);
    }
}
