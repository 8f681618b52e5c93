#![forbid(unsafe_code)]

//! Client-side form validation for the login and registration forms. A form
//! that fails here never produces a request; violations are reported per
//! field so the UI can render them inline.

const NAME_MAX: usize = 50;
const EMAIL_MIN: usize = 2;
const EMAIL_MAX: usize = 50;
const PASSWORD_MIN: usize = 8;
const PASSWORD_MAX: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl LoginForm {
    #[must_use]
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if let Some(msg) = email_error(&self.email) {
            errors.push(FieldError::new("email", msg));
        }
        if let Some(msg) = password_error(&self.password) {
            errors.push(FieldError::new("password", msg));
        }
        errors
    }
}

impl RegisterForm {
    #[must_use]
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if let Some(msg) = name_error(&self.name) {
            errors.push(FieldError::new("name", msg));
        }
        if let Some(msg) = email_error(&self.email) {
            errors.push(FieldError::new("email", msg));
        }
        if let Some(msg) = password_error(&self.password) {
            errors.push(FieldError::new("password", msg));
        }
        errors
    }
}

#[must_use]
pub fn name_error(name: &str) -> Option<String> {
    if name.trim().is_empty() {
        return Some("name is required".to_owned());
    }
    if name.chars().count() > NAME_MAX {
        return Some(format!("name must be at most {NAME_MAX} characters"));
    }
    None
}

#[must_use]
pub fn email_error(email: &str) -> Option<String> {
    let len = email.chars().count();
    if len < EMAIL_MIN {
        return Some(format!("email must be at least {EMAIL_MIN} characters"));
    }
    if len > EMAIL_MAX {
        return Some(format!("email must be at most {EMAIL_MAX} characters"));
    }
    let re = regex::Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")
        .unwrap_or_else(|_| regex::Regex::new("$^").unwrap());
    if !re.is_match(email) {
        return Some("invalid email address".to_owned());
    }
    None
}

/// Composition policy: 8..=100 characters with at least one uppercase
/// letter, one lowercase letter, one digit, and one symbol.
#[must_use]
pub fn password_error(password: &str) -> Option<String> {
    let len = password.chars().count();
    if len < PASSWORD_MIN {
        return Some(format!("password must be at least {PASSWORD_MIN} characters"));
    }
    if len > PASSWORD_MAX {
        return Some(format!("password must be at most {PASSWORD_MAX} characters"));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Some("password must contain an uppercase letter".to_owned());
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Some("password must contain a lowercase letter".to_owned());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Some("password must contain a digit".to_owned());
    }
    if !password.chars().any(|c| !c.is_alphanumeric()) {
        return Some("password must contain a symbol".to_owned());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_password_fails() {
        assert!(password_error("abc").is_some());
    }

    #[test]
    fn password_policy_requires_each_class() {
        assert!(password_error("abcdefg1!").is_some()); // no uppercase
        assert!(password_error("ABCDEFG1!").is_some()); // no lowercase
        assert!(password_error("Abcdefgh!").is_some()); // no digit
        assert!(password_error("Abcdefg12").is_some()); // no symbol
        assert!(password_error("Abcdef1!").is_none());
    }

    #[test]
    fn password_length_bounds() {
        let long = format!("Aa1!{}", "x".repeat(100));
        assert!(password_error(&long).is_some());
    }

    #[test]
    fn email_shape() {
        assert!(email_error("ada@example.com").is_none());
        assert!(email_error("not-an-email").is_some());
        assert!(email_error("a@b").is_some());
        assert!(email_error("@example.com").is_some());
        let long = format!("{}@example.com", "x".repeat(50));
        assert!(email_error(&long).is_some());
    }

    #[test]
    fn login_form_reports_per_field() {
        let form = LoginForm {
            email: "nope".to_owned(),
            password: "abc".to_owned(),
        };
        let errors = form.validate();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].field, "email");
        assert_eq!(errors[1].field, "password");
    }

    #[test]
    fn register_form_requires_name() {
        let form = RegisterForm {
            name: String::new(),
            email: "ada@example.com".to_owned(),
            password: "Abcdef1!".to_owned(),
        };
        let errors = form.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "name");
    }
}
