//! Sign-in, sign-up and password change forms.

use serde::{Deserialize, Serialize};

use super::{FormErrors, MSG_REQUIRED, NON_FIELD_ERRORS, required};

const USERNAME_MAX_CHARS: usize = 150;
const PASSWORD_MIN_CHARS: usize = 8;

/// First path segments of fixed routes; a profile under one would be shadowed.
const RESERVED_USERNAMES: &[&str] = &[
    "about", "about-author", "about-spec", "admin", "auth", "follow", "group", "health", "media",
    "new",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing)]
    pub password: String,
    /// Where to go after signing in.
    #[serde(default)]
    pub next: Option<String>,
}

impl LoginForm {
    /// Returns the trimmed username; the password is checked as typed.
    pub fn validate(&self) -> Result<String, FormErrors> {
        let mut errors = FormErrors::new();
        let username = required(&mut errors, "username", &self.username);
        if self.password.is_empty() {
            errors.add("password", MSG_REQUIRED);
        }
        errors.into_result(username)
    }

    /// Error shown when the credentials do not match an account.
    pub fn invalid_credentials() -> FormErrors {
        let mut errors = FormErrors::new();
        errors.add(
            NON_FIELD_ERRORS,
            "Please enter a correct username and password. Note that both fields may be case-sensitive.",
        );
        errors
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing)]
    pub password1: String,
    #[serde(default, skip_serializing)]
    pub password2: String,
}

impl SignupForm {
    /// Returns `(username, email, password)` when valid.
    pub fn validate(&self) -> Result<(String, String, String), FormErrors> {
        let mut errors = FormErrors::new();

        let username = self.username.trim().to_string();
        validate_username(&mut errors, &username);

        let email = required(&mut errors, "email", &self.email);
        if !email.is_empty() && !is_plausible_email(&email) {
            errors.add("email", "Enter a valid email address.");
        }

        validate_new_password(
            &mut errors,
            ("password1", &self.password1),
            ("password2", &self.password2),
        );

        errors.into_result((username, email, self.password1.clone()))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PasswordChangeForm {
    #[serde(default, skip_serializing)]
    pub old_password: String,
    #[serde(default, skip_serializing)]
    pub new_password1: String,
    #[serde(default, skip_serializing)]
    pub new_password2: String,
}

impl PasswordChangeForm {
    /// Checks presence and the new password pair. Whether the old password
    /// is correct is decided by the caller, who owns the stored hash.
    pub fn validate(&self) -> Result<String, FormErrors> {
        let mut errors = FormErrors::new();
        if self.old_password.is_empty() {
            errors.add("old_password", MSG_REQUIRED);
        }
        validate_new_password(
            &mut errors,
            ("new_password1", &self.new_password1),
            ("new_password2", &self.new_password2),
        );
        errors.into_result(self.new_password1.clone())
    }

    pub fn wrong_old_password() -> FormErrors {
        let mut errors = FormErrors::new();
        errors.add(
            "old_password",
            "Your old password was entered incorrectly. Please enter it again.",
        );
        errors
    }
}

/// Username rules: required, at most 150 characters of letters, digits
/// and `@.+-_`, not one of the reserved route names.
pub fn validate_username(errors: &mut FormErrors, username: &str) {
    if username.is_empty() {
        errors.add("username", MSG_REQUIRED);
    } else if username.chars().count() > USERNAME_MAX_CHARS {
        errors.add(
            "username",
            format!("Ensure this value has at most {USERNAME_MAX_CHARS} characters."),
        );
    } else if !username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
    {
        errors.add(
            "username",
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
        );
    } else if RESERVED_USERNAMES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(username))
    {
        errors.add("username", "This username is reserved.");
    }
}

/// New password rules: required, long enough, typed twice the same.
pub fn validate_new_password(
    errors: &mut FormErrors,
    (first_field, first): (&str, &str),
    (second_field, second): (&str, &str),
) {
    if first.is_empty() {
        errors.add(first_field, MSG_REQUIRED);
    } else if first.chars().count() < PASSWORD_MIN_CHARS {
        errors.add(
            first_field,
            format!(
                "This password is too short. It must contain at least {PASSWORD_MIN_CHARS} characters."
            ),
        );
    }

    if second.is_empty() {
        errors.add(second_field, MSG_REQUIRED);
    } else if first != second {
        errors.add(second_field, "The two password fields didn't match.");
    }
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}
