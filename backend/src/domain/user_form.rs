//! Validation for the create-user form.
//!
//! The form is deserialised leniently so every field can be checked and all
//! violations reported together; nothing short-circuits on the first failure.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use zeroize::Zeroizing;

use super::{Email, Role, UserValidationError, Username};

/// Minimum number of characters in a new password.
pub const PASSWORD_MIN: usize = 6;

/// A single rule violation attached to a form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldViolation {
    /// Wire name of the offending field.
    #[schema(example = "passwordRepeated")]
    pub field: &'static str,
    /// Machine-readable rule identifier.
    #[schema(example = "mismatch")]
    pub code: &'static str,
}

impl FieldViolation {
    const fn new(field: &'static str, code: &'static str) -> Self {
        Self { field, code }
    }
}

/// Raw create-user payload.
#[derive(Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct UserCreateForm {
    #[schema(example = "ada.lovelace")]
    pub username: String,
    #[schema(example = "ada@example.com")]
    pub email: Option<String>,
    #[schema(example = "s3cret!")]
    pub password: String,
    #[schema(example = "s3cret!")]
    pub password_repeated: String,
    #[schema(example = "USER")]
    pub role: Option<String>,
}

impl std::fmt::Debug for UserCreateForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserCreateForm")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

/// Validated request to create a user.
pub struct UserCreateRequest {
    pub username: Username,
    pub email: Option<Email>,
    pub role: Role,
    pub password: Zeroizing<String>,
}

fn username_code(err: &UserValidationError) -> &'static str {
    match err {
        UserValidationError::EmptyUsername => "required",
        UserValidationError::UsernameTooShort { .. } => "too_short",
        UserValidationError::UsernameTooLong { .. } => "too_long",
        _ => "invalid_characters",
    }
}

impl UserCreateForm {
    /// Check every rule, returning the validated request or all violations.
    ///
    /// # Examples
    /// ```
    /// use accounts::domain::UserCreateForm;
    ///
    /// let form = UserCreateForm {
    ///     username: "ab".into(),
    ///     password: "secret".into(),
    ///     password_repeated: "other!".into(),
    ///     ..UserCreateForm::default()
    /// };
    /// let violations = form.validate().err().expect("invalid form");
    /// assert_eq!(violations.len(), 2);
    /// ```
    pub fn validate(self) -> Result<UserCreateRequest, Vec<FieldViolation>> {
        let mut violations = Vec::new();

        let username = Username::new(&self.username)
            .map_err(|err| violations.push(FieldViolation::new("username", username_code(&err))))
            .ok();

        let email = match self.email.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Email::new(raw)
                .map_err(|_| violations.push(FieldViolation::new("email", "invalid_format")))
                .ok(),
        };

        let role = match self.role.as_deref().map(str::trim) {
            None | Some("") => Role::default(),
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                violations.push(FieldViolation::new("role", "invalid_value"));
                Role::default()
            }),
        };

        let password = Zeroizing::new(self.password);
        let repeated = Zeroizing::new(self.password_repeated);
        if password.is_empty() {
            violations.push(FieldViolation::new("password", "required"));
        } else if password.chars().count() < PASSWORD_MIN {
            violations.push(FieldViolation::new("password", "too_short"));
        }
        if *password != *repeated {
            violations.push(FieldViolation::new("passwordRepeated", "mismatch"));
        }

        match (username, violations.is_empty()) {
            (Some(username), true) => Ok(UserCreateRequest {
                username,
                email,
                role,
                password,
            }),
            _ => Err(violations),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Rule coverage for the create-user form.
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn valid_form() -> UserCreateForm {
        UserCreateForm {
            username: "ada.lovelace".to_owned(),
            email: Some("ada@example.com".to_owned()),
            password: "s3cret!".to_owned(),
            password_repeated: "s3cret!".to_owned(),
            role: Some("admin".to_owned()),
        }
    }

    #[rstest]
    fn valid_form_produces_request(valid_form: UserCreateForm) {
        let request = valid_form.validate().expect("valid form");
        assert_eq!(request.username.as_ref(), "ada.lovelace");
        assert_eq!(request.email.as_ref().map(AsRef::as_ref), Some("ada@example.com"));
        assert_eq!(request.role, Role::Admin);
        assert_eq!(request.password.as_str(), "s3cret!");
    }

    #[rstest]
    fn optional_fields_default(valid_form: UserCreateForm) {
        let form = UserCreateForm {
            email: Some("  ".to_owned()),
            role: None,
            ..valid_form
        };
        let request = form.validate().expect("valid form");
        assert!(request.email.is_none());
        assert_eq!(request.role, Role::User);
    }

    #[rstest]
    #[case("", "required")]
    #[case("ab", "too_short")]
    #[case("not allowed!", "invalid_characters")]
    fn username_rules(valid_form: UserCreateForm, #[case] username: &str, #[case] code: &'static str) {
        let form = UserCreateForm {
            username: username.to_owned(),
            ..valid_form
        };
        let violations = form.validate().err().expect("invalid form");
        assert_eq!(violations, vec![FieldViolation::new("username", code)]);
    }

    #[rstest]
    fn every_violation_is_reported() {
        let form = UserCreateForm {
            username: String::new(),
            email: Some("nope".to_owned()),
            password: "abc".to_owned(),
            password_repeated: "abcd".to_owned(),
            role: Some("owner".to_owned()),
        };
        let violations = form.validate().err().expect("invalid form");
        assert_eq!(
            violations,
            vec![
                FieldViolation::new("username", "required"),
                FieldViolation::new("email", "invalid_format"),
                FieldViolation::new("role", "invalid_value"),
                FieldViolation::new("password", "too_short"),
                FieldViolation::new("passwordRepeated", "mismatch"),
            ]
        );
    }

    #[rstest]
    fn missing_password_is_required_not_mismatched(valid_form: UserCreateForm) {
        let form = UserCreateForm {
            password: String::new(),
            password_repeated: String::new(),
            ..valid_form
        };
        let violations = form.validate().err().expect("invalid form");
        assert_eq!(violations, vec![FieldViolation::new("password", "required")]);
    }

    #[rstest]
    fn missing_json_fields_deserialise_to_defaults() {
        let form: UserCreateForm = serde_json::from_str("{}").expect("lenient form");
        let violations = form.validate().err().expect("invalid form");
        assert!(violations.contains(&FieldViolation::new("username", "required")));
        assert!(violations.contains(&FieldViolation::new("password", "required")));
    }
}
