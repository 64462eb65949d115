//! Tests for the domain user model.

use super::*;
use chrono::TimeZone;
use rstest::{fixture, rstest};
use serde_json::json;

#[fixture]
fn created_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

#[fixture]
fn ada(created_at: DateTime<Utc>) -> User {
    User::new(
        UserId::new(7).expect("valid id"),
        Username::new("ada.lovelace").expect("valid username"),
        Some(Email::new("ada@example.com").expect("valid email")),
        Role::Admin,
        created_at,
    )
}

#[rstest]
#[case("42", Ok(42))]
#[case("0", Err(UserValidationError::InvalidId))]
#[case("-5", Err(UserValidationError::InvalidId))]
#[case("abc", Err(UserValidationError::InvalidId))]
#[case("", Err(UserValidationError::InvalidId))]
fn user_id_parsing(#[case] raw: &str, #[case] expected: Result<i64, UserValidationError>) {
    assert_eq!(raw.parse::<UserId>().map(UserId::get), expected);
}

#[rstest]
#[case("", UserValidationError::EmptyUsername)]
#[case("   ", UserValidationError::EmptyUsername)]
#[case("ab", UserValidationError::UsernameTooShort { min: USERNAME_MIN })]
#[case("bad$char", UserValidationError::UsernameInvalidCharacters)]
#[case("has space", UserValidationError::UsernameInvalidCharacters)]
fn invalid_usernames(#[case] raw: &str, #[case] expected: UserValidationError) {
    assert_eq!(Username::new(raw).expect_err("invalid username"), expected);
}

#[rstest]
fn username_too_long_is_rejected() {
    let raw = "a".repeat(USERNAME_MAX + 1);
    assert_eq!(
        Username::new(raw).expect_err("too long"),
        UserValidationError::UsernameTooLong { max: USERNAME_MAX }
    );
}

#[rstest]
fn username_is_trimmed() {
    let username = Username::new("  grace_h-1.0  ").expect("valid username");
    assert_eq!(username.as_ref(), "grace_h-1.0");
}

#[rstest]
#[case("ada@example.com", true)]
#[case("  ada@example.com ", true)]
#[case("ada", false)]
#[case("@example.com", false)]
#[case("ada@", false)]
#[case("a@b@c", false)]
#[case("ada lovelace@example.com", false)]
fn email_shapes(#[case] raw: &str, #[case] valid: bool) {
    assert_eq!(Email::new(raw).is_ok(), valid);
}

#[rstest]
#[case("USER", Role::User)]
#[case("admin", Role::Admin)]
#[case(" Admin ", Role::Admin)]
fn role_parsing_is_case_insensitive(#[case] raw: &str, #[case] expected: Role) {
    assert_eq!(raw.parse::<Role>().expect("known role"), expected);
}

#[rstest]
fn unknown_role_is_rejected() {
    assert_eq!(
        "owner".parse::<Role>().expect_err("unknown role"),
        UserValidationError::UnknownRole
    );
}

#[rstest]
fn user_serialises_camel_case_without_empty_fields(ada: User) {
    let value = serde_json::to_value(&ada).expect("serialise user");
    assert_eq!(
        value,
        json!({
            "id": 7,
            "username": "ada.lovelace",
            "email": "ada@example.com",
            "role": "ADMIN",
            "createdAt": "2024-05-01T12:00:00Z"
        })
    );

    let with_avatar = ada.with_avatar_url(Some("/avatars/7-a.png".to_owned()));
    let value = serde_json::to_value(&with_avatar).expect("serialise user");
    assert_eq!(value["avatarUrl"], json!("/avatars/7-a.png"));
}

#[rstest]
fn deserialising_rejects_invalid_values() {
    let payload = json!({
        "id": 0,
        "username": "ada",
        "role": "USER",
        "createdAt": "2024-05-01T12:00:00Z"
    });
    assert!(serde_json::from_value::<User>(payload).is_err());
}

#[rstest]
fn stored_user_debug_redacts_hash(ada: User) {
    let stored = StoredUser {
        user: ada,
        password_hash: "$argon2id$secret".to_owned(),
    };
    let rendered = format!("{stored:?}");
    assert!(!rendered.contains("secret"));
    assert!(rendered.contains("<redacted>"));
}
