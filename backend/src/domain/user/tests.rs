//! Tests for the domain user model.

use super::*;
use rstest::{fixture, rstest};
use serde_json::json;

#[fixture]
fn manish() -> User {
    User::try_from_strings("user-1", "Manish Kumar", "manish@example.com", Role::User)
        .expect("fixture user is valid")
}

#[rstest]
#[case("user-1")]
#[case("admin-1")]
#[case("user-1718000000000")]
#[case("A_b-9")]
fn accepts_opaque_ids(#[case] raw: &str) {
    let id = UserId::new(raw).expect("valid id");
    assert_eq!(id.as_ref(), raw);
}

#[rstest]
#[case("", UserValidationError::EmptyId)]
#[case(" user-1", UserValidationError::InvalidId)]
#[case("user 1", UserValidationError::InvalidId)]
#[case("user/1", UserValidationError::InvalidId)]
fn rejects_malformed_ids(#[case] raw: &str, #[case] expected: UserValidationError) {
    assert_eq!(UserId::new(raw).expect_err("invalid id"), expected);
}

#[rstest]
fn rejects_overlong_ids() {
    let raw = "a".repeat(USER_ID_MAX + 1);
    assert_eq!(
        UserId::new(raw).expect_err("too long"),
        UserValidationError::IdTooLong { max: USER_ID_MAX }
    );
}

#[rstest]
#[case("  Alice  ", "Alice")]
#[case("Zoë O'Brien-Smith", "Zoë O'Brien-Smith")]
#[case("J. R. R.", "J. R. R.")]
fn display_names_are_trimmed(#[case] raw: &str, #[case] expected: &str) {
    let name = DisplayName::new(raw).expect("valid name");
    assert_eq!(name.as_ref(), expected);
}

#[rstest]
#[case("   ", UserValidationError::EmptyDisplayName)]
#[case("bad$char", UserValidationError::DisplayNameInvalidCharacters)]
#[case("<script>", UserValidationError::DisplayNameInvalidCharacters)]
fn rejects_invalid_display_names(#[case] raw: &str, #[case] expected: UserValidationError) {
    assert_eq!(DisplayName::new(raw).expect_err("invalid name"), expected);
}

#[rstest]
fn display_name_length_boundary() {
    assert!(DisplayName::new("a".repeat(DISPLAY_NAME_MAX)).is_ok());
    assert_eq!(
        DisplayName::new("a".repeat(DISPLAY_NAME_MAX + 1)).expect_err("too long"),
        UserValidationError::DisplayNameTooLong {
            max: DISPLAY_NAME_MAX
        }
    );
}

#[rstest]
#[case("a@x.com")]
#[case(" manish@example.com ")]
#[case("first.last+tag@sub.example.org")]
fn accepts_plausible_emails(#[case] raw: &str) {
    let email = Email::new(raw).expect("valid email");
    assert_eq!(email.as_ref(), raw.trim());
}

#[rstest]
#[case("", UserValidationError::EmptyEmail)]
#[case("no-at-sign", UserValidationError::InvalidEmail)]
#[case("@example.com", UserValidationError::InvalidEmail)]
#[case("a@", UserValidationError::InvalidEmail)]
#[case("a@@x.com", UserValidationError::InvalidEmail)]
#[case("a b@x.com", UserValidationError::InvalidEmail)]
fn rejects_implausible_emails(#[case] raw: &str, #[case] expected: UserValidationError) {
    assert_eq!(Email::new(raw).expect_err("invalid email"), expected);
}

#[rstest]
fn emails_compare_case_sensitively() {
    let lower = Email::new("a@x.com").expect("valid");
    let upper = Email::new("A@x.com").expect("valid");
    assert_ne!(lower, upper);
}

#[rstest]
#[case("user", Role::User)]
#[case("admin", Role::Admin)]
fn roles_parse_from_wire_names(#[case] raw: &str, #[case] expected: Role) {
    assert_eq!(raw.parse::<Role>().expect("known role"), expected);
    assert_eq!(expected.as_str(), raw);
}

#[rstest]
fn unknown_roles_are_rejected() {
    assert_eq!(
        "root".parse::<Role>().expect_err("unknown"),
        UserValidationError::UnknownRole {
            value: "root".to_owned()
        }
    );
}

#[rstest]
fn serialises_camel_case_without_password(manish: User) {
    let value = serde_json::to_value(&manish).expect("serialise");
    assert_eq!(
        value,
        json!({
            "id": "user-1",
            "name": "Manish Kumar",
            "email": "manish@example.com",
            "role": "user",
        })
    );
}

#[rstest]
fn deserialise_round_trips(manish: User) {
    let json = serde_json::to_string(&manish).expect("serialise");
    let back: User = serde_json::from_str(&json).expect("deserialise");
    assert_eq!(back, manish);
}

#[rstest]
fn deserialise_rejects_password_field() {
    let payload = json!({
        "id": "user-1",
        "name": "Manish Kumar",
        "email": "manish@example.com",
        "role": "user",
        "password": "password123",
    });
    assert!(serde_json::from_value::<User>(payload).is_err());
}

#[rstest]
fn deserialise_rejects_invalid_components() {
    let payload = json!({
        "id": "user-1",
        "name": "Manish Kumar",
        "email": "not-an-email",
        "role": "user",
    });
    assert!(serde_json::from_value::<User>(payload).is_err());
}

#[rstest]
fn admin_flag_follows_role(manish: User) {
    assert!(!manish.is_admin());
    let admin = User::try_from_strings("admin-1", "Admin User", "admin@example.com", Role::Admin)
        .expect("valid admin");
    assert!(admin.is_admin());
}
