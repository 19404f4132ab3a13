//! Authentication primitives: passwords, login credentials, registration and
//! profile updates.
//!
//! Inbound adapters build these from raw strings; every constructor validates
//! before a manager ever sees the values, so the managers only deal with
//! well-formed input.

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::user::{DisplayName, Email, Role, UserValidationError};

/// Minimum number of characters a new password must have.
pub const PASSWORD_MIN_LEN: usize = 6;

/// Secret password text, wiped from memory on drop.
///
/// The content is never trimmed: surrounding whitespace is part of the
/// credential.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(Zeroizing<String>);

impl Password {
    /// Wrap a non-empty password.
    pub fn new(raw: &str) -> Result<Self, AuthValidationError> {
        if raw.is_empty() {
            return Err(AuthValidationError::MissingField {
                field: Field::Password,
            });
        }
        Ok(Self(Zeroizing::new(raw.to_owned())))
    }

    /// Borrow the secret for hashing or verification.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }

    fn char_len(&self) -> usize {
        self.0.chars().count()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

/// Opaque PHC-format hash of a password, as produced by a
/// [`crate::domain::ports::PasswordHasher`].
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap an encoded hash produced by a hasher adapter.
    pub fn from_encoded(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Encoded hash text.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

/// Form fields referenced by validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// Display name.
    Name,
    /// Login email.
    Email,
    /// Password.
    Password,
    /// Password confirmation.
    ConfirmPassword,
    /// Requested role.
    Role,
}

impl Field {
    /// camelCase field name as it appears in request bodies.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Password => "password",
            Self::ConfirmPassword => "confirmPassword",
            Self::Role => "role",
        }
    }
}

/// Validation failures for login, registration and profile updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthValidationError {
    /// A required field was blank.
    MissingField {
        /// Blank field.
        field: Field,
    },
    /// `password` and `confirmPassword` differ.
    PasswordMismatch,
    /// The new password is shorter than [`PASSWORD_MIN_LEN`].
    PasswordTooShort {
        /// Lower bound, in characters.
        min: usize,
    },
    /// A field failed its value-object validation.
    InvalidField {
        /// Field that failed.
        field: Field,
        /// Value-object error.
        source: UserValidationError,
    },
    /// A profile update carried no changes.
    EmptyUpdate,
}

impl AuthValidationError {
    /// Field the error refers to, if any.
    pub fn field(&self) -> Option<Field> {
        match self {
            Self::MissingField { field } | Self::InvalidField { field, .. } => Some(*field),
            Self::PasswordMismatch => Some(Field::ConfirmPassword),
            Self::PasswordTooShort { .. } => Some(Field::Password),
            Self::EmptyUpdate => None,
        }
    }

    /// Stable snake_case code for adapters.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingField { .. } => "missing_field",
            Self::PasswordMismatch => "password_mismatch",
            Self::PasswordTooShort { .. } => "password_too_short",
            Self::InvalidField { .. } => "invalid_field",
            Self::EmptyUpdate => "empty_update",
        }
    }
}

impl fmt::Display for AuthValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField { .. } => write!(f, "Please fill in all fields"),
            Self::PasswordMismatch => write!(f, "Passwords do not match"),
            Self::PasswordTooShort { min } => {
                write!(f, "Password must be at least {min} characters")
            }
            Self::InvalidField { source, .. } => write!(f, "{source}"),
            Self::EmptyUpdate => write!(f, "update must change at least one field"),
        }
    }
}

impl std::error::Error for AuthValidationError {}

fn required<'a>(raw: &'a str, field: Field) -> Result<&'a str, AuthValidationError> {
    if raw.trim().is_empty() {
        Err(AuthValidationError::MissingField { field })
    } else {
        Ok(raw)
    }
}

fn email_field(raw: &str) -> Result<Email, AuthValidationError> {
    Email::new(required(raw, Field::Email)?).map_err(|source| AuthValidationError::InvalidField {
        field: Field::Email,
        source,
    })
}

fn name_field(raw: &str) -> Result<DisplayName, AuthValidationError> {
    DisplayName::new(required(raw, Field::Name)?).map_err(|source| {
        AuthValidationError::InvalidField {
            field: Field::Name,
            source,
        }
    })
}

fn new_password(raw: &str) -> Result<Password, AuthValidationError> {
    let password = Password::new(raw)?;
    if password.char_len() < PASSWORD_MIN_LEN {
        return Err(AuthValidationError::PasswordTooShort {
            min: PASSWORD_MIN_LEN,
        });
    }
    Ok(password)
}

/// Validated login credentials.
///
/// ## Invariants
/// - `email` is a valid [`Email`];
/// - `password` is non-empty (length rules apply to new passwords only);
/// - `role` defaults to [`Role::User`] when the caller does not pick one.
///
/// # Examples
/// ```
/// use complaint_desk::domain::{LoginCredentials, Role};
///
/// let creds = LoginCredentials::try_from_parts("manish@example.com", "password123", None).unwrap();
/// assert_eq!(creds.role(), Role::User);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: Email,
    password: Password,
    role: Role,
}

impl LoginCredentials {
    /// Construct credentials from raw inputs.
    pub fn try_from_parts(
        email: &str,
        password: &str,
        role: Option<Role>,
    ) -> Result<Self, AuthValidationError> {
        Ok(Self {
            email: email_field(email)?,
            password: Password::new(password)?,
            role: role.unwrap_or_default(),
        })
    }

    /// Email used for the account lookup.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Password supplied by the caller.
    pub fn password(&self) -> &Password {
        &self.password
    }

    /// Role the caller is signing in as.
    pub fn role(&self) -> Role {
        self.role
    }
}

/// Raw registration form, as typed by the user.
#[derive(Debug, Clone, Default)]
pub struct RegistrationForm<'a> {
    /// Display name as typed.
    pub name: &'a str,
    /// Email as typed.
    pub email: &'a str,
    /// Password as typed.
    pub password: &'a str,
    /// Must equal `password`.
    pub confirm_password: &'a str,
    /// Role to register with.
    pub role: Role,
}

/// Validated registration request.
///
/// Validation order follows the form: every field present, then
/// confirmation match, then password length, then field formats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    name: DisplayName,
    email: Email,
    password: Password,
    role: Role,
}

impl Registration {
    /// Validate a registration form.
    ///
    /// # Examples
    /// ```
    /// use complaint_desk::domain::{AuthValidationError, Registration, RegistrationForm, Role};
    ///
    /// let form = RegistrationForm {
    ///     name: "Alice",
    ///     email: "a@x.com",
    ///     password: "secret1",
    ///     confirm_password: "secret2",
    ///     role: Role::User,
    /// };
    /// assert_eq!(Registration::try_from_form(&form), Err(AuthValidationError::PasswordMismatch));
    /// ```
    pub fn try_from_form(form: &RegistrationForm<'_>) -> Result<Self, AuthValidationError> {
        required(form.name, Field::Name)?;
        required(form.email, Field::Email)?;
        if form.password.is_empty() {
            return Err(AuthValidationError::MissingField {
                field: Field::Password,
            });
        }
        if form.confirm_password.is_empty() {
            return Err(AuthValidationError::MissingField {
                field: Field::ConfirmPassword,
            });
        }
        if form.password != form.confirm_password {
            return Err(AuthValidationError::PasswordMismatch);
        }
        let password = new_password(form.password)?;
        Ok(Self {
            name: name_field(form.name)?,
            email: email_field(form.email)?,
            password,
            role: form.role,
        })
    }

    /// Requested display name.
    pub fn name(&self) -> &DisplayName {
        &self.name
    }

    /// Requested login email.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Chosen password.
    pub fn password(&self) -> &Password {
        &self.password
    }

    /// Requested role.
    pub fn role(&self) -> Role {
        self.role
    }
}

/// Partial profile update applied to the signed-in user.
///
/// The role cannot be changed through a profile update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUpdate {
    name: Option<DisplayName>,
    email: Option<Email>,
    password: Option<Password>,
}

impl UserUpdate {
    /// Validate optional raw fields; at least one must be present.
    pub fn try_from_parts(
        name: Option<&str>,
        email: Option<&str>,
        password: Option<&str>,
    ) -> Result<Self, AuthValidationError> {
        let update = Self {
            name: name.map(name_field).transpose()?,
            email: email.map(email_field).transpose()?,
            password: password.map(new_password).transpose()?,
        };
        if update.is_empty() {
            return Err(AuthValidationError::EmptyUpdate);
        }
        Ok(update)
    }

    fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.password.is_none()
    }

    /// New display name, if changing.
    pub fn name(&self) -> Option<&DisplayName> {
        self.name.as_ref()
    }

    /// New email, if changing.
    pub fn email(&self) -> Option<&Email> {
        self.email.as_ref()
    }

    /// New password, if changing.
    pub fn password(&self) -> Option<&Password> {
        self.password.as_ref()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    fn form<'a>(name: &'a str, email: &'a str, password: &'a str, confirm: &'a str) -> RegistrationForm<'a> {
        RegistrationForm {
            name,
            email,
            password,
            confirm_password: confirm,
            role: Role::User,
        }
    }

    #[rstest]
    #[case(form("", "a@x.com", "secret1", "secret1"), AuthValidationError::MissingField { field: Field::Name })]
    #[case(form("Alice", "  ", "secret1", "secret1"), AuthValidationError::MissingField { field: Field::Email })]
    #[case(form("Alice", "a@x.com", "", "secret1"), AuthValidationError::MissingField { field: Field::Password })]
    #[case(form("Alice", "a@x.com", "secret1", ""), AuthValidationError::MissingField { field: Field::ConfirmPassword })]
    #[case(form("Alice", "a@x.com", "secret1", "secret2"), AuthValidationError::PasswordMismatch)]
    #[case(form("Alice", "a@x.com", "12345", "12345"), AuthValidationError::PasswordTooShort { min: PASSWORD_MIN_LEN })]
    fn registration_rejects_invalid_forms(
        #[case] input: RegistrationForm<'static>,
        #[case] expected: AuthValidationError,
    ) {
        assert_eq!(
            Registration::try_from_form(&input).expect_err("invalid form"),
            expected
        );
    }

    #[rstest]
    fn registration_reports_bad_email_format() {
        let err = Registration::try_from_form(&form("Alice", "alice", "secret1", "secret1"))
            .expect_err("invalid email");
        assert_eq!(err.field(), Some(Field::Email));
        assert_eq!(err.code(), "invalid_field");
    }

    #[rstest]
    fn registration_accepts_minimum_password_length() {
        let registration = Registration::try_from_form(&form("Alice", "a@x.com", "secret", "secret"))
            .expect("six characters is enough");
        assert_eq!(registration.email().as_ref(), "a@x.com");
        assert_eq!(registration.password().expose(), "secret");
        assert_eq!(registration.role(), Role::User);
    }

    #[rstest]
    fn missing_fields_use_the_form_message() {
        let err = Registration::try_from_form(&form("", "", "", "")).expect_err("empty form");
        assert_eq!(err.to_string(), "Please fill in all fields");
    }

    #[rstest]
    #[case("", "pw", Field::Email)]
    #[case("a@x.com", "", Field::Password)]
    fn login_requires_both_fields(#[case] email: &str, #[case] password: &str, #[case] field: Field) {
        let err = LoginCredentials::try_from_parts(email, password, None).expect_err("missing");
        assert_eq!(err.field(), Some(field));
    }

    #[rstest]
    fn login_keeps_password_whitespace_and_role() {
        let creds = LoginCredentials::try_from_parts(" a@x.com ", " pw ", Some(Role::Admin))
            .expect("valid");
        assert_eq!(creds.email().as_ref(), "a@x.com");
        assert_eq!(creds.password().expose(), " pw ");
        assert_eq!(creds.role(), Role::Admin);
    }

    #[rstest]
    fn password_debug_is_redacted() {
        let password = Password::new("hunter22").expect("non-empty");
        assert_eq!(format!("{password:?}"), "Password(<redacted>)");
    }

    #[rstest]
    fn update_requires_a_change() {
        assert_eq!(
            UserUpdate::try_from_parts(None, None, None).expect_err("empty"),
            AuthValidationError::EmptyUpdate
        );
    }

    #[rstest]
    fn update_validates_new_password_length() {
        assert_eq!(
            UserUpdate::try_from_parts(None, None, Some("abc")).expect_err("short"),
            AuthValidationError::PasswordTooShort {
                min: PASSWORD_MIN_LEN
            }
        );
    }

    #[rstest]
    fn update_carries_only_supplied_fields() {
        let update = UserUpdate::try_from_parts(Some("Manish K"), None, None).expect("valid");
        assert_eq!(update.name().map(AsRef::as_ref), Some("Manish K"));
        assert!(update.email().is_none());
        assert!(update.password().is_none());
    }
}
