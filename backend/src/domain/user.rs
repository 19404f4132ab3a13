//! Accounts as the rest of the desk sees them.
//!
//! [`User`] is the password-free public record: it is what the session holds,
//! what `currentUser` persists, and what adapters hand back to callers.
//! Credential material lives on [`crate::domain::accounts::Account`] only.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Validation errors returned by the user value-object constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// Identifier is blank.
    #[error("user id must not be empty")]
    EmptyId,
    /// Identifier exceeds `max` characters.
    #[error("user id must be at most {max} characters")]
    IdTooLong {
        /// Upper bound, in characters.
        max: usize,
    },
    /// Identifier has characters outside `[A-Za-z0-9_-]`.
    #[error("user id may only contain letters, numbers, hyphens, or underscores")]
    InvalidId,
    /// Name is blank.
    #[error("name must not be empty")]
    EmptyDisplayName,
    /// Name exceeds `max` characters.
    #[error("name must be at most {max} characters")]
    DisplayNameTooLong {
        /// Upper bound, in characters.
        max: usize,
    },
    /// Name has disallowed characters.
    #[error("name may only contain letters, numbers, spaces, or . ' _ -")]
    DisplayNameInvalidCharacters,
    /// Email is blank.
    #[error("email must not be empty")]
    EmptyEmail,
    /// Email is not shaped like `name@domain`.
    #[error("email must look like name@domain")]
    InvalidEmail,
    /// Role string is neither `user` nor `admin`.
    #[error("role must be 'user' or 'admin', got '{value}'")]
    UnknownRole {
        /// Rejected input.
        value: String,
    },
}

/// String conversions shared by the validated text newtypes below; each
/// type supplies its own `from_owned` check.
macro_rules! validated_text {
    ($($ty:ident),+ $(,)?) => {$(
        impl AsRef<str> for $ty {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<$ty> for String {
            fn from(value: $ty) -> Self {
                value.0
            }
        }

        impl TryFrom<String> for $ty {
            type Error = UserValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::from_owned(value)
            }
        }
    )+};
}

validated_text!(UserId, DisplayName, Email);

/// Maximum length of a [`UserId`].
pub const USER_ID_MAX: usize = 64;
/// Maximum allowed length for a display name.
pub const DISPLAY_NAME_MAX: usize = 64;

static USER_ID_RE: OnceLock<Regex> = OnceLock::new();
static DISPLAY_NAME_RE: OnceLock<Regex> = OnceLock::new();
static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn compiled(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| {
        Regex::new(pattern).unwrap_or_else(|error| panic!("regex {pattern} failed to compile: {error}"))
    })
}

fn user_id_regex() -> &'static Regex {
    compiled(&USER_ID_RE, "^[A-Za-z0-9_-]+$")
}

fn display_name_regex() -> &'static Regex {
    compiled(&DISPLAY_NAME_RE, r"^[\p{L}\p{N} .'_-]+$")
}

fn email_regex() -> &'static Regex {
    compiled(&EMAIL_RE, r"^[^@\s]+@[^@\s]+$")
}

/// Opaque, stable user identifier such as `user-1` or `user-1718000000000`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Validate and construct a [`UserId`] from borrowed input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        Self::from_owned(id.as_ref().to_owned())
    }

    fn from_owned(id: String) -> Result<Self, UserValidationError> {
        if id.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if id.chars().count() > USER_ID_MAX {
            return Err(UserValidationError::IdTooLong { max: USER_ID_MAX });
        }
        if !user_id_regex().is_match(&id) {
            return Err(UserValidationError::InvalidId);
        }
        Ok(Self(id))
    }
}

/// Human readable name shown in the navigation bar and on complaints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DisplayName(String);

impl DisplayName {
    /// Validate and construct a [`DisplayName`]; surrounding whitespace is trimmed.
    pub fn new(display_name: impl Into<String>) -> Result<Self, UserValidationError> {
        Self::from_owned(display_name.into())
    }

    fn from_owned(display_name: String) -> Result<Self, UserValidationError> {
        let trimmed = display_name.trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyDisplayName);
        }
        if trimmed.chars().count() > DISPLAY_NAME_MAX {
            return Err(UserValidationError::DisplayNameTooLong {
                max: DISPLAY_NAME_MAX,
            });
        }
        if !display_name_regex().is_match(trimmed) {
            return Err(UserValidationError::DisplayNameInvalidCharacters);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

/// Email address used as the login key.
///
/// Surrounding whitespace is trimmed; comparison is exact and case-sensitive,
/// so `A@x.com` and `a@x.com` are different accounts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Validate and construct an [`Email`].
    pub fn new(email: impl Into<String>) -> Result<Self, UserValidationError> {
        Self::from_owned(email.into())
    }

    fn from_owned(email: String) -> Result<Self, UserValidationError> {
        let trimmed = email.trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if !email_regex().is_match(trimmed) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

/// Role granted to an account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Files and tracks their own complaints.
    #[default]
    User,
    /// Views and manages every complaint.
    Admin,
}

impl Role {
    /// Wire representation (`user` / `admin`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }

    /// Whether the role grants access to the administrator routes.
    pub fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UserValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            other => Err(UserValidationError::UnknownRole {
                value: other.to_owned(),
            }),
        }
    }
}

/// Application user without credential material.
///
/// ## Invariants
/// - every component is individually validated;
/// - the serialised form never contains a password field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
#[serde(try_from = "UserDto", into = "UserDto")]
pub struct User {
    id: UserId,
    name: DisplayName,
    email: Email,
    role: Role,
}

impl User {
    /// Build a new [`User`] from validated components.
    pub fn new(id: UserId, name: DisplayName, email: Email, role: Role) -> Self {
        Self {
            id,
            name,
            email,
            role,
        }
    }

    /// Fallible constructor enforcing every component invariant.
    ///
    /// # Examples
    /// ```
    /// use complaint_desk::domain::{Role, User};
    ///
    /// let user = User::try_from_strings("user-1", "Manish Kumar", "manish@example.com", Role::User)
    ///     .expect("valid user");
    /// assert_eq!(user.email().as_ref(), "manish@example.com");
    /// ```
    pub fn try_from_strings(
        id: impl AsRef<str>,
        name: impl Into<String>,
        email: impl Into<String>,
        role: Role,
    ) -> Result<Self, UserValidationError> {
        Ok(Self::new(
            UserId::new(id)?,
            DisplayName::new(name)?,
            Email::new(email)?,
            role,
        ))
    }

    /// Stable user identifier.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Display name.
    pub fn name(&self) -> &DisplayName {
        &self.name
    }

    /// Login email.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Granted role.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Whether this user may use the administrator routes.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    pub(crate) fn set_name(&mut self, name: DisplayName) {
        self.name = name;
    }

    pub(crate) fn set_email(&mut self, email: Email) {
        self.email = email;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
struct UserDto {
    id: String,
    name: String,
    email: String,
    role: Role,
}

impl From<User> for UserDto {
    fn from(value: User) -> Self {
        let User {
            id,
            name,
            email,
            role,
        } = value;
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            role,
        }
    }
}

impl TryFrom<UserDto> for User {
    type Error = UserValidationError;

    fn try_from(value: UserDto) -> Result<Self, Self::Error> {
        User::try_from_strings(value.id, value.name, value.email, value.role)
    }
}

#[cfg(test)]
mod tests;
