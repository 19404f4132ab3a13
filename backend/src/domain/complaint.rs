//! Complaint records and their value objects.
//!
//! A [`Complaint`] is created by a user in [`ComplaintStatus::Submitted`],
//! moved through its lifecycle by administrators, and never deleted. Every
//! status transition is appended to the complaint's history.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::user::{DisplayName, UserId};

/// Validation errors for complaint value objects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComplaintValidationError {
    /// Identifier does not match `CMP-` plus three to nine digits.
    InvalidId,
    /// Title length outside `min..=max`.
    TitleLength {
        /// Lower bound, in characters.
        min: usize,
        /// Upper bound, in characters.
        max: usize,
    },
    /// Description is blank.
    EmptyDescription,
    /// Description exceeds `max` characters.
    DescriptionTooLong {
        /// Upper bound, in characters.
        max: usize,
    },
    /// Category is blank.
    EmptyCategory,
    /// Category exceeds `max` characters.
    CategoryTooLong {
        /// Upper bound, in characters.
        max: usize,
    },
    /// Status note exceeds `max` characters.
    NoteTooLong {
        /// Upper bound, in characters.
        max: usize,
    },
    /// Status string is not a known status.
    UnknownStatus {
        /// Rejected input.
        value: String,
    },
    /// Priority string is not a known priority.
    UnknownPriority {
        /// Rejected input.
        value: String,
    },
    /// Edit supplies no fields.
    EmptyEdit,
}

impl fmt::Display for ComplaintValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId => write!(f, "complaint id must look like CMP-001"),
            Self::TitleLength { min, max } => {
                write!(f, "title must be between {min} and {max} characters")
            }
            Self::EmptyDescription => write!(f, "description must not be empty"),
            Self::DescriptionTooLong { max } => {
                write!(f, "description must be at most {max} characters")
            }
            Self::EmptyCategory => write!(f, "category must not be empty"),
            Self::CategoryTooLong { max } => {
                write!(f, "category must be at most {max} characters")
            }
            Self::NoteTooLong { max } => write!(f, "note must be at most {max} characters"),
            Self::UnknownStatus { value } => write!(
                f,
                "status must be one of submitted, in_progress, resolved; got '{value}'",
            ),
            Self::UnknownPriority { value } => {
                write!(f, "priority must be one of low, medium, high; got '{value}'")
            }
            Self::EmptyEdit => write!(f, "edit must change at least one field"),
        }
    }
}

impl std::error::Error for ComplaintValidationError {}

impl ComplaintValidationError {
    /// Request field the error refers to, if any.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::InvalidId => Some("id"),
            Self::TitleLength { .. } => Some("title"),
            Self::EmptyDescription | Self::DescriptionTooLong { .. } => Some("description"),
            Self::EmptyCategory | Self::CategoryTooLong { .. } => Some("category"),
            Self::NoteTooLong { .. } => Some("note"),
            Self::UnknownStatus { .. } => Some("status"),
            Self::UnknownPriority { .. } => Some("priority"),
            Self::EmptyEdit => None,
        }
    }
}

/// Prefix shared by every complaint identifier.
pub const COMPLAINT_ID_PREFIX: &str = "CMP-";
/// Shortest accepted title, in characters.
pub const TITLE_MIN: usize = 3;
/// Longest accepted title, in characters.
pub const TITLE_MAX: usize = 120;
/// Longest accepted description, in characters.
pub const DESCRIPTION_MAX: usize = 2000;
/// Longest accepted category, in characters.
pub const CATEGORY_MAX: usize = 40;
/// Longest accepted status note, in characters.
pub const NOTE_MAX: usize = 500;

static COMPLAINT_ID_RE: OnceLock<Regex> = OnceLock::new();

fn complaint_id_regex() -> &'static Regex {
    COMPLAINT_ID_RE.get_or_init(|| {
        Regex::new(r"^CMP-[0-9]{3,9}$")
            .unwrap_or_else(|error| panic!("complaint id regex failed to compile: {error}"))
    })
}

/// Sequential complaint identifier, `CMP-` plus three to nine digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ComplaintId(String);

impl ComplaintId {
    /// Highest sequence number an identifier can carry (nine digits).
    pub const MAX_NUMBER: u32 = 999_999_999;

    /// Parse an identifier such as `CMP-007`.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ComplaintValidationError> {
        let raw = raw.as_ref().trim();
        if !complaint_id_regex().is_match(raw) {
            return Err(ComplaintValidationError::InvalidId);
        }
        Ok(Self(raw.to_owned()))
    }

    /// Identifier for sequence number `number`, zero-padded to three digits.
    ///
    /// # Examples
    /// ```
    /// use complaint_desk::domain::ComplaintId;
    ///
    /// assert_eq!(ComplaintId::from_number(4).as_ref(), "CMP-004");
    /// assert_eq!(ComplaintId::from_number(1234).number(), 1234);
    /// ```
    pub fn from_number(number: u32) -> Self {
        Self(format!("{COMPLAINT_ID_PREFIX}{number:03}"))
    }

    /// Identifier following this one, or `None` once the nine-digit range
    /// is used up.
    ///
    /// # Examples
    /// ```
    /// use complaint_desk::domain::ComplaintId;
    ///
    /// let last = ComplaintId::from_number(ComplaintId::MAX_NUMBER);
    /// assert_eq!(ComplaintId::from_number(7).checked_next().map(|id| id.number()), Some(8));
    /// assert!(last.checked_next().is_none());
    /// ```
    pub fn checked_next(&self) -> Option<Self> {
        self.number()
            .checked_add(1)
            .filter(|next| *next <= Self::MAX_NUMBER)
            .map(Self::from_number)
    }

    /// Numeric sequence part.
    pub fn number(&self) -> u32 {
        self.0
            .strip_prefix(COMPLAINT_ID_PREFIX)
            .and_then(|digits| digits.parse().ok())
            .unwrap_or(0)
    }
}

impl AsRef<str> for ComplaintId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ComplaintId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<ComplaintId> for String {
    fn from(value: ComplaintId) -> Self {
        value.0
    }
}

impl TryFrom<String> for ComplaintId {
    type Error = ComplaintValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Lifecycle position of a complaint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplaintStatus {
    /// Filed, not yet picked up.
    Submitted,
    /// Being handled by an administrator.
    InProgress,
    /// Closed.
    Resolved,
}

impl ComplaintStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 3] = [Self::Submitted, Self::InProgress, Self::Resolved];

    /// Wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::InProgress => "in_progress",
            Self::Resolved => "resolved",
        }
    }

    /// Human-readable label used in notification text.
    pub fn label(self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::InProgress => "in progress",
            Self::Resolved => "resolved",
        }
    }
}

impl fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComplaintStatus {
    type Err = ComplaintValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == value)
            .ok_or_else(|| ComplaintValidationError::UnknownStatus {
                value: value.to_owned(),
            })
    }
}

/// Urgency chosen by the filer.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Can wait.
    Low,
    /// Default urgency.
    #[default]
    Medium,
    /// Needs attention soon.
    High,
}

impl Priority {
    /// Every priority, lowest first.
    pub const ALL: [Self; 3] = [Self::Low, Self::Medium, Self::High];

    /// Wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ComplaintValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|priority| priority.as_str() == value)
            .ok_or_else(|| ComplaintValidationError::UnknownPriority {
                value: value.to_owned(),
            })
    }
}

macro_rules! bounded_text {
    (
        $(#[$meta:meta])*
        $name:ident, |$trimmed:ident| $check:expr
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Validate and construct; surrounding whitespace is trimmed.
            pub fn new(raw: impl AsRef<str>) -> Result<Self, ComplaintValidationError> {
                let $trimmed = raw.as_ref().trim();
                $check?;
                Ok(Self($trimmed.to_owned()))
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.0.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_ref())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ComplaintValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }
    };
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

bounded_text!(
    /// Short summary of the complaint.
    ComplaintTitle,
    |trimmed| if (TITLE_MIN..=TITLE_MAX).contains(&char_len(trimmed)) {
        Ok(())
    } else {
        Err(ComplaintValidationError::TitleLength {
            min: TITLE_MIN,
            max: TITLE_MAX,
        })
    }
);

bounded_text!(
    /// Free-text body of the complaint.
    ComplaintDescription,
    |trimmed| match char_len(trimmed) {
        0 => Err(ComplaintValidationError::EmptyDescription),
        len if len > DESCRIPTION_MAX => Err(ComplaintValidationError::DescriptionTooLong {
            max: DESCRIPTION_MAX,
        }),
        _ => Ok(()),
    }
);

bounded_text!(
    /// Free-text category such as `Infrastructure`.
    Category,
    |trimmed| match char_len(trimmed) {
        0 => Err(ComplaintValidationError::EmptyCategory),
        len if len > CATEGORY_MAX => Err(ComplaintValidationError::CategoryTooLong {
            max: CATEGORY_MAX,
        }),
        _ => Ok(()),
    }
);

/// Validate an optional administrator note; blank notes collapse to `None`.
pub fn status_note(raw: Option<&str>) -> Result<Option<String>, ComplaintValidationError> {
    let Some(trimmed) = raw.map(str::trim).filter(|note| !note.is_empty()) else {
        return Ok(None);
    };
    if char_len(trimmed) > NOTE_MAX {
        return Err(ComplaintValidationError::NoteTooLong { max: NOTE_MAX });
    }
    Ok(Some(trimmed.to_owned()))
}

/// One recorded status transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange {
    /// Status before the change.
    pub from: ComplaintStatus,
    /// Status after the change.
    pub to: ComplaintStatus,
    /// Administrator who made the change.
    pub changed_by: UserId,
    /// Optional note left with the change.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// When the change happened.
    pub changed_at: DateTime<Utc>,
}

/// Validated input for filing a complaint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComplaint {
    /// Short summary.
    pub title: ComplaintTitle,
    /// Full description.
    pub description: ComplaintDescription,
    /// Free-form category.
    pub category: Category,
    /// Urgency.
    pub priority: Priority,
}

impl NewComplaint {
    /// Validate raw form input; `priority` defaults to medium.
    pub fn try_from_parts(
        title: &str,
        description: &str,
        category: &str,
        priority: Option<Priority>,
    ) -> Result<Self, ComplaintValidationError> {
        Ok(Self {
            title: ComplaintTitle::new(title)?,
            description: ComplaintDescription::new(description)?,
            category: Category::new(category)?,
            priority: priority.unwrap_or_default(),
        })
    }
}

/// Partial edit of a complaint's details.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComplaintEdit {
    /// Replacement title.
    pub title: Option<ComplaintTitle>,
    /// Replacement description.
    pub description: Option<ComplaintDescription>,
    /// Replacement category.
    pub category: Option<Category>,
    /// Replacement priority.
    pub priority: Option<Priority>,
}

impl ComplaintEdit {
    /// Validate the supplied fields; at least one must be present.
    pub fn try_from_parts(
        title: Option<&str>,
        description: Option<&str>,
        category: Option<&str>,
        priority: Option<Priority>,
    ) -> Result<Self, ComplaintValidationError> {
        let edit = Self {
            title: title.map(ComplaintTitle::new).transpose()?,
            description: description.map(ComplaintDescription::new).transpose()?,
            category: category.map(Category::new).transpose()?,
            priority,
        };
        if edit == Self::default() {
            return Err(ComplaintValidationError::EmptyEdit);
        }
        Ok(edit)
    }
}

/// A complaint and its status history.
///
/// ## Invariants
/// - `history` is append-only and its last entry's `to` equals `status`;
/// - `updated_at >= created_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Complaint {
    id: ComplaintId,
    title: ComplaintTitle,
    description: ComplaintDescription,
    category: Category,
    priority: Priority,
    status: ComplaintStatus,
    owner_id: UserId,
    owner_name: DisplayName,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(default)]
    history: Vec<StatusChange>,
}

impl Complaint {
    /// File a new complaint in the submitted state.
    pub fn file(
        id: ComplaintId,
        input: NewComplaint,
        owner_id: UserId,
        owner_name: DisplayName,
        now: DateTime<Utc>,
    ) -> Self {
        let NewComplaint {
            title,
            description,
            category,
            priority,
        } = input;
        Self {
            id,
            title,
            description,
            category,
            priority,
            status: ComplaintStatus::Submitted,
            owner_id,
            owner_name,
            created_at: now,
            updated_at: now,
            history: Vec::new(),
        }
    }

    /// Sequential identifier.
    pub fn id(&self) -> &ComplaintId {
        &self.id
    }

    /// Short summary.
    pub fn title(&self) -> &ComplaintTitle {
        &self.title
    }

    /// Full description.
    pub fn description(&self) -> &ComplaintDescription {
        &self.description
    }

    /// Free-form category.
    pub fn category(&self) -> &Category {
        &self.category
    }

    /// Urgency chosen by the filer.
    pub fn priority(&self) -> Priority {
        self.priority
    }

    /// Current lifecycle position.
    pub fn status(&self) -> ComplaintStatus {
        self.status
    }

    /// Filing user.
    pub fn owner_id(&self) -> &UserId {
        &self.owner_id
    }

    /// Filer's name at the time of filing.
    pub fn owner_name(&self) -> &DisplayName {
        &self.owner_name
    }

    /// When the complaint was filed.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Last edit or status change.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Status transitions, oldest first.
    pub fn history(&self) -> &[StatusChange] {
        &self.history
    }

    /// Whether `user_id` filed this complaint.
    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.owner_id == user_id
    }

    /// Case-insensitive match of `needle` against id, title and description.
    pub fn matches_text(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        [
            self.id.as_ref(),
            self.title.as_ref(),
            self.description.as_ref(),
        ]
        .iter()
        .any(|haystack| haystack.to_lowercase().contains(&needle))
    }

    pub(crate) fn transition(
        &mut self,
        to: ComplaintStatus,
        changed_by: UserId,
        note: Option<String>,
        now: DateTime<Utc>,
    ) {
        self.history.push(StatusChange {
            from: self.status,
            to,
            changed_by,
            note,
            changed_at: now,
        });
        self.status = to;
        self.updated_at = now;
    }

    pub(crate) fn apply_edit(&mut self, edit: ComplaintEdit, now: DateTime<Utc>) {
        let ComplaintEdit {
            title,
            description,
            category,
            priority,
        } = edit;
        if let Some(title) = title {
            self.title = title;
        }
        if let Some(description) = description {
            self.description = description;
        }
        if let Some(category) = category {
            self.category = category;
        }
        if let Some(priority) = priority {
            self.priority = priority;
        }
        self.updated_at = now;
    }
}
