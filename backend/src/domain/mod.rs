//! Domain primitives, managers and ports.
//!
//! Purpose: own the complaint desk's state (accounts and session, complaints,
//! theme) and the rules applied to it, independent of any transport or
//! storage technology. Adapters reach the outside world only through
//! [`ports`].
//!
//! Public surface:
//! - [`Desk`] and [`DeskPorts`]: the owned application state and its wiring.
//! - [`AccountManager`], [`ComplaintManager`], [`ThemeManager`].
//! - Value objects: [`User`], [`Complaint`], [`LoginCredentials`], ...
//! - [`Error`] / [`ErrorCode`]: transport-agnostic failures.

pub mod accounts;
pub mod auth;
pub mod complaint;
pub mod complaints;
pub mod defaults;
pub mod desk;
pub mod error;
pub mod persisted;
pub mod ports;
pub mod theme;
pub mod trace_id;
pub mod user;

pub use self::accounts::{Account, AccountManager};
pub use self::auth::{
    AuthValidationError, Field, LoginCredentials, PASSWORD_MIN_LEN, Password, PasswordHash,
    Registration, RegistrationForm, UserUpdate,
};
pub use self::complaint::{
    Category, Complaint, ComplaintDescription, ComplaintEdit, ComplaintId, ComplaintStatus,
    ComplaintTitle, ComplaintValidationError, NewComplaint, Priority, StatusChange, status_note,
};
pub use self::complaints::{
    CategoryCount, ComplaintFilter, ComplaintManager, ComplaintStats, NOTIFICATION_LIMIT,
    Notification, NotificationKind, PriorityCounts, StatsScope, StatusCounts,
};
pub use self::desk::{Desk, DeskPorts};
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::persisted::{HydrationIssue, HydrationIssueKind, HydrationReport};
pub use self::theme::{ResolvedTheme, ThemeManager, ThemePreference, UnknownTheme};
pub use self::trace_id::TraceId;
pub use self::user::{DisplayName, Email, Role, User, UserId, UserValidationError};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use complaint_desk::domain::{ApiResult, Error};
///
/// fn guarded() -> ApiResult<()> {
///     Err(Error::forbidden("nope"))
/// }
/// assert!(guarded().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
