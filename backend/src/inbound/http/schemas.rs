//! OpenAPI schema definitions for domain types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. This
//! module provides the schema definitions required for OpenAPI documentation
//! using utoipa's external schema registration.
//!
//! The schema wrappers mirror the serialised shape of their corresponding
//! domain types but live in the inbound adapter layer where framework
//! concerns belong.

#![expect(
    dead_code,
    reason = "Schema wrappers are used only for OpenAPI generation via utoipa"
)]

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
///
/// Stable machine-readable error codes returned in API error responses.
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// Authentication failed or is missing.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// Authenticated but not permitted to perform this action.
    #[schema(rename = "forbidden")]
    Forbidden,
    /// The requested resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The request conflicts with existing state.
    #[schema(rename = "conflict")]
    Conflict,
    /// The key-value store rejected a write.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
///
/// API error response payload with machine-readable code and human-readable
/// message.
#[derive(ToSchema)]
#[schema(as = crate::domain::Error, rename_all = "camelCase")]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "invalid_request")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "Passwords do not match")]
    message: String,
    /// Correlation identifier for tracing this error across systems.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Supplementary error details, typically `{ "field", "code" }`.
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::Role`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Role)]
pub enum RoleSchema {
    /// Ordinary complainant.
    #[schema(rename = "user")]
    User,
    /// Administrator.
    #[schema(rename = "admin")]
    Admin,
}

/// OpenAPI schema for [`crate::domain::User`].
///
/// Signed-in user as exposed to clients; never carries credentials.
#[derive(ToSchema)]
#[schema(as = crate::domain::User)]
pub struct UserSchema {
    /// Stable user identifier.
    #[schema(example = "user-1")]
    id: String,
    /// Display name.
    #[schema(example = "Manish Kumar")]
    name: String,
    /// Login email.
    #[schema(example = "manish@example.com")]
    email: String,
    role: RoleSchema,
}

/// OpenAPI schema for [`crate::domain::ComplaintStatus`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ComplaintStatus)]
pub enum ComplaintStatusSchema {
    /// Filed and awaiting triage.
    #[schema(rename = "submitted")]
    Submitted,
    /// Being worked on.
    #[schema(rename = "in_progress")]
    InProgress,
    /// Closed.
    #[schema(rename = "resolved")]
    Resolved,
}

/// OpenAPI schema for [`crate::domain::Priority`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Priority)]
pub enum PrioritySchema {
    /// Low priority.
    #[schema(rename = "low")]
    Low,
    /// Medium priority.
    #[schema(rename = "medium")]
    Medium,
    /// High priority.
    #[schema(rename = "high")]
    High,
}

/// OpenAPI schema for [`crate::domain::StatusChange`].
#[derive(ToSchema)]
#[schema(as = crate::domain::StatusChange, rename_all = "camelCase")]
pub struct StatusChangeSchema {
    from: ComplaintStatusSchema,
    to: ComplaintStatusSchema,
    #[schema(example = "admin-1")]
    changed_by: String,
    note: Option<String>,
    #[schema(format = DateTime)]
    changed_at: String,
}

/// OpenAPI schema for [`crate::domain::Complaint`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Complaint, rename_all = "camelCase")]
pub struct ComplaintSchema {
    #[schema(example = "CMP-001")]
    id: String,
    #[schema(example = "Streetlight not working")]
    title: String,
    description: String,
    #[schema(example = "Infrastructure")]
    category: String,
    priority: PrioritySchema,
    status: ComplaintStatusSchema,
    #[schema(example = "user-1")]
    owner_id: String,
    owner_name: String,
    #[schema(format = DateTime)]
    created_at: String,
    #[schema(format = DateTime)]
    updated_at: String,
    history: Vec<StatusChangeSchema>,
}

/// OpenAPI schema for [`crate::domain::StatusCounts`].
#[derive(ToSchema)]
#[schema(as = crate::domain::StatusCounts, rename_all = "camelCase")]
pub struct StatusCountsSchema {
    submitted: usize,
    in_progress: usize,
    resolved: usize,
}

/// OpenAPI schema for [`crate::domain::PriorityCounts`].
#[derive(ToSchema)]
#[schema(as = crate::domain::PriorityCounts)]
pub struct PriorityCountsSchema {
    low: usize,
    medium: usize,
    high: usize,
}

/// OpenAPI schema for [`crate::domain::CategoryCount`].
#[derive(ToSchema)]
#[schema(as = crate::domain::CategoryCount)]
pub struct CategoryCountSchema {
    category: String,
    count: usize,
}

/// OpenAPI schema for [`crate::domain::ComplaintStats`].
///
/// Aggregates behind the dashboard cards and charts.
#[derive(ToSchema)]
#[schema(as = crate::domain::ComplaintStats, rename_all = "camelCase")]
pub struct ComplaintStatsSchema {
    total: usize,
    by_status: StatusCountsSchema,
    by_priority: PriorityCountsSchema,
    /// Largest first, ties broken alphabetically.
    by_category: Vec<CategoryCountSchema>,
}

/// OpenAPI schema for [`crate::domain::NotificationKind`].
#[derive(ToSchema)]
#[schema(as = crate::domain::NotificationKind)]
pub enum NotificationKindSchema {
    /// A complaint was filed.
    #[schema(rename = "submitted")]
    Submitted,
    /// A complaint changed status.
    #[schema(rename = "status_changed")]
    StatusChanged,
}

/// OpenAPI schema for [`crate::domain::Notification`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Notification, rename_all = "camelCase")]
pub struct NotificationSchema {
    #[schema(example = "CMP-002-1")]
    id: String,
    complaint_id: String,
    kind: NotificationKindSchema,
    #[schema(example = "Complaint CMP-002 in progress")]
    message: String,
    #[schema(format = DateTime)]
    at: String,
}

/// OpenAPI schema for [`crate::domain::ThemePreference`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ThemePreference)]
pub enum ThemePreferenceSchema {
    /// Always light.
    #[schema(rename = "light")]
    Light,
    /// Always dark.
    #[schema(rename = "dark")]
    Dark,
    /// Follow the client's system setting.
    #[schema(rename = "system")]
    System,
}

/// OpenAPI schema for [`crate::domain::ResolvedTheme`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ResolvedTheme)]
pub enum ResolvedThemeSchema {
    /// Light palette.
    #[schema(rename = "light")]
    Light,
    /// Dark palette.
    #[schema(rename = "dark")]
    Dark,
}
