//! Complaint handlers for signed-in users.
//!
//! ```text
//! GET   /api/v1/dashboard
//! GET   /api/v1/complaints
//! POST  /api/v1/complaint/new    {"title":"...","description":"...","category":"Sanitation","priority":"high"}
//! GET   /api/v1/complaints/{id}
//! PATCH /api/v1/complaints/{id}  {"priority":"low"}
//! GET   /api/v1/notifications
//! ```

use actix_web::{HttpResponse, get, patch, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    Complaint, ComplaintEdit, ComplaintStats, NewComplaint, Notification, StatsScope, User,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{
    ComplaintSchema, ComplaintStatsSchema, ErrorSchema, NotificationSchema, UserSchema,
};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    complaint_validation_error, parse_complaint_id, parse_priority,
};

/// Number of complaints shown in the dashboard's "recent" list.
pub const RECENT_LIMIT: usize = 5;

/// Body of `POST /api/v1/complaint/new`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewComplaintRequest {
    /// Short summary.
    #[schema(example = "Streetlight not working")]
    pub title: String,
    /// Full description.
    pub description: String,
    /// Free-form category.
    #[schema(example = "Infrastructure")]
    pub category: String,
    /// `low`, `medium` (default) or `high`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
}

/// Body of `PATCH /api/v1/complaints/{id}`; at least one field.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintEditRequest {
    /// New title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// `low`, `medium` or `high`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
}

/// The signed-in user's dashboard.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    /// The signed-in user.
    #[schema(value_type = UserSchema)]
    pub user: User,
    /// Aggregates over the user's own complaints.
    #[schema(value_type = ComplaintStatsSchema)]
    pub stats: ComplaintStats,
    /// Newest first, at most [`RECENT_LIMIT`].
    #[schema(value_type = Vec<ComplaintSchema>)]
    pub recent: Vec<Complaint>,
}

/// Own complaint counts plus the most recent filings.
#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    responses(
        (status = 200, description = "Dashboard", body = DashboardResponse),
        (status = 401, description = "Login required", body = ErrorSchema)
    ),
    tags = ["complaints"],
    operation_id = "dashboard"
)]
#[get("/dashboard")]
pub async fn dashboard(state: web::Data<HttpState>) -> ApiResult<web::Json<DashboardResponse>> {
    let desk = state.desk().await;
    let user = desk.require_user()?;
    let complaints = desk.complaints();
    let stats = complaints.stats(&StatsScope::Owner(user.id().clone()));
    let mut recent = complaints.list_for_owner(user.id());
    recent.truncate(RECENT_LIMIT);
    Ok(web::Json(DashboardResponse {
        user,
        stats,
        recent,
    }))
}

/// Complaints filed by the signed-in user, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/complaints",
    responses(
        (status = 200, description = "Own complaints", body = [ComplaintSchema]),
        (status = 401, description = "Login required", body = ErrorSchema)
    ),
    tags = ["complaints"],
    operation_id = "listOwnComplaints"
)]
#[get("/complaints")]
pub async fn list_own_complaints(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<Complaint>>> {
    let desk = state.desk().await;
    let user = desk.require_user()?;
    Ok(web::Json(desk.complaints().list_for_owner(user.id())))
}

/// File a new complaint.
#[utoipa::path(
    post,
    path = "/api/v1/complaint/new",
    request_body = NewComplaintRequest,
    responses(
        (status = 201, description = "Complaint filed", body = ComplaintSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 503, description = "Complaint could not be saved", body = ErrorSchema)
    ),
    tags = ["complaints"],
    operation_id = "fileComplaint"
)]
#[post("/complaint/new")]
pub async fn file_complaint(
    state: web::Data<HttpState>,
    payload: web::Json<NewComplaintRequest>,
) -> ApiResult<HttpResponse> {
    let mut desk = state.desk().await;
    let user = desk.require_user()?;
    let NewComplaintRequest {
        title,
        description,
        category,
        priority,
    } = payload.into_inner();
    let priority = parse_priority(priority.as_deref())?;
    let input = NewComplaint::try_from_parts(&title, &description, &category, priority)
        .map_err(complaint_validation_error)?;

    let complaint = desk.complaints_mut().create(&user, input).await?;
    Ok(HttpResponse::Created().json(complaint))
}

/// One complaint, visible to its owner and administrators.
#[utoipa::path(
    get,
    path = "/api/v1/complaints/{id}",
    params(("id" = String, Path, description = "Complaint id, e.g. CMP-001")),
    responses(
        (status = 200, description = "Complaint", body = ComplaintSchema),
        (status = 400, description = "Malformed id", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 403, description = "Owned by another user", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["complaints"],
    operation_id = "getComplaint"
)]
#[get("/complaints/{id}")]
pub async fn get_complaint(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Complaint>> {
    let desk = state.desk().await;
    let user = desk.require_user()?;
    let id = parse_complaint_id(&path)?;
    let complaint = desk.complaints().get_for(&user, &id)?.clone();
    Ok(web::Json(complaint))
}

/// Edit a complaint's details while it is still submitted.
#[utoipa::path(
    patch,
    path = "/api/v1/complaints/{id}",
    params(("id" = String, Path, description = "Complaint id, e.g. CMP-001")),
    request_body = ComplaintEditRequest,
    responses(
        (status = 200, description = "Updated complaint", body = ComplaintSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 403, description = "Owned by another user", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "No longer editable", body = ErrorSchema),
        (status = 503, description = "Edit could not be saved", body = ErrorSchema)
    ),
    tags = ["complaints"],
    operation_id = "editComplaint"
)]
#[patch("/complaints/{id}")]
pub async fn edit_complaint(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<ComplaintEditRequest>,
) -> ApiResult<web::Json<Complaint>> {
    let mut desk = state.desk().await;
    let user = desk.require_user()?;
    let id = parse_complaint_id(&path)?;
    let ComplaintEditRequest {
        title,
        description,
        category,
        priority,
    } = payload.into_inner();
    let priority = parse_priority(priority.as_deref())?;
    let edit = ComplaintEdit::try_from_parts(
        title.as_deref(),
        description.as_deref(),
        category.as_deref(),
        priority,
    )
    .map_err(complaint_validation_error)?;

    let complaint = desk.complaints_mut().update_details(&user, &id, edit).await?;
    Ok(web::Json(complaint))
}

/// Notification feed derived from complaint activity.
#[utoipa::path(
    get,
    path = "/api/v1/notifications",
    responses(
        (status = 200, description = "Newest first", body = [NotificationSchema]),
        (status = 401, description = "Login required", body = ErrorSchema)
    ),
    tags = ["complaints"],
    operation_id = "notifications"
)]
#[get("/notifications")]
pub async fn notifications(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<Notification>>> {
    let desk = state.desk().await;
    let user = desk.require_user()?;
    Ok(web::Json(desk.complaints().notifications_for(&user)))
}

#[cfg(test)]
#[path = "complaints_tests.rs"]
mod tests;
