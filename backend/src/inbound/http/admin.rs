//! Administrator handlers.
//!
//! ```text
//! GET   /api/v1/admin
//! GET   /api/v1/admin/users
//! GET   /api/v1/admin/complaints?status=submitted&priority=high&category=roads&owner=user-1&search=leak
//! PATCH /api/v1/admin/complaints/{id}/status  {"status":"in_progress","note":"Crew assigned"}
//! ```

use actix_web::{get, patch, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{Complaint, ComplaintFilter, ComplaintStats, StatsScope, User, status_note};
use crate::inbound::http::ApiResult;
use crate::inbound::http::complaints::RECENT_LIMIT;
use crate::inbound::http::schemas::{
    ComplaintSchema, ComplaintStatsSchema, ErrorSchema, UserSchema,
};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, complaint_validation_error, parse_complaint_id, parse_priority, parse_status,
    parse_user_id,
};

/// Desk-wide overview for administrators.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminOverviewResponse {
    /// Desk-wide aggregates.
    #[schema(value_type = ComplaintStatsSchema)]
    pub stats: ComplaintStats,
    /// Registered accounts.
    pub user_count: usize,
    /// Newest filings across every user.
    #[schema(value_type = Vec<ComplaintSchema>)]
    pub recent: Vec<Complaint>,
}

/// Query string of `GET /api/v1/admin/complaints`. Every criterion is optional.
#[derive(Debug, Default, Deserialize, Serialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AdminComplaintsQuery {
    /// `submitted`, `in_progress` or `resolved`.
    pub status: Option<String>,
    /// `low`, `medium` or `high`.
    pub priority: Option<String>,
    /// Case-insensitive category name.
    pub category: Option<String>,
    /// Owner's user id.
    pub owner: Option<String>,
    /// Case-insensitive text matched against id, title and description.
    pub search: Option<String>,
}

impl AdminComplaintsQuery {
    fn into_filter(self) -> ApiResult<ComplaintFilter> {
        let Self {
            status,
            priority,
            category,
            owner,
            search,
        } = self;
        Ok(ComplaintFilter {
            status: status.as_deref().map(parse_status).transpose()?,
            priority: parse_priority(priority.as_deref())?,
            category: category.filter(|value| !value.trim().is_empty()),
            owner: parse_user_id(owner.as_deref(), FieldName::new("owner"))?,
            search,
        })
    }
}

/// Body of `PATCH /api/v1/admin/complaints/{id}/status`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateRequest {
    /// `submitted`, `in_progress` or `resolved`.
    #[schema(example = "in_progress")]
    pub status: String,
    /// Optional note recorded in the complaint history.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Desk-wide counts, user count and newest filings.
#[utoipa::path(
    get,
    path = "/api/v1/admin",
    responses(
        (status = 200, description = "Overview", body = AdminOverviewResponse),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 403, description = "Administrator role required", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "adminOverview"
)]
#[get("/admin")]
pub async fn admin_overview(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<AdminOverviewResponse>> {
    let desk = state.desk().await;
    desk.require_admin()?;
    let complaints = desk.complaints();
    let mut recent = complaints.list(&ComplaintFilter::default());
    recent.truncate(RECENT_LIMIT);
    Ok(web::Json(AdminOverviewResponse {
        stats: complaints.stats(&StatsScope::Desk),
        user_count: desk.accounts().account_count(),
        recent,
    }))
}

/// Every account, without credentials.
#[utoipa::path(
    get,
    path = "/api/v1/admin/users",
    responses(
        (status = 200, description = "Users", body = [UserSchema]),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 403, description = "Administrator role required", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "listUsers"
)]
#[get("/admin/users")]
pub async fn list_users(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<User>>> {
    let desk = state.desk().await;
    desk.require_admin()?;
    Ok(web::Json(desk.accounts().users()))
}

/// Filtered complaint listing, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/admin/complaints",
    params(AdminComplaintsQuery),
    responses(
        (status = 200, description = "Matching complaints", body = [ComplaintSchema]),
        (status = 400, description = "Invalid filter", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 403, description = "Administrator role required", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "listComplaints"
)]
#[get("/admin/complaints")]
pub async fn list_complaints(
    state: web::Data<HttpState>,
    query: web::Query<AdminComplaintsQuery>,
) -> ApiResult<web::Json<Vec<Complaint>>> {
    let desk = state.desk().await;
    desk.require_admin()?;
    let filter = query.into_inner().into_filter()?;
    Ok(web::Json(desk.complaints().list(&filter)))
}

/// Move a complaint through its lifecycle.
#[utoipa::path(
    patch,
    path = "/api/v1/admin/complaints/{id}/status",
    params(("id" = String, Path, description = "Complaint id, e.g. CMP-001")),
    request_body = StatusUpdateRequest,
    responses(
        (status = 200, description = "Updated complaint", body = ComplaintSchema),
        (status = 400, description = "Invalid request or unchanged status", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 403, description = "Administrator role required", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 503, description = "Change could not be saved", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "updateComplaintStatus"
)]
#[patch("/admin/complaints/{id}/status")]
pub async fn update_status(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<StatusUpdateRequest>,
) -> ApiResult<web::Json<Complaint>> {
    let mut desk = state.desk().await;
    let admin = desk.require_admin()?;
    let id = parse_complaint_id(&path)?;
    let StatusUpdateRequest { status, note } = payload.into_inner();
    let status = parse_status(&status)?;
    let note = status_note(note.as_deref()).map_err(complaint_validation_error)?;

    let complaint = desk
        .complaints_mut()
        .update_status(&admin, &id, status, note)
        .await?;
    Ok(web::Json(complaint))
}

#[cfg(test)]
#[path = "admin_tests.rs"]
mod tests;
