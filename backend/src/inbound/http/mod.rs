//! HTTP inbound adapter exposing the desk as REST endpoints.
//!
//! Handlers lock the shared [`state::HttpState`] desk for one operation,
//! translate request bodies into validated domain inputs, and let
//! [`crate::domain::Error`] render failures through its `ResponseError`
//! implementation.

use actix_web::web;

pub mod admin;
pub mod complaints;
pub mod error;
pub mod health;
pub mod schemas;
pub mod session;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod theme;
pub mod validation;

pub use error::ApiResult;

/// Register every API handler and the extractor error handlers; mount under
/// `/api/v1`.
///
/// # Examples
/// ```
/// use actix_web::{App, web};
/// use complaint_desk::inbound::http::configure;
///
/// let app = App::new().service(web::scope("/api/v1").configure(configure));
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.configure(error::extractor_config)
        .service(session::login)
        .service(session::register)
        .service(session::logout)
        .service(session::current_session)
        .service(session::update_current_user)
        .service(complaints::dashboard)
        .service(complaints::list_own_complaints)
        .service(complaints::file_complaint)
        .service(complaints::get_complaint)
        .service(complaints::edit_complaint)
        .service(complaints::notifications)
        .service(admin::admin_overview)
        .service(admin::list_users)
        .service(admin::list_complaints)
        .service(admin::update_status)
        .service(theme::get_theme)
        .service(theme::set_theme);
}
