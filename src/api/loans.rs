//! Borrowed-copy listings and the librarian renewal endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        instance::{BookInstanceDetails, CreateBookInstance, RenewBookInstance},
        user::permissions,
    },
};

use super::{AuthenticatedUser, PageQuery, PaginatedResponse};

/// Renewal form payload: the copy and the pre-populated proposed date
#[derive(Serialize, ToSchema)]
pub struct RenewalFormResponse {
    pub instance: BookInstanceDetails,
    /// Today + the configured renewal period, recomputed per request
    pub proposed_renewal_date: NaiveDate,
}

/// Renewal outcome; `redirect_to` points the client back at the borrowed list
#[derive(Serialize, ToSchema)]
pub struct RenewalResponse {
    pub instance: BookInstanceDetails,
    pub redirect_to: String,
}

/// Copies on loan to the calling user, soonest due first
#[utoipa::path(
    get,
    path = "/mybooks",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(PageQuery),
    responses(
        (status = 200, description = "Caller's borrowed copies", body = PaginatedResponse<BookInstanceDetails>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn my_borrowed(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PaginatedResponse<BookInstanceDetails>>> {
    let (page, per_page) = query.resolve(state.config.catalog.page_size);
    let (instances, total) = state
        .services
        .loans
        .my_borrowed(claims.user_id, page, per_page)
        .await?;
    Ok(Json(PaginatedResponse::new(instances, total, page, per_page)))
}

/// All copies on loan, soonest due first (librarian view)
#[utoipa::path(
    get,
    path = "/borrowed",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(PageQuery),
    responses(
        (status = 200, description = "All borrowed copies", body = PaginatedResponse<BookInstanceDetails>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Missing permission")
    )
)]
pub async fn all_borrowed(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PaginatedResponse<BookInstanceDetails>>> {
    claims.require(permissions::CAN_MARK_RETURNED)?;

    let (page, per_page) = query.resolve(state.config.catalog.page_size);
    let (instances, total) = state.services.loans.all_borrowed(page, per_page).await?;
    Ok(Json(PaginatedResponse::new(instances, total, page, per_page)))
}

/// Renewal form data for a copy
#[utoipa::path(
    get,
    path = "/instances/{id}/renew",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Copy ID")
    ),
    responses(
        (status = 200, description = "Renewal form data", body = RenewalFormResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Missing permission"),
        (status = 404, description = "Copy not found")
    )
)]
pub async fn renewal_form(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<RenewalFormResponse>> {
    claims.require(permissions::CAN_MARK_RETURNED)?;

    let instance = state.services.loans.get_instance(id).await?;
    Ok(Json(RenewalFormResponse {
        instance,
        proposed_renewal_date: state.services.loans.proposed_renewal_date(),
    }))
}

/// Renew a copy: set a new due date
#[utoipa::path(
    post,
    path = "/instances/{id}/renew",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Copy ID")
    ),
    request_body = RenewBookInstance,
    responses(
        (status = 200, description = "Copy renewed", body = RenewalResponse),
        (status = 400, description = "Renewal date out of range"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Missing permission"),
        (status = 404, description = "Copy not found")
    )
)]
pub async fn renew_instance(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<RenewBookInstance>,
) -> AppResult<Json<RenewalResponse>> {
    claims.require(permissions::CAN_MARK_RETURNED)?;

    let instance = state.services.loans.renew(id, request.renewal_date).await?;
    Ok(Json(RenewalResponse {
        instance,
        redirect_to: "/api/v1/borrowed".to_string(),
    }))
}

/// Register a new physical copy (administrative)
#[utoipa::path(
    post,
    path = "/instances",
    tag = "loans",
    security(("bearer_auth" = [])),
    request_body = CreateBookInstance,
    responses(
        (status = 201, description = "Copy created", body = BookInstanceDetails),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Missing permission")
    )
)]
pub async fn create_instance(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(instance): Json<CreateBookInstance>,
) -> AppResult<(StatusCode, Json<BookInstanceDetails>)> {
    claims.require(permissions::ADD_BOOK_INSTANCE)?;
    instance.validate()?;

    let created = state.services.loans.create_instance(&instance).await?;
    Ok((StatusCode::CREATED, Json(created)))
}
