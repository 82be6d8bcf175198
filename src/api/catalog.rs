//! Catalog overview endpoint

use axum::{extract::State, Json};
use serde::Serialize;
use tower_cookies::{Cookie, Cookies};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppResult;

const SESSION_COOKIE: &str = "lectern_session";

/// Catalog overview payload
#[derive(Serialize, ToSchema)]
pub struct OverviewResponse {
    pub num_books: i64,
    pub num_instances: i64,
    /// Copies with status Available
    pub num_instances_available: i64,
    pub num_authors: i64,
    /// Visits this session had made before the current one
    pub num_visits: i64,
}

/// Catalog overview: entity counts plus the session visit counter
#[utoipa::path(
    get,
    path = "/",
    tag = "catalog",
    responses(
        (status = 200, description = "Catalog overview", body = OverviewResponse)
    )
)]
pub async fn overview(
    State(state): State<crate::AppState>,
    cookies: Cookies,
) -> AppResult<Json<OverviewResponse>> {
    let session_id = match cookies.get(SESSION_COOKIE) {
        Some(cookie) => cookie.value().to_string(),
        None => {
            let id = Uuid::new_v4().to_string();
            let mut cookie = Cookie::new(SESSION_COOKIE, id.clone());
            cookie.set_path("/");
            cookie.set_http_only(true);
            cookies.add(cookie);
            id
        }
    };

    let num_visits = state.services.sessions.record_visit(&session_id).await?;
    let counts = state.services.catalog.overview_counts().await?;

    Ok(Json(OverviewResponse {
        num_books: counts.num_books,
        num_instances: counts.num_instances,
        num_instances_available: counts.num_instances_available,
        num_authors: counts.num_authors,
        num_visits,
    }))
}
