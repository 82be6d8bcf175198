//! API handlers for Lectern REST endpoints

pub mod auth;
pub mod authors;
pub mod books;
pub mod catalog;
pub mod genres;
pub mod health;
pub mod loans;
pub mod openapi;
pub mod users;

use axum::{
    async_trait,
    extract::{FromRequestParts, OriginalUri},
    http::{header::AUTHORIZATION, request::Parts},
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{error::AppError, models::user::UserClaims, AppState};

/// Extractor for authenticated user from JWT token. The request path is
/// captured so a 401 can point the client at login with `next` preserved.
pub struct AuthenticatedUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // The nested router strips the /api/v1 prefix from parts.uri
        let next = Some(
            parts
                .extensions
                .get::<OriginalUri>()
                .map(|uri| uri.path().to_string())
                .unwrap_or_else(|| parts.uri.path().to_string()),
        );

        // Get the Authorization header
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication {
                message: "Missing authorization header".to_string(),
                next: next.clone(),
            })?;

        // Check for Bearer token
        if !auth_header.starts_with("Bearer ") {
            return Err(AppError::Authentication {
                message: "Invalid authorization header format".to_string(),
                next,
            });
        }

        let token = &auth_header[7..];

        // Validate JWT token using the secret from configuration
        let claims = UserClaims::from_token(token, &state.config.auth.jwt_secret).map_err(|e| {
            AppError::Authentication {
                message: e.to_string(),
                next,
            }
        })?;

        Ok(AuthenticatedUser(claims))
    }
}

/// Pagination query parameters shared by the list endpoints
#[derive(Debug, Deserialize, IntoParams)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl PageQuery {
    /// Resolved (page, per_page) with the configured default page size
    pub fn resolve(&self, default_page_size: i64) -> (i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(default_page_size).clamp(1, 100);
        (page, per_page)
    }
}

/// Paginated response wrapper
#[derive(Serialize, ToSchema)]
pub struct PaginatedResponse<T>
where
    T: for<'a> ToSchema<'a>,
{
    /// One page of results
    pub items: Vec<T>,
    /// Total number of matching rows
    pub total: i64,
    /// Current page number (1-based)
    pub page: i64,
    /// Rows per page
    pub per_page: i64,
    pub total_pages: i64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl<T> PaginatedResponse<T>
where
    T: for<'a> ToSchema<'a>,
{
    pub fn new(items: Vec<T>, total: i64, page: i64, per_page: i64) -> Self {
        // An empty result set is still one (empty) valid page.
        let total_pages = if total == 0 {
            1
        } else {
            (total + per_page - 1) / per_page
        };
        Self {
            has_next: page < total_pages,
            has_previous: page > 1,
            items,
            total,
            page,
            per_page,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::genre::Genre;

    #[test]
    fn page_query_defaults() {
        let query = PageQuery {
            page: None,
            per_page: None,
        };
        assert_eq!(query.resolve(10), (1, 10));
    }

    #[test]
    fn page_query_clamps_out_of_range_values() {
        let query = PageQuery {
            page: Some(0),
            per_page: Some(5000),
        };
        assert_eq!(query.resolve(10), (1, 100));
    }

    #[test]
    fn empty_result_is_one_valid_page() {
        let page = PaginatedResponse::<Genre>::new(vec![], 0, 1, 10);
        assert_eq!(page.total_pages, 1);
        assert!(!page.has_next);
        assert!(!page.has_previous);
    }

    #[test]
    fn pagination_metadata_at_boundaries() {
        let rows = |n: usize| {
            (0..n)
                .map(|i| Genre {
                    id: i as i32,
                    name: format!("genre-{}", i),
                })
                .collect::<Vec<_>>()
        };

        // 21 rows at 10 per page: pages 1 and 2 have a next page, 3 does not
        let first = PaginatedResponse::new(rows(10), 21, 1, 10);
        assert_eq!(first.total_pages, 3);
        assert!(first.has_next);
        assert!(!first.has_previous);

        let last = PaginatedResponse::new(rows(1), 21, 3, 10);
        assert!(!last.has_next);
        assert!(last.has_previous);
    }
}
