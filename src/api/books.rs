//! Book (catalog title) endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        book::{Book, BookShort, CreateBook, UpdateBook},
        instance::{BookInstanceDetails, LoanStatus},
        user::permissions,
    },
};

use super::{AuthenticatedUser, PageQuery, PaginatedResponse};

/// Status code → label pair for client-side rendering of copy status
#[derive(Serialize, ToSchema)]
pub struct StatusLabel {
    pub code: String,
    pub label: String,
}

/// Book detail payload: the book, its copies and display helpers
#[derive(Serialize, ToSchema)]
pub struct BookDetail {
    #[serde(flatten)]
    pub book: Book,
    /// First three genres, comma separated
    pub display_genre: String,
    pub copies: Vec<BookInstanceDetails>,
    /// The full status code → label map
    pub status_labels: Vec<StatusLabel>,
}

/// List books with pagination
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    params(PageQuery),
    responses(
        (status = 200, description = "One page of books", body = PaginatedResponse<BookShort>)
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PaginatedResponse<BookShort>>> {
    let (page, per_page) = query.resolve(state.config.catalog.page_size);
    let (books, total) = state.services.catalog.list_books(page, per_page).await?;
    Ok(Json(PaginatedResponse::new(books, total, page, per_page)))
}

/// Get book details by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details", body = BookDetail),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<BookDetail>> {
    let (book, copies) = state.services.catalog.get_book(id).await?;
    let display_genre = book.display_genre();

    Ok(Json(BookDetail {
        book,
        display_genre,
        copies,
        status_labels: LoanStatus::labels()
            .iter()
            .map(|(code, label)| StatusLabel {
                code: code.to_string(),
                label: label.to_string(),
            })
            .collect(),
    }))
}

/// Create a new book
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Invalid input or duplicate ISBN"),
        (status = 403, description = "Missing permission")
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(book): Json<CreateBook>,
) -> AppResult<(StatusCode, Json<Book>)> {
    claims.require(permissions::ADD_BOOK)?;
    book.validate()?;

    let created = state.services.catalog.create_book(&book).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update an existing book
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 400, description = "Invalid input or duplicate ISBN"),
        (status = 403, description = "Missing permission"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(book): Json<UpdateBook>,
) -> AppResult<Json<Book>> {
    claims.require(permissions::CHANGE_BOOK)?;
    book.validate()?;

    let updated = state.services.catalog.update_book(id, &book).await?;
    Ok(Json(updated))
}

/// Delete a book. Returns 409 while copies of it survive, so the client
/// can re-present the delete confirmation.
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 403, description = "Missing permission"),
        (status = 404, description = "Book not found"),
        (status = 409, description = "Book still has copies")
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require(permissions::DELETE_BOOK)?;

    state.services.catalog.delete_book(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
