//! Book (catalog title) model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::author::Author;
use super::genre::Genre;

/// Full book model (DB + API). Relations are loaded separately.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    /// Null when the author was removed from the catalog
    pub author_id: Option<i32>,
    pub summary: String,
    pub isbn: String,
    #[sqlx(skip)]
    #[serde(default)]
    pub author: Option<Author>,
    #[sqlx(skip)]
    #[serde(default)]
    pub genres: Vec<Genre>,
}

impl Book {
    /// First three genre names, comma separated
    pub fn display_genre(&self) -> String {
        self.genres
            .iter()
            .take(3)
            .map(|g| g.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Stable detail-page address for this book
    pub fn detail_url(&self) -> String {
        format!("/books/{}", self.id)
    }
}

/// Short book representation for lists. The author name comes from the list
/// query's join, so rendering a page costs a single query.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookShort {
    pub id: i32,
    pub title: String,
    pub isbn: String,
    pub author_id: Option<i32>,
    pub author_first_name: Option<String>,
    pub author_last_name: Option<String>,
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
    pub author_id: Option<i32>,
    #[validate(length(max = 1000, message = "Summary must be at most 1000 characters"))]
    #[serde(default)]
    pub summary: String,
    #[validate(length(equal = 13, message = "ISBN must be exactly 13 characters"))]
    pub isbn: String,
    #[serde(default)]
    pub genre_ids: Vec<i32>,
}

/// Update book request; replaces the full editable field set
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
    pub author_id: Option<i32>,
    #[validate(length(max = 1000, message = "Summary must be at most 1000 characters"))]
    #[serde(default)]
    pub summary: String,
    #[validate(length(equal = 13, message = "ISBN must be exactly 13 characters"))]
    pub isbn: String,
    #[serde(default)]
    pub genre_ids: Vec<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book_with_genres(names: &[&str]) -> Book {
        Book {
            id: 3,
            title: "The Dispossessed".to_string(),
            author_id: Some(7),
            summary: String::new(),
            isbn: "9780061054884".to_string(),
            author: None,
            genres: names
                .iter()
                .enumerate()
                .map(|(i, name)| Genre {
                    id: i as i32 + 1,
                    name: name.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn display_genre_truncates_to_three_names() {
        let book = book_with_genres(&["Science Fiction", "Utopian", "Political", "Classics"]);
        assert_eq!(book.display_genre(), "Science Fiction, Utopian, Political");
    }

    #[test]
    fn display_genre_with_fewer_than_three() {
        let book = book_with_genres(&["Science Fiction"]);
        assert_eq!(book.display_genre(), "Science Fiction");
    }

    #[test]
    fn display_genre_empty_without_genres() {
        let book = book_with_genres(&[]);
        assert_eq!(book.display_genre(), "");
    }

    #[test]
    fn detail_url_uses_id() {
        assert_eq!(book_with_genres(&[]).detail_url(), "/books/3");
    }
}
