//! Catalog service: books, genres and the overview counts

use crate::{
    error::AppResult,
    models::{
        book::{Book, BookShort, CreateBook, UpdateBook},
        genre::{CreateGenre, Genre},
        instance::{BookInstanceDetails, LoanStatus},
    },
    repository::Repository,
};

/// Aggregate counts shown on the catalog home page
#[derive(Debug, Clone, Copy)]
pub struct CatalogCounts {
    pub num_books: i64,
    pub num_instances: i64,
    pub num_instances_available: i64,
    pub num_authors: i64,
}

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Counts for the overview page
    pub async fn overview_counts(&self) -> AppResult<CatalogCounts> {
        Ok(CatalogCounts {
            num_books: self.repository.books.count().await?,
            num_instances: self.repository.instances.count().await?,
            num_instances_available: self
                .repository
                .instances
                .count_by_status(LoanStatus::Available)
                .await?,
            num_authors: self.repository.authors.count().await?,
        })
    }

    /// List books, one page at a time
    pub async fn list_books(&self, page: i64, per_page: i64) -> AppResult<(Vec<BookShort>, i64)> {
        self.repository.books.list(page, per_page).await
    }

    /// Get a book with its author, genres and copies
    pub async fn get_book(&self, id: i32) -> AppResult<(Book, Vec<BookInstanceDetails>)> {
        let book = self.repository.books.get_by_id(id).await?;
        let copies = self.repository.instances.list_for_book(id).await?;
        Ok((book, copies))
    }

    pub async fn create_book(&self, data: &CreateBook) -> AppResult<Book> {
        self.repository.books.create(data).await
    }

    pub async fn update_book(&self, id: i32, data: &UpdateBook) -> AppResult<Book> {
        self.repository.books.update(id, data).await
    }

    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        self.repository.books.delete(id).await
    }

    /// List all genres
    pub async fn list_genres(&self) -> AppResult<Vec<Genre>> {
        self.repository.genres.list().await
    }

    pub async fn create_genre(&self, data: &CreateGenre) -> AppResult<Genre> {
        self.repository.genres.create(data).await
    }

    pub async fn delete_genre(&self, id: i32) -> AppResult<()> {
        self.repository.genres.delete(id).await
    }
}
