//! Book instances (physical copies) repository for database operations

use chrono::NaiveDate;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{is_foreign_key_violation, AppError, AppResult},
    models::instance::{BookInstanceDetails, CreateBookInstance, LoanStatus},
};

// Copies with no due date sort after dated ones.
const BORROWED_ORDER: &str = "ORDER BY bi.due_back ASC NULLS LAST, bi.id";

#[derive(Clone)]
pub struct InstancesRepository {
    pool: Pool<Postgres>,
}

impl InstancesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get a copy by its identifier, with book title and borrower joined
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<BookInstanceDetails> {
        sqlx::query_as::<_, BookInstanceDetails>(
            r#"
            SELECT bi.id, bi.book_id, b.title AS book_title, bi.imprint,
                   bi.due_back, bi.status, bi.borrower_id, u.login AS borrower
            FROM book_instances bi
            JOIN books b ON bi.book_id = b.id
            LEFT JOIN users u ON bi.borrower_id = u.id
            WHERE bi.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book instance with id {} not found", id)))
    }

    /// All copies of a book, for the book detail view
    pub async fn list_for_book(&self, book_id: i32) -> AppResult<Vec<BookInstanceDetails>> {
        let query = format!(
            r#"
            SELECT bi.id, bi.book_id, b.title AS book_title, bi.imprint,
                   bi.due_back, bi.status, bi.borrower_id, u.login AS borrower
            FROM book_instances bi
            JOIN books b ON bi.book_id = b.id
            LEFT JOIN users u ON bi.borrower_id = u.id
            WHERE bi.book_id = $1
            {}
            "#,
            BORROWED_ORDER
        );

        let instances = sqlx::query_as::<_, BookInstanceDetails>(&query)
            .bind(book_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(instances)
    }

    /// All copies currently on loan, soonest due first
    pub async fn list_on_loan(
        &self,
        page: i64,
        per_page: i64,
    ) -> AppResult<(Vec<BookInstanceDetails>, i64)> {
        let query = format!(
            r#"
            SELECT bi.id, bi.book_id, b.title AS book_title, bi.imprint,
                   bi.due_back, bi.status, bi.borrower_id, u.login AS borrower
            FROM book_instances bi
            JOIN books b ON bi.book_id = b.id
            LEFT JOIN users u ON bi.borrower_id = u.id
            WHERE bi.status = 'o'
            {}
            LIMIT $1 OFFSET $2
            "#,
            BORROWED_ORDER
        );

        let instances = sqlx::query_as::<_, BookInstanceDetails>(&query)
            .bind(per_page)
            .bind((page - 1) * per_page)
            .fetch_all(&self.pool)
            .await?;

        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM book_instances WHERE status = 'o'")
                .fetch_one(&self.pool)
                .await?;

        Ok((instances, total))
    }

    /// Copies on loan to one borrower, soonest due first
    pub async fn list_borrowed_by(
        &self,
        borrower_id: i32,
        page: i64,
        per_page: i64,
    ) -> AppResult<(Vec<BookInstanceDetails>, i64)> {
        let query = format!(
            r#"
            SELECT bi.id, bi.book_id, b.title AS book_title, bi.imprint,
                   bi.due_back, bi.status, bi.borrower_id, u.login AS borrower
            FROM book_instances bi
            JOIN books b ON bi.book_id = b.id
            LEFT JOIN users u ON bi.borrower_id = u.id
            WHERE bi.status = 'o' AND bi.borrower_id = $1
            {}
            LIMIT $2 OFFSET $3
            "#,
            BORROWED_ORDER
        );

        let instances = sqlx::query_as::<_, BookInstanceDetails>(&query)
            .bind(borrower_id)
            .bind(per_page)
            .bind((page - 1) * per_page)
            .fetch_all(&self.pool)
            .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM book_instances WHERE status = 'o' AND borrower_id = $1",
        )
        .bind(borrower_id)
        .fetch_one(&self.pool)
        .await?;

        Ok((instances, total))
    }

    /// Create a copy with a freshly generated identifier
    pub async fn create(&self, data: &CreateBookInstance) -> AppResult<BookInstanceDetails> {
        let id = Uuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO book_instances (id, book_id, imprint, due_back, status, borrower_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(id)
        .bind(data.book_id)
        .bind(&data.imprint)
        .bind(data.due_back)
        .bind(data.status)
        .bind(data.borrower_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                AppError::Validation("Unknown book or borrower reference".to_string())
            } else {
                AppError::from(e)
            }
        })?;

        self.get_by_id(id).await
    }

    /// Persist a renewed due date. Nothing else on the row changes.
    pub async fn set_due_back(&self, id: Uuid, due_back: NaiveDate) -> AppResult<()> {
        let result = sqlx::query("UPDATE book_instances SET due_back = $1 WHERE id = $2")
            .bind(due_back)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Book instance with id {} not found",
                id
            )));
        }
        Ok(())
    }

    /// Count all copies
    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM book_instances")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Count copies with the given status
    pub async fn count_by_status(&self, status: LoanStatus) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM book_instances WHERE status = $1")
                .bind(status)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }
}
