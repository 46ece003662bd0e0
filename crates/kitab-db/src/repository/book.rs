//! # Book Repository
//!
//! Database operations for the catalog.
//!
//! ## Key Operation: Canonical Price Resolution
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Checkout submits ids ──► get_by_ids() ──► active books only            │
//! │                                                                         │
//! │  The pricing engine compares the returned slice against the            │
//! │  submitted ids and rejects the order with the FULL list of ids that    │
//! │  did not resolve. Missing ids are therefore never silently dropped     │
//! │  here - this query simply returns what exists.                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use kitab_core::Book;

const BOOK_COLUMNS: &str =
    "id, title, author, price_cents, cover_image, is_active, created_at, updated_at";

/// Repository for catalog database operations.
#[derive(Debug, Clone)]
pub struct BookRepository {
    pool: SqlitePool,
}

impl BookRepository {
    /// Creates a new BookRepository.
    pub fn new(pool: SqlitePool) -> Self {
        BookRepository { pool }
    }

    /// Gets a book by ID (active or not).
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Book>> {
        let book = sqlx::query_as::<_, Book>(&format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(book)
    }

    /// Resolves a set of ids to their ACTIVE catalog rows.
    ///
    /// Returns only the books that exist and are purchasable; the caller
    /// diffs against its requested ids to report the rest.
    pub async fn get_by_ids(&self, ids: &[String]) -> DbResult<Vec<Book>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        debug!(count = ids.len(), "Resolving catalog ids");

        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE is_active = 1 AND id IN ("
        ));
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(id);
        }
        builder.push(")");

        let books = builder
            .build_query_as::<Book>()
            .fetch_all(&self.pool)
            .await?;

        Ok(books)
    }

    /// Lists active books, newest first.
    pub async fn list_active(&self, limit: u32) -> DbResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(&format!(
            "SELECT {BOOK_COLUMNS} FROM books \
             WHERE is_active = 1 ORDER BY created_at DESC LIMIT ?1"
        ))
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }

    /// Inserts a book. Used by the seed binary and tests; the admin catalog
    /// screens live outside this service.
    pub async fn insert(&self, book: &Book) -> DbResult<()> {
        debug!(id = %book.id, title = %book.title, "Inserting book");

        sqlx::query(
            "INSERT INTO books (id, title, author, price_cents, cover_image, is_active, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(&book.id)
        .bind(&book.title)
        .bind(&book.author)
        .bind(book.price_cents)
        .bind(&book.cover_image)
        .bind(book.is_active)
        .bind(book.created_at)
        .bind(book.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

/// Generates a new book ID.
pub fn generate_book_id() -> String {
    Uuid::new_v4().to_string()
}

/// Builds a Book value with fresh timestamps (seed/test helper).
pub fn new_book(title: &str, author: Option<&str>, price_cents: i64) -> Book {
    let now = Utc::now();
    Book {
        id: generate_book_id(),
        title: title.to_string(),
        author: author.map(|a| a.to_string()),
        price_cents,
        cover_image: None,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
