//! Catalog request handlers.
//!
//! [`BookCatalog`] is the business layer between the HTTP surface and the
//! store: it validates input, performs the whole-collection read-modify-write
//! and triggers the listener fan-out after every successful mutation. Within
//! one request the sequence is strictly validate → read → mutate → write →
//! broadcast; no snapshot is pushed before the write producing it is durable.

use std::sync::Arc;

use tracing::info;

use crate::current_year;
use crate::Book;
use crate::BookDraft;
use crate::BookFile;
use crate::Error;
use crate::ListQuery;
use crate::ListenerRegistry;
use crate::Result;
use crate::SortField;

/// Outcome of an upsert, carrying the full resulting record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created(Book),
    Updated(Book),
}

impl UpsertOutcome {
    pub fn book(&self) -> &Book {
        match self {
            UpsertOutcome::Created(book) | UpsertOutcome::Updated(book) => book,
        }
    }
}

/// Process-scoped catalog service: one store, one listener registry,
/// initialized at startup and shared by all in-flight requests.
#[derive(Clone)]
pub struct BookCatalog {
    store: Arc<BookFile>,
    listeners: Arc<ListenerRegistry>,
}

impl BookCatalog {
    pub fn new(store: Arc<BookFile>, listeners: Arc<ListenerRegistry>) -> Self {
        Self { store, listeners }
    }

    /// Create-or-update keyed by ISBN or (title, author, publication_year)
    /// composite identity, first match in collection order winning.
    ///
    /// The uniqueness rule is only evaluated on the create path: a record
    /// matched by identity is updated in place even when the submitted ISBN
    /// collides elsewhere.
    ///
    /// # Errors
    /// - [`Error::Validation`] before the store is touched
    /// - [`Error::DuplicateIsbn`] when creating with an ISBN another record
    ///   already holds
    /// - [`Error::Storage`] on persistence failures
    pub async fn upsert(&self, draft: BookDraft) -> Result<UpsertOutcome> {
        draft.validate(current_year())?;

        let mut books = self.store.read().await?;

        if let Some(pos) = books.iter().position(|b| draft.matches(b)) {
            draft.apply_to(&mut books[pos]);
            let updated = books[pos].clone();
            self.store.write(&books).await?;
            info!("updated book {} ({})", updated.id, updated.isbn);
            self.listeners.broadcast(&books);
            return Ok(UpsertOutcome::Updated(updated));
        }

        if books.iter().any(|b| b.isbn == draft.isbn) {
            return Err(Error::DuplicateIsbn);
        }

        let id = books.iter().map(|b| b.id).max().unwrap_or(0) + 1;
        let created = draft.into_book(id);
        books.push(created.clone());
        self.store.write(&books).await?;
        info!("created book {} ({})", created.id, created.isbn);
        self.listeners.broadcast(&books);
        Ok(UpsertOutcome::Created(created))
    }

    /// Filter, sort and paginate the collection. Read-only, no broadcast.
    /// Out-of-range skip/limit yields fewer or zero records, never an error.
    pub async fn list(&self, query: ListQuery) -> Result<Vec<Book>> {
        let mut books = self.store.read().await?;

        // An explicitly empty filter value (`?genre=`) means "no filter".
        if let Some(genre) = query.genre.as_deref().filter(|g| !g.is_empty()) {
            let needle = genre.to_lowercase();
            books.retain(|b| b.genre.to_lowercase() == needle);
        }
        if let Some(author) = query.author.as_deref().filter(|a| !a.is_empty()) {
            let needle = author.to_lowercase();
            books.retain(|b| b.author.to_lowercase() == needle);
        }

        // Vec::sort_by is stable, preserving collection order among equals.
        match query.sort_by {
            Some(SortField::Title) => books.sort_by(|a, b| a.title.cmp(&b.title)),
            Some(SortField::Author) => books.sort_by(|a, b| a.author.cmp(&b.author)),
            Some(SortField::PublicationYear) => {
                books.sort_by_key(|b| b.publication_year);
            }
            None => {}
        }

        Ok(books
            .into_iter()
            .skip(query.skip)
            .take(query.limit)
            .collect())
    }

    /// Removes the record with `id` and returns it.
    ///
    /// # Errors
    /// - [`Error::BookNotFound`] when no record has that id
    /// - [`Error::Storage`] on persistence failures
    pub async fn delete(&self, id: u64) -> Result<Book> {
        let mut books = self.store.read().await?;

        let pos = books
            .iter()
            .position(|b| b.id == id)
            .ok_or(Error::BookNotFound)?;
        let removed = books.remove(pos);

        self.store.write(&books).await?;
        info!("deleted book {} ({})", removed.id, removed.isbn);
        self.listeners.broadcast(&books);
        Ok(removed)
    }

    /// The full unfiltered collection, as pushed to listeners.
    pub async fn snapshot(&self) -> Result<Vec<Book>> {
        self.store.read().await
    }

    pub fn listeners(&self) -> &Arc<ListenerRegistry> {
        &self.listeners
    }
}
