use serde::Deserialize;

use crate::constants::DEFAULT_LIST_LIMIT;

/// Query parameters for `GET /books`.
#[derive(Debug, Clone, Deserialize)]
pub struct ListQuery {
    /// Records to skip before the returned page, default 0.
    #[serde(default)]
    pub skip: usize,

    /// Page size, default 10.
    #[serde(default = "default_limit")]
    pub limit: usize,

    /// Ascending sort key; natural ordering per field.
    #[serde(default)]
    pub sort_by: Option<SortField>,

    /// Case-insensitive exact genre filter.
    #[serde(default)]
    pub genre: Option<String>,

    /// Case-insensitive exact author filter.
    #[serde(default)]
    pub author: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Title,
    Author,
    PublicationYear,
}

fn default_limit() -> usize {
    DEFAULT_LIST_LIMIT
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_LIST_LIMIT,
            sort_by: None,
            genre: None,
            author: None,
        }
    }
}

impl ListQuery {
    pub fn with_skip(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn sorted_by(mut self, field: SortField) -> Self {
        self.sort_by = Some(field);
        self
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }
}