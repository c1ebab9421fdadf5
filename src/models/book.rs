//! Book query and catalog candidate models.

use serde::{Deserialize, Serialize};

/// Errors raised while constructing a [`Query`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("Query title must not be empty")]
    EmptyTitle,
}

/// A book to look up in a catalog
///
/// The title is required. ISBN and author are optional hints used by the
/// scorer for the exact-match fast path and the author bonus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Query {
    title: String,
    isbn: Option<String>,
    author: Option<String>,
}

impl Query {
    /// Create a query for the given title
    pub fn new(title: impl Into<String>) -> Result<Self, QueryError> {
        let title = title.into().trim().to_string();
        if title.is_empty() {
            return Err(QueryError::EmptyTitle);
        }

        Ok(Self {
            title,
            isbn: None,
            author: None,
        })
    }

    /// Attach an ISBN; blank values are ignored
    pub fn with_isbn(mut self, isbn: impl Into<String>) -> Self {
        self.isbn = non_blank(isbn.into());
        self
    }

    /// Attach an author; blank values are ignored
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = non_blank(author.into());
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn isbn(&self) -> Option<&str> {
        self.isbn.as_deref()
    }

    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// One search-result entry returned by a catalog
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateRecord {
    /// Title as listed by the catalog
    pub title: String,

    /// Author as listed by the catalog
    pub author: Option<String>,

    /// Display price (e.g. "$9.99")
    pub price: Option<String>,

    /// Product page URL
    pub url: Option<String>,

    /// Cover image URL
    pub cover_url: Option<String>,

    /// ISBN in any format the catalog reports
    pub isbn: Option<String>,
}

impl CandidateRecord {
    /// Create a candidate with only a title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }
}

/// Builder for constructing [`CandidateRecord`] values
#[derive(Debug, Clone)]
pub struct CandidateBuilder {
    candidate: CandidateRecord,
}

impl CandidateBuilder {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            candidate: CandidateRecord::new(title),
        }
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.candidate.author = Some(author.into());
        self
    }

    pub fn price(mut self, price: impl Into<String>) -> Self {
        self.candidate.price = Some(price.into());
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.candidate.url = Some(url.into());
        self
    }

    pub fn cover_url(mut self, cover_url: impl Into<String>) -> Self {
        self.candidate.cover_url = Some(cover_url.into());
        self
    }

    pub fn isbn(mut self, isbn: impl Into<String>) -> Self {
        self.candidate.isbn = Some(isbn.into());
        self
    }

    pub fn build(self) -> CandidateRecord {
        self.candidate
    }
}
