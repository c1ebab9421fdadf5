//! Goodreads library export parsing.
//!
//! The export is a CSV file with one row per book. Only a handful of columns
//! matter here:
//!
//! | Column           | Use                                          |
//! |------------------|----------------------------------------------|
//! | `Title`          | query title (rows without one are skipped)   |
//! | `Author`         | query author                                 |
//! | `ISBN13`, `ISBN` | query ISBN, stored as `="..."` formula cells  |
//! | `Exclusive Shelf`| shelf filter                                 |
//! | `Bookshelves`    | shelf filter, comma-separated                |

use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::matching::isbn;
use crate::models::{Query, SearchTask};

/// Errors raised while reading a reading list
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("Failed to open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing required column: {0}")]
    MissingColumn(&'static str),
}

#[derive(Debug, Deserialize)]
struct GoodreadsRow {
    #[serde(rename = "Title", default)]
    title: String,

    #[serde(rename = "Author", default)]
    author: Option<String>,

    #[serde(rename = "ISBN", default)]
    isbn: Option<String>,

    #[serde(rename = "ISBN13", default)]
    isbn13: Option<String>,

    #[serde(rename = "Bookshelves", default)]
    bookshelves: Option<String>,

    #[serde(rename = "Exclusive Shelf", default)]
    exclusive_shelf: Option<String>,
}

impl GoodreadsRow {
    fn on_shelf(&self, shelf: &str) -> bool {
        let matches = |name: &str| name.trim().eq_ignore_ascii_case(shelf);

        self.exclusive_shelf.as_deref().is_some_and(matches)
            || self
                .bookshelves
                .as_deref()
                .is_some_and(|shelves| shelves.split(',').any(matches))
    }

    fn isbn(&self) -> Option<String> {
        [self.isbn13.as_deref(), self.isbn.as_deref()]
            .into_iter()
            .flatten()
            .find_map(isbn::extract_from_formula_cell)
    }

    fn into_query(self) -> Option<Query> {
        let isbn = self.isbn();
        let mut query = Query::new(self.title).ok()?;
        if let Some(author) = self.author {
            query = query.with_author(author);
        }
        if let Some(isbn) = isbn {
            query = query.with_isbn(isbn);
        }
        Some(query)
    }
}

/// Read the books on `shelf` from a Goodreads export file
pub fn read_tasks(path: &Path, shelf: &str) -> Result<Vec<SearchTask>, InputError> {
    let file = File::open(path).map_err(|source| InputError::Open {
        path: path.display().to_string(),
        source,
    })?;
    read_tasks_from_reader(file, shelf)
}

/// Read the books on `shelf` from Goodreads CSV data
///
/// Tasks are indexed in file order, counting only the rows that were kept.
pub fn read_tasks_from_reader<R: Read>(reader: R, shelf: &str) -> Result<Vec<SearchTask>, InputError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    if !headers.iter().any(|h| h == "Title") {
        return Err(InputError::MissingColumn("Title"));
    }
    if !headers.iter().any(|h| h == "Bookshelves" || h == "Exclusive Shelf") {
        return Err(InputError::MissingColumn("Bookshelves"));
    }

    let shelf = shelf.trim();
    let mut tasks = Vec::new();
    let mut rows = 0usize;

    for row in csv_reader.deserialize::<GoodreadsRow>() {
        let row = row?;
        rows += 1;
        if !row.on_shelf(shelf) {
            continue;
        }
        match row.into_query() {
            Some(query) => tasks.push(SearchTask::new(tasks.len(), query)),
            None => tracing::warn!("Skipping row {} on shelf '{}' without a title", rows, shelf),
        }
    }

    tracing::info!(
        "Loaded {} books from shelf '{}' ({} rows in export)",
        tasks.len(),
        shelf,
        rows
    );
    Ok(tasks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const EXPORT: &str = r#"Book Id,Title,Author,Author l-f,ISBN,ISBN13,My Rating,Bookshelves,Exclusive Shelf
1,Dune,Frank Herbert,"Herbert, Frank","=""0441172717""","=""9780441172719""",0,to-read,to-read
2,Emma,Jane Austen,"Austen, Jane","=""""","=""""",4,,read
3,"Sapiens: A Brief History of Humankind",Yuval Noah Harari,"Harari, Yuval Noah","=""0062316095""","=""""",0,"favorites, to-read",to-read
4,"   ",Nobody,"Nobody","","",0,to-read,to-read
5,The Hobbit,J.R.R. Tolkien,"Tolkien, J.R.R.","","",0,"classics,to-read",currently-reading
"#;

    fn read(shelf: &str) -> Vec<SearchTask> {
        read_tasks_from_reader(EXPORT.as_bytes(), shelf).unwrap()
    }

    #[test]
    fn test_filters_by_shelf() {
        let tasks = read("to-read");
        let titles: Vec<&str> = tasks.iter().map(|t| t.query().title()).collect();
        assert_eq!(
            titles,
            vec!["Dune", "Sapiens: A Brief History of Humankind", "The Hobbit"]
        );
        let indices: Vec<usize> = tasks.iter().map(SearchTask::index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_shelf_match_is_case_insensitive() {
        assert_eq!(read(" Read ").len(), 1);
        assert!(read("wishlist").is_empty());
    }

    #[test]
    fn test_extracts_author_and_isbn() {
        let tasks = read("to-read");

        assert_eq!(tasks[0].query().author(), Some("Frank Herbert"));
        assert_eq!(tasks[0].query().isbn(), Some("9780441172719"));
        // ISBN13 is empty, so the ISBN-10 column is used
        assert_eq!(tasks[1].query().isbn(), Some("0062316095"));
        assert_eq!(tasks[2].query().isbn(), None);
    }

    #[test]
    fn test_missing_title_column() {
        let result = read_tasks_from_reader("Name,Bookshelves\nDune,to-read\n".as_bytes(), "to-read");
        assert!(matches!(result, Err(InputError::MissingColumn("Title"))));
    }

    #[test]
    fn test_read_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(EXPORT.as_bytes()).unwrap();

        let tasks = read_tasks(file.path(), "to-read").unwrap();
        assert_eq!(tasks.len(), 3);
    }

    #[test]
    fn test_missing_file() {
        let result = read_tasks(Path::new("/nonexistent/export.csv"), "to-read");
        assert!(matches!(result, Err(InputError::Open { .. })));
    }
}
