//! Reading-list input.
//!
//! Turns a Goodreads library export into [`SearchTask`](crate::models::SearchTask)s
//! for the search orchestrator.

mod goodreads;

pub use goodreads::{read_tasks, read_tasks_from_reader, InputError};
