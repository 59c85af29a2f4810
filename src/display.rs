//! Plain-text rendering of books, outcomes and the collection.

use std::fmt::Write;

use crate::catalog::BookRecord;
use crate::collection::Collection;
use crate::orchestrator::NO_RESULT_MESSAGE;
use crate::session::{IdentifyState, Session};

const NOT_AVAILABLE: &str = "N/A";

fn or_na(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or(NOT_AVAILABLE)
}

fn joined(values: Option<&Vec<String>>) -> Option<String> {
    values.filter(|v| !v.is_empty()).map(|v| v.join(", "))
}

/// Full detail view of one record.
pub fn render_book(book: &BookRecord, in_collection: bool) -> String {
    let mut out = String::new();
    let authors = joined(book.authors.as_ref());
    let pages = book.page_count.filter(|p| *p > 0).map(|p| p.to_string());

    let _ = writeln!(out, "{}", book.title);
    let _ = writeln!(out, "Author(s): {}", or_na(authors.as_deref()));
    let _ = writeln!(out, "Published Date: {}", or_na(book.published_date.as_deref()));
    let _ = writeln!(out, "Publisher: {}", or_na(book.publisher.as_deref()));
    let _ = writeln!(out, "Pages: {}", or_na(pages.as_deref()));
    if let Some(categories) = joined(book.categories.as_ref()) {
        let _ = writeln!(out, "Categories: {}", categories);
    }
    if let Some(isbn) = book.isbn.as_deref().filter(|i| !i.is_empty()) {
        let _ = writeln!(out, "ISBN: {}", isbn);
    }
    let _ = writeln!(out, "Synopsis:");
    let _ = writeln!(
        out,
        "{}",
        book.description
            .as_deref()
            .filter(|d| !d.is_empty())
            .unwrap_or("No synopsis available.")
    );
    if let Some(link) = book.info_link.as_deref().filter(|l| !l.is_empty()) {
        let _ = writeln!(out, "More info: {}", link);
    }
    if in_collection {
        let _ = writeln!(out, "[In Collection]");
    }
    out
}

/// One-line summary for sharing.
pub fn share_text(book: &BookRecord) -> String {
    let authors = joined(book.authors.as_ref());
    format!(
        "Check out this book: {} by {}. More info: {}",
        book.title,
        or_na(authors.as_deref()),
        or_na(book.info_link.as_deref())
    )
}

/// The terminal state of the session's current attempt.
pub fn render_outcome(session: &Session) -> String {
    match session.state() {
        IdentifyState::Idle => "No identification in progress.\n".to_string(),
        IdentifyState::Loading => "Scouting for your book...\n".to_string(),
        IdentifyState::ResultFound => match session.detailed() {
            Some(book) => render_book(book, session.is_current_saved()),
            None => String::new(),
        },
        IdentifyState::PartialResult => {
            let mut out = String::from("Almost there...\n");
            if let Some(info) = session.identified() {
                let _ = writeln!(out, "Identified: \"{}\" by {}.", info.title, info.author);
            }
            if let Some(message) = session.error() {
                let _ = writeln!(out, "{}", message);
            }
            out
        }
        IdentifyState::NoResult => format!("{}\n", NO_RESULT_MESSAGE),
        IdentifyState::Failed => format!("Error: {}\n", session.error().unwrap_or_default()),
    }
}

/// Collection listing, one book per line.
pub fn render_collection(collection: &Collection) -> String {
    if collection.is_empty() {
        return "Your Collection is Empty\nStart identifying books to add them here!\n".to_string();
    }

    let mut out = format!("My Book Collection ({})\n", collection.len());
    for book in collection.books() {
        let authors = joined(book.authors.as_ref());
        let _ = writeln!(out, "{}  {} by {}", book.id, book.title, or_na(authors.as_deref()));
    }
    out
}

/// Search results, numbered.
pub fn render_results(books: &[BookRecord]) -> String {
    let mut out = String::new();
    for (i, book) in books.iter().enumerate() {
        let authors = joined(book.authors.as_ref());
        let _ = writeln!(
            out,
            "{}. {} by {} [{}]",
            i + 1,
            book.title,
            or_na(authors.as_deref()),
            book.id
        );
    }
    out
}
