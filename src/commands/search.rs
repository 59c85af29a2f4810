use std::io::Write;

use anyhow::Result;

use super::catalog_client;
use crate::catalog::BookCatalog;
use crate::config::Config;
use crate::display::render_results;

/// Free-text catalog search. Returns the number of results printed.
pub async fn run(config: &Config, query: &str, out: &mut dyn Write) -> Result<usize> {
    let catalog = catalog_client(config)?;

    match catalog.search_by_text(query).await {
        Some(books) => {
            write!(out, "{}", render_results(&books))?;
            Ok(books.len())
        }
        None => {
            writeln!(out, "No books found for \"{}\".", query)?;
            Ok(0)
        }
    }
}
