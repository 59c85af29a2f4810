use std::io::Write;

use anyhow::{bail, Result};

use super::open_collection;
use crate::config::Config;
use crate::display::{render_book, render_collection, share_text};

pub fn list(config: &Config, out: &mut dyn Write) -> Result<()> {
    let collection = open_collection(config)?;
    write!(out, "{}", render_collection(&collection))?;
    Ok(())
}

pub fn show(config: &Config, id: &str, out: &mut dyn Write) -> Result<()> {
    let collection = open_collection(config)?;
    let Some(book) = collection.get(id) else {
        bail!("No book with id '{}' in your collection", id);
    };
    write!(out, "{}", render_book(book, true))?;
    writeln!(out, "{}", share_text(book))?;
    Ok(())
}

/// Removing an id that is not saved is not an error.
pub fn remove(config: &Config, id: &str, out: &mut dyn Write) -> Result<bool> {
    let mut collection = open_collection(config)?;
    let removed = collection.remove(id);
    if removed {
        writeln!(out, "Book removed from collection.")?;
    } else {
        writeln!(out, "No book with id '{}' in your collection.", id)?;
    }
    Ok(removed)
}
