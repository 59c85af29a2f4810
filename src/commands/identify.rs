//! `bookscout identify <IMAGE> [--save]`
//!
//! Loads the image through a capture session, runs one identification and
//! prints the terminal state. With `--save`, a found record is added to the
//! collection.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::{catalog_client, open_collection};
use crate::capture::{CaptureSession, FileSource};
use crate::config::Config;
use crate::display::{render_outcome, share_text};
use crate::identify::GeminiClient;
use crate::session::{IdentifyState, Session};

pub async fn run(config: &Config, image: &Path, save: bool, out: &mut dyn Write) -> Result<IdentifyState> {
    let api_key = config.require_api_key()?;
    let identifier = GeminiClient::new(api_key, &config.gemini_base_url, config.request_timeout)
        .context("Failed to create AI client")?;
    let catalog = catalog_client(config)?;

    let mut source = FileSource::new(image);
    let data_uri = CaptureSession::open(&mut source)
        .and_then(|session| session.capture())
        .with_context(|| format!("Failed to load image {:?}", image))?;
    info!("Loaded {:?} ({} bytes encoded)", image, data_uri.len());

    let mut session = Session::new(open_collection(config)?);
    let state = session.identify(&identifier, &catalog, data_uri).await?;

    write!(out, "{}", render_outcome(&session))?;
    if let Some(book) = session.detailed() {
        writeln!(out, "{}", share_text(book))?;
    }

    if save {
        // Storage writes block (rusqlite, file rename); keep them off the async workers.
        let saved = tokio::task::spawn_blocking(move || session.save_current())
            .await
            .context("Collection save task failed")?;
        match saved {
            Some(outcome) => writeln!(out, "{}", outcome.message())?,
            None => writeln!(out, "Nothing to save: no catalog record was found.")?,
        }
    }

    Ok(state)
}
