//! One identification attempt, from cover image to terminal outcome.
//!
//! The sequence is strictly linear: each step needs the previous step's
//! result. Only the vision call can produce `Failed`; catalog misses
//! downgrade to `PartialResult`.

use tracing::{info, warn};

use crate::catalog::{BookCatalog, BookRecord};
use crate::error::ScoutError;
use crate::identify::prompts::GENERAL_PROMPT;
use crate::identify::{is_refusal, parse_book_response, BookIdentifier, IdentifiedInfo};

/// Marker used in the failure message when the model returned no text at all.
const NO_RESPONSE: &str = "No response";

pub const NO_RESULT_MESSAGE: &str =
    "No book identified from this image, or detailed information could not be retrieved.";

/// Terminal outcome of an identification attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum IdentifyOutcome {
    /// Identified and enriched from the catalog.
    ResultFound { info: IdentifiedInfo, book: BookRecord },
    /// Identified, but the catalog had nothing for it.
    PartialResult { info: IdentifiedInfo },
    /// The model declined to identify the book on both attempts.
    NoResult,
    Failed { message: String },
}

impl IdentifyOutcome {
    /// User-facing message for outcomes that carry one.
    pub fn message(&self) -> Option<String> {
        match self {
            IdentifyOutcome::ResultFound { .. } => None,
            IdentifyOutcome::PartialResult { info } => Some(format!(
                "Book details not found in database, though the model identified: {}",
                info.title
            )),
            IdentifyOutcome::NoResult => Some(NO_RESULT_MESSAGE.to_string()),
            IdentifyOutcome::Failed { message } => Some(message.clone()),
        }
    }
}

/// Run the full identification sequence for one image.
///
/// 1. Ask with the strict prompt and parse.
/// 2. If that does not parse, ask again with the looser prompt and parse.
/// 3. Enrich a parsed pair from the catalog: title/author first, then title alone.
pub async fn identify_book(
    identifier: &dyn BookIdentifier,
    catalog: &dyn BookCatalog,
    image: &str,
) -> IdentifyOutcome {
    let first = match identifier.identify_default(image).await {
        Ok(text) => text,
        Err(e) => return request_failed(e),
    };

    if let Some(info) = parse_book_response(&first) {
        info!("Identified '{}' by '{}'", info.title, info.author);
        return enrich(catalog, info).await;
    }

    info!("Structured answer did not parse, retrying with general prompt");
    let second = match identifier.identify(image, GENERAL_PROMPT).await {
        Ok(text) => text,
        Err(e) => return request_failed(e),
    };

    if let Some(info) = parse_book_response(&second) {
        info!("Identified '{}' by '{}' on retry", info.title, info.author);
        return enrich(catalog, info).await;
    }

    if is_refusal(&first) && is_refusal(&second) {
        info!("Model declined to identify the book on both attempts");
        return IdentifyOutcome::NoResult;
    }

    let raw = [first.as_str(), second.as_str()]
        .into_iter()
        .find(|text| !text.is_empty())
        .unwrap_or(NO_RESPONSE);
    warn!("Could not identify book from either model response");
    IdentifyOutcome::Failed {
        message: format!("Could not identify book from cover. Model raw: {}", raw),
    }
}

/// Catalog enrichment for a parsed pair. Never fails.
async fn enrich(catalog: &dyn BookCatalog, info: IdentifiedInfo) -> IdentifyOutcome {
    if let Some(book) = first_record(catalog.search_by_title_author(&info.title, &info.author).await) {
        return IdentifyOutcome::ResultFound { info, book };
    }

    // Author strings often differ from the catalog's (initials, translations).
    info!("No catalog match for title/author, searching by title '{}'", info.title);
    if let Some(book) = first_record(catalog.search_by_text(&info.title).await) {
        return IdentifyOutcome::ResultFound { info, book };
    }

    warn!("Catalog has no entry for '{}'", info.title);
    IdentifyOutcome::PartialResult { info }
}

fn first_record(records: Option<Vec<BookRecord>>) -> Option<BookRecord> {
    records.and_then(|records| records.into_iter().next())
}

fn request_failed(err: ScoutError) -> IdentifyOutcome {
    warn!("Identification request failed: {}", err);
    IdentifyOutcome::Failed {
        message: format!("Error identifying book: {}", err),
    }
}
