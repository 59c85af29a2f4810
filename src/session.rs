//! Ephemeral identification state plus the owned collection.

use tracing::{debug, info};

use crate::catalog::{BookCatalog, BookRecord};
use crate::collection::{AddOutcome, Collection};
use crate::error::{Result, ScoutError};
use crate::identify::{BookIdentifier, IdentifiedInfo};
use crate::orchestrator::{identify_book, IdentifyOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifyState {
    Idle,
    Loading,
    ResultFound,
    PartialResult,
    NoResult,
    Failed,
}

impl IdentifyState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, IdentifyState::Idle | IdentifyState::Loading)
    }
}

/// Top-level application state.
///
/// The identification fields are reset together whenever a new attempt
/// starts or the current one is discarded. The collection outlives them.
pub struct Session {
    collection: Collection,
    selected_image: Option<String>,
    identified: Option<IdentifiedInfo>,
    detailed: Option<BookRecord>,
    error: Option<String>,
    state: IdentifyState,
}

impl Session {
    pub fn new(collection: Collection) -> Self {
        Self {
            collection,
            selected_image: None,
            identified: None,
            detailed: None,
            error: None,
            state: IdentifyState::Idle,
        }
    }

    pub fn state(&self) -> IdentifyState {
        self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == IdentifyState::Loading
    }

    pub fn selected_image(&self) -> Option<&str> {
        self.selected_image.as_deref()
    }

    pub fn identified(&self) -> Option<&IdentifiedInfo> {
        self.identified.as_ref()
    }

    pub fn detailed(&self) -> Option<&BookRecord> {
        self.detailed.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    /// Discard the current attempt and return to `Idle`.
    pub fn reset(&mut self) {
        self.selected_image = None;
        self.identified = None;
        self.detailed = None;
        self.error = None;
        self.state = IdentifyState::Idle;
    }

    /// Start a new attempt with `image`. Rejected while one is loading.
    pub fn begin(&mut self, image: String) -> Result<()> {
        if self.is_loading() {
            return Err(ScoutError::Busy);
        }
        self.reset();
        self.selected_image = Some(image);
        self.state = IdentifyState::Loading;
        debug!("Identification started");
        Ok(())
    }

    /// Record the terminal outcome of the running attempt.
    pub fn finish(&mut self, outcome: IdentifyOutcome) {
        if !matches!(outcome, IdentifyOutcome::NoResult) {
            self.error = outcome.message();
        }
        self.state = match outcome {
            IdentifyOutcome::ResultFound { info, book } => {
                self.identified = Some(info);
                self.detailed = Some(book);
                IdentifyState::ResultFound
            }
            IdentifyOutcome::PartialResult { info } => {
                self.identified = Some(info);
                IdentifyState::PartialResult
            }
            IdentifyOutcome::NoResult => IdentifyState::NoResult,
            IdentifyOutcome::Failed { .. } => IdentifyState::Failed,
        };
        info!("Identification finished: {:?}", self.state);
    }

    /// Run a whole attempt: `begin`, the identification sequence, `finish`.
    pub async fn identify(
        &mut self,
        identifier: &dyn BookIdentifier,
        catalog: &dyn BookCatalog,
        image: String,
    ) -> Result<IdentifyState> {
        self.begin(image.clone())?;
        let outcome = identify_book(identifier, catalog, &image).await;
        self.finish(outcome);
        Ok(self.state)
    }

    /// Whether the current detailed record is already saved.
    pub fn is_current_saved(&self) -> bool {
        self.detailed
            .as_ref()
            .is_some_and(|book| self.collection.contains(&book.id))
    }

    /// Save the current detailed record. `None` when there is nothing to save.
    pub fn save_current(&mut self) -> Option<AddOutcome> {
        let book = self.detailed.clone()?;
        Some(self.collection.add(book))
    }

    pub fn remove_from_collection(&mut self, id: &str) -> bool {
        self.collection.remove(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::JsonFileStorage;
    use crate::orchestrator::tests::{record, FakeCatalog, ScriptedIdentifier};
    use tempfile::TempDir;

    fn session(dir: &TempDir) -> Session {
        let storage = JsonFileStorage::new(dir.path().join("store.json"));
        Session::new(Collection::load(Box::new(storage)))
    }

    fn found() -> IdentifyOutcome {
        IdentifyOutcome::ResultFound {
            info: IdentifiedInfo::new("1984", "George Orwell"),
            book: record("orwell", "1984"),
        }
    }

    #[test]
    fn test_new_session_is_idle() {
        let dir = TempDir::new().unwrap();
        let session = session(&dir);
        assert_eq!(session.state(), IdentifyState::Idle);
        assert!(!session.state().is_terminal());
        assert!(session.selected_image().is_none());
    }

    #[test]
    fn test_begin_while_loading_is_rejected() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir);
        session.begin("data:image/png;base64,AA".to_string()).unwrap();
        assert!(session.is_loading());

        let err = session.begin("data:image/png;base64,BB".to_string()).unwrap_err();
        assert!(matches!(err, ScoutError::Busy));
        assert_eq!(session.selected_image(), Some("data:image/png;base64,AA"));
    }

    #[test]
    fn test_begin_after_terminal_clears_previous_fields() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir);
        session.begin("first".to_string()).unwrap();
        session.finish(found());
        assert_eq!(session.state(), IdentifyState::ResultFound);

        session.begin("second".to_string()).unwrap();
        assert_eq!(session.state(), IdentifyState::Loading);
        assert!(session.identified().is_none());
        assert!(session.detailed().is_none());
        assert!(session.error().is_none());
        assert_eq!(session.selected_image(), Some("second"));
    }

    #[test]
    fn test_finish_partial_keeps_info_and_message() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir);
        session.begin("img".to_string()).unwrap();
        session.finish(IdentifyOutcome::PartialResult {
            info: IdentifiedInfo::new("Zine", "Anon"),
        });

        assert_eq!(session.state(), IdentifyState::PartialResult);
        assert_eq!(session.identified().unwrap().title, "Zine");
        assert!(session.detailed().is_none());
        assert_eq!(
            session.error(),
            Some("Book details not found in database, though the model identified: Zine")
        );
        assert!(session.save_current().is_none());
    }

    #[test]
    fn test_no_result_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir);
        session.begin("img".to_string()).unwrap();
        session.finish(IdentifyOutcome::NoResult);

        assert_eq!(session.state(), IdentifyState::NoResult);
        assert!(session.error().is_none());
        assert!(session.identified().is_none());
    }

    #[test]
    fn test_reset_returns_to_idle() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir);
        session.begin("img".to_string()).unwrap();
        session.finish(IdentifyOutcome::Failed {
            message: "boom".to_string(),
        });
        assert_eq!(session.error(), Some("boom"));

        session.reset();
        assert_eq!(session.state(), IdentifyState::Idle);
        assert!(session.error().is_none());
        assert!(session.selected_image().is_none());
    }

    #[test]
    fn test_save_current_and_collection_survives_reset() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir);
        session.begin("img".to_string()).unwrap();
        session.finish(found());
        assert!(!session.is_current_saved());

        assert!(matches!(session.save_current(), Some(AddOutcome::Added(_))));
        assert!(session.is_current_saved());
        assert!(matches!(session.save_current(), Some(AddOutcome::AlreadyPresent(_))));

        session.reset();
        assert!(session.collection().contains("orwell"));
        assert!(session.remove_from_collection("orwell"));
        assert!(session.collection().is_empty());
    }

    #[tokio::test]
    async fn test_identify_runs_to_terminal_state() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir);
        let identifier = ScriptedIdentifier::texts(&["Title: 1984\nAuthor: George Orwell"]);
        let mut catalog = FakeCatalog::default();
        catalog.by_text.insert("1984".to_string(), vec![record("orwell", "1984")]);

        let state = session
            .identify(&identifier, &catalog, "data:image/jpeg;base64,AA".to_string())
            .await
            .unwrap();
        assert_eq!(state, IdentifyState::ResultFound);
        assert!(state.is_terminal());
        assert_eq!(session.detailed().unwrap().id, "orwell");
        assert!(session.error().is_none());
    }
}
