//! Testing utilities for bulkform
//!
//! In-memory stand-ins for the search backend and for actions, plus a
//! `TestDb` wrapper for temporary sled stores.
//!
//! Only available when compiled with `cfg(test)`.

use crate::actions::{Action, ActionError, DocumentBackend, ResponseOverride, set_source_path};
use crate::codec::RowIdentifier;
use crate::db::Database;
use crate::form::{ConfigData, FormField, FormSpec};
use crate::prompt::{self, OperatorInput};
use crate::query::{QueryError, QueryPage, ResultQuery, RowSource};
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tempfile::TempDir;

/// Wrapper for a temporary test database that cleans up on drop
///
/// The store lives in its own temporary directory, so parallel tests never
/// share state.
pub struct TestDb {
    db: Arc<Database>,
    // dropped after `db`, removing the directory
    dir: TempDir,
}

impl TestDb {
    /// Create a new, empty test database
    ///
    /// # Panics
    /// Panics if the temporary directory or the database cannot be created.
    #[must_use]
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let db = Database::open(dir.path().join("index")).expect("Failed to open test database");
        Self {
            db: Arc::new(db),
            dir,
        }
    }

    /// Get a reference to the underlying database
    #[must_use]
    pub fn db(&self) -> &Database {
        &self.db
    }

    /// Shared handle, for code that keeps the database alive itself
    #[must_use]
    pub fn shared(&self) -> Arc<Database> {
        Arc::clone(&self.db)
    }

    /// Get the directory holding the test database
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

impl Default for TestDb {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Default)]
struct IndexState {
    documents: Vec<RowSource>,
    /// Deleted rows still reported by `exists`, with remaining sightings
    ghosts: HashMap<RowIdentifier, u32>,
    lag: u32,
    failing: HashSet<RowIdentifier>,
    queries: Vec<(usize, usize)>,
    exists_calls: usize,
}

/// In-memory search index
///
/// Records every query window it is asked for and can simulate a backend
/// whose deletes take a few reads to become visible.
#[derive(Default)]
pub struct MemoryIndex {
    state: Mutex<IndexState>,
}

impl MemoryIndex {
    /// Index holding `count` documents with ids `0..count`
    #[must_use]
    pub fn with_documents(index: &str, count: usize) -> Self {
        let documents = (0..count)
            .map(|i| RowSource::new(index, i.to_string(), json!({ "title": format!("Document {i}") })))
            .collect();
        Self {
            state: Mutex::new(IndexState {
                documents,
                ..IndexState::default()
            }),
        }
    }

    /// Keep deleted documents visible for `reads` further `exists` calls
    #[must_use]
    pub fn with_visibility_lag(self, reads: u32) -> Self {
        self.lock().lag = reads;
        self
    }

    /// Make deletes of `row` fail
    pub fn fail_on(&self, row: &RowIdentifier) {
        self.lock().failing.insert(row.clone());
    }

    /// Identifiers of the stored documents, in listing order
    #[must_use]
    pub fn identifiers(&self) -> Vec<RowIdentifier> {
        self.lock().documents.iter().map(RowSource::identifier).collect()
    }

    /// `(page_size, offset)` of every query executed so far
    #[must_use]
    pub fn recorded_queries(&self) -> Vec<(usize, usize)> {
        self.lock().queries.clone()
    }

    #[must_use]
    pub fn exists_calls(&self) -> usize {
        self.lock().exists_calls
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().documents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current source of `row`
    #[must_use]
    pub fn source(&self, row: &RowIdentifier) -> Option<Value> {
        self.lock()
            .documents
            .iter()
            .find(|doc| doc.identifier() == *row)
            .map(|doc| doc.source.clone())
    }

    fn lock(&self) -> MutexGuard<'_, IndexState> {
        self.state.lock().expect("index state poisoned")
    }
}

impl ResultQuery for MemoryIndex {
    fn execute(&self, page_size: usize, offset: usize) -> Result<QueryPage, QueryError> {
        let mut state = self.lock();
        state.queries.push((page_size, offset));
        Ok(QueryPage {
            rows: state.documents.iter().skip(offset).take(page_size).cloned().collect(),
            total_count: state.documents.len(),
        })
    }
}

impl DocumentBackend for MemoryIndex {
    fn delete(&self, row: &RowIdentifier) -> Result<bool, ActionError> {
        let mut state = self.lock();
        if state.failing.contains(row) {
            return Err(ActionError::Execution(format!("Failed to delete {row}")));
        }
        let Some(pos) = state.documents.iter().position(|doc| doc.identifier() == *row) else {
            return Ok(false);
        };
        state.documents.remove(pos);
        let lag = state.lag;
        if lag > 0 {
            state.ghosts.insert(row.clone(), lag);
        }
        Ok(true)
    }

    fn exists(&self, row: &RowIdentifier) -> Result<bool, ActionError> {
        let mut state = self.lock();
        state.exists_calls += 1;
        if let Some(remaining) = state.ghosts.get_mut(row) {
            if *remaining > 0 {
                *remaining -= 1;
                return Ok(true);
            }
            return Ok(false);
        }
        Ok(state.documents.iter().any(|doc| doc.identifier() == *row))
    }

    fn set_field(&self, row: &RowIdentifier, path: &str, value: Value) -> Result<bool, ActionError> {
        let mut state = self.lock();
        match state.documents.iter_mut().find(|doc| doc.identifier() == *row) {
            Some(doc) => {
                set_source_path(&mut doc.source, path, value);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Query whose backend is always down
pub struct FailingQuery;

impl ResultQuery for FailingQuery {
    fn execute(&self, _page_size: usize, _offset: usize) -> Result<QueryPage, QueryError> {
        Err(QueryError::Backend("connection refused".to_string()))
    }
}

/// Targets and configuration of each `execute` call
pub type RecordedCalls = Arc<Mutex<Vec<(Vec<RowIdentifier>, ConfigData)>>>;

/// Action that records what it was asked to do
pub struct RecordingAction {
    label: String,
    configurable: bool,
    failure: Option<String>,
    response: Option<ResponseOverride>,
    calls: RecordedCalls,
}

impl RecordingAction {
    #[must_use]
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            configurable: false,
            failure: None,
            response: None,
            calls: Arc::default(),
        }
    }

    /// Ask for a required `name` text field before running
    #[must_use]
    pub fn configurable(mut self) -> Self {
        self.configurable = true;
        self
    }

    /// Fail every run with `message`
    #[must_use]
    pub fn failing(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    /// Return `response` from every successful run
    #[must_use]
    pub fn responding(mut self, response: ResponseOverride) -> Self {
        self.response = Some(response);
        self
    }

    /// Shared handle on the recorded calls, usable after registration
    #[must_use]
    pub fn calls(&self) -> RecordedCalls {
        Arc::clone(&self.calls)
    }
}

impl Action for RecordingAction {
    fn label(&self) -> String {
        self.label.clone()
    }

    fn is_configurable(&self) -> bool {
        self.configurable
    }

    fn build_config_form(&self) -> FormSpec {
        if !self.configurable {
            return FormSpec::new();
        }
        FormSpec::new().field(FormField::text("name", "Name").required())
    }

    fn execute(
        &self,
        targets: &[RowIdentifier],
        config: &ConfigData,
    ) -> Result<Option<ResponseOverride>, ActionError> {
        self.calls
            .lock()
            .expect("calls poisoned")
            .push((targets.to_vec(), config.clone()));

        match &self.failure {
            Some(message) => Err(ActionError::Execution(message.clone())),
            None => Ok(self.response.clone()),
        }
    }
}

/// One scripted reply to a prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Text(&'static str),
    Confirm(bool),
    /// Back out of the prompt
    Cancel,
}

/// Operator input that replays prepared answers in order
///
/// # Panics
/// Prompts panic when the script runs out or the next answer is of the wrong kind.
pub struct ScriptedInput {
    answers: Mutex<VecDeque<Answer>>,
}

impl ScriptedInput {
    #[must_use]
    pub fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
        }
    }

    /// Input that must never be asked anything
    #[must_use]
    pub fn none() -> Self {
        Self::new([])
    }

    /// Answers not consumed yet
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.answers.lock().expect("answers poisoned").len()
    }

    fn next(&self, prompt: &str) -> Answer {
        self.answers
            .lock()
            .expect("answers poisoned")
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected prompt: {prompt}"))
    }
}

impl OperatorInput for ScriptedInput {
    fn prompt_text(&self, prompt: &str, _default: Option<&str>) -> prompt::Result<Option<String>> {
        match self.next(prompt) {
            Answer::Text(text) => Ok(Some(text.to_string())),
            Answer::Cancel => Ok(None),
            other => panic!("expected text for '{prompt}', script has {other:?}"),
        }
    }

    fn prompt_confirm(&self, prompt: &str, _default: bool) -> prompt::Result<Option<bool>> {
        match self.next(prompt) {
            Answer::Confirm(answer) => Ok(Some(answer)),
            Answer::Cancel => Ok(None),
            other => panic!("expected yes/no for '{prompt}', script has {other:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_starts_empty() {
        let test_db = TestDb::new();
        assert_eq!(test_db.db().count(), 0);
        assert!(test_db.path().exists());
    }

    #[test]
    fn test_db_cleanup() {
        let path = {
            let test_db = TestDb::new();
            test_db.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn test_memory_index_windows() {
        let index = MemoryIndex::with_documents("articles", 5);
        let page = index.execute(2, 4).unwrap();

        assert_eq!(page.rows.len(), 1);
        assert_eq!(page.rows[0].id, "4");
        assert_eq!(page.total_count, 5);
        assert_eq!(index.recorded_queries(), vec![(2, 4)]);
    }

    #[test]
    fn test_memory_index_lag() {
        let index = MemoryIndex::with_documents("articles", 1).with_visibility_lag(1);
        let row = RowIdentifier::new("articles", "0");

        assert!(index.delete(&row).unwrap());
        assert!(index.is_empty());
        assert!(index.exists(&row).unwrap());
        assert!(!index.exists(&row).unwrap());
        assert!(!index.delete(&row).unwrap());
    }

    #[test]
    fn test_recording_action() {
        let action = RecordingAction::new("Tag").failing("nope");
        let calls = action.calls();
        let err = action.execute(&[], &ConfigData::new()).unwrap_err();

        assert_eq!(err.to_string(), "nope");
        assert_eq!(calls.lock().unwrap().len(), 1);
    }
}
