//! Dispatcher mapping user actions onto state transitions.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::{
    app::state::AppState,
    ingest::{self, IngestError},
    metrics::MetricsSnapshot,
    qa::{AnswerResult, BuildError, QaApi, QueryError},
};

/// Errors surfaced to the user by session actions.
///
/// Every variant is local to the action that triggered it; the session stays
/// usable afterwards.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A question was submitted before any successful index build.
    #[error("Vector index not initialized. Please create the vector index first.")]
    IndexNotReady,
    /// The submitted question was empty or whitespace.
    #[error("Please enter a question.")]
    BlankQuestion,
    /// An answer download was requested before any question was answered.
    #[error("There is no answer to save yet.")]
    NoAnswer,
    /// Loading the PDF corpus failed.
    #[error("Failed to load documents: {0}")]
    Ingest(#[from] IngestError),
    /// Building the vector index failed; any previous index is kept.
    #[error("Error creating vector index: {0}")]
    Build(#[from] BuildError),
    /// Answering the question failed.
    #[error("Failed to answer question: {0}")]
    Query(#[from] QueryError),
    /// Writing the answer file failed.
    #[error("Failed to write answer file: {0}")]
    Io(#[from] std::io::Error),
}

/// Summary of a successful index build, rendered to the user.
#[derive(Debug, Clone, Copy)]
pub struct BuildReport {
    /// Number of PDF files ingested.
    pub files: usize,
    /// Number of pages extracted across all files.
    pub pages: usize,
    /// Number of chunks held by the new index.
    pub chunks: usize,
    /// Whether an older index was discarded by this build.
    pub replaced_previous: bool,
}

/// One interactive session: the service pipeline plus its explicit state.
pub struct Session<S> {
    service: S,
    state: AppState,
}

impl<S: QaApi> Session<S> {
    /// Create a fresh session around the given pipeline.
    pub fn new(service: S) -> Self {
        Self {
            service,
            state: AppState::new(),
        }
    }

    /// Read access to the session state for rendering.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Discover PDFs under `dir` and build the index from them.
    pub async fn build_from_directory(&mut self, dir: &Path) -> Result<BuildReport, SessionError> {
        let files = ingest::discover_pdf_files(dir)?;
        self.build_from_files(&files).await
    }

    /// Build the index from an explicit file list.
    ///
    /// The build is atomic: on any failure the previous index (if any) stays
    /// installed and no partial index ever becomes visible.
    pub async fn build_from_files(
        &mut self,
        files: &[PathBuf],
    ) -> Result<BuildReport, SessionError> {
        let pages = ingest::load_corpus(files)?;
        let index = self.service.build_index(&pages).await?;
        let report = BuildReport {
            files: files.len(),
            pages: pages.len(),
            chunks: index.len(),
            replaced_previous: self.state.index().is_some(),
        };
        self.state.install_index(index);
        Ok(report)
    }

    /// Answer a question against the current index.
    ///
    /// Every non-empty question is recorded in the history, including ones
    /// that subsequently fail; the index guard runs before any service call.
    pub async fn ask(&mut self, question: &str) -> Result<&AnswerResult, SessionError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(SessionError::BlankQuestion);
        }
        self.state.record_question(question);

        let index = self.state.index().ok_or(SessionError::IndexNotReady)?;
        let answer = self.service.answer(question, index).await?;
        self.state.store_answer(answer);
        Ok(self
            .state
            .last_answer()
            .expect("answer stored by the preceding statement"))
    }

    /// Write the most recent answer to `path` as plain text.
    pub fn save_answer(&self, path: &Path) -> Result<(), SessionError> {
        let answer = self.state.last_answer().ok_or(SessionError::NoAnswer)?;
        std::fs::write(path, answer.answer_text.as_bytes())?;
        tracing::info!(path = %path.display(), "Answer saved");
        Ok(())
    }

    /// Current pipeline metrics for the status display.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.service.metrics_snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::VectorIndex;
    use crate::ingest::PageRecord;
    use crate::qa::Chunk;
    use async_trait::async_trait;
    use std::fs;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Debug, Clone, PartialEq)]
    enum ServiceCall {
        Build(usize),
        Answer(String),
    }

    #[derive(Default)]
    struct StubQaService {
        calls: Mutex<Vec<ServiceCall>>,
    }

    impl StubQaService {
        fn recorded_calls(&self) -> Vec<ServiceCall> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl QaApi for StubQaService {
        async fn build_index(&self, pages: &[PageRecord]) -> Result<VectorIndex, BuildError> {
            self.calls
                .lock()
                .unwrap()
                .push(ServiceCall::Build(pages.len()));
            let chunks: Vec<Chunk> = pages
                .iter()
                .map(|page| Chunk {
                    text: page.text.clone(),
                    source_path: page.source_path.clone(),
                    page_number: page.page_number,
                })
                .collect();
            let vectors = vec![vec![1.0, 0.0]; chunks.len()];
            Ok(VectorIndex::from_pairs(chunks, vectors).expect("stub index"))
        }

        async fn answer(
            &self,
            question: &str,
            index: &VectorIndex,
        ) -> Result<AnswerResult, QueryError> {
            self.calls
                .lock()
                .unwrap()
                .push(ServiceCall::Answer(question.to_string()));
            let supporting_chunks = index
                .search(&[1.0, 0.0], 1)
                .expect("stub search")
                .into_iter()
                .map(|hit| hit.chunk)
                .collect();
            Ok(AnswerResult {
                answer_text: format!("stub answer to: {question}"),
                supporting_chunks,
                elapsed: Duration::from_millis(5),
            })
        }

        fn metrics_snapshot(&self) -> MetricsSnapshot {
            MetricsSnapshot {
                builds_completed: 0,
                chunks_indexed: 0,
                questions_answered: 0,
            }
        }
    }

    async fn session_with_index() -> Session<StubQaService> {
        let mut session = Session::new(StubQaService::default());
        let pages = [PageRecord {
            text: "The sky is blue.".to_string(),
            source_path: PathBuf::from("corpus/report.pdf"),
            page_number: 1,
        }];
        let index = session.service.build_index(&pages).await.expect("index");
        session.state.install_index(index);
        session.service.calls.lock().unwrap().clear();
        session
    }

    #[tokio::test]
    async fn ask_before_build_reports_index_not_ready_without_service_call() {
        let mut session = Session::new(StubQaService::default());

        let error = session.ask("What color is the sky?").await.unwrap_err();
        assert!(matches!(error, SessionError::IndexNotReady));
        assert!(session.service.recorded_calls().is_empty());
        // The question still lands in history, as the original tool behaves.
        assert_eq!(session.state().history(), ["What color is the sky?"]);
    }

    #[tokio::test]
    async fn blank_question_is_rejected_and_not_recorded() {
        let mut session = Session::new(StubQaService::default());

        let error = session.ask("   ").await.unwrap_err();
        assert!(matches!(error, SessionError::BlankQuestion));
        assert!(session.state().history().is_empty());
        assert!(session.service.recorded_calls().is_empty());
    }

    #[tokio::test]
    async fn empty_file_set_aborts_before_the_service() {
        let mut session = session_with_index().await;

        let error = session.build_from_files(&[]).await.unwrap_err();
        assert!(matches!(error, SessionError::Ingest(IngestError::NoFiles)));
        assert!(session.service.recorded_calls().is_empty());
        // The previously installed index is untouched.
        assert!(session.state().index().is_some());
    }

    #[tokio::test]
    async fn empty_directory_aborts_before_the_service() {
        let mut session = Session::new(StubQaService::default());
        let dir = tempfile::tempdir().expect("tempdir");

        let error = session.build_from_directory(dir.path()).await.unwrap_err();
        assert!(matches!(error, SessionError::Ingest(IngestError::NoFiles)));
        assert!(session.service.recorded_calls().is_empty());
    }

    #[tokio::test]
    async fn failed_build_keeps_the_previous_index() {
        let mut session = session_with_index().await;
        let previous_len = session.state().index().unwrap().len();

        let dir = tempfile::tempdir().expect("tempdir");
        let bogus = dir.path().join("broken.pdf");
        fs::write(&bogus, b"this is not a pdf").unwrap();

        let error = session.build_from_files(&[bogus]).await.unwrap_err();
        assert!(matches!(
            error,
            SessionError::Ingest(IngestError::Extraction { .. })
        ));
        assert!(session.service.recorded_calls().is_empty());
        assert_eq!(session.state().index().unwrap().len(), previous_len);
    }

    #[tokio::test]
    async fn questions_accumulate_and_display_caps_at_five() {
        let mut session = session_with_index().await;

        for i in 1..=6 {
            session.ask(&format!("q{i}")).await.expect("answer");
        }

        assert_eq!(session.state().history().len(), 6);
        assert_eq!(
            session.state().displayed_history(),
            ["q2", "q3", "q4", "q5", "q6"]
        );
    }

    #[tokio::test]
    async fn ask_stores_the_latest_answer() {
        let mut session = session_with_index().await;

        let answer = session.ask("What color is the sky?").await.expect("answer");
        assert_eq!(answer.answer_text, "stub answer to: What color is the sky?");
        assert_eq!(answer.supporting_chunks.len(), 1);
        assert!(session.state().last_answer().is_some());
    }

    #[tokio::test]
    async fn save_answer_requires_an_answer() {
        let session = Session::new(StubQaService::default());
        let dir = tempfile::tempdir().expect("tempdir");
        let error = session
            .save_answer(&dir.path().join("answer.txt"))
            .unwrap_err();
        assert!(matches!(error, SessionError::NoAnswer));
    }

    #[tokio::test]
    async fn save_answer_writes_plain_text() {
        let mut session = session_with_index().await;
        session.ask("What color is the sky?").await.expect("answer");

        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("answer.txt");
        session.save_answer(&path).expect("save");

        let contents = fs::read_to_string(&path).expect("read back");
        assert_eq!(contents, "stub answer to: What color is the sky?");
    }
}
