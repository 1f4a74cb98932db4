//! Session-scoped application state.

use crate::index::VectorIndex;
use crate::qa::AnswerResult;

/// Number of history entries shown to the user.
///
/// Storage is intentionally unbounded while only the display is capped,
/// matching the observed behavior this tool reproduces.
pub const HISTORY_DISPLAY_LIMIT: usize = 5;

/// Which main panel the front-end should render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    /// No question submitted yet; prompt the user to ask one.
    Idle,
    /// A question was submitted but no index has been built.
    IndexRequired,
    /// A question is being processed against a ready index.
    Processing,
    /// An answer is available for display.
    Results,
}

/// All state for one interactive session, threaded explicitly through the
/// dispatcher. There is no hidden global store.
#[derive(Default)]
pub struct AppState {
    index: Option<VectorIndex>,
    history: Vec<String>,
    last_answer: Option<AnswerResult>,
}

impl AppState {
    /// Create an empty session state.
    pub fn new() -> Self {
        Self::default()
    }

    /// The currently installed index, if a build has succeeded.
    pub fn index(&self) -> Option<&VectorIndex> {
        self.index.as_ref()
    }

    /// Install a freshly built index, discarding any previous one wholesale.
    ///
    /// Returns true when an older index was replaced.
    pub fn install_index(&mut self, index: VectorIndex) -> bool {
        self.index.replace(index).is_some()
    }

    /// Append a submitted question to the stored history.
    pub fn record_question(&mut self, question: &str) {
        self.history.push(question.to_string());
    }

    /// Full stored history, oldest first. Never trimmed.
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// The slice of history shown to the user: the most recent
    /// [`HISTORY_DISPLAY_LIMIT`] entries in append order.
    pub fn displayed_history(&self) -> &[String] {
        let start = self.history.len().saturating_sub(HISTORY_DISPLAY_LIMIT);
        &self.history[start..]
    }

    /// The most recent answer, if any.
    pub fn last_answer(&self) -> Option<&AnswerResult> {
        self.last_answer.as_ref()
    }

    /// Store the answer to the most recent question.
    pub fn store_answer(&mut self, answer: AnswerResult) {
        self.last_answer = Some(answer);
    }

    /// Decide which panel to render from the two readiness gates: "index
    /// built?" and "question submitted?".
    pub fn panel(&self, question_submitted: bool) -> Panel {
        if !question_submitted {
            return Panel::Idle;
        }
        if self.index.is_none() {
            return Panel::IndexRequired;
        }
        if self.last_answer.is_some() {
            Panel::Results
        } else {
            Panel::Processing
        }
    }
}
