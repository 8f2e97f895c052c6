use crate::core::network::{Backend, BoardSnapshot, RequestError, ScoreEntry};
use crate::ui::alert::Reporter;
use crate::ui::board_text::{RenderTarget, Renderer};
use chrono::{DateTime, Local, TimeDelta};
use log::{error, info, warn};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

/// External collaborators shared by every board of a session.
#[derive(Clone)]
pub struct Collaborators {
    pub backend: Arc<dyn Backend>,
    pub renderer: Arc<dyn Renderer>,
    pub reporter: Arc<dyn Reporter>,
}

// --- Board State ---

#[derive(Debug, Clone, Default)]
struct BoardState {
    entries: Vec<ScoreEntry>,
    capacity: usize,
    bottom_score: i64,
    loaded: bool,
    updated_at: Option<DateTime<Local>>,
}

impl BoardState {
    fn qualifies(&self, score: i64) -> bool {
        if !self.loaded || score == 0 {
            return false;
        }
        // An open slot admits a tie with the bottom score; a full board does not,
        // so an equal score never evicts the current holder.
        if self.entries.len() < self.capacity {
            score >= self.bottom_score
        } else {
            score > self.bottom_score
        }
    }

    fn replace(&mut self, snapshot: &BoardSnapshot) {
        self.entries = snapshot.entries.clone();
        self.capacity = snapshot.capacity;
        self.bottom_score = snapshot.bottom_score;
        self.loaded = true;
        self.updated_at = Some(Local::now());
    }
}

/// One named board. Clones share the same state.
#[derive(Clone)]
pub struct Leaderboard {
    board_id: String,
    render_target: RenderTarget,
    state: Arc<Mutex<BoardState>>,
    collab: Collaborators,
}

impl std::fmt::Debug for Leaderboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Leaderboard")
            .field("board_id", &self.board_id)
            .field("render_target", &self.render_target)
            .field("state", &*self.state.lock().unwrap())
            .finish()
    }
}

impl Leaderboard {
    pub fn new(
        board_id: impl Into<String>,
        render_target: RenderTarget,
        collab: Collaborators,
    ) -> Self {
        Self {
            board_id: board_id.into(),
            render_target,
            state: Arc::new(Mutex::new(BoardState::default())),
            collab,
        }
    }

    pub fn board_id(&self) -> &str {
        &self.board_id
    }

    pub fn render_target(&self) -> &RenderTarget {
        &self.render_target
    }

    pub fn is_loaded(&self) -> bool {
        self.state.lock().unwrap().loaded
    }

    pub fn capacity(&self) -> usize {
        self.state.lock().unwrap().capacity
    }

    pub fn bottom_score(&self) -> i64 {
        self.state.lock().unwrap().bottom_score
    }

    pub fn entries(&self) -> Vec<ScoreEntry> {
        self.state.lock().unwrap().entries.clone()
    }

    pub fn updated_at(&self) -> Option<DateTime<Local>> {
        self.state.lock().unwrap().updated_at
    }

    /// True when the board was never loaded or its snapshot is older than `max_age`.
    pub fn is_stale(&self, max_age: TimeDelta) -> bool {
        match self.updated_at() {
            Some(at) => Local::now().signed_duration_since(at) > max_age,
            None => true,
        }
    }

    pub fn is_new_high_score(&self, score: i64) -> bool {
        self.state.lock().unwrap().qualifies(score)
    }

    /// Replaces the whole board with `snapshot` and redraws it. The draw happens
    /// under the board lock so the surface always shows the state it holds.
    pub fn apply(&self, snapshot: &BoardSnapshot) {
        let mut state = self.state.lock().unwrap();
        state.replace(snapshot);
        self.collab
            .renderer
            .render(&self.render_target, &state.entries, state.capacity);
    }

    /// Fetches the board. On failure the previous state stays and the error
    /// indicator is drawn instead.
    pub fn refresh(&self) -> Result<(), RequestError> {
        match self.collab.backend.fetch_scores(&self.board_id) {
            Ok(snapshot) => {
                info!(
                    "Loaded board '{}': {} of {} slots, bottom score {}.",
                    self.board_id,
                    snapshot.entries.len(),
                    snapshot.capacity,
                    snapshot.bottom_score
                );
                self.apply(&snapshot);
                Ok(())
            }
            Err(e) => {
                if let RequestError::Rejected(errors) = &e {
                    error!("Board '{}' refused the request: {errors:?}", self.board_id);
                } else {
                    warn!("Failed to load board '{}': {e}", self.board_id);
                }
                let _state = self.state.lock().unwrap();
                self.collab.renderer.render_error(&self.render_target);
                Err(e)
            }
        }
    }

    /// Sends one submission. The response is the new board; nothing is
    /// inserted locally. Not retried.
    pub fn submit_score(&self, score: i64, name: &str) -> Result<(), RequestError> {
        info!("Submitting {score} for '{name}' to board '{}'.", self.board_id);
        match self.collab.backend.add_score(&self.board_id, name, score) {
            Ok(snapshot) => {
                self.apply(&snapshot);
                Ok(())
            }
            Err(e) => {
                if let RequestError::Rejected(errors) = &e {
                    error!("Board '{}' rejected the score: {errors:?}", self.board_id);
                }
                self.collab
                    .reporter
                    .report_failure(&format!("Error adding score. Reason: {e}"));
                Err(e)
            }
        }
    }

    pub fn spawn_refresh(&self) -> Pending {
        let board = self.clone();
        Pending {
            board_id: self.board_id.clone(),
            handle: thread::spawn(move || board.refresh()),
        }
    }

    pub fn spawn_submit(&self, score: i64, name: &str) -> Pending {
        let board = self.clone();
        let name = name.to_string();
        Pending {
            board_id: self.board_id.clone(),
            handle: thread::spawn(move || board.submit_score(score, &name)),
        }
    }
}

/// A request running on its own worker thread. Dropping it detaches the worker;
/// the board still updates and redraws when the request finishes.
#[derive(Debug)]
pub struct Pending {
    board_id: String,
    handle: JoinHandle<Result<(), RequestError>>,
}

impl Pending {
    pub fn board_id(&self) -> &str {
        &self.board_id
    }

    pub fn join(self) -> Result<(), RequestError> {
        self.handle
            .join()
            .unwrap_or_else(|_| Err(RequestError::Transport("request worker panicked".into())))
    }
}

/// Waits for every request and returns the outcomes keyed by board id, in the
/// order the requests were started.
pub fn join_all(pending: Vec<Pending>) -> Vec<(String, Result<(), RequestError>)> {
    pending
        .into_iter()
        .map(|p| {
            let id = p.board_id.clone();
            (id, p.join())
        })
        .collect()
}
