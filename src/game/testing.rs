//! Recording fakes for the board collaborators.

use crate::core::network::{Backend, BoardSnapshot, RequestError, ScoreEntry};
use crate::game::leaderboard_set::Violation;
use crate::game::scores::{Collaborators, Leaderboard};
use crate::ui::alert::Reporter;
use crate::ui::board_text::{RenderTarget, Renderer};
use log::{Level, Log, Metadata, Record};
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::sync::{Arc, Mutex, Once};

pub fn snapshot(capacity: usize, bottom_score: i64, rows: &[(&str, i64)]) -> BoardSnapshot {
    BoardSnapshot {
        entries: rows.iter().map(|(n, s)| ScoreEntry::new(*n, *s)).collect(),
        capacity,
        bottom_score,
    }
}

type Reply = Result<BoardSnapshot, RequestError>;

#[derive(Default)]
pub struct FakeBackend {
    fetch_replies: Mutex<FxHashMap<String, Reply>>,
    add_replies: Mutex<FxHashMap<String, Reply>>,
    fetches: Mutex<Vec<String>>,
    adds: Mutex<Vec<(String, String, i64)>>,
}

impl FakeBackend {
    pub fn set_fetch(&self, board_id: &str, reply: Reply) {
        self.fetch_replies
            .lock()
            .unwrap()
            .insert(board_id.to_string(), reply);
    }

    pub fn set_add(&self, board_id: &str, reply: Reply) {
        self.add_replies
            .lock()
            .unwrap()
            .insert(board_id.to_string(), reply);
    }

    pub fn fetches(&self) -> Vec<String> {
        self.fetches.lock().unwrap().clone()
    }

    pub fn adds(&self) -> Vec<(String, String, i64)> {
        self.adds.lock().unwrap().clone()
    }

    fn reply(map: &Mutex<FxHashMap<String, Reply>>, board_id: &str) -> Reply {
        map.lock()
            .unwrap()
            .get(board_id)
            .cloned()
            .unwrap_or_else(|| Err(RequestError::Transport(format!("no route to {board_id}"))))
    }
}

impl Backend for FakeBackend {
    fn fetch_scores(&self, board_id: &str) -> Reply {
        self.fetches.lock().unwrap().push(board_id.to_string());
        Self::reply(&self.fetch_replies, board_id)
    }

    fn add_score(&self, board_id: &str, name: &str, score: i64) -> Reply {
        self.adds
            .lock()
            .unwrap()
            .push((board_id.to_string(), name.to_string(), score));
        Self::reply(&self.add_replies, board_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Drawn {
    Board {
        target: String,
        names: Vec<String>,
        capacity: usize,
    },
    Error(String),
}

#[derive(Default)]
pub struct RecordingRenderer {
    drawn: Mutex<Vec<Drawn>>,
}

impl RecordingRenderer {
    pub fn drawn(&self) -> Vec<Drawn> {
        self.drawn.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.drawn.lock().unwrap().clear();
    }
}

impl Renderer for RecordingRenderer {
    fn render(&self, target: &RenderTarget, entries: &[ScoreEntry], capacity: usize) {
        self.drawn.lock().unwrap().push(Drawn::Board {
            target: target.to_string(),
            names: entries.iter().map(|e| e.name.clone()).collect(),
            capacity,
        });
    }

    fn render_error(&self, target: &RenderTarget) {
        self.drawn
            .lock()
            .unwrap()
            .push(Drawn::Error(target.to_string()));
    }
}

#[derive(Default)]
pub struct RecordingReporter {
    reports: Mutex<Vec<Vec<Violation>>>,
    failures: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub fn reports(&self) -> Vec<Vec<Violation>> {
        self.reports.lock().unwrap().clone()
    }

    pub fn failures(&self) -> Vec<String> {
        self.failures.lock().unwrap().clone()
    }
}

impl Reporter for RecordingReporter {
    fn report(&self, violations: &[Violation]) {
        self.reports.lock().unwrap().push(violations.to_vec());
    }

    fn report_failure(&self, reason: &str) {
        self.failures.lock().unwrap().push(reason.to_string());
    }
}

pub struct Fixture {
    pub backend: Arc<FakeBackend>,
    pub renderer: Arc<RecordingRenderer>,
    pub reporter: Arc<RecordingReporter>,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            backend: Arc::new(FakeBackend::default()),
            renderer: Arc::new(RecordingRenderer::default()),
            reporter: Arc::new(RecordingReporter::default()),
        }
    }

    pub fn collab(&self) -> Collaborators {
        Collaborators {
            backend: self.backend.clone(),
            renderer: self.renderer.clone(),
            reporter: self.reporter.clone(),
        }
    }

    /// A board drawn into `<id>-view`.
    pub fn board(&self, board_id: &str) -> Leaderboard {
        Leaderboard::new(
            board_id,
            RenderTarget::new(format!("{board_id}-view")),
            self.collab(),
        )
    }
}

// --- Log Capture ---

thread_local! {
    static CAPTURED: RefCell<Option<Vec<(Level, String)>>> = const { RefCell::new(None) };
}

struct CaptureLogger;

impl Log for CaptureLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        CAPTURED.with(|c| {
            if let Some(buf) = c.borrow_mut().as_mut() {
                buf.push((record.level(), record.args().to_string()));
            }
        });
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger;
static INSTALL: Once = Once::new();

/// Runs `f` and returns what it logged on this thread.
pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, Vec<(Level, String)>) {
    INSTALL.call_once(|| {
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(log::LevelFilter::Trace);
        }
    });
    CAPTURED.with(|c| *c.borrow_mut() = Some(Vec::new()));
    let out = f();
    let logs = CAPTURED.with(|c| c.borrow_mut().take().unwrap_or_default());
    (out, logs)
}
