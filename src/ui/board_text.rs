use crate::core::network::ScoreEntry;
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::Mutex;

pub const HEADER: &str = " # SCORE NAME";
pub const FILLER_NAME: &str = "..........";
pub const ERROR_LINES: [&str; 2] = ["ERROR!", "DATA NOT OBTAINED."];

const RANK_WIDTH: usize = 2;
const SCORE_WIDTH: usize = 5;
const NAME_WIDTH: usize = 10;

/// Opaque handle naming where a board is drawn.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RenderTarget(String);

impl RenderTarget {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl fmt::Display for RenderTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Drawing surface for boards. Both calls are fire-and-forget.
pub trait Renderer: Send + Sync {
    fn render(&self, target: &RenderTarget, entries: &[ScoreEntry], capacity: usize);
    fn render_error(&self, target: &RenderTarget);
}

pub fn row(rank: usize, score: i64, name: &str) -> String {
    format!("{rank:>RANK_WIDTH$} {score:>SCORE_WIDTH$} {name:<NAME_WIDTH$}")
}

/// Header plus exactly `capacity` rows, in the order given. Slots past the end
/// of `entries` are filled with a zero score and the placeholder name.
pub fn board_lines(entries: &[ScoreEntry], capacity: usize) -> Vec<String> {
    let mut lines = Vec::with_capacity(capacity + 1);
    lines.push(HEADER.to_string());
    for x in 0..capacity {
        let line = match entries.get(x) {
            Some(entry) => row(x + 1, entry.score, &entry.name),
            None => row(x + 1, 0, FILLER_NAME),
        };
        lines.push(line);
    }
    lines
}

pub fn error_lines() -> Vec<String> {
    ERROR_LINES.iter().map(|s| s.to_string()).collect()
}

/// In-memory text surface. Each target holds the lines of its last draw.
#[derive(Debug, Default)]
pub struct TextSurface {
    targets: Mutex<FxHashMap<RenderTarget, Vec<String>>>,
}

impl TextSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self, target: &RenderTarget) -> Option<Vec<String>> {
        self.targets.lock().unwrap().get(target).cloned()
    }

    /// Every drawn target with its lines, sorted by target name.
    pub fn dump(&self) -> Vec<(RenderTarget, Vec<String>)> {
        let mut out: Vec<_> = self
            .targets
            .lock()
            .unwrap()
            .iter()
            .map(|(t, l)| (t.clone(), l.clone()))
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }

    fn replace(&self, target: &RenderTarget, lines: Vec<String>) {
        self.targets.lock().unwrap().insert(target.clone(), lines);
    }
}

impl Renderer for TextSurface {
    fn render(&self, target: &RenderTarget, entries: &[ScoreEntry], capacity: usize) {
        self.replace(target, board_lines(entries, capacity));
    }

    fn render_error(&self, target: &RenderTarget) {
        self.replace(target, error_lines());
    }
}
