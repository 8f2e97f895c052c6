use crate::game::scores::{Collaborators, Leaderboard, Pending};
use crate::ui::alert::Reporter;
use crate::ui::board_text::RenderTarget;
use log::{error, info, warn};
use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

pub const NAME_CHAR_LIMIT: usize = 10;

// --- Entry Validation ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    ZeroScore,
    MissingName,
    NameTooLong,
}

impl Violation {
    pub const fn message(&self) -> &'static str {
        match self {
            Self::ZeroScore => "Score cannot be 0.",
            Self::MissingName => "Name is missing.",
            Self::NameTooLong => "Name longer than 10 characters.",
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Every rule `(score, name)` breaks, in rule order.
///
/// The length limit applies to the name as typed, so surrounding whitespace
/// counts toward it even though a blank name is judged after trimming. Length
/// is measured in UTF-16 units, the way the scoring service's clients count it.
pub fn entry_violations(score: i64, name: &str) -> SmallVec<[Violation; 3]> {
    let mut violations = SmallVec::new();
    if score == 0 {
        violations.push(Violation::ZeroScore);
    }
    if name.trim().is_empty() {
        violations.push(Violation::MissingName);
    }
    if name.encode_utf16().count() > NAME_CHAR_LIMIT {
        violations.push(Violation::NameTooLong);
    }
    violations
}

// --- Membership ---

/// A board the session would like to track, before it has been checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardCandidate {
    pub board_id: String,
    pub render_target: String,
}

impl BoardCandidate {
    pub fn new(board_id: impl Into<String>, render_target: impl Into<String>) -> Self {
        Self {
            board_id: board_id.into(),
            render_target: render_target.into(),
        }
    }

    /// A candidate conforms when its id can name one board on the service and
    /// it has somewhere to be drawn.
    fn conformance(&self, seen: &FxHashSet<String>) -> Result<(), Nonconformance> {
        if self.board_id.trim().is_empty() {
            return Err(Nonconformance::BlankBoardId);
        }
        if self
            .board_id
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || matches!(c, '/' | '?' | '#' | '%'))
        {
            return Err(Nonconformance::UnsafeBoardId);
        }
        if seen.contains(&self.board_id) {
            return Err(Nonconformance::DuplicateBoardId);
        }
        if self.render_target.trim().is_empty() {
            return Err(Nonconformance::BlankRenderTarget);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nonconformance {
    BlankBoardId,
    /// Contains characters that cannot sit in one URL path segment.
    UnsafeBoardId,
    DuplicateBoardId,
    BlankRenderTarget,
}

impl fmt::Display for Nonconformance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::BlankBoardId => "board id is blank",
            Self::UnsafeBoardId => "board id is not a single URL path segment",
            Self::DuplicateBoardId => "board id is already in the set",
            Self::BlankRenderTarget => "render target is blank",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejected {
    /// Position in the candidate list as given.
    pub index: usize,
    pub candidate: BoardCandidate,
    pub reason: Nonconformance,
}

/// The boards of one game session. Membership is fixed at construction.
pub struct LeaderboardSet {
    boards: Vec<Leaderboard>,
    rejected: Vec<Rejected>,
    reporter: Arc<dyn Reporter>,
}

impl LeaderboardSet {
    /// Keeps the conforming candidates in the order given. Each rejected
    /// candidate is logged once; construction itself never fails.
    pub fn new(candidates: impl IntoIterator<Item = BoardCandidate>, collab: Collaborators) -> Self {
        let mut boards = Vec::new();
        let mut rejected = Vec::new();
        let mut seen = FxHashSet::default();

        for (index, candidate) in candidates.into_iter().enumerate() {
            match candidate.conformance(&seen) {
                Ok(()) => {
                    seen.insert(candidate.board_id.clone());
                    boards.push(Leaderboard::new(
                        candidate.board_id,
                        RenderTarget::new(candidate.render_target),
                        collab.clone(),
                    ));
                }
                Err(reason) => {
                    error!(
                        "Invalid high score board #{index} ('{}' -> '{}'): {reason}. It will not be tracked.",
                        candidate.board_id, candidate.render_target
                    );
                    rejected.push(Rejected {
                        index,
                        candidate,
                        reason,
                    });
                }
            }
        }

        info!(
            "Tracking {} high score board(s), {} rejected.",
            boards.len(),
            rejected.len()
        );
        Self {
            boards,
            rejected,
            reporter: collab.reporter,
        }
    }

    pub fn boards(&self) -> &[Leaderboard] {
        &self.boards
    }

    pub fn rejected(&self) -> &[Rejected] {
        &self.rejected
    }

    pub fn get(&self, board_id: &str) -> Option<&Leaderboard> {
        self.boards.iter().find(|b| b.board_id() == board_id)
    }

    pub fn len(&self) -> usize {
        self.boards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boards.is_empty()
    }

    /// Whether the score belongs on at least one board, i.e. whether the
    /// player should be asked for a name.
    pub fn is_new_high_score(&self, score: i64) -> bool {
        self.boards.iter().any(|b| b.is_new_high_score(score))
    }

    /// Starts a refresh of every board. Each one resolves and redraws on its
    /// own; a failing board does not hold up the rest.
    pub fn refresh_all(&self) -> Vec<Pending> {
        self.boards.iter().map(Leaderboard::spawn_refresh).collect()
    }

    /// Starts a submission to every board the score qualifies for.
    pub fn submit(&self, score: i64, name: &str) -> Vec<Pending> {
        let pending: Vec<Pending> = self
            .boards
            .iter()
            .filter(|b| b.is_new_high_score(score))
            .map(|b| b.spawn_submit(score, name))
            .collect();
        if pending.is_empty() {
            warn!("Score {score} does not qualify for any board; nothing submitted.");
        }
        pending
    }

    /// Checks `(score, name)` before anything is sent. All problems are
    /// reported together.
    pub fn validate_entry(&self, score: i64, name: &str) -> bool {
        let violations = entry_violations(score, name);
        if violations.is_empty() {
            return true;
        }
        self.reporter.report(&violations);
        false
    }
}
