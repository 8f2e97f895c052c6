use crate::config::{self, Config};
use crate::core::network::HttpBackend;
use crate::game::leaderboard_set::LeaderboardSet;
use crate::game::scores::{Collaborators, Pending, join_all};
use crate::screens::initials::{LinePrompt, NamePrompt};
use crate::ui::alert::ConsoleReporter;
use crate::ui::board_text::TextSurface;
use log::{info, warn};
use std::error::Error;
use std::sync::Arc;

/* -------------------- score entry flow -------------------- */

#[derive(Debug)]
pub enum Offer {
    /// No board would take the score; the player is not asked for a name.
    NotHighScore,
    /// The player backed out of name entry.
    Cancelled,
    Submitted(Vec<Pending>),
}

/// Runs the end-of-game flow for one score: qualify, ask for a name until it
/// validates or the player cancels, then submit to every qualifying board.
pub fn offer_score(set: &LeaderboardSet, score: i64, prompt: &mut dyn NamePrompt) -> Offer {
    if !set.is_new_high_score(score) {
        info!("Score {score} is not a new high score.");
        return Offer::NotHighScore;
    }
    loop {
        let Some(name) = prompt.prompt_name(score) else {
            info!("Name entry cancelled; score {score} not submitted.");
            return Offer::Cancelled;
        };
        if set.validate_entry(score, &name) {
            return Offer::Submitted(set.submit(score, &name));
        }
    }
}

fn wait_and_log(pending: Vec<Pending>) {
    for (board_id, outcome) in join_all(pending) {
        if let Err(e) = outcome {
            warn!("Board '{board_id}' did not update: {e}");
        }
    }
}

fn print_surface(surface: &TextSurface) {
    for (target, lines) in surface.dump() {
        println!("[{target}]");
        for line in lines {
            println!("{line}");
        }
        println!();
    }
}

fn parse_score_arg(mut args: impl Iterator<Item = String>) -> Result<Option<i64>, Box<dyn Error>> {
    match args.next() {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|e| format!("invalid score '{raw}': {e}").into()),
    }
}

pub fn build_set(cfg: &Config, surface: Arc<TextSurface>) -> LeaderboardSet {
    let collab = Collaborators {
        backend: Arc::new(HttpBackend::from_config(cfg)),
        renderer: surface,
        reporter: Arc::new(ConsoleReporter),
    };
    LeaderboardSet::new(cfg.boards.iter().cloned(), collab)
}

pub fn run() -> Result<(), Box<dyn Error>> {
    let score = parse_score_arg(std::env::args().skip(1))?;
    let cfg = config::get();

    let surface = Arc::new(TextSurface::new());
    let set = build_set(&cfg, surface.clone());
    if set.is_empty() {
        return Err("no usable boards configured in [Boards]".into());
    }

    // The terminal can only print once every board has answered.
    wait_and_log(set.refresh_all());
    print_surface(&surface);

    let Some(score) = score else {
        return Ok(());
    };
    let mut prompt = LinePrompt::stdin();
    match offer_score(&set, score, &mut prompt) {
        Offer::Submitted(pending) => {
            wait_and_log(pending);
            print_surface(&surface);
        }
        Offer::NotHighScore => println!("{score} is not a new high score."),
        Offer::Cancelled => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::leaderboard_set::{BoardCandidate, Violation};
    use crate::game::testing::{Fixture, snapshot};
    use std::collections::VecDeque;

    struct Scripted(VecDeque<Option<String>>);

    impl NamePrompt for Scripted {
        fn prompt_name(&mut self, _score: i64) -> Option<String> {
            self.0.pop_front().flatten()
        }
    }

    fn scripted(names: &[Option<&str>]) -> Scripted {
        Scripted(names.iter().map(|n| n.map(str::to_string)).collect())
    }

    fn loaded_set(fx: &Fixture) -> LeaderboardSet {
        let set = LeaderboardSet::new(vec![BoardCandidate::new("main", "view")], fx.collab());
        set.get("main")
            .unwrap()
            .apply(&snapshot(3, 100, &[("AAA", 500), ("BBB", 300), ("CCC", 100)]));
        set
    }

    #[test]
    fn low_score_never_prompts() {
        let fx = Fixture::new();
        let set = loaded_set(&fx);
        let mut prompt = scripted(&[Some("ZZZ")]);
        assert!(matches!(offer_score(&set, 100, &mut prompt), Offer::NotHighScore));
        assert_eq!(prompt.0.len(), 1);
    }

    #[test]
    fn invalid_name_is_asked_again_before_submitting() {
        let fx = Fixture::new();
        let set = loaded_set(&fx);
        fx.backend.set_add("main", Ok(snapshot(3, 101, &[("AAA", 500), ("BBB", 300), ("ZZZ", 101)])));
        let mut prompt = scripted(&[Some("ABCDEFGHIJK"), Some("ZZZ")]);

        let Offer::Submitted(pending) = offer_score(&set, 101, &mut prompt) else {
            panic!("expected a submission");
        };
        assert!(join_all(pending).iter().all(|(_, r)| r.is_ok()));
        assert_eq!(fx.reporter.reports(), vec![vec![Violation::NameTooLong]]);
        assert_eq!(fx.backend.adds(), vec![("main".to_string(), "ZZZ".to_string(), 101)]);
    }

    #[test]
    fn cancelling_sends_nothing() {
        let fx = Fixture::new();
        let set = loaded_set(&fx);
        let mut prompt = scripted(&[None]);
        assert!(matches!(offer_score(&set, 200, &mut prompt), Offer::Cancelled));
        assert!(fx.backend.adds().is_empty());
    }

    #[test]
    fn score_argument_is_optional_but_must_be_a_number() {
        assert_eq!(parse_score_arg(std::iter::empty()).unwrap(), None);
        assert_eq!(parse_score_arg(std::iter::once("42".to_string())).unwrap(), Some(42));
        assert!(parse_score_arg(std::iter::once("lots".to_string())).is_err());
    }
}
