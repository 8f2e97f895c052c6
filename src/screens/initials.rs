use crate::game::leaderboard_set::NAME_CHAR_LIMIT;
use log::warn;
use std::io::{self, BufRead, Write};

/// Asks the player for the name to put next to a qualifying score.
/// `None` means the player backed out.
pub trait NamePrompt {
    fn prompt_name(&mut self, score: i64) -> Option<String>;
}

/// Line-based prompt. An empty line or end of input cancels.
pub struct LinePrompt<R, W> {
    input: R,
    output: W,
}

impl LinePrompt<io::StdinLock<'static>, io::Stdout> {
    pub fn stdin() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> LinePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> NamePrompt for LinePrompt<R, W> {
    fn prompt_name(&mut self, score: i64) -> Option<String> {
        let shown = write!(
            self.output,
            "New high score: {score}! Enter your name (max {NAME_CHAR_LIMIT} characters): "
        )
        .and_then(|()| self.output.flush());
        if let Err(e) = shown {
            warn!("Failed to show name prompt: {e}");
        }

        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => {
                // Only the line terminator is stripped; the name is validated as typed.
                let name = line.trim_end_matches(['\r', '\n']);
                (!name.is_empty()).then(|| name.to_string())
            }
            Err(e) => {
                warn!("Failed to read name: {e}");
                None
            }
        }
    }
}
