pub mod leaderboard_set;
pub mod scores;

#[cfg(test)]
pub(crate) mod testing;
