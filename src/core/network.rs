use crate::config::Config;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "https://highscore.sasagu.com/api/v1";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// One ranked row as the scoring service returns it.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ScoreEntry {
    pub name: String,
    pub score: i64,
}

impl ScoreEntry {
    pub fn new(name: impl Into<String>, score: i64) -> Self {
        Self {
            name: name.into(),
            score,
        }
    }
}

/// Authoritative board state carried by every successful response.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BoardSnapshot {
    pub entries: Vec<ScoreEntry>,
    pub capacity: usize,
    pub bottom_score: i64,
}

#[derive(Deserialize, Debug)]
struct ApiResponse {
    success: bool,
    #[serde(default)]
    scores: Vec<ScoreEntry>,
    #[serde(default)]
    score_to_keep: u32,
    #[serde(default)]
    bottom_score: i64,
    #[serde(default)]
    errors: Option<Vec<String>>,
}

impl ApiResponse {
    fn into_snapshot(self) -> Result<BoardSnapshot, RequestError> {
        if !self.success {
            return Err(RequestError::Rejected(self.errors.unwrap_or_default()));
        }
        Ok(BoardSnapshot {
            entries: self.scores,
            capacity: self.score_to_keep as usize,
            bottom_score: self.bottom_score,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// The request never produced a response (DNS, connect, timeout, ...).
    Transport(String),
    /// Non-2xx HTTP status.
    Status(u16),
    /// The body was not the expected JSON shape.
    Decode(String),
    /// `success: false` with the server's `errors` list.
    Rejected(Vec<String>),
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "HTTP error: {e}"),
            Self::Status(code) => write!(f, "server returned status {code}"),
            Self::Decode(e) => write!(f, "failed to parse response: {e}"),
            Self::Rejected(errors) if errors.is_empty() => f.write_str("request rejected"),
            Self::Rejected(errors) => f.write_str(&errors.join(", ")),
        }
    }
}

impl std::error::Error for RequestError {}

/// Name of the board id field in the add-score body. Older deployments of the
/// service expect `gameId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitIdField {
    HighscoreId,
    GameId,
}

impl SubmitIdField {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::HighscoreId => "highscore_id",
            Self::GameId => "gameId",
        }
    }
}

impl FromStr for SubmitIdField {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "highscore_id" => Ok(Self::HighscoreId),
            "gameid" | "game_id" => Ok(Self::GameId),
            _ => Err(()),
        }
    }
}

/// The remote scoring service, as seen by one board.
pub trait Backend: Send + Sync {
    fn fetch_scores(&self, board_id: &str) -> Result<BoardSnapshot, RequestError>;
    fn add_score(&self, board_id: &str, name: &str, score: i64)
    -> Result<BoardSnapshot, RequestError>;
}

pub fn get_agent(timeout: Duration) -> ureq::Agent {
    ureq::Agent::config_builder()
        .timeout_global(Some(timeout))
        .build()
        .into()
}

pub fn scores_url(base: &str, board_id: &str) -> String {
    format!("{}/scores/{}", base.trim_end_matches('/'), board_id)
}

pub fn add_score_url(base: &str) -> String {
    format!("{}/add-score", base.trim_end_matches('/'))
}

pub fn add_score_body(id_field: SubmitIdField, board_id: &str, name: &str, score: i64) -> Value {
    let mut body = Map::new();
    body.insert(id_field.as_str().to_string(), Value::from(board_id));
    body.insert("name".to_string(), Value::from(name));
    body.insert("score".to_string(), Value::from(score));
    Value::Object(body)
}

/// Decodes a response body that arrived with a 2xx status.
pub fn parse_response(body: &str) -> Result<BoardSnapshot, RequestError> {
    serde_json::from_str::<ApiResponse>(body)
        .map_err(|e| RequestError::Decode(e.to_string()))?
        .into_snapshot()
}

fn read_response(
    result: Result<ureq::http::Response<ureq::Body>, ureq::Error>,
) -> Result<BoardSnapshot, RequestError> {
    let response = match result {
        Ok(resp) => resp,
        Err(ureq::Error::StatusCode(code)) => return Err(RequestError::Status(code)),
        Err(e) => return Err(RequestError::Transport(e.to_string())),
    };
    if !response.status().is_success() {
        return Err(RequestError::Status(response.status().as_u16()));
    }
    response
        .into_body()
        .read_json::<ApiResponse>()
        .map_err(|e| RequestError::Decode(e.to_string()))?
        .into_snapshot()
}

pub struct HttpBackend {
    agent: ureq::Agent,
    base_url: String,
    id_field: SubmitIdField,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>, timeout: Duration, id_field: SubmitIdField) -> Self {
        Self {
            agent: get_agent(timeout),
            base_url: base_url.into(),
            id_field,
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        info!(
            "Using scoring service at {} (timeout {}s, id field '{}').",
            cfg.api_base_url,
            cfg.request_timeout_secs,
            cfg.submit_id_field.as_str()
        );
        Self::new(
            cfg.api_base_url.clone(),
            Duration::from_secs(cfg.request_timeout_secs),
            cfg.submit_id_field,
        )
    }
}

impl Backend for HttpBackend {
    fn fetch_scores(&self, board_id: &str) -> Result<BoardSnapshot, RequestError> {
        let url = scores_url(&self.base_url, board_id);
        debug!("GET {url}");
        read_response(self.agent.get(url.as_str()).call())
    }

    fn add_score(
        &self,
        board_id: &str,
        name: &str,
        score: i64,
    ) -> Result<BoardSnapshot, RequestError> {
        let url = add_score_url(&self.base_url);
        let body = add_score_body(self.id_field, board_id, name, score);
        debug!("POST {url} {body}");
        let result = read_response(self.agent.post(url.as_str()).send_json(&body));
        if let Err(e) = &result {
            warn!("Score submission to '{board_id}' failed: {e}");
        }
        result
    }
}
