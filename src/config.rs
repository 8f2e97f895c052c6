use crate::core::network::{DEFAULT_API_BASE_URL, DEFAULT_REQUEST_TIMEOUT, SubmitIdField};
use crate::game::leaderboard_set::BoardCandidate;
use directories::ProjectDirs;
use ini::Ini;
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Mutex;

const CONFIG_FILE: &str = "highscore.ini";
const OPTIONS: Option<&str> = Some("Options");
const BOARDS: Option<&str> = Some("Boards");
const DEFAULT_BOARD: (&str, &str) = ("my-game", "scoreboard");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    const fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "Off",
            Self::Error => "Error",
            Self::Warn => "Warn",
            Self::Info => "Info",
            Self::Debug => "Debug",
            Self::Trace => "Trace",
        }
    }

    pub const fn as_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Off => log::LevelFilter::Off,
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

impl FromStr for LogLevel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" => Ok(Self::Off),
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub submit_id_field: SubmitIdField,
    pub log_level: LogLevel,
    /// `[Boards]` entries in file order, unchecked.
    pub boards: Vec<BoardCandidate>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT.as_secs(),
            submit_id_field: SubmitIdField::HighscoreId,
            log_level: LogLevel::Warn,
            boards: vec![BoardCandidate::new(DEFAULT_BOARD.0, DEFAULT_BOARD.1)],
        }
    }
}

// Global, mutable configuration instance.
static CONFIG: std::sync::LazyLock<Mutex<Config>> =
    std::sync::LazyLock::new(|| Mutex::new(Config::default()));

// --- File I/O ---

/// `highscore.ini` in the working directory wins; otherwise the platform
/// config directory is used if a file exists there.
fn config_path() -> PathBuf {
    let local = PathBuf::from(CONFIG_FILE);
    if local.exists() {
        return local;
    }
    if let Some(dirs) = ProjectDirs::from("com", "ssg", "highscore") {
        let platform = dirs.config_dir().join(CONFIG_FILE);
        if platform.exists() {
            return platform;
        }
    }
    local
}

fn default_ini() -> Ini {
    let default = Config::default();
    let mut conf = Ini::new();
    conf.with_section(OPTIONS)
        .set("ApiBaseUrl", default.api_base_url.as_str())
        .set("LogLevel", default.log_level.as_str())
        .set("RequestTimeoutSecs", default.request_timeout_secs.to_string())
        .set("SubmitIdField", default.submit_id_field.as_str());
    let mut boards = conf.with_section(BOARDS);
    for board in &default.boards {
        boards.set(board.board_id.as_str(), board.render_target.as_str());
    }
    conf
}

fn create_default_config_file(path: &Path) -> Result<(), std::io::Error> {
    info!("'{}' not found, creating with default values.", path.display());
    default_ini().write_to_file(path)
}

/// Builds a config from parsed INI data, falling back to the default for
/// every missing or malformed key.
pub fn from_ini(conf: &Ini) -> Config {
    let default = Config::default();

    let api_base_url = conf
        .get_from(OPTIONS, "ApiBaseUrl")
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map_or(default.api_base_url, str::to_string);
    let request_timeout_secs = conf
        .get_from(OPTIONS, "RequestTimeoutSecs")
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default.request_timeout_secs);
    let submit_id_field = conf
        .get_from(OPTIONS, "SubmitIdField")
        .and_then(|v| SubmitIdField::from_str(v).ok())
        .unwrap_or(default.submit_id_field);
    let log_level = conf
        .get_from(OPTIONS, "LogLevel")
        .and_then(|v| LogLevel::from_str(v).ok())
        .unwrap_or(default.log_level);
    let boards = match conf.section(BOARDS) {
        Some(section) => section
            .iter()
            .map(|(id, target)| BoardCandidate::new(id, target))
            .collect(),
        None => {
            warn!("No [Boards] section in config; using the default board.");
            default.boards
        }
    };

    Config {
        api_base_url,
        request_timeout_secs,
        submit_id_field,
        log_level,
        boards,
    }
}

pub fn load() {
    let path = config_path();
    if !path.exists()
        && let Err(e) = create_default_config_file(&path)
    {
        warn!("Failed to create default config file: {e}");
    }

    match Ini::load_from_file(&path) {
        Ok(conf) => {
            let cfg = from_ini(&conf);
            info!(
                "Loaded '{}' with {} board(s).",
                path.display(),
                cfg.boards.len()
            );
            *CONFIG.lock().unwrap() = cfg;
        }
        Err(e) => {
            warn!(
                "Failed to load '{}': {e}. Using default settings.",
                path.display()
            );
        }
    }
}

pub fn get() -> Config {
    CONFIG.lock().unwrap().clone()
}
