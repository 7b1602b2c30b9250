use crate::{transport::normalise_base_url, FileStorage, DEFAULT_USER_AGENT};
use std::path::PathBuf;
use url::Url;

/// Where the users API lives when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:80/api/v1/";

/// Everything needed to wire up an [`Auth`](crate::Auth).
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// The API's base URL. Endpoint paths are joined onto it.
    pub base_url: Url,
    pub user_agent: String,
    /// Where the session and credentials are persisted.
    pub state_dir: PathBuf,
}

impl Config {
    pub fn new(base_url: Url) -> Self {
        Config {
            base_url: normalise_base_url(base_url),
            ..Config::default()
        }
    }

    pub fn with_state_dir(mut self, state_dir: impl Into<PathBuf>) -> Self {
        self.state_dir = state_dir.into();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn storage(&self) -> FileStorage { FileStorage::new(&self.state_dir) }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            base_url: Url::parse(DEFAULT_BASE_URL)
                .expect("The default base URL is always valid"),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            state_dir: default_state_dir(),
        }
    }
}

/// The platform's data directory, falling back to the working directory
/// when there's no home directory to speak of.
pub fn default_state_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "picturas")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".picturas"))
}
