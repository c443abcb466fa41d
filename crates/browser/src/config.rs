use std::path::PathBuf;
use std::time::Duration;

use crate::error::BrowserError;
use crate::viewport::Viewport;

/// User agent presented by every session unless overridden.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Default base URL of the hosted browser session API.
pub const DEFAULT_HOSTED_API_URL: &str = "https://api.browserbase.com";

/// Where sessions come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowserMode {
    /// Launch a Chromium process on this machine.
    Local {
        /// Explicit Chrome binary; auto-detected when `None`.
        executable: Option<PathBuf>,
        headless: bool,
    },
    /// Attach to a browser running elsewhere.
    Remote(RemoteEndpoint),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteEndpoint {
    /// A DevTools WebSocket URL to connect to directly.
    Direct { ws_url: String },
    /// A hosted provider; a session is created per attempt via its REST API.
    Hosted {
        api_url: String,
        api_key: String,
        project_id: String,
    },
}

/// Browser settings loaded from environment variables.
#[derive(Debug, Clone)]
pub struct BrowserSettings {
    pub mode: BrowserMode,
    pub user_agent: String,
    /// Viewport the context is created with.
    pub default_viewport: Viewport,
    /// Hard upper bound on navigation, including the quiescence wait.
    pub navigation_timeout: Duration,
    /// The network counts as quiet after this long without a new request.
    pub network_idle: Duration,
    /// Pause after quiescence so deferred scripts finish mutating the DOM.
    pub settle_delay: Duration,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            mode: BrowserMode::Local {
                executable: None,
                headless: true,
            },
            user_agent: DEFAULT_USER_AGENT.to_string(),
            default_viewport: Viewport::desktop(),
            navigation_timeout: Duration::from_secs(30),
            network_idle: Duration::from_millis(500),
            settle_delay: Duration::from_secs(2),
        }
    }
}

impl BrowserSettings {
    /// Load settings from the process environment.
    ///
    /// | Env Var                   | Default                        |
    /// |---------------------------|--------------------------------|
    /// | `BROWSER_MODE`            | `local` (`local` or `remote`)  |
    /// | `BROWSER_HEADLESS`        | `true`                         |
    /// | `CHROME_EXECUTABLE`       | auto-detect                    |
    /// | `BROWSER_WS_ENDPOINT`     | -                              |
    /// | `BROWSERBASE_API_KEY`     | -                              |
    /// | `BROWSERBASE_PROJECT_ID`  | -                              |
    /// | `BROWSERBASE_API_URL`     | `https://api.browserbase.com`  |
    /// | `BROWSER_USER_AGENT`      | desktop Chrome                 |
    /// | `NAVIGATION_TIMEOUT_SECS` | `30`                           |
    pub fn from_env() -> Result<Self, BrowserError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, BrowserError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let mode = match var("BROWSER_MODE").as_deref().unwrap_or("local") {
            "local" => BrowserMode::Local {
                executable: var("CHROME_EXECUTABLE").map(PathBuf::from),
                headless: parse_bool(var("BROWSER_HEADLESS").as_deref(), "BROWSER_HEADLESS")?
                    .unwrap_or(true),
            },
            "remote" => {
                let endpoint = if let Some(ws_url) = var("BROWSER_WS_ENDPOINT") {
                    RemoteEndpoint::Direct { ws_url }
                } else {
                    match (var("BROWSERBASE_API_KEY"), var("BROWSERBASE_PROJECT_ID")) {
                        (Some(api_key), Some(project_id)) => RemoteEndpoint::Hosted {
                            api_url: var("BROWSERBASE_API_URL")
                                .unwrap_or_else(|| DEFAULT_HOSTED_API_URL.to_string()),
                            api_key,
                            project_id,
                        },
                        _ => {
                            return Err(BrowserError::Config(
                                "remote mode requires BROWSER_WS_ENDPOINT or both \
                                 BROWSERBASE_API_KEY and BROWSERBASE_PROJECT_ID"
                                    .to_string(),
                            ))
                        }
                    }
                };
                BrowserMode::Remote(endpoint)
            }
            other => {
                return Err(BrowserError::Config(format!(
                    "BROWSER_MODE must be 'local' or 'remote', got '{other}'"
                )))
            }
        };

        let navigation_timeout = match var("NAVIGATION_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(raw.parse().map_err(|_| {
                BrowserError::Config(format!("NAVIGATION_TIMEOUT_SECS must be a valid u64, got '{raw}'"))
            })?),
            None => defaults.navigation_timeout,
        };

        Ok(Self {
            mode,
            user_agent: var("BROWSER_USER_AGENT").unwrap_or(defaults.user_agent),
            navigation_timeout,
            ..defaults
        })
    }
}

fn parse_bool(raw: Option<&str>, key: &str) -> Result<Option<bool>, BrowserError> {
    match raw {
        None => Ok(None),
        Some("1") | Some("true") | Some("yes") => Ok(Some(true)),
        Some("0") | Some("false") | Some("no") => Ok(Some(false)),
        Some(other) => Err(BrowserError::Config(format!(
            "{key} must be a boolean, got '{other}'"
        ))),
    }
}
