use thiserror::Error;

use crate::sites::Site;

#[derive(Debug, Error)]
pub enum BotError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Profile not initialized. Run `job-bot init` first.")]
    NotInitialized,

    #[error("Consent required. Run `job-bot consent` first.")]
    ConsentRequired,

    #[error("{site} credentials not found. Set {email_var} and {password_var}.")]
    MissingCredentials {
        site: Site,
        email_var: &'static str,
        password_var: &'static str,
    },

    #[error("{site} login failed (landed on {url}). Check credentials or a security checkpoint.")]
    LoginRejected { site: Site, url: String },

    #[error("Page error: {0}")]
    Page(#[from] PageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML write error: {0}")]
    TomlWrite(#[from] toml::ser::Error),
}

/// Failures raised while talking to a live page or frame.
#[derive(Debug, Error)]
pub enum PageError {
    /// Error payload returned by the WebDriver endpoint, e.g. `no such element`.
    #[error("webdriver error `{code}`: {message}")]
    WebDriver { code: String, message: String },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl PageError {
    /// Errors that only affect a single element. The step carries on without it.
    pub fn is_recoverable(&self) -> bool {
        match self {
            PageError::WebDriver { code, .. } => matches!(
                code.as_str(),
                "no such element" | "stale element reference" | "element not interactable"
            ),
            _ => false,
        }
    }
}
