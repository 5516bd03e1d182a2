//! Wire types for the W3C WebDriver protocol.
//!
//! Every response is wrapped in `{"value": ...}`; errors carry
//! `{"value": {"error": ..., "message": ...}}`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Key under which element references are exchanged.
#[cfg(test)]
pub const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Opaque reference to a DOM element within the current browsing context.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementRef {
    #[serde(rename = "element-6066-11e4-a52e-4f735466cecf")]
    pub id: String,
}

#[cfg(test)]
impl ElementRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub value: T,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorValue {
    pub error: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSession {
    pub session_id: String,
    #[serde(default)]
    pub capabilities: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct Locator<'a> {
    pub using: &'static str,
    pub value: &'a str,
}

impl<'a> Locator<'a> {
    pub fn css(selector: &'a str) -> Self {
        Self {
            using: "css selector",
            value: selector,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Script<'a> {
    pub script: &'a str,
    pub args: Vec<Value>,
}

/// Browser capabilities requested when opening a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserOptions {
    pub headless: bool,
    pub window_width: u32,
    pub window_height: u32,
    pub user_agent: Option<String>,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            headless: true,
            window_width: 1280,
            window_height: 800,
            user_agent: None,
        }
    }
}

impl BrowserOptions {
    /// Chrome capabilities payload for `POST /session`.
    pub fn capabilities(&self) -> Value {
        let mut args = vec![
            "--no-sandbox".to_string(),
            "--disable-setuid-sandbox".to_string(),
            "--disable-dev-shm-usage".to_string(),
            format!("--window-size={},{}", self.window_width, self.window_height),
        ];
        if self.headless {
            args.push("--headless=new".to_string());
        }
        if let Some(agent) = &self.user_agent {
            args.push(format!("--user-agent={agent}"));
        }
        serde_json::json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "goog:chromeOptions": { "args": args }
                }
            }
        })
    }
}
