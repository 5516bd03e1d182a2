use std::time::Duration;

use reqwest::{Client, Method};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::debug;

use crate::error::PageError;

use super::types::{BrowserOptions, ElementRef, Envelope, ErrorValue, Locator, NewSession, Script};

/// Keystrokes understood by element send-keys.
pub mod keys {
    pub const NULL: char = '\u{E000}';
    pub const BACKSPACE: char = '\u{E003}';
    pub const CONTROL: char = '\u{E009}';

    /// Ctrl+A, release modifiers, Backspace.
    pub fn select_all_and_delete() -> String {
        [CONTROL, 'a', NULL, BACKSPACE].iter().collect()
    }
}

/// HTTP client for a WebDriver endpoint such as chromedriver.
#[derive(Debug, Clone)]
pub struct WebDriverClient {
    http: Client,
    base_url: String,
}

impl WebDriverClient {
    pub fn new(base_url: &str) -> Result<Self, PageError> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(90))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Opens a browser session. It stays open until [`Session::delete`] is called.
    pub async fn new_session(&self, options: &BrowserOptions) -> Result<Session, PageError> {
        let created: NewSession = self
            .send(Method::POST, "/session", Some(&options.capabilities()))
            .await?;
        debug!(
            session = %created.session_id,
            browser = %created.capabilities["browserName"],
            "opened webdriver session"
        );
        Ok(Session {
            client: self.clone(),
            id: created.session_id,
        })
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&(impl Serialize + ?Sized)>,
    ) -> Result<T, PageError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.request(method, &url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(match serde_json::from_str::<Envelope<ErrorValue>>(&text) {
                Ok(envelope) => PageError::WebDriver {
                    code: envelope.value.error,
                    message: envelope.value.message,
                },
                Err(_) => PageError::UnexpectedResponse(format!("HTTP {status}: {text}")),
            });
        }

        serde_json::from_str::<Envelope<T>>(&text)
            .map(|envelope| envelope.value)
            .map_err(|e| PageError::UnexpectedResponse(format!("{path}: {e}")))
    }
}

/// One live browser session.
#[derive(Debug, Clone)]
pub struct Session {
    client: WebDriverClient,
    id: String,
}

impl Session {
    #[cfg(test)]
    pub fn id(&self) -> &str {
        &self.id
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, PageError> {
        self.client
            .send(Method::GET, &format!("/session/{}{}", self.id, path), None::<&Value>)
            .await
    }

    async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &(impl Serialize + ?Sized),
    ) -> Result<T, PageError> {
        self.client
            .send(Method::POST, &format!("/session/{}{}", self.id, path), Some(body))
            .await
    }

    pub async fn goto(&self, url: &str) -> Result<(), PageError> {
        self.post::<Value>("/url", &json!({ "url": url })).await?;
        Ok(())
    }

    pub async fn back(&self) -> Result<(), PageError> {
        self.post::<Value>("/back", &json!({})).await?;
        Ok(())
    }

    pub async fn current_url(&self) -> Result<String, PageError> {
        self.get("/url").await
    }

    pub async fn find_all(&self, selector: &str) -> Result<Vec<ElementRef>, PageError> {
        self.post("/elements", &Locator::css(selector)).await
    }

    /// First match, or `None` when nothing matches.
    pub async fn find(&self, selector: &str) -> Result<Option<ElementRef>, PageError> {
        Ok(self.find_all(selector).await?.into_iter().next())
    }

    pub async fn click(&self, element: &ElementRef) -> Result<(), PageError> {
        self.post::<Value>(&format!("/element/{}/click", element.id), &json!({}))
            .await?;
        Ok(())
    }

    pub async fn send_keys(&self, element: &ElementRef, text: &str) -> Result<(), PageError> {
        self.post::<Value>(
            &format!("/element/{}/value", element.id),
            &json!({ "text": text }),
        )
        .await?;
        Ok(())
    }

    pub async fn text(&self, element: &ElementRef) -> Result<String, PageError> {
        self.get(&format!("/element/{}/text", element.id)).await
    }

    pub async fn attribute(
        &self,
        element: &ElementRef,
        name: &str,
    ) -> Result<Option<String>, PageError> {
        self.get(&format!("/element/{}/attribute/{name}", element.id))
            .await
    }

    pub async fn property(&self, element: &ElementRef, name: &str) -> Result<Value, PageError> {
        self.get(&format!("/element/{}/property/{name}", element.id))
            .await
    }

    /// Runs a synchronous script; element arguments are passed as references.
    pub async fn execute(&self, script: &str, args: Vec<Value>) -> Result<Value, PageError> {
        self.post("/execute/sync", &Script { script, args }).await
    }

    pub async fn switch_to_frame(&self, frame: &ElementRef) -> Result<(), PageError> {
        self.post::<Value>("/frame", &json!({ "id": frame })).await?;
        Ok(())
    }

    pub async fn switch_to_parent_frame(&self) -> Result<(), PageError> {
        self.post::<Value>("/frame/parent", &json!({})).await?;
        Ok(())
    }

    /// Text of the first element matching `selector`, trimmed.
    pub async fn text_of(&self, selector: &str) -> Result<Option<String>, PageError> {
        match self.find(selector).await? {
            Some(element) => Ok(Some(self.text(&element).await?.trim().to_string())),
            None => Ok(None),
        }
    }

    /// Clicks into a field, clears it with select-all + delete, then types `value`.
    pub async fn overwrite(&self, element: &ElementRef, value: &str) -> Result<(), PageError> {
        self.click(element).await?;
        self.send_keys(element, &keys::select_all_and_delete()).await?;
        self.send_keys(element, value).await
    }

    /// Closes the browser window and ends the session.
    pub async fn delete(&self) -> Result<(), PageError> {
        self.client
            .send::<Value>(Method::DELETE, &format!("/session/{}", self.id), None::<&Value>)
            .await?;
        debug!(session = %self.id, "closed webdriver session");
        Ok(())
    }
}
