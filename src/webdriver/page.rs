use std::path::Path;
use std::time::Duration;

use serde_json::{Value, json};

use crate::error::PageError;
use crate::wizard::{Control, FieldIdentity, FieldKind, FormPage};

use super::client::Session;
use super::types::ElementRef;

const LABEL_SCRIPT: &str = r#"
const el = arguments[0];
if (!el.id) { return ''; }
const label = document.querySelector('label[for="' + CSS.escape(el.id) + '"]');
return label ? label.textContent.trim() : '';
"#;

const OPTIONS_SCRIPT: &str =
    "return Array.from(arguments[0].options).map(o => (o.textContent || '').trim());";

const SELECT_SCRIPT: &str = r#"
const el = arguments[0];
el.selectedIndex = arguments[1];
el.dispatchEvent(new Event('change', { bubbles: true }));
"#;

/// CSS selectors a site uses for form fields and wizard controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSelectors {
    pub text: String,
    pub email: String,
    pub tel: String,
    pub select: String,
    pub checkbox: String,
    pub file: String,
    /// Candidates per control, tried in order.
    pub next: Vec<String>,
    pub proceed: Vec<String>,
    pub submit: Vec<String>,
}

impl Default for FormSelectors {
    fn default() -> Self {
        Self {
            text: r#"input[type="text"]"#.into(),
            email: r#"input[type="email"]"#.into(),
            tel: r#"input[type="tel"]"#.into(),
            select: "select".into(),
            checkbox: r#"input[type="checkbox"]"#.into(),
            file: r#"input[type="file"]"#.into(),
            next: Vec::new(),
            proceed: Vec::new(),
            submit: Vec::new(),
        }
    }
}

impl FormSelectors {
    pub fn field(&self, kind: FieldKind) -> &str {
        match kind {
            FieldKind::Text => &self.text,
            FieldKind::Email => &self.email,
            FieldKind::Tel => &self.tel,
            FieldKind::Select => &self.select,
            FieldKind::Checkbox => &self.checkbox,
            FieldKind::File => &self.file,
        }
    }

    pub fn control(&self, control: Control) -> &[String] {
        match control {
            Control::Next => &self.next,
            Control::Continue => &self.proceed,
            Control::Submit => &self.submit,
        }
    }
}

/// [`FormPage`] backed by the session's current browsing context.
///
/// The context is whatever frame the session is switched into; callers pick
/// the main document or an application iframe before handing this out.
#[derive(Debug, Clone)]
pub struct WebDriverPage {
    session: Session,
    selectors: FormSelectors,
}

impl WebDriverPage {
    pub fn new(session: Session, selectors: FormSelectors) -> Self {
        Self { session, selectors }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }
}

fn element_arg(element: &ElementRef) -> Value {
    json!(element)
}

impl FormPage for WebDriverPage {
    type Handle = ElementRef;

    async fn fields(&mut self, kind: FieldKind) -> Result<Vec<ElementRef>, PageError> {
        self.session.find_all(self.selectors.field(kind)).await
    }

    async fn identity(&mut self, field: &ElementRef) -> Result<FieldIdentity, PageError> {
        let id = self.session.attribute(field, "id").await?.unwrap_or_default();
        let name = self.session.attribute(field, "name").await?.unwrap_or_default();
        let placeholder = self
            .session
            .attribute(field, "placeholder")
            .await?
            .unwrap_or_default();
        let label = self
            .session
            .execute(LABEL_SCRIPT, vec![element_arg(field)])
            .await?
            .as_str()
            .unwrap_or_default()
            .to_string();
        Ok(FieldIdentity {
            id,
            name,
            placeholder,
            label,
        })
    }

    async fn overwrite_text(&mut self, field: &ElementRef, value: &str) -> Result<(), PageError> {
        self.session.overwrite(field, value).await
    }

    async fn options(&mut self, field: &ElementRef) -> Result<Vec<String>, PageError> {
        let value = self
            .session
            .execute(OPTIONS_SCRIPT, vec![element_arg(field)])
            .await?;
        serde_json::from_value(value)
            .map_err(|e| PageError::UnexpectedResponse(format!("select options: {e}")))
    }

    async fn select_option(&mut self, field: &ElementRef, index: usize) -> Result<(), PageError> {
        self.session
            .execute(SELECT_SCRIPT, vec![element_arg(field), json!(index)])
            .await?;
        Ok(())
    }

    async fn is_required(&mut self, field: &ElementRef) -> Result<bool, PageError> {
        Ok(self
            .session
            .property(field, "required")
            .await?
            .as_bool()
            .unwrap_or(false))
    }

    async fn is_checked(&mut self, field: &ElementRef) -> Result<bool, PageError> {
        Ok(self
            .session
            .property(field, "checked")
            .await?
            .as_bool()
            .unwrap_or(false))
    }

    async fn attach_file(&mut self, field: &ElementRef, path: &Path) -> Result<(), PageError> {
        // File inputs take an absolute path typed as keys.
        let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
        self.session
            .send_keys(field, &absolute.to_string_lossy())
            .await
    }

    async fn find_control(&mut self, control: Control) -> Result<Option<ElementRef>, PageError> {
        for selector in self.selectors.control(control) {
            if let Some(element) = self.session.find(selector).await? {
                return Ok(Some(element));
            }
        }
        Ok(None)
    }

    async fn click(&mut self, target: &ElementRef) -> Result<(), PageError> {
        self.session.click(target).await
    }

    async fn settle(&mut self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }
}
