//! In-memory application form used by the wizard and runner tests.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::PageError;

use super::field::{FieldIdentity, FieldKind};
use super::page::{Control, FormPage};

#[derive(Debug, Clone)]
pub struct FakeField {
    pub kind: FieldKind,
    pub identity: FieldIdentity,
    pub value: String,
    pub required: bool,
    pub checked: bool,
    pub options: Vec<String>,
    pub selected: Option<usize>,
    pub attached: Option<PathBuf>,
    pub error: Option<&'static str>,
}

impl FakeField {
    fn new(kind: FieldKind, label: &str) -> Self {
        Self {
            kind,
            identity: FieldIdentity::with_label(label),
            value: String::new(),
            required: false,
            checked: false,
            options: Vec::new(),
            selected: None,
            attached: None,
            error: None,
        }
    }

    pub fn text(label: &str) -> Self {
        Self::new(FieldKind::Text, label)
    }

    pub fn email(label: &str) -> Self {
        Self::new(FieldKind::Email, label)
    }

    pub fn tel(label: &str) -> Self {
        Self::new(FieldKind::Tel, label)
    }

    pub fn file(label: &str) -> Self {
        Self::new(FieldKind::File, label)
    }

    pub fn select(label: &str, options: &[&str]) -> Self {
        let mut field = Self::new(FieldKind::Select, label);
        field.options = options.iter().map(|o| o.to_string()).collect();
        field
    }

    pub fn checkbox(label: &str, required: bool) -> Self {
        let mut field = Self::new(FieldKind::Checkbox, label);
        field.required = required;
        field
    }

    pub fn with_value(mut self, value: &str) -> Self {
        self.value = value.to_string();
        self
    }

    /// Every read of this field fails with the given WebDriver error code.
    pub fn failing(mut self, code: &'static str) -> Self {
        self.error = Some(code);
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakeStep {
    pub fields: Vec<FakeField>,
    pub controls: Vec<Control>,
}

impl FakeStep {
    pub fn new(fields: Vec<FakeField>) -> Self {
        Self {
            fields,
            controls: Vec::new(),
        }
    }

    pub fn with_controls(mut self, controls: &[Control]) -> Self {
        self.controls = controls.to_vec();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeHandle {
    Field { step: usize, index: usize },
    Control(Control),
}

/// Next/continue move to the following step; on the last step they stay put.
#[derive(Debug, Default)]
pub struct FakePage {
    steps: Vec<FakeStep>,
    current: usize,
    clicks: Vec<Control>,
    settles: Vec<Duration>,
}

impl FakePage {
    pub fn new(steps: Vec<FakeStep>) -> Self {
        Self {
            steps,
            ..Default::default()
        }
    }

    /// Finds a field by label across all steps.
    pub fn field(&self, label: &str) -> &FakeField {
        self.steps
            .iter()
            .flat_map(|step| step.fields.iter())
            .find(|field| field.identity.label == label)
            .unwrap_or_else(|| panic!("no field labelled {label}"))
    }

    pub fn value_of(&self, label: &str) -> &str {
        &self.field(label).value
    }

    pub fn clicks(&self) -> &[Control] {
        &self.clicks
    }

    pub fn submit_clicks(&self) -> usize {
        self.clicks.iter().filter(|c| **c == Control::Submit).count()
    }

    pub fn settles(&self) -> &[Duration] {
        &self.settles
    }

    fn resolve(&mut self, handle: &FakeHandle) -> Result<&mut FakeField, PageError> {
        let FakeHandle::Field { step, index } = handle else {
            return Err(PageError::UnexpectedResponse("not a field".into()));
        };
        let field = &mut self.steps[*step].fields[*index];
        match field.error {
            Some(code) => Err(PageError::WebDriver {
                code: code.into(),
                message: format!("{} is broken", field.identity.label),
            }),
            None => Ok(field),
        }
    }
}

impl FormPage for FakePage {
    type Handle = FakeHandle;

    async fn fields(&mut self, kind: FieldKind) -> Result<Vec<FakeHandle>, PageError> {
        let step = self.current;
        Ok(self
            .steps
            .get(step)
            .map(|s| {
                s.fields
                    .iter()
                    .enumerate()
                    .filter(|(_, field)| field.kind == kind)
                    .map(|(index, _)| FakeHandle::Field { step, index })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn identity(&mut self, field: &FakeHandle) -> Result<FieldIdentity, PageError> {
        Ok(self.resolve(field)?.identity.clone())
    }

    async fn overwrite_text(&mut self, field: &FakeHandle, value: &str) -> Result<(), PageError> {
        self.resolve(field)?.value = value.to_string();
        Ok(())
    }

    async fn options(&mut self, field: &FakeHandle) -> Result<Vec<String>, PageError> {
        Ok(self.resolve(field)?.options.clone())
    }

    async fn select_option(&mut self, field: &FakeHandle, index: usize) -> Result<(), PageError> {
        self.resolve(field)?.selected = Some(index);
        Ok(())
    }

    async fn is_required(&mut self, field: &FakeHandle) -> Result<bool, PageError> {
        Ok(self.resolve(field)?.required)
    }

    async fn is_checked(&mut self, field: &FakeHandle) -> Result<bool, PageError> {
        Ok(self.resolve(field)?.checked)
    }

    async fn attach_file(&mut self, field: &FakeHandle, path: &Path) -> Result<(), PageError> {
        self.resolve(field)?.attached = Some(path.to_path_buf());
        Ok(())
    }

    async fn find_control(&mut self, control: Control) -> Result<Option<FakeHandle>, PageError> {
        Ok(self
            .steps
            .get(self.current)
            .filter(|step| step.controls.contains(&control))
            .map(|_| FakeHandle::Control(control)))
    }

    async fn click(&mut self, target: &FakeHandle) -> Result<(), PageError> {
        match target {
            FakeHandle::Control(control) => {
                self.clicks.push(*control);
                if *control != Control::Submit && self.current + 1 < self.steps.len() {
                    self.current += 1;
                }
            }
            FakeHandle::Field { .. } => {
                let field = self.resolve(target)?;
                field.checked = !field.checked;
            }
        }
        Ok(())
    }

    async fn settle(&mut self, delay: Duration) {
        self.settles.push(delay);
    }
}
