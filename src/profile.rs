//! Applicant profile and job-search preferences.
//!
//! Both are entered through `job-bot init` and persisted in the TOML config.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Values the wizard writes into application forms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    /// Resume attached whenever an application step offers a file input.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_path: Option<PathBuf>,
}

impl Profile {
    pub fn new(name: impl Into<String>, email: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
            resume_path: None,
        }
    }

    pub fn with_resume(mut self, path: impl Into<PathBuf>) -> Self {
        self.resume_path = Some(path.into());
        self
    }

    /// Name and email are required before any run.
    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty() && !self.email.trim().is_empty()
    }

    /// Resume path, only when the file is actually present on disk.
    pub fn attachable_resume(&self) -> Option<&Path> {
        self.resume_path
            .as_deref()
            .filter(|path| path.is_file())
    }
}

/// What to search for on each job board.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub job_title: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub industry: String,
}

impl Preferences {
    pub fn is_complete(&self) -> bool {
        !self.job_title.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_resume_is_not_attachable() {
        let profile = Profile::new("Jane Roe", "jane@x.com", "555-0100")
            .with_resume("/definitely/not/here.pdf");
        assert!(profile.attachable_resume().is_none());
    }

    #[test]
    fn existing_resume_is_attachable() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let profile = Profile::new("Jane Roe", "jane@x.com", "555-0100").with_resume(file.path());
        assert_eq!(profile.attachable_resume(), Some(file.path()));
    }

    #[test]
    fn completeness_requires_name_and_email() {
        assert!(Profile::new("Jane Roe", "jane@x.com", "").is_complete());
        assert!(!Profile::new("  ", "jane@x.com", "555").is_complete());
        assert!(!Preferences::default().is_complete());
    }
}
