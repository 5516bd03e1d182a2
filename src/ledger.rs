//! Append-only record of submitted applications.
//!
//! Stored as `{"totalApplied": n, "applications": [...]}`. `totalApplied` is
//! derived from the list and rewritten on every save.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::BotError;
use crate::sites::{JobListing, Site};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRecord {
    pub job_id: String,
    pub job_title: String,
    pub company: String,
    pub site: String,
    pub url: String,
    pub timestamp: DateTime<Utc>,
}

impl ApplicationRecord {
    pub fn new(listing: &JobListing, site: Site, url: impl Into<String>) -> Self {
        Self {
            job_id: listing.job_id.clone(),
            job_title: listing.title.clone(),
            company: listing.company.clone(),
            site: site.to_string(),
            url: url.into(),
            timestamp: Utc::now(),
        }
    }

    /// Same job: equal non-empty ids, or equal company and title when at
    /// least one of the two is known.
    pub fn same_job(&self, job_id: &str, company: &str, job_title: &str) -> bool {
        let named = !company.is_empty() || !job_title.is_empty();
        (!self.job_id.is_empty() && self.job_id == job_id)
            || (named && self.company == company && self.job_title == job_title)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ledger {
    #[serde(default)]
    total_applied: usize,
    #[serde(default)]
    applications: Vec<ApplicationRecord>,
}

impl Ledger {
    /// Loads the ledger, or an empty one when the file does not exist yet.
    pub fn load(path: &Path) -> Result<Self, BotError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        let mut ledger: Ledger = serde_json::from_str(&contents)?;
        ledger.total_applied = ledger.applications.len();
        Ok(ledger)
    }

    pub fn save(&mut self, path: &Path) -> Result<(), BotError> {
        self.total_applied = self.applications.len();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }

    pub fn contains(&self, listing: &JobListing) -> bool {
        self.applications
            .iter()
            .any(|app| app.same_job(&listing.job_id, &listing.company, &listing.title))
    }

    /// Appends the record unless the job is already present. Returns whether it was stored.
    pub fn record(&mut self, record: ApplicationRecord) -> bool {
        let duplicate = self
            .applications
            .iter()
            .any(|app| app.same_job(&record.job_id, &record.company, &record.job_title));
        if duplicate {
            return false;
        }
        self.applications.push(record);
        self.total_applied = self.applications.len();
        true
    }

    pub fn total_applied(&self) -> usize {
        self.total_applied
    }

    #[cfg(test)]
    pub fn applications(&self) -> &[ApplicationRecord] {
        &self.applications
    }

    /// Application count per site, sorted by site name.
    pub fn per_site(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for app in &self.applications {
            *counts.entry(app.site.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Most recent applications first.
    pub fn recent(&self, limit: usize) -> Vec<&ApplicationRecord> {
        let mut apps: Vec<&ApplicationRecord> = self.applications.iter().collect();
        apps.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        apps.truncate(limit);
        apps
    }
}
