//! Job boards and the capabilities the runner needs from them.
//!
//! A [`JobBoard`] logs in, searches, walks the result list, and hands out the
//! application form as a [`FormPage`], either the main document or an
//! embedded frame.

mod indeed;
mod linkedin;

use std::fmt;

use clap::ValueEnum;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::error::BotError;
use crate::profile::Preferences;
use crate::wizard::{FormPage, MatchRule};

pub use indeed::IndeedBoard;
pub use linkedin::LinkedInBoard;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Site {
    #[value(name = "linkedin")]
    LinkedIn,
    Indeed,
}

impl Site {
    pub const ALL: [Site; 2] = [Site::LinkedIn, Site::Indeed];

    /// Environment variables holding the login email and password.
    pub fn credential_vars(&self) -> (&'static str, &'static str) {
        match self {
            Site::LinkedIn => ("LINKEDIN_EMAIL", "LINKEDIN_PASSWORD"),
            Site::Indeed => ("INDEED_EMAIL", "INDEED_PASSWORD"),
        }
    }

    /// Matcher rules placed ahead of the default keyword table on this site.
    pub fn matcher_overrides(&self) -> Vec<MatchRule> {
        let mut rules = vec![
            MatchRule::ignore("company name"),
            MatchRule::ignore("employer name"),
            MatchRule::ignore("school name"),
        ];
        if *self == Site::LinkedIn {
            // Reference contacts on the Easy Apply form share the same keywords.
            rules.push(MatchRule::ignore("reference"));
        }
        rules
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Site::LinkedIn => write!(f, "LinkedIn"),
            Site::Indeed => write!(f, "Indeed"),
        }
    }
}

pub struct Credentials {
    pub email: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: SecretString::from(password.into()),
        }
    }

    /// Reads the site's credentials from the environment.
    pub fn from_env(site: Site) -> Result<Self, BotError> {
        let (email_var, password_var) = site.credential_vars();
        let read = |var: &str| std::env::var(var).ok().filter(|v| !v.trim().is_empty());
        match (read(email_var), read(password_var)) {
            (Some(email), Some(password)) => Ok(Self::new(email, password)),
            _ => Err(BotError::MissingCredentials {
                site,
                email_var,
                password_var,
            }),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[redacted]")
            .finish()
    }
}

/// Identity of the job currently open on the board.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobListing {
    pub job_id: String,
    pub title: String,
    pub company: String,
}

/// What opening a listing revealed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingProbe {
    Ready(JobListing),
    AlreadyApplied(JobListing),
    NoApplyEntry(JobListing),
}

/// Where the application form lives once entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicationSurface {
    Page,
    Frame,
}

pub trait JobBoard {
    type Page: FormPage;

    fn site(&self) -> Site;

    async fn login(&mut self, credentials: &Credentials) -> Result<(), BotError>;

    async fn search(&mut self, preferences: &Preferences) -> Result<(), BotError>;

    /// Number of listings on the current result page.
    async fn listing_count(&mut self) -> Result<usize, BotError>;

    async fn open_listing(&mut self, index: usize) -> Result<ListingProbe, BotError>;

    /// Opens the application of the listing just probed. `None` when no form showed up.
    async fn enter_application(&mut self) -> Result<Option<ApplicationSurface>, BotError>;

    /// The application form, scoped to the surface returned by `enter_application`.
    fn form(&mut self) -> &mut Self::Page;

    /// Returns to the top-level document after an application, whatever its outcome.
    async fn leave_application(&mut self) -> Result<(), BotError>;

    async fn current_url(&mut self) -> Result<String, BotError>;

    /// Puts the board back on the result list so the next listing can be opened.
    async fn reset(&mut self) -> Result<(), BotError>;

    /// Ends the browser session.
    async fn close(&mut self) -> Result<(), BotError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::{FieldDescriptor, FieldIdentity, FieldKind, FieldMatcher, ProfileSlot};

    #[test]
    fn site_display_and_vars() {
        assert_eq!(Site::LinkedIn.to_string(), "LinkedIn");
        assert_eq!(Site::Indeed.to_string(), "Indeed");
        assert_eq!(
            Site::Indeed.credential_vars(),
            ("INDEED_EMAIL", "INDEED_PASSWORD")
        );
    }

    #[test]
    fn overrides_suppress_company_name() {
        let matcher = FieldMatcher::default().with_overrides(Site::Indeed.matcher_overrides());
        let company = FieldDescriptor::new(
            FieldKind::Text,
            &FieldIdentity::with_label("Company name"),
        );
        let name = FieldDescriptor::new(FieldKind::Text, &FieldIdentity::with_label("First name"));
        assert_eq!(matcher.classify(&company), None);
        assert_eq!(matcher.classify(&name), Some(ProfileSlot::Name));
    }

    #[test]
    fn credentials_debug_hides_password() {
        let creds = Credentials::new("jane@x.com", "hunter2");
        let printed = format!("{creds:?}");
        assert!(printed.contains("jane@x.com"));
        assert!(!printed.contains("hunter2"));
    }

    #[test]
    fn site_parses_from_cli_value() {
        assert_eq!(Site::from_str("linkedin", true).unwrap(), Site::LinkedIn);
        assert_eq!(Site::from_str("indeed", true).unwrap(), Site::Indeed);
    }
}
