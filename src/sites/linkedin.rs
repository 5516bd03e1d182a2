use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use secrecy::ExposeSecret;
use tracing::debug;

use crate::error::BotError;
use crate::profile::Preferences;
use crate::webdriver::{ElementRef, FormSelectors, Session, WebDriverPage};

use super::{ApplicationSurface, Credentials, JobBoard, JobListing, ListingProbe, Site};

const BASE_URL: &str = "https://www.linkedin.com";

const LISTING: &str = ".jobs-search-results__list-item";
const JOB_TITLE: &str = ".jobs-unified-top-card__job-title";
const COMPANY: &str = ".jobs-unified-top-card__company-name";
const APPLY_BUTTON: &str = ".jobs-s-apply button";
const APPLY_BUTTON_LABEL: &str = ".jobs-s-apply button span";
const KEYWORDS_INPUT: &str =
    r#".jobs-search-box__text-input[aria-label="Search by title, skill, or company"]"#;
const LOCATION_INPUT: &str = r#".jobs-search-box__text-input[aria-label="City, state, or zip code"]"#;
const SEARCH_BUTTON: &str = ".jobs-search-box__submit-button";
const MODAL_DISMISS: &str = ".artdeco-modal__dismiss";
const MODAL_CONFIRM_DISCARD: &str = ".artdeco-modal__confirm-dialog-btn";

static JOB_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/view/(\d+)").expect("valid job id pattern"));

/// Job id from a `/jobs/view/<digits>` URL, empty when absent.
pub fn job_id_from_url(url: &str) -> String {
    JOB_ID
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Post-login URLs that mean the login did not go through.
pub fn login_rejected(url: &str) -> bool {
    url.contains("checkpoint") || url.contains("login")
}

/// Selectors of the Easy Apply modal.
pub fn form_selectors() -> FormSelectors {
    FormSelectors {
        next: vec![r#"button[aria-label="Continue to next step"]"#.into()],
        proceed: vec![r#"button[aria-label="Review your application"]"#.into()],
        submit: vec![r#"button[aria-label="Submit application"]"#.into()],
        ..Default::default()
    }
}

/// LinkedIn Easy Apply driver. Applications open in a modal on the main page.
pub struct LinkedInBoard {
    page: WebDriverPage,
    base_url: String,
    pause: Duration,
    listings: Vec<ElementRef>,
    apply_button: Option<ElementRef>,
}

impl LinkedInBoard {
    pub fn new(session: Session, pause: Duration) -> Self {
        Self {
            page: WebDriverPage::new(session, form_selectors()),
            base_url: BASE_URL.to_string(),
            pause,
            listings: Vec::new(),
            apply_button: None,
        }
    }

    fn session(&self) -> &Session {
        self.page.session()
    }

    async fn pause(&self) {
        tokio::time::sleep(self.pause).await;
    }

    async fn fill(&self, selector: &str, value: &str) -> Result<(), BotError> {
        if let Some(input) = self.session().find(selector).await? {
            self.session().overwrite(&input, value).await?;
        } else {
            debug!(selector, "search input not found");
        }
        Ok(())
    }
}

impl JobBoard for LinkedInBoard {
    type Page = WebDriverPage;

    fn site(&self) -> Site {
        Site::LinkedIn
    }

    async fn login(&mut self, credentials: &Credentials) -> Result<(), BotError> {
        let session = self.session();
        session.goto(&format!("{}/login", self.base_url)).await?;
        self.pause().await;

        self.fill("#username", &credentials.email).await?;
        self.fill("#password", credentials.password.expose_secret()).await?;
        if let Some(button) = session.find(".login__form_action_container button").await? {
            session.click(&button).await?;
        }
        self.pause().await;

        let url = session.current_url().await?;
        if login_rejected(&url) {
            return Err(BotError::LoginRejected {
                site: Site::LinkedIn,
                url,
            });
        }
        Ok(())
    }

    async fn search(&mut self, preferences: &Preferences) -> Result<(), BotError> {
        self.session().goto(&format!("{}/jobs/", self.base_url)).await?;
        self.pause().await;

        self.fill(KEYWORDS_INPUT, &preferences.job_title).await?;
        self.fill(LOCATION_INPUT, &preferences.location).await?;
        if let Some(button) = self.session().find(SEARCH_BUTTON).await? {
            self.session().click(&button).await?;
        }
        self.pause().await;
        Ok(())
    }

    async fn listing_count(&mut self) -> Result<usize, BotError> {
        self.listings = self.session().find_all(LISTING).await?;
        Ok(self.listings.len())
    }

    async fn open_listing(&mut self, index: usize) -> Result<ListingProbe, BotError> {
        self.apply_button = None;
        let Some(item) = self.listings.get(index).cloned() else {
            return Ok(ListingProbe::NoApplyEntry(JobListing::default()));
        };
        let session = self.session();
        session.click(&item).await?;
        self.pause().await;

        let listing = JobListing {
            job_id: job_id_from_url(&session.current_url().await?),
            title: session.text_of(JOB_TITLE).await?.unwrap_or_default(),
            company: session.text_of(COMPANY).await?.unwrap_or_default(),
        };

        let applied = session
            .text_of(APPLY_BUTTON_LABEL)
            .await?
            .is_some_and(|label| label.contains("Applied"));
        if applied {
            return Ok(ListingProbe::AlreadyApplied(listing));
        }

        let button = session.find(APPLY_BUTTON).await?;
        if button.is_none() {
            return Ok(ListingProbe::NoApplyEntry(listing));
        }
        self.apply_button = button;
        Ok(ListingProbe::Ready(listing))
    }

    async fn enter_application(&mut self) -> Result<Option<ApplicationSurface>, BotError> {
        let Some(button) = self.apply_button.take() else {
            return Ok(None);
        };
        self.session().click(&button).await?;
        self.pause().await;
        Ok(Some(ApplicationSurface::Page))
    }

    fn form(&mut self) -> &mut WebDriverPage {
        &mut self.page
    }

    async fn leave_application(&mut self) -> Result<(), BotError> {
        Ok(())
    }

    async fn current_url(&mut self) -> Result<String, BotError> {
        Ok(self.session().current_url().await?)
    }

    async fn reset(&mut self) -> Result<(), BotError> {
        let session = self.session();
        if let Some(dismiss) = session.find(MODAL_DISMISS).await? {
            session.click(&dismiss).await?;
            self.pause().await;
            if let Some(confirm) = session.find(MODAL_CONFIRM_DISCARD).await? {
                session.click(&confirm).await?;
                self.pause().await;
            }
        }
        Ok(())
    }

    async fn close(&mut self) -> Result<(), BotError> {
        Ok(self.session().delete().await?)
    }
}
