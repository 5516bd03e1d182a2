use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use secrecy::ExposeSecret;
use tracing::{debug, warn};

use crate::error::{BotError, PageError};
use crate::profile::Preferences;
use crate::webdriver::{ElementRef, FormSelectors, Session, WebDriverPage};

use super::{ApplicationSurface, Credentials, JobBoard, JobListing, ListingProbe, Site};

const BASE_URL: &str = "https://www.indeed.com";

const LISTING: &str = ".job_seen_beacon";
const JOB_TITLE: &str = ".jobsearch-JobInfoHeader-title";
const COMPANY: &str = r#"[data-testid="inlineCompanyName"]"#;
const APPLY_BUTTON: &str = ".jobsearch-IndeedApplyButton-newDesign";
const APPLY_FRAME: &str = r#"iframe[id="indeedapply-iframe"]"#;
const EASY_APPLY_FILTER: &str = r#"button[aria-label*="Easy Apply"]"#;
const SUBMIT_BUTTON: &str = r#"button[type="submit"]"#;

const APPLY_SETTLE: Duration = Duration::from_millis(3000);

static JOB_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"jk=([a-zA-Z0-9]+)").expect("valid job key pattern"));

/// Job key from the `jk=` query parameter, empty when absent.
pub fn job_id_from_url(url: &str) -> String {
    JOB_KEY
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

pub fn already_logged_in(url: &str) -> bool {
    url.contains("myaccount")
}

pub fn login_rejected(url: &str) -> bool {
    url.contains("login") || url.contains("auth")
}

pub fn form_selectors() -> FormSelectors {
    FormSelectors {
        next: vec![r#"button[data-testid="next-button"]"#.into()],
        proceed: vec![r#"button[data-testid="continue-button"]"#.into()],
        submit: vec![
            r#"button[data-testid="submit-button"]"#.into(),
            r#"input[type="submit"]"#.into(),
        ],
        ..Default::default()
    }
}

/// Indeed Apply driver.
///
/// The application form usually lives in an iframe; while it is entered the
/// session stays switched into that frame until [`JobBoard::leave_application`].
pub struct IndeedBoard {
    page: WebDriverPage,
    base_url: String,
    pause: Duration,
    apply_settle: Duration,
    listings: Vec<ElementRef>,
    apply_button: Option<ElementRef>,
    in_frame: bool,
}

impl IndeedBoard {
    pub fn new(session: Session, pause: Duration) -> Self {
        Self {
            page: WebDriverPage::new(session, form_selectors()),
            base_url: BASE_URL.to_string(),
            pause,
            apply_settle: APPLY_SETTLE,
            listings: Vec::new(),
            apply_button: None,
            in_frame: false,
        }
    }

    /// Wait after clicking apply, before looking for the application frame.
    pub fn with_apply_settle(mut self, delay: Duration) -> Self {
        self.apply_settle = delay;
        self
    }

    fn session(&self) -> &Session {
        self.page.session()
    }

    async fn pause(&self) {
        tokio::time::sleep(self.pause).await;
    }

    async fn type_into(&self, selector: &str, value: &str) -> Result<(), BotError> {
        match self.session().find(selector).await? {
            Some(input) => Ok(self.session().overwrite(&input, value).await?),
            None => {
                debug!(selector, "input not found");
                Ok(())
            }
        }
    }

    async fn click_submit(&self) -> Result<(), BotError> {
        if let Some(button) = self.session().find(SUBMIT_BUTTON).await? {
            self.session().click(&button).await?;
        }
        self.pause().await;
        Ok(())
    }

    async fn apply_easy_apply_filter(&self) -> Result<(), PageError> {
        let Some(filter) = self.session().find(EASY_APPLY_FILTER).await? else {
            return Ok(());
        };
        self.session().click(&filter).await?;
        self.pause().await;
        Ok(())
    }
}

impl JobBoard for IndeedBoard {
    type Page = WebDriverPage;

    fn site(&self) -> Site {
        Site::Indeed
    }

    async fn login(&mut self, credentials: &Credentials) -> Result<(), BotError> {
        let session = self.session();
        session.goto(&format!("{}/account/login", self.base_url)).await?;
        self.pause().await;

        if already_logged_in(&session.current_url().await?) {
            debug!("indeed session already logged in");
            return Ok(());
        }

        self.type_into(r#"input[type="email"]"#, &credentials.email).await?;
        self.click_submit().await?;
        self.type_into(r#"input[type="password"]"#, credentials.password.expose_secret())
            .await?;
        self.click_submit().await?;

        let url = session.current_url().await?;
        if login_rejected(&url) {
            return Err(BotError::LoginRejected {
                site: Site::Indeed,
                url,
            });
        }
        Ok(())
    }

    async fn search(&mut self, preferences: &Preferences) -> Result<(), BotError> {
        self.session().goto(&format!("{}/", self.base_url)).await?;
        self.pause().await;

        self.type_into("#text-input-what", &preferences.job_title).await?;
        self.type_into("#text-input-where", &preferences.location).await?;
        self.click_submit().await?;

        if let Err(e) = self.apply_easy_apply_filter().await {
            if !e.is_recoverable() {
                return Err(e.into());
            }
            warn!(error = %e, "could not filter by Easy Apply, continuing with all jobs");
        }
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
        let session = self.session();
        session.click(&button).await?;
        tokio::time::sleep(self.apply_settle).await;

        let Some(frame) = session.find(APPLY_FRAME).await? else {
            return Ok(Some(ApplicationSurface::Page));
        };
        session.switch_to_frame(&frame).await?;
        self.in_frame = true;
        Ok(Some(ApplicationSurface::Frame))
    }

    fn form(&mut self) -> &mut WebDriverPage {
        &mut self.page
    }

    async fn leave_application(&mut self) -> Result<(), BotError> {
        if self.in_frame {
            self.in_frame = false;
            self.session().switch_to_parent_frame().await?;
        }
        Ok(())
    }

    async fn current_url(&mut self) -> Result<String, BotError> {
        Ok(self.session().current_url().await?)
    }

    async fn reset(&mut self) -> Result<(), BotError> {
        self.session().back().await?;
        self.pause().await;
        self.listing_count().await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), BotError> {
        Ok(self.session().delete().await?)
    }
}
