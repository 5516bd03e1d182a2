use std::path::PathBuf;

use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use crate::error::BotError;
use crate::ledger::{ApplicationRecord, Ledger};
use crate::profile::{Preferences, Profile};
use crate::sites::{Credentials, JobBoard, ListingProbe, Site};
use crate::wizard::{
    FieldMatcher, FormWalker, PreferredAnswerResolver, SecondOptionResolver, WizardTimings,
};

/// How one listing ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptResult {
    Submitted,
    Abandoned,
    Skipped,
}

/// Per-site tally of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SiteReport {
    pub site: Site,
    pub listings: usize,
    pub submitted: usize,
    pub abandoned: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl SiteReport {
    pub fn new(site: Site) -> Self {
        Self {
            site,
            listings: 0,
            submitted: 0,
            abandoned: 0,
            skipped: 0,
            failed: 0,
        }
    }

    fn tally(&mut self, result: AttemptResult) {
        match result {
            AttemptResult::Submitted => self.submitted += 1,
            AttemptResult::Abandoned => self.abandoned += 1,
            AttemptResult::Skipped => self.skipped += 1,
        }
    }
}

/// Walks the result list of a board and applies to each listing in turn.
pub struct Runner {
    ledger_path: PathBuf,
    timings: WizardTimings,
    preferred_answers: Vec<String>,
    max_applications: usize,
    max_steps: u32,
}

impl Runner {
    pub fn new(ledger_path: impl Into<PathBuf>, timings: WizardTimings) -> Self {
        Self {
            ledger_path: ledger_path.into(),
            timings,
            preferred_answers: Vec::new(),
            max_applications: 5,
            max_steps: 10,
        }
    }

    /// Caps listings visited per site and wizard steps per application.
    pub fn with_limits(mut self, max_applications: usize, max_steps: u32) -> Self {
        self.max_applications = max_applications;
        self.max_steps = max_steps;
        self
    }

    /// Dropdown answers tried before falling back to the second option.
    pub fn with_preferred_answers(mut self, answers: Vec<String>) -> Self {
        self.preferred_answers = answers;
        self
    }

    /// Logs in, searches, and attempts up to `max_applications` listings.
    ///
    /// The browser session is closed whatever happens.
    pub async fn run_board<B: JobBoard>(
        &self,
        board: &mut B,
        profile: &Profile,
        preferences: &Preferences,
        credentials: &Credentials,
    ) -> Result<SiteReport, BotError> {
        let result = self.walk_board(board, profile, preferences, credentials).await;
        if let Err(e) = board.close().await {
            warn!(site = %board.site(), error = %e, "failed to close browser session");
        }
        result
    }

    async fn walk_board<B: JobBoard>(
        &self,
        board: &mut B,
        profile: &Profile,
        preferences: &Preferences,
        credentials: &Credentials,
    ) -> Result<SiteReport, BotError> {
        let site = board.site();
        let walker = FormWalker::new(
            FieldMatcher::default().with_overrides(site.matcher_overrides()),
            self.timings,
        )
        .with_resolver(PreferredAnswerResolver::new(
            self.preferred_answers.clone(),
            SecondOptionResolver,
        ));
        let mut ledger = Ledger::load(&self.ledger_path)?;
        let mut report = SiteReport::new(site);

        board.login(credentials).await?;
        info!(%site, "logged in");
        board.search(preferences).await?;

        report.listings = board.listing_count().await?;
        if report.listings == 0 {
            info!(%site, "no job listings found");
            return Ok(report);
        }

        for index in 0..report.listings.min(self.max_applications) {
            let span = info_span!("attempt", id = %Uuid::new_v4(), %site, index);
            let result = self
                .attempt(board, &walker, &mut ledger, profile, index)
                .instrument(span.clone())
                .await;

            match result {
                Ok(result) => report.tally(result),
                Err(e) => {
                    warn!(parent: &span, error = %e, "application attempt failed");
                    report.failed += 1;
                }
            }

            if let Err(e) = board.reset().instrument(span.clone()).await {
                warn!(parent: &span, error = %e, "could not return to the result list");
            }
        }

        info!(
            %site,
            submitted = report.submitted,
            abandoned = report.abandoned,
            skipped = report.skipped,
            failed = report.failed,
            "finished site"
        );
        Ok(report)
    }

    async fn attempt<B: JobBoard>(
        &self,
        board: &mut B,
        walker: &FormWalker,
        ledger: &mut Ledger,
        profile: &Profile,
        index: usize,
    ) -> Result<AttemptResult, BotError> {
        let listing = match board.open_listing(index).await? {
            ListingProbe::Ready(listing) => listing,
            ListingProbe::AlreadyApplied(listing) => {
                info!(title = %listing.title, company = %listing.company, "already applied on the board");
                return Ok(AttemptResult::Skipped);
            }
            ListingProbe::NoApplyEntry(listing) => {
                info!(title = %listing.title, company = %listing.company, "no apply button");
                return Ok(AttemptResult::Skipped);
            }
        };

        if ledger.contains(&listing) {
            info!(title = %listing.title, company = %listing.company, "already in the ledger");
            return Ok(AttemptResult::Skipped);
        }

        let Some(surface) = board.enter_application().await? else {
            info!(title = %listing.title, "application form did not open");
            return Ok(AttemptResult::Skipped);
        };
        debug!(?surface, "entered application");

        let walked = walker.run_wizard(board.form(), profile, self.max_steps).await;
        let left = board.leave_application().await;
        if let (Err(_), Err(e)) = (&walked, &left) {
            warn!(error = %e, "could not leave the application form");
        }
        let outcome = walked?;
        left?;

        if !outcome.submitted {
            info!(
                title = %listing.title,
                ending = %outcome.ending,
                steps = outcome.steps_used,
                "application abandoned"
            );
            return Ok(AttemptResult::Abandoned);
        }

        let url = board.current_url().await?;
        ledger.record(ApplicationRecord::new(&listing, board.site(), url));
        // The submit click already happened, so a write failure does not undo it.
        if let Err(e) = ledger.save(&self.ledger_path) {
            warn!(error = %e, path = %self.ledger_path.display(), "could not save the ledger");
        }
        info!(
            title = %listing.title,
            company = %listing.company,
            steps = outcome.steps_used,
            "applied"
        );
        Ok(AttemptResult::Submitted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PageError;
    use crate::sites::{ApplicationSurface, JobListing};
    use crate::wizard::Control;
    use crate::wizard::fake::{FakeField, FakePage, FakeStep};

    struct MockListing {
        probe: ListingProbe,
        steps: Vec<FakeStep>,
    }

    #[derive(Default)]
    struct MockBoard {
        listings: Vec<MockListing>,
        reject_login: bool,
        fail_leave: bool,
        page: FakePage,
        opened: Option<usize>,
        entered: usize,
        left: usize,
        resets: usize,
        closed: usize,
    }

    impl MockBoard {
        fn new(listings: Vec<MockListing>) -> Self {
            Self {
                listings,
                ..Default::default()
            }
        }
    }

    impl JobBoard for MockBoard {
        type Page = FakePage;

        fn site(&self) -> Site {
            Site::LinkedIn
        }

        async fn login(&mut self, _credentials: &Credentials) -> Result<(), BotError> {
            if self.reject_login {
                return Err(BotError::LoginRejected {
                    site: Site::LinkedIn,
                    url: "https://www.linkedin.com/checkpoint".into(),
                });
            }
            Ok(())
        }

        async fn search(&mut self, _preferences: &Preferences) -> Result<(), BotError> {
            Ok(())
        }

        async fn listing_count(&mut self) -> Result<usize, BotError> {
            Ok(self.listings.len())
        }

        async fn open_listing(&mut self, index: usize) -> Result<ListingProbe, BotError> {
            self.opened = Some(index);
            Ok(self.listings[index].probe.clone())
        }

        async fn enter_application(&mut self) -> Result<Option<ApplicationSurface>, BotError> {
            let index = self.opened.take().expect("listing opened");
            self.page = FakePage::new(self.listings[index].steps.clone());
            self.entered += 1;
            Ok(Some(ApplicationSurface::Page))
        }

        fn form(&mut self) -> &mut FakePage {
            &mut self.page
        }

        async fn leave_application(&mut self) -> Result<(), BotError> {
            self.left += 1;
            if self.fail_leave {
                return Err(PageError::WebDriver {
                    code: "no such window".into(),
                    message: "window already closed".into(),
                }
                .into());
            }
            Ok(())
        }

        async fn current_url(&mut self) -> Result<String, BotError> {
            Ok("https://www.linkedin.com/jobs/view/1/".into())
        }

        async fn reset(&mut self) -> Result<(), BotError> {
            self.resets += 1;
            Ok(())
        }

        async fn close(&mut self) -> Result<(), BotError> {
            self.closed += 1;
            Ok(())
        }
    }

    fn listing(job_id: &str, company: &str, title: &str) -> JobListing {
        JobListing {
            job_id: job_id.into(),
            title: title.into(),
            company: company.into(),
        }
    }

    fn ready(job_id: &str, steps: Vec<FakeStep>) -> MockListing {
        MockListing {
            probe: ListingProbe::Ready(listing(job_id, "Acme", &format!("Engineer {job_id}"))),
            steps,
        }
    }

    fn one_step_submit() -> Vec<FakeStep> {
        vec![
            FakeStep::new(vec![FakeField::text("Full name"), FakeField::email("Email")])
                .with_controls(&[Control::Submit]),
        ]
    }

    fn stuck() -> Vec<FakeStep> {
        vec![FakeStep::new(vec![FakeField::text("Full name")])]
    }

    fn profile() -> Profile {
        Profile::new("Jane Roe", "jane@x.com", "555-0100")
    }

    fn runner(dir: &tempfile::TempDir) -> Runner {
        Runner::new(dir.path().join("applications.json"), WizardTimings::instant())
    }

    async fn run(runner: &Runner, board: &mut MockBoard) -> Result<SiteReport, BotError> {
        runner
            .run_board(
                board,
                &profile(),
                &Preferences::default(),
                &Credentials::new("jane@x.com", "secret"),
            )
            .await
    }

    #[tokio::test]
    async fn submits_abandons_and_skips() {
        let dir = tempfile::tempdir().unwrap();
        let runner = runner(&dir);
        let mut board = MockBoard::new(vec![
            ready("1", one_step_submit()),
            MockListing {
                probe: ListingProbe::AlreadyApplied(listing("2", "Globex", "Analyst")),
                steps: Vec::new(),
            },
            ready("3", stuck()),
            MockListing {
                probe: ListingProbe::NoApplyEntry(listing("4", "Initech", "Tester")),
                steps: Vec::new(),
            },
        ]);

        let report = run(&runner, &mut board).await.unwrap();

        assert_eq!(report.listings, 4);
        assert_eq!(report.submitted, 1);
        assert_eq!(report.abandoned, 1);
        assert_eq!(report.skipped, 2);
        assert_eq!(report.failed, 0);
        assert_eq!(board.entered, 2);
        assert_eq!(board.left, 2);
        assert_eq!(board.resets, 4);
        assert_eq!(board.closed, 1);

        let ledger = Ledger::load(&dir.path().join("applications.json")).unwrap();
        assert_eq!(ledger.total_applied(), 1);
        let record = &ledger.applications()[0];
        assert_eq!(record.job_id, "1");
        assert_eq!(record.site, "LinkedIn");
        assert_eq!(record.url, "https://www.linkedin.com/jobs/view/1/");
    }

    #[tokio::test]
    async fn ledger_entries_are_not_reapplied() {
        let dir = tempfile::tempdir().unwrap();
        let runner = runner(&dir);
        let path = dir.path().join("applications.json");
        let mut ledger = Ledger::default();
        ledger.record(ApplicationRecord::new(
            &listing("1", "Acme", "Engineer 1"),
            Site::LinkedIn,
            "https://www.linkedin.com/jobs/view/1/",
        ));
        ledger.save(&path).unwrap();

        let mut board = MockBoard::new(vec![ready("1", one_step_submit())]);
        let report = run(&runner, &mut board).await.unwrap();

        assert_eq!(report.skipped, 1);
        assert_eq!(board.entered, 0);
        assert_eq!(Ledger::load(&path).unwrap().total_applied(), 1);
    }

    #[tokio::test]
    async fn max_applications_caps_listings_visited() {
        let dir = tempfile::tempdir().unwrap();
        let runner = runner(&dir).with_limits(2, 10);
        let mut board = MockBoard::new(vec![
            ready("1", one_step_submit()),
            ready("2", one_step_submit()),
            ready("3", one_step_submit()),
        ]);

        let report = run(&runner, &mut board).await.unwrap();

        assert_eq!(report.submitted, 2);
        assert_eq!(board.resets, 2);
    }

    #[tokio::test]
    async fn fatal_field_error_fails_attempt_but_leaves_form() {
        let dir = tempfile::tempdir().unwrap();
        let runner = runner(&dir);
        let broken = vec![
            FakeStep::new(vec![FakeField::text("Full name").failing("unknown error")])
                .with_controls(&[Control::Submit]),
        ];
        let mut board = MockBoard::new(vec![ready("1", broken), ready("2", one_step_submit())]);

        let report = run(&runner, &mut board).await.unwrap();

        assert_eq!(report.failed, 1);
        assert_eq!(report.submitted, 1);
        assert_eq!(board.left, 2);
        assert_eq!(board.resets, 2);
    }

    #[tokio::test]
    async fn failed_walk_and_failed_leave_still_reset() {
        let dir = tempfile::tempdir().unwrap();
        let runner = runner(&dir);
        let broken = vec![
            FakeStep::new(vec![FakeField::text("Full name").failing("unknown error")])
                .with_controls(&[Control::Submit]),
        ];
        let mut board = MockBoard::new(vec![ready("1", broken), ready("2", stuck())]);
        board.fail_leave = true;

        let report = run(&runner, &mut board).await.unwrap();

        assert_eq!(report.failed, 2);
        assert_eq!(report.submitted, 0);
        assert_eq!(board.left, 2);
        assert_eq!(board.resets, 2);
        assert_eq!(board.closed, 1);
    }

    #[tokio::test]
    async fn unsaved_ledger_still_counts_submission() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where the ledger's parent directory should be.
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();
        let runner = Runner::new(blocker.join("applications.json"), WizardTimings::instant());
        let mut board = MockBoard::new(vec![ready("1", one_step_submit())]);

        let report = run(&runner, &mut board).await.unwrap();

        assert_eq!(report.submitted, 1);
        assert_eq!(report.failed, 0);
        assert_eq!(board.resets, 1);
    }

    #[tokio::test]
    async fn preferred_answers_reach_the_wizard() {
        let dir = tempfile::tempdir().unwrap();
        let runner = runner(&dir).with_preferred_answers(vec!["Yes".into()]);
        let steps = vec![
            FakeStep::new(vec![FakeField::select(
                "Authorized to work?",
                &["Select an option", "No", "Yes"],
            )])
            .with_controls(&[Control::Submit]),
        ];
        let mut board = MockBoard::new(vec![ready("1", steps)]);

        run(&runner, &mut board).await.unwrap();

        assert_eq!(board.page.field("Authorized to work?").selected, Some(2));
    }

    #[tokio::test]
    async fn rejected_login_still_closes_session() {
        let dir = tempfile::tempdir().unwrap();
        let runner = runner(&dir);
        let mut board = MockBoard::new(vec![ready("1", one_step_submit())]);
        board.reject_login = true;

        let err = run(&runner, &mut board).await.unwrap_err();

        assert!(matches!(err, BotError::LoginRejected { .. }));
        assert_eq!(board.closed, 1);
        assert_eq!(board.entered, 0);
    }

    #[tokio::test]
    async fn empty_result_list_reports_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let runner = runner(&dir);
        let mut board = MockBoard::new(Vec::new());

        let report = run(&runner, &mut board).await.unwrap();

        assert_eq!(report, SiteReport::new(Site::LinkedIn));
        assert_eq!(board.closed, 1);
    }
}
