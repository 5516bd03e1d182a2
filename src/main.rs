mod cli;
mod config;
mod error;
mod ledger;
mod profile;
mod runner;
mod sites;
mod ui;
mod webdriver;
mod wizard;

use std::path::Path;

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

use cli::{Cli, Command};
use config::BotConfig;
use error::BotError;
use ledger::Ledger;
use profile::{Preferences, Profile};
use runner::{Runner, SiteReport};
use sites::{Credentials, IndeedBoard, LinkedInBoard, Site};
use ui::RunProgress;
use webdriver::{BrowserOptions, WebDriverClient};

/// Flags of `run` that override the config file for one execution.
struct RunOverrides {
    site: Option<Site>,
    max_applications: Option<usize>,
    max_steps: Option<u32>,
    webdriver_url: Option<String>,
    headed: bool,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "job_bot=debug" } else { "job_bot=info" };
    Registry::default()
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Credentials may live in a local .env file.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = BotConfig::load(&cli.config)?;

    match cli.command {
        Command::Init {
            name,
            email,
            phone,
            resume,
            job_title,
            location,
            industry,
        } => {
            let mut profile = Profile::new(name, email, phone);
            if let Some(resume) = resume {
                if !resume.is_file() {
                    warn!(path = %resume.display(), "resume file not found, it will be skipped until it exists");
                }
                profile = profile.with_resume(resume);
            }
            config.profile = profile;
            config.preferences = Preferences {
                job_title,
                location,
                industry,
            };
            if !config.is_initialized() {
                return Err(BotError::NotInitialized.into());
            }
            config.save(&cli.config)?;
            println!("Profile saved to {}", cli.config.display());
            if !config.consent {
                println!("Run `job-bot consent` to allow applications on your behalf.");
            }
        }
        Command::Consent => {
            config.consent = true;
            config.save(&cli.config)?;
            println!("Consent recorded. `job-bot run` may now submit applications.");
        }
        Command::Revoke => {
            config.consent = false;
            config.save(&cli.config)?;
            println!("Consent revoked.");
        }
        Command::Run {
            site,
            max_applications,
            max_steps,
            webdriver_url,
            headed,
        } => {
            let overrides = RunOverrides {
                site,
                max_applications,
                max_steps,
                webdriver_url,
                headed,
            };
            run(&mut config, &cli.config, overrides).await?;
        }
        Command::Status => {
            let ledger = Ledger::load(&config.ledger_path)?;
            ui::print_status(&config, &ledger);
        }
    }

    Ok(())
}

async fn run(config: &mut BotConfig, config_path: &Path, overrides: RunOverrides) -> Result<()> {
    config.ensure_ready()?;

    let settings = config.for_run(overrides.webdriver_url);
    let sites = match overrides.site {
        Some(site) => vec![site],
        None => settings.sites.clone(),
    };
    if sites.is_empty() {
        return Err(BotError::Config("no sites configured".into()).into());
    }

    let runner = Runner::new(&settings.ledger_path, settings.wizard.timings())
        .with_limits(
            overrides.max_applications.unwrap_or(settings.max_applications),
            overrides.max_steps.unwrap_or(settings.wizard.max_steps),
        )
        .with_preferred_answers(settings.wizard.preferred_answers.clone());
    let client = WebDriverClient::new(&settings.webdriver_url)?;
    let browser = BrowserOptions {
        headless: settings.headless && !overrides.headed,
        ..Default::default()
    };

    let mut total = 0;
    for site in sites {
        let credentials = match Credentials::from_env(site) {
            Ok(credentials) => credentials,
            Err(e) => {
                warn!(%site, "{e}");
                continue;
            }
        };

        let progress = RunProgress::start(site);
        match run_site(&client, &browser, &runner, &settings, site, &credentials).await {
            Ok(report) => {
                total += report.submitted;
                progress.complete(&report);
            }
            Err(e) => {
                error!(%site, error = %e, "site run aborted");
                progress.fail(site, &e);
            }
        }
    }

    config.last_run = Some(Utc::now());
    config.save(config_path)?;
    info!(submitted = total, "run finished");
    Ok(())
}

async fn run_site(
    client: &WebDriverClient,
    browser: &BrowserOptions,
    runner: &Runner,
    settings: &BotConfig,
    site: Site,
    credentials: &Credentials,
) -> Result<SiteReport, BotError> {
    let session = client.new_session(browser).await?;
    let pause = settings.wizard.navigation_pause();
    let (profile, preferences) = (&settings.profile, &settings.preferences);
    match site {
        Site::LinkedIn => {
            let mut board = LinkedInBoard::new(session, pause);
            runner.run_board(&mut board, profile, preferences, credentials).await
        }
        Site::Indeed => {
            let mut board = IndeedBoard::new(session, pause)
                .with_apply_settle(settings.wizard.apply_open_pause());
            runner.run_board(&mut board, profile, preferences, credentials).await
        }
    }
}
