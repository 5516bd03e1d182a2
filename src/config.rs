//! Configuração do job-bot carregada a partir de `job-bot.toml`.
//!
//! A struct [`BotConfig`] guarda o perfil, as preferências de busca, o
//! consentimento e os parâmetros de execução. Valores ausentes no arquivo
//! usam defaults sensíveis. A variável de ambiente `JOB_BOT_WEBDRIVER_URL`
//! tem precedência sobre o arquivo durante `run` (ver [`BotConfig::for_run`]).

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::BotError;
use crate::profile::{Preferences, Profile};
use crate::sites::Site;
use crate::wizard::WizardTimings;

/// Nome padrão do arquivo de configuração, relativo ao diretório atual.
pub const CONFIG_FILE: &str = "job-bot.toml";

/// Variável de ambiente que sobrescreve `webdriver_url`.
pub const WEBDRIVER_URL_ENV: &str = "JOB_BOT_WEBDRIVER_URL";

/// Configuração de nível superior persistida em `job-bot.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotConfig {
    /// Usuário aceitou que o bot envie candidaturas em seu nome.
    #[serde(default)]
    pub consent: bool,

    /// Momento da última execução de `run`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_run: Option<DateTime<Utc>>,

    /// Endpoint do servidor WebDriver (chromedriver).
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Arquivo JSON com o histórico de candidaturas.
    #[serde(default = "default_ledger_path")]
    pub ledger_path: PathBuf,

    /// Máximo de vagas visitadas por site em cada execução.
    #[serde(default = "default_max_applications")]
    pub max_applications: usize,

    /// Sites percorridos por `run`, na ordem.
    #[serde(default = "default_sites")]
    pub sites: Vec<Site>,

    #[serde(default)]
    pub profile: Profile,

    #[serde(default)]
    pub preferences: Preferences,

    #[serde(default)]
    pub wizard: WizardConfig,
}

/// Parâmetros do percurso dos formulários de candidatura.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardConfig {
    /// Limite de passos por candidatura.
    #[serde(default = "default_max_steps")]
    pub max_steps: u32,

    #[serde(default = "default_after_click_ms")]
    pub after_click_ms: u64,

    #[serde(default = "default_after_upload_ms")]
    pub after_upload_ms: u64,

    #[serde(default = "default_after_check_ms")]
    pub after_check_ms: u64,

    #[serde(default = "default_between_steps_ms")]
    pub between_steps_ms: u64,

    /// Espera após login, busca e abertura de vagas.
    #[serde(default = "default_navigation_ms")]
    pub navigation_ms: u64,

    /// Espera após clicar em candidatar, antes de procurar o formulário.
    #[serde(default = "default_apply_open_ms")]
    pub apply_open_ms: u64,

    /// Respostas preferidas em listas de seleção, testadas antes da segunda opção.
    #[serde(default)]
    pub preferred_answers: Vec<String>,
}

// Valor padrão do endpoint: chromedriver local.
fn default_webdriver_url() -> String {
    "http://localhost:9515".to_string()
}

fn default_headless() -> bool {
    true
}

fn default_ledger_path() -> PathBuf {
    PathBuf::from("applications.json")
}

fn default_max_applications() -> usize {
    5
}

fn default_sites() -> Vec<Site> {
    Site::ALL.to_vec()
}

fn default_max_steps() -> u32 {
    10
}

fn default_after_click_ms() -> u64 {
    2000
}

fn default_after_upload_ms() -> u64 {
    2000
}

fn default_after_check_ms() -> u64 {
    500
}

fn default_between_steps_ms() -> u64 {
    1500
}

fn default_navigation_ms() -> u64 {
    2000
}

fn default_apply_open_ms() -> u64 {
    3000
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            consent: false,
            last_run: None,
            webdriver_url: default_webdriver_url(),
            headless: default_headless(),
            ledger_path: default_ledger_path(),
            max_applications: default_max_applications(),
            sites: default_sites(),
            profile: Profile::default(),
            preferences: Preferences::default(),
            wizard: WizardConfig::default(),
        }
    }
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            max_steps: default_max_steps(),
            after_click_ms: default_after_click_ms(),
            after_upload_ms: default_after_upload_ms(),
            after_check_ms: default_after_check_ms(),
            between_steps_ms: default_between_steps_ms(),
            navigation_ms: default_navigation_ms(),
            apply_open_ms: default_apply_open_ms(),
            preferred_answers: Vec::new(),
        }
    }
}

impl WizardConfig {
    pub fn timings(&self) -> WizardTimings {
        WizardTimings {
            after_click: Duration::from_millis(self.after_click_ms),
            after_upload: Duration::from_millis(self.after_upload_ms),
            after_check: Duration::from_millis(self.after_check_ms),
            between_steps: Duration::from_millis(self.between_steps_ms),
        }
    }

    pub fn navigation_pause(&self) -> Duration {
        Duration::from_millis(self.navigation_ms)
    }

    pub fn apply_open_pause(&self) -> Duration {
        Duration::from_millis(self.apply_open_ms)
    }
}

impl BotConfig {
    /// Carrega a configuração de `path`.
    /// Usa valores padrão se o arquivo não existir.
    pub fn load(path: &Path) -> Result<Self, BotError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str::<BotConfig>(&contents)?)
    }

    /// Configuração efetiva de uma execução: a variável de ambiente tem
    /// precedência sobre o arquivo, e a flag da CLI sobre ambos.
    /// O resultado não é gravado de volta.
    pub fn for_run(&self, cli_webdriver_url: Option<String>) -> Self {
        self.clone()
            .with_webdriver_override(std::env::var(WEBDRIVER_URL_ENV).ok())
            .with_webdriver_override(cli_webdriver_url)
    }

    /// Grava a configuração em `path`, criando o diretório pai se preciso.
    pub fn save(&self, path: &Path) -> Result<(), BotError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Substitui o endpoint quando `url` está presente e não é vazia.
    pub fn with_webdriver_override(mut self, url: Option<String>) -> Self {
        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            self.webdriver_url = url;
        }
        self
    }

    /// Perfil e preferências preenchidos via `init`.
    pub fn is_initialized(&self) -> bool {
        self.profile.is_complete() && self.preferences.is_complete()
    }

    /// Pré-condições de `run`: perfil inicializado e consentimento dado.
    pub fn ensure_ready(&self) -> Result<(), BotError> {
        if !self.is_initialized() {
            return Err(BotError::NotInitialized);
        }
        if !self.consent {
            return Err(BotError::ConsentRequired);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn initialized() -> BotConfig {
        BotConfig {
            profile: Profile::new("Jane Roe", "jane@x.com", "555-0100"),
            preferences: Preferences {
                job_title: "Software Engineer".into(),
                location: "Remote".into(),
                industry: String::new(),
            },
            ..Default::default()
        }
    }

    #[test]
    fn default_config_values() {
        let config = BotConfig::default();
        assert_eq!(config.webdriver_url, "http://localhost:9515");
        assert_eq!(config.max_applications, 5);
        assert_eq!(config.ledger_path, PathBuf::from("applications.json"));
        assert_eq!(config.sites, vec![Site::LinkedIn, Site::Indeed]);
        assert_eq!(config.wizard.max_steps, 10);
        assert!(config.headless);
        assert!(!config.consent);
    }

    #[test]
    fn deserialize_partial_toml() {
        let toml_str = r#"
            consent = true
            max_applications = 3
            sites = ["indeed"]

            [profile]
            name = "Jane Roe"
            email = "jane@x.com"

            [wizard]
            max_steps = 4
            preferred_answers = ["Yes"]
        "#;
        let config: BotConfig = toml::from_str(toml_str).unwrap();
        assert!(config.consent);
        assert_eq!(config.max_applications, 3);
        assert_eq!(config.sites, vec![Site::Indeed]);
        assert_eq!(config.profile.name, "Jane Roe");
        assert!(config.profile.phone.is_empty());
        assert_eq!(config.wizard.max_steps, 4);
        assert_eq!(config.wizard.after_click_ms, 2000);
        assert_eq!(config.wizard.preferred_answers, vec!["Yes"]);
        assert_eq!(config.webdriver_url, "http://localhost:9515");
    }

    #[test]
    fn save_then_load_keeps_everything() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);
        let mut config = initialized();
        config.consent = true;
        config.last_run = Some(Utc::now());
        config.profile = config.profile.with_resume("resume.pdf");

        config.save(&path).unwrap();
        let loaded: BotConfig = toml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn load_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = BotConfig::load(&dir.path().join(CONFIG_FILE)).unwrap();
        assert!(!config.is_initialized());
        assert_eq!(config.wizard, WizardConfig::default());
    }

    #[test]
    fn webdriver_override_ignores_blank_values() {
        let config = BotConfig::default().with_webdriver_override(Some("  ".into()));
        assert_eq!(config.webdriver_url, "http://localhost:9515");
        let config = config.with_webdriver_override(Some("http://grid:4444".into()));
        assert_eq!(config.webdriver_url, "http://grid:4444");
    }

    #[test]
    fn cli_flag_wins_for_the_run() {
        let config = BotConfig::default();
        let run = config.for_run(Some("http://grid:4444".into()));
        assert_eq!(run.webdriver_url, "http://grid:4444");
        assert_eq!(config.webdriver_url, "http://localhost:9515");
    }

    #[test]
    fn run_requires_init_then_consent() {
        assert!(matches!(
            BotConfig::default().ensure_ready(),
            Err(BotError::NotInitialized)
        ));
        let mut config = initialized();
        assert!(matches!(config.ensure_ready(), Err(BotError::ConsentRequired)));
        config.consent = true;
        assert!(config.ensure_ready().is_ok());
    }

    #[test]
    fn timings_follow_wizard_table() {
        let wizard = WizardConfig {
            after_check_ms: 0,
            ..Default::default()
        };
        let timings = wizard.timings();
        assert_eq!(timings.after_check, Duration::ZERO);
        assert_eq!(timings.between_steps, Duration::from_millis(1500));
        assert_eq!(wizard.navigation_pause(), Duration::from_secs(2));
        assert_eq!(wizard.apply_open_pause(), Duration::from_secs(3));
    }
}
