//! Interface de linha de comando do job-bot baseada em clap.
//!
//! Define a struct [`Cli`] com subcomandos [`Command`] (init, consent,
//! revoke, run, status) e flags globais (--config, --verbose).

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::CONFIG_FILE;
use crate::sites::Site;

/// Candidaturas automáticas no LinkedIn Easy Apply e no Indeed Apply.
#[derive(Debug, Parser)]
#[command(name = "job-bot", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Caminho do arquivo de configuração.
    #[arg(long, global = true, default_value = CONFIG_FILE)]
    pub config: PathBuf,

    /// Habilita logs de depuração.
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Grava o perfil do candidato e as preferências de busca.
    Init {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long, default_value = "")]
        phone: String,

        /// Currículo anexado quando o formulário pede um arquivo.
        #[arg(long)]
        resume: Option<PathBuf>,

        /// Cargo pesquisado nos sites.
        #[arg(long)]
        job_title: String,

        #[arg(long, default_value = "")]
        location: String,

        #[arg(long, default_value = "")]
        industry: String,
    },

    /// Autoriza o envio de candidaturas em seu nome.
    Consent,

    /// Revoga o consentimento dado com `consent`.
    Revoke,

    /// Faz login, busca vagas e se candidata.
    Run {
        /// Restringe a execução a um único site.
        #[arg(long, value_enum)]
        site: Option<Site>,

        /// Máximo de vagas visitadas por site.
        #[arg(long)]
        max_applications: Option<usize>,

        /// Limite de passos por formulário.
        #[arg(long)]
        max_steps: Option<u32>,

        /// Endpoint do servidor WebDriver.
        #[arg(long)]
        webdriver_url: Option<String>,

        /// Mostra a janela do navegador.
        #[arg(long, default_value_t = false)]
        headed: bool,
    },

    /// Mostra o perfil, o consentimento e o histórico de candidaturas.
    Status,
}
