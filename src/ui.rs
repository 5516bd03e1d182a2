//! Interface de terminal do job-bot: spinners e saída colorida.
//!
//! Usa as crates `indicatif` para spinners de progresso e `console` para
//! estilização com cores. O [`RunProgress`] acompanha visualmente a
//! execução em um site.

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::BotConfig;
use crate::ledger::Ledger;
use crate::runner::SiteReport;
use crate::sites::Site;

/// Quantidade de candidaturas recentes listadas por `status`.
const RECENT_LIMIT: usize = 5;

/// Indicador visual de progresso para a execução de um site.
///
/// Exibe um spinner durante login, busca e candidaturas, e o resumo colorido
/// ao final: verde para enviadas, amarelo para abandonadas, vermelho para falhas.
pub struct RunProgress {
    // Spinner do indicatif.
    pb: ProgressBar,
    green: Style,
    red: Style,
    yellow: Style,
}

impl RunProgress {
    /// Inicia o spinner para o site e retorna a instância de progresso.
    pub fn start(site: Site) -> Self {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(format!("{site}: starting browser session"));
        pb.enable_steady_tick(std::time::Duration::from_millis(100));

        Self {
            pb,
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
            yellow: Style::new().yellow(),
        }
    }

    /// Finaliza o spinner e imprime o resumo do site.
    pub fn complete(&self, report: &SiteReport) {
        self.pb.finish_and_clear();
        println!(
            "  {} {}: {} submitted, {} abandoned, {} skipped, {} failed ({} listings found)",
            self.green.apply_to("✓"),
            report.site,
            self.green.apply_to(report.submitted),
            self.yellow.apply_to(report.abandoned),
            report.skipped,
            self.red.apply_to(report.failed),
            report.listings,
        );
    }

    /// Finaliza o spinner com a falha que interrompeu o site.
    pub fn fail(&self, site: Site, error: &dyn std::fmt::Display) {
        self.pb.finish_and_clear();
        println!("  {} {site}: {error}", self.red.apply_to("✗"));
    }
}

/// Imprime perfil, consentimento e histórico de candidaturas.
pub fn print_status(config: &BotConfig, ledger: &Ledger) {
    let bold = Style::new().bold();
    let green = Style::new().green();
    let yellow = Style::new().yellow();

    println!("{}", bold.apply_to("─── Profile ───"));
    if config.is_initialized() {
        let profile = &config.profile;
        println!("  {} <{}> {}", profile.name, profile.email, profile.phone);
        match &profile.resume_path {
            Some(path) if profile.attachable_resume().is_some() => {
                println!("  resume: {}", path.display())
            }
            Some(path) => println!("  resume: {} {}", path.display(), yellow.apply_to("(missing)")),
            None => println!("  resume: none"),
        }
        let prefs = &config.preferences;
        println!("  searching: {} in {}", prefs.job_title, display_or(&prefs.location, "anywhere"));
    } else {
        println!("  {}", yellow.apply_to("not initialized, run `job-bot init`"));
    }

    let consent = if config.consent {
        green.apply_to("given")
    } else {
        yellow.apply_to("not given")
    };
    println!("  consent: {consent}");
    if let Some(last_run) = config.last_run {
        println!("  last run: {}", last_run.format("%Y-%m-%d %H:%M UTC"));
    }

    println!();
    println!(
        "{}",
        bold.apply_to(format!("─── Applications ({}) ───", ledger.total_applied()))
    );
    for (site, count) in ledger.per_site() {
        println!("  {site}: {count}");
    }
    for app in ledger.recent(RECENT_LIMIT) {
        println!(
            "  {} {} at {} [{}]",
            app.timestamp.format("%Y-%m-%d"),
            app.job_title,
            app.company,
            app.site
        );
    }
}

fn display_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() { fallback } else { value }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_location_reads_anywhere() {
        assert_eq!(display_or("", "anywhere"), "anywhere");
        assert_eq!(display_or("Berlin", "anywhere"), "Berlin");
    }
}
