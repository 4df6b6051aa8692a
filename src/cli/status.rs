//! Terminal output for a run: spinners when interactive, plain lines otherwise.

use super::context::TerminalContext;
use crate::domain::{BatchSummary, ServiceOutcome, ServiceReport, Severity, StatusSink};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

const TICK_STRINGS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", " "];

pub struct TerminalStatus {
    context: TerminalContext,
    show_warnings: bool,
    spinner: Mutex<Option<ProgressBar>>,
}

impl TerminalStatus {
    pub fn new(context: TerminalContext, show_warnings: bool) -> Self {
        Self {
            context,
            show_warnings,
            spinner: Mutex::new(None),
        }
    }

    fn spin(&self, message: String) {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(TICK_STRINGS),
        );
        pb.set_message(message);
        pb.enable_steady_tick(Duration::from_millis(100));

        if let Some(previous) = self.slot().replace(pb) {
            previous.finish_and_clear();
        }
    }

    fn clear_spinner(&self) {
        if let Some(pb) = self.slot().take() {
            pb.finish_and_clear();
        }
    }

    fn update_spinner(&self, message: &str) -> bool {
        match self.slot().as_ref() {
            Some(pb) => {
                pb.set_message(message.to_string());
                true
            }
            None => false,
        }
    }

    /// Current spinner, recovered from a poisoned lock.
    fn slot(&self) -> MutexGuard<'_, Option<ProgressBar>> {
        self.spinner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl StatusSink for TerminalStatus {
    fn notice(&self, message: &str) {
        self.clear_spinner();
        println!("{message}");
    }

    fn service_started(&self, service: &str) {
        let message = format!("Atualizando {service}");
        if self.context.is_interactive() {
            self.spin(message);
        } else {
            println!("⏳ {message}");
        }
    }

    fn service_progress(&self, _service: &str, message: &str) {
        if !self.context.is_interactive() || !self.update_spinner(message) {
            println!("⏳ {message}");
        }
    }

    fn service_finished(&self, report: &ServiceReport) {
        self.clear_spinner();

        let Some(line) = format_report(report, self.show_warnings) else {
            return;
        };

        if report.severity() == Severity::Error {
            eprintln!("{line}");
        } else {
            println!("{line}");
        }
    }

    fn batch_finished(&self, summary: &BatchSummary) {
        self.clear_spinner();
        println!("{}", format_summary(summary, self.show_warnings));
    }
}

/// The line shown for a finished service, `None` when it should stay quiet.
pub fn format_report(report: &ServiceReport, show_warnings: bool) -> Option<String> {
    let service = &report.service;
    let line = match &report.outcome {
        ServiceOutcome::NotRunning if !show_warnings => return None,
        ServiceOutcome::NotRunning => format!("⚠️  {service} não está rodando"),
        ServiceOutcome::UpToDate { .. } => format!("✅ {service} já está atualizado"),
        ServiceOutcome::Unverified { reference } => format!(
            "⚠️  {service}: nenhuma imagem local para {reference} após o pull, atualização não verificada"
        ),
        ServiceOutcome::Updated { from, to } => format!(
            "✅ {service} atualizado ({} → {})",
            from.short(),
            to.short()
        ),
        ServiceOutcome::Failed(err) => format!("❌ {}", err.chain()),
    };
    Some(line)
}

pub fn format_summary(summary: &BatchSummary, show_warnings: bool) -> String {
    let mut parts = vec![
        format!("{} atualizado(s)", summary.updated()),
        format!("{} em dia", summary.up_to_date()),
    ];

    if summary.unverified() > 0 {
        parts.push(format!("{} não verificado(s)", summary.unverified()));
    }
    if show_warnings && summary.not_running() > 0 {
        parts.push(format!("{} parado(s)", summary.not_running()));
    }
    if summary.failed() > 0 {
        parts.push(format!("{} com falha", summary.failed()));
    }

    format!("Resumo: {}", parts.join(", "))
}
