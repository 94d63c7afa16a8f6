//! Terminal rendering of status events
//!
//! Each event is written as soon as it arrives so a partial report stays
//! visible when a later step fails.

use console::{Style, style};
use meshstat_core::ReleaseStatus;
use meshstat_kube::status::ConfigRendering;
use meshstat_kube::{Installation, ReleaseDetail, StatusEvent, StatusReporter, WorkloadHealth};
use std::io::Write;

/// Writes the human-readable status report
pub struct TerminalReporter<W: Write> {
    out: W,
    /// Product name used in headers, e.g. "Consul"
    product: String,
}

impl TerminalReporter<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> TerminalReporter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            product: String::new(),
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    // Output is best effort; a closed stdout must not change the exit code
    fn line(&mut self, text: impl std::fmt::Display) {
        let _ = writeln!(self.out, "{}", text);
    }

    fn header(&mut self, chart: &str) {
        self.product = capitalize(chart);
        let title = format!("{} Status Summary", self.product);
        self.line(style(title).bold().underlined());
    }

    fn installation(&mut self, installation: &Installation) {
        self.line(format!("Installation name: {}", style(&installation.name).cyan()));
        self.line(format!("Namespace: {}", style(&installation.namespace).yellow()));
        let found = format!("{} installation found.", self.product);
        self.success(found);
    }

    fn detail(&mut self, detail: &ReleaseDetail) {
        self.line(format!("Chart: {}", detail.chart));

        let status = status_style(&detail.status).apply_to(&detail.status);
        self.line(format!("Status: {}", status));
        self.line(format!("Version: {}", detail.version));

        let deployed = detail
            .last_deployed
            .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "unknown".to_string());
        self.line(format!("Time Deployed: {}", deployed));

        match &detail.config {
            ConfigRendering::Empty => self.line("Config: {}"),
            ConfigRendering::Yaml(yaml) => self.line(format!("Config:\n{}", yaml.trim_end())),
            ConfigRendering::Error(e) => self.line(format!("Config:\n{}", style(e).red())),
        }

        if let Some(hooks) = &detail.hooks {
            self.line("Status Of Helm Hooks:");
            for hook in hooks {
                self.line(hook);
            }
            self.line("");
        }
    }

    fn healthy(&mut self, health: &WorkloadHealth) {
        self.success(health.message());
    }

    fn success(&mut self, message: impl std::fmt::Display) {
        self.line(format!("{} {}", style("✓").green(), message));
    }

    fn error(&mut self, message: impl std::fmt::Display) {
        self.line(format!("{} {}", style("✗").red(), style(message).red()));
    }
}

impl<W: Write> StatusReporter for TerminalReporter<W> {
    fn emit(&mut self, event: StatusEvent) {
        match event {
            StatusEvent::Started { chart } => self.header(&chart),
            StatusEvent::InstallationFound(installation) => self.installation(&installation),
            StatusEvent::ReleaseDetail(detail) => self.detail(&detail),
            StatusEvent::WorkloadHealthy(health) => self.healthy(&health),
            StatusEvent::Failed(err) => self.error(err),
        }
        let _ = self.out.flush();
    }
}

fn status_style(status: &ReleaseStatus) -> Style {
    match status {
        ReleaseStatus::Deployed => Style::new().green(),
        ReleaseStatus::Failed => Style::new().red(),
        s if s.is_pending() => Style::new().yellow(),
        _ => Style::new().dim(),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
