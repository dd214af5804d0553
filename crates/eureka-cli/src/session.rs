//! Terminal presentation of a tracking session.

use colored::Colorize;
use eureka_core::{CounterEngine, DomainEvent, ProcRate, SessionCounters, TrackedNames};
use eureka_feed::FeedUpdate;
use tracing::warn;

/// Rates at or above this percentage are shown in green, lower ones in red.
pub const GOOD_RATE_PERCENT: f64 = 50.0;

const RATE_LABEL: &str = "Proc rate:";

/// Counters plus the text rendered for each feed update.
#[derive(Debug, Clone, Default)]
pub struct Session {
    names: TrackedNames,
    engine: CounterEngine,
    color: bool,
}

impl Session {
    pub fn new(names: TrackedNames) -> Self {
        Self {
            engine: CounterEngine::new(names.clone()),
            names,
            color: false,
        }
    }

    /// Colours the proc rate by [`GOOD_RATE_PERCENT`].
    #[must_use]
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Applies one update and returns the lines to print for it.
    pub fn apply(&mut self, update: &FeedUpdate) -> Vec<String> {
        match update {
            FeedUpdate::Status(status) => vec![status.to_string()],
            FeedUpdate::Event(event) => {
                if let Err(err) = self.engine.record(event) {
                    warn!(%err, "ignoring event");
                    return Vec::new();
                }
                vec![self.event_line(event), self.tally_line()]
            }
        }
    }

    pub fn reset(&mut self) {
        self.engine.reset();
    }

    pub const fn snapshot(&self) -> SessionCounters {
        self.engine.snapshot()
    }

    fn event_line(&self, event: &DomainEvent) -> String {
        match event {
            DomainEvent::AbilityUse { name, .. } => format!("[{}] {name}", event.short_time()),
            DomainEvent::StatusGain { .. } => {
                format!("[{}] {} proc!", event.short_time(), self.names.eureka_moment)
            }
        }
    }

    /// One-line running tally.
    pub fn tally_line(&self) -> String {
        let counters = self.snapshot();
        format!(
            "{} {} | {} {} | Total {} | Procs {} | Rate {}",
            self.names.solid_reason,
            counters.solid_reason_count,
            self.names.ageless_words,
            counters.ageless_words_count,
            counters.total_casts(),
            counters.eureka_proc_count,
            self.paint_rate(counters.proc_rate(), counters.proc_rate().to_string()),
        )
    }

    /// Full summary table, one row per line, without a trailing newline.
    pub fn render_summary(&self) -> String {
        let counters = self.snapshot();
        let rows = [
            (
                format!("{} uses:", self.names.solid_reason),
                counters.solid_reason_count.to_string(),
            ),
            (
                format!("{} uses:", self.names.ageless_words),
                counters.ageless_words_count.to_string(),
            ),
            ("Total uses:".to_string(), counters.total_casts().to_string()),
            (
                format!("{} procs:", self.names.eureka_moment),
                counters.eureka_proc_count.to_string(),
            ),
        ];
        let rate = counters.proc_rate();
        let width = rows
            .iter()
            .map(|(label, _)| label.chars().count())
            .fold(RATE_LABEL.len(), usize::max);

        let mut lines: Vec<String> = rows
            .iter()
            .map(|(label, value)| format!("{label:<width$}  {value:>8}"))
            .collect();
        // Pad before painting so escape codes don't count toward the width.
        let rate_text = self.paint_rate(rate, format!("{:>8}", rate.to_string()));
        lines.push(format!("{RATE_LABEL:<width$}  {rate_text}"));
        lines.join("\n")
    }

    fn paint_rate(&self, rate: ProcRate, text: String) -> String {
        match rate.percent() {
            Some(percent) if self.color => {
                if percent >= GOOD_RATE_PERCENT {
                    text.green().to_string()
                } else {
                    text.red().to_string()
                }
            }
            _ => text,
        }
    }
}
