//! Human-readable lifecycle report.
//!
//! # Responsibilities
//! - Render the start, shutdown reason, per-failure and final outcome lines
//! - Optionally decorate them with icons and ANSI colors
//!
//! # Design Decisions
//! - Purely observational: write errors are ignored, nothing here affects the exit code
//! - Styling is opt-in and never applied on Windows consoles

use std::io::{self, Stdout, Write};
use std::time::Duration;

use owo_colors::OwoColorize;

use crate::config::ColorMode;
use crate::lifecycle::error::ShutdownError;
use crate::lifecycle::shutdown::{ShutdownOutcome, ShutdownRecord};
use crate::lifecycle::signals::TerminationReason;

const ICON_START: &str = "🌟";
const ICON_WARN: &str = "⚡️";
const ICON_HOT: &str = "🔥";
const ICON_MAG: &str = "✨";
const ICON_SUCCESS: &str = "🌳";

#[derive(Debug, Clone, Copy)]
enum Tone {
    Notice,
    Failure,
    Success,
}

/// Writes lifecycle status lines to an output stream.
#[derive(Debug)]
pub struct Reporter<W> {
    out: W,
    styled: bool,
}

impl Reporter<Stdout> {
    /// Reporter on standard output, styled according to `color`.
    pub fn stdout(color: ColorMode) -> Self {
        Self::new(io::stdout(), color.styles_stdout())
    }
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, styled: bool) -> Self {
        Self { out, styled }
    }

    pub fn is_styled(&self) -> bool {
        self.styled
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn started(&mut self, deadline: Duration) {
        let text = format!("Application started (timeout {} sec)", deadline.as_secs());
        self.line("", ICON_START, Tone::Notice, &text);
    }

    pub fn shutting_down(&mut self, reason: TerminationReason, deadline: Duration) {
        let secs = deadline.as_secs();
        let (prefix, text) = match reason {
            TerminationReason::Application => (
                "\r",
                format!("Shutting down (application) (timeout {secs} sec)"),
            ),
            TerminationReason::Interrupt => (
                "\r",
                format!("Shutting down (interrupt) (timeout {secs} sec)"),
            ),
            TerminationReason::Terminate => {
                ("", format!("Shutting down (terminate) (timeout {secs} sec)"))
            }
            TerminationReason::Other => ("", format!("Shutting down (timeout {secs} sec)")),
        };
        self.line(prefix, ICON_WARN, Tone::Notice, &text);
    }

    /// Report one failed capability. Successful records are ignored.
    pub fn failure(&mut self, record: &ShutdownRecord) {
        if let Some(text) = failure_message(record) {
            self.line("", ICON_HOT, Tone::Failure, &text);
        }
    }

    pub fn finished(&mut self, outcome: &ShutdownOutcome, deadline: Duration) {
        let secs = deadline.as_secs();
        if outcome.is_success() {
            let text = format!("Application exited successfully (timeout {secs} sec)");
            self.line("", ICON_SUCCESS, Tone::Success, &text);
        } else {
            let text = format!("Application exited with errors (timeout {secs} sec)");
            self.line("", ICON_MAG, Tone::Notice, &text);
        }
    }

    fn line(&mut self, prefix: &str, icon: &str, tone: Tone, text: &str) {
        let result = if self.styled {
            let painted = match tone {
                Tone::Notice => text.yellow().bold().to_string(),
                Tone::Failure => text.red().bold().to_string(),
                Tone::Success => text.green().bold().to_string(),
            };
            writeln!(self.out, "{prefix}{icon} {painted}")
        } else {
            writeln!(self.out, "{prefix}{text}")
        };
        let _ = result.and_then(|()| self.out.flush());
    }
}

/// Text reported for a failed capability, or `None` if it succeeded.
///
/// Self-reported application errors are shown as-is; anything else is
/// prefixed with the capability's name.
pub fn failure_message(record: &ShutdownRecord) -> Option<String> {
    match record.error()? {
        ShutdownError::App(e) => Some(e.message().to_string()),
        other => Some(format!("Shutdown error ({}): {}", record.name, other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::error::AppError;

    fn record(name: &str, result: Result<(), ShutdownError>) -> ShutdownRecord {
        ShutdownRecord {
            position: 0,
            name: name.to_string(),
            result,
            elapsed: Duration::ZERO,
        }
    }

    fn plain() -> Reporter<Vec<u8>> {
        Reporter::new(Vec::new(), false)
    }

    fn output(reporter: Reporter<Vec<u8>>) -> String {
        String::from_utf8(reporter.into_inner()).unwrap()
    }

    #[test]
    fn test_failure_message_variants() {
        let app = record("AppError", Err(AppError::new("cannot bind").into()));
        assert_eq!(failure_message(&app).as_deref(), Some("cannot bind"));

        let generic = record("Ticker", Err(ShutdownError::DeadlineExceeded));
        assert_eq!(
            failure_message(&generic).as_deref(),
            Some("Shutdown error (Ticker): shutdown deadline exceeded")
        );

        assert_eq!(failure_message(&record("Ok", Ok(()))), None);
    }

    #[test]
    fn test_plain_lines() {
        let mut reporter = plain();
        reporter.started(Duration::from_secs(8));
        reporter.shutting_down(TerminationReason::Terminate, Duration::from_secs(8));
        reporter.shutting_down(TerminationReason::Interrupt, Duration::from_secs(8));
        reporter.shutting_down(TerminationReason::Other, Duration::from_secs(8));

        assert_eq!(
            output(reporter),
            "Application started (timeout 8 sec)\n\
             Shutting down (terminate) (timeout 8 sec)\n\
             \rShutting down (interrupt) (timeout 8 sec)\n\
             Shutting down (timeout 8 sec)\n"
        );
    }

    #[test]
    fn test_finished_lines() {
        let mut reporter = plain();
        reporter.finished(&ShutdownOutcome::default(), Duration::from_secs(2));
        assert_eq!(
            output(reporter),
            "Application exited successfully (timeout 2 sec)\n"
        );
    }

    #[test]
    fn test_success_record_is_silent() {
        let mut reporter = plain();
        reporter.failure(&record("Ticker", Ok(())));
        assert!(output(reporter).is_empty());
    }

    #[test]
    fn test_styled_lines_carry_icon_and_ansi() {
        let mut reporter = Reporter::new(Vec::new(), true);
        reporter.failure(&record("Web", Err(ShutdownError::other("reset"))));
        let text = output(reporter);

        assert!(text.starts_with(ICON_HOT));
        assert!(text.contains("\u{1b}["));
        assert!(text.contains("Shutdown error (Web): reset"));
    }
}
