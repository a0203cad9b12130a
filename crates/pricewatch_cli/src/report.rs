//! Console rendering: per-app progress lines and the final summary.

use std::fmt::Write as _;
use std::io::{self, Write};
use std::sync::Mutex;

use pricewatch_engine::{AppResult, ProgressSink, ScrapeEvent, ScrapeReport};

const SEPARATOR_WIDTH: usize = 50;

pub fn separator() -> String {
    "=".repeat(SEPARATOR_WIDTH)
}

pub fn render_run_header(total: usize) -> String {
    let line = separator();
    format!("\n{line}\nApps to check: {total}\n{line}\n\n")
}

pub fn render_app_started(index: usize, total: usize, name: &str) -> String {
    format!("[{index}/{total}] Checking: {name}... ")
}

pub fn render_app_result(result: &AppResult) -> String {
    match result {
        AppResult::Paid(offer) => format!("\u{2713} {offer}"),
        AppResult::Free => "\u{2713} Free".to_string(),
        AppResult::Failed(reason) => format!("[ERROR] - {reason}"),
    }
}

pub fn render_summary(report: &ScrapeReport) -> String {
    let line = separator();
    let mut out = format!("\n{line}\nRESULTS SUMMARY\n{line}\n\n");

    let _ = writeln!(out, "Paid apps ({}):", report.paid.len());
    push_items(
        &mut out,
        report
            .paid
            .iter()
            .map(|app| format!("{}: {}", app.name, app.price)),
    );

    let _ = writeln!(out, "\nFree apps ({}):", report.free.len());
    push_items(&mut out, report.free.iter().cloned());

    let _ = writeln!(out, "\nFailed apps ({}):", report.failed.len());
    push_items(
        &mut out,
        report
            .failed
            .iter()
            .map(|app| format!("{} ({})", app.name, app.reason)),
    );

    let _ = writeln!(out, "\n{line}");
    out
}

fn push_items(out: &mut String, items: impl Iterator<Item = String>) {
    let mut empty = true;
    for item in items {
        empty = false;
        let _ = writeln!(out, " \u{2022} {item}");
    }
    if empty {
        out.push_str(" (none)\n");
    }
}

/// Prints progress as the run goes: the app name when its fetch starts,
/// the outcome on the same line once it is classified.
pub struct ConsoleProgress<W: Write + Send> {
    out: Mutex<W>,
}

impl ConsoleProgress<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> ConsoleProgress<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        match self.out.into_inner() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<W: Write + Send> ProgressSink for ConsoleProgress<W> {
    fn emit(&self, event: ScrapeEvent) {
        let text = match &event {
            ScrapeEvent::RunStarted { total } => render_run_header(*total),
            ScrapeEvent::AppStarted { index, total, name } => {
                render_app_started(*index, *total, name)
            }
            ScrapeEvent::AppFinished { result, .. } => format!("{}\n", render_app_result(result)),
        };
        let Ok(mut out) = self.out.lock() else {
            return;
        };
        let _ = out.write_all(text.as_bytes());
        let _ = out.flush();
    }
}
