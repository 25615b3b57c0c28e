use console::{style, StyledObject};
use scribe_core::{AppViewModel, ConsoleUpdate, JobStatus, LogConsole, LogLineView, Severity};

use super::constants::KEY_HELP;
use super::layout::ConsoleLayout;

pub fn status_label(status: JobStatus) -> StyledObject<&'static str> {
    match status {
        JobStatus::Idle => style("idle").dim(),
        JobStatus::Submitting => style("submitting").cyan(),
        JobStatus::Running => style("running").cyan().bold(),
        JobStatus::Completed => style("completed").green().bold(),
        JobStatus::Failed => style("failed").red().bold(),
    }
}

pub fn log_line(line: &LogLineView) -> String {
    let text = line.text.as_str();
    match line.severity {
        Severity::Error => style(text).red().to_string(),
        Severity::Warning => style(text).yellow().to_string(),
        Severity::Info => style(text).blue().to_string(),
        Severity::Normal => text.to_string(),
    }
}

pub fn status_line(view: &AppViewModel) -> String {
    let job = match view.job_id {
        Some(id) => format!("job #{id}"),
        None => "no job".to_string(),
    };
    let graph = match &view.artifact {
        Some(artifact) => format!("graph rev {}", artifact.revision),
        None => "graph pending".to_string(),
    };
    let mut line = format!(
        "{job} | {} | {} lines | {graph} | polls {}",
        status_label(view.status),
        view.logs.len(),
        view.active_polls
    );
    if view.stalled {
        line.push_str(&format!(
            " | {}",
            style("no log updates, server may be stalled").yellow()
        ));
    }
    line
}

/// Full-screen frame for the interactive console, one string per terminal row.
pub fn frame(view: &AppViewModel, layout: &ConsoleLayout, notice: Option<&str>) -> Vec<String> {
    let mut rows = Vec::with_capacity(layout.viewport_rows() + 3);

    let title = match notice {
        Some(notice) => format!("{}  {notice}", style("scribe").bold()),
        None => style("scribe").bold().to_string(),
    };
    rows.push(title);
    rows.push(status_line(view));

    if view.console_open {
        let visible = layout.visible(view.logs.len());
        let shown = visible.len();
        rows.extend(view.logs[visible].iter().map(log_line));
        rows.extend(std::iter::repeat(String::new()).take(layout.viewport_rows() - shown));
    } else {
        rows.push(style("console hidden, press c to show").dim().to_string());
        rows.extend(std::iter::repeat(String::new()).take(layout.viewport_rows() - 1));
    }

    let follow = if view.pinned_to_bottom {
        "following"
    } else {
        "scrolled, End to follow"
    };
    let visible = layout.visible(view.logs.len());
    let position = if visible.is_empty() {
        format!("0/{}", view.logs.len())
    } else {
        format!("{}-{}/{}", visible.start + 1, visible.end, view.logs.len())
    };
    rows.push(format!("{}  {position} ({follow})", style(KEY_HELP).dim()));
    rows
}

/// Line-oriented output for `--plain` and non-terminal stdout.
#[derive(Debug, Default)]
pub struct PlainPrinter {
    console: LogConsole,
    status: Option<JobStatus>,
    revision: Option<u32>,
    stalled: bool,
}

impl PlainPrinter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines to print for `view`, given everything printed so far.
    pub fn lines(&mut self, view: &AppViewModel) -> Vec<String> {
        let mut out = Vec::new();

        if self.status != Some(view.status) {
            if view.status == JobStatus::Submitting {
                self.console.reset();
            }
            self.status = Some(view.status);
            out.push(format!("-- {}", status_line(view)));
        }

        let texts: Vec<String> = view.logs.iter().map(|line| line.text.clone()).collect();
        match self.console.sync(&texts) {
            ConsoleUpdate::Unchanged => {}
            ConsoleUpdate::Append { from } => out.extend(view.logs[from..].iter().map(log_line)),
            ConsoleUpdate::Reset => {
                out.push(style("-- log restarted").dim().to_string());
                out.extend(view.logs.iter().map(log_line));
            }
        }

        let revision = view.artifact.as_ref().map(|artifact| artifact.revision);
        if revision.is_some() && revision != self.revision {
            out.push(format!("-- {}", status_line(view)));
        }
        self.revision = revision;

        if view.stalled && !self.stalled {
            out.push(format!("-- {}", status_line(view)));
        }
        self.stalled = view.stalled;

        out
    }
}
