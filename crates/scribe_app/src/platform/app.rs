use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::mpsc;
use std::thread;

use anyhow::Context;
use console::{Key, Term};
use scribe_core::{
    update, AppState, AppViewModel, Effect, JobId, MonitorConfig, Msg, Notification, Submission,
};
use scribe_engine::{EngineSettings, JobOutputs};
use scribe_logging::{scribe_error, scribe_info, scribe_warn};

use super::effects::EffectRunner;
use super::ui::constants::TICK_INTERVAL;
use super::ui::keys::{map_key, KeyAction};
use super::ui::layout::ConsoleLayout;
use super::ui::render;

/// Everything the main loop receives: core messages (engine results, ticks) and raw keys.
#[derive(Debug)]
pub enum AppEvent {
    Msg(Msg),
    Key(Key),
}

pub struct AppOptions {
    pub engine: EngineSettings,
    pub monitor: MonitorConfig,
    pub output_dir: PathBuf,
    pub interactive: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    Failed,
    Quit,
}

impl Outcome {
    /// Process status: 130 mirrors a shell's Ctrl-C convention for a user quit.
    pub fn code(self) -> u8 {
        match self {
            Outcome::Completed => 0,
            Outcome::Failed => 1,
            Outcome::Quit => 130,
        }
    }

    pub fn exit_code(self) -> ExitCode {
        ExitCode::from(self.code())
    }
}

enum Screen {
    Interactive { term: Term, layout: ConsoleLayout },
    Plain(render::PlainPrinter),
}

pub fn run_app(options: AppOptions, submission: Submission) -> anyhow::Result<Outcome> {
    let (event_tx, event_rx) = mpsc::channel::<AppEvent>();
    let mut runner = EffectRunner::new(options.engine, event_tx.clone())
        .context("failed to start the polling engine")?;

    let screen = if options.interactive {
        let term = Term::stdout();
        let (rows, _) = term.size();
        term.hide_cursor().context("failed to prepare terminal")?;
        spawn_key_reader(term.clone(), event_tx.clone());
        Screen::Interactive {
            term,
            layout: ConsoleLayout::new(rows),
        }
    } else {
        Screen::Plain(render::PlainPrinter::new())
    };

    // Background tick to coalesce redraws.
    let tick_tx = event_tx.clone();
    thread::spawn(move || {
        while tick_tx.send(AppEvent::Msg(Msg::Tick)).is_ok() {
            thread::sleep(TICK_INTERVAL);
        }
    });
    drop(event_tx);

    let mut app = App {
        state: AppState::with_config(options.monitor),
        screen,
        outputs: JobOutputs::new(options.output_dir),
        saved_revision: None,
        notice: None,
        unprinted: Vec::new(),
        needs_render: true,
        outcome: None,
    };

    app.dispatch(&runner, Msg::SubmitRequested(submission));
    for event in &event_rx {
        match event {
            AppEvent::Msg(Msg::Tick) => app.render()?,
            AppEvent::Msg(msg) => app.dispatch(&runner, msg),
            AppEvent::Key(key) => app.handle_key(&runner, &key),
        }
        if app.outcome.is_some() {
            break;
        }
    }

    runner.dispose();
    app.render()?;
    if let Screen::Interactive { term, .. } = &app.screen {
        term.show_cursor().context("failed to restore terminal")?;
    }

    let outcome = app.outcome.unwrap_or(Outcome::Quit);
    scribe_info!("Exiting with {:?}", outcome);
    Ok(outcome)
}

struct App {
    state: AppState,
    screen: Screen,
    outputs: JobOutputs,
    saved_revision: Option<(JobId, u32)>,
    notice: Option<String>,
    unprinted: Vec<String>,
    needs_render: bool,
    outcome: Option<Outcome>,
}

impl App {
    fn dispatch(&mut self, runner: &EffectRunner, msg: Msg) {
        let is_dispose = matches!(msg, Msg::Dispose);
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        self.needs_render |= state.consume_dirty();
        self.state = state;

        for effect in runner.enqueue(effects) {
            self.apply(effect);
        }
        self.save_artifact_if_changed();

        if is_dispose && self.outcome.is_none() {
            self.outcome = Some(Outcome::Quit);
        }
    }

    fn apply(&mut self, effect: Effect) {
        match effect {
            Effect::ScrollConsoleToBottom => {
                if let Screen::Interactive { layout, .. } = &mut self.screen {
                    layout.scroll_to_bottom(self.state.job().logs().len());
                }
            }
            Effect::Notify(Notification::Completed { job_id }) => {
                let notice = match self.outputs.save_transcript(job_id, self.state.job().logs()) {
                    Ok(path) => format!("job #{job_id} completed, console saved to {}", path.display()),
                    Err(err) => {
                        scribe_error!("Failed to save console for job {}: {}", job_id, err);
                        format!("job #{job_id} completed (console not saved: {err})")
                    }
                };
                self.notify(notice);
                self.outcome = Some(Outcome::Completed);
            }
            Effect::Notify(Notification::SubmissionFailed { job_id, message }) => {
                self.notify(format!("job #{job_id} submission failed: {message}"));
                self.outcome = Some(Outcome::Failed);
            }
            Effect::Notify(Notification::Stalled { job_id }) => {
                scribe_warn!("Job {} stalled: no successful log poll for a while", job_id);
                self.notify(format!("job #{job_id}: no log updates, server may be stalled"));
            }
            Effect::Submit { .. } | Effect::StartPolling { .. } | Effect::StopPolling { .. } => {}
        }
    }

    fn handle_key(&mut self, runner: &EffectRunner, key: &Key) {
        let Some(action) = map_key(key) else {
            return;
        };
        match action {
            KeyAction::Quit => return self.dispatch(runner, Msg::Dispose),
            KeyAction::ToggleConsole => return self.dispatch(runner, Msg::ConsoleToggled),
            KeyAction::ScrollToBottom => return self.dispatch(runner, Msg::ScrollToBottomClicked),
            KeyAction::ScrollBy(_) | KeyAction::Page { .. } => {}
        }

        let Screen::Interactive { layout, .. } = &mut self.screen else {
            return;
        };
        let content_rows = self.state.job().logs().len();
        match action {
            KeyAction::ScrollBy(delta) => layout.scroll_by(delta, content_rows),
            KeyAction::Page { down } => layout.page(down, content_rows),
            _ => return,
        }
        let scrolled = layout.scroll_msg(content_rows);
        // Scrolling moves the window even when the pinned flag does not change.
        self.needs_render = true;
        self.dispatch(runner, scrolled);
    }

    fn save_artifact_if_changed(&mut self) {
        let (Some(job_id), Some(artifact)) = (self.state.job().id(), self.state.job().artifact())
        else {
            return;
        };
        let current = (job_id, artifact.revision);
        if self.saved_revision == Some(current) {
            return;
        }
        self.saved_revision = Some(current);
        match self.outputs.save_artifact(job_id, &artifact.html) {
            Ok(path) => {
                scribe_info!("Saved graph revision {} to {:?}", artifact.revision, path);
                let notice = format!("graph rev {} saved to {}", artifact.revision, path.display());
                self.notify(notice);
            }
            Err(err) => {
                scribe_error!("Failed to save graph for job {}: {}", job_id, err);
                self.notify(format!("graph not saved: {err}"));
            }
        }
    }

    fn notify(&mut self, notice: String) {
        self.unprinted.push(notice.clone());
        self.notice = Some(notice);
        self.needs_render = true;
    }

    fn render(&mut self) -> anyhow::Result<()> {
        if !std::mem::take(&mut self.needs_render) {
            return Ok(());
        }
        let view: AppViewModel = self.state.view();
        match &mut self.screen {
            Screen::Interactive { term, layout } => {
                self.unprinted.clear();
                let (rows, _) = term.size();
                layout.resize(rows, view.logs.len());
                let frame = render::frame(&view, layout, self.notice.as_deref());
                term.clear_screen().context("failed to draw console")?;
                term.write_str(&frame.join("\n"))
                    .context("failed to draw console")?;
                term.flush().context("failed to draw console")?;
            }
            Screen::Plain(printer) => {
                let mut stdout = std::io::stdout().lock();
                for line in printer.lines(&view) {
                    writeln!(stdout, "{line}").context("failed to write to stdout")?;
                }
                for notice in self.unprinted.drain(..) {
                    writeln!(stdout, "-- {notice}").context("failed to write to stdout")?;
                }
            }
        }
        Ok(())
    }
}

fn spawn_key_reader(term: Term, tx: mpsc::Sender<AppEvent>) {
    thread::spawn(move || loop {
        match term.read_key() {
            Ok(key) => {
                if tx.send(AppEvent::Key(key)).is_err() {
                    break;
                }
            }
            Err(err) => {
                scribe_warn!("Stopped reading keys: {}", err);
                break;
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Write as _};

    use pretty_assertions::assert_eq;
    use scribe_core::{validate_submission, JobStatus, LogSnapshot};

    use super::*;

    fn sample_submission() -> Submission {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("main.py", zip::write::SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"print('hi')\n").unwrap();
        let archive = writer.finish().unwrap().into_inner();
        validate_submission("code.zip", &archive, "a@b.com").unwrap()
    }

    fn plain_app(output_dir: PathBuf) -> App {
        App {
            state: AppState::default(),
            screen: Screen::Plain(render::PlainPrinter::new()),
            outputs: JobOutputs::new(output_dir),
            saved_revision: None,
            notice: None,
            unprinted: Vec::new(),
            needs_render: true,
            outcome: None,
        }
    }

    #[test]
    fn outcomes_map_to_exit_codes() {
        assert_eq!(Outcome::Completed.code(), 0);
        assert_eq!(Outcome::Failed.code(), 1);
        assert_eq!(Outcome::Quit.code(), 130);
        assert_eq!(
            format!("{:?}", Outcome::Completed.exit_code()),
            format!("{:?}", ExitCode::SUCCESS)
        );
    }

    #[test]
    fn finished_job_completes_and_saves_the_console() {
        let dir = tempfile::tempdir().unwrap();
        let (tx, _rx) = mpsc::channel();
        let settings = EngineSettings {
            base_url: "http://127.0.0.1:9".to_string(),
            ..EngineSettings::default()
        };
        let mut runner = EffectRunner::new(settings, tx).unwrap();
        let mut app = plain_app(dir.path().to_path_buf());

        app.dispatch(&runner, Msg::SubmitRequested(sample_submission()));
        let job_id = app.state.view().job_id.unwrap();
        app.dispatch(&runner, Msg::SubmitSucceeded { job_id });
        assert_eq!(app.outcome, None);

        app.dispatch(
            &runner,
            Msg::LogPolled {
                job_id,
                snapshot: LogSnapshot {
                    logs: vec!["Starting...".to_string(), "Done".to_string()],
                    processing: false,
                },
            },
        );
        runner.dispose();

        assert_eq!(app.outcome, Some(Outcome::Completed));
        assert_eq!(app.state.view().status, JobStatus::Completed);
        let transcript =
            std::fs::read_to_string(dir.path().join(format!("job-{job_id}-console.log"))).unwrap();
        assert_eq!(transcript, "Starting...\nDone\n");
        assert!(app.unprinted.iter().any(|notice| notice.contains("completed")));
    }

    #[test]
    fn quitting_before_completion_reports_quit() {
        let dir = tempfile::tempdir().unwrap();
        let (tx, _rx) = mpsc::channel();
        let mut runner = EffectRunner::new(EngineSettings::default(), tx).unwrap();
        let mut app = plain_app(dir.path().to_path_buf());

        app.dispatch(&runner, Msg::Dispose);
        runner.dispose();

        assert_eq!(app.outcome, Some(Outcome::Quit));
        assert_eq!(app.outcome.map(Outcome::code), Some(130));
    }
}
