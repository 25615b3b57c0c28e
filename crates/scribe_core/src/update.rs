use scribe_logging::{scribe_debug, scribe_info, scribe_trace, scribe_warn};

use crate::scroll::ScrollCommand;
use crate::{
    AppState, ArtifactPoll, Effect, JobId, LogSnapshot, Msg, Notification, PollChannel, PollHandle,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::SubmitRequested(submission) => {
            let (job_id, released) = state.begin_submission();
            scribe_info!(
                "Submitting job {} file={} bytes={}",
                job_id,
                submission.file_name(),
                submission.archive().len()
            );
            // Previous timers must be stopped before anything for the new job starts.
            let mut effects = stop_effects(released);
            effects.push(Effect::Submit { job_id, submission });
            effects
        }
        Msg::SubmitSucceeded { job_id } => match state.mark_running(job_id) {
            Some(handles) => {
                scribe_info!("Job {} accepted, polling started", job_id);
                handles
                    .into_iter()
                    .map(|handle| Effect::StartPolling {
                        job_id: handle.job_id,
                        channel: handle.channel,
                    })
                    .collect()
            }
            None => {
                scribe_trace!("Ignoring stale submit success for job {}", job_id);
                Vec::new()
            }
        },
        Msg::SubmitFailed { job_id, message } => {
            if state.mark_failed(job_id) {
                scribe_warn!("Job {} submission failed: {}", job_id, message);
                vec![Effect::Notify(Notification::SubmissionFailed { job_id, message })]
            } else {
                scribe_trace!("Ignoring stale submit failure for job {}", job_id);
                Vec::new()
            }
        }
        Msg::LogPolled { job_id, snapshot } => apply_log_snapshot(&mut state, job_id, snapshot),
        Msg::LogPollFailed { job_id, message } => {
            if !state.accepts_poll(job_id, PollChannel::Log) {
                return (state, Vec::new());
            }
            scribe_debug!("Log poll for job {} failed: {}", job_id, message);
            log_tick_failed(&mut state, job_id)
        }
        Msg::ArtifactPolled { job_id, poll } => {
            if !state.accepts_poll(job_id, PollChannel::Artifact) {
                scribe_trace!("Ignoring stale artifact poll for job {}", job_id);
                return (state, Vec::new());
            }
            match poll {
                ArtifactPoll::Ready(html) => {
                    if state.set_artifact(html) {
                        scribe_info!("Artifact updated for job {}", job_id);
                    }
                }
                ArtifactPoll::NotReady => {
                    scribe_trace!("Artifact for job {} not ready yet", job_id);
                }
            }
            Vec::new()
        }
        Msg::ArtifactPollFailed { job_id, message } => {
            scribe_debug!("Artifact poll for job {} failed: {}", job_id, message);
            Vec::new()
        }
        Msg::ConsoleScrolled {
            viewport_height,
            content_height,
            scroll_offset,
        } => {
            state.on_scroll(viewport_height, content_height, scroll_offset);
            Vec::new()
        }
        Msg::ScrollToBottomClicked => scroll_effects(state.force_pin()),
        Msg::ConsoleToggled => {
            state.toggle_console();
            Vec::new()
        }
        Msg::Dispose => {
            let released = state.release_all_polls();
            if !released.is_empty() {
                scribe_info!("Disposing monitor, stopping {} poll(s)", released.len());
            }
            stop_effects(released)
        }
        Msg::Tick => Vec::new(),
    };

    (state, effects)
}

fn apply_log_snapshot(state: &mut AppState, job_id: JobId, snapshot: LogSnapshot) -> Vec<Effect> {
    if !state.accepts_poll(job_id, PollChannel::Log) {
        scribe_trace!("Ignoring stale log snapshot for job {}", job_id);
        return Vec::new();
    }

    // The log only ever grows within a job; a shorter snapshot is an outdated
    // response. Its lines are dropped but its completion flag still counts.
    if snapshot.logs.len() < state.logs_len() {
        scribe_debug!(
            "Job {} log snapshot shrank from {} to {} lines, keeping current log",
            job_id,
            state.logs_len(),
            snapshot.logs.len()
        );
        if snapshot.processing {
            return log_tick_failed(state, job_id);
        }
        return complete_job(state, job_id, Vec::new());
    }

    state.clear_log_failures();
    let mut effects = Vec::new();
    if state.replace_logs(snapshot.logs) {
        effects.extend(scroll_effects(state.on_content_grew()));
    }

    if !snapshot.processing {
        return complete_job(state, job_id, effects);
    }
    effects
}

fn complete_job(state: &mut AppState, job_id: JobId, mut effects: Vec<Effect>) -> Vec<Effect> {
    let released = state.complete();
    scribe_info!(
        "Job {} completed with {} log line(s)",
        job_id,
        state.logs_len()
    );
    effects.extend(stop_effects(released));
    effects.push(Effect::Notify(Notification::Completed { job_id }));
    effects
}

fn log_tick_failed(state: &mut AppState, job_id: JobId) -> Vec<Effect> {
    if state.record_log_failure() {
        scribe_warn!("Job {} looks stalled: log polls keep failing", job_id);
        vec![Effect::Notify(Notification::Stalled { job_id })]
    } else {
        Vec::new()
    }
}

fn stop_effects(handles: Vec<PollHandle>) -> Vec<Effect> {
    handles
        .into_iter()
        .map(|handle| Effect::StopPolling {
            job_id: handle.job_id,
            channel: handle.channel,
        })
        .collect()
}

fn scroll_effects(command: ScrollCommand) -> Vec<Effect> {
    match command {
        ScrollCommand::ScrollToBottom => vec![Effect::ScrollConsoleToBottom],
        ScrollCommand::Stay => Vec::new(),
    }
}
