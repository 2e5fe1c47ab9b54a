use crate::speech::engine::SpeechCommand;
use serde::Serialize;
use std::io::Write;
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Lifecycle of one playback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum PlaybackState {
    Idle,
    Playing,
    Finished,
    Stopped,
    Failed(String),
}

struct Shared {
    state: Mutex<PlaybackState>,
    stop_requested: AtomicBool,
}

impl Shared {
    fn state(&self) -> MutexGuard<'_, PlaybackState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Move out of `Playing`; a state already set by `stop` is left alone.
    fn settle(&self, next: PlaybackState) {
        let mut state = self.state();
        if *state == PlaybackState::Playing {
            *state = next;
        }
    }
}

/// Plays speech on one background worker that owns the engine process.
///
/// Completion is observed by polling [`Player::state`] / [`Player::is_playing`]
/// or by joining with [`Player::wait`].
pub struct Player {
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

impl Player {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(PlaybackState::Idle),
                stop_requested: AtomicBool::new(false),
            }),
            worker: None,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.shared.state().clone()
    }

    pub fn is_playing(&self) -> bool {
        *self.shared.state() == PlaybackState::Playing
    }

    /// Start speaking. Refuses blank text and refuses while already playing.
    pub fn play(&mut self, command: SpeechCommand) -> Result<(), String> {
        if self.is_playing() {
            return Err("playback already in progress".to_owned());
        }
        let has_text = command
            .stdin
            .as_deref()
            .map(|text| !text.trim().is_empty())
            .unwrap_or_else(|| command.args.last().is_some_and(|arg| !arg.trim().is_empty()));
        if !has_text {
            return Err("nothing to read: the document has no text".to_owned());
        }
        if let Some(previous) = self.worker.take() {
            let _ = previous.join();
        }

        let child = Command::new(&command.program)
            .args(&command.args)
            .stdin(if command.stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|error| format!("failed to start '{}': {error}", command.program))?;

        tracing::info!(engine = %command.program, pid = child.id(), "playback started");
        self.shared.stop_requested.store(false, Ordering::SeqCst);
        *self.shared.state() = PlaybackState::Playing;

        let shared = Arc::clone(&self.shared);
        self.worker = Some(thread::spawn(move || run_worker(shared, child, command)));
        Ok(())
    }

    /// Stop the current playback. A no-op when nothing is playing.
    pub fn stop(&self) {
        let mut state = self.shared.state();
        if *state == PlaybackState::Playing {
            self.shared.stop_requested.store(true, Ordering::SeqCst);
            *state = PlaybackState::Stopped;
            tracing::info!("playback stop requested");
        }
    }

    /// Join the worker and return the final state.
    pub fn wait(&mut self) -> PlaybackState {
        if let Some(worker) = self.worker.take()
            && worker.join().is_err()
        {
            self.shared
                .settle(PlaybackState::Failed("playback worker panicked".to_owned()));
        }
        self.state()
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        self.stop();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn run_worker(shared: Arc<Shared>, mut child: Child, command: SpeechCommand) {
    let stdin = child.stdin.take();

    thread::scope(|scope| {
        if let (Some(mut pipe), Some(text)) = (stdin, command.stdin.as_deref()) {
            scope.spawn(move || {
                // The engine closing early (or being killed) surfaces as a broken pipe.
                let _ = pipe.write_all(text.as_bytes());
            });
        }

        loop {
            if shared.stop_requested.load(Ordering::SeqCst) {
                let _ = child.kill();
                let _ = child.wait();
                if let Some(cancel) = &command.cancel {
                    run_cancel(cancel);
                }
                tracing::info!(engine = %command.program, "playback stopped");
                break;
            }

            match child.try_wait() {
                Ok(Some(status)) if status.success() => {
                    tracing::info!(engine = %command.program, "playback finished");
                    shared.settle(PlaybackState::Finished);
                    break;
                }
                Ok(Some(status)) => {
                    tracing::warn!(engine = %command.program, %status, "speech engine failed");
                    shared.settle(PlaybackState::Failed(format!(
                        "'{}' exited with {status}",
                        command.program
                    )));
                    break;
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(error) => {
                    let _ = child.kill();
                    shared.settle(PlaybackState::Failed(format!(
                        "failed to poll '{}': {error}",
                        command.program
                    )));
                    break;
                }
            }
        }
    });
}

fn run_cancel(cancel: &[String]) {
    let Some((program, args)) = cancel.split_first() else {
        return;
    };
    if let Err(error) = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
    {
        tracing::warn!(program = %program, %error, "failed to cancel queued speech");
    }
}
