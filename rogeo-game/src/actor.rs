//! Tokio task owning a [`GameLoop`].
//!
//! Hosts with several tasks talk to the game through a [`SessionHandle`];
//! the actor applies commands one at a time and sleeps until the loop's next
//! deadline in between, feeding real elapsed time into
//! [`GameLoop::advance`].

use std::time::Duration;

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;

use crate::clock::GameLoop;
use crate::result::GameSummary;
use crate::session::{GameSnapshot, Transition};
use crate::settings::Settings;

const COMMAND_QUEUE: usize = 32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ActorError {
    #[error("game session task has shut down")]
    Closed,
}

#[derive(Debug)]
enum Cmd {
    Guess(String, oneshot::Sender<Transition>),
    SelectOption(String, oneshot::Sender<Transition>),
    Skip(oneshot::Sender<Transition>),
    Restart(oneshot::Sender<Transition>),
    ApplySettings(Settings, oneshot::Sender<()>),
    Snapshot(oneshot::Sender<GameSnapshot>),
    Suggest(String, oneshot::Sender<Vec<String>>),
    TakeEvents(oneshot::Sender<Vec<Transition>>),
    Shutdown(oneshot::Sender<GameSummary>),
}

/// Cloneable front door to a running session actor.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<Cmd>,
}

/// Move `game` onto its own task.
///
/// Must be called from within a tokio runtime.
#[must_use]
pub fn spawn_session(game: GameLoop) -> SessionHandle {
    let (tx, rx) = mpsc::channel(COMMAND_QUEUE);
    tokio::spawn(run(game, rx));
    SessionHandle { tx }
}

impl SessionHandle {
    /// # Errors
    ///
    /// Returns [`ActorError::Closed`] if the actor is gone.
    pub async fn submit_guess(&self, text: impl Into<String>) -> Result<Transition, ActorError> {
        let text = text.into();
        self.request(|reply| Cmd::Guess(text, reply)).await
    }

    /// # Errors
    ///
    /// Returns [`ActorError::Closed`] if the actor is gone.
    pub async fn select_option(&self, label: impl Into<String>) -> Result<Transition, ActorError> {
        let label = label.into();
        self.request(|reply| Cmd::SelectOption(label, reply)).await
    }

    /// # Errors
    ///
    /// Returns [`ActorError::Closed`] if the actor is gone.
    pub async fn skip(&self) -> Result<Transition, ActorError> {
        self.request(Cmd::Skip).await
    }

    /// # Errors
    ///
    /// Returns [`ActorError::Closed`] if the actor is gone.
    pub async fn restart(&self) -> Result<Transition, ActorError> {
        self.request(Cmd::Restart).await
    }

    /// # Errors
    ///
    /// Returns [`ActorError::Closed`] if the actor is gone.
    pub async fn apply_settings(&self, settings: Settings) -> Result<(), ActorError> {
        self.request(|reply| Cmd::ApplySettings(settings, reply)).await
    }

    /// # Errors
    ///
    /// Returns [`ActorError::Closed`] if the actor is gone.
    pub async fn snapshot(&self) -> Result<GameSnapshot, ActorError> {
        self.request(Cmd::Snapshot).await
    }

    /// # Errors
    ///
    /// Returns [`ActorError::Closed`] if the actor is gone.
    pub async fn suggestions(&self, query: impl Into<String>) -> Result<Vec<String>, ActorError> {
        let query = query.into();
        self.request(|reply| Cmd::Suggest(query, reply)).await
    }

    /// Transitions fired by the clock (ticks, timeouts, reveals) since the
    /// last call.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::Closed`] if the actor is gone.
    pub async fn take_events(&self) -> Result<Vec<Transition>, ActorError> {
        self.request(Cmd::TakeEvents).await
    }

    /// Stop the actor and return the final summary.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::Closed`] if the actor is already gone.
    pub async fn shutdown(&self) -> Result<GameSummary, ActorError> {
        self.request(Cmd::Shutdown).await
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> Cmd,
    ) -> Result<T, ActorError> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(make(reply))
            .await
            .map_err(|_| ActorError::Closed)?;
        response.await.map_err(|_| ActorError::Closed)
    }
}

async fn run(mut game: GameLoop, mut rx: mpsc::Receiver<Cmd>) {
    let mut last = Instant::now();
    let mut events = Vec::new();

    loop {
        let wait = game.time_until_next();
        let cmd = tokio::select! {
            cmd = rx.recv() => cmd,
            () = sleep_for(wait) => {
                catch_up(&mut game, &mut last, &mut events);
                continue;
            }
        };

        // Deadlines that passed while the command was queued fire first.
        catch_up(&mut game, &mut last, &mut events);
        let Some(cmd) = cmd else {
            log::debug!("all session handles dropped, stopping actor");
            break;
        };
        match cmd {
            Cmd::Guess(text, reply) => {
                reply.send(game.submit_guess(&text)).ok();
            }
            Cmd::SelectOption(label, reply) => {
                reply.send(game.select_option(&label)).ok();
            }
            Cmd::Skip(reply) => {
                reply.send(game.skip()).ok();
            }
            Cmd::Restart(reply) => {
                reply.send(game.restart()).ok();
            }
            Cmd::ApplySettings(settings, reply) => {
                game.apply_settings(settings);
                reply.send(()).ok();
            }
            Cmd::Snapshot(reply) => {
                reply.send(game.snapshot()).ok();
            }
            Cmd::Suggest(query, reply) => {
                reply.send(game.session().suggestions(&query)).ok();
            }
            Cmd::TakeEvents(reply) => {
                reply.send(std::mem::take(&mut events)).ok();
            }
            Cmd::Shutdown(reply) => {
                reply.send(game.summary()).ok();
                break;
            }
        }
    }
}

fn catch_up(game: &mut GameLoop, last: &mut Instant, events: &mut Vec<Transition>) {
    let now = Instant::now();
    events.extend(game.advance(now.duration_since(*last)));
    *last = now;
}

async fn sleep_for(wait: Option<Duration>) {
    match wait {
        Some(wait) => tokio::time::sleep(wait).await,
        None => std::future::pending().await,
    }
}
