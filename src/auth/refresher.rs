// Token refresher
// Keeps the shared token fresh: bounded retries per cycle, unbounded cycles

use std::time::Duration;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};

use super::authenticator::Authenticator;
use super::policy::RetryPolicy;
use super::token::SharedToken;
use super::types::Credentials;

/// Where the refresher currently is in its cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshState {
    /// Inside an attempt cycle; `attempt` starts at 1
    Attempting { attempt: u32 },
    /// Token published, waiting for the refresh interval
    Authenticated,
    /// Attempts exhausted, waiting for the refresh interval
    Backoff,
}

impl Default for RefreshState {
    fn default() -> Self {
        RefreshState::Attempting { attempt: 1 }
    }
}

/// Result of carrying out the previous action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Authentication returned a non-empty token
    Succeeded(String),
    /// Authentication failed for any reason
    Failed,
    /// Token was written to the shared slot
    Published,
    /// A wait ran to completion
    Slept,
}

/// What the refresher should do next
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Authenticate,
    Publish(String),
    Sleep(Duration),
}

/// Pure state transition of the refresh loop
pub fn transition(policy: &RetryPolicy, state: RefreshState, event: Event) -> (RefreshState, Action) {
    use RefreshState::*;

    // An empty token is never a success
    let event = match event {
        Event::Succeeded(token) if token.is_empty() => Event::Failed,
        other => other,
    };

    match (state, event) {
        (Attempting { .. }, Event::Succeeded(token)) => (Authenticated, Action::Publish(token)),
        (Attempting { attempt }, Event::Failed) if attempt < policy.attempts_per_cycle() => (
            Attempting {
                attempt: attempt + 1,
            },
            Action::Sleep(policy.attempt_delay()),
        ),
        (Attempting { .. }, Event::Failed) => (Backoff, Action::Sleep(policy.refresh_interval())),
        (Attempting { attempt }, Event::Slept) => (Attempting { attempt }, Action::Authenticate),
        (Authenticated, Event::Published) => {
            (Authenticated, Action::Sleep(policy.refresh_interval()))
        }
        (Authenticated, Event::Slept) | (Backoff, Event::Slept) => {
            (RefreshState::default(), Action::Authenticate)
        }
        // Cannot follow the action issued from `state`; start a fresh cycle
        (_, _) => (RefreshState::default(), Action::Authenticate),
    }
}

/// Background task that keeps a [`SharedToken`] populated
pub struct TokenRefresher<A> {
    authenticator: A,
    credentials: Credentials,
    policy: RetryPolicy,
    token: SharedToken,
    state_tx: watch::Sender<RefreshState>,
}

impl<A: Authenticator> TokenRefresher<A> {
    /// Create a refresher with an empty token slot
    pub fn new(authenticator: A, credentials: Credentials, policy: RetryPolicy) -> Self {
        let (state_tx, _) = watch::channel(RefreshState::default());

        Self {
            authenticator,
            credentials,
            policy,
            token: SharedToken::new(),
            state_tx,
        }
    }

    /// Read handle to the token slot
    pub fn token(&self) -> SharedToken {
        self.token.clone()
    }

    /// Subscribe to state changes
    pub fn subscribe(&self) -> watch::Receiver<RefreshState> {
        self.state_tx.subscribe()
    }

    /// Run the refresh loop on its own task
    pub fn spawn(self) -> RefresherHandle
    where
        A: 'static,
    {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let token = self.token();
        let state = self.subscribe();
        let join = tokio::spawn(self.run(shutdown_rx));

        RefresherHandle {
            token,
            state,
            shutdown: shutdown_tx,
            join,
        }
    }

    /// Drive the refresh loop until `shutdown` turns true
    ///
    /// Every wait and every authentication call is abandoned as soon as
    /// shutdown is requested. Dropping the sender without requesting shutdown
    /// leaves the loop running.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut state = RefreshState::default();
        let mut action = Action::Authenticate;
        self.state_tx.send_replace(state);

        tracing::info!(
            attempts_limit = self.policy.attempts_limit(),
            attempts_per_cycle = self.policy.attempts_per_cycle(),
            attempt_delay_ms = self.policy.attempt_delay().as_millis() as u64,
            refresh_interval_ms = self.policy.refresh_interval().as_millis() as u64,
            "Token refresher started"
        );

        loop {
            let event = tokio::select! {
                biased;
                _ = shutdown_requested(&mut shutdown) => break,
                event = self.perform(state, action) => event,
            };

            let (next, next_action) = transition(&self.policy, state, event);

            if next == RefreshState::Backoff && state != RefreshState::Backoff {
                tracing::error!(
                    "Reached max authentication attempts ({}). Retrying after {:?}...",
                    self.policy.attempts_per_cycle(),
                    self.policy.refresh_interval()
                );
            }

            if next != state {
                self.state_tx.send_replace(next);
            }

            state = next;
            action = next_action;
        }

        tracing::info!("Token refresher stopped");
    }

    /// Carry out one action and report what happened
    async fn perform(&self, state: RefreshState, action: Action) -> Event {
        match action {
            Action::Authenticate => {
                let attempt = match state {
                    RefreshState::Attempting { attempt } => attempt,
                    _ => 1,
                };
                self.authenticate(attempt).await
            }
            Action::Publish(token) => {
                let preview = token_preview(&token);
                self.token.set(token).await;
                tracing::info!("✅ Proxy authenticated successfully (token: {}...)", preview);
                Event::Published
            }
            Action::Sleep(delay) => {
                tracing::debug!(delay_ms = delay.as_millis() as u64, "Waiting");
                tokio::time::sleep(delay).await;
                Event::Slept
            }
        }
    }

    async fn authenticate(&self, attempt: u32) -> Event {
        let limit = self.policy.attempts_per_cycle();
        tracing::info!(
            "{} of {} proxy authentication with gateway",
            attempt,
            limit
        );

        match self.authenticator.authenticate(&self.credentials).await {
            Ok(token) if !token.is_empty() => Event::Succeeded(token),
            Ok(_) => {
                tracing::warn!(
                    attempt,
                    limit,
                    "Proxy authentication returned an empty token"
                );
                Event::Failed
            }
            Err(e) => {
                tracing::warn!(
                    attempt,
                    limit,
                    kind = e.kind().as_str(),
                    error = %e,
                    "Proxy authentication attempt failed"
                );
                Event::Failed
            }
        }
    }
}

/// Leading characters of a token that are safe to log
///
/// At most 8 characters and never more than half the token.
fn token_preview(token: &str) -> String {
    let len = token.chars().count();
    token.chars().take((len / 2).min(8)).collect()
}

/// Resolves once shutdown has been requested
async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    if shutdown.wait_for(|stop| *stop).await.is_err() {
        // Sender dropped without asking us to stop
        std::future::pending::<()>().await;
    }
}

/// Handle to a spawned refresher
pub struct RefresherHandle {
    token: SharedToken,
    state: watch::Receiver<RefreshState>,
    shutdown: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl RefresherHandle {
    /// Read handle to the token slot
    pub fn token(&self) -> SharedToken {
        self.token.clone()
    }

    /// Latest state reported by the loop
    pub fn state(&self) -> RefreshState {
        *self.state.borrow()
    }

    /// Whether the loop has exited
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Request shutdown and wait for the loop to finish
    pub async fn shutdown(self) -> Result<(), JoinError> {
        let _ = self.shutdown.send(true);
        self.join.await
    }
}
