//! Validated, one-at-a-time action submission.
//!
//! The dispatcher maps each action kind to exactly one gateway operation,
//! validating locally before anything touches the network. It never mutates
//! table or roster state itself; on success it runs a caller-supplied hook,
//! conventionally wired to [`GameStore::refresh`] so the UI reflects the
//! authoritative post-action state without waiting for the next poll tick.
//!
//! [`GameStore::refresh`]: crate::store::GameStore::refresh

use std::sync::{Arc, Mutex};

use futures_util::future::BoxFuture;
use thiserror::Error;

use crate::api_client::{Gateway, GatewayError};
use crate::entities::{ActionResponse, Chips, PlayerAction};
use crate::store::GameStore;

/// Async hook run after every successfully submitted action.
pub type SuccessHook = Box<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

#[derive(Debug, Error)]
pub enum ActionError {
    /// BET and RAISE need an amount; caught before any request is issued.
    #[error("Value is required for {action} action")]
    ValueRequired { action: PlayerAction },

    /// Another action is still in flight on this dispatcher.
    #[error("Another action is already in flight")]
    Busy,

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Observable dispatcher state for the presentation layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DispatchState {
    /// An action is currently in flight.
    pub busy: bool,
    pub error: Option<String>,
    /// The most recently completed action.
    pub last_action: Option<PlayerAction>,
}

/// A validated request, produced before the busy flag is taken.
enum Submission {
    Ready,
    Fold,
    Check,
    Call,
    Bet(Chips),
    Raise(Chips),
}

pub struct ActionDispatcher {
    gateway: Arc<dyn Gateway>,
    state: Mutex<DispatchState>,
    on_success: Option<SuccessHook>,
}

impl ActionDispatcher {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self {
            gateway,
            state: Mutex::new(DispatchState::default()),
            on_success: None,
        }
    }

    pub fn with_success_hook(gateway: Arc<dyn Gateway>, on_success: SuccessHook) -> Self {
        Self {
            gateway,
            state: Mutex::new(DispatchState::default()),
            on_success: Some(on_success),
        }
    }

    /// Dispatcher whose success hook refreshes `store` out of band.
    pub fn refreshing(gateway: Arc<dyn Gateway>, store: Arc<GameStore>) -> Self {
        Self::with_success_hook(
            gateway,
            Box::new(move || {
                let store = Arc::clone(&store);
                Box::pin(async move {
                    if let Err(err) = store.refresh().await {
                        log::warn!("post-action refresh failed: {err}");
                    }
                })
            }),
        )
    }

    pub fn state(&self) -> DispatchState {
        self.state.lock().expect("dispatcher mutex poisoned").clone()
    }

    /// Validate and submit one player action.
    ///
    /// # Errors
    ///
    /// Fails locally (no request issued) when a BET/RAISE amount is missing or
    /// another action is in flight; otherwise surfaces the gateway's failure.
    /// Failures are terminal, there is no automatic retry.
    pub async fn execute_action(
        &self,
        action: PlayerAction,
        value: Option<Chips>,
    ) -> Result<ActionResponse, ActionError> {
        let submission = match (action, value) {
            (PlayerAction::Ready, _) => Submission::Ready,
            (PlayerAction::Fold, _) => Submission::Fold,
            (PlayerAction::Check, _) => Submission::Check,
            (PlayerAction::Call, _) => Submission::Call,
            (PlayerAction::Bet, Some(value)) => Submission::Bet(value),
            (PlayerAction::Raise, Some(value)) => Submission::Raise(value),
            (PlayerAction::Bet | PlayerAction::Raise, None) => {
                let err = ActionError::ValueRequired { action };
                let mut state = self.state.lock().expect("dispatcher mutex poisoned");
                state.error = Some(err.to_string());
                return Err(err);
            }
        };

        {
            let mut state = self.state.lock().expect("dispatcher mutex poisoned");
            if state.busy {
                return Err(ActionError::Busy);
            }
            state.busy = true;
            state.error = None;
        }

        let result = self.submit(submission).await;

        // The guard must not span the hook await below, or the returned
        // future stops being Send.
        match result {
            Ok(response) => {
                {
                    let mut state = self.state.lock().expect("dispatcher mutex poisoned");
                    state.busy = false;
                    state.last_action = Some(action);
                }
                log::info!("action {action} acknowledged");
                if let Some(hook) = &self.on_success {
                    hook().await;
                }
                Ok(response)
            }
            Err(err) => {
                {
                    let mut state = self.state.lock().expect("dispatcher mutex poisoned");
                    state.busy = false;
                    state.error = Some(err.to_string());
                }
                log::warn!("action {action} failed: {err}");
                Err(err.into())
            }
        }
    }

    async fn submit(&self, submission: Submission) -> Result<ActionResponse, GatewayError> {
        match submission {
            Submission::Ready => self.gateway.ready().await,
            Submission::Fold => self.gateway.fold().await,
            Submission::Check => self.gateway.check().await,
            Submission::Call => self.gateway.call().await,
            Submission::Bet(value) => self.gateway.bet(value).await,
            Submission::Raise(value) => self.gateway.raise(value).await,
        }
    }
}
