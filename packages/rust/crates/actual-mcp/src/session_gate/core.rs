use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};
use std::time::Instant;

use actual_store::{BudgetStore, StoreError};
use tokio::sync::{Mutex, watch};

use super::types::{
    BudgetSession, GateInner, GateStatus, InitError, SessionGate, SessionSetup, SessionState,
    Settled, SetupFailure,
};

impl SessionGate {
    /// Builds a gate in the `Uninitialized` state. Nothing touches the store until the
    /// first [`Self::ensure_ready`].
    #[must_use]
    pub fn new(store: Arc<dyn BudgetStore>, setup: SessionSetup) -> Self {
        Self {
            inner: Arc::new(GateInner {
                store,
                setup,
                state: StdMutex::new(SessionState::Uninitialized),
                lifecycle: Mutex::new(()),
            }),
        }
    }

    #[must_use]
    pub fn state(&self) -> GateStatus {
        match &*self.inner.lock_state() {
            SessionState::Uninitialized => GateStatus::Uninitialized,
            SessionState::Initializing(_) => GateStatus::Initializing,
            SessionState::Ready(_) => GateStatus::Ready,
            SessionState::Failed(_) => GateStatus::Failed,
        }
    }

    /// Returns the ready session, running setup if nobody has yet.
    ///
    /// Concurrent callers share one attempt. Once the attempt settles every later call
    /// returns the same session (or the same captured error) without touching the store.
    /// Setup runs on its own task, so a caller dropping this future does not cancel it.
    pub async fn ensure_ready(&self) -> Result<BudgetSession, InitError> {
        let mut settled = {
            let mut state = self.inner.lock_state();
            let in_flight = match &*state {
                SessionState::Ready(session) => return Ok(session.clone()),
                SessionState::Failed(error) => return Err(error.clone()),
                SessionState::Initializing(settled) => Some(settled.clone()),
                SessionState::Uninitialized => None,
            };
            match in_flight {
                Some(settled) => settled,
                None => {
                    let (publish, settled) = watch::channel(None);
                    *state = SessionState::Initializing(settled.clone());
                    self.spawn_setup(publish);
                    settled
                }
            }
        };

        let outcome = match settled.wait_for(Option::is_some).await {
            Ok(value) => (*value).clone(),
            Err(_) => None,
        };
        match outcome {
            Some(outcome) => outcome,
            None => Err(self.inner.abandon(&settled)),
        }
    }

    /// Tears the session down.
    ///
    /// `Ready` closes the store; `Failed` forgets the captured error. Both leave the gate
    /// `Uninitialized` so the next call sets up afresh. An in-flight attempt is left alone.
    pub async fn shutdown(&self) -> Result<(), StoreError> {
        if matches!(
            self.state(),
            GateStatus::Uninitialized | GateStatus::Initializing
        ) {
            return Ok(());
        }
        let _lifecycle = self.inner.lifecycle.lock().await;
        let previous = {
            let mut state = self.inner.lock_state();
            if !matches!(&*state, SessionState::Ready(_) | SessionState::Failed(_)) {
                return Ok(());
            }
            std::mem::replace(&mut *state, SessionState::Uninitialized)
        };

        match previous {
            SessionState::Ready(session) => {
                tracing::info!(
                    event = "actual.session.closing",
                    budget_id = %session.budget_id(),
                    "closing budget session"
                );
                self.inner.store.close().await
            }
            SessionState::Failed(error) => {
                tracing::info!(
                    event = "actual.session.failure_cleared",
                    error = %error,
                    "cleared failed session setup"
                );
                Ok(())
            }
            SessionState::Uninitialized | SessionState::Initializing(_) => Ok(()),
        }
    }

    fn spawn_setup(&self, publish: watch::Sender<Option<Settled>>) {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let _lifecycle = inner.lifecycle.lock().await;
            let started = Instant::now();
            tracing::info!(
                event = "actual.session.setup.started",
                budget_id = %inner.setup.budget_id,
                server_url = %inner.setup.open.server_url,
                "opening budget session"
            );

            let outcome = match inner.run_setup().await {
                Ok(()) => Ok(BudgetSession {
                    store: Arc::clone(&inner.store),
                    budget_id: Arc::from(inner.setup.budget_id.as_str()),
                }),
                Err(failure) => Err(InitError::new(failure)),
            };

            let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
            match &outcome {
                Ok(_) => tracing::info!(
                    event = "actual.session.setup.ready",
                    budget_id = %inner.setup.budget_id,
                    elapsed_ms,
                    "budget session ready"
                ),
                Err(error) => tracing::error!(
                    event = "actual.session.setup.failed",
                    budget_id = %inner.setup.budget_id,
                    elapsed_ms,
                    error = %error,
                    "budget session setup failed"
                ),
            }

            *inner.lock_state() = match &outcome {
                Ok(session) => SessionState::Ready(session.clone()),
                Err(error) => SessionState::Failed(error.clone()),
            };
            publish.send_replace(Some(outcome));
        });
    }
}

impl GateInner {
    pub(super) fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn run_setup(&self) -> Result<(), SetupFailure> {
        let attempt = async {
            self.store.open(&self.setup.open).await?;
            self.store.load_budget(&self.setup.budget_id).await?;
            Ok::<(), SetupFailure>(())
        };
        let result = match self.setup.timeout {
            Some(limit) => tokio::time::timeout(limit, attempt)
                .await
                .unwrap_or(Err(SetupFailure::TimedOut(limit))),
            None => attempt.await,
        };
        if result.is_err() {
            if let Err(error) = self.store.close().await {
                tracing::warn!(
                    event = "actual.session.setup.cleanup_failed",
                    error = %error,
                    "failed to release partially opened store"
                );
            }
        }
        result
    }

    /// The setup task went away without publishing. Pin the attempt as failed so waiters
    /// and later callers agree on one error.
    fn abandon(&self, settled: &watch::Receiver<Option<Settled>>) -> InitError {
        let mut state = self.lock_state();
        let still_pending = matches!(
            &*state,
            SessionState::Initializing(current) if current.same_channel(settled)
        );
        if still_pending {
            let error = InitError::new(SetupFailure::Abandoned);
            *state = SessionState::Failed(error.clone());
            return error;
        }
        match &*state {
            SessionState::Failed(error) => error.clone(),
            SessionState::Ready(_)
            | SessionState::Uninitialized
            | SessionState::Initializing(_) => InitError::new(SetupFailure::Abandoned),
        }
    }
}
