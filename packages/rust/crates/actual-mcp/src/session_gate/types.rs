use std::fmt;
use std::ops::Deref;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use actual_store::{BudgetStore, OpenConfig, StoreError};
use thiserror::Error;
use tokio::sync::{Mutex, watch};

/// What the one-time setup needs: how to open the store and which budget to load.
#[derive(Debug, Clone)]
pub struct SessionSetup {
    pub open: OpenConfig,
    pub budget_id: String,
    /// Upper bound for open + load. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

/// Handle to a ready session. Only the gate hands these out, and only once setup
/// has fully succeeded.
#[derive(Clone)]
pub struct BudgetSession {
    pub(super) store: Arc<dyn BudgetStore>,
    pub(super) budget_id: Arc<str>,
}

impl BudgetSession {
    pub fn budget_id(&self) -> &str {
        &self.budget_id
    }
}

impl Deref for BudgetSession {
    type Target = dyn BudgetStore;

    fn deref(&self) -> &Self::Target {
        self.store.as_ref()
    }
}

impl fmt::Debug for BudgetSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BudgetSession")
            .field("budget_id", &self.budget_id)
            .finish_non_exhaustive()
    }
}

/// Why a setup attempt failed.
#[derive(Debug, Error)]
pub enum SetupFailure {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("session setup timed out after {}s", .0.as_secs())]
    TimedOut(Duration),

    #[error("session setup ended before settling")]
    Abandoned,
}

/// Captured setup failure. Clones share one allocation, so every caller that
/// observed an attempt holds the very same error.
#[derive(Debug, Clone, Error)]
#[error(transparent)]
pub struct InitError(pub(super) Arc<SetupFailure>);

impl InitError {
    pub(super) fn new(failure: SetupFailure) -> Self {
        Self(Arc::new(failure))
    }

    pub fn failure(&self) -> &SetupFailure {
        &self.0
    }

    /// True when both errors come from the same captured failure.
    pub fn is_same_failure(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Externally visible gate state, for health reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateStatus {
    Uninitialized,
    Initializing,
    Ready,
    Failed,
}

impl GateStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Initializing => "initializing",
            Self::Ready => "ready",
            Self::Failed => "failed",
        }
    }
}

pub(super) type Settled = Result<BudgetSession, InitError>;

pub(super) enum SessionState {
    Uninitialized,
    /// Receivers resolve to `Some` once the in-flight attempt settles.
    Initializing(watch::Receiver<Option<Settled>>),
    Ready(BudgetSession),
    Failed(InitError),
}

/// Process-wide owner of the budget session. Cheap to clone.
#[derive(Clone)]
pub struct SessionGate {
    pub(super) inner: Arc<GateInner>,
}

pub(super) struct GateInner {
    pub(super) store: Arc<dyn BudgetStore>,
    pub(super) setup: SessionSetup,
    pub(super) state: StdMutex<SessionState>,
    /// Serializes store open/load against close.
    pub(super) lifecycle: Mutex<()>,
}
