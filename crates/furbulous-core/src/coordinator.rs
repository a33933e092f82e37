// ── Poll coordinator ──
//
// Owns one `FurbulousClient` and drives it: setup, two polling cadences,
// snapshot publication and command routing. Consumers observe polls
// through a `watch` channel; the previous snapshot stays visible when a
// poll fails.

use std::sync::Arc;
use std::time::Duration;

use furbulous_api::{FactTable, FurbulousClient};
use serde_json::Map;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::command::Command;
use crate::config::ClientConfig;
use crate::error::CoreError;
use crate::model::{self, DeviceFacts, PetProfile};

// ── PollState ────────────────────────────────────────────────────────

/// How current the published snapshot is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollStatus {
    /// No poll has completed yet.
    Pending,
    /// The last poll succeeded.
    Fresh,
    /// The last poll failed; the snapshot is from an earlier poll.
    Stale { reason: String },
    /// The session could not be re-established; new credentials are
    /// needed. The snapshot is from an earlier poll.
    NeedsReauth { message: String },
}

/// What consumers observe after every poll.
#[derive(Debug, Clone)]
pub struct PollState {
    pub snapshot: Option<Arc<FactTable>>,
    pub status: PollStatus,
}

impl PollState {
    fn pending() -> Self {
        Self {
            snapshot: None,
            status: PollStatus::Pending,
        }
    }
}

/// Which timer triggered a poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Cadence {
    General,
    Fast,
}

// ── Coordinator ──────────────────────────────────────────────────────

/// Entry point for consumers.
///
/// Cheaply cloneable via `Arc<CoordinatorInner>`. Both cadences and all
/// commands share the one client, and therefore the one session.
#[derive(Clone)]
pub struct Coordinator {
    inner: Arc<CoordinatorInner>,
}

struct CoordinatorInner {
    config: ClientConfig,
    client: FurbulousClient,
    state: watch::Sender<PollState>,
    tasks: Mutex<PollTasks>,
}

/// Running cadences and the token that stops them; replaced on every
/// `start`.
#[derive(Default)]
struct PollTasks {
    cancel: CancellationToken,
    handles: Vec<JoinHandle<()>>,
}

impl Coordinator {
    /// Create a coordinator without contacting the server.
    pub fn new(config: ClientConfig) -> Result<Self, CoreError> {
        let client = FurbulousClient::with_base_url(
            config.base_url.clone(),
            config.credentials.clone(),
            &config.transport,
        )?;
        Ok(Self::with_client(config, client))
    }

    /// Create a coordinator around an existing client.
    pub fn with_client(config: ClientConfig, client: FurbulousClient) -> Self {
        let (state, _) = watch::channel(PollState::pending());
        Self {
            inner: Arc::new(CoordinatorInner {
                config,
                client,
                state,
                tasks: Mutex::new(PollTasks::default()),
            }),
        }
    }

    /// Create a coordinator, log in and run the first poll.
    ///
    /// Account credentials are verified up front
    /// ([`CoreError::AuthenticationFailed`]). The first poll must succeed;
    /// an authentication failure there is still reported as such, anything
    /// else as [`CoreError::SetupFailed`]. Does not start the cadences.
    pub async fn setup(config: ClientConfig) -> Result<Self, CoreError> {
        let coordinator = Self::new(config)?;
        let client = coordinator.client();

        if coordinator.inner.config.credentials.can_login() {
            client
                .authenticate()
                .await
                .map_err(|e| CoreError::AuthenticationFailed {
                    message: e.to_string(),
                })?;
        }

        coordinator.refresh().await.map_err(|e| match e {
            CoreError::AuthenticationFailed { .. } => e,
            other => CoreError::SetupFailed {
                message: other.to_string(),
            },
        })?;

        info!(
            summary = %coordinator.status_summary(),
            "furbulous account set up"
        );
        Ok(coordinator)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// The shared API client.
    pub fn client(&self) -> &FurbulousClient {
        &self.inner.client
    }

    // ── Polling ──────────────────────────────────────────────────────

    /// Run one poll and publish the outcome.
    ///
    /// On failure the previous snapshot stays published and is marked
    /// [`PollStatus::Stale`], or [`PollStatus::NeedsReauth`] when the
    /// session is gone.
    pub async fn refresh(&self) -> Result<Arc<FactTable>, CoreError> {
        match self.inner.client.get_fact_table().await {
            Ok(table) => {
                let table = Arc::new(table);
                debug!(
                    devices = table.devices.len(),
                    pets = table.pets.len(),
                    "poll succeeded"
                );
                self.inner.state.send_replace(PollState {
                    snapshot: Some(Arc::clone(&table)),
                    status: PollStatus::Fresh,
                });
                Ok(table)
            }
            Err(e) => {
                let err = CoreError::from(e);
                let status = if err.is_auth_error() {
                    PollStatus::NeedsReauth {
                        message: err.to_string(),
                    }
                } else {
                    PollStatus::Stale {
                        reason: err.to_string(),
                    }
                };
                self.inner.state.send_modify(|state| state.status = status);
                Err(err)
            }
        }
    }

    /// Subscribe to poll outcomes.
    pub fn subscribe(&self) -> watch::Receiver<PollState> {
        self.inner.state.subscribe()
    }

    /// Current state (snapshot + status).
    pub fn state(&self) -> PollState {
        self.inner.state.borrow().clone()
    }

    /// Latest successful snapshot.
    pub fn snapshot(&self) -> Option<Arc<FactTable>> {
        self.inner.state.borrow().snapshot.clone()
    }

    /// Derived facts for every device in the latest snapshot.
    pub fn device_facts(&self) -> Vec<DeviceFacts> {
        self.snapshot()
            .map(|t| t.devices.iter().map(DeviceFacts::from_device).collect())
            .unwrap_or_default()
    }

    /// Pet profiles from the latest snapshot, evaluated now.
    pub fn pet_profiles(&self) -> Vec<PetProfile> {
        let now = chrono::Utc::now();
        self.snapshot()
            .map(|t| t.pets.iter().map(|p| PetProfile::from_pet(p, now)).collect())
            .unwrap_or_default()
    }

    /// `"{n} device(s)"` or `"Disconnected"`.
    pub fn status_summary(&self) -> String {
        model::status_summary(self.snapshot().as_deref())
    }

    // ── Background cadences ──────────────────────────────────────────

    /// Spawn the general and fast cadences. Calling it again while they
    /// run is a no-op; after [`shutdown`](Self::shutdown) it starts them
    /// anew.
    pub async fn start(&self) {
        let mut tasks = self.inner.tasks.lock().await;
        if !tasks.handles.is_empty() {
            return;
        }
        tasks.cancel = CancellationToken::new();

        for (cadence, period) in [
            (Cadence::General, self.inner.config.general_interval),
            (Cadence::Fast, self.inner.config.fast_interval),
        ] {
            if period.is_zero() {
                debug!(%cadence, "cadence disabled");
                continue;
            }
            let coordinator = self.clone();
            let cancel = tasks.cancel.clone();
            tasks
                .handles
                .push(tokio::spawn(poll_task(coordinator, cadence, period, cancel)));
        }
        info!(tasks = tasks.handles.len(), "polling started");
    }

    /// Stop the cadences and wait for them to finish.
    pub async fn shutdown(&self) {
        let mut tasks = self.inner.tasks.lock().await;
        tasks.cancel.cancel();

        for handle in tasks.handles.drain(..) {
            let _ = handle.await;
        }
        debug!("polling stopped");
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Apply `command` to the box with `iotid`.
    ///
    /// Returns `true` iff the server accepted the write; a successful write
    /// is followed by an immediate poll so the snapshot reflects it.
    pub async fn execute(&self, iotid: &str, command: Command) -> bool {
        let client = &self.inner.client;

        let accepted = match command {
            Command::SetDoNotDisturb(enabled) => client.set_do_not_disturb(iotid, enabled).await,
            Command::ToggleDoNotDisturb => {
                let current = self
                    .snapshot()
                    .and_then(|t| t.device_by_iotid(iotid).map(|d| d.is_disturb));
                let Some(current) = current else {
                    warn!(iotid, "cannot toggle do-not-disturb: device not in snapshot");
                    return false;
                };
                client.set_do_not_disturb(iotid, !current).await
            }
            other => {
                let Some((key, value)) = other.property_write() else {
                    return false;
                };
                let mut properties = Map::new();
                properties.insert(key.to_owned(), value);
                client.set_property(iotid, &properties).await
            }
        };

        if accepted {
            if let Err(e) = self.refresh().await {
                warn!(error = %e, "refresh after command failed");
            }
        }
        accepted
    }
}

// ── Background tasks ─────────────────────────────────────────────────

/// Poll every `period` until cancelled.
async fn poll_task(
    coordinator: Coordinator,
    cadence: Cadence,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(period);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                debug!(%cadence, "poll tick");
                if let Err(e) = coordinator.refresh().await {
                    warn!(%cadence, error = %e, "poll failed");
                }
            }
        }
    }
}
