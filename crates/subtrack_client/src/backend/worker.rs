//! Background worker thread for remote API access.

use crate::api::{ApiError, SubscriptionApi};
use crate::backend::{CoreCmd, CoreErrorSource, CoreEvent};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::future::Future;
use std::thread;
use std::time::{Duration, Instant};
use subtrack_core::config::env_flag_enabled;
use subtrack_core::ErrorKind;
use tracing::{error, info, warn};

/// Handle for sending commands to, and receiving events from, the backend worker.
pub struct BackendHandle {
    pub cmd_tx: Sender<CoreCmd>,
    pub evt_rx: Receiver<CoreEvent>,
}

impl BackendHandle {
    /// Wrap pre-built channels, letting tests play the worker's side by hand.
    pub fn from_test_channels(cmd_tx: Sender<CoreCmd>, evt_rx: Receiver<CoreEvent>) -> Self {
        Self { cmd_tx, evt_rx }
    }
}

fn failure(source: CoreErrorSource, err: ApiError) -> CoreEvent {
    warn!("{}: {}", source.describe(), err);
    CoreEvent::Error {
        kind: err.kind(),
        message: err.to_string(),
        source,
    }
}

async fn with_timeout<T>(
    limit: Duration,
    call: impl Future<Output = Result<T, ApiError>>,
) -> Result<T, ApiError> {
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(ApiError::Timeout(limit)),
    }
}

async fn execute<A: SubscriptionApi>(api: &A, cmd: CoreCmd, limit: Duration) -> CoreEvent {
    match cmd {
        CoreCmd::LoadSubscriptions => match with_timeout(limit, api.list_subscriptions()).await {
            Ok(items) => CoreEvent::SubscriptionsLoaded { items },
            Err(err) => failure(CoreErrorSource::LoadSubscriptions, err),
        },
        CoreCmd::LoadCategories => match with_timeout(limit, api.list_categories()).await {
            Ok(items) => CoreEvent::CategoriesLoaded { items },
            Err(err) => failure(CoreErrorSource::LoadCategories, err),
        },
        CoreCmd::CreateSubscription { payload } => {
            match with_timeout(limit, api.create_subscription(&payload)).await {
                Ok(()) => {
                    info!("created subscription '{}'", payload.service_name);
                    CoreEvent::SubscriptionCreated
                }
                Err(err) => failure(CoreErrorSource::Create, err),
            }
        }
        CoreCmd::UpdateSubscription { id, payload } => {
            match with_timeout(limit, api.update_subscription(&id, &payload)).await {
                Ok(()) => {
                    info!("updated subscription {}", id);
                    CoreEvent::SubscriptionUpdated { id }
                }
                Err(err) => failure(CoreErrorSource::Update { id }, err),
            }
        }
        CoreCmd::DeleteSubscription { id } => {
            match with_timeout(limit, api.delete_subscription(&id)).await {
                Ok(()) => {
                    info!("deleted subscription {}", id);
                    CoreEvent::SubscriptionDeleted { id }
                }
                Err(err) => failure(CoreErrorSource::Delete { id }, err),
            }
        }
        CoreCmd::LoadCategoryTotals => match with_timeout(limit, api.category_totals()).await {
            Ok(items) => CoreEvent::CategoryTotalsLoaded { items },
            Err(err) => failure(CoreErrorSource::CategoryTotals, err),
        },
    }
}

fn source_for(cmd: &CoreCmd) -> CoreErrorSource {
    match cmd {
        CoreCmd::LoadSubscriptions => CoreErrorSource::LoadSubscriptions,
        CoreCmd::LoadCategories => CoreErrorSource::LoadCategories,
        CoreCmd::CreateSubscription { .. } => CoreErrorSource::Create,
        CoreCmd::UpdateSubscription { id, .. } => CoreErrorSource::Update { id: id.clone() },
        CoreCmd::DeleteSubscription { id } => CoreErrorSource::Delete { id: id.clone() },
        CoreCmd::LoadCategoryTotals => CoreErrorSource::CategoryTotals,
    }
}

/// Spawn the backend worker thread that performs remote API calls.
///
/// Commands run one at a time in the order they were sent, each bounded by
/// `request_timeout`. The worker replies with exactly one [`CoreEvent`] per
/// command and exits once the handle is dropped.
///
/// # Returns
/// A [`BackendHandle`] containing the command sender and event receiver.
///
/// # Panics
/// Panics if the worker thread cannot be spawned.
pub fn spawn_backend<A: SubscriptionApi>(api: A, request_timeout: Duration) -> BackendHandle {
    let (cmd_tx, cmd_rx) = unbounded();
    let (evt_tx, evt_rx) = unbounded();

    thread::Builder::new()
        .name("subtrack-backend".to_string())
        .spawn(move || run_worker(api, request_timeout, cmd_rx, evt_tx))
        .expect("spawn backend thread");

    BackendHandle { cmd_tx, evt_rx }
}

fn run_worker<A: SubscriptionApi>(
    api: A,
    request_timeout: Duration,
    cmd_rx: Receiver<CoreCmd>,
    evt_tx: Sender<CoreEvent>,
) {
    let timing_log_enabled = env_flag_enabled("SUBTRACK_BACKEND_TIMING_LOG");
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .enable_io()
        .build()
    {
        Ok(runtime) => Some(runtime),
        Err(err) => {
            error!("backend runtime failed to start: {}", err);
            None
        }
    };

    for cmd in cmd_rx.iter() {
        let started = Instant::now();
        let op = cmd.label();
        let event = match runtime.as_ref() {
            Some(runtime) => runtime.block_on(execute(&api, cmd, request_timeout)),
            None => CoreEvent::Error {
                source: source_for(&cmd),
                kind: ErrorKind::Local,
                message: "backend runtime unavailable".to_string(),
            },
        };
        if timing_log_enabled {
            info!(
                target: "subtrack_client::backend_timing",
                op = op,
                elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
                ok = !matches!(event, CoreEvent::Error { .. }),
                "backend request timing"
            );
        }
        if evt_tx.send(event).is_err() {
            // Controller dropped its receiver; nobody is listening anymore.
            break;
        }
    }
}
