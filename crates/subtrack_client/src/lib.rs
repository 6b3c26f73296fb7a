//! Client side of subtrack.
//!
//! The list view controller owns a [`store::CollectionStore`], which talks to
//! the remote API through a backend worker thread. Nothing in this crate
//! blocks the controller on network I/O.

/// Remote subscription API: trait, reqwest implementation, in-memory fake.
pub mod api;
/// Backend worker + protocol types used by the controller and headless tests.
pub mod backend;
/// List view controller: view state, persistence hook, user feedback.
pub mod list_view;
/// Authenticated-session context handed out by the identity provider.
pub mod session;
/// Collection Store: canonical local subscription/category sets.
pub mod store;

#[cfg(test)]
pub(crate) mod test_support;

pub use api::{ApiError, HttpSubscriptionApi, MemoryApi, SubscriptionApi};
pub use backend::{spawn_backend, BackendHandle, CoreCmd, CoreErrorSource, CoreEvent};
pub use list_view::SubscriptionListView;
pub use session::SessionContext;
pub use store::{CollectionStore, StoreUpdate};

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber for front-end binaries.
///
/// Honors `RUST_LOG`; falls back to warnings for the binary and info for the
/// client crate. Calling this twice is harmless.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("subtrack=warn,subtrack_client=info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}
