pub mod error;
pub mod handlers;
pub mod request_id;
pub mod server;

use pkg_registry::Registry;

/// Shared application state injected into all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: Registry,
    /// Description of the backing store, reported by `/api/v1/info`.
    pub state_store: String,
    pub listen_addr: String,
}
