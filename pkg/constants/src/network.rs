//! Network-related constants.

/// Default port for the seekr API server.
pub const DEFAULT_API_PORT: u16 = 5000;

/// Default host the API server binds to.
pub const DEFAULT_API_HOST: &str = "127.0.0.1";

/// Default API server address (HTTP), used by `seekrctl`.
pub const DEFAULT_API_ADDR: &str = "http://127.0.0.1:5000";

/// Response header carrying the per-request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";
