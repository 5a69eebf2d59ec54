//! Snowflake identifier layout.

/// Custom epoch for generated ids: 2022-01-01T00:00:00Z, in milliseconds.
pub const SEEKR_EPOCH_MS: i64 = 1_640_995_200_000;

pub const DATACENTER_ID_BITS: u32 = 5;
pub const WORKER_ID_BITS: u32 = 5;
pub const SEQUENCE_BITS: u32 = 12;

/// Largest datacenter / worker id that fits the layout.
pub const MAX_DATACENTER_ID: u16 = (1 << DATACENTER_ID_BITS) - 1;
pub const MAX_WORKER_ID: u16 = (1 << WORKER_ID_BITS) - 1;

/// How far the wall clock may step backwards before `next_id` gives up.
pub const MAX_CLOCK_DRIFT_MS: i64 = 5;
