use anyhow::bail;
use chrono::Utc;
use pkg_constants::id::{
    DATACENTER_ID_BITS, MAX_CLOCK_DRIFT_MS, MAX_DATACENTER_ID, MAX_WORKER_ID, SEEKR_EPOCH_MS,
    SEQUENCE_BITS, WORKER_ID_BITS,
};
use std::sync::Mutex;
use tracing::warn;

const WORKER_SHIFT: u32 = SEQUENCE_BITS;
const DATACENTER_SHIFT: u32 = SEQUENCE_BITS + WORKER_ID_BITS;
const TIMESTAMP_SHIFT: u32 = SEQUENCE_BITS + WORKER_ID_BITS + DATACENTER_ID_BITS;
const SEQUENCE_MASK: i64 = (1 << SEQUENCE_BITS) - 1;

/// Snowflake-style unique id generator.
///
/// Layout (63 bits): 41 bits of milliseconds since `SEEKR_EPOCH_MS`,
/// 5 bits datacenter id, 5 bits worker id, 12 bits sequence. Ids from one
/// generator are strictly increasing, so sorting by id sorts by creation.
pub struct IdGenerator {
    datacenter_id: i64,
    worker_id: i64,
    state: Mutex<GeneratorState>,
}

struct GeneratorState {
    last_ms: i64,
    sequence: i64,
}

impl IdGenerator {
    pub fn new(datacenter_id: u16, worker_id: u16) -> anyhow::Result<Self> {
        if datacenter_id > MAX_DATACENTER_ID {
            bail!(
                "datacenter id {} out of range (max {})",
                datacenter_id,
                MAX_DATACENTER_ID
            );
        }
        if worker_id > MAX_WORKER_ID {
            bail!("worker id {} out of range (max {})", worker_id, MAX_WORKER_ID);
        }
        Ok(Self {
            datacenter_id: datacenter_id as i64,
            worker_id: worker_id as i64,
            state: Mutex::new(GeneratorState {
                last_ms: 0,
                sequence: 0,
            }),
        })
    }

    /// Generate the next id.
    pub fn next_id(&self) -> anyhow::Result<i64> {
        self.generate(|| Utc::now().timestamp_millis())
    }

    fn generate(&self, clock: impl Fn() -> i64) -> anyhow::Result<i64> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| anyhow::anyhow!("id generator lock poisoned"))?;

        let mut now = clock();
        if now < state.last_ms {
            let drift = state.last_ms - now;
            if drift > MAX_CLOCK_DRIFT_MS {
                bail!("clock moved backwards by {}ms, refusing to generate id", drift);
            }
            warn!("Clock moved backwards by {}ms, waiting", drift);
            now = wait_until(&clock, state.last_ms);
        }

        if now == state.last_ms {
            state.sequence = (state.sequence + 1) & SEQUENCE_MASK;
            if state.sequence == 0 {
                // Sequence exhausted for this millisecond
                now = wait_until(&clock, state.last_ms + 1);
            }
        } else {
            state.sequence = 0;
        }
        state.last_ms = now;

        Ok(((now - SEEKR_EPOCH_MS) << TIMESTAMP_SHIFT)
            | (self.datacenter_id << DATACENTER_SHIFT)
            | (self.worker_id << WORKER_SHIFT)
            | state.sequence)
    }
}

fn wait_until(clock: &impl Fn() -> i64, target_ms: i64) -> i64 {
    loop {
        let now = clock();
        if now >= target_ms {
            return now;
        }
        std::hint::spin_loop();
    }
}
