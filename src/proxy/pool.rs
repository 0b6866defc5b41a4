//! Round-robin proxy pool.
//!
//! All rotation state sits behind one mutex. Critical sections are O(1)
//! (plus an in-memory shuffle at cycle boundaries) and never perform I/O.

use super::descriptor::ProxyDescriptor;
use crate::error::{ConfigError, ConfigResult};
use crate::types::is_skippable_line;
use rand::seq::SliceRandom;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

#[derive(Debug)]
struct Slot {
    proxy: ProxyDescriptor,
    uses: u64,
}

#[derive(Debug, Default)]
struct PoolState {
    slots: Vec<Slot>,
    cursor: usize,
    cycles: u64,
}

impl PoolState {
    fn shuffle(&mut self) {
        if self.slots.len() > 1 {
            self.slots.shuffle(&mut rand::thread_rng());
        }
    }
}

/// Usage of one proxy since the last load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyUsage {
    pub proxy: ProxyDescriptor,
    pub uses: u64,
}

/// A set of upstream proxies handed out in round-robin order.
///
/// An empty pool means direct connections.
#[derive(Debug, Default)]
pub struct ProxyPool {
    state: Mutex<PoolState>,
}

impl ProxyPool {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, PoolState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the pool with the proxies in `lines`, in random order.
    ///
    /// Blank and `#` lines are ignored; malformed lines are skipped with a
    /// warning. Returns the new pool size.
    pub fn load<I, S>(&self, lines: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let slots: Vec<Slot> = lines
            .into_iter()
            .filter(|line| !is_skippable_line(line.as_ref()))
            .filter_map(|line| match ProxyDescriptor::parse(line.as_ref()) {
                Ok(proxy) => Some(Slot { proxy, uses: 0 }),
                Err(e) => {
                    warn!("skipping proxy: {e}");
                    None
                }
            })
            .collect();

        let mut state = self.lock();
        *state = PoolState {
            slots,
            cursor: 0,
            cycles: 0,
        };
        state.shuffle();
        state.slots.len()
    }

    /// Load proxies from a file, one URL per line.
    ///
    /// A missing file empties the pool and is not an error; any other read
    /// failure is.
    pub fn load_file(&self, path: &Path) -> ConfigResult<usize> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no proxy file, using direct connections");
                return Ok(self.load(std::iter::empty::<&str>()));
            }
            Err(e) => {
                return Err(ConfigError::ReadFailed {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })
            }
        };

        let count = self.load(content.lines());
        info!(path = %path.display(), count, "loaded proxies");
        Ok(count)
    }

    /// Next proxy in rotation, or `None` when the pool is empty.
    ///
    /// After a full pass the order is reshuffled and the cursor resets.
    pub fn next(&self) -> Option<ProxyDescriptor> {
        let mut state = self.lock();
        if state.slots.is_empty() {
            return None;
        }

        let cursor = state.cursor;
        let slot = &mut state.slots[cursor];
        slot.uses += 1;
        let proxy = slot.proxy.clone();

        state.cursor += 1;
        if state.cursor >= state.slots.len() {
            state.cursor = 0;
            state.cycles += 1;
            state.shuffle();
        }
        Some(proxy)
    }

    /// Current pool size. Zero means direct connections only.
    pub fn count(&self) -> usize {
        self.lock().slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Completed rotation cycles since the last load.
    pub fn cycles(&self) -> u64 {
        self.lock().cycles
    }

    /// Snapshot of per-proxy usage counters.
    pub fn usage(&self) -> Vec<ProxyUsage> {
        self.lock()
            .slots
            .iter()
            .map(|slot| ProxyUsage {
                proxy: slot.proxy.clone(),
                uses: slot.uses,
            })
            .collect()
    }
}
