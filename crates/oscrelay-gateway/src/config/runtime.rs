use std::sync::{Arc, RwLock};

use oscrelay_core::error::Result;
use oscrelay_core::filter::AddressFilter;

use super::schema::RelayConfig;

/// Validated config plus its compiled filter. Immutable once built.
#[derive(Debug)]
pub struct RuntimeConfig {
    pub config: RelayConfig,
    pub filter: AddressFilter,
}

impl RuntimeConfig {
    pub fn compile(config: RelayConfig) -> Result<Self> {
        config.validate()?;
        let filter = config.filters.compile()?;
        Ok(Self { config, filter })
    }
}

/// Holder for the current `RuntimeConfig`, replaced atomically.
///
/// Readers take an `Arc` snapshot and keep using it for the whole message,
/// so a concurrent replacement never yields a half-applied config.
pub struct RuntimeCell {
    current: RwLock<Arc<RuntimeConfig>>,
}

impl RuntimeCell {
    pub fn new(rt: RuntimeConfig) -> Self {
        Self {
            current: RwLock::new(Arc::new(rt)),
        }
    }

    pub fn load(&self) -> Arc<RuntimeConfig> {
        // A poisoned lock still holds a whole Arc.
        match self.current.read() {
            Ok(g) => Arc::clone(&g),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    pub fn store(&self, rt: RuntimeConfig) {
        let next = Arc::new(rt);
        match self.current.write() {
            Ok(mut g) => *g = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
    }
}
