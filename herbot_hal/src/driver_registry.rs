//! Driver registry.
//!
//! Maps the `[driver] name` from the rig configuration to a factory that
//! opens the four actuator drivers. Constructed at startup and passed by
//! value, no global state.

use crate::driver::{DriverFactory, HalError, RigDrivers};
use crate::drivers::simulation;
use herbot_common::config::RigConfig;
use std::collections::HashMap;
use tracing::{error, info};

/// Registry of available driver sets.
pub struct DriverRegistry {
    factories: HashMap<&'static str, DriverFactory>,
}

impl DriverRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registry pre-populated with every built-in driver.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(simulation::DRIVER_NAME, simulation::create_drivers);
        registry
    }

    /// Register a driver factory.
    ///
    /// # Panics
    /// Panics if a driver with the same name is already registered.
    pub fn register(&mut self, name: &'static str, factory: DriverFactory) {
        if self.factories.contains_key(name) {
            panic!("Driver '{name}' is already registered");
        }
        self.factories.insert(name, factory);
    }

    pub fn get_factory(&self, name: &str) -> Option<DriverFactory> {
        self.factories.get(name).copied()
    }

    /// Open the driver set named in `config.driver.name`.
    ///
    /// # Errors
    /// `HalError::DriverNotFound` if the name is not registered, or whatever
    /// the factory reports.
    pub fn open(&self, config: &RigConfig) -> Result<RigDrivers, HalError> {
        let name = config.driver.name.as_str();
        let Some(factory) = self.get_factory(name) else {
            error!("Unknown driver '{name}'; registered: {:?}", self.list_drivers());
            return Err(HalError::DriverNotFound(name.to_string()));
        };
        info!("Opening '{name}' driver set");
        factory(config)
    }

    /// Registered driver names, sorted.
    pub fn list_drivers(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.factories.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl Default for DriverRegistry {
    fn default() -> Self {
        Self::with_builtin()
    }
}
