//! Type Driver Registry
//!
//! Owns the set of loaded type drivers, indexed by the network type each
//! driver reports for itself. Built once at startup and read-only afterwards.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::gateways::TypeDriver;
use crate::shared::errors::SegmentError;

pub struct TypeDriverRegistry {
    drivers: HashMap<String, Arc<dyn TypeDriver>>,
    tenant_network_types: Vec<String>,
}

impl TypeDriverRegistry {
    /// Load the configured drivers through `discover` and index them.
    ///
    /// Names `discover` cannot resolve are skipped. When two drivers report
    /// the same network type the first one loaded is kept.
    ///
    /// # Errors
    ///
    /// Returns `SegmentError::UnsupportedType` if a tenant network type has
    /// no registered driver.
    pub fn load<F>(
        configured_drivers: &[String],
        discover: F,
        tenant_network_types: &[String],
    ) -> Result<Self, SegmentError>
    where
        F: Fn(&str) -> Option<Arc<dyn TypeDriver>>,
    {
        let mut loaded = Vec::with_capacity(configured_drivers.len());
        let mut drivers: HashMap<String, Arc<dyn TypeDriver>> = HashMap::new();

        for name in configured_drivers {
            let Some(driver) = discover(name) else {
                tracing::warn!(driver = %name, "Type driver not found, skipping");
                continue;
            };
            loaded.push(name.as_str());

            match drivers.entry(driver.network_type().to_string()) {
                Entry::Occupied(entry) => {
                    tracing::warn!(
                        driver = %name,
                        network_type = %entry.key(),
                        "Network type already registered, ignoring duplicate driver"
                    );
                }
                Entry::Vacant(entry) => {
                    entry.insert(driver);
                }
            }
        }
        tracing::info!(drivers = ?loaded, "Loaded type driver names");

        if let Some(missing) = tenant_network_types
            .iter()
            .find(|network_type| !drivers.contains_key(network_type.as_str()))
        {
            tracing::error!(network_type = %missing, "No type driver for tenant network type");
            return Err(SegmentError::UnsupportedType(missing.clone()));
        }
        tracing::info!(tenant_network_types = ?tenant_network_types, "Tenant network types");

        Ok(Self {
            drivers,
            tenant_network_types: tenant_network_types.to_vec(),
        })
    }

    /// Driver registered for `network_type`
    ///
    /// # Errors
    ///
    /// Returns `SegmentError::UnsupportedType` if no driver owns the type.
    pub fn lookup(&self, network_type: &str) -> Result<&Arc<dyn TypeDriver>, SegmentError> {
        self.drivers
            .get(network_type)
            .ok_or_else(|| SegmentError::UnsupportedType(network_type.to_string()))
    }

    /// Network types tenants may draw pool segments from, in preference order
    #[must_use]
    pub fn tenant_network_types(&self) -> &[String] {
        &self.tenant_network_types
    }
}
