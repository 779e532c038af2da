//! Application Configuration
//!
//! Loads configuration from files and environment variables.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// JWT configuration
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
}

fn default_global_physnet_mtu() -> u32 {
    1500
}

/// Segment type driver configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SegmentsConfig {
    /// Type drivers to load, in load order
    pub type_drivers: Vec<String>,
    /// Network types tenant networks draw segments from, in preference order
    pub tenant_network_types: Vec<String>,
    /// MTU of the underlying physical networks
    #[serde(default = "default_global_physnet_mtu")]
    pub global_physnet_mtu: u32,
    /// Physical networks usable by flat networks; `*` allows any
    #[serde(default)]
    pub flat_networks: Vec<String>,
    /// `physnet` or `physnet:min:max` entries
    #[serde(default)]
    pub network_vlan_ranges: Vec<String>,
    /// `min:max` VXLAN VNI ranges available to tenants
    #[serde(default)]
    pub vni_ranges: Vec<String>,
}

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub segments: SegmentsConfig,
}

impl AppConfig {
    /// Load configuration from files and environment
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a source cannot be read or deserialized.
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "default".into());

        Config::builder()
            // Start with default config
            .add_source(File::with_name("config/default").required(true))
            // Merge environment-specific config if it exists
            .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
            // Override with environment variables (e.g., APP__SEGMENTS__TYPE_DRIVERS=vlan,vxlan)
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("segments.type_drivers")
                    .with_list_parse_key("segments.tenant_network_types")
                    .with_list_parse_key("segments.flat_networks")
                    .with_list_parse_key("segments.network_vlan_ranges")
                    .with_list_parse_key("segments.vni_ranges"),
            )
            .build()?
            .try_deserialize()
    }
}
