// Application state module
// Immutable state shared by every connection task

use super::types::Config;
use super::ConfigError;
use crate::routing::RouteTable;

/// Application state
#[derive(Debug)]
pub struct AppState {
    pub config: Config,
    pub routes: RouteTable,
}

impl AppState {
    /// Build the route table from `config`
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        let routes = RouteTable::from_config(&config)?;
        Ok(Self { config, routes })
    }

    /// State with an explicit route table
    pub const fn with_routes(config: Config, routes: RouteTable) -> Self {
        Self { config, routes }
    }
}
