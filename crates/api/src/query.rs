//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// `?include_inactive=` flag for listings of deactivatable entities.
///
/// Only honoured for principals allowed to see inactive rows.
#[derive(Debug, Default, Deserialize)]
pub struct IncludeInactiveParams {
    #[serde(default)]
    pub include_inactive: Option<bool>,
}
