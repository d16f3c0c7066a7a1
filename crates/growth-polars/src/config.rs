//! Column roles of the frames read at the boundary

use serde::{Deserialize, Serialize};

pub use growth_turbidostat::DilutionEventColumns;

/// Columns of a long OD export, one row per reading
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LongColumns {
    pub timestamp: String,
    pub reactor: String,
    pub value: String,
}

impl Default for LongColumns {
    fn default() -> Self {
        Self {
            timestamp: "timestamp".to_string(),
            reactor: "pioreactor_unit".to_string(),
            value: "od_reading".to_string(),
        }
    }
}

/// Keep only event-log rows whose `column` equals `value`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventFilter {
    pub column: String,
    pub value: String,
}

impl Default for EventFilter {
    fn default() -> Self {
        Self {
            column: "event_name".to_string(),
            value: growth_turbidostat::DEFAULT_EVENT_NAME.to_string(),
        }
    }
}

/// Name of the index column in exported frames
pub const TIMESTAMP_COLUMN: &str = "timestamp";
