use serde::{Deserialize, Serialize};
use std::fmt;

pub const NO_TRUCKS_AVAILABLE: &str = "No available delivery trucks within selected window";
pub const STALE_TELEMETRY: &str = "Telemetry data is stale";

/// Alert codes the allocation API is documented to emit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AlertCode {
    NoTrucksAvailable,
    StaleTelemetry,
    Unrecognized(String),
}

impl AlertCode {
    pub fn parse(code: &str) -> Self {
        match code {
            NO_TRUCKS_AVAILABLE => AlertCode::NoTrucksAvailable,
            STALE_TELEMETRY => AlertCode::StaleTelemetry,
            other => AlertCode::Unrecognized(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            AlertCode::NoTrucksAvailable => NO_TRUCKS_AVAILABLE,
            AlertCode::StaleTelemetry => STALE_TELEMETRY,
            AlertCode::Unrecognized(code) => code,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, AlertCode::Unrecognized(_))
    }

    /// Whether this alert means no delivery can be scheduled at all.
    pub fn blocks_delivery(&self) -> bool {
        matches!(self, AlertCode::NoTrucksAvailable)
    }
}

impl From<String> for AlertCode {
    fn from(code: String) -> Self {
        match AlertCode::parse(&code) {
            AlertCode::Unrecognized(_) => AlertCode::Unrecognized(code),
            known => known,
        }
    }
}

impl From<AlertCode> for String {
    fn from(code: AlertCode) -> Self {
        match code {
            AlertCode::Unrecognized(code) => code,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for AlertCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
