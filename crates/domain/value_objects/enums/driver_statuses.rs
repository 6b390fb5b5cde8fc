use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Review state of a driver profile.
#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DriverStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl DriverStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DriverStatus::Pending => "pending",
            DriverStatus::Approved => "approved",
            DriverStatus::Rejected => "rejected",
        }
    }

    pub fn from_str(value: &str) -> Self {
        match value {
            "approved" => DriverStatus::Approved,
            "rejected" => DriverStatus::Rejected,
            _ => DriverStatus::Pending,
        }
    }
}

impl Display for DriverStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
