use std::{fmt::Display, str::FromStr};

use anyhow::anyhow;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryType {
    Document,
    Box,
    Luggage,
    Valuable,
    Other,
}

impl DeliveryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryType::Document => "document",
            DeliveryType::Box => "box",
            DeliveryType::Luggage => "luggage",
            DeliveryType::Valuable => "valuable",
            DeliveryType::Other => "other",
        }
    }
}

impl Display for DeliveryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeliveryType {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "document" => Ok(DeliveryType::Document),
            "box" => Ok(DeliveryType::Box),
            "luggage" => Ok(DeliveryType::Luggage),
            "valuable" => Ok(DeliveryType::Valuable),
            "other" => Ok(DeliveryType::Other),
            other => Err(anyhow!("unknown delivery type: {other}")),
        }
    }
}
