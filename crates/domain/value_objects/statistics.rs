use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::enums::statistics_periods::StatisticsPeriod;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct StatisticsQuery {
    #[serde(default)]
    pub period: StatisticsPeriod,
}

/// Order counters for one driver over a period.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DriverOrderCounts {
    pub total_orders: i64,
    pub completed_orders: i64,
    pub total_earnings: BigDecimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DriverStatisticsModel {
    pub period: StatisticsPeriod,
    pub total_orders: i64,
    pub completed_orders: i64,
    pub total_earnings: BigDecimal,
    pub current_balance: BigDecimal,
    pub average_rating: BigDecimal,
    pub total_ratings: i32,
}
