use bigdecimal::{BigDecimal, RoundingMode, Zero};
use serde::{Deserialize, Serialize};

use crate::domain::entities::pricing::PricingEntity;

/// Money and percentages are stored with two decimal places.
pub const MONEY_SCALE: i64 = 2;

/// Passenger count used when a delivery order is priced off the taxi tariff.
pub const DELIVERY_PASSENGER_COUNT: i32 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTariff {
    pub base_price: BigDecimal,
    pub price_per_person: BigDecimal,
    pub service_fee_percentage: BigDecimal,
}

impl From<&PricingEntity> for RouteTariff {
    fn from(entity: &PricingEntity) -> Self {
        Self {
            base_price: entity.base_price.clone(),
            price_per_person: entity.price_per_person.clone(),
            service_fee_percentage: entity.service_fee.clone(),
        }
    }
}

/// The four price fields persisted on an order.
///
/// `price` is the fare before discount. `final_price` is always
/// `price * (1 - discount_percentage / 100) + service_fee` with every term rounded to cents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FareQuote {
    pub price: BigDecimal,
    pub service_fee: BigDecimal,
    pub discount_percentage: BigDecimal,
    pub final_price: BigDecimal,
}

pub fn round_money(value: &BigDecimal) -> BigDecimal {
    value.with_scale_round(MONEY_SCALE, RoundingMode::HalfUp)
}

pub fn compute_fare(
    tariff: &RouteTariff,
    passenger_count: i32,
    discount_percentage: &BigDecimal,
) -> FareQuote {
    let hundred = BigDecimal::from(100);

    let price = &tariff.base_price + &tariff.price_per_person * BigDecimal::from(passenger_count);
    let price_after_discount =
        round_money(&(&price * (&hundred - discount_percentage) / &hundred));
    let service_fee =
        round_money(&(&price_after_discount * &tariff.service_fee_percentage / &hundred));
    let final_price = &price_after_discount + &service_fee;

    FareQuote {
        price: round_money(&price),
        service_fee,
        discount_percentage: round_money(discount_percentage),
        final_price,
    }
}

/// Delivery orders have no passenger discount.
pub fn compute_delivery_fare(tariff: &RouteTariff) -> FareQuote {
    compute_fare(tariff, DELIVERY_PASSENGER_COUNT, &BigDecimal::zero())
}
