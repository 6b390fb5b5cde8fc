use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    entities::orders::{InsertOrderEntity, OrderEntity},
    value_objects::{
        enums::{
            delivery_types::DeliveryType, order_statuses::OrderStatus, order_types::OrderType,
            user_roles::UserRole,
        },
        fares::FareQuote,
        iam::Actor,
    },
};

pub const SCHEDULED_DATE_FORMAT: &str = "%d.%m.%Y";
pub const MIN_PASSENGERS: i32 = 1;
pub const MAX_PASSENGERS: i32 = 4;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderValidationError {
    #[error("From and To regions must be different")]
    SameRegion,
    #[error("Invalid date format, use DD.MM.YYYY")]
    InvalidScheduledDate,
    #[error("Passenger count must be between 1 and 4")]
    InvalidPassengerCount,
    #[error("{0} is required")]
    MissingField(&'static str),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderModel {
    pub id: Uuid,
    pub user_id: Uuid,
    pub driver_id: Option<Uuid>,
    pub order_type: OrderType,
    pub status: OrderStatus,
    pub customer_name: String,
    pub customer_phone: String,
    pub recipient_phone: Option<String>,
    pub from_region_id: i64,
    pub from_district_id: i64,
    pub from_latitude: Option<f64>,
    pub from_longitude: Option<f64>,
    pub from_address: Option<String>,
    pub to_region_id: i64,
    pub to_district_id: i64,
    pub to_latitude: Option<f64>,
    pub to_longitude: Option<f64>,
    pub to_address: Option<String>,
    pub passenger_count: Option<i32>,
    pub delivery_type: Option<DeliveryType>,
    pub scheduled_date: NaiveDate,
    pub time_range_start: String,
    pub time_range_end: String,
    pub price: BigDecimal,
    pub service_fee: BigDecimal,
    pub discount_percentage: BigDecimal,
    pub final_price: BigDecimal,
    pub notes: Option<String>,
    pub cancellation_reason: Option<String>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub accept_deadline: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<OrderEntity> for OrderModel {
    type Error = anyhow::Error;

    fn try_from(entity: OrderEntity) -> Result<Self, Self::Error> {
        let delivery_type = entity
            .delivery_type
            .as_deref()
            .map(str::parse::<DeliveryType>)
            .transpose()?;

        Ok(Self {
            id: entity.id,
            user_id: entity.user_id,
            driver_id: entity.driver_id,
            order_type: entity.order_type.parse()?,
            status: entity.status.parse()?,
            customer_name: entity.customer_name,
            customer_phone: entity.customer_phone,
            recipient_phone: entity.recipient_phone,
            from_region_id: entity.from_region_id,
            from_district_id: entity.from_district_id,
            from_latitude: entity.from_latitude,
            from_longitude: entity.from_longitude,
            from_address: entity.from_address,
            to_region_id: entity.to_region_id,
            to_district_id: entity.to_district_id,
            to_latitude: entity.to_latitude,
            to_longitude: entity.to_longitude,
            to_address: entity.to_address,
            passenger_count: entity.passenger_count,
            delivery_type,
            scheduled_date: entity.scheduled_date,
            time_range_start: entity.time_range_start,
            time_range_end: entity.time_range_end,
            price: entity.price,
            service_fee: entity.service_fee,
            discount_percentage: entity.discount_percentage,
            final_price: entity.final_price,
            notes: entity.notes,
            cancellation_reason: entity.cancellation_reason,
            accepted_at: entity.accepted_at,
            accept_deadline: entity.accept_deadline,
            completed_at: entity.completed_at,
            cancelled_at: entity.cancelled_at,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        })
    }
}

/// Fields shared by taxi and delivery order requests.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderDetailsModel {
    pub customer_name: String,
    pub customer_phone: String,
    pub from_region_id: i64,
    pub from_district_id: i64,
    #[serde(default)]
    pub from_latitude: Option<f64>,
    #[serde(default)]
    pub from_longitude: Option<f64>,
    #[serde(default)]
    pub from_address: Option<String>,
    pub to_region_id: i64,
    pub to_district_id: i64,
    #[serde(default)]
    pub to_latitude: Option<f64>,
    #[serde(default)]
    pub to_longitude: Option<f64>,
    #[serde(default)]
    pub to_address: Option<String>,
    pub scheduled_date: String,
    pub time_range_start: String,
    pub time_range_end: String,
    #[serde(default)]
    pub notes: Option<String>,
}

impl OrderDetailsModel {
    /// Checks the route and schedule and returns the parsed date.
    pub fn validate(&self) -> Result<NaiveDate, OrderValidationError> {
        if self.from_region_id == self.to_region_id {
            return Err(OrderValidationError::SameRegion);
        }
        require("customer_name", &self.customer_name)?;
        require("customer_phone", &self.customer_phone)?;
        require("time_range_start", &self.time_range_start)?;
        require("time_range_end", &self.time_range_end)?;

        NaiveDate::parse_from_str(self.scheduled_date.trim(), SCHEDULED_DATE_FORMAT)
            .map_err(|_| OrderValidationError::InvalidScheduledDate)
    }

    pub fn to_entity(
        &self,
        user_id: Uuid,
        order_type: OrderType,
        scheduled_date: NaiveDate,
        fare: &FareQuote,
        accept_deadline: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> InsertOrderEntity {
        InsertOrderEntity {
            user_id,
            order_type: order_type.to_string(),
            status: OrderStatus::Pending.to_string(),
            customer_name: self.customer_name.trim().to_string(),
            customer_phone: self.customer_phone.trim().to_string(),
            recipient_phone: None,
            from_region_id: self.from_region_id,
            from_district_id: self.from_district_id,
            from_latitude: self.from_latitude,
            from_longitude: self.from_longitude,
            from_address: self.from_address.clone(),
            to_region_id: self.to_region_id,
            to_district_id: self.to_district_id,
            to_latitude: self.to_latitude,
            to_longitude: self.to_longitude,
            to_address: self.to_address.clone(),
            passenger_count: None,
            delivery_type: None,
            scheduled_date,
            time_range_start: self.time_range_start.clone(),
            time_range_end: self.time_range_end.clone(),
            price: fare.price.clone(),
            service_fee: fare.service_fee.clone(),
            discount_percentage: fare.discount_percentage.clone(),
            final_price: fare.final_price.clone(),
            notes: self.notes.clone(),
            accept_deadline: Some(accept_deadline),
            created_at: now,
            updated_at: now,
        }
    }
}

fn require(field: &'static str, value: &str) -> Result<(), OrderValidationError> {
    if value.trim().is_empty() {
        return Err(OrderValidationError::MissingField(field));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateTaxiOrderModel {
    #[serde(flatten)]
    pub details: OrderDetailsModel,
    pub passenger_count: i32,
}

impl CreateTaxiOrderModel {
    pub fn validate(&self) -> Result<NaiveDate, OrderValidationError> {
        if !(MIN_PASSENGERS..=MAX_PASSENGERS).contains(&self.passenger_count) {
            return Err(OrderValidationError::InvalidPassengerCount);
        }
        self.details.validate()
    }

    pub fn to_entity(
        &self,
        user_id: Uuid,
        scheduled_date: NaiveDate,
        fare: &FareQuote,
        accept_deadline: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> InsertOrderEntity {
        InsertOrderEntity {
            passenger_count: Some(self.passenger_count),
            ..self.details.to_entity(
                user_id,
                OrderType::Taxi,
                scheduled_date,
                fare,
                accept_deadline,
                now,
            )
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateDeliveryOrderModel {
    #[serde(flatten)]
    pub details: OrderDetailsModel,
    pub recipient_phone: String,
    pub delivery_type: DeliveryType,
}

impl CreateDeliveryOrderModel {
    pub fn validate(&self) -> Result<NaiveDate, OrderValidationError> {
        let scheduled_date = self.details.validate()?;
        require("recipient_phone", &self.recipient_phone)?;
        Ok(scheduled_date)
    }

    pub fn to_entity(
        &self,
        user_id: Uuid,
        scheduled_date: NaiveDate,
        fare: &FareQuote,
        accept_deadline: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> InsertOrderEntity {
        InsertOrderEntity {
            recipient_phone: Some(self.recipient_phone.trim().to_string()),
            delivery_type: Some(self.delivery_type.to_string()),
            ..self.details.to_entity(
                user_id,
                OrderType::Delivery,
                scheduled_date,
                fare,
                accept_deadline,
                now,
            )
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CancelOrderModel {
    pub reason: String,
}

/// Which orders a caller may read by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderVisibility {
    Any,
    Owner(Uuid),
}

impl OrderVisibility {
    pub fn for_actor(actor: &Actor) -> Self {
        match actor.role {
            UserRole::User => OrderVisibility::Owner(actor.user_id),
            UserRole::Driver | UserRole::Admin | UserRole::SuperAdmin => OrderVisibility::Any,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct NewOrdersFilter {
    #[serde(default, rename = "type")]
    pub order_type: Option<OrderType>,
    #[serde(default, rename = "from_region")]
    pub from_region_id: Option<i64>,
    #[serde(default, rename = "to_region")]
    pub to_region_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct MyOrdersFilter {
    #[serde(default)]
    pub status: Option<OrderStatus>,
    #[serde(default, rename = "type")]
    pub order_type: Option<OrderType>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DriverOrdersFilter {
    #[serde(default)]
    pub status: Option<OrderStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details() -> OrderDetailsModel {
        OrderDetailsModel {
            customer_name: "Aziz".to_string(),
            customer_phone: "+998901234567".to_string(),
            from_region_id: 1,
            from_district_id: 11,
            from_latitude: None,
            from_longitude: None,
            from_address: None,
            to_region_id: 2,
            to_district_id: 21,
            to_latitude: None,
            to_longitude: None,
            to_address: None,
            scheduled_date: "25.12.2026".to_string(),
            time_range_start: "08:00".to_string(),
            time_range_end: "10:00".to_string(),
            notes: None,
        }
    }

    #[test]
    fn parses_day_month_year_dates() {
        let date = details().validate().unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2026, 12, 25).unwrap());
    }

    #[test]
    fn rejects_iso_dates() {
        let mut model = details();
        model.scheduled_date = "2026-12-25".to_string();

        assert_eq!(model.validate(), Err(OrderValidationError::InvalidScheduledDate));
    }

    #[test]
    fn rejects_same_region_route() {
        let mut model = details();
        model.to_region_id = model.from_region_id;

        assert_eq!(model.validate(), Err(OrderValidationError::SameRegion));
    }

    #[test]
    fn rejects_blank_customer_phone() {
        let mut model = details();
        model.customer_phone = "  ".to_string();

        assert_eq!(
            model.validate(),
            Err(OrderValidationError::MissingField("customer_phone"))
        );
    }

    #[test]
    fn passenger_count_must_be_one_to_four() {
        for count in [0, 5, -1] {
            let model = CreateTaxiOrderModel {
                details: details(),
                passenger_count: count,
            };
            assert_eq!(model.validate(), Err(OrderValidationError::InvalidPassengerCount));
        }

        let model = CreateTaxiOrderModel {
            details: details(),
            passenger_count: 4,
        };
        assert!(model.validate().is_ok());
    }

    #[test]
    fn delivery_request_deserializes_flat_json() {
        let model: CreateDeliveryOrderModel = serde_json::from_value(serde_json::json!({
            "customer_name": "Aziz",
            "customer_phone": "+998901234567",
            "recipient_phone": "+998907654321",
            "delivery_type": "document",
            "from_region_id": 1,
            "from_district_id": 11,
            "to_region_id": 2,
            "to_district_id": 21,
            "scheduled_date": "01.11.2026",
            "time_range_start": "09:00",
            "time_range_end": "12:00"
        }))
        .unwrap();

        assert_eq!(model.delivery_type, DeliveryType::Document);
        assert_eq!(model.details.to_region_id, 2);
        assert!(model.validate().is_ok());
    }

    #[test]
    fn customers_only_see_their_own_orders() {
        let user_id = Uuid::new_v4();

        assert_eq!(
            OrderVisibility::for_actor(&Actor::new(user_id, UserRole::User)),
            OrderVisibility::Owner(user_id)
        );
        assert_eq!(
            OrderVisibility::for_actor(&Actor::new(user_id, UserRole::Driver)),
            OrderVisibility::Any
        );
    }
}
