use std::sync::Arc;

use bigdecimal::{BigDecimal, Zero};
use crates::domain::{
    repositories::pricing::PricingRepository,
    value_objects::fares::{FareQuote, RouteTariff, compute_delivery_fare, compute_fare},
};
use thiserror::Error;
use tracing::{debug, error, warn};

#[derive(Debug, Error)]
pub enum PricingError {
    #[error("Pricing not configured for this route")]
    NotConfigured {
        from_region_id: i64,
        to_region_id: i64,
    },
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl PricingError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            PricingError::NotConfigured { .. } => StatusCode::BAD_REQUEST,
            PricingError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Looks up route tariff and passenger discount, then prices the trip.
pub struct FareCalculator<P>
where
    P: PricingRepository + Send + Sync + 'static,
{
    pricing_repository: Arc<P>,
}

impl<P> FareCalculator<P>
where
    P: PricingRepository + Send + Sync + 'static,
{
    pub fn new(pricing_repository: Arc<P>) -> Self {
        Self { pricing_repository }
    }

    pub async fn compute_taxi_fare(
        &self,
        from_region_id: i64,
        to_region_id: i64,
        passenger_count: i32,
    ) -> Result<FareQuote, PricingError> {
        let tariff = self.route_tariff(from_region_id, to_region_id).await?;

        let discount = self
            .pricing_repository
            .find_discount(passenger_count)
            .await
            .map_err(|err| {
                error!(
                    passenger_count,
                    db_error = ?err,
                    "pricing: failed to load discount"
                );
                err
            })?
            .map(|discount| discount.discount_percentage)
            .unwrap_or_else(BigDecimal::zero);

        let quote = compute_fare(&tariff, passenger_count, &discount);
        debug!(
            from_region_id,
            to_region_id,
            passenger_count,
            final_price = %quote.final_price,
            "pricing: taxi fare computed"
        );

        Ok(quote)
    }

    pub async fn compute_delivery_fare(
        &self,
        from_region_id: i64,
        to_region_id: i64,
    ) -> Result<FareQuote, PricingError> {
        let tariff = self.route_tariff(from_region_id, to_region_id).await?;

        let quote = compute_delivery_fare(&tariff);
        debug!(
            from_region_id,
            to_region_id,
            final_price = %quote.final_price,
            "pricing: delivery fare computed"
        );

        Ok(quote)
    }

    async fn route_tariff(
        &self,
        from_region_id: i64,
        to_region_id: i64,
    ) -> Result<RouteTariff, PricingError> {
        let pricing = self
            .pricing_repository
            .find_route_tariff(from_region_id, to_region_id)
            .await
            .map_err(|err| {
                error!(
                    from_region_id,
                    to_region_id,
                    db_error = ?err,
                    "pricing: failed to load route tariff"
                );
                err
            })?;

        match pricing {
            Some(pricing) => Ok(RouteTariff::from(&pricing)),
            None => {
                warn!(from_region_id, to_region_id, "pricing: route not configured");
                Err(PricingError::NotConfigured {
                    from_region_id,
                    to_region_id,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::test_support::{dec, discount, tariff};
    use crates::domain::repositories::pricing::MockPricingRepository;
    use mockall::predicate::eq;

    #[tokio::test]
    async fn prices_tashkent_to_samarkand_for_two_passengers() {
        let mut pricing_repo = MockPricingRepository::new();

        pricing_repo
            .expect_find_route_tariff()
            .with(eq(1), eq(2))
            .returning(|_, _| Box::pin(async { Ok(Some(tariff(1, 2))) }));
        pricing_repo
            .expect_find_discount()
            .with(eq(2))
            .returning(|_| Box::pin(async { Ok(Some(discount(2, "10"))) }));

        let calculator = FareCalculator::new(Arc::new(pricing_repo));
        let quote = calculator.compute_taxi_fare(1, 2, 2).await.unwrap();

        assert_eq!(quote.price, dec("170000"));
        assert_eq!(quote.discount_percentage, dec("10"));
        assert_eq!(quote.service_fee, dec("22950"));
        assert_eq!(quote.final_price, dec("175950"));
    }

    #[tokio::test]
    async fn missing_discount_row_means_no_discount() {
        let mut pricing_repo = MockPricingRepository::new();

        pricing_repo
            .expect_find_route_tariff()
            .returning(|_, _| Box::pin(async { Ok(Some(tariff(1, 2))) }));
        pricing_repo
            .expect_find_discount()
            .returning(|_| Box::pin(async { Ok(None) }));

        let calculator = FareCalculator::new(Arc::new(pricing_repo));
        let quote = calculator.compute_taxi_fare(1, 2, 3).await.unwrap();

        assert_eq!(quote.price, dec("175000"));
        assert!(quote.discount_percentage.is_zero());
    }

    #[tokio::test]
    async fn unknown_route_is_a_client_error() {
        let mut pricing_repo = MockPricingRepository::new();

        pricing_repo
            .expect_find_route_tariff()
            .returning(|_, _| Box::pin(async { Ok(None) }));
        pricing_repo.expect_find_discount().never();

        let calculator = FareCalculator::new(Arc::new(pricing_repo));
        let err = calculator.compute_taxi_fare(1, 9, 1).await.unwrap_err();

        assert!(matches!(err, PricingError::NotConfigured { .. }));
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn delivery_never_reads_the_discount_table() {
        let mut pricing_repo = MockPricingRepository::new();

        pricing_repo
            .expect_find_route_tariff()
            .returning(|_, _| Box::pin(async { Ok(Some(tariff(1, 2))) }));
        pricing_repo.expect_find_discount().never();

        let calculator = FareCalculator::new(Arc::new(pricing_repo));
        let quote = calculator.compute_delivery_fare(1, 2).await.unwrap();

        assert_eq!(quote.price, dec("165000"));
        assert!(quote.discount_percentage.is_zero());
    }
}
