use std::sync::Arc;

use crates::domain::{
    repositories::{orders::OrderRepository, ratings::RatingRepository},
    value_objects::{
        enums::order_statuses::OrderStatus,
        iam::Actor,
        orders::OrderVisibility,
        ratings::{CreateRatingModel, RatingModel, RatingOutcome},
    },
};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum RatingError {
    #[error("Rating must be between 1 and 5")]
    InvalidRating,
    #[error("Order not found")]
    OrderNotFound,
    #[error("Can only rate completed orders")]
    OrderNotCompleted,
    #[error("Order has no driver assigned")]
    OrderHasNoDriver,
    #[error("Order already rated")]
    AlreadyRated,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl RatingError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            RatingError::InvalidRating
            | RatingError::OrderNotCompleted
            | RatingError::OrderHasNoDriver => StatusCode::BAD_REQUEST,
            RatingError::OrderNotFound => StatusCode::NOT_FOUND,
            RatingError::AlreadyRated => StatusCode::CONFLICT,
            RatingError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, RatingError>;

pub struct RatingUseCase<R, O>
where
    R: RatingRepository + Send + Sync + 'static,
    O: OrderRepository + Send + Sync + 'static,
{
    rating_repository: Arc<R>,
    order_repository: Arc<O>,
}

impl<R, O> RatingUseCase<R, O>
where
    R: RatingRepository + Send + Sync + 'static,
    O: OrderRepository + Send + Sync + 'static,
{
    pub fn new(rating_repository: Arc<R>, order_repository: Arc<O>) -> Self {
        Self {
            rating_repository,
            order_repository,
        }
    }

    /// The customer rates the driver of one of their completed orders, once.
    pub async fn create_rating(
        &self,
        actor: Actor,
        model: CreateRatingModel,
    ) -> UseCaseResult<RatingModel> {
        if !model.is_in_range() {
            warn!(user_id = %actor.user_id, rating = model.rating, "ratings: rating out of range");
            return Err(RatingError::InvalidRating);
        }

        let order_id = model.order_id;
        let order = self
            .order_repository
            .find_by_id(order_id, OrderVisibility::Owner(actor.user_id))
            .await
            .map_err(|err| {
                error!(%order_id, db_error = ?err, "ratings: failed to load order");
                err
            })?
            .ok_or(RatingError::OrderNotFound)?;

        if order.status.parse::<OrderStatus>()? != OrderStatus::Completed {
            warn!(%order_id, order_status = order.status, "ratings: order not completed");
            return Err(RatingError::OrderNotCompleted);
        }

        let driver_id = order.driver_id.ok_or(RatingError::OrderHasNoDriver)?;

        let outcome = self
            .rating_repository
            .create_and_recompute(model.to_entity(actor.user_id, driver_id))
            .await
            .map_err(|err| {
                error!(%order_id, %driver_id, db_error = ?err, "ratings: failed to store rating");
                err
            })?;

        match outcome {
            RatingOutcome::Created(rating) => {
                info!(%order_id, %driver_id, rating = rating.rating, "ratings: driver rated");
                Ok(RatingModel::from(rating))
            }
            RatingOutcome::AlreadyRated => {
                let err = RatingError::AlreadyRated;
                warn!(
                    %order_id,
                    status = err.status_code().as_u16(),
                    "ratings: order already rated"
                );
                Err(err)
            }
        }
    }

    pub async fn list_driver_ratings(&self, driver_id: Uuid) -> UseCaseResult<Vec<RatingModel>> {
        let ratings = self
            .rating_repository
            .list_for_driver(driver_id)
            .await
            .map_err(|err| {
                error!(%driver_id, db_error = ?err, "ratings: failed to list ratings");
                err
            })?;

        Ok(ratings.into_iter().map(RatingModel::from).collect())
    }
}
