use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use crates::{
    domain::{
        repositories::{orders::OrderRepository, ratings::RatingRepository},
        value_objects::ratings::CreateRatingModel,
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{orders::OrderPostgres, ratings::RatingPostgres},
    },
};
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    usecases::ratings::{RatingError, RatingUseCase},
};

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let rating_repository = RatingPostgres::new(Arc::clone(&db_pool));
    let order_repository = OrderPostgres::new(Arc::clone(&db_pool));
    let rating_usecase = RatingUseCase::new(Arc::new(rating_repository), Arc::new(order_repository));

    Router::new()
        .route("/", post(create_rating))
        .route("/driver/:driver_id", get(list_driver_ratings))
        .with_state(Arc::new(rating_usecase))
}

pub async fn create_rating<R, O>(
    State(rating_usecase): State<Arc<RatingUseCase<R, O>>>,
    auth: AuthUser,
    Json(create_rating_model): Json<CreateRatingModel>,
) -> Result<impl IntoResponse, RatingError>
where
    R: RatingRepository + Send + Sync + 'static,
    O: OrderRepository + Send + Sync + 'static,
{
    let rating = rating_usecase
        .create_rating(auth.actor(), create_rating_model)
        .await?;
    Ok((StatusCode::CREATED, Json(rating)))
}

pub async fn list_driver_ratings<R, O>(
    State(rating_usecase): State<Arc<RatingUseCase<R, O>>>,
    _auth: AuthUser,
    Path(driver_id): Path<Uuid>,
) -> Result<impl IntoResponse, RatingError>
where
    R: RatingRepository + Send + Sync + 'static,
    O: OrderRepository + Send + Sync + 'static,
{
    let ratings = rating_usecase.list_driver_ratings(driver_id).await?;
    Ok(Json(ratings))
}
