use crate::{model_service::ModelService, server::SharedState};
use axum::{
    routing::{get, post},
    Router,
};

mod health;
mod predict;

pub use predict::{Envelope, PredictError};

pub fn api_routes<M: ModelService>() -> Router<SharedState<M>> {
    Router::new()
        .route("/", get(health::home))
        .route("/predict", post(predict::predict::<M>))
}
