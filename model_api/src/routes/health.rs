use axum::{response::IntoResponse, response::Json};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
pub struct Liveness {
    message: String,
}

pub async fn home() -> impl IntoResponse {
    Json(Liveness {
        message: "ECS Model API with CNN model is running!".into(),
    })
}
