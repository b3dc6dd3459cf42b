use crate::{
    encoder::TensorValue,
    model_service::{ModelError, ModelService},
    preprocess::{image_to_tensor, PreprocessError},
    server::SharedState,
};
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::instrument;

/// Lambda-style response wrapper: the prediction travels as a
/// JSON-encoded string in `body`, with CORS metadata alongside it.
#[derive(Serialize)]
pub struct Envelope {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
    pub headers: CorsHeaders,
}

#[derive(Serialize)]
pub struct CorsHeaders {
    #[serde(rename = "Access-Control-Allow-Headers")]
    allow_headers: &'static str,
    #[serde(rename = "Access-Control-Allow-Origin")]
    allow_origin: &'static str,
    #[serde(rename = "Access-Control-Allow-Methods")]
    allow_methods: &'static str,
}

impl Default for CorsHeaders {
    fn default() -> Self {
        Self {
            allow_headers: "Content-Type",
            allow_origin: "*",
            allow_methods: "OPTIONS,POST,GET",
        }
    }
}

#[derive(Error, Debug)]
pub enum PredictError {
    #[error("No image provided")]
    MissingImage,
    #[error("multipart read failed: {0}")]
    Multipart(String),
    #[error("{0}")]
    Preprocess(#[from] PreprocessError),
    #[error("model invocation failed: {0}")]
    Model(#[from] ModelError),
    #[error("response serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl IntoResponse for PredictError {
    fn into_response(self) -> Response {
        let status = match &self {
            PredictError::MissingImage
            | PredictError::Multipart(_)
            | PredictError::Preprocess(_) => StatusCode::BAD_REQUEST,
            PredictError::Model(_) | PredictError::Serialize(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        if status.is_server_error() {
            tracing::error!("prediction failed: {}", self);
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[instrument(skip(state, multipart))]
pub async fn predict<M: ModelService>(
    State(state): State<SharedState<M>>,
    mut multipart: Multipart,
) -> Result<Response, PredictError> {
    let mut image_data = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| PredictError::Multipart(e.to_string()))?
    {
        if field.name() == Some("image") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| PredictError::Multipart(e.to_string()))?;
            image_data = Some(bytes);
            break;
        }
    }
    let image_data = image_data.ok_or(PredictError::MissingImage)?;

    let batch = image_to_tensor(&image_data)?;
    tracing::debug!("image tensor shape: {:?}", batch.shape());

    let probabilities = state.model_service.predict(&batch)?;
    let probability = probabilities
        .first()
        .copied()
        .ok_or_else(|| ModelError::OutputShape("empty prediction output".into()))?;

    let predicted_class = i64::from(probability > 0.5);
    let body = serde_json::to_string(&json!({
        "prediction": TensorValue::Int(predicted_class)
    }))?;

    let envelope = Envelope {
        status_code: 200,
        body,
        headers: CorsHeaders::default(),
    };

    Ok((StatusCode::OK, Json(envelope)).into_response())
}
