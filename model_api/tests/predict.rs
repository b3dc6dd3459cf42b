//! Integration tests: drive the router end to end with a stub model
//! backend, covering the liveness route and the prediction contract.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use model_api::{api_routes, ModelError, ModelService, SharedState};
use ndarray::{Array2, Array4};
use std::sync::Arc;
use tower::ServiceExt;

#[derive(Clone)]
struct StubModelService {
    probability: f32,
}

impl ModelService for StubModelService {
    fn predict(&self, batch: &Array4<f32>) -> Result<Array2<f32>, ModelError> {
        assert_eq!(batch.shape(), &[1, 224, 224, 3]);
        Ok(Array2::from_elem((1, 1), self.probability))
    }
}

#[derive(Clone)]
struct FailingModelService;

impl ModelService for FailingModelService {
    fn predict(&self, _batch: &Array4<f32>) -> Result<Array2<f32>, ModelError> {
        Err(ModelError::Inference("session run failed".into()))
    }
}

fn test_app(probability: f32) -> Router {
    let state = SharedState {
        model_service: Arc::new(StubModelService { probability }),
    };
    api_routes().with_state(state)
}

fn png_image(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
    let img = image::ImageBuffer::<image::Rgb<u8>, Vec<u8>>::from_pixel(
        width,
        height,
        image::Rgb(rgb),
    );
    let mut data = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut data), image::ImageFormat::Png)
        .unwrap();
    data
}

const BOUNDARY: &str = "test-boundary";

fn multipart_body(field_name: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field_name}\"; \
             filename=\"image.png\"\r\nContent-Type: image/png\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn predict_request(field_name: &str, data: &[u8]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/predict")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(field_name, data)))
        .unwrap()
}

async fn response_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 64)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_home_returns_liveness_message() {
    let app = test_app(0.9);
    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json["message"], "ECS Model API with CNN model is running!");
}

#[tokio::test]
async fn test_predict_without_image_field_returns_400() {
    let app = test_app(0.9);
    let response = app
        .oneshot(predict_request("file", &png_image(4, 4, [0, 0, 0])))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = response_json(response).await;
    assert_eq!(json["error"], "No image provided");
}

#[tokio::test]
async fn test_predict_high_probability_yields_one() {
    let app = test_app(0.9);
    let response = app
        .oneshot(predict_request("image", &png_image(32, 32, [200, 10, 10])))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json["statusCode"], 200);
    assert_eq!(
        json["headers"]["Access-Control-Allow-Origin"],
        "*"
    );
    assert_eq!(
        json["headers"]["Access-Control-Allow-Headers"],
        "Content-Type"
    );
    assert_eq!(
        json["headers"]["Access-Control-Allow-Methods"],
        "OPTIONS,POST,GET"
    );

    let body: serde_json::Value =
        serde_json::from_str(json["body"].as_str().unwrap()).unwrap();
    assert_eq!(body["prediction"], 1);
}

#[tokio::test]
async fn test_predict_low_probability_yields_zero() {
    let app = test_app(0.2);
    let response = app
        .oneshot(predict_request("image", &png_image(32, 32, [0, 0, 0])))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    let body: serde_json::Value =
        serde_json::from_str(json["body"].as_str().unwrap()).unwrap();
    assert_eq!(body["prediction"], 0);
}

#[tokio::test]
async fn test_threshold_is_strictly_greater_than() {
    let app = test_app(0.5);
    let response = app
        .oneshot(predict_request("image", &png_image(8, 8, [128, 128, 128])))
        .await
        .unwrap();

    let json = response_json(response).await;
    let body: serde_json::Value =
        serde_json::from_str(json["body"].as_str().unwrap()).unwrap();
    assert_eq!(body["prediction"], 0);
}

#[tokio::test]
async fn test_identical_requests_are_deterministic() {
    let image = png_image(16, 16, [42, 42, 42]);

    let first = test_app(0.7)
        .oneshot(predict_request("image", &image))
        .await
        .unwrap();
    let second = test_app(0.7)
        .oneshot(predict_request("image", &image))
        .await
        .unwrap();

    let first_body = axum::body::to_bytes(first.into_body(), 1024 * 64)
        .await
        .unwrap();
    let second_body = axum::body::to_bytes(second.into_body(), 1024 * 64)
        .await
        .unwrap();
    assert_eq!(first_body, second_body);
}

#[tokio::test]
async fn test_black_pixel_end_to_end_envelope() {
    let app = test_app(0.1);
    let response = app
        .oneshot(predict_request("image", &png_image(1, 1, [0, 0, 0])))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    let body: serde_json::Value =
        serde_json::from_str(json["body"].as_str().unwrap()).unwrap();

    let prediction = body["prediction"].as_i64().unwrap();
    assert!(prediction == 0 || prediction == 1);
}

#[tokio::test]
async fn test_model_failure_returns_500() {
    let state = SharedState {
        model_service: Arc::new(FailingModelService),
    };
    let app = api_routes().with_state(state);

    let response = app
        .oneshot(predict_request("image", &png_image(8, 8, [0, 0, 0])))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = response_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("session run failed"));
}

#[tokio::test]
async fn test_undecodable_upload_returns_400() {
    let app = test_app(0.9);
    let response = app
        .oneshot(predict_request("image", b"definitely not an image"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = response_json(response).await;
    assert!(json["error"].is_string());
}
