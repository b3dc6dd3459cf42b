mod ort_service;

pub mod app;
pub mod config;
pub mod encoder;
pub mod model_service;
pub mod preprocess;
pub mod routes;
pub mod server;

pub use app::start_app;
pub use encoder::TensorValue;
pub use model_service::{ModelError, ModelService};
pub use ort_service::OrtModelService;
pub use routes::api_routes;
pub use server::{HttpServer, SharedState};
