use ndarray::{Array2, Array4};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("failed to create session: {0}")]
    Session(String),
    #[error("inference failed: {0}")]
    Inference(String),
    #[error("unexpected model output: {0}")]
    OutputShape(String),
}

/// Seam between the HTTP layer and the model backend. The classifier
/// consumes an NHWC batch of shape (N, 224, 224, 3) and returns one
/// probability per image, shape (N, 1).
pub trait ModelService: Send + Sync + Clone + 'static {
    fn predict(&self, batch: &Array4<f32>) -> Result<Array2<f32>, ModelError>;
}
