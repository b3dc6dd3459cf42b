use crate::{
    config::ModelConfig,
    model_service::{ModelError, ModelService},
};
use ndarray::{Array2, Array4, Ix2};
use ort::{
    session::{builder::GraphOptimizationLevel, Session},
    value::TensorRef,
};
use std::sync::{Arc, Mutex};

/// Runs the pretrained binary classifier through an ONNX Runtime
/// session. The session is created once at startup and shared read-only
/// for the process lifetime.
#[derive(Clone)]
pub struct OrtModelService {
    session: Arc<Mutex<Session>>,
    output_name: String,
}

impl OrtModelService {
    pub fn new(model_config: &ModelConfig) -> Result<Self, Box<dyn std::error::Error>> {
        ort::init().commit()?;
        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .commit_from_file(model_config.get_model_path())?;

        let output_name = session
            .outputs
            .first()
            .map(|output| output.name.clone())
            .ok_or_else(|| ModelError::Session("model declares no outputs".into()))?;

        tracing::info!(
            "Created ONNX session from {:?}",
            model_config.get_model_path()
        );

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            output_name,
        })
    }
}

impl ModelService for OrtModelService {
    fn predict(&self, batch: &Array4<f32>) -> Result<Array2<f32>, ModelError> {
        let mut session = self
            .session
            .lock()
            .map_err(|e| ModelError::Inference(format!("session mutex poisoned: {}", e)))?;

        let owned_buffer;
        let input_view = if batch.view().is_standard_layout() {
            batch.view()
        } else {
            owned_buffer = batch.to_owned();
            owned_buffer.view()
        };

        let tensor_ref = TensorRef::from_array_view(input_view)
            .map_err(|e| ModelError::Inference(format!("failed to build tensor: {}", e)))?;

        let input_tensor = ort::inputs![tensor_ref];

        let outputs = session
            .run(input_tensor)
            .map_err(|e| ModelError::Inference(format!("inference failed: {}", e)))?;

        let (shape, data) = outputs[self.output_name.as_str()]
            .try_extract_tensor::<f32>()
            .map_err(|e| ModelError::Inference(format!("failed to extract tensor: {}", e)))?;

        let ix = shape.to_ixdyn();
        let array = ndarray::ArrayD::from_shape_vec(ix, data.to_vec())
            .map_err(|e| ModelError::OutputShape(format!("invalid tensor shape: {}", e)))?;

        array
            .into_dimensionality::<Ix2>()
            .map_err(|e| ModelError::OutputShape(format!("expected (N, 1) output: {}", e)))
    }
}
