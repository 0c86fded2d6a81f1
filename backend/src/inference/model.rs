use ndarray::Array4;
use std::path::Path;
use tch::nn::ModuleT;
use tch::{CModule, Device, Kind, Tensor, nn};

#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("model error: {0}")]
    Model(#[from] tch::TchError),
    #[error("input tensor is not contiguous")]
    Layout,
    #[error("model produced no output")]
    EmptyOutput,
}

enum Net {
    Scripted(CModule),
    Placeholder {
        // The store owns the weights; it has to outlive the layers.
        #[allow(dead_code)]
        store: nn::VarStore,
        layers: nn::SequentialT,
    },
}

/// Binary deepfake classifier. Loaded once at startup and shared read-only
/// across requests; `infer` is a forward pass only.
pub struct Model {
    net: Net,
    device: Device,
}

impl Model {
    /// Loads the TorchScript artifact at `path`. When the artifact is missing
    /// or fails to load this is not an error: an untrained fixed-architecture
    /// classifier is built instead so the API contract stays intact, with
    /// confidence values that carry no meaning.
    pub fn load(path: &Path, width: u32, height: u32) -> Self {
        let device = Device::cuda_if_available();
        let net = match CModule::load_on_device(path, device) {
            Ok(module) => {
                log::info!("Loaded model artifact from {}", path.display());
                Net::Scripted(module)
            }
            Err(e) => {
                log::warn!(
                    "No usable model artifact at {} ({}). Building placeholder classifier.",
                    path.display(),
                    e
                );
                Self::placeholder(device, width, height)
            }
        };
        Self { net, device }
    }

    /// flatten -> dense(128, relu) -> dropout(0.5) -> dense(64, relu)
    /// -> dense(1, sigmoid), matching the demo fallback architecture.
    fn placeholder(device: Device, width: u32, height: u32) -> Net {
        let store = nn::VarStore::new(device);
        let root = store.root();
        let input_dim = i64::from(height) * i64::from(width) * 3;
        let layers = nn::seq_t()
            .add_fn(|xs| xs.flatten(1, -1))
            .add(nn::linear(&root / "fc1", input_dim, 128, Default::default()))
            .add_fn(|xs| xs.relu())
            .add_fn_t(|xs, train| xs.dropout(0.5, train))
            .add(nn::linear(&root / "fc2", 128, 64, Default::default()))
            .add_fn(|xs| xs.relu())
            .add(nn::linear(&root / "out", 64, 1, Default::default()))
            .add_fn(|xs| xs.sigmoid());
        Net::Placeholder { store, layers }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self.net, Net::Placeholder { .. })
    }

    /// Runs a single forward pass and returns the scalar confidence.
    /// Wrapped in `no_grad` so no autograd state outlives the call.
    pub fn infer(&self, tensor: &Array4<f32>) -> Result<f32, InferenceError> {
        let data = tensor.as_slice().ok_or(InferenceError::Layout)?;
        let shape: Vec<i64> = tensor.shape().iter().map(|&d| d as i64).collect();

        tch::no_grad(|| {
            let input = Tensor::from_slice(data)
                .view(&shape[..])
                .to_device(self.device);
            let output = match &self.net {
                Net::Scripted(module) => module.forward_t(&input, false),
                Net::Placeholder { layers, .. } => layers.forward_t(&input, false),
            };
            let output_flat = output.to_kind(Kind::Float).view([-1]);
            let num_elements = output_flat.size()[0] as usize;
            if num_elements == 0 {
                return Err(InferenceError::EmptyOutput);
            }
            let mut output_vec = vec![0.0f32; num_elements];
            output_flat.copy_data(&mut output_vec, num_elements);
            Ok(output_vec[0])
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array4;

    fn test_model() -> Model {
        // No artifact at this path, so load falls back to the placeholder.
        Model::load(Path::new("/nonexistent/detector.pt"), 224, 224)
    }

    #[test]
    fn missing_artifact_falls_back_to_placeholder() {
        assert!(test_model().is_placeholder());
    }

    #[test]
    fn placeholder_accepts_standard_shape_and_yields_unit_interval_scalar() {
        let model = test_model();
        let tensor = Array4::<f32>::from_elem((1, 224, 224, 3), 0.5);
        let confidence = model.infer(&tensor).unwrap();
        assert!((0.0..=1.0).contains(&confidence));
    }

    #[test]
    fn inference_is_deterministic_for_identical_input() {
        let model = test_model();
        let tensor = Array4::<f32>::from_elem((1, 224, 224, 3), 0.25);
        let first = model.infer(&tensor).unwrap();
        let second = model.infer(&tensor).unwrap();
        assert_eq!(first, second);
    }
}
