use std::path::Path;

use anyhow::{Context, Result, anyhow};
use ort::session::{Session, builder::GraphOptimizationLevel};
use ort::value::Tensor;

use super::{EstimatorError, HandObservation, HandPoseEstimator, ObservedPoint, tensor};
use crate::skeleton::HandJoint;
use crate::types::Frame;

/// Whole-hand confidence below which a frame counts as "no hand".
const DETECTION_FLOOR: f32 = 0.2;

/// Hand landmark estimation backed by a MediaPipe-style ONNX model.
///
/// The model reports one confidence for the whole hand; that score is
/// attached to every joint of the observation.
pub struct OrtHandPoseEstimator {
    session: Session,
}

impl OrtHandPoseEstimator {
    pub fn new(model_path: &Path) -> Result<Self> {
        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(2)?
            .commit_from_file(model_path)
            .with_context(|| {
                format!("failed to load ORT session from {}", model_path.display())
            })?;

        Ok(Self { session })
    }
}

impl HandPoseEstimator for OrtHandPoseEstimator {
    fn estimate(&mut self, frame: &Frame) -> Result<Option<HandObservation>, EstimatorError> {
        let (input, letterbox) = tensor::prepare_frame(frame).map_err(EstimatorError::Prepare)?;
        let input = Tensor::from_array(input)
            .map_err(|err| EstimatorError::Prepare(err.into()))?;

        let outputs = self
            .session
            .run(ort::inputs![input])
            .map_err(|err| EstimatorError::Inference(err.into()))?;
        if outputs.len() < 1 {
            return Err(EstimatorError::Decode(anyhow!("model returned no outputs")));
        }

        let coords = outputs[0]
            .try_extract_array::<f32>()
            .map_err(|err| EstimatorError::Decode(err.into()))?;
        let flat: Vec<f32> = coords.iter().copied().collect();
        let landmarks = tensor::decode_landmarks(&flat).map_err(EstimatorError::Decode)?;

        // The handedness output goes unread; the overlay draws whichever hand
        // the model found.
        let confidence = if outputs.len() > 1 {
            outputs[1]
                .try_extract_array::<f32>()
                .ok()
                .and_then(|arr| arr.iter().next().copied())
                .unwrap_or(0.0)
        } else {
            0.0
        };
        let confidence = confidence.clamp(0.0, 1.0);
        if confidence < DETECTION_FLOOR {
            return Ok(None);
        }

        let mut observation = HandObservation::new();
        for (joint, [x, y, _z]) in HandJoint::ALL.iter().zip(landmarks) {
            let (px, py) = letterbox.unproject(x, y);
            observation.insert(
                *joint,
                ObservedPoint {
                    x: px,
                    y: py,
                    confidence,
                },
            );
        }

        Ok(Some(observation))
    }
}
