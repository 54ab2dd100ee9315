//! Hand pose estimation seam.
//!
//! The overlay treats the estimator as a black box behind
//! [`HandPoseEstimator`]; the shipped backend wraps a MediaPipe-style hand
//! landmark model through ONNX Runtime (see [`ort`]).

mod ort;
mod tensor;

pub use ort::OrtHandPoseEstimator;
pub use tensor::{INPUT_SIZE, Letterbox, NUM_LANDMARKS};

use std::collections::HashMap;

use thiserror::Error;

use crate::skeleton::HandJoint;
use crate::types::Frame;

/// One joint sighting in image space. Coordinates are pixels in the source
/// frame; confidence is in [0, 1].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObservedPoint {
    pub x: f32,
    pub y: f32,
    pub confidence: f32,
}

/// Per-joint 2D locations for a single detected hand.
#[derive(Clone, Debug, Default)]
pub struct HandObservation {
    points: HashMap<HandJoint, ObservedPoint>,
}

impl HandObservation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, joint: HandJoint, point: ObservedPoint) {
        self.points.insert(joint, point);
    }

    pub fn point(&self, joint: HandJoint) -> Option<ObservedPoint> {
        self.points.get(&joint).copied()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum EstimatorError {
    #[error("failed to prepare frame for inference")]
    Prepare(#[source] anyhow::Error),
    #[error("model inference failed")]
    Inference(#[source] anyhow::Error),
    #[error("model output did not decode")]
    Decode(#[source] anyhow::Error),
}

/// Single-hand, best-effort pose estimation over an RGBA frame.
///
/// `Ok(None)` means the frame was processed but no hand cleared the
/// detection floor; it is not an error.
pub trait HandPoseEstimator: Send + 'static {
    fn estimate(&mut self, frame: &Frame) -> Result<Option<HandObservation>, EstimatorError>;
}
