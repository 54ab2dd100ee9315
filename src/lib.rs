//! Marker overlays for tracked bodies and hands.
//!
//! Tracking input (body anchors, camera frames), pose estimation, surface
//! ray-casting, and torch hardware sit behind narrow seams; the overlays in
//! this crate turn their output into sphere and cylinder nodes in a
//! renderer-agnostic [`scene::Scene`].

pub mod geom;
pub mod model_download;
pub mod overlay;
pub mod pipeline;
pub mod raycast;
pub mod scene;
pub mod skeleton;
pub mod types;
pub mod vision;

#[cfg(feature = "camera-nokhwa")]
pub mod camera;
#[cfg(feature = "camera-nokhwa")]
pub mod rgba;

pub use overlay::{
    Anchor, AnchorId, BodyAnchor, BodyOverlay, BodyOverlayConfig, FlashToggle, FrameStats,
    HandOverlay, HandOverlayConfig, NoTorch, Torch, TorchError,
};
pub use scene::Scene;
pub use types::Frame;
