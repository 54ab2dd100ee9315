pub mod body;
pub mod hand;
pub mod torch;

// Re-exports for convenience
pub use body::{Anchor, AnchorId, BodyAnchor, BodyOverlay, BodyOverlayConfig};
pub use hand::{FrameStats, HandOverlay, HandOverlayConfig};
pub use torch::{FlashToggle, NoTorch, Torch, TorchError};
