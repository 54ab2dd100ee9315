//! Torch (flash) control.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TorchError {
    #[error("no controllable torch on this device")]
    Unavailable,
    #[error("torch hardware rejected the request: {0}")]
    Hardware(String),
}

/// Hardware seam for the camera torch.
pub trait Torch: Send {
    fn set_enabled(&mut self, enabled: bool) -> Result<(), TorchError>;
}

/// Stand-in for platforms without torch access. Every request fails, which
/// exercises the same degradation path real hardware failures take.
pub struct NoTorch;

impl Torch for NoTorch {
    fn set_enabled(&mut self, _enabled: bool) -> Result<(), TorchError> {
        Err(TorchError::Unavailable)
    }
}

/// Owns the desired torch state and flips it on request. The boolean only
/// changes when the hardware call succeeds; failures are logged and the
/// previous state stands.
pub struct FlashToggle {
    torch: Box<dyn Torch>,
    enabled: bool,
}

impl FlashToggle {
    pub fn new(torch: Box<dyn Torch>) -> Self {
        Self {
            torch,
            enabled: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Requests the opposite of the current state. Returns the state after
    /// the attempt, which is unchanged if the hardware refused.
    pub fn toggle(&mut self) -> bool {
        let desired = !self.enabled;
        match self.torch.set_enabled(desired) {
            Ok(()) => {
                self.enabled = desired;
                log::info!("torch {}", if desired { "on" } else { "off" });
            }
            Err(err) => {
                log::warn!("torch switch failed: {err}");
            }
        }
        self.enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct ScriptedTorch {
        fail: bool,
        requests: Arc<Mutex<Vec<bool>>>,
    }

    impl Torch for ScriptedTorch {
        fn set_enabled(&mut self, enabled: bool) -> Result<(), TorchError> {
            self.requests.lock().unwrap().push(enabled);
            if self.fail {
                Err(TorchError::Hardware("lock failed".into()))
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn test_toggle_flips_state_on_success() {
        let mut flash = FlashToggle::new(Box::new(ScriptedTorch {
            fail: false,
            requests: Arc::default(),
        }));
        assert!(!flash.is_enabled());
        assert!(flash.toggle());
        assert!(flash.is_enabled());
        assert!(!flash.toggle());
        assert!(!flash.is_enabled());
    }

    #[test]
    fn test_failed_toggle_keeps_state() {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let mut flash = FlashToggle::new(Box::new(ScriptedTorch {
            fail: true,
            requests: Arc::clone(&requests),
        }));
        assert!(!flash.toggle());
        assert!(!flash.is_enabled());
        assert!(!flash.toggle());
        // Both attempts asked for "on"; the failed first try did not stick.
        assert_eq!(*requests.lock().unwrap(), vec![true, true]);
    }

    #[test]
    fn test_no_torch_reports_unavailable() {
        let mut flash = FlashToggle::new(Box::new(NoTorch));
        assert!(!flash.toggle());
        assert!(!flash.is_enabled());
    }
}
