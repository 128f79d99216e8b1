use crate::error::{EngineError, Result};
use crate::kernel::Kernel;
use crate::shape::Shape;

/// Volume of a boolean result that must not be negative.
///
/// # Errors
///
/// Returns [`EngineError::NegativeVolume`] naming `stage` if the kernel
/// reports a negative volume.
pub fn non_negative_volume<K: Kernel>(kernel: &K, shape: &Shape, stage: &'static str) -> Result<f64> {
    let volume = kernel.volume_of(shape);
    if volume < 0.0 {
        return Err(EngineError::NegativeVolume { stage, volume }.into());
    }
    Ok(volume)
}
