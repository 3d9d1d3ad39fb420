//! End-of-frame destruction.

use log::debug;

use crate::error::EngineResult;
use crate::world::World;

/// Finalize everything queued for destruction during the frame.
///
/// Runs after rendering, so nothing disappears while a frame is drawn.
pub fn flush(world: &mut World) -> EngineResult<usize> {
    let finalized = world.flush_destroyed()?;
    if finalized > 0 {
        debug!("end of frame: {} objects destroyed", finalized);
    }
    Ok(finalized)
}
