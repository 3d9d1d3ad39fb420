//! Frame clock shared by every pass of a frame.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WorldTime {
    /// Scaled seconds since the world was created.
    pub elapsed: f64,
    /// Scaled seconds of the current frame.
    pub delta: f64,
    pub time_scale: f64,
    pub frame_count: u64,
}

impl Default for WorldTime {
    fn default() -> Self {
        WorldTime {
            elapsed: 0.0,
            delta: 0.0,
            time_scale: 1.0,
            frame_count: 0,
        }
    }
}

impl WorldTime {
    pub fn with_time_scale(time_scale: f64) -> Self {
        WorldTime {
            time_scale,
            ..Default::default()
        }
    }
}
