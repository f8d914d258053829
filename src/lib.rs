//! Ring Sort - a color-sorting puzzle on a cylinder of blocks
//!
//! Core modules:
//! - `sim`: Deterministic simulation (row reflow, column matching, refills)
//! - `camera`: Pointer rays and block picking
//! - `presenter`: Hand-off of game state to an external renderer
//! - `settings`: Player-facing configuration

pub mod camera;
pub mod presenter;
pub mod settings;
pub mod sim;

pub use camera::{Camera, Ray};
pub use presenter::{LogPresenter, Presenter, Snapshot};
pub use settings::{Difficulty, GridConfig, Settings, SettingsError};

use glam::Vec3;
use std::f32::consts::{PI, TAU};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (one display frame at 60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Grid defaults
    pub const DEFAULT_ROWS: usize = 5;
    pub const DEFAULT_COLS: usize = 20;
    pub const MAX_ROWS: usize = 12;
    pub const MIN_COLS: usize = 3;
    pub const MAX_COLS: usize = 64;

    /// Cylinder geometry
    pub const CYLINDER_RADIUS: f32 = 9.0;
    pub const ROW_SPACING: f32 = 2.5;

    /// Block bounds used for picking (hex prism approximated by a cylinder)
    pub const BLOCK_RADIUS: f32 = 1.5;
    pub const BLOCK_HEIGHT: f32 = 2.0;

    /// Fraction of the remaining angle covered per tick
    pub const ANGLE_SMOOTHING: f32 = 0.2;
    /// Below this the current angle snaps onto the target (radians)
    pub const ANGLE_SETTLE_EPSILON: f32 = 1e-4;

    /// Delay between a column clearing and its refill (500 ms)
    pub const REFILL_DELAY_TICKS: u32 = 30;
    pub const SCORE_PER_MATCH: u64 = 10;

    /// Camera
    pub const CAMERA_FOV_DEGREES: f32 = 60.0;
    pub const CAMERA_NEAR: f32 = 1.0;
    pub const CAMERA_FAR: f32 = 1000.0;
    pub const CAMERA_POSITION: [f32; 3] = [0.0, 10.0, 40.0];
    pub const CAMERA_TARGET: [f32; 3] = [0.0, 10.0, 0.0];
}

/// Normalized angle to [0, 2π)
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Signed shortest rotation from `from` to `to`, in [-π, π)
#[inline]
pub fn shortest_angle_delta(from: f32, to: f32) -> f32 {
    let delta = normalize_angle(to - from);
    if delta >= PI { delta - TAU } else { delta }
}

/// Convert a cylinder coordinate (radius, angle, height) to cartesian.
///
/// Angle 0 faces +Z and grows toward +X.
#[inline]
pub fn cylinder_to_cartesian(radius: f32, angle: f32, y: f32) -> Vec3 {
    Vec3::new(radius * angle.sin(), y, radius * angle.cos())
}

/// Angle of a point around the cylinder axis, in [0, 2π)
#[inline]
pub fn cylinder_angle(pos: Vec3) -> f32 {
    normalize_angle(pos.x.atan2(pos.z))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_angle_range() {
        assert!((normalize_angle(-0.5) - (TAU - 0.5)).abs() < 1e-5);
        assert!((normalize_angle(TAU + 0.25) - 0.25).abs() < 1e-5);
        assert_eq!(normalize_angle(0.0), 0.0);
        assert_eq!(normalize_angle(-1e-9), 0.0);
    }

    #[test]
    fn test_shortest_delta_crosses_seam() {
        // 350° -> 10° is +20°, not -340°
        let d = shortest_angle_delta(350f32.to_radians(), 10f32.to_radians());
        assert!((d - 20f32.to_radians()).abs() < 1e-4);
        let d = shortest_angle_delta(10f32.to_radians(), 350f32.to_radians());
        assert!((d + 20f32.to_radians()).abs() < 1e-4);
    }

    #[test]
    fn test_cylinder_round_trip() {
        let p = cylinder_to_cartesian(9.0, 1.2, 5.0);
        assert!((p.y - 5.0).abs() < 1e-6);
        assert!((cylinder_angle(p) - 1.2).abs() < 1e-5);
        // Angle 0 faces the camera (+Z)
        let front = cylinder_to_cartesian(9.0, 0.0, 0.0);
        assert!((front.z - 9.0).abs() < 1e-6 && front.x.abs() < 1e-6);
    }
}
