//! Conversion between angular coordinates on the video sphere and 3D
//! scene space. Yaw spins around the vertical axis (0° faces +Z), pitch
//! tilts toward the poles; both are expressed in degrees.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Radius of the projection sphere shared with the panoramic renderer.
/// Markers placed at any other distance visually detach from the video
/// sphere surface.
pub const SPHERE_RADIUS: f32 = 500.0;

/// A direction on the sphere as a yaw/pitch pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SphereAngles {
    pub yaw: f32,
    pub pitch: f32,
}

impl SphereAngles {
    pub fn new(yaw: f32, pitch: f32) -> Self {
        Self { yaw, pitch }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DirectionError {
    #[error("direction vector has zero length")]
    ZeroLength,
}

/// Project a yaw/pitch pair onto the point `distance` units from the
/// sphere centre.
pub fn position_from_angles(angles: SphereAngles, distance: f32) -> Vec3 {
    let yaw = angles.yaw.to_radians();
    let pitch = angles.pitch.to_radians();
    Vec3::new(
        distance * yaw.sin() * pitch.cos(),
        distance * pitch.sin(),
        distance * yaw.cos() * pitch.cos(),
    )
}

/// Recover the yaw/pitch pair for a scene-space direction. The input does
/// not need unit length, but a zero-length vector has no direction.
pub fn angles_from_direction(direction: Vec3) -> Result<SphereAngles, DirectionError> {
    if direction.length_squared() <= f32::EPSILON {
        return Err(DirectionError::ZeroLength);
    }
    let yaw = direction.x.atan2(direction.z).to_degrees();
    let horizontal = (direction.x * direction.x + direction.z * direction.z).sqrt();
    let pitch = direction.y.atan2(horizontal).to_degrees();
    Ok(SphereAngles::new(yaw, pitch))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-3;

    fn wrap_degrees(value: f32) -> f32 {
        value.rem_euclid(360.0)
    }

    fn assert_angles_close(actual: SphereAngles, expected: SphereAngles) {
        let yaw_delta = (wrap_degrees(actual.yaw) - wrap_degrees(expected.yaw)).abs();
        let yaw_delta = yaw_delta.min(360.0 - yaw_delta);
        assert!(
            yaw_delta <= EPSILON,
            "yaw {} != {}",
            actual.yaw,
            expected.yaw
        );
        assert!(
            (actual.pitch - expected.pitch).abs() <= EPSILON,
            "pitch {} != {}",
            actual.pitch,
            expected.pitch
        );
    }

    #[test]
    fn yaw_180_faces_negative_z() {
        let position = position_from_angles(SphereAngles::new(180.0, 0.0), SPHERE_RADIUS);
        assert!((position.x - 0.0).abs() <= 1e-2);
        assert!((position.y - 0.0).abs() <= 1e-2);
        assert!((position.z + SPHERE_RADIUS).abs() <= 1e-2);
    }

    #[test]
    fn positive_pitch_rises() {
        let position = position_from_angles(SphereAngles::new(0.0, 90.0), SPHERE_RADIUS);
        assert!((position.y - SPHERE_RADIUS).abs() <= 1e-2);
    }

    #[test]
    fn round_trip_reproduces_angles() {
        for yaw_step in 0..12 {
            for pitch_step in -5..=5 {
                let yaw = yaw_step as f32 * 30.0;
                let pitch = pitch_step as f32 * 15.0;
                let position = position_from_angles(SphereAngles::new(yaw, pitch), SPHERE_RADIUS);
                let recovered = angles_from_direction(position).expect("non-zero direction");
                assert_angles_close(recovered, SphereAngles::new(yaw, pitch));
            }
        }
    }

    #[test]
    fn round_trip_holds_at_the_poles() {
        for pitch in [90.0_f32, -90.0] {
            let position = position_from_angles(SphereAngles::new(45.0, pitch), SPHERE_RADIUS);
            let recovered = angles_from_direction(position).expect("non-zero direction");
            // Yaw is degenerate at the poles; only pitch survives.
            assert!((recovered.pitch - pitch).abs() <= EPSILON);
        }
    }

    #[test]
    fn round_trip_is_distance_independent() {
        let angles = SphereAngles::new(222.5, -30.0);
        for distance in [1.0_f32, 42.0, SPHERE_RADIUS] {
            let position = position_from_angles(angles, distance);
            let recovered = angles_from_direction(position).expect("non-zero direction");
            assert_angles_close(recovered, angles);
        }
    }

    #[test]
    fn zero_direction_is_rejected() {
        assert_eq!(
            angles_from_direction(Vec3::ZERO),
            Err(DirectionError::ZeroLength)
        );
    }
}
