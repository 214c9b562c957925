//! Time-based interpolation across a dynamic hotspot's keyframes.

use thiserror::Error;

use crate::angles::SphereAngles;
use crate::model::Keyframe;

/// Fewer than two keyframes: the caller must treat the marker as not
/// visible rather than surfacing an error to the viewer.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("at least two keyframes are required for interpolation")]
pub struct NotInterpolable;

/// Keep a keyframe sequence time-ascending. The sort is stable, so
/// coincident times retain their authored order.
pub fn sort_keyframes(keyframes: &mut [Keyframe]) {
    keyframes.sort_by(|a, b| a.time.total_cmp(&b.time));
}

/// Linear interpolation between the pair of keyframes bracketing `time`.
///
/// Query times before the first or after the last keyframe hold the
/// boundary sample; no extrapolation is performed. Angles interpolate in
/// raw degrees: a 350°→10° yaw pair travels the long way around rather
/// than crossing the 0° seam.
pub fn interpolate(keyframes: &[Keyframe], time: f64) -> Result<SphereAngles, NotInterpolable> {
    if keyframes.len() < 2 {
        return Err(NotInterpolable);
    }

    let first = &keyframes[0];
    let last = &keyframes[keyframes.len() - 1];
    if time <= first.time {
        return Ok(first.angles());
    }
    if time >= last.time {
        return Ok(last.angles());
    }

    let mut lower = first;
    let mut upper = last;
    for pair in keyframes.windows(2) {
        if pair[0].time <= time && time <= pair[1].time {
            lower = &pair[0];
            upper = &pair[1];
            break;
        }
    }

    let span = upper.time - lower.time;
    let factor = if span > 0.0 {
        ((time - lower.time) / span) as f32
    } else {
        0.0
    };

    Ok(SphereAngles::new(
        lower.yaw + (upper.yaw - lower.yaw) * factor,
        lower.pitch + (upper.pitch - lower.pitch) * factor,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyframe(time: f64, yaw: f32, pitch: f32) -> Keyframe {
        Keyframe {
            time,
            yaw,
            pitch,
            positioned: true,
        }
    }

    fn sample_path() -> Vec<Keyframe> {
        vec![
            keyframe(0.0, 0.0, 0.0),
            keyframe(5.0, 45.0, 10.0),
            keyframe(10.0, 90.0, 0.0),
        ]
    }

    #[test]
    fn too_few_keyframes_are_not_interpolable() {
        assert_eq!(interpolate(&[], 1.0), Err(NotInterpolable));
        assert_eq!(interpolate(&[keyframe(0.0, 1.0, 2.0)], 1.0), Err(NotInterpolable));
    }

    #[test]
    fn midpoint_interpolates_linearly() {
        let angles = interpolate(&sample_path(), 2.5).expect("interpolable");
        assert!((angles.yaw - 22.5).abs() <= 1e-4);
        assert!((angles.pitch - 5.0).abs() <= 1e-4);
    }

    #[test]
    fn queries_clamp_at_both_ends() {
        let path = sample_path();
        let before = interpolate(&path, -3.0).expect("interpolable");
        assert_eq!((before.yaw, before.pitch), (0.0, 0.0));
        let after = interpolate(&path, 99.0).expect("interpolable");
        assert_eq!((after.yaw, after.pitch), (90.0, 0.0));
    }

    #[test]
    fn factor_stays_within_the_bracket() {
        let path = sample_path();
        for tick in 1..50 {
            let time = tick as f64 * 0.2;
            let angles = interpolate(&path, time).expect("interpolable");
            assert!(angles.yaw >= 0.0 && angles.yaw <= 90.0, "yaw {}", angles.yaw);
            assert!(
                angles.pitch >= 0.0 && angles.pitch <= 10.0,
                "pitch {}",
                angles.pitch
            );
        }
    }

    #[test]
    fn coincident_times_step_rather_than_divide_by_zero() {
        let path = vec![
            keyframe(0.0, 0.0, 0.0),
            keyframe(5.0, 40.0, 5.0),
            keyframe(5.0, 80.0, -5.0),
            keyframe(10.0, 90.0, 0.0),
        ];
        // At the duplicate instant the earlier bracket wins.
        let at = interpolate(&path, 5.0).expect("interpolable");
        assert_eq!((at.yaw, at.pitch), (40.0, 5.0));
        // Past it, the later sample takes over.
        let after = interpolate(&path, 7.5).expect("interpolable");
        assert!((after.yaw - 85.0).abs() <= 1e-4);
        assert!((after.pitch + 2.5).abs() <= 1e-4);
    }

    #[test]
    fn sort_orders_by_time() {
        let mut path = vec![
            keyframe(10.0, 90.0, 0.0),
            keyframe(0.0, 0.0, 0.0),
            keyframe(5.0, 45.0, 10.0),
        ];
        sort_keyframes(&mut path);
        let times: Vec<f64> = path.iter().map(|k| k.time).collect();
        assert_eq!(times, vec![0.0, 5.0, 10.0]);
    }
}
