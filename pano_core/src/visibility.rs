//! Playback-time gating for markers. Re-evaluated on every time-update
//! tick; pure functions of the hotspot state and the clock.

use crate::model::{Hotspot, HotspotKind};

/// Half-open display window test: visible iff `start <= time < end`. A
/// missing bound removes that side of the constraint.
pub fn window_contains(start: Option<f64>, end: Option<f64>, time: f64) -> bool {
    if let Some(start) = start {
        if time < start {
            return false;
        }
    }
    if let Some(end) = end {
        if time >= end {
            return false;
        }
    }
    true
}

/// Whether `hotspot`'s marker should be visible at playback `time`.
///
/// Dynamic hotspots need a usable keyframe set; once they have one they
/// stay visible across the whole timeline because interpolation clamps at
/// the ends instead of cutting off.
pub fn hotspot_visible(hotspot: &Hotspot, time: f64) -> bool {
    match hotspot.hotspot_type {
        HotspotKind::Static => {
            window_contains(hotspot.display_start_time, hotspot.display_end_time, time)
        }
        HotspotKind::Dynamic => hotspot.keyframes.len() >= 2,
    }
}
