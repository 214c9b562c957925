//! Core math and data model for spherical video hotspots.
//!
//! Everything here is pure and stateless: angular/Cartesian conversion on
//! the projection sphere, keyframe interpolation, display-window
//! visibility, the persisted hotspot schema, and M:SS timecode text.
//! Stateful orchestration (registry, placement, surface sync) lives in
//! `pano_engine`.

pub mod angles;
pub mod keyframes;
pub mod model;
pub mod timecode;
pub mod visibility;

pub use angles::{angles_from_direction, position_from_angles, SphereAngles, SPHERE_RADIUS};
pub use keyframes::{interpolate, sort_keyframes, NotInterpolable};
pub use model::{
    ContentRef, Hotspot, HotspotDocument, HotspotId, HotspotKind, Keyframe, MarkerKey,
    MAX_KEYFRAME_SLOTS,
};
