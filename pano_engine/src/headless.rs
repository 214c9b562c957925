//! Deterministic `SceneSurface` used by the authoring CLI and the test
//! suite. Markers are spheres of the same radius the live renderer uses,
//! so headless hit-testing agrees with on-screen behavior.

use std::collections::BTreeMap;

use glam::Vec3;
use pano_core::angles::{position_from_angles, SphereAngles};

use crate::surface::{MarkerDescriptor, MarkerHandle, MarkerHit, MarkerStyle, Ray, SceneSurface};

/// Radius of a marker sphere in scene units.
pub const MARKER_RADIUS: f32 = 15.0;

#[derive(Debug)]
struct HeadlessMarker {
    position: Vec3,
    visible: bool,
    #[allow(dead_code)]
    style: MarkerStyle,
}

/// In-memory scene with an equirectangular stand-in camera: NDC x sweeps
/// the full yaw range, NDC y the full pitch range, rays originate at the
/// sphere centre.
#[derive(Debug, Default)]
pub struct HeadlessScene {
    markers: BTreeMap<MarkerHandle, HeadlessMarker>,
    next_handle: u64,
}

impl HeadlessScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    pub fn marker_position(&self, handle: MarkerHandle) -> Option<Vec3> {
        self.markers.get(&handle).map(|marker| marker.position)
    }

    pub fn marker_visible(&self, handle: MarkerHandle) -> Option<bool> {
        self.markers.get(&handle).map(|marker| marker.visible)
    }
}

impl SceneSurface for HeadlessScene {
    fn add_marker(&mut self, descriptor: &MarkerDescriptor) -> MarkerHandle {
        self.next_handle += 1;
        let handle = MarkerHandle(self.next_handle);
        self.markers.insert(
            handle,
            HeadlessMarker {
                position: descriptor.position,
                visible: descriptor.visible,
                style: descriptor.style.clone(),
            },
        );
        handle
    }

    fn remove_marker(&mut self, handle: MarkerHandle) {
        self.markers.remove(&handle);
    }

    fn set_marker_position(&mut self, handle: MarkerHandle, position: Vec3) {
        if let Some(marker) = self.markers.get_mut(&handle) {
            marker.position = position;
        }
    }

    fn set_marker_visible(&mut self, handle: MarkerHandle, visible: bool) {
        if let Some(marker) = self.markers.get_mut(&handle) {
            marker.visible = visible;
        }
    }

    fn intersect(&self, ray: Ray) -> Vec<MarkerHit> {
        let dir = ray.dir.normalize_or_zero();
        if dir == Vec3::ZERO {
            return Vec::new();
        }

        let mut hits: Vec<MarkerHit> = self
            .markers
            .iter()
            .filter(|(_, marker)| marker.visible)
            .filter_map(|(handle, marker)| {
                ray_sphere(ray.origin, dir, marker.position, MARKER_RADIUS).map(|distance| {
                    MarkerHit {
                        handle: *handle,
                        distance,
                    }
                })
            })
            .collect();
        hits.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then_with(|| a.handle.cmp(&b.handle))
        });
        hits
    }

    fn pointer_ray(&self, ndc_x: f32, ndc_y: f32) -> Option<Ray> {
        if !ndc_x.is_finite() || !ndc_y.is_finite() {
            return None;
        }
        let angles = SphereAngles::new(ndc_x * 180.0, ndc_y * 90.0);
        Some(Ray::new(Vec3::ZERO, position_from_angles(angles, 1.0)))
    }
}

/// Nearest intersection distance of a ray with a sphere, if any.
fn ray_sphere(origin: Vec3, dir: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let offset = origin - center;
    let half_b = offset.dot(dir);
    let c = offset.length_squared() - radius * radius;
    let discriminant = half_b * half_b - c;
    if discriminant < 0.0 {
        return None;
    }
    let root = discriminant.sqrt();
    let near = -half_b - root;
    let t = if near >= 0.0 { near } else { -half_b + root };
    (t >= 0.0).then_some(t)
}
