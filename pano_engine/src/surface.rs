//! The rendering-surface contract. The engine never reaches into scene
//! internals: it adds/removes/updates markers through this trait and asks
//! it for picking rays, nothing more.

use glam::Vec3;
use pano_core::model::MarkerKey;

/// Opaque handle to a renderer-owned marker visual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MarkerHandle(pub u64);

/// Scene-space picking ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self { origin, dir }
    }
}

/// Visual treatment of a marker. Interaction semantics (pick, hover,
/// click) are identical across styles; the style is a descriptor choice,
/// not a second marker type.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkerStyle {
    Solid { color: [f32; 3] },
    Sprite { texture: String },
}

/// Render-side description of one derived marker. Always re-derivable
/// from the registry; never authoritative.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerDescriptor {
    pub key: MarkerKey,
    pub position: Vec3,
    pub style: MarkerStyle,
    pub visible: bool,
}

/// Intersection record returned by [`SceneSurface::intersect`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerHit {
    pub handle: MarkerHandle,
    pub distance: f32,
}

/// Pointer position in surface-local pixels (origin top-left).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerPosition {
    pub x: f32,
    pub y: f32,
}

/// Pixel extents of the rendering surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceRect {
    pub width: f32,
    pub height: f32,
}

/// Convert a surface-local pointer position into normalized device
/// coordinates (x right, y up, both in [-1, 1]).
pub fn ndc_from_pointer(pointer: PointerPosition, rect: SurfaceRect) -> Option<(f32, f32)> {
    if rect.width <= 0.0 || rect.height <= 0.0 {
        return None;
    }
    let x = (pointer.x / rect.width) * 2.0 - 1.0;
    let y = -((pointer.y / rect.height) * 2.0 - 1.0);
    Some((x, y))
}

/// Contract consumed from the 3D rendering collaborator.
pub trait SceneSurface {
    fn add_marker(&mut self, descriptor: &MarkerDescriptor) -> MarkerHandle;
    fn remove_marker(&mut self, handle: MarkerHandle);
    fn set_marker_position(&mut self, handle: MarkerHandle, position: Vec3);
    fn set_marker_visible(&mut self, handle: MarkerHandle, visible: bool);
    /// All marker intersections along `ray`, ordered nearest-first.
    fn intersect(&self, ray: Ray) -> Vec<MarkerHit>;
    /// Build a picking ray from normalized device coordinates through the
    /// active camera. `None` while the camera is not ready.
    fn pointer_ray(&self, ndc_x: f32, ndc_y: f32) -> Option<Ray>;
}
