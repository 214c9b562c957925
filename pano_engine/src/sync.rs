//! Keeps a rendering surface's markers consistent with the registry. The
//! registry is authoritative; markers are re-derived through the pure
//! functions below whenever hotspot data changes, and refreshed
//! (position/visibility) on every playback tick.

use std::collections::BTreeMap;

use pano_core::angles::{position_from_angles, SphereAngles, SPHERE_RADIUS};
use pano_core::keyframes::interpolate;
use pano_core::model::{Hotspot, HotspotId, HotspotKind, MarkerKey};
use pano_core::visibility::hotspot_visible;

use crate::registry::{HotspotRegistry, RegistryEvent};
use crate::surface::{MarkerDescriptor, MarkerHandle, MarkerStyle, SceneSurface};

pub const STATIC_MARKER_COLOR: [f32; 3] = [1.0, 0.0, 0.0];
pub const INTERPOLATED_MARKER_COLOR: [f32; 3] = [0.0, 1.0, 0.0];
pub const KEYFRAME_MARKER_COLOR: [f32; 3] = [0.0, 0.0, 1.0];

/// Which surface the bridge derives markers for. The runtime player shows
/// one marker per hotspot; the editor previews per-keyframe markers until
/// a dynamic hotspot commits its keyframe set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceMode {
    Player,
    Editor,
}

/// Marker index owner for one surface. Every key in the index resolves to
/// a live hotspot (or hotspot + keyframe); removal cascades happen in the
/// same tick as the registry mutation.
#[derive(Debug)]
pub struct SyncBridge {
    mode: SurfaceMode,
    markers: BTreeMap<MarkerKey, MarkerHandle>,
}

impl SyncBridge {
    pub fn new(mode: SurfaceMode) -> Self {
        Self {
            mode,
            markers: BTreeMap::new(),
        }
    }

    pub fn mode(&self) -> SurfaceMode {
        self.mode
    }

    pub fn handle_for_key(&self, key: MarkerKey) -> Option<MarkerHandle> {
        self.markers.get(&key).copied()
    }

    /// Reverse lookup used by pick resolution. The marker population is
    /// small (a handful per hotspot), so a scan is fine.
    pub fn key_for_handle(&self, handle: MarkerHandle) -> Option<MarkerKey> {
        self.markers
            .iter()
            .find(|(_, candidate)| **candidate == handle)
            .map(|(key, _)| *key)
    }

    pub fn marker_keys(&self) -> impl Iterator<Item = MarkerKey> + '_ {
        self.markers.keys().copied()
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    /// Drain the registry's pending mutations and mirror them onto the
    /// scene. Called by the owning session after every operation, within
    /// the same logical tick.
    pub fn apply_events(
        &mut self,
        registry: &mut HotspotRegistry,
        scene: &mut dyn SceneSurface,
        time: f64,
    ) {
        for event in registry.take_events() {
            match event {
                RegistryEvent::Added(id)
                | RegistryEvent::Retyped { id, .. }
                | RegistryEvent::ContentAssigned(id)
                | RegistryEvent::DisplayWindowChanged(id)
                | RegistryEvent::Interpolated(id) => {
                    self.sync_hotspot(registry, scene, id, time);
                }
                RegistryEvent::Repositioned(target) => {
                    self.sync_hotspot(registry, scene, target.hotspot_id(), time);
                }
                RegistryEvent::Removed(id) => {
                    self.remove_hotspot_markers(scene, id);
                }
                RegistryEvent::DocumentReplaced => {
                    self.rebuild(registry, scene, time);
                }
                // Titles live on the list surface; markers are unaffected.
                RegistryEvent::TitleChanged(_) => {}
            }
        }
    }

    /// Drop every marker and re-derive the full set. Used for the first
    /// load on transport readiness and for document replacement.
    pub fn rebuild(
        &mut self,
        registry: &HotspotRegistry,
        scene: &mut dyn SceneSurface,
        time: f64,
    ) {
        self.clear(scene);
        for hotspot in registry.hotspots() {
            self.add_markers_for(scene, hotspot, time);
        }
    }

    /// Remove every marker from the scene (surface failure, teardown).
    pub fn clear(&mut self, scene: &mut dyn SceneSurface) {
        for (_, handle) in std::mem::take(&mut self.markers) {
            scene.remove_marker(handle);
        }
    }

    /// Per-tick refresh: dynamic markers re-interpolate their position,
    /// every marker re-evaluates visibility.
    pub fn refresh(
        &mut self,
        registry: &HotspotRegistry,
        scene: &mut dyn SceneSurface,
        time: f64,
    ) {
        for (key, handle) in &self.markers {
            let Some(hotspot) = registry.get(key.hotspot_id()) else {
                continue;
            };
            match key {
                MarkerKey::Hotspot(_) => match hotspot.hotspot_type {
                    HotspotKind::Static => {
                        scene.set_marker_visible(*handle, hotspot_visible(hotspot, time));
                    }
                    HotspotKind::Dynamic => match interpolate(&hotspot.keyframes, time) {
                        Ok(angles) => {
                            scene.set_marker_position(
                                *handle,
                                position_from_angles(angles, SPHERE_RADIUS),
                            );
                            scene.set_marker_visible(*handle, true);
                        }
                        // Not interpolable resolves locally to hidden.
                        Err(_) => scene.set_marker_visible(*handle, false),
                    },
                },
                MarkerKey::Keyframe(_, index) => {
                    if let Some(keyframe) = hotspot.keyframes.get(*index) {
                        scene.set_marker_position(
                            *handle,
                            position_from_angles(keyframe.angles(), SPHERE_RADIUS),
                        );
                        scene.set_marker_visible(*handle, true);
                    }
                }
            }
        }
    }

    fn sync_hotspot(
        &mut self,
        registry: &HotspotRegistry,
        scene: &mut dyn SceneSurface,
        id: HotspotId,
        time: f64,
    ) {
        self.remove_hotspot_markers(scene, id);
        if let Some(hotspot) = registry.get(id) {
            self.add_markers_for(scene, hotspot, time);
        }
    }

    fn add_markers_for(&mut self, scene: &mut dyn SceneSurface, hotspot: &Hotspot, time: f64) {
        for descriptor in derive_markers(hotspot, self.mode, time) {
            let handle = scene.add_marker(&descriptor);
            self.markers.insert(descriptor.key, handle);
        }
    }

    fn remove_hotspot_markers(&mut self, scene: &mut dyn SceneSurface, id: HotspotId) {
        let stale: Vec<MarkerKey> = self
            .markers
            .keys()
            .copied()
            .filter(|key| key.hotspot_id() == id)
            .collect();
        for key in stale {
            if let Some(handle) = self.markers.remove(&key) {
                scene.remove_marker(handle);
            }
        }
    }
}

/// Pure derivation of one hotspot's marker set for a surface mode.
pub fn derive_markers(hotspot: &Hotspot, mode: SurfaceMode, time: f64) -> Vec<MarkerDescriptor> {
    match mode {
        SurfaceMode::Player => derive_player_markers(hotspot, time),
        SurfaceMode::Editor => derive_editor_markers(hotspot, time),
    }
}

fn derive_player_markers(hotspot: &Hotspot, time: f64) -> Vec<MarkerDescriptor> {
    // Content loading is fire-and-forget: no descriptor, no marker.
    if hotspot.content.is_none() {
        return Vec::new();
    }

    match hotspot.hotspot_type {
        HotspotKind::Static => match hotspot.angles() {
            Some(angles) => vec![MarkerDescriptor {
                key: MarkerKey::Hotspot(hotspot.id),
                position: position_from_angles(angles, SPHERE_RADIUS),
                style: MarkerStyle::Solid {
                    color: STATIC_MARKER_COLOR,
                },
                visible: hotspot_visible(hotspot, time),
            }],
            None => Vec::new(),
        },
        HotspotKind::Dynamic => {
            let (position, visible) = match interpolate(&hotspot.keyframes, time) {
                Ok(angles) => (position_from_angles(angles, SPHERE_RADIUS), true),
                Err(_) => {
                    let resting = hotspot
                        .keyframes
                        .first()
                        .map(|keyframe| keyframe.angles())
                        .unwrap_or(SphereAngles::new(0.0, 0.0));
                    (position_from_angles(resting, SPHERE_RADIUS), false)
                }
            };
            vec![MarkerDescriptor {
                key: MarkerKey::Hotspot(hotspot.id),
                position,
                style: MarkerStyle::Solid {
                    color: INTERPOLATED_MARKER_COLOR,
                },
                visible,
            }]
        }
    }
}

fn derive_editor_markers(hotspot: &Hotspot, time: f64) -> Vec<MarkerDescriptor> {
    match hotspot.hotspot_type {
        HotspotKind::Static => {
            if !hotspot.positioned {
                return Vec::new();
            }
            match hotspot.angles() {
                Some(angles) => vec![MarkerDescriptor {
                    key: MarkerKey::Hotspot(hotspot.id),
                    position: position_from_angles(angles, SPHERE_RADIUS),
                    style: MarkerStyle::Solid {
                        color: STATIC_MARKER_COLOR,
                    },
                    visible: hotspot_visible(hotspot, time),
                }],
                None => Vec::new(),
            }
        }
        HotspotKind::Dynamic => {
            if hotspot.interpolated {
                // The committed set collapses to a single runtime-style
                // marker in the preview too.
                let Ok(angles) = interpolate(&hotspot.keyframes, time) else {
                    return Vec::new();
                };
                return vec![MarkerDescriptor {
                    key: MarkerKey::Hotspot(hotspot.id),
                    position: position_from_angles(angles, SPHERE_RADIUS),
                    style: MarkerStyle::Solid {
                        color: INTERPOLATED_MARKER_COLOR,
                    },
                    visible: true,
                }];
            }
            hotspot
                .keyframes
                .iter()
                .enumerate()
                .map(|(index, keyframe)| MarkerDescriptor {
                    key: MarkerKey::Keyframe(hotspot.id, index),
                    position: position_from_angles(keyframe.angles(), SPHERE_RADIUS),
                    style: MarkerStyle::Solid {
                        color: KEYFRAME_MARKER_COLOR,
                    },
                    visible: true,
                })
                .collect()
        }
    }
}
