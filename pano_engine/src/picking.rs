//! Resolves pointer input against the registered markers: hover drives a
//! single transient overlay, clicks activate the owning hotspot.

use pano_core::model::{HotspotId, MarkerKey};

use crate::registry::HotspotRegistry;
use crate::surface::{ndc_from_pointer, PointerPosition, Ray, SceneSurface, SurfaceRect};
use crate::sync::SyncBridge;

/// Overlay anchor offset from the pointer, in surface pixels.
const OVERLAY_OFFSET: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerAction {
    Hover,
    Click,
}

/// Hover overlay content anchored near the pointer.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayRequest {
    pub hotspot: HotspotId,
    pub title: String,
    pub library: Option<String>,
    pub anchor_x: f32,
    pub anchor_y: f32,
}

/// What a pointer event resolved to.
#[derive(Debug, Clone, PartialEq)]
pub enum PickOutcome {
    /// Show the hover overlay, replacing any active one.
    ShowOverlay(OverlayRequest),
    /// The pointer left all markers: hide the active overlay.
    HideOverlay,
    /// A marker was clicked: present its hotspot's content.
    Activate(HotspotId),
    /// Nothing to do (miss on click, hover with no overlay up).
    Ignored,
}

/// Pointer-event fan-in for one surface.
#[derive(Debug, Default)]
pub struct PickDispatcher {
    active_overlay: Option<MarkerKey>,
}

impl PickDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_overlay(&self) -> Option<MarkerKey> {
        self.active_overlay
    }

    pub fn dispatch(
        &mut self,
        action: PointerAction,
        pointer: PointerPosition,
        rect: SurfaceRect,
        scene: &dyn SceneSurface,
        bridge: &SyncBridge,
        registry: &HotspotRegistry,
    ) -> PickOutcome {
        let ray = ndc_from_pointer(pointer, rect)
            .and_then(|(ndc_x, ndc_y)| scene.pointer_ray(ndc_x, ndc_y));
        let hit = ray.and_then(|ray| nearest_marker(scene, bridge, ray));

        match (action, hit) {
            (PointerAction::Hover, Some(key)) => {
                let Some(hotspot) = registry.get(key.hotspot_id()) else {
                    // The index invariant makes this unreachable, but a
                    // stale hit must not fabricate an overlay.
                    return PickOutcome::Ignored;
                };
                self.active_overlay = Some(key);
                PickOutcome::ShowOverlay(OverlayRequest {
                    hotspot: hotspot.id,
                    title: hotspot.title.clone(),
                    library: hotspot.content.as_ref().map(|c| c.library.clone()),
                    anchor_x: pointer.x + OVERLAY_OFFSET,
                    anchor_y: pointer.y + OVERLAY_OFFSET,
                })
            }
            (PointerAction::Hover, None) => {
                if self.active_overlay.take().is_some() {
                    PickOutcome::HideOverlay
                } else {
                    PickOutcome::Ignored
                }
            }
            (PointerAction::Click, Some(key)) => PickOutcome::Activate(key.hotspot_id()),
            (PointerAction::Click, None) => PickOutcome::Ignored,
        }
    }
}

/// Nearest registered marker along the ray. Equal distances break toward
/// the lower marker key so overlapping markers pick deterministically.
fn nearest_marker(scene: &dyn SceneSurface, bridge: &SyncBridge, ray: Ray) -> Option<MarkerKey> {
    let mut best: Option<(f32, MarkerKey)> = None;
    for hit in scene.intersect(ray) {
        let Some(key) = bridge.key_for_handle(hit.handle) else {
            continue;
        };
        best = match best {
            None => Some((hit.distance, key)),
            Some((distance, current)) => {
                if hit
                    .distance
                    .total_cmp(&distance)
                    .then_with(|| key.cmp(&current))
                    .is_lt()
                {
                    Some((hit.distance, key))
                } else {
                    Some((distance, current))
                }
            }
        };
    }
    best.map(|(_, key)| key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessScene;
    use crate::placement::PlacementTarget;
    use crate::sync::SurfaceMode;
    use pano_core::angles::SphereAngles;
    use pano_core::model::ContentRef;
    use serde_json::json;

    fn rect() -> SurfaceRect {
        SurfaceRect {
            width: 800.0,
            height: 600.0,
        }
    }

    /// Pointer position whose headless camera ray points at `yaw`/`pitch`.
    fn pointer_at(yaw: f32, pitch: f32) -> PointerPosition {
        PointerPosition {
            x: (yaw / 180.0 + 1.0) / 2.0 * 800.0,
            y: (1.0 - pitch / 90.0) / 2.0 * 600.0,
        }
    }

    fn fixture() -> (HotspotRegistry, HeadlessScene, SyncBridge, HotspotId) {
        let mut registry = HotspotRegistry::new();
        let mut scene = HeadlessScene::new();
        let mut bridge = SyncBridge::new(SurfaceMode::Player);

        let id = registry.create();
        registry
            .commit_placement(
                PlacementTarget::Static(id),
                SphereAngles::new(90.0, 0.0),
                0.0,
            )
            .expect("placement commits");
        registry
            .set_display_window(id, Some(0.0), None)
            .expect("valid window");
        registry
            .assign_content(id, ContentRef::new("text", json!({})))
            .expect("content assigns");
        bridge.rebuild(&registry, &mut scene, 0.0);
        (registry, scene, bridge, id)
    }

    #[test]
    fn hover_over_a_marker_requests_an_overlay() {
        let (registry, scene, bridge, id) = fixture();
        let mut dispatcher = PickDispatcher::new();

        let outcome = dispatcher.dispatch(
            PointerAction::Hover,
            pointer_at(90.0, 0.0),
            rect(),
            &scene,
            &bridge,
            &registry,
        );
        match outcome {
            PickOutcome::ShowOverlay(overlay) => {
                assert_eq!(overlay.hotspot, id);
                assert_eq!(overlay.title, format!("Interaction {id}"));
                assert_eq!(overlay.library.as_deref(), Some("text"));
            }
            other => panic!("expected overlay, got {other:?}"),
        }
        assert!(dispatcher.active_overlay().is_some());
    }

    #[test]
    fn hover_off_the_marker_hides_the_overlay_once() {
        let (registry, scene, bridge, _) = fixture();
        let mut dispatcher = PickDispatcher::new();

        dispatcher.dispatch(
            PointerAction::Hover,
            pointer_at(90.0, 0.0),
            rect(),
            &scene,
            &bridge,
            &registry,
        );
        let away = pointer_at(-90.0, 0.0);
        assert_eq!(
            dispatcher.dispatch(
                PointerAction::Hover,
                away,
                rect(),
                &scene,
                &bridge,
                &registry
            ),
            PickOutcome::HideOverlay
        );
        assert_eq!(
            dispatcher.dispatch(
                PointerAction::Hover,
                away,
                rect(),
                &scene,
                &bridge,
                &registry
            ),
            PickOutcome::Ignored
        );
    }

    #[test]
    fn click_resolves_the_owning_hotspot() {
        let (registry, scene, bridge, id) = fixture();
        let mut dispatcher = PickDispatcher::new();
        assert_eq!(
            dispatcher.dispatch(
                PointerAction::Click,
                pointer_at(90.0, 0.0),
                rect(),
                &scene,
                &bridge,
                &registry
            ),
            PickOutcome::Activate(id)
        );
        assert_eq!(
            dispatcher.dispatch(
                PointerAction::Click,
                pointer_at(-90.0, 0.0),
                rect(),
                &scene,
                &bridge,
                &registry
            ),
            PickOutcome::Ignored
        );
    }

    #[test]
    fn nearest_marker_wins_when_markers_overlap() {
        let (mut registry, mut scene, mut bridge, near) = fixture();
        // A second hotspot on the same bearing; the headless scene keeps
        // both at the projection radius, so distances tie and the lower
        // key must win.
        let far = registry.create();
        registry
            .commit_placement(
                PlacementTarget::Static(far),
                SphereAngles::new(90.0, 0.0),
                0.0,
            )
            .expect("placement commits");
        registry
            .set_display_window(far, Some(0.0), None)
            .expect("valid window");
        registry
            .assign_content(far, ContentRef::new("text", json!({})))
            .expect("content assigns");
        bridge.rebuild(&registry, &mut scene, 0.0);

        let mut dispatcher = PickDispatcher::new();
        assert_eq!(
            dispatcher.dispatch(
                PointerAction::Click,
                pointer_at(90.0, 0.0),
                rect(),
                &scene,
                &bridge,
                &registry
            ),
            PickOutcome::Activate(near)
        );
    }
}
