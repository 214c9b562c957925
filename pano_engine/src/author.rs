//! The authoring surface: exposes the operation set over the registry,
//! arbitrates placement, and keeps the live preview markers in step with
//! every edit.

use log::warn;

use pano_core::angles::{angles_from_direction, SphereAngles};
use pano_core::model::{ContentRef, HotspotDocument, HotspotId, HotspotKind};
use pano_core::timecode::parse_mss;

use crate::error::EngineError;
use crate::picking::{PickOutcome, PointerAction};
use crate::placement::{interpolation_ready, PlacementArbiter, PlacementTarget};
use crate::registry::HotspotRegistry;
use crate::surface::{ndc_from_pointer, PointerPosition, SceneSurface, SurfaceRect};
use crate::sync::{SurfaceMode, SyncBridge};
use crate::transport::{PlaybackTransport, TransportEvent};

pub struct AuthorSession<T, S> {
    registry: HotspotRegistry,
    placement: PlacementArbiter,
    bridge: SyncBridge,
    transport: T,
    scene: S,
    ready: bool,
    video_started: bool,
    duration: Option<f64>,
    failure: Option<String>,
}

impl<T, S> AuthorSession<T, S>
where
    T: PlaybackTransport,
    S: SceneSurface,
{
    pub fn new(document: HotspotDocument, transport: T, scene: S) -> Self {
        Self {
            registry: HotspotRegistry::from_document(document),
            placement: PlacementArbiter::new(),
            bridge: SyncBridge::new(SurfaceMode::Editor),
            transport,
            scene,
            ready: false,
            video_started: false,
            duration: None,
            failure: None,
        }
    }

    pub fn registry(&self) -> &HotspotRegistry {
        &self.registry
    }

    pub fn placement(&self) -> &PlacementArbiter {
        &self.placement
    }

    pub fn bridge(&self) -> &SyncBridge {
        &self.bridge
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    pub fn to_document(&self) -> HotspotDocument {
        self.registry.to_document()
    }

    // --- operation set -------------------------------------------------

    /// Create a hotspot with the authoring defaults. Never fails.
    pub fn create_hotspot(&mut self) -> HotspotId {
        let id = self.registry.create();
        self.flush();
        id
    }

    pub fn delete_hotspot(&mut self, id: HotspotId) -> Result<(), EngineError> {
        self.registry.remove(id)?;
        self.flush();
        Ok(())
    }

    pub fn set_hotspot_type(
        &mut self,
        id: HotspotId,
        kind: HotspotKind,
    ) -> Result<(), EngineError> {
        self.registry.retype(id, kind)?;
        self.flush();
        Ok(())
    }

    /// Replace a hotspot's content descriptor. The content-editor panel
    /// downstream re-derives itself from the emitted event.
    pub fn set_content(&mut self, id: HotspotId, content: ContentRef) -> Result<(), EngineError> {
        self.registry.assign_content(id, content)?;
        self.flush();
        Ok(())
    }

    pub fn set_title(
        &mut self,
        id: HotspotId,
        title: impl Into<String>,
    ) -> Result<(), EngineError> {
        self.registry.set_title(id, title)?;
        self.flush();
        Ok(())
    }

    pub fn set_display_window(
        &mut self,
        id: HotspotId,
        start: Option<f64>,
        end: Option<f64>,
    ) -> Result<(), EngineError> {
        self.registry.set_display_window(id, start, end)?;
        self.flush();
        Ok(())
    }

    /// Parse M:SS end-time text from the time input. Invalid text leaves
    /// the stored value untouched so the control can show an inline error
    /// next to the prior value.
    pub fn set_end_time_text(&mut self, id: HotspotId, text: &str) -> Result<(), EngineError> {
        let seconds =
            parse_mss(text).map_err(|err| EngineError::InvalidInput(err.to_string()))?;
        let start = self
            .registry
            .get(id)
            .ok_or(EngineError::NotFound(id))?
            .display_start_time;
        self.registry.set_display_window(id, start, Some(seconds))?;
        self.flush();
        Ok(())
    }

    /// Arm placement for `target`. Requires playback to have started once
    /// so the captured time is meaningful.
    pub fn begin_placement(&mut self, target: PlacementTarget) -> Result<(), EngineError> {
        if !self.video_started {
            return Err(EngineError::InvalidInput(
                "video has not started playing".to_string(),
            ));
        }
        self.placement.begin(&self.registry, target)
    }

    /// Whether the "position on video" affordance for `target` is enabled.
    pub fn can_begin_placement(&self, target: PlacementTarget) -> bool {
        self.video_started && self.placement.can_begin(&self.registry, target)
    }

    /// Commit the armed placement at the transport's current time. The
    /// pointer path funnels through here; headless hosts call it
    /// directly.
    pub fn commit_placement(
        &mut self,
        angles: SphereAngles,
    ) -> Result<Option<PlacementTarget>, EngineError> {
        let time = self.transport.current_time();
        let committed = self.placement.commit(&mut self.registry, angles, time)?;
        if committed.is_some() {
            self.flush();
        }
        Ok(committed)
    }

    /// Commit a dynamic hotspot's keyframe set for playback use.
    pub fn begin_interpolation(&mut self, id: HotspotId) -> Result<(), EngineError> {
        self.registry.mark_interpolated(id)?;
        self.flush();
        Ok(())
    }

    pub fn interpolation_ready(&self, id: HotspotId) -> bool {
        interpolation_ready(&self.registry, id)
    }

    /// Replace the whole collection, e.g. after the host re-read saved
    /// params because the video file changed.
    pub fn replace_document(&mut self, document: HotspotDocument) {
        self.registry.replace_document(document);
        self.flush();
    }

    // --- events --------------------------------------------------------

    pub fn handle_transport_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Ready => {
                self.ready = true;
                self.duration = Some(self.transport.duration());
                let time = self.transport.current_time();
                self.registry.take_events();
                self.bridge.rebuild(&self.registry, &mut self.scene, time);
            }
            TransportEvent::Play => {
                self.video_started = true;
            }
            TransportEvent::TimeUpdate => {
                if self.ready && self.failure.is_none() {
                    let time = self.transport.current_time();
                    self.bridge.refresh(&self.registry, &mut self.scene, time);
                }
            }
            TransportEvent::Error(message) => {
                self.bridge.clear(&mut self.scene);
                self.failure = Some(message);
            }
        }
    }

    /// Pointer input on the preview surface. While a placement is armed a
    /// click captures the ray's angle pair; otherwise clicks fall through
    /// (the preview surface has no runtime activation).
    pub fn handle_pointer(
        &mut self,
        action: PointerAction,
        pointer: PointerPosition,
        rect: SurfaceRect,
    ) -> PickOutcome {
        if !self.ready || self.failure.is_some() {
            return PickOutcome::Ignored;
        }
        if action != PointerAction::Click || !self.placement.locked() {
            return PickOutcome::Ignored;
        }

        let Some(ray) = ndc_from_pointer(pointer, rect)
            .and_then(|(ndc_x, ndc_y)| self.scene.pointer_ray(ndc_x, ndc_y))
        else {
            return PickOutcome::Ignored;
        };
        let angles = match angles_from_direction(ray.dir) {
            Ok(angles) => angles,
            Err(err) => {
                warn!("placement click produced an unusable ray: {err}");
                return PickOutcome::Ignored;
            }
        };
        if let Err(err) = self.commit_placement(angles) {
            warn!("placement commit rejected: {err}");
        }
        PickOutcome::Ignored
    }

    /// Mirror registry mutations onto the preview scene. Before readiness
    /// the events are dropped; the `Ready` rebuild derives everything.
    fn flush(&mut self) {
        if self.ready {
            let time = self.transport.current_time();
            self.bridge
                .apply_events(&mut self.registry, &mut self.scene, time);
        } else {
            self.registry.take_events();
        }
    }
}
