//! The runtime playback surface: loads the persisted hotspot collection
//! once, keeps markers moving and gated on every tick, and turns clicks
//! into content presentation.

use log::warn;

use pano_core::model::{HotspotDocument, HotspotId};

use crate::picking::{PickDispatcher, PickOutcome, PointerAction};
use crate::present::ContentPresenter;
use crate::registry::HotspotRegistry;
use crate::surface::{PointerPosition, SceneSurface, SurfaceRect};
use crate::sync::{SurfaceMode, SyncBridge};
use crate::transport::{PlaybackTransport, TransportEvent};

/// Lifecycle of the runtime surface.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerPhase {
    /// Waiting for transport readiness; markers load exactly once.
    Loading,
    Active,
    /// The media failed. The surface shows `message` in place of the
    /// player and hotspot loading is halted for this instance.
    Failed(String),
}

pub struct PlayerSession<T, S, P> {
    registry: HotspotRegistry,
    bridge: SyncBridge,
    picker: PickDispatcher,
    transport: T,
    scene: S,
    presenter: P,
    phase: PlayerPhase,
    presenting: Option<HotspotId>,
}

impl<T, S, P> PlayerSession<T, S, P>
where
    T: PlaybackTransport,
    S: SceneSurface,
    P: ContentPresenter,
{
    /// Load the persisted document. The collection is read-only from here
    /// on; only derived marker state changes during playback.
    pub fn new(document: HotspotDocument, transport: T, scene: S, presenter: P) -> Self {
        Self {
            registry: HotspotRegistry::from_document(document),
            bridge: SyncBridge::new(SurfaceMode::Player),
            picker: PickDispatcher::new(),
            transport,
            scene,
            presenter,
            phase: PlayerPhase::Loading,
            presenting: None,
        }
    }

    pub fn phase(&self) -> &PlayerPhase {
        &self.phase
    }

    pub fn registry(&self) -> &HotspotRegistry {
        &self.registry
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn bridge(&self) -> &SyncBridge {
        &self.bridge
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn handle_transport_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Ready => {
                if self.phase != PlayerPhase::Loading {
                    return;
                }
                let time = self.transport.current_time();
                self.bridge.rebuild(&self.registry, &mut self.scene, time);
                self.phase = PlayerPhase::Active;
            }
            TransportEvent::TimeUpdate => {
                if self.phase == PlayerPhase::Active {
                    let time = self.transport.current_time();
                    self.bridge.refresh(&self.registry, &mut self.scene, time);
                }
            }
            TransportEvent::Play => {}
            TransportEvent::Error(message) => {
                // Markers must not outlive the failed surface.
                self.bridge.clear(&mut self.scene);
                self.phase = PlayerPhase::Failed(message);
            }
        }
    }

    pub fn handle_pointer(
        &mut self,
        action: PointerAction,
        pointer: PointerPosition,
        rect: SurfaceRect,
    ) -> PickOutcome {
        if self.phase != PlayerPhase::Active {
            return PickOutcome::Ignored;
        }
        let outcome = self.picker.dispatch(
            action,
            pointer,
            rect,
            &self.scene,
            &self.bridge,
            &self.registry,
        );
        if let PickOutcome::Activate(id) = &outcome {
            self.activate(*id);
        }
        outcome
    }

    fn activate(&mut self, id: HotspotId) {
        let Some(hotspot) = self.registry.get(id) else {
            warn!("pick resolved unknown hotspot {id}");
            return;
        };
        // Player markers only exist for content-backed hotspots, but a
        // stale pick must not open an empty container.
        let Some(content) = hotspot.content.clone() else {
            return;
        };
        self.transport.pause();
        self.presenting = Some(id);
        self.presenter.present(id, &content);
    }

    /// The presentation container was dismissed; playback resumes.
    pub fn content_dismissed(&mut self) {
        if self.presenting.take().is_some() {
            self.transport.play();
        }
    }

    pub fn presenting(&self) -> Option<HotspotId> {
        self.presenting
    }
}
