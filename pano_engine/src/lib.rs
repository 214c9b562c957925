//! Stateful hotspot engine for 360° interactive video: the canonical
//! registry, placement arbitration, pointer picking, and the sync bridge
//! that keeps a rendering surface's markers derived from the registry.
//!
//! Two session types wire those pieces to the collaborator contracts
//! ([`transport::PlaybackTransport`], [`surface::SceneSurface`],
//! [`present::ContentPresenter`]): [`player::PlayerSession`] for runtime
//! playback and [`author::AuthorSession`] for the editor. Everything is
//! single-threaded and event-driven; a session is only ever touched from
//! one cooperative loop.

pub mod author;
pub mod error;
pub mod headless;
pub mod picking;
pub mod placement;
pub mod player;
pub mod present;
pub mod registry;
pub mod surface;
pub mod sync;
pub mod transport;

pub use author::AuthorSession;
pub use error::EngineError;
pub use headless::HeadlessScene;
pub use picking::{OverlayRequest, PickDispatcher, PickOutcome, PointerAction};
pub use placement::{PlacementArbiter, PlacementPhase, PlacementTarget};
pub use player::{PlayerPhase, PlayerSession};
pub use present::ContentPresenter;
pub use registry::{HotspotRegistry, RegistryEvent};
pub use surface::{
    MarkerDescriptor, MarkerHandle, MarkerHit, MarkerStyle, PointerPosition, Ray, SceneSurface,
    SurfaceRect,
};
pub use sync::{SurfaceMode, SyncBridge};
pub use transport::{ManualTransport, PlaybackTransport, TransportEvent};
