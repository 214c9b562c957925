use pano_core::model::{ContentRef, HotspotId};

/// Content presentation collaborator. The implementation opens a
/// dismissible container and renders the descriptor inside it; the player
/// session pauses the transport before calling this and resumes playback
/// when the host reports dismissal.
pub trait ContentPresenter {
    fn present(&mut self, hotspot: HotspotId, content: &ContentRef);
}
