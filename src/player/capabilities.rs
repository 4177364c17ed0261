use bitflags::bitflags;

use super::object::PlayerObject;

bitflags! {
    /// Optional methods a third-party player object may expose.
    ///
    /// Probed once when the object is registered; calls are only made for
    /// capabilities in the cached bitmap.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Capabilities: u16 {
        /// `getAdBlock()`
        const AD_BLOCK = 1 << 0;
        /// `getPlaylistItem()`
        const PLAYLIST_ITEM = 1 << 1;
        /// `getAdvertising()`
        const ADVERTISING = 1 << 2;
        /// `getState()`
        const STATE = 1 << 3;
        /// `getContainer()`
        const CONTAINER = 1 << 4;
        /// `on(event, cb)`
        const EVENTS = 1 << 5;
        /// `setMute()`
        const MUTE = 1 << 6;
        /// `getVolume()` / `setVolume()`
        const VOLUME = 1 << 7;
        /// `getPosition()` / `getDuration()`
        const TIMING = 1 << 8;
    }
}

impl Capabilities {
    pub fn probe(object: &dyn PlayerObject) -> Self {
        Self::all()
            .iter()
            .filter(|&capability| object.exposes(capability))
            .fold(Self::empty(), |acc, capability| acc | capability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Partial;

    impl PlayerObject for Partial {
        fn exposes(&self, capability: Capabilities) -> bool {
            capability == Capabilities::CONTAINER || capability == Capabilities::EVENTS
        }
    }

    #[test]
    fn probe_collects_exposed_methods() {
        let caps = Capabilities::probe(&Partial);
        assert_eq!(caps, Capabilities::CONTAINER | Capabilities::EVENTS);
        assert!(!caps.contains(Capabilities::MUTE));
    }
}
