//! Single-frame cache
//!
//! Holds at most one decoded frame. Asking for the frame already held is
//! a no-op; asking for another decodes it first and only then replaces
//! the old one, so a failed decode leaves the previous frame in place.
//! Multi-frame images re-decode on every frame change.

use crate::error::ImageError;
use crate::frame::DecodedFrame;

#[derive(Debug)]
struct Slot {
    index: u16,
    frame: DecodedFrame,
}

/// Cache owning zero or one [`DecodedFrame`]
#[derive(Debug, Default)]
pub struct ImageCache {
    slot: Option<Slot>,
}

impl ImageCache {
    pub const fn new() -> Self {
        Self { slot: None }
    }

    /// Make frame `index` resident, decoding it with `decode` if needed
    pub fn ensure_cached<F>(&mut self, index: u16, decode: F) -> Result<&DecodedFrame, ImageError>
    where
        F: FnOnce() -> Result<DecodedFrame, ImageError>,
    {
        let hit = self.is_cached(index);
        match (hit, &mut self.slot) {
            (true, Some(slot)) => Ok(&slot.frame),
            (_, slot) => {
                let frame = decode()?;
                trace!("cached frame {}", index);
                // The previous frame is dropped here, as the new one is published
                Ok(&slot.insert(Slot { index, frame }).frame)
            }
        }
    }

    /// The resident frame, if any
    pub fn get(&self) -> Option<&DecodedFrame> {
        self.slot.as_ref().map(|slot| &slot.frame)
    }

    /// Index of the resident frame
    pub fn index(&self) -> Option<u16> {
        self.slot.as_ref().map(|slot| slot.index)
    }

    /// Whether frame `index` is resident
    pub fn is_cached(&self, index: u16) -> bool {
        self.index() == Some(index)
    }

    /// Release the resident frame
    pub fn invalidate(&mut self) {
        self.slot = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitrine_hal::Color;

    fn frame(color: Color) -> Result<DecodedFrame, ImageError> {
        let mut frame = DecodedFrame::new(1, 1, false)?;
        frame.set(0, 0, color);
        Ok(frame)
    }

    #[test]
    fn test_second_request_is_a_hit() {
        let mut cache = ImageCache::new();
        let mut decodes = 0;
        for _ in 0..2 {
            cache
                .ensure_cached(0, || {
                    decodes += 1;
                    frame(Color::RED)
                })
                .unwrap();
        }
        assert_eq!(decodes, 1);
        assert!(cache.is_cached(0));
    }

    #[test]
    fn test_first_request_fills_empty_cache() {
        let mut cache = ImageCache::new();
        let f = cache.ensure_cached(3, || frame(Color::GREEN)).unwrap();
        assert_eq!(f.get(0, 0), Some(Color::GREEN));
        assert_eq!(cache.index(), Some(3));
    }

    #[test]
    fn test_other_index_replaces() {
        let mut cache = ImageCache::new();
        cache.ensure_cached(0, || frame(Color::RED)).unwrap();
        let f = cache.ensure_cached(1, || frame(Color::BLUE)).unwrap();
        assert_eq!(f.get(0, 0), Some(Color::BLUE));
        assert_eq!(cache.index(), Some(1));
    }

    #[test]
    fn test_failed_decode_keeps_previous() {
        let mut cache = ImageCache::new();
        cache.ensure_cached(0, || frame(Color::RED)).unwrap();
        assert_eq!(
            cache.ensure_cached(1, || Err(ImageError::OutOfMemory)).unwrap_err(),
            ImageError::OutOfMemory
        );
        assert_eq!(cache.index(), Some(0));
        assert_eq!(cache.get().and_then(|f| f.get(0, 0)), Some(Color::RED));
    }

    #[test]
    fn test_invalidate() {
        let mut cache = ImageCache::new();
        cache.ensure_cached(2, || frame(Color::RED)).unwrap();
        cache.invalidate();
        assert!(cache.get().is_none());
        assert_eq!(cache.index(), None);
    }
}
