pub const RX_SLOTS: usize = 4;
pub const SLOT_SIZE: usize = 256;

fw_object::aligned! {
    /// Fixed ring of receive slots.
    pub struct RxRing {
        slots: [[u8; SLOT_SIZE]; RX_SLOTS],
        lens: [usize; RX_SLOTS],
        head: usize,
        count: usize,
    }
}

impl RxRing {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: [[0; SLOT_SIZE]; RX_SLOTS],
            lens: [0; RX_SLOTS],
            head: 0,
            count: 0,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.count
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Copies `frame` into the next free slot, truncated to [`SLOT_SIZE`].
    pub fn push(&mut self, frame: &[u8]) -> Option<usize> {
        if self.count == RX_SLOTS {
            return None;
        }
        let slot = (self.head + self.count) % RX_SLOTS;
        let len = frame.len().min(SLOT_SIZE);
        self.slots[slot][..len].copy_from_slice(&frame[..len]);
        self.lens[slot] = len;
        self.count += 1;
        Some(slot)
    }

    pub fn pop(&mut self, buf: &mut [u8]) -> Option<usize> {
        if self.count == 0 {
            return None;
        }
        let slot = self.head;
        let len = self.lens[slot].min(buf.len());
        buf[..len].copy_from_slice(&self.slots[slot][..len]);
        self.head = (self.head + 1) % RX_SLOTS;
        self.count -= 1;
        Some(len)
    }
}

impl Default for RxRing {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_fills_and_wraps() {
        let mut ring = RxRing::new();
        for i in 0..RX_SLOTS {
            assert_eq!(ring.push(&[i as u8; 8]), Some(i));
        }
        assert_eq!(ring.push(&[9; 8]), None);

        let mut buf = [0; 8];
        assert_eq!(ring.pop(&mut buf), Some(8));
        assert_eq!(buf, [0; 8]);
        assert_eq!(ring.push(&[7; 8]), Some(0));
        assert_eq!(ring.len(), RX_SLOTS);
    }

    #[test]
    fn oversized_frames_are_truncated() {
        let mut ring = RxRing::new();
        ring.push(&[1; SLOT_SIZE + 10]).unwrap();
        let mut buf = [0; SLOT_SIZE + 10];
        assert_eq!(ring.pop(&mut buf), Some(SLOT_SIZE));
        assert!(ring.is_empty());
    }
}
