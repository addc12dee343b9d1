//! Network interface unit.
//!
//! Receive buffers live in [`NET_BUFFERS`], which any other network unit
//! in the image may share: only one interface is open at a time.

#![no_std]

mod ring;

use fw_object::{dbg1, dbg2, dbg_assert, ObjectId, SharedError, SharedLease};

pub use ring::{RxRing, RX_SLOTS, SLOT_SIZE};

fw_object::object!(nic);

pub const ID: ObjectId = ObjectId::new("nic");

fw_object::shared_region!(
    /// Receive storage for whichever network unit is open.
    pub NET_BUFFERS,
    core::mem::size_of::<RxRing>()
);

fw_object::packed! {
    /// Ethernet II header as it appears on the wire.
    #[derive(Debug, Clone, Copy)]
    pub struct FrameHeader {
        pub dst: [u8; 6],
        pub src: [u8; 6],
        pub ethertype: [u8; 2],
    }
}

pub const FRAME_HEADER_LEN: usize = core::mem::size_of::<FrameHeader>();

pub struct Nic {
    mac: [u8; 6],
    rx: Option<SharedLease<'static, RxRing>>,
}

impl Nic {
    #[must_use]
    pub fn attach(mac: [u8; 6]) -> Self {
        dbg1!("attached {:02x?}", mac);
        Self { mac, rx: None }
    }

    #[must_use]
    pub fn mac(&self) -> [u8; 6] {
        self.mac
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.rx.is_some()
    }

    /// # Errors
    /// Fails if another unit holds [`NET_BUFFERS`].
    pub fn open(&mut self) -> Result<(), SharedError> {
        if self.rx.is_none() {
            self.rx = Some(NET_BUFFERS.claim(ID, RxRing::new())?);
            dbg1!("opened, {} rx slots", RX_SLOTS);
        }
        Ok(())
    }

    pub fn close(&mut self) {
        if self.rx.take().is_some() {
            dbg1!("closed");
        }
    }

    /// Queues a received frame. Returns the slot it landed in, or `None` if
    /// the interface is closed, the ring is full, or the frame is too short
    /// to carry a header.
    pub fn receive(&mut self, frame: &[u8]) -> Option<usize> {
        dbg_assert!(frame.len() <= SLOT_SIZE);

        let ring = self.rx.as_mut()?;
        if frame.len() < FRAME_HEADER_LEN {
            dbg1!("runt frame, {} bytes", frame.len());
            return None;
        }

        let slot = ring.push(frame)?;
        dbg2!("rx {} bytes into slot {}", frame.len(), slot);
        Some(slot)
    }

    /// Removes the oldest queued frame, copying it into `buf`.
    pub fn poll(&mut self, buf: &mut [u8]) -> Option<usize> {
        let len = self.rx.as_mut()?.pop(buf)?;
        dbg2!("poll returned {} bytes", len);
        Some(len)
    }
}

/// Splits the header off a frame.
#[must_use]
pub fn parse_header(frame: &[u8]) -> Option<FrameHeader> {
    let bytes = frame.get(..FRAME_HEADER_LEN)?;
    let mut header = FrameHeader {
        dst: [0; 6],
        src: [0; 6],
        ethertype: [0; 2],
    };
    header.dst.copy_from_slice(&bytes[0..6]);
    header.src.copy_from_slice(&bytes[6..12]);
    header.ethertype.copy_from_slice(&bytes[12..14]);
    Some(header)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAC: [u8; 6] = [0x52, 0x54, 0x00, 0x12, 0x34, 0x56];

    fn frame(len: usize, fill: u8) -> [u8; SLOT_SIZE] {
        let mut frame = [fill; SLOT_SIZE];
        frame[12..14].copy_from_slice(&[0x08, 0x00]);
        frame[len..].fill(0);
        frame
    }

    #[test]
    fn header_is_wire_sized() {
        assert_eq!(FRAME_HEADER_LEN, 14);
        let header = parse_header(&frame(60, 0xff)).unwrap();
        assert_eq!(header.ethertype, [0x08, 0x00]);
        assert_eq!(header.dst, [0xff; 6]);
        assert!(parse_header(&[0; 13]).is_none());
    }

    // One test owns NET_BUFFERS so parallel tests never contend for it.
    #[test]
    fn open_receive_poll_close() {
        let mut nic = Nic::attach(MAC);
        assert!(nic.receive(&frame(60, 1)).is_none(), "closed interface");

        nic.open().unwrap();
        assert_eq!(NET_BUFFERS.owner(), Some(ID));
        assert!(nic.receive(&[0; 10]).is_none(), "runt frame");

        let first = nic.receive(&frame(60, 1)[..60]).unwrap();
        let second = nic.receive(&frame(64, 2)[..64]).unwrap();
        assert_ne!(first, second);

        let mut buf = [0; SLOT_SIZE];
        assert_eq!(nic.poll(&mut buf), Some(60));
        assert_eq!(buf[0], 1);
        assert_eq!(nic.poll(&mut buf), Some(64));
        assert_eq!(buf[0], 2);
        assert_eq!(nic.poll(&mut buf), None);

        let other = ObjectId::new("wlan");
        assert!(NET_BUFFERS.claim(other, 0u8).is_err());

        nic.close();
        assert!(!nic.is_open());
        assert!(NET_BUFFERS.is_free());
        assert_eq!(nic.mac(), MAC);
    }

    #[test]
    fn unit_is_registered_with_its_level() {
        let object = fw_object::find("nic").unwrap();
        assert_eq!(object.debug_level(), DEBUG_LEVEL);
        assert_eq!(OBJ_NIC.id(), ID);
    }
}
