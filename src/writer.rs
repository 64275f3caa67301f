//! Sequential little-endian output with forward-referenced offsets.
//!
//! Some header fields (the glyph table offset, the total file size) are only
//! known once everything after them has been written. They are emitted as
//! zeroed placeholders, and patched in place once the writer reaches the
//! position they describe.

use arrayvec::ArrayVec;
use bytes::BufMut;

use crate::error::{CcmError, bail, bail_if};

/// The CCM header never holds more than two forward references.
const MAX_PENDING_SLOTS: usize = 4;

/// A reserved 32 bit field waiting for its value.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Slot {
    name: &'static str,
    pos: usize,
}

impl Slot {
    /// Byte position of the placeholder in the output.
    pub fn pos(&self) -> usize {
        self.pos
    }
}

#[derive(Default)]
pub struct PatchWriter {
    out: Vec<u8>,
    pending: ArrayVec<Slot, MAX_PENDING_SLOTS>,
}

impl PatchWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            out: Vec::with_capacity(capacity),
            pending: ArrayVec::new(),
        }
    }

    /// Current write position, which is also the length written so far.
    pub fn position(&self) -> usize {
        self.out.len()
    }

    pub fn put_u8(&mut self, value: u8) {
        self.out.put_u8(value);
    }

    pub fn put_i16(&mut self, value: i16) {
        self.out.put_i16_le(value);
    }

    pub fn put_u16(&mut self, value: u16) {
        self.out.put_u16_le(value);
    }

    pub fn put_i32(&mut self, value: i32) {
        self.out.put_i32_le(value);
    }

    pub fn put_u32(&mut self, value: u32) {
        self.out.put_u32_le(value);
    }

    /// Write a zero placeholder for a 32 bit value that is resolved later.
    pub fn reserve_u32(&mut self, name: &'static str) -> Result<Slot, CcmError> {
        let slot = Slot {
            name,
            pos: self.out.len(),
        };
        if self.pending.try_push(slot).is_err() {
            bail!(CcmError::UnresolvedSlot(name));
        }
        self.out.put_u32_le(0);
        Ok(slot)
    }

    /// Overwrite a placeholder with its final value.
    pub fn patch_u32(&mut self, slot: Slot, value: u32) -> Result<(), CcmError> {
        let Some(idx) = self.pending.iter().position(|s| *s == slot) else {
            bail!(CcmError::UnresolvedSlot(slot.name));
        };
        self.pending.remove(idx);

        let mut at = &mut self.out[slot.pos..slot.pos + 4];
        at.put_u32_le(value);
        Ok(())
    }

    /// Patch a placeholder with the current write position.
    pub fn patch_with_position(&mut self, slot: Slot) -> Result<u32, CcmError> {
        let pos = self.position();
        let pos = u32::try_from(pos).map_err(|_| CcmError::CountOverflow {
            field: slot.name,
            count: pos,
        })?;
        self.patch_u32(slot, pos)?;
        Ok(pos)
    }

    /// The finished output. Fails if any placeholder is still unpatched.
    pub fn finish(self) -> Result<Vec<u8>, CcmError> {
        if let Some(slot) = self.pending.first() {
            log::error!("placeholder '{}' at 0x{:X} left unpatched", slot.name, slot.pos);
        }
        bail_if!(
            !self.pending.is_empty(),
            CcmError::UnresolvedSlot(self.pending[0].name)
        );
        Ok(self.out)
    }
}
