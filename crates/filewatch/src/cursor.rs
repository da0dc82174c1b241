//! Record-at-a-time parsing of the raw kernel event buffer.
//!
//! A single kernel read delivers zero or more variable-length
//! records: a fixed 16-byte header (wd, mask, cookie, name length)
//! followed by a NUL-padded name. The cursor tracks `(position,
//! valid_length)` so repeated calls drain one record per call across
//! multiple reads.
//!
//! The declared name length is validated against the valid region
//! before any slice is taken; a truncated or malformed tail exhausts
//! the cursor instead of reading out of bounds.

use std::ffi::OsString;
use std::os::unix::ffi::OsStrExt;

use crate::mask::EventMask;

/// Size of the fixed record header: wd (i32), mask (u32),
/// cookie (u32), name length (u32).
pub const EVENT_HEADER_LEN: usize = 16;

/// One parsed kernel record. Ephemeral: lives only between a parse
/// and its translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub wd: i32,
    pub mask: EventMask,
    pub name: Option<OsString>,
}

/// Read cursor over the last successful fill.
#[derive(Debug, Default)]
pub struct EventCursor {
    pos: usize,
    len: usize,
}

impl EventCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rewinds over a freshly filled region of `len` bytes.
    pub fn reset(&mut self, len: usize) {
        self.pos = 0;
        self.len = len;
    }

    /// True when every buffered record has been drained and the next
    /// call would need another fill.
    pub fn is_exhausted(&self) -> bool {
        self.pos >= self.len
    }

    /// Parses the record at the current position and advances past
    /// it. Returns `None` when the region is exhausted, or when the
    /// remaining bytes do not form a complete record (the tail is
    /// dropped and the cursor exhausted, so the next fill starts
    /// clean).
    pub fn next_raw(&mut self, buffer: &[u8]) -> Option<RawRecord> {
        if self.pos >= self.len {
            return None;
        }
        let valid = &buffer[..self.len.min(buffer.len())];

        let header_end = self.pos.checked_add(EVENT_HEADER_LEN)?;
        let Some(header) = valid.get(self.pos..header_end) else {
            self.pos = self.len;
            return None;
        };
        let wd = i32::from_ne_bytes([header[0], header[1], header[2], header[3]]);
        let mask = u32::from_ne_bytes([header[4], header[5], header[6], header[7]]);
        let name_len =
            u32::from_ne_bytes([header[12], header[13], header[14], header[15]]) as usize;

        let Some(name_end) = header_end.checked_add(name_len) else {
            self.pos = self.len;
            return None;
        };
        let Some(name_bytes) = valid.get(header_end..name_end) else {
            // Declared name overruns the valid region.
            self.pos = self.len;
            return None;
        };
        self.pos = name_end;

        // The kernel NUL-pads names up to the declared length.
        let trimmed = match name_bytes.iter().position(|&byte| byte == 0) {
            Some(nul) => &name_bytes[..nul],
            None => name_bytes,
        };
        let name = if trimmed.is_empty() {
            None
        } else {
            Some(std::ffi::OsStr::from_bytes(trimmed).to_os_string())
        };

        Some(RawRecord {
            wd,
            mask: EventMask::from_bits_retain(mask),
            name,
        })
    }
}
