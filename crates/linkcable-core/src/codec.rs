//! Wire codec for exchange frames
//!
//! Every frame carries one opcode and one record index over the single
//! exchange characteristic: one opcode byte followed by a big-endian u16
//! index, a fixed three-byte layout. The width covers the full catalog
//! range with headroom; both ends agree on the layout by configuration.

use crate::errors::ProtocolError;
use crate::types::{Catalog, OpCode, RecordIndex};

// ----------------------------------------------------------------------------
// Frame Layout
// ----------------------------------------------------------------------------

/// Fixed wire size of one exchange frame
pub const FRAME_LEN: usize = 3;

/// One wire-protocol message: an exchange direction plus a record index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExchangeFrame {
    pub op_code: OpCode,
    pub index: RecordIndex,
}

impl ExchangeFrame {
    /// Create a frame for the given move
    pub const fn new(op_code: OpCode, index: RecordIndex) -> Self {
        Self { op_code, index }
    }

    /// Encode this frame to its wire representation
    ///
    /// Total for all valid frames; there is no failure path.
    pub fn encode(&self) -> [u8; FRAME_LEN] {
        let index = self.index.value().to_be_bytes();
        [self.op_code.value(), index[0], index[1]]
    }

    /// Decode a frame from a transport payload
    ///
    /// Rejects wrong-length payloads and unknown opcodes as malformed, and
    /// indices outside the catalog as out of range. A well-formed frame
    /// whose record is absent from the source collection decodes fine;
    /// refusing that move is the store's outcome, not a decode error.
    pub fn decode(bytes: &[u8], catalog: &Catalog) -> Result<Self, ProtocolError> {
        if bytes.len() != FRAME_LEN {
            return Err(ProtocolError::MalformedFrame {
                expected: FRAME_LEN,
                actual: bytes.len(),
            });
        }

        let op_code = OpCode::try_from(bytes[0])?;
        let index = RecordIndex::new(u16::from_be_bytes([bytes[1], bytes[2]]));
        let index = catalog.validate(index)?;

        Ok(Self { op_code, index })
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
