// Frame format: [Preamble:7] [Parity:1] [Payload:8xN] [Terminator:8]

use crate::phy::bit::{Bit, byte_to_bits};
use crate::utils::consts::{PAYLOAD_SIZE, PREAMBLE, TERMINATOR};

/// Builds on-the-wire bit sequences for payload chunks.
///
/// Every frame opens with the same sync preamble (which alignment later
/// searches for), carries one parity bit over the chunk, then the payload
/// bytes most-significant-bit first, and closes with a fixed terminator.
/// Consumers must not assume any byte alignment past the preamble.
pub struct Framer {
    preamble: Vec<Bit>,
    terminator: Vec<Bit>,
    chunk_size: usize,
}

impl Framer {
    pub fn new(preamble: &[u8], terminator: &[u8], chunk_size: usize) -> Self {
        Self {
            preamble: preamble.iter().map(|&b| Bit::from_level(b)).collect(),
            terminator: terminator.iter().map(|&b| Bit::from_level(b)).collect(),
            chunk_size,
        }
    }

    pub fn new_default() -> Self {
        Self::new(&PREAMBLE, &TERMINATOR, PAYLOAD_SIZE)
    }

    pub fn preamble(&self) -> &[Bit] {
        &self.preamble
    }

    /// Number of bits one frame occupies for a payload of `payload_len`
    /// bytes.
    pub fn frame_len(&self, payload_len: usize) -> usize {
        self.preamble.len() + 1 + 8 * payload_len + self.terminator.len()
    }

    /// Flatten one payload chunk into its frame bits.
    ///
    /// An empty payload still produces a frame: preamble, zero parity and
    /// terminator only.
    pub fn frame_bits(&self, payload: &[u8]) -> Vec<Bit> {
        assert!(
            payload.len() <= self.chunk_size,
            "payload larger than one chunk"
        );

        let mut bits = Vec::with_capacity(self.frame_len(payload.len()));
        bits.extend_from_slice(&self.preamble);
        bits.push(parity_bit(payload));
        for &byte in payload {
            bits.extend_from_slice(&byte_to_bits(byte));
        }
        bits.extend_from_slice(&self.terminator);
        bits
    }

    /// Segment `message` into chunks and concatenate one frame per chunk.
    /// The final chunk may be shorter than the chunk size.
    pub fn encode_message(&self, message: &[u8]) -> Vec<Bit> {
        if message.is_empty() {
            return self.frame_bits(&[]);
        }

        let mut bits = Vec::new();
        for chunk in message.chunks(self.chunk_size) {
            bits.extend(self.frame_bits(chunk));
        }
        bits
    }
}

impl Default for Framer {
    fn default() -> Self {
        Self::new_default()
    }
}

/// XOR of the least-significant bit of every payload byte.
///
/// Parity runs over byte values, not over all eight bits per byte; the
/// receiver recomputes it the same way, so the exact semantic matters.
pub fn parity_bit(payload: &[u8]) -> Bit {
    let mut parity = 0u8;
    for &byte in payload {
        parity ^= byte & 0x01;
    }
    Bit::from_level(parity)
}
