use std::fmt;

use rand::Rng;

/// One transmitted or received symbol value.
///
/// `Unknown` covers everything a run cannot classify: a dropped line
/// write, an unreadable sample, or a sample landing exactly on the
/// decision threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bit {
    Zero,
    One,
    Unknown,
}

impl Bit {
    pub fn from_level(level: u8) -> Self {
        if level == 0 { Bit::Zero } else { Bit::One }
    }

    /// Line level for this bit; `None` for `Unknown`.
    pub fn level(self) -> Option<u8> {
        match self {
            Bit::Zero => Some(0),
            Bit::One => Some(1),
            Bit::Unknown => None,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Bit::Zero => Bit::One,
            Bit::One => Bit::Zero,
            Bit::Unknown => Bit::Unknown,
        }
    }

    /// Single-character rendering used for pattern matching; `Unknown`
    /// becomes a character that never occurs in a bit pattern.
    pub fn pattern_char(self) -> char {
        match self {
            Bit::Zero => '0',
            Bit::One => '1',
            Bit::Unknown => '?',
        }
    }
}

impl fmt::Display for Bit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bit::Zero => write!(f, "0"),
            Bit::One => write!(f, "1"),
            Bit::Unknown => write!(f, "N/A"),
        }
    }
}

/// Expand one byte to its eight bits, most significant first.
pub fn byte_to_bits(byte: u8) -> [Bit; 8] {
    let mut bits = [Bit::Zero; 8];
    for (i, slot) in bits.iter_mut().enumerate() {
        *slot = Bit::from_level((byte >> (7 - i)) & 0x01);
    }
    bits
}

/// A randomly generated transmission for link characterisation runs.
pub fn random_bits(count: usize) -> Vec<Bit> {
    let mut rng = rand::rng();
    (0..count)
        .map(|_| Bit::from_level(rng.random_range(0..2u8)))
        .collect()
}

/// An alternating 0/1 sequence, the worst case for the bit clock.
pub fn alternating_bits(count: usize) -> Vec<Bit> {
    let mut level = 0u8;
    (0..count)
        .map(|_| {
            let bit = Bit::from_level(level);
            level ^= 1;
            bit
        })
        .collect()
}
