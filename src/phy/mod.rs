// Physical layer: bit representation and deterministic packet framing

pub mod bit;
pub mod packet;

pub use bit::{Bit, alternating_bits, byte_to_bits, random_bits};
pub use packet::{Framer, parity_bit};
