use core::fmt::{Debug, Formatter, Result as FmtResult};

use bitvec::{order::Msb0, slice::BitSlice, view::BitView as _};
use derive_more::From;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const BITS_PER_BYTE: usize = 8;

/// Participation of committee members in an aggregate attestation.
///
/// Bit `i` refers to the committee member at position `i`. Bits are numbered from the most
/// significant bit of each byte, so bit `i` is bit `7 - i % 8` of byte `i / 8`.
///
/// Unlike SSZ bitlists, the bitfield carries no length delimiter. Its length is bounded only by
/// the number of bytes. Positions past the end of the bytes read as unset.
#[derive(Clone, PartialEq, Eq, Hash, Default, From, Deserialize, Serialize)]
#[serde(transparent)]
pub struct ParticipationBitfield {
    #[serde(with = "hex")]
    bytes: Vec<u8>,
}

impl From<&[u8]> for ParticipationBitfield {
    fn from(bytes: &[u8]) -> Self {
        Self::from(bytes.to_vec())
    }
}

impl<const SIZE: usize> From<[u8; SIZE]> for ParticipationBitfield {
    fn from(bytes: [u8; SIZE]) -> Self {
        Self::from(bytes.to_vec())
    }
}

// Print bits rather than bytes. The byte values are meaningless when reading participation.
impl Debug for ParticipationBitfield {
    fn fmt(&self, formatter: &mut Formatter) -> FmtResult {
        formatter.write_str("ParticipationBitfield(")?;

        for bit in self.bits() {
            formatter.write_str(if bit { "1" } else { "0" })?;
        }

        formatter.write_str(")")
    }
}

impl ParticipationBitfield {
    /// Builds a bitfield of `ceil(bit_count / 8)` bytes with the bits at `positions` set.
    pub fn with_set_bits(
        bit_count: usize,
        positions: impl IntoIterator<Item = usize>,
    ) -> Result<Self, Error> {
        let mut bytes = vec![0; bit_count.div_ceil(BITS_PER_BYTE)];
        let bits = bytes.view_bits_mut::<Msb0>();

        for position in positions {
            if position >= bit_count {
                return Err(Error::PositionOutOfBounds {
                    position,
                    bit_count,
                });
            }

            bits.set(position, true);
        }

        Ok(Self { bytes })
    }

    /// Iterates over bits in position order, starting from position 0.
    ///
    /// The iterator stops after the last bit of the last byte.
    /// Zip it with a committee to drop the padding bits.
    pub fn bits(&self) -> impl Iterator<Item = bool> + '_ {
        self.view().iter().by_vals()
    }

    fn view(&self) -> &BitSlice<u8, Msb0> {
        self.bytes.view_bits::<Msb0>()
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("bit position {position} is out of bounds for a bitfield of {bit_count} bits")]
    PositionOutOfBounds { position: usize, bit_count: usize },
}
