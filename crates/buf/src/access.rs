use std::sync::Arc;

/// Basic access to a potentially large byte storage region.
///
/// Implementations are supplied by [`BufMapper`](crate::BufMapper); callers
/// normally work through [`Buf`] instead.
pub trait BufAccess: Send + Sync {
    /// Retrieves the byte at a given offset.
    ///
    /// # Panics
    ///
    /// Panics if `ix` is outside the accessible region, or (for lazily
    /// mapped bank strategies) if the bank covering `ix` cannot be mapped.
    fn get(&self, ix: u64) -> u8;
}

/// Little-endian primitive reads over a [`BufAccess`].
///
/// Methods mirror a byte buffer, but with `u64` indices. Every multi-byte
/// value is composed from single-byte reads, so a value may straddle the
/// boundary between two mapping banks without any special handling.
#[derive(Clone)]
pub struct Buf {
    access: Arc<dyn BufAccess>,
}

impl Buf {
    /// Wraps an access strategy.
    pub fn new(access: Arc<dyn BufAccess>) -> Self {
        Buf { access }
    }

    /// Returns the byte at a given offset.
    #[must_use]
    pub fn get(&self, ix: u64) -> u8 {
        self.access.get(ix)
    }

    /// Returns the 16-bit integer stored little-endian at a given offset.
    #[must_use]
    pub fn get_i16_le(&self, ix: u64) -> i16 {
        (self.get(ix) as i16) | ((self.get(ix + 1) as i16) << 8)
    }

    /// Returns the 32-bit integer stored little-endian at a given offset.
    #[must_use]
    pub fn get_i32_le(&self, ix: u64) -> i32 {
        (self.get(ix) as i32)
            | ((self.get(ix + 1) as i32) << 8)
            | ((self.get(ix + 2) as i32) << 16)
            | ((self.get(ix + 3) as i32) << 24)
    }

    /// Returns the 64-bit integer stored little-endian at a given offset.
    #[must_use]
    pub fn get_i64_le(&self, ix: u64) -> i64 {
        let mut v = 0i64;
        for ib in 0..8 {
            v |= (self.get(ix + ib) as i64) << (8 * ib);
        }
        v
    }

    /// Returns the 32-bit IEEE 754 value stored little-endian at a given
    /// offset.
    #[must_use]
    pub fn get_f32_le(&self, ix: u64) -> f32 {
        f32::from_bits(self.get_i32_le(ix) as u32)
    }

    /// Returns the 64-bit IEEE 754 value stored little-endian at a given
    /// offset.
    #[must_use]
    pub fn get_f64_le(&self, ix: u64) -> f64 {
        f64::from_bits(self.get_i64_le(ix) as u64)
    }

    /// Fills `dst` with copies of the bytes starting at offset `ix`.
    pub fn get_bytes(&self, ix: u64, dst: &mut [u8]) {
        for (ib, b) in dst.iter_mut().enumerate() {
            *b = self.get(ix + ib as u64);
        }
    }

    /// Indicates whether a given bit is set, counting bits LSB-first from
    /// the start of the region: bit `i` lives in byte `i / 8`, position
    /// `i % 8`.
    #[must_use]
    pub fn is_bit_set(&self, bit_ix: u64) -> bool {
        self.get(bit_ix / 8) & (1 << (bit_ix % 8)) != 0
    }
}
