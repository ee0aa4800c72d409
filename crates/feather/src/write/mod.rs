//! Column serialization: per-family writers plus the shared validity-mask
//! prologue.
//!
//! A column's byte stream is `[optional validity bitmask][family-specific
//! data]`, each part zero-padded to an 8-byte boundary. The mask packs one
//! bit per row LSB-first, set meaning valid. Writers are single-pass and
//! non-idempotent: the top-level writer calls each one exactly once, in
//! declared column order.

mod boolean;
mod numeric;
mod varlen;

use std::io::Write;

use anyhow::Result;
use buf::util;

use crate::types::FeatherType;

pub use boolean::{BoolWriter, NullableBoolWriter};
pub use numeric::{FixedValue, NullablePrimitiveWriter, PrimitiveWriter};
pub use varlen::{BinaryWriter, StringWriter};

pub(crate) use varlen::write_var_data;

/// Immutable record of what one column writer produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColStat {
    row_count: u64,
    byte_count: u64,
    null_count: u64,
    data_offset: u64,
}

impl ColStat {
    /// Returns the number of rows written.
    #[must_use]
    pub fn row_count(&self) -> u64 {
        self.row_count
    }

    /// Returns the total number of bytes written. Always a multiple of 8.
    #[must_use]
    pub fn byte_count(&self) -> u64 {
        self.byte_count
    }

    /// Returns the number of rows flagged null in the validity mask.
    #[must_use]
    pub fn null_count(&self) -> u64 {
        self.null_count
    }

    /// Returns the offset of the data block within the written bytes.
    /// Skips the validity mask if present, but not any offset table.
    /// Always a multiple of 8.
    #[must_use]
    pub fn data_offset(&self) -> u64 {
        self.data_offset
    }
}

/// Serializes one column of a Feather-format table.
///
/// The descriptor methods (`name`, `feather_type`, `user_metadata`,
/// `row_count`, `nullable`) are immutable; `write_column_bytes` performs
/// the single serialization pass. Implementors supply the family-specific
/// [`write_data_bytes`](ColumnWriter::write_data_bytes); the provided
/// `write_column_bytes` handles the mask prologue and alignment.
pub trait ColumnWriter {
    /// Returns the column name.
    fn name(&self) -> &str;

    /// Returns the column type code.
    fn feather_type(&self) -> FeatherType;

    /// Returns the optional column user metadata; by convention JSON.
    fn user_metadata(&self) -> Option<&str> {
        None
    }

    /// Returns the number of rows this writer will serialize.
    fn row_count(&self) -> u64;

    /// Indicates whether rows may need flagging in a validity mask. When
    /// `false`, no mask is written and [`is_null`](ColumnWriter::is_null)
    /// is never consulted.
    fn nullable(&self) -> bool {
        false
    }

    /// Tests the value at a given row for nullness. Only called for
    /// nullable writers.
    fn is_null(&self, _row: u64) -> bool {
        false
    }

    /// Writes the data bytes for this column, excluding any validity
    /// mask, and returns how many were written. The output does not need
    /// to end on an 8-byte boundary; the caller pads.
    ///
    /// # Errors
    ///
    /// I/O errors propagate unchanged; nothing retries.
    fn write_data_bytes(&self, out: &mut dyn Write) -> Result<u64>;

    /// Writes the column's full byte stream: validity mask (if nullable),
    /// then data, each 8-byte aligned.
    ///
    /// # Errors
    ///
    /// I/O errors propagate unchanged.
    fn write_column_bytes(&self, out: &mut dyn Write) -> Result<ColStat> {
        let nrow = self.row_count();
        let mut null_count = 0u64;
        let mask_bytes = if self.nullable() {
            let mut mask = 0u8;
            let mut ibit = 0;
            for ir in 0..nrow {
                if self.is_null(ir) {
                    null_count += 1;
                } else {
                    mask |= 1 << ibit;
                }
                ibit += 1;
                if ibit == 8 {
                    out.write_all(&[mask])?;
                    ibit = 0;
                    mask = 0;
                }
            }
            if ibit > 0 {
                out.write_all(&[mask])?;
            }
            let mb = (nrow + 7) / 8;
            mb + util::align8(out, mb)?
        } else {
            0
        };
        let mut data_bytes = self.write_data_bytes(out)?;
        data_bytes += util::align8(out, data_bytes)?;
        Ok(ColStat {
            row_count: nrow,
            byte_count: mask_bytes + data_bytes,
            null_count,
            data_offset: mask_bytes,
        })
    }
}
