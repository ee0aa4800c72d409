//! Writers for bit-packed boolean columns.

use std::io::Write;

use anyhow::Result;

use crate::types::FeatherType;
use crate::write::ColumnWriter;

/// Packs `n` bits LSB-first into whole bytes and returns the byte count,
/// `(n + 7) / 8`. The final partial byte, if any, is zero-padded.
fn pack_bits<F>(out: &mut dyn Write, n: u64, bit: F) -> Result<u64>
where
    F: Fn(u64) -> bool,
{
    let mut acc = 0u8;
    let mut ibit = 0;
    for ix in 0..n {
        if bit(ix) {
            acc |= 1 << ibit;
        }
        ibit += 1;
        if ibit == 8 {
            out.write_all(&[acc])?;
            ibit = 0;
            acc = 0;
        }
    }
    if ibit > 0 {
        out.write_all(&[acc])?;
    }
    Ok((n + 7) / 8)
}

/// Writes a column of non-nullable booleans, one bit per row.
pub struct BoolWriter {
    name: String,
    user_meta: Option<String>,
    data: Vec<bool>,
}

impl BoolWriter {
    pub fn new(name: &str, data: Vec<bool>) -> Self {
        BoolWriter {
            name: name.to_owned(),
            user_meta: None,
            data,
        }
    }

    /// Attaches user metadata; by convention JSON.
    #[must_use]
    pub fn user_metadata(mut self, meta: &str) -> Self {
        self.user_meta = Some(meta.to_owned());
        self
    }
}

impl ColumnWriter for BoolWriter {
    fn name(&self) -> &str {
        &self.name
    }

    fn feather_type(&self) -> FeatherType {
        FeatherType::Bool
    }

    fn user_metadata(&self) -> Option<&str> {
        self.user_meta.as_deref()
    }

    fn row_count(&self) -> u64 {
        self.data.len() as u64
    }

    fn write_data_bytes(&self, out: &mut dyn Write) -> Result<u64> {
        pack_bits(out, self.data.len() as u64, |ix| self.data[ix as usize])
    }
}

/// Writes a column of nullable booleans. Null rows pack as a clear data
/// bit alongside a cleared validity bit.
pub struct NullableBoolWriter {
    name: String,
    user_meta: Option<String>,
    data: Vec<Option<bool>>,
}

impl NullableBoolWriter {
    pub fn new(name: &str, data: Vec<Option<bool>>) -> Self {
        NullableBoolWriter {
            name: name.to_owned(),
            user_meta: None,
            data,
        }
    }

    /// Attaches user metadata; by convention JSON.
    #[must_use]
    pub fn user_metadata(mut self, meta: &str) -> Self {
        self.user_meta = Some(meta.to_owned());
        self
    }
}

impl ColumnWriter for NullableBoolWriter {
    fn name(&self) -> &str {
        &self.name
    }

    fn feather_type(&self) -> FeatherType {
        FeatherType::Bool
    }

    fn user_metadata(&self) -> Option<&str> {
        self.user_meta.as_deref()
    }

    fn row_count(&self) -> u64 {
        self.data.len() as u64
    }

    fn nullable(&self) -> bool {
        true
    }

    fn is_null(&self, row: u64) -> bool {
        self.data[row as usize].is_none()
    }

    fn write_data_bytes(&self, out: &mut dyn Write) -> Result<u64> {
        pack_bits(out, self.data.len() as u64, |ix| {
            self.data[ix as usize].unwrap_or(false)
        })
    }
}
