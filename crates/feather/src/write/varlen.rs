//! Writers for variable-length columns (UTF8 and BINARY).
//!
//! The data block is a 32-bit offset table with `nrow + 1` entries,
//! padded to 8 bytes, followed by the concatenated item bytes. Offsets
//! are cumulative item sizes, so entry `i` and entry `i + 1` bracket row
//! `i`'s bytes. When the cumulative size would no longer fit in a signed
//! 32-bit offset, the table freezes at the last representable value and
//! the remaining rows serialize as zero-length. Readers see empty
//! values, not a corrupt file.

use std::io::Write;

use anyhow::Result;
use byteorder::{LittleEndian, WriteBytesExt};
use buf::util;
use log::warn;

use crate::types::FeatherType;
use crate::write::ColumnWriter;

/// Largest cumulative data size a 32-bit offset table can address.
const OFFSET_LIMIT: u64 = i32::MAX as u64;

/// Outcome of writing an offset table.
pub(crate) struct IndexStatus {
    /// Number of rows whose bytes should actually be written; the rest
    /// were frozen out by offset overflow.
    pub entry_count: u64,
    /// Total data bytes the table addresses.
    pub data_bytes: u64,
}

/// Writes the `nrow + 1` entry offset table, freezing on overflow.
fn write_offsets<F>(out: &mut dyn Write, name: &str, nrow: u64, byte_size: F) -> Result<IndexStatus>
where
    F: Fn(u64) -> u64,
{
    let mut ioff = 0u64;
    for ir in 0..nrow {
        out.write_i32::<LittleEndian>(ioff as i32)?;
        let size = byte_size(ir);
        if ioff + size >= OFFSET_LIMIT {
            warn!(
                "pointer overflow - empty values in column {} past row {}",
                name, ir
            );
            for _ in ir..nrow {
                out.write_i32::<LittleEndian>(ioff as i32)?;
            }
            return Ok(IndexStatus {
                entry_count: ir,
                data_bytes: ioff,
            });
        }
        ioff += size;
    }
    out.write_i32::<LittleEndian>(ioff as i32)?;
    Ok(IndexStatus {
        entry_count: nrow,
        data_bytes: ioff,
    })
}

/// Writes a complete variable-length data block: offset table, padding,
/// then the item bytes for every row the table kept. Returns the total
/// byte count.
pub(crate) fn write_var_data<S, W>(
    out: &mut dyn Write,
    name: &str,
    nrow: u64,
    byte_size: S,
    mut write_item: W,
) -> Result<u64>
where
    S: Fn(u64) -> u64,
    W: FnMut(u64, &mut dyn Write) -> Result<()>,
{
    let status = write_offsets(out, name, nrow, byte_size)?;
    let index_bytes = 4 * (nrow + 1);
    let index_pad = util::align8(out, index_bytes)?;
    for ir in 0..status.entry_count {
        write_item(ir, out)?;
    }
    let data_pad = util::align8(out, status.data_bytes)?;
    Ok(index_bytes + index_pad + status.data_bytes + data_pad)
}

/// Writes a column of strings as UTF8.
///
/// In nullable mode a validity mask is written and `None` rows are
/// flagged; otherwise `None` rows serialize as zero-length strings with
/// no mask.
pub struct StringWriter {
    name: String,
    user_meta: Option<String>,
    nullable: bool,
    data: Vec<Option<String>>,
}

impl StringWriter {
    pub fn new(name: &str, nullable: bool, data: Vec<Option<String>>) -> Self {
        StringWriter {
            name: name.to_owned(),
            user_meta: None,
            nullable,
            data,
        }
    }

    /// Attaches user metadata; by convention JSON.
    #[must_use]
    pub fn user_metadata(mut self, meta: &str) -> Self {
        self.user_meta = Some(meta.to_owned());
        self
    }

    fn item(&self, ir: u64) -> &str {
        self.data[ir as usize].as_deref().unwrap_or("")
    }
}

impl ColumnWriter for StringWriter {
    fn name(&self) -> &str {
        &self.name
    }

    fn feather_type(&self) -> FeatherType {
        FeatherType::Utf8
    }

    fn user_metadata(&self) -> Option<&str> {
        self.user_meta.as_deref()
    }

    fn row_count(&self) -> u64 {
        self.data.len() as u64
    }

    fn nullable(&self) -> bool {
        self.nullable
    }

    fn is_null(&self, row: u64) -> bool {
        self.data[row as usize].is_none()
    }

    fn write_data_bytes(&self, out: &mut dyn Write) -> Result<u64> {
        write_var_data(
            out,
            &self.name,
            self.data.len() as u64,
            |ir| util::utf8_len(self.item(ir)),
            |ir, out| {
                out.write_all(self.item(ir).as_bytes())?;
                Ok(())
            },
        )
    }
}

/// Writes a column of byte arrays as BINARY.
pub struct BinaryWriter {
    name: String,
    user_meta: Option<String>,
    nullable: bool,
    data: Vec<Option<Vec<u8>>>,
}

impl BinaryWriter {
    pub fn new(name: &str, nullable: bool, data: Vec<Option<Vec<u8>>>) -> Self {
        BinaryWriter {
            name: name.to_owned(),
            user_meta: None,
            nullable,
            data,
        }
    }

    /// Attaches user metadata; by convention JSON.
    #[must_use]
    pub fn user_metadata(mut self, meta: &str) -> Self {
        self.user_meta = Some(meta.to_owned());
        self
    }

    fn item(&self, ir: u64) -> &[u8] {
        self.data[ir as usize].as_deref().unwrap_or(&[])
    }
}

impl ColumnWriter for BinaryWriter {
    fn name(&self) -> &str {
        &self.name
    }

    fn feather_type(&self) -> FeatherType {
        FeatherType::Binary
    }

    fn user_metadata(&self) -> Option<&str> {
        self.user_meta.as_deref()
    }

    fn row_count(&self) -> u64 {
        self.data.len() as u64
    }

    fn nullable(&self) -> bool {
        self.nullable
    }

    fn is_null(&self, row: u64) -> bool {
        self.data[row as usize].is_none()
    }

    fn write_data_bytes(&self, out: &mut dyn Write) -> Result<u64> {
        write_var_data(
            out,
            &self.name,
            self.data.len() as u64,
            |ir| self.item(ir).len() as u64,
            |ir, out| {
                out.write_all(self.item(ir))?;
                Ok(())
            },
        )
    }
}
