//! Metadata footer encode/parse.
//!
//! The block between the column data and the trailing
//! `[u32 length][magic]` is a flatbuffer holding the table description:
//!
//! ```text
//! CTable         { description: string?, num_rows: i64, columns: [Column],
//!                  version: i32, metadata: string? }
//! Column         { name: string, values: PrimitiveArray,
//!                  user_metadata: string? }
//! PrimitiveArray { type: u8, offset: i64, length: i64, null_count: i64,
//!                  total_bytes: i64 }
//! ```
//!
//! Field ids follow the schema declaration order above (`Column` reserves
//! two ids for the dictionary-metadata union it never writes), so blocks
//! written here parse with stock flatbuffer tooling and vice versa. The
//! wire handling is self-contained — vtable-driven, bounds-checked reads
//! on the way in, a forward writer with offset backpatching on the way
//! out — rather than a generated binding, keeping the crate free of a
//! codegen dependency for a schema this small.
//!
//! Encoded blocks are always padded to a multiple of 8 bytes.

use anyhow::{bail, ensure, Result};

/// CTable field ids.
const CT_DESCRIPTION: u16 = 0;
const CT_NUM_ROWS: u16 = 1;
const CT_COLUMNS: u16 = 2;
const CT_VERSION: u16 = 3;
const CT_METADATA: u16 = 4;

/// Column field ids (2 and 3 are the unwritten dictionary-metadata union).
const COL_NAME: u16 = 0;
const COL_VALUES: u16 = 1;
const COL_USER_METADATA: u16 = 4;

/// PrimitiveArray field ids (1 is the unwritten encoding enum).
const PA_TYPE: u16 = 0;
const PA_OFFSET: u16 = 2;
const PA_LENGTH: u16 = 3;
const PA_NULL_COUNT: u16 = 4;
const PA_TOTAL_BYTES: u16 = 5;

/// Parsed table-level metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct TableMeta {
    pub version: i32,
    pub num_rows: i64,
    pub description: Option<String>,
    pub metadata: Option<String>,
    pub columns: Vec<ColumnMeta>,
}

/// Parsed per-column metadata, with the `PrimitiveArray` fields flattened
/// in.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMeta {
    pub name: String,
    pub user_metadata: Option<String>,
    /// Raw wire type code; may be outside the known set.
    pub type_byte: u8,
    /// Absolute file offset of the column's byte region.
    pub offset: i64,
    /// Logical row count.
    pub length: i64,
    pub null_count: i64,
    /// Size of the column's byte region.
    pub total_bytes: i64,
}

impl TableMeta {
    /// Serializes this metadata as a flatbuffer block, padded to a
    /// multiple of 8 bytes.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut w = BlockWriter::default();

        // Root reference, patched once the CTable position is known.
        w.put_u32(0);

        let ct_vt = w.put_vtable(
            28,
            &[
                if self.description.is_some() { 16 } else { 0 },
                8,
                20,
                4,
                if self.metadata.is_some() { 24 } else { 0 },
            ],
        );
        w.pad_to(8);
        let ct = w.pos();
        w.put_i32((ct - ct_vt) as i32);
        w.put_i32(self.version);
        w.put_i64(self.num_rows);
        let desc_ref = w.pos();
        w.put_u32(0);
        let cols_ref = w.pos();
        w.put_u32(0);
        let meta_ref = w.pos();
        w.put_u32(0);
        w.patch_u32(0, ct as u32);

        w.pad_to(4);
        let vec_pos = w.pos();
        w.put_u32(self.columns.len() as u32);
        let slot0 = w.pos();
        for _ in &self.columns {
            w.put_u32(0);
        }
        w.patch_ref(cols_ref, vec_pos);

        if let Some(d) = &self.description {
            let p = w.put_str(d);
            w.patch_ref(desc_ref, p);
        }
        if let Some(m) = &self.metadata {
            let p = w.put_str(m);
            w.patch_ref(meta_ref, p);
        }

        for (ic, col) in self.columns.iter().enumerate() {
            let col_vt = w.put_vtable(
                16,
                &[
                    4,
                    8,
                    0,
                    0,
                    if col.user_metadata.is_some() { 12 } else { 0 },
                ],
            );
            w.pad_to(4);
            let cp = w.pos();
            w.put_i32((cp - col_vt) as i32);
            let name_ref = w.pos();
            w.put_u32(0);
            let values_ref = w.pos();
            w.put_u32(0);
            let um_ref = w.pos();
            w.put_u32(0);
            w.patch_ref(slot0 + 4 * ic, cp);

            let p = w.put_str(&col.name);
            w.patch_ref(name_ref, p);
            if let Some(um) = &col.user_metadata {
                let p = w.put_str(um);
                w.patch_ref(um_ref, p);
            }

            let pa_vt = w.put_vtable(40, &[4, 0, 8, 16, 24, 32]);
            w.pad_to(8);
            let pa = w.pos();
            w.put_i32((pa - pa_vt) as i32);
            w.put_u8(col.type_byte);
            w.put_u8(0);
            w.put_u16(0);
            w.put_i64(col.offset);
            w.put_i64(col.length);
            w.put_i64(col.null_count);
            w.put_i64(col.total_bytes);
            w.patch_ref(values_ref, pa);
        }

        w.pad_to(8);
        w.into_bytes()
    }

    /// Parses a metadata block.
    ///
    /// # Errors
    ///
    /// Returns an error if any offset, vtable, string, or vector runs
    /// outside the block; a malformed footer must fail the load rather
    /// than yield a half-parsed table.
    pub fn parse(block: &[u8]) -> Result<TableMeta> {
        let root = rd_u32(block, 0)? as usize;
        let ct = Table::at(block, root)?;
        let version = ct.i32_field(block, CT_VERSION, 0)?;
        let num_rows = ct.i64_field(block, CT_NUM_ROWS, 0)?;
        let description = ct.str_field(block, CT_DESCRIPTION)?;
        let metadata = ct.str_field(block, CT_METADATA)?;

        let mut columns = Vec::new();
        if let Some(fp) = ct.field_pos(block, CT_COLUMNS)? {
            let vec_pos = ref_target(block, fp)?;
            let count = rd_u32(block, vec_pos)? as usize;
            for ic in 0..count {
                let cp = ref_target(block, vec_pos + 4 + 4 * ic)?;
                let col = Table::at(block, cp)?;
                let name = col.str_field(block, COL_NAME)?.unwrap_or_default();
                let user_metadata = col.str_field(block, COL_USER_METADATA)?;
                let Some(vp) = col.field_pos(block, COL_VALUES)? else {
                    bail!("metadata column {} has no values array", ic);
                };
                let pa = Table::at(block, ref_target(block, vp)?)?;
                columns.push(ColumnMeta {
                    name,
                    user_metadata,
                    type_byte: pa.u8_field(block, PA_TYPE, 0)?,
                    offset: pa.i64_field(block, PA_OFFSET, 0)?,
                    length: pa.i64_field(block, PA_LENGTH, 0)?,
                    null_count: pa.i64_field(block, PA_NULL_COUNT, 0)?,
                    total_bytes: pa.i64_field(block, PA_TOTAL_BYTES, 0)?,
                });
            }
        }

        Ok(TableMeta {
            version,
            num_rows,
            description,
            metadata,
            columns,
        })
    }
}

// -------------------- bounds-checked primitive reads --------------------

fn rd_bytes<'a>(buf: &'a [u8], pos: usize, n: usize) -> Result<&'a [u8]> {
    match buf.get(pos..pos + n) {
        Some(b) => Ok(b),
        None => bail!(
            "metadata block truncated: {} bytes at {} exceed length {}",
            n,
            pos,
            buf.len()
        ),
    }
}

fn rd_u8(buf: &[u8], pos: usize) -> Result<u8> {
    Ok(rd_bytes(buf, pos, 1)?[0])
}

fn rd_u16(buf: &[u8], pos: usize) -> Result<u16> {
    let b = rd_bytes(buf, pos, 2)?;
    Ok(u16::from_le_bytes([b[0], b[1]]))
}

fn rd_u32(buf: &[u8], pos: usize) -> Result<u32> {
    let b = rd_bytes(buf, pos, 4)?;
    Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

fn rd_i32(buf: &[u8], pos: usize) -> Result<i32> {
    Ok(rd_u32(buf, pos)? as i32)
}

fn rd_i64(buf: &[u8], pos: usize) -> Result<i64> {
    let b = rd_bytes(buf, pos, 8)?;
    let mut a = [0u8; 8];
    a.copy_from_slice(b);
    Ok(i64::from_le_bytes(a))
}

/// Resolves a table/string/vector reference field: the `u32` at `fp` is an
/// offset forward from `fp` itself.
fn ref_target(buf: &[u8], fp: usize) -> Result<usize> {
    let rel = rd_u32(buf, fp)? as usize;
    let target = fp + rel;
    ensure!(target < buf.len(), "metadata reference out of range");
    Ok(target)
}

/// A flatbuffer table position with its resolved vtable.
struct Table {
    pos: usize,
    vtable: usize,
    vsize: u16,
}

impl Table {
    fn at(buf: &[u8], pos: usize) -> Result<Table> {
        let soffset = rd_i32(buf, pos)? as i64;
        let vt = pos as i64 - soffset;
        ensure!(
            vt >= 0 && (vt as usize) + 4 <= buf.len(),
            "metadata vtable out of range"
        );
        let vtable = vt as usize;
        let vsize = rd_u16(buf, vtable)?;
        ensure!(
            vsize >= 4 && vtable + vsize as usize <= buf.len(),
            "metadata vtable malformed"
        );
        Ok(Table { pos, vtable, vsize })
    }

    /// Returns the absolute position of a field's inline data, or `None`
    /// if the field is absent.
    fn field_pos(&self, buf: &[u8], id: u16) -> Result<Option<usize>> {
        let entry = self.vtable + 4 + 2 * id as usize;
        if entry + 2 > self.vtable + self.vsize as usize {
            return Ok(None);
        }
        let off = rd_u16(buf, entry)?;
        Ok(if off == 0 {
            None
        } else {
            Some(self.pos + off as usize)
        })
    }

    fn u8_field(&self, buf: &[u8], id: u16, default: u8) -> Result<u8> {
        match self.field_pos(buf, id)? {
            Some(fp) => rd_u8(buf, fp),
            None => Ok(default),
        }
    }

    fn i32_field(&self, buf: &[u8], id: u16, default: i32) -> Result<i32> {
        match self.field_pos(buf, id)? {
            Some(fp) => rd_i32(buf, fp),
            None => Ok(default),
        }
    }

    fn i64_field(&self, buf: &[u8], id: u16, default: i64) -> Result<i64> {
        match self.field_pos(buf, id)? {
            Some(fp) => rd_i64(buf, fp),
            None => Ok(default),
        }
    }

    fn str_field(&self, buf: &[u8], id: u16) -> Result<Option<String>> {
        let Some(fp) = self.field_pos(buf, id)? else {
            return Ok(None);
        };
        let spos = ref_target(buf, fp)?;
        let len = rd_u32(buf, spos)? as usize;
        let bytes = rd_bytes(buf, spos + 4, len)?;
        Ok(Some(String::from_utf8_lossy(bytes).into_owned()))
    }
}

// -------------------- forward block writer --------------------

/// Appends flatbuffer pieces front to back, parents before children, and
/// backpatches forward references once the child position is known.
#[derive(Default)]
struct BlockWriter {
    buf: Vec<u8>,
}

impl BlockWriter {
    fn pos(&self) -> usize {
        self.buf.len()
    }

    fn put_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn put_u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn put_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn put_i32(&mut self, v: i32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn put_i64(&mut self, v: i64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn pad_to(&mut self, align: usize) {
        while self.buf.len() % align != 0 {
            self.buf.push(0);
        }
    }

    fn patch_u32(&mut self, at: usize, v: u32) {
        self.buf[at..at + 4].copy_from_slice(&v.to_le_bytes());
    }

    /// Patches the `u32` reference slot at `field_pos` to point at
    /// `target_pos` (which must not precede it).
    fn patch_ref(&mut self, field_pos: usize, target_pos: usize) {
        self.patch_u32(field_pos, (target_pos - field_pos) as u32);
    }

    /// Writes a vtable with inline field offsets in field-id order
    /// (0 marks an absent field) and returns its position.
    fn put_vtable(&mut self, table_len: u16, entries: &[u16]) -> usize {
        self.pad_to(2);
        let p = self.pos();
        self.put_u16(4 + 2 * entries.len() as u16);
        self.put_u16(table_len);
        for &e in entries {
            self.put_u16(e);
        }
        p
    }

    /// Writes a length-prefixed, NUL-terminated string and returns its
    /// position.
    fn put_str(&mut self, s: &str) -> usize {
        self.pad_to(4);
        let p = self.pos();
        self.put_u32(s.len() as u32);
        self.buf.extend_from_slice(s.as_bytes());
        self.buf.push(0);
        p
    }

    fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}
