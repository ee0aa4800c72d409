use std::io::{BufWriter, Write};

use anyhow::Result;
use byteorder::{LittleEndian, WriteBytesExt};

use crate::meta::{ColumnMeta, TableMeta};
use crate::table::MAGIC;
use crate::write::{ColStat, ColumnWriter};

/// Format version recorded in the metadata footer.
pub const FEATHER_VERSION: i32 = 1;

/// Writes a Feather-format table in a single forward pass.
///
/// Columns are declared up front, then [`write`](FeatherWriter::write)
/// streams magic, column blocks, and the metadata footer to any `Write`
/// sink. Nothing seeks, so the sink can be a pipe as easily as a file.
///
/// If the declared columns disagree on row count, the table's row count
/// is the smallest; longer columns keep their extra bytes on disk but
/// readers never look at them.
#[derive(Default)]
pub struct FeatherWriter {
    description: Option<String>,
    table_metadata: Option<String>,
    writers: Vec<Box<dyn ColumnWriter>>,
}

impl FeatherWriter {
    #[must_use]
    pub fn new() -> Self {
        FeatherWriter::default()
    }

    /// Sets the optional table description.
    pub fn set_description(&mut self, description: &str) {
        self.description = Some(description.to_owned());
    }

    /// Sets the optional table user metadata string; by convention JSON.
    pub fn set_table_metadata(&mut self, metadata: &str) {
        self.table_metadata = Some(metadata.to_owned());
    }

    /// Appends a column. Serialization order is declaration order.
    pub fn add_column(&mut self, writer: Box<dyn ColumnWriter>) {
        self.writers.push(writer);
    }

    /// Writes the complete file: leading magic, column blocks, metadata
    /// block, metadata length, trailing magic.
    ///
    /// # Errors
    ///
    /// Returns an error if any write to the sink fails.
    pub fn write<W: Write>(&self, out: W) -> Result<()> {
        let mut out = BufWriter::new(out);

        out.write_u32::<LittleEndian>(MAGIC)?;
        out.write_u32::<LittleEndian>(0)?;
        let base_offset = 8u64;

        let mut stats: Vec<ColStat> = Vec::with_capacity(self.writers.len());
        for cw in &self.writers {
            let stat = cw.write_column_bytes(&mut out)?;
            debug_assert!(stat.byte_count() % 8 == 0);
            stats.push(stat);
        }

        let meta = self.metadata_block(&stats, base_offset);
        let block = meta.encode();
        debug_assert!(block.len() % 8 == 0);
        out.write_all(&block)?;
        out.write_u32::<LittleEndian>(block.len() as u32)?;
        out.write_u32::<LittleEndian>(MAGIC)?;
        out.flush()?;
        Ok(())
    }

    /// Assembles the footer metadata from the per-column write results.
    ///
    /// For a column without nulls the recorded offset points past the
    /// (absent) mask straight at the data, and `total_bytes` shrinks to
    /// match; readers hand the whole recorded region to the decoder.
    fn metadata_block(&self, stats: &[ColStat], base_offset: u64) -> TableMeta {
        let mut stream_offset = base_offset;
        let mut num_rows: Option<u64> = None;
        let mut columns = Vec::with_capacity(stats.len());
        for (cw, stat) in self.writers.iter().zip(stats) {
            let internal = if stat.null_count() == 0 {
                stat.data_offset()
            } else {
                0
            };
            columns.push(ColumnMeta {
                name: cw.name().to_owned(),
                user_metadata: cw.user_metadata().map(str::to_owned),
                type_byte: cw.feather_type().type_byte(),
                offset: (stream_offset + internal) as i64,
                length: stat.row_count() as i64,
                null_count: stat.null_count() as i64,
                total_bytes: (stat.byte_count() - internal) as i64,
            });
            stream_offset += stat.byte_count();
            num_rows = Some(match num_rows {
                Some(n) => n.min(stat.row_count()),
                None => stat.row_count(),
            });
        }
        TableMeta {
            version: FEATHER_VERSION,
            num_rows: num_rows.unwrap_or(0) as i64,
            description: self.description.clone(),
            metadata: self.table_metadata.clone(),
            columns,
        }
    }
}
