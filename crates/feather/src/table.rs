use std::fmt;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use byteorder::{LittleEndian, ReadBytesExt};
use buf::BufMapper;
use log::warn;

use crate::column::FeatherColumn;
use crate::decode;
use crate::meta::TableMeta;
use crate::types::FeatherType;

/// Feather magic number, the ASCII bytes `FEA1` read as a little-endian
/// `u32`. Appears in the first 4 bytes of the file and the last 4.
pub const MAGIC: u32 = 0x3141_4546;

/// Smallest possible file: leading magic + reserved word, empty metadata
/// block, metadata length, trailing magic.
const MIN_FILE_BYTES: u64 = 16;

/// A readable view of a Feather-format table on disk.
///
/// Built once from the parsed metadata footer; immutable afterwards, so
/// columns can be scanned from any number of threads. Column data is
/// memory mapped lazily per [`FeatherColumn::create_reader`] call, and
/// mappings are released when the readers holding them drop.
pub struct FeatherTable {
    version: i32,
    nrow: u64,
    description: Option<String>,
    metadata: Option<String>,
    columns: Vec<FeatherColumn>,
}

impl FeatherTable {
    /// Opens a Feather-format file.
    ///
    /// Validates the leading magic, reads the metadata length and trailing
    /// magic from the last 8 bytes, parses the metadata block, and builds
    /// a column view (with a mapper scoped to the column's byte range) for
    /// each column descriptor. Columns with an unknown or unsupported type
    /// code are kept, with a warning — they read as all-null rather than
    /// failing the load.
    ///
    /// # Errors
    ///
    /// Returns an error if either magic is missing, the metadata block is
    /// unparsable or overruns the file, or any read fails.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<FeatherTable> {
        let path = path.as_ref();
        let mut f = File::open(path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        let leng = f.metadata()?.len();
        if leng < MIN_FILE_BYTES {
            bail!("not a Feather-format file (only {} bytes)", leng);
        }

        let magic1 = f.read_u32::<LittleEndian>()?;
        if magic1 != MAGIC {
            bail!("not a Feather-format file (no FEA1 magic at file start)");
        }
        f.seek(SeekFrom::End(-8))?;
        let meta_leng = f.read_u32::<LittleEndian>()? as u64;
        let magic2 = f.read_u32::<LittleEndian>()?;
        if magic2 != MAGIC {
            bail!("not a Feather-format file (no FEA1 magic at file end)");
        }
        if meta_leng + MIN_FILE_BYTES > leng {
            bail!("metadata length {} overruns {}-byte file", meta_leng, leng);
        }

        f.seek(SeekFrom::Start(leng - 8 - meta_leng))?;
        let mut metabuf = vec![0u8; meta_leng as usize];
        f.read_exact(&mut metabuf)?;
        let meta = TableMeta::parse(&metabuf).context("unparsable Feather metadata block")?;

        let file = Arc::new(f);
        let nrow = meta.num_rows.max(0) as u64;
        let columns = meta
            .columns
            .iter()
            .map(|cm| {
                let ftype = FeatherType::from_byte(cm.type_byte);
                match ftype {
                    None => warn!(
                        "unknown type code {} for column {}, values will read as null",
                        cm.type_byte, cm.name
                    ),
                    Some(t) if !decode::is_decodable(t) => warn!(
                        "no decoder for data type {} in column {}, values will read as null",
                        t, cm.name
                    ),
                    Some(_) => {}
                }
                let mapper =
                    BufMapper::new(file.clone(), cm.offset.max(0) as u64, cm.total_bytes.max(0) as u64);
                FeatherColumn::new(
                    cm.name.clone(),
                    nrow,
                    mapper,
                    ftype,
                    cm.null_count.max(0) as u64,
                    cm.user_metadata.clone(),
                )
            })
            .collect();

        Ok(FeatherTable {
            version: meta.version,
            nrow,
            description: meta.description,
            metadata: meta.metadata,
            columns,
        })
    }

    /// Returns the number of columns in this table.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Returns the number of rows in this table.
    #[must_use]
    pub fn row_count(&self) -> u64 {
        self.nrow
    }

    /// Returns one of the columns.
    #[must_use]
    pub fn column(&self, icol: usize) -> &FeatherColumn {
        &self.columns[icol]
    }

    /// Iterates over the columns in declared order.
    pub fn columns(&self) -> impl Iterator<Item = &FeatherColumn> {
        self.columns.iter()
    }

    /// Returns the optional table description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the optional table user metadata string; by convention
    /// JSON.
    #[must_use]
    pub fn metadata(&self) -> Option<&str> {
        self.metadata.as_deref()
    }

    /// Returns the Feather format version recorded in the file.
    #[must_use]
    pub fn version(&self) -> i32 {
        self.version
    }

    /// Indicates whether `intro` begins with the FEA1 magic required at
    /// both ends of a Feather-format file. Useful for format sniffing.
    #[must_use]
    pub fn is_magic(intro: &[u8]) -> bool {
        intro.len() >= 4
            && MAGIC
                == (intro[0] as u32)
                    | ((intro[1] as u32) << 8)
                    | ((intro[2] as u32) << 16)
                    | ((intro[3] as u32) << 24)
    }
}

impl fmt::Display for FeatherTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Feather ({}x{}): ", self.columns.len(), self.nrow)?;
        for (ic, col) in self.columns.iter().enumerate() {
            if ic > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", col)?;
        }
        Ok(())
    }
}
