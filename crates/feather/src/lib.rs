//! Read and write access to Feather-format column-store files.
//!
//! ## File Layout
//!
//! ```text
//! +--------------------------------------+
//! | magic "FEA1" (4B) | reserved 0 (4B)  |
//! +--------------------------------------+
//! | column 0 block (8-byte aligned)      |
//! |   [validity mask, if nulls]          |
//! |   [offset table, if var-length]      |
//! |   [data bytes]                       |
//! +--------------------------------------+
//! | column 1 block ...                   |
//! +--------------------------------------+
//! | metadata block (flatbuffer, 8-byte   |
//! |   aligned)                           |
//! +--------------------------------------+
//! | metadata length (u32) | magic "FEA1" |
//! +--------------------------------------+
//! ```
//!
//! All multi-byte values are little-endian. The metadata block records,
//! per column, a name, a type code, and the absolute offset and size of
//! its byte region, so columns are independently addressable: reading one
//! column touches none of the others.
//!
//! ## Reading
//!
//! [`FeatherTable::from_file`] validates both magics, parses the footer,
//! and exposes one [`FeatherColumn`] per column. Columns hand out
//! [`Reader`] cursors backed by memory-mapped file ranges; cell access is
//! random and allocation-free for fixed-width types. Files larger than a
//! single mapping comfortably covers are mapped in lazily-created banks.
//!
//! ## Writing
//!
//! [`FeatherWriter`] streams a table in one forward pass: declare
//! [`ColumnWriter`]s, then [`write`](FeatherWriter::write) to any `Write`
//! sink. Each column writer knows its own row count, nullability, and
//! serialization; the framing, alignment, and footer assembly live here.

mod column;
mod decode;
mod meta;
mod table;
mod types;
mod write;
mod writer;

pub use column::FeatherColumn;
pub use decode::{Datum, Reader, ValueType};
pub use meta::{ColumnMeta, TableMeta};
pub use table::{FeatherTable, MAGIC};
pub use types::FeatherType;
pub use write::{
    BinaryWriter, BoolWriter, ColStat, ColumnWriter, FixedValue, NullableBoolWriter,
    NullablePrimitiveWriter, PrimitiveWriter, StringWriter,
};
pub use writer::{FeatherWriter, FEATHER_VERSION};

#[cfg(test)]
mod tests;
