use std::fmt;

use anyhow::Result;
use buf::{Buf, BufMapper};

use crate::decode::{self, Datum, Reader, ValueType};
use crate::types::FeatherType;

/// A column in a readable Feather-format table.
///
/// The column is an immutable view: it records the type, row count, null
/// count, and the byte range in the file, and maps memory only when a
/// reader is created. Readers are independent cursors; acquiring one per
/// thread is cheap and keeps sharing concerns out of scan loops.
pub struct FeatherColumn {
    name: String,
    nrow: u64,
    mapper: BufMapper,
    /// `None` when the file carried a type code outside the known set.
    ftype: Option<FeatherType>,
    null_count: u64,
    user_meta: Option<String>,
}

impl FeatherColumn {
    pub(crate) fn new(
        name: String,
        nrow: u64,
        mapper: BufMapper,
        ftype: Option<FeatherType>,
        null_count: u64,
        user_meta: Option<String>,
    ) -> Self {
        FeatherColumn {
            name,
            nrow,
            mapper,
            ftype,
            null_count,
            user_meta,
        }
    }

    /// Returns the column name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of rows in this column.
    #[must_use]
    pub fn row_count(&self) -> u64 {
        self.nrow
    }

    /// Returns the column type, or `None` for a type code outside the
    /// known set (such columns read as all-null).
    #[must_use]
    pub fn feather_type(&self) -> Option<FeatherType> {
        self.ftype
    }

    /// Returns the number of rows flagged null by the validity mask.
    #[must_use]
    pub fn null_count(&self) -> u64 {
        self.null_count
    }

    /// Returns the optional user metadata string; by convention JSON.
    #[must_use]
    pub fn user_metadata(&self) -> Option<&str> {
        self.user_meta.as_deref()
    }

    /// Creates a reader over this column's data.
    ///
    /// For a column without nulls the whole byte region is handed to the
    /// decoder. Otherwise the region is split into the validity mask and
    /// the data past it, and the decoder is wrapped so masked rows read
    /// as null.
    ///
    /// # Errors
    ///
    /// Returns an error if mapping the column's byte range fails.
    pub fn create_reader(&self) -> Result<Box<dyn Reader>> {
        if self.null_count == 0 {
            let buf = self.mapper.map_buffer()?;
            Ok(self.raw_reader(buf))
        } else {
            // The format documentation calls the mask byte-aligned, but
            // files in the wild have it on 64-bit boundaries.
            let data_offset = (self.nrow + 63) / 64 * 8;
            let mask = self.mapper.map_range(0, data_offset)?;
            let data = self
                .mapper
                .map_range(data_offset, self.mapper.length() - data_offset)?;
            Ok(Box::new(MaskedReader {
                inner: self.raw_reader(data),
                mask,
            }))
        }
    }

    fn raw_reader(&self, buf: Buf) -> Box<dyn Reader> {
        match self.ftype {
            Some(ftype) => decode::create_reader(ftype, buf, self.nrow),
            None => decode::null_reader(),
        }
    }
}

impl fmt::Display for FeatherColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        match self.ftype {
            Some(t) => write!(f, "{}", t)?,
            None => write!(f, "?")?,
        }
        if self.null_count > 0 {
            write!(f, ",nulls={}", self.null_count)?;
        }
        if let Some(um) = self.user_meta.as_deref().filter(|m| !m.trim().is_empty()) {
            write!(f, ":\"{}\"", um)?;
        }
        write!(f, ")")
    }
}

/// Applies a validity mask to an underlying data reader.
///
/// Mask bit set means valid. Masked rows answer `true` from `is_null`,
/// `Datum::Null` from `datum`, NaN from the float views, and 0 from the
/// integer views — nullness travels through `is_null`, never through a
/// primitive return value.
struct MaskedReader {
    inner: Box<dyn Reader>,
    mask: Buf,
}

impl MaskedReader {
    fn is_valid(&self, ix: u64) -> bool {
        self.mask.is_bit_set(ix)
    }
}

impl Reader for MaskedReader {
    fn value_type(&self) -> ValueType {
        self.inner.value_type()
    }
    fn is_null(&self, ix: u64) -> bool {
        !self.is_valid(ix)
    }
    fn datum(&self, ix: u64) -> Datum {
        if self.is_valid(ix) {
            self.inner.datum(ix)
        } else {
            Datum::Null
        }
    }
    fn get_i8(&self, ix: u64) -> i8 {
        if self.is_valid(ix) {
            self.inner.get_i8(ix)
        } else {
            0
        }
    }
    fn get_i16(&self, ix: u64) -> i16 {
        if self.is_valid(ix) {
            self.inner.get_i16(ix)
        } else {
            0
        }
    }
    fn get_i32(&self, ix: u64) -> i32 {
        if self.is_valid(ix) {
            self.inner.get_i32(ix)
        } else {
            0
        }
    }
    fn get_i64(&self, ix: u64) -> i64 {
        if self.is_valid(ix) {
            self.inner.get_i64(ix)
        } else {
            0
        }
    }
    fn get_f32(&self, ix: u64) -> f32 {
        if self.is_valid(ix) {
            self.inner.get_f32(ix)
        } else {
            f32::NAN
        }
    }
    fn get_f64(&self, ix: u64) -> f64 {
        if self.is_valid(ix) {
            self.inner.get_f64(ix)
        } else {
            f64::NAN
        }
    }
}
