//! Writers for fixed-width numeric columns.

use std::io::{self, Write};

use anyhow::{bail, Result};
use byteorder::{LittleEndian, WriteBytesExt};

use crate::types::FeatherType;
use crate::write::ColumnWriter;

/// A fixed-width value that knows its default column type and its
/// little-endian serialization.
pub trait FixedValue: Copy {
    /// Default column type for this value width.
    const FTYPE: FeatherType;
    /// Serialized size in bytes.
    const SIZE: u64;

    /// Writes this value little-endian.
    ///
    /// # Errors
    ///
    /// I/O errors propagate unchanged.
    fn write_le(self, out: &mut dyn Write) -> io::Result<()>;
}

macro_rules! fixed_value {
    ($ty:ty, $ftype:expr, $size:expr, $self:ident, $out:ident, $wr:expr) => {
        impl FixedValue for $ty {
            const FTYPE: FeatherType = $ftype;
            const SIZE: u64 = $size;
            fn write_le($self, $out: &mut dyn Write) -> io::Result<()> {
                $wr
            }
        }
    };
}

fixed_value!(i8, FeatherType::Int8, 1, self, out, out.write_i8(self));
fixed_value!(i16, FeatherType::Int16, 2, self, out, out.write_i16::<LittleEndian>(self));
fixed_value!(i32, FeatherType::Int32, 4, self, out, out.write_i32::<LittleEndian>(self));
fixed_value!(i64, FeatherType::Int64, 8, self, out, out.write_i64::<LittleEndian>(self));
fixed_value!(u8, FeatherType::UInt8, 1, self, out, out.write_u8(self));
fixed_value!(u16, FeatherType::UInt16, 2, self, out, out.write_u16::<LittleEndian>(self));
fixed_value!(u32, FeatherType::UInt32, 4, self, out, out.write_u32::<LittleEndian>(self));
fixed_value!(f32, FeatherType::Float, 4, self, out, out.write_f32::<LittleEndian>(self));
fixed_value!(f64, FeatherType::Double, 8, self, out, out.write_f64::<LittleEndian>(self));

/// Writes a column of non-nullable fixed-width values.
pub struct PrimitiveWriter<T: FixedValue> {
    name: String,
    ftype: FeatherType,
    user_meta: Option<String>,
    data: Vec<T>,
}

impl<T: FixedValue> PrimitiveWriter<T> {
    /// Creates a writer with the value type's default column type.
    pub fn new(name: &str, data: Vec<T>) -> Self {
        PrimitiveWriter {
            name: name.to_owned(),
            ftype: T::FTYPE,
            user_meta: None,
            data,
        }
    }

    /// Creates a writer with an explicit column type of the same width,
    /// for time-flavoured columns stored as plain integers (TIMESTAMP,
    /// DATE, TIME).
    ///
    /// # Errors
    ///
    /// Returns an error if `ftype` is not a fixed-width type of width
    /// `T::SIZE`.
    pub fn with_type(name: &str, ftype: FeatherType, data: Vec<T>) -> Result<Self> {
        if ftype.element_size() != Some(T::SIZE) {
            bail!(
                "type {} does not store {}-byte values",
                ftype,
                T::SIZE
            );
        }
        Ok(PrimitiveWriter {
            name: name.to_owned(),
            ftype,
            user_meta: None,
            data,
        })
    }

    /// Attaches user metadata; by convention JSON.
    #[must_use]
    pub fn user_metadata(mut self, meta: &str) -> Self {
        self.user_meta = Some(meta.to_owned());
        self
    }
}

impl<T: FixedValue> ColumnWriter for PrimitiveWriter<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn feather_type(&self) -> FeatherType {
        self.ftype
    }

    fn user_metadata(&self) -> Option<&str> {
        self.user_meta.as_deref()
    }

    fn row_count(&self) -> u64 {
        self.data.len() as u64
    }

    fn write_data_bytes(&self, out: &mut dyn Write) -> Result<u64> {
        for &v in &self.data {
            v.write_le(out)?;
        }
        Ok(self.data.len() as u64 * T::SIZE)
    }
}

/// Writes a column of nullable fixed-width values. Null rows get a
/// placeholder value in the data block and a cleared bit in the validity
/// mask.
pub struct NullablePrimitiveWriter<T: FixedValue + Default> {
    name: String,
    ftype: FeatherType,
    user_meta: Option<String>,
    data: Vec<Option<T>>,
}

impl<T: FixedValue + Default> NullablePrimitiveWriter<T> {
    /// Creates a writer with the value type's default column type.
    pub fn new(name: &str, data: Vec<Option<T>>) -> Self {
        NullablePrimitiveWriter {
            name: name.to_owned(),
            ftype: T::FTYPE,
            user_meta: None,
            data,
        }
    }

    /// Creates a writer with an explicit column type of the same width.
    ///
    /// # Errors
    ///
    /// Returns an error if `ftype` is not a fixed-width type of width
    /// `T::SIZE`.
    pub fn with_type(name: &str, ftype: FeatherType, data: Vec<Option<T>>) -> Result<Self> {
        if ftype.element_size() != Some(T::SIZE) {
            bail!(
                "type {} does not store {}-byte values",
                ftype,
                T::SIZE
            );
        }
        Ok(NullablePrimitiveWriter {
            name: name.to_owned(),
            ftype,
            user_meta: None,
            data,
        })
    }

    /// Attaches user metadata; by convention JSON.
    #[must_use]
    pub fn user_metadata(mut self, meta: &str) -> Self {
        self.user_meta = Some(meta.to_owned());
        self
    }
}

impl<T: FixedValue + Default> ColumnWriter for NullablePrimitiveWriter<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn feather_type(&self) -> FeatherType {
        self.ftype
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
        for v in &self.data {
            v.unwrap_or_default().write_le(out)?;
        }
        Ok(self.data.len() as u64 * T::SIZE)
    }
}
