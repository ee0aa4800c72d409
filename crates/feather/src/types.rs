use std::fmt;

/// Feather-format column type codes.
///
/// The wire byte for each variant is fixed by the format's metadata schema
/// and must never change. `UInt64` and `Category` are recognized so files
/// containing them still load, but they decode to an always-null stub.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FeatherType {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float,
    Double,
    Utf8,
    Binary,
    Category,
    Timestamp,
    Date,
    Time,
    LargeUtf8,
    LargeBinary,
}

impl FeatherType {
    /// Every type in wire-code order.
    pub const ALL: [FeatherType; 19] = [
        FeatherType::Bool,
        FeatherType::Int8,
        FeatherType::Int16,
        FeatherType::Int32,
        FeatherType::Int64,
        FeatherType::UInt8,
        FeatherType::UInt16,
        FeatherType::UInt32,
        FeatherType::UInt64,
        FeatherType::Float,
        FeatherType::Double,
        FeatherType::Utf8,
        FeatherType::Binary,
        FeatherType::Category,
        FeatherType::Timestamp,
        FeatherType::Date,
        FeatherType::Time,
        FeatherType::LargeUtf8,
        FeatherType::LargeBinary,
    ];

    /// Returns the byte code stored in the metadata block for this type.
    #[must_use]
    pub fn type_byte(self) -> u8 {
        match self {
            FeatherType::Bool => 0,
            FeatherType::Int8 => 1,
            FeatherType::Int16 => 2,
            FeatherType::Int32 => 3,
            FeatherType::Int64 => 4,
            FeatherType::UInt8 => 5,
            FeatherType::UInt16 => 6,
            FeatherType::UInt32 => 7,
            FeatherType::UInt64 => 8,
            FeatherType::Float => 9,
            FeatherType::Double => 10,
            FeatherType::Utf8 => 11,
            FeatherType::Binary => 12,
            FeatherType::Category => 13,
            FeatherType::Timestamp => 14,
            FeatherType::Date => 15,
            FeatherType::Time => 16,
            FeatherType::LargeUtf8 => 17,
            FeatherType::LargeBinary => 18,
        }
    }

    /// Returns the type for a given byte code, or `None` if the code is
    /// not part of the closed set.
    #[must_use]
    pub fn from_byte(fbyte: u8) -> Option<FeatherType> {
        Self::ALL.iter().copied().find(|t| t.type_byte() == fbyte)
    }

    /// Returns the serialized element width in bytes for fixed-width
    /// types; `None` for bit-packed, variable-length, and dictionary
    /// types.
    #[must_use]
    pub fn element_size(self) -> Option<u64> {
        match self {
            FeatherType::Int8 | FeatherType::UInt8 => Some(1),
            FeatherType::Int16 | FeatherType::UInt16 => Some(2),
            FeatherType::Int32 | FeatherType::UInt32 | FeatherType::Float | FeatherType::Date => {
                Some(4)
            }
            FeatherType::Int64
            | FeatherType::UInt64
            | FeatherType::Double
            | FeatherType::Timestamp
            | FeatherType::Time => Some(8),
            FeatherType::Bool
            | FeatherType::Utf8
            | FeatherType::Binary
            | FeatherType::Category
            | FeatherType::LargeUtf8
            | FeatherType::LargeBinary => None,
        }
    }
}

impl fmt::Display for FeatherType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FeatherType::Bool => "BOOL",
            FeatherType::Int8 => "INT8",
            FeatherType::Int16 => "INT16",
            FeatherType::Int32 => "INT32",
            FeatherType::Int64 => "INT64",
            FeatherType::UInt8 => "UINT8",
            FeatherType::UInt16 => "UINT16",
            FeatherType::UInt32 => "UINT32",
            FeatherType::UInt64 => "UINT64",
            FeatherType::Float => "FLOAT",
            FeatherType::Double => "DOUBLE",
            FeatherType::Utf8 => "UTF8",
            FeatherType::Binary => "BINARY",
            FeatherType::Category => "CATEGORY",
            FeatherType::Timestamp => "TIMESTAMP",
            FeatherType::Date => "DATE",
            FeatherType::Time => "TIME",
            FeatherType::LargeUtf8 => "LARGE_UTF8",
            FeatherType::LargeBinary => "LARGE_BINARY",
        };
        f.write_str(name)
    }
}
