//! Element type identifiers and their Arrow mapping.

use std::fmt;

use arrow::datatypes::{DataType as ArrowDataType, TimeUnit};
use serde::{Deserialize, Serialize};

/// Element types understood by the dispatch layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TypeId {
    Int8,
    Int16,
    Int32,
    Int64,
    #[serde(rename = "UINT8")]
    UInt8,
    #[serde(rename = "UINT16")]
    UInt16,
    #[serde(rename = "UINT32")]
    UInt32,
    #[serde(rename = "UINT64")]
    UInt64,
    Float32,
    Float64,
    Bool8,
    /// Days since epoch.
    TimestampDays,
    TimestampSeconds,
    TimestampMilliseconds,
    TimestampMicroseconds,
    TimestampNanoseconds,
    DurationSeconds,
    DurationMilliseconds,
    DurationMicroseconds,
    DurationNanoseconds,
    /// UTF-8 string.
    String,
}

impl TypeId {
    /// Every supported type, in declaration order.
    pub const ALL: [TypeId; 21] = [
        TypeId::Int8,
        TypeId::Int16,
        TypeId::Int32,
        TypeId::Int64,
        TypeId::UInt8,
        TypeId::UInt16,
        TypeId::UInt32,
        TypeId::UInt64,
        TypeId::Float32,
        TypeId::Float64,
        TypeId::Bool8,
        TypeId::TimestampDays,
        TypeId::TimestampSeconds,
        TypeId::TimestampMilliseconds,
        TypeId::TimestampMicroseconds,
        TypeId::TimestampNanoseconds,
        TypeId::DurationSeconds,
        TypeId::DurationMilliseconds,
        TypeId::DurationMicroseconds,
        TypeId::DurationNanoseconds,
        TypeId::String,
    ];

    /// Returns the upper-case name of the type.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            TypeId::Int8 => "INT8",
            TypeId::Int16 => "INT16",
            TypeId::Int32 => "INT32",
            TypeId::Int64 => "INT64",
            TypeId::UInt8 => "UINT8",
            TypeId::UInt16 => "UINT16",
            TypeId::UInt32 => "UINT32",
            TypeId::UInt64 => "UINT64",
            TypeId::Float32 => "FLOAT32",
            TypeId::Float64 => "FLOAT64",
            TypeId::Bool8 => "BOOL8",
            TypeId::TimestampDays => "TIMESTAMP_DAYS",
            TypeId::TimestampSeconds => "TIMESTAMP_SECONDS",
            TypeId::TimestampMilliseconds => "TIMESTAMP_MILLISECONDS",
            TypeId::TimestampMicroseconds => "TIMESTAMP_MICROSECONDS",
            TypeId::TimestampNanoseconds => "TIMESTAMP_NANOSECONDS",
            TypeId::DurationSeconds => "DURATION_SECONDS",
            TypeId::DurationMilliseconds => "DURATION_MILLISECONDS",
            TypeId::DurationMicroseconds => "DURATION_MICROSECONDS",
            TypeId::DurationNanoseconds => "DURATION_NANOSECONDS",
            TypeId::String => "STRING",
        }
    }

    /// Returns the width in bits for fixed-width types.
    #[must_use]
    pub fn bit_width(&self) -> Option<u32> {
        match self {
            TypeId::Int8 | TypeId::UInt8 | TypeId::Bool8 => Some(8),
            TypeId::Int16 | TypeId::UInt16 => Some(16),
            TypeId::Int32 | TypeId::UInt32 | TypeId::Float32 | TypeId::TimestampDays => Some(32),
            TypeId::String => None,
            _ => Some(64),
        }
    }

    /// Returns whether this is a signed or unsigned integer type.
    #[must_use]
    pub fn is_integral(&self) -> bool {
        self.is_signed_integral() || self.is_unsigned_integral()
    }

    /// Returns whether this is a signed integer type.
    #[must_use]
    pub fn is_signed_integral(&self) -> bool {
        matches!(
            self,
            TypeId::Int8 | TypeId::Int16 | TypeId::Int32 | TypeId::Int64
        )
    }

    /// Returns whether this is an unsigned integer type.
    #[must_use]
    pub fn is_unsigned_integral(&self) -> bool {
        matches!(
            self,
            TypeId::UInt8 | TypeId::UInt16 | TypeId::UInt32 | TypeId::UInt64
        )
    }

    /// Returns whether this is a floating point type.
    #[must_use]
    pub fn is_floating(&self) -> bool {
        matches!(self, TypeId::Float32 | TypeId::Float64)
    }

    /// Returns whether this type is numeric (integers and floats, not BOOL8).
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        self.is_integral() || self.is_floating()
    }

    /// Returns whether this is a timestamp type.
    #[must_use]
    pub fn is_timestamp(&self) -> bool {
        self.resolution().is_some() && !self.is_duration()
    }

    /// Returns whether this is a duration type.
    #[must_use]
    pub fn is_duration(&self) -> bool {
        matches!(
            self,
            TypeId::DurationSeconds
                | TypeId::DurationMilliseconds
                | TypeId::DurationMicroseconds
                | TypeId::DurationNanoseconds
        )
    }

    /// Returns whether this is a timestamp or duration type.
    #[must_use]
    pub fn is_temporal(&self) -> bool {
        self.resolution().is_some()
    }

    /// Returns the temporal resolution, finer resolutions comparing greater.
    #[must_use]
    pub fn resolution(&self) -> Option<Resolution> {
        match self {
            TypeId::TimestampDays => Some(Resolution::Days),
            TypeId::TimestampSeconds | TypeId::DurationSeconds => Some(Resolution::Seconds),
            TypeId::TimestampMilliseconds | TypeId::DurationMilliseconds => {
                Some(Resolution::Milliseconds)
            }
            TypeId::TimestampMicroseconds | TypeId::DurationMicroseconds => {
                Some(Resolution::Microseconds)
            }
            TypeId::TimestampNanoseconds | TypeId::DurationNanoseconds => {
                Some(Resolution::Nanoseconds)
            }
            _ => None,
        }
    }

    /// Returns the timestamp type at the given resolution.
    #[must_use]
    pub fn timestamp(resolution: Resolution) -> Self {
        match resolution {
            Resolution::Days => TypeId::TimestampDays,
            Resolution::Seconds => TypeId::TimestampSeconds,
            Resolution::Milliseconds => TypeId::TimestampMilliseconds,
            Resolution::Microseconds => TypeId::TimestampMicroseconds,
            Resolution::Nanoseconds => TypeId::TimestampNanoseconds,
        }
    }

    /// Returns the duration type at the given resolution.
    ///
    /// Durations have no day resolution; `Days` maps to seconds.
    #[must_use]
    pub fn duration(resolution: Resolution) -> Self {
        match resolution {
            Resolution::Days | Resolution::Seconds => TypeId::DurationSeconds,
            Resolution::Milliseconds => TypeId::DurationMilliseconds,
            Resolution::Microseconds => TypeId::DurationMicroseconds,
            Resolution::Nanoseconds => TypeId::DurationNanoseconds,
        }
    }

    /// Converts to an Arrow data type.
    #[must_use]
    pub fn to_arrow(&self) -> ArrowDataType {
        match self {
            TypeId::Int8 => ArrowDataType::Int8,
            TypeId::Int16 => ArrowDataType::Int16,
            TypeId::Int32 => ArrowDataType::Int32,
            TypeId::Int64 => ArrowDataType::Int64,
            TypeId::UInt8 => ArrowDataType::UInt8,
            TypeId::UInt16 => ArrowDataType::UInt16,
            TypeId::UInt32 => ArrowDataType::UInt32,
            TypeId::UInt64 => ArrowDataType::UInt64,
            TypeId::Float32 => ArrowDataType::Float32,
            TypeId::Float64 => ArrowDataType::Float64,
            TypeId::Bool8 => ArrowDataType::Boolean,
            TypeId::TimestampDays => ArrowDataType::Date32,
            TypeId::TimestampSeconds => ArrowDataType::Timestamp(TimeUnit::Second, None),
            TypeId::TimestampMilliseconds => ArrowDataType::Timestamp(TimeUnit::Millisecond, None),
            TypeId::TimestampMicroseconds => ArrowDataType::Timestamp(TimeUnit::Microsecond, None),
            TypeId::TimestampNanoseconds => ArrowDataType::Timestamp(TimeUnit::Nanosecond, None),
            TypeId::DurationSeconds => ArrowDataType::Duration(TimeUnit::Second),
            TypeId::DurationMilliseconds => ArrowDataType::Duration(TimeUnit::Millisecond),
            TypeId::DurationMicroseconds => ArrowDataType::Duration(TimeUnit::Microsecond),
            TypeId::DurationNanoseconds => ArrowDataType::Duration(TimeUnit::Nanosecond),
            TypeId::String => ArrowDataType::Utf8,
        }
    }

    /// Converts from an Arrow data type.
    ///
    /// Returns None for Arrow types outside the supported domain, including
    /// timestamps that carry a timezone.
    #[must_use]
    pub fn from_arrow(arrow_type: &ArrowDataType) -> Option<Self> {
        let id = match arrow_type {
            ArrowDataType::Int8 => TypeId::Int8,
            ArrowDataType::Int16 => TypeId::Int16,
            ArrowDataType::Int32 => TypeId::Int32,
            ArrowDataType::Int64 => TypeId::Int64,
            ArrowDataType::UInt8 => TypeId::UInt8,
            ArrowDataType::UInt16 => TypeId::UInt16,
            ArrowDataType::UInt32 => TypeId::UInt32,
            ArrowDataType::UInt64 => TypeId::UInt64,
            ArrowDataType::Float32 => TypeId::Float32,
            ArrowDataType::Float64 => TypeId::Float64,
            ArrowDataType::Boolean => TypeId::Bool8,
            ArrowDataType::Date32 => TypeId::TimestampDays,
            ArrowDataType::Timestamp(unit, None) => match unit {
                TimeUnit::Second => TypeId::TimestampSeconds,
                TimeUnit::Millisecond => TypeId::TimestampMilliseconds,
                TimeUnit::Microsecond => TypeId::TimestampMicroseconds,
                TimeUnit::Nanosecond => TypeId::TimestampNanoseconds,
            },
            ArrowDataType::Duration(unit) => match unit {
                TimeUnit::Second => TypeId::DurationSeconds,
                TimeUnit::Millisecond => TypeId::DurationMilliseconds,
                TimeUnit::Microsecond => TypeId::DurationMicroseconds,
                TimeUnit::Nanosecond => TypeId::DurationNanoseconds,
            },
            ArrowDataType::Utf8 => TypeId::String,
            _ => return None,
        };
        Some(id)
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Temporal resolution, ordered from coarsest to finest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Resolution {
    Days,
    Seconds,
    Milliseconds,
    Microseconds,
    Nanoseconds,
}
