//! Single typed, possibly-null value.

use std::sync::Arc;

use arrow::array::{
    new_null_array, Array, ArrayRef, AsArray, BooleanArray, Float32Array, Float64Array,
    Int16Array, Int32Array, Int64Array, Int8Array, StringArray, UInt16Array, UInt32Array,
    UInt64Array, UInt8Array,
};
use arrow::datatypes::{DataType as ArrowDataType, Float64Type, Int64Type, UInt64Type};

use crate::error::{DispatchError, Result};
use crate::memory::Reservation;
use crate::types::TypeId;

/// A single value of a known element type, backed by a length-1 Arrow array.
#[derive(Debug, Clone)]
pub struct Scalar {
    array: ArrayRef,
    type_id: TypeId,
    reservation: Option<Arc<Reservation>>,
}

impl Scalar {
    /// Wraps a length-1 Arrow array.
    ///
    /// # Errors
    ///
    /// Returns `TypeError` if the array does not hold exactly one element or
    /// its type is outside the supported domain.
    pub fn try_new(array: ArrayRef) -> Result<Self> {
        if array.len() != 1 {
            return Err(DispatchError::type_error(
                "Scalar",
                format!("expected exactly one element, got {}", array.len()),
            ));
        }
        let type_id = TypeId::from_arrow(array.data_type()).ok_or_else(|| {
            DispatchError::type_error(
                "Scalar",
                format!("unsupported Arrow type {}", array.data_type()),
            )
        })?;
        Ok(Scalar {
            array,
            type_id,
            reservation: None,
        })
    }

    /// Creates a null scalar of the given type.
    #[must_use]
    pub fn null(type_id: TypeId) -> Self {
        Scalar {
            array: new_null_array(&type_id.to_arrow(), 1),
            type_id,
            reservation: None,
        }
    }

    /// Wraps an array whose type is already known to map to `type_id`.
    pub(crate) fn from_typed(array: ArrayRef, type_id: TypeId) -> Self {
        debug_assert_eq!(TypeId::from_arrow(array.data_type()), Some(type_id));
        Scalar {
            array,
            type_id,
            reservation: None,
        }
    }

    /// Attaches the memory reservation backing this result.
    pub(crate) fn with_reservation(mut self, reservation: Reservation) -> Self {
        self.reservation = Some(Arc::new(reservation));
        self
    }

    /// Returns the bytes charged to a memory resource for this value, if any.
    #[must_use]
    pub fn reserved_bytes(&self) -> Option<usize> {
        self.reservation.as_deref().map(Reservation::bytes)
    }

    /// Returns the element type.
    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns true if the scalar holds a value.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.array.is_valid(0)
    }

    /// Returns the backing length-1 array.
    #[must_use]
    pub fn array(&self) -> &ArrayRef {
        &self.array
    }

    /// Returns the value as an Arrow datum for scalar-aware kernels.
    #[must_use]
    pub fn datum(&self) -> arrow::array::Scalar<ArrayRef> {
        arrow::array::Scalar::new(Arc::clone(&self.array))
    }

    /// Reads the value as `i64`, casting when needed.
    #[must_use]
    pub fn to_i64(&self) -> Option<i64> {
        let cast = arrow::compute::cast(&self.array, &ArrowDataType::Int64).ok()?;
        let values = cast.as_primitive::<Int64Type>();
        values.is_valid(0).then(|| values.value(0))
    }

    /// Reads the value as `u64`, casting when needed.
    #[must_use]
    pub fn to_u64(&self) -> Option<u64> {
        let cast = arrow::compute::cast(&self.array, &ArrowDataType::UInt64).ok()?;
        let values = cast.as_primitive::<UInt64Type>();
        values.is_valid(0).then(|| values.value(0))
    }

    /// Reads the value as `f64`, casting when needed.
    #[must_use]
    pub fn to_f64(&self) -> Option<f64> {
        let cast = arrow::compute::cast(&self.array, &ArrowDataType::Float64).ok()?;
        let values = cast.as_primitive::<Float64Type>();
        values.is_valid(0).then(|| values.value(0))
    }

    /// Reads a BOOL8 value.
    #[must_use]
    pub fn to_bool(&self) -> Option<bool> {
        let values = self.array.as_boolean_opt()?;
        values.is_valid(0).then(|| values.value(0))
    }
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id && self.array.to_data() == other.array.to_data()
    }
}

macro_rules! scalar_from_native {
    ($($native:ty => $array:ty, $type_id:expr);* $(;)?) => {
        $(
            impl From<$native> for Scalar {
                fn from(value: $native) -> Self {
                    Scalar {
                        array: Arc::new(<$array>::from(vec![value])),
                        type_id: $type_id,
                        reservation: None,
                    }
                }
            }
        )*
    };
}

scalar_from_native!(
    i8 => Int8Array, TypeId::Int8;
    i16 => Int16Array, TypeId::Int16;
    i32 => Int32Array, TypeId::Int32;
    i64 => Int64Array, TypeId::Int64;
    u8 => UInt8Array, TypeId::UInt8;
    u16 => UInt16Array, TypeId::UInt16;
    u32 => UInt32Array, TypeId::UInt32;
    u64 => UInt64Array, TypeId::UInt64;
    f32 => Float32Array, TypeId::Float32;
    f64 => Float64Array, TypeId::Float64;
    bool => BooleanArray, TypeId::Bool8;
);

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar {
            array: Arc::new(StringArray::from(vec![value])),
            type_id: TypeId::String,
            reservation: None,
        }
    }
}
