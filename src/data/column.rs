//! Column handle over an Arrow array.

use std::sync::Arc;

use arrow::array::{Array, ArrayRef};

use crate::error::{DispatchError, Result};
use crate::memory::Reservation;
use crate::types::TypeId;

/// Immutable handle to a typed, possibly-nullable vector of elements.
///
/// Cloning is cheap: the underlying buffers are reference counted and never
/// modified by this crate. A column produced by an engine holds its memory
/// reservation until the last clone is dropped.
#[derive(Debug, Clone)]
pub struct Column {
    array: ArrayRef,
    type_id: TypeId,
    reservation: Option<Arc<Reservation>>,
}

impl Column {
    /// Wraps an Arrow array.
    ///
    /// # Errors
    ///
    /// Returns `TypeError` if the array's type is outside the supported domain.
    pub fn try_new(array: ArrayRef) -> Result<Self> {
        let type_id = TypeId::from_arrow(array.data_type()).ok_or_else(|| {
            DispatchError::type_error(
                "Column",
                format!("unsupported Arrow type {}", array.data_type()),
            )
        })?;
        Ok(Column {
            array,
            type_id,
            reservation: None,
        })
    }

    /// Wraps an array whose type is already known to map to `type_id`.
    pub(crate) fn from_typed(array: ArrayRef, type_id: TypeId) -> Self {
        debug_assert_eq!(TypeId::from_arrow(array.data_type()), Some(type_id));
        Column {
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

    /// Returns the bytes charged to a memory resource for this column, if any.
    #[must_use]
    pub fn reserved_bytes(&self) -> Option<usize> {
        self.reservation.as_deref().map(Reservation::bytes)
    }

    /// Returns the element type.
    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns the number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.array.len()
    }

    /// Returns true if the column has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.array.is_empty()
    }

    /// Returns the number of null elements.
    #[must_use]
    pub fn null_count(&self) -> usize {
        self.array.null_count()
    }

    /// Returns true if the column carries a null mask.
    #[must_use]
    pub fn has_null_mask(&self) -> bool {
        self.array.nulls().is_some()
    }

    /// Returns the underlying Arrow array.
    #[must_use]
    pub fn array(&self) -> &ArrayRef {
        &self.array
    }

    /// Consumes the column, returning the underlying Arrow array and
    /// releasing any memory reservation.
    #[must_use]
    pub fn into_array(self) -> ArrayRef {
        self.array
    }

    /// Returns the in-memory size of the column's buffers.
    #[must_use]
    pub fn memory_size(&self) -> usize {
        self.array.get_array_memory_size()
    }
}

impl PartialEq for Column {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id && self.array.to_data() == other.array.to_data()
    }
}
