//! Stream compaction: filtering rows out of a column.

use crate::data::Column;
use crate::error::{DispatchError, Result};
use crate::memory::MemoryResourceRef;
use crate::observability::log_debug;
use crate::types::TypeId;

use super::Dispatcher;

impl Dispatcher {
    /// Keeps the rows of `column` where `mask` is true. Null mask entries
    /// drop the row.
    ///
    /// # Errors
    ///
    /// Returns `TypeError` if `mask` is not a BOOL8 column of the same length,
    /// and `EngineLogicError` when the engine rejects the operation.
    pub fn apply_boolean_mask(
        &self,
        column: &Column,
        mask: &Column,
        mr: Option<&MemoryResourceRef>,
    ) -> Result<Column> {
        if mask.type_id() != TypeId::Bool8 {
            return Err(DispatchError::type_error(
                "Column.apply_boolean_mask",
                format!("mask must be BOOL8, got {}", mask.type_id()),
            ));
        }
        if mask.len() != column.len() {
            return Err(DispatchError::type_error(
                "Column.apply_boolean_mask",
                format!(
                    "mask length {} does not match column length {}",
                    mask.len(),
                    column.len()
                ),
            ));
        }
        let resource = self.resolve(mr);
        log_debug!(
            component = "compaction",
            event = "apply_boolean_mask",
            rows = column.len(),
            resource = resource.name(),
        );
        Ok(self
            .engine()
            .apply_boolean_mask(column, mask, &resource)?)
    }

    /// Removes null rows.
    ///
    /// # Errors
    ///
    /// Returns `EngineLogicError` when the engine rejects the operation.
    pub fn drop_nulls(&self, column: &Column, mr: Option<&MemoryResourceRef>) -> Result<Column> {
        let resource = self.resolve(mr);
        log_debug!(
            component = "compaction",
            event = "drop_nulls",
            rows = column.len(),
            nulls = column.null_count(),
        );
        Ok(self.engine().drop_nulls(column, &resource)?)
    }

    /// Removes NaN rows from a floating column. Other columns come back
    /// unchanged.
    ///
    /// # Errors
    ///
    /// Returns `EngineLogicError` when the engine rejects the operation.
    pub fn drop_nans(&self, column: &Column, mr: Option<&MemoryResourceRef>) -> Result<Column> {
        let resource = self.resolve(mr);
        log_debug!(
            component = "compaction",
            event = "drop_nans",
            input_type = %column.type_id(),
            rows = column.len(),
        );
        Ok(self.engine().drop_nans(column, &resource)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{AsArray, BooleanArray, Float64Array, Int32Array};
    use arrow::datatypes::{Float64Type, Int32Type};
    use std::sync::Arc;

    fn column(array: arrow::array::ArrayRef) -> Column {
        Column::try_new(array).unwrap()
    }

    #[test]
    fn test_apply_boolean_mask() {
        let dispatcher = Dispatcher::default();
        let values = column(Arc::new(Int32Array::from(vec![1, 2, 3, 4])));
        let mask = column(Arc::new(BooleanArray::from(vec![
            Some(true),
            Some(false),
            None,
            Some(true),
        ])));

        let result = dispatcher.apply_boolean_mask(&values, &mask, None).unwrap();
        let kept: Vec<i32> = result.array().as_primitive::<Int32Type>().values().to_vec();
        assert_eq!(kept, vec![1, 4]);
        assert_eq!(result.type_id(), TypeId::Int32);
    }

    #[test]
    fn test_apply_boolean_mask_rejects_bad_masks() {
        let dispatcher = Dispatcher::default();
        let values = column(Arc::new(Int32Array::from(vec![1, 2])));

        let not_bool = column(Arc::new(Int32Array::from(vec![1, 0])));
        let err = dispatcher.apply_boolean_mask(&values, &not_bool, None).unwrap_err();
        assert_eq!(err.operator(), Some("Column.apply_boolean_mask"));

        let short = column(Arc::new(BooleanArray::from(vec![true])));
        assert!(dispatcher
            .apply_boolean_mask(&values, &short, None)
            .unwrap_err()
            .is_type_error());
    }

    #[test]
    fn test_drop_nulls() {
        let dispatcher = Dispatcher::default();
        let values = column(Arc::new(Int32Array::from(vec![Some(1), None, Some(3)])));
        let result = dispatcher.drop_nulls(&values, None).unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result.null_count(), 0);
    }

    #[test]
    fn test_drop_nans_keeps_nulls_and_non_floats() {
        let dispatcher = Dispatcher::default();
        let floats = column(Arc::new(Float64Array::from(vec![
            Some(1.0),
            Some(f64::NAN),
            None,
        ])));
        let result = dispatcher.drop_nans(&floats, None).unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result.null_count(), 1);
        assert_eq!(result.array().as_primitive::<Float64Type>().value(0), 1.0);

        let ints = column(Arc::new(Int32Array::from(vec![1, 2])));
        assert_eq!(dispatcher.drop_nans(&ints, None).unwrap(), ints);
    }
}
