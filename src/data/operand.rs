//! Normalized right-hand operand.

use arrow::array::ArrayRef;

use crate::types::TypeId;

use super::{Column, Scalar};

/// Right-hand operand after normalization: a column or a scalar, nothing else.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Column(Column),
    Scalar(Scalar),
}

impl Operand {
    /// Returns the element type.
    #[must_use]
    pub fn type_id(&self) -> TypeId {
        match self {
            Operand::Column(column) => column.type_id(),
            Operand::Scalar(scalar) => scalar.type_id(),
        }
    }

    /// Returns the backing Arrow array (length 1 for scalars).
    #[must_use]
    pub fn array(&self) -> &ArrayRef {
        match self {
            Operand::Column(column) => column.array(),
            Operand::Scalar(scalar) => scalar.array(),
        }
    }

    /// Returns true for the scalar variant.
    #[must_use]
    pub fn is_scalar(&self) -> bool {
        matches!(self, Operand::Scalar(_))
    }
}

impl From<Column> for Operand {
    fn from(column: Column) -> Self {
        Operand::Column(column)
    }
}

impl From<Scalar> for Operand {
    fn from(scalar: Scalar) -> Self {
        Operand::Scalar(scalar)
    }
}
