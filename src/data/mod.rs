//! Columns, scalars and normalized operands handled by the dispatch layer.

mod column;
mod operand;
mod scalar;

pub use column::Column;
pub use operand::Operand;
pub use scalar::Scalar;
