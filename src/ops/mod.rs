//! Binary operators, operand normalization, dispatch and reductions.

mod alias;
mod compaction;
mod dispatch;
mod normalize;
mod operator;
mod reduce;

pub use alias::BoundColumn;
pub use dispatch::Dispatcher;
pub use normalize::{normalize, Argument};
pub use operator::{BinaryOperator, LiteralPolicy, OperatorDescriptor, OutputPolicy, OPERATORS};
pub use reduce::{sum_output_type, Aggregation, AggregationKind};
