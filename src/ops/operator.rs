//! Static table of binary operators.
//!
//! Each operator has exactly one [`OperatorDescriptor`]. The dispatcher never
//! special-cases an operator outside this table.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{common_type, TypeId};

/// Logical binary operators exposed by the dispatch layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    TrueDiv,
    FloorDiv,
    Mod,
    Pow,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    BitwiseAnd,
    BitwiseOr,
    BitwiseXor,
    LogicalAnd,
    LogicalOr,
    Coalesce,
    ShiftLeft,
    ShiftRight,
    ShiftRightUnsigned,
    LogBase,
    Atan2,
    NullEquals,
    NullMax,
    NullMin,
}

/// How an operator's output element type is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputPolicy {
    /// Common type of both operands.
    Inferred,
    /// Always BOOL8.
    FixedBoolean,
    /// Common type of both operands, widened to FLOAT64 when integral or BOOL8.
    Floating,
}

/// How bare numeric literals on the right-hand side become scalars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralPolicy {
    /// Type inferred from the literal itself.
    Natural,
    /// Same type as the receiving column.
    ReceiverWidth,
}

/// Static description of one operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatorDescriptor {
    pub operator: BinaryOperator,
    /// Method name, e.g. `true_div`.
    pub name: &'static str,
    /// Conventional symbol aliasing the named operator.
    pub symbol: Option<&'static str>,
    pub output: OutputPolicy,
    pub literal: LiteralPolicy,
}

const fn entry(
    operator: BinaryOperator,
    name: &'static str,
    symbol: Option<&'static str>,
    output: OutputPolicy,
    literal: LiteralPolicy,
) -> OperatorDescriptor {
    OperatorDescriptor {
        operator,
        name,
        symbol,
        output,
        literal,
    }
}

use BinaryOperator as Op;
use LiteralPolicy::{Natural, ReceiverWidth};
use OutputPolicy::{FixedBoolean, Floating, Inferred};

/// One descriptor per operator, in declaration order of [`BinaryOperator`].
pub static OPERATORS: [OperatorDescriptor; 28] = [
    entry(Op::Add, "add", Some("+"), Inferred, Natural),
    entry(Op::Sub, "sub", Some("-"), Inferred, Natural),
    entry(Op::Mul, "mul", Some("*"), Inferred, Natural),
    entry(Op::Div, "div", Some("/"), Inferred, Natural),
    entry(Op::TrueDiv, "true_div", None, Floating, Natural),
    entry(Op::FloorDiv, "floor_div", Some("//"), Inferred, Natural),
    entry(Op::Mod, "mod", Some("%"), Inferred, Natural),
    entry(Op::Pow, "pow", Some("**"), Inferred, Natural),
    entry(Op::Equal, "eq", Some("=="), FixedBoolean, Natural),
    entry(Op::NotEqual, "ne", Some("!="), FixedBoolean, Natural),
    entry(Op::Less, "lt", Some("<"), FixedBoolean, Natural),
    entry(Op::LessEqual, "le", Some("<="), FixedBoolean, Natural),
    entry(Op::Greater, "gt", Some(">"), FixedBoolean, Natural),
    entry(Op::GreaterEqual, "ge", Some(">="), FixedBoolean, Natural),
    entry(Op::BitwiseAnd, "bitwise_and", Some("&"), Inferred, ReceiverWidth),
    entry(Op::BitwiseOr, "bitwise_or", Some("|"), Inferred, ReceiverWidth),
    entry(Op::BitwiseXor, "bitwise_xor", Some("^"), Inferred, ReceiverWidth),
    entry(Op::LogicalAnd, "logical_and", Some("&&"), Inferred, Natural),
    entry(Op::LogicalOr, "logical_or", Some("||"), Inferred, Natural),
    entry(Op::Coalesce, "coalesce", Some("??"), Inferred, Natural),
    entry(Op::ShiftLeft, "shift_left", Some("<<"), Inferred, ReceiverWidth),
    entry(Op::ShiftRight, "shift_right", Some(">>"), Inferred, ReceiverWidth),
    entry(Op::ShiftRightUnsigned, "shift_right_unsigned", Some(">>>"), Inferred, ReceiverWidth),
    entry(Op::LogBase, "log_base", None, Inferred, Natural),
    entry(Op::Atan2, "atan2", None, Inferred, Natural),
    entry(Op::NullEquals, "null_equals", None, FixedBoolean, Natural),
    entry(Op::NullMax, "null_max", None, Inferred, Natural),
    entry(Op::NullMin, "null_min", None, Inferred, Natural),
];

impl BinaryOperator {
    /// Every operator, in declaration order.
    pub fn all() -> impl Iterator<Item = BinaryOperator> {
        OPERATORS.iter().map(|d| d.operator)
    }

    /// Returns this operator's descriptor.
    #[must_use]
    pub fn descriptor(self) -> &'static OperatorDescriptor {
        &OPERATORS[self as usize]
    }

    /// Returns the method name, e.g. `floor_div`.
    #[must_use]
    pub fn name(self) -> &'static str {
        self.descriptor().name
    }

    /// Returns the name used in error messages, e.g. `Column.floor_div`.
    #[must_use]
    pub fn qualified_name(self) -> String {
        format!("Column.{}", self.name())
    }

    /// Looks up an operator by method name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        OPERATORS.iter().find(|d| d.name == name).map(|d| d.operator)
    }

    /// Looks up an operator by its conventional symbol.
    #[must_use]
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        OPERATORS
            .iter()
            .find(|d| d.symbol == Some(symbol))
            .map(|d| d.operator)
    }

    /// Returns true for operators whose output is always BOOL8.
    #[must_use]
    pub fn is_comparison(self) -> bool {
        self.descriptor().output == OutputPolicy::FixedBoolean
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl OperatorDescriptor {
    /// Resolves the output element type for the given operand types.
    ///
    /// # Errors
    ///
    /// Returns `TypeError` when the policy needs a common type and none exists.
    pub fn output_type(&self, lhs: TypeId, rhs: TypeId) -> Result<TypeId> {
        match self.output {
            FixedBoolean => Ok(TypeId::Bool8),
            Inferred => common_type(&self.operator.qualified_name(), lhs, rhs),
            Floating => {
                let common = common_type(&self.operator.qualified_name(), lhs, rhs)?;
                if common.is_integral() || common == TypeId::Bool8 {
                    Ok(TypeId::Float64)
                } else {
                    Ok(common)
                }
            }
        }
    }
}
