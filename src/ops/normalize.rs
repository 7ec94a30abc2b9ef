//! Operand normalization.
//!
//! Every right-hand argument goes through [`normalize`] exactly once before
//! dispatch, so each operator sees the same classification: a column stays a
//! column, a scalar stays a scalar, integer and floating literals become
//! scalars, and anything else is rejected.

use std::fmt;

use crate::data::{Column, Operand, Scalar};
use crate::error::{DispatchError, Result};
use crate::types::TypeId;

use super::{BinaryOperator, LiteralPolicy};

/// A right-hand argument as presented by a caller.
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    Column(Column),
    Scalar(Scalar),
    /// Integer literal of arbitrary sign and width up to 128 bits.
    BigInt(i128),
    /// Double-precision literal.
    Number(f64),
    Text(String),
    Boolean(bool),
    Null,
}

impl Argument {
    /// Short name of the argument's shape, used in error messages.
    #[must_use]
    pub fn shape(&self) -> &'static str {
        match self {
            Argument::Column(_) => "Column",
            Argument::Scalar(_) => "Scalar",
            Argument::BigInt(_) => "bigint",
            Argument::Number(_) => "number",
            Argument::Text(_) => "string",
            Argument::Boolean(_) => "boolean",
            Argument::Null => "null",
        }
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Argument::Column(column) => write!(f, "Column<{}>[{}]", column.type_id(), column.len()),
            Argument::Scalar(scalar) => write!(f, "Scalar<{}>", scalar.type_id()),
            Argument::BigInt(v) => write!(f, "{v}n"),
            Argument::Number(v) => write!(f, "{v}"),
            Argument::Text(s) => write!(f, "{s:?}"),
            Argument::Boolean(b) => write!(f, "{b}"),
            Argument::Null => f.write_str("null"),
        }
    }
}

impl From<Column> for Argument {
    fn from(column: Column) -> Self {
        Argument::Column(column)
    }
}

impl From<&Column> for Argument {
    fn from(column: &Column) -> Self {
        Argument::Column(column.clone())
    }
}

impl From<Scalar> for Argument {
    fn from(scalar: Scalar) -> Self {
        Argument::Scalar(scalar)
    }
}

impl From<&Scalar> for Argument {
    fn from(scalar: &Scalar) -> Self {
        Argument::Scalar(scalar.clone())
    }
}

impl From<Operand> for Argument {
    fn from(operand: Operand) -> Self {
        match operand {
            Operand::Column(column) => Argument::Column(column),
            Operand::Scalar(scalar) => Argument::Scalar(scalar),
        }
    }
}

macro_rules! argument_from_integer {
    ($($native:ty),*) => {
        $(
            impl From<$native> for Argument {
                fn from(value: $native) -> Self {
                    Argument::BigInt(i128::from(value))
                }
            }
        )*
    };
}

argument_from_integer!(i8, i16, i32, i64, i128, u8, u16, u32, u64);

impl From<f32> for Argument {
    fn from(value: f32) -> Self {
        Argument::Number(f64::from(value))
    }
}

impl From<f64> for Argument {
    fn from(value: f64) -> Self {
        Argument::Number(value)
    }
}

impl From<&str> for Argument {
    fn from(value: &str) -> Self {
        Argument::Text(value.to_string())
    }
}

impl From<String> for Argument {
    fn from(value: String) -> Self {
        Argument::Text(value)
    }
}

impl From<bool> for Argument {
    fn from(value: bool) -> Self {
        Argument::Boolean(value)
    }
}

/// Classifies `argument` into a column or scalar operand for `op`.
///
/// Literals become scalars. Under [`LiteralPolicy::ReceiverWidth`] with an
/// integral receiver, the scalar takes the receiver's type. Otherwise an
/// integer literal takes the narrowest type that holds it: UINT8..UINT64 for a
/// non-negative literal against an unsigned receiver, INT8..INT64 (then
/// UINT64) for anything else. A floating literal becomes FLOAT64.
///
/// # Errors
///
/// Returns `TypeError` naming `op` if the argument is not a Column, Scalar,
/// bigint, or number, or if a literal does not fit its target type.
pub fn normalize(argument: Argument, receiver: TypeId, op: BinaryOperator) -> Result<Operand> {
    let receiver_width =
        op.descriptor().literal == LiteralPolicy::ReceiverWidth && receiver.is_integral();
    match argument {
        Argument::Column(column) => Ok(Operand::Column(column)),
        Argument::Scalar(scalar) => Ok(Operand::Scalar(scalar)),
        Argument::BigInt(value) if receiver_width => {
            integer_scalar(value, receiver).map(Operand::Scalar).ok_or_else(|| {
                out_of_range(op, &value.to_string(), receiver)
            })
        }
        Argument::BigInt(value) => narrowest_integer(value, receiver)
            .map(Operand::Scalar)
            .ok_or_else(|| out_of_range(op, &value.to_string(), TypeId::UInt64)),
        Argument::Number(value) if receiver_width => {
            if !value.is_finite() || value.fract() != 0.0 {
                return Err(DispatchError::type_error(
                    op.qualified_name(),
                    format!("{value} is not an integer and cannot be used as {receiver}"),
                ));
            }
            let integer = value as i128;
            integer_scalar(integer, receiver)
                .map(Operand::Scalar)
                .ok_or_else(|| out_of_range(op, &value.to_string(), receiver))
        }
        Argument::Number(value) => Ok(Operand::Scalar(Scalar::from(value))),
        Argument::Text(_) | Argument::Boolean(_) | Argument::Null => Err(unsupported_shape(op)),
    }
}

/// The error raised for any argument shape the dispatcher does not accept.
pub(crate) fn unsupported_shape(op: BinaryOperator) -> DispatchError {
    DispatchError::type_error(
        op.qualified_name(),
        "expects a Column, Scalar, bigint, or number.",
    )
}

fn out_of_range(op: BinaryOperator, value: &str, target: TypeId) -> DispatchError {
    DispatchError::type_error(
        op.qualified_name(),
        format!("integer literal {value} is out of range for {target}"),
    )
}

/// Builds a scalar of the integral type `type_id`, or None if `value` does
/// not fit.
pub(crate) fn integer_scalar(value: i128, type_id: TypeId) -> Option<Scalar> {
    let scalar = match type_id {
        TypeId::Int8 => Scalar::from(i8::try_from(value).ok()?),
        TypeId::Int16 => Scalar::from(i16::try_from(value).ok()?),
        TypeId::Int32 => Scalar::from(i32::try_from(value).ok()?),
        TypeId::Int64 => Scalar::from(i64::try_from(value).ok()?),
        TypeId::UInt8 => Scalar::from(u8::try_from(value).ok()?),
        TypeId::UInt16 => Scalar::from(u16::try_from(value).ok()?),
        TypeId::UInt32 => Scalar::from(u32::try_from(value).ok()?),
        TypeId::UInt64 => Scalar::from(u64::try_from(value).ok()?),
        _ => return None,
    };
    Some(scalar)
}

/// Unsigned receivers keep non-negative literals unsigned so the common type
/// stays integral.
fn narrowest_integer(value: i128, receiver: TypeId) -> Option<Scalar> {
    const UNSIGNED: [TypeId; 4] = [TypeId::UInt8, TypeId::UInt16, TypeId::UInt32, TypeId::UInt64];
    const SIGNED: [TypeId; 5] =
        [TypeId::Int8, TypeId::Int16, TypeId::Int32, TypeId::Int64, TypeId::UInt64];
    let candidates: &[TypeId] = if receiver.is_unsigned_integral() && value >= 0 {
        &UNSIGNED
    } else {
        &SIGNED
    };
    candidates
        .iter()
        .find_map(|type_id| integer_scalar(value, *type_id))
}
