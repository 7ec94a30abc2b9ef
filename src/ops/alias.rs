//! Operator-symbol aliases on a dispatcher-bound column.
//!
//! `dispatcher.on(&column) + 10` is exactly `dispatcher.add(&column, 10, None)`.

use std::ops;

use crate::data::Column;
use crate::error::Result;
use crate::memory::MemoryResourceRef;

use super::normalize::Argument;
use super::{BinaryOperator, Dispatcher};

/// A column paired with the dispatcher that evaluates operators on it.
#[derive(Debug, Clone, Copy)]
pub struct BoundColumn<'a> {
    dispatcher: &'a Dispatcher,
    column: &'a Column,
    resource: Option<&'a MemoryResourceRef>,
}

impl Dispatcher {
    /// Binds `column` so that `std::ops` operators dispatch through `self`.
    #[must_use]
    pub fn on<'a>(&'a self, column: &'a Column) -> BoundColumn<'a> {
        BoundColumn {
            dispatcher: self,
            column,
            resource: None,
        }
    }
}

impl<'a> BoundColumn<'a> {
    /// Uses `resource` for results instead of the current default.
    #[must_use]
    pub fn with_resource(mut self, resource: &'a MemoryResourceRef) -> Self {
        self.resource = Some(resource);
        self
    }

    /// Returns the bound column.
    #[must_use]
    pub fn column(&self) -> &'a Column {
        self.column
    }

    fn apply(self, rhs: impl Into<Argument>, op: BinaryOperator) -> Result<Column> {
        self.dispatcher.binary_op(self.column, rhs, op, self.resource)
    }
}

macro_rules! operator_aliases {
    ($($trait:ident :: $method:ident => $op:ident),* $(,)?) => {
        $(
            impl<'a, R: Into<Argument>> ops::$trait<R> for BoundColumn<'a> {
                type Output = Result<Column>;

                fn $method(self, rhs: R) -> Self::Output {
                    self.apply(rhs, BinaryOperator::$op)
                }
            }
        )*
    };
}

operator_aliases! {
    Add::add => Add,
    Sub::sub => Sub,
    Mul::mul => Mul,
    Div::div => Div,
    Rem::rem => Mod,
    BitAnd::bitand => BitwiseAnd,
    BitOr::bitor => BitwiseOr,
    BitXor::bitxor => BitwiseXor,
    Shl::shl => ShiftLeft,
    Shr::shr => ShiftRight,
}
