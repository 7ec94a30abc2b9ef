//! Common-type resolution for binary operations.
//!
//! The lattice follows the usual numeric rules: the wider type wins, mixed
//! signed/unsigned integers widen to a signed type that holds both ranges,
//! and BOOL8 takes on the other operand's type. Every rule is symmetric, so
//! `promote(a, b) == promote(b, a)` for all pairs.

use crate::error::{DispatchError, Result};

use super::TypeId;

/// Computes the common type of two element types.
///
/// Returns None when the pair has no common type (for example STRING with
/// INT32, or a timestamp with a float).
#[must_use]
pub fn promote(a: TypeId, b: TypeId) -> Option<TypeId> {
    if a == b {
        return Some(a);
    }
    match (a, b) {
        (TypeId::Bool8, other) | (other, TypeId::Bool8) => other.is_numeric().then_some(other),
        _ if a.is_numeric() && b.is_numeric() => Some(promote_numeric(a, b)),
        _ if a.is_temporal() && b.is_temporal() => Some(promote_temporal(a, b)),
        _ => None,
    }
}

/// Like [`promote`], but reports a missing common type as a
/// [`DispatchError::TypeError`] attributed to `operator`.
///
/// # Errors
///
/// Returns `TypeError` when no common type exists.
pub fn common_type(operator: &str, a: TypeId, b: TypeId) -> Result<TypeId> {
    promote(a, b).ok_or_else(|| {
        DispatchError::type_error(operator, format!("no common type for {a} and {b}"))
    })
}

fn promote_numeric(a: TypeId, b: TypeId) -> TypeId {
    if a.is_floating() || b.is_floating() {
        let (float, other) = if a.is_floating() { (a, b) } else { (b, a) };
        return match (float, other) {
            (TypeId::Float32, other) if !other.is_floating() && width(other) <= 16 => {
                TypeId::Float32
            }
            _ => TypeId::Float64,
        };
    }

    if a.is_signed_integral() == b.is_signed_integral() {
        return if width(a) >= width(b) { a } else { b };
    }

    let (signed, unsigned) = if a.is_signed_integral() { (a, b) } else { (b, a) };
    if width(signed) > width(unsigned) {
        signed
    } else {
        match width(unsigned) {
            8 => TypeId::Int16,
            16 => TypeId::Int32,
            32 => TypeId::Int64,
            _ => TypeId::Float64,
        }
    }
}

fn promote_temporal(a: TypeId, b: TypeId) -> TypeId {
    let resolution = a.resolution().max(b.resolution()).unwrap_or(super::Resolution::Days);
    if a.is_duration() && b.is_duration() {
        TypeId::duration(resolution)
    } else {
        TypeId::timestamp(resolution)
    }
}

fn width(id: TypeId) -> u32 {
    id.bit_width().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        for id in TypeId::ALL {
            assert_eq!(promote(id, id), Some(id));
        }
    }

    #[test]
    fn test_commutative_over_whole_domain() {
        for a in TypeId::ALL {
            for b in TypeId::ALL {
                assert_eq!(promote(a, b), promote(b, a), "{a} vs {b}");
            }
        }
    }

    #[test]
    fn test_wider_integer_wins() {
        assert_eq!(promote(TypeId::Int8, TypeId::Int32), Some(TypeId::Int32));
        assert_eq!(promote(TypeId::UInt16, TypeId::UInt64), Some(TypeId::UInt64));
    }

    #[test]
    fn test_mixed_sign_integers() {
        assert_eq!(promote(TypeId::Int8, TypeId::UInt8), Some(TypeId::Int16));
        assert_eq!(promote(TypeId::Int32, TypeId::UInt32), Some(TypeId::Int64));
        assert_eq!(promote(TypeId::Int64, TypeId::UInt32), Some(TypeId::Int64));
        assert_eq!(promote(TypeId::Int16, TypeId::UInt8), Some(TypeId::Int16));
        assert_eq!(promote(TypeId::Int64, TypeId::UInt64), Some(TypeId::Float64));
    }

    #[test]
    fn test_integer_with_float() {
        assert_eq!(promote(TypeId::Int16, TypeId::Float32), Some(TypeId::Float32));
        assert_eq!(promote(TypeId::Int32, TypeId::Float32), Some(TypeId::Float64));
        assert_eq!(promote(TypeId::UInt8, TypeId::Float64), Some(TypeId::Float64));
        assert_eq!(promote(TypeId::Float32, TypeId::Float64), Some(TypeId::Float64));
    }

    #[test]
    fn test_bool_takes_other_type() {
        assert_eq!(promote(TypeId::Bool8, TypeId::UInt8), Some(TypeId::UInt8));
        assert_eq!(promote(TypeId::Float32, TypeId::Bool8), Some(TypeId::Float32));
        assert_eq!(promote(TypeId::Bool8, TypeId::TimestampSeconds), None);
    }

    #[test]
    fn test_temporal() {
        assert_eq!(
            promote(TypeId::TimestampSeconds, TypeId::TimestampMilliseconds),
            Some(TypeId::TimestampMilliseconds)
        );
        assert_eq!(
            promote(TypeId::DurationNanoseconds, TypeId::DurationSeconds),
            Some(TypeId::DurationNanoseconds)
        );
        assert_eq!(
            promote(TypeId::TimestampDays, TypeId::DurationSeconds),
            Some(TypeId::TimestampSeconds)
        );
        assert_eq!(promote(TypeId::TimestampSeconds, TypeId::Int64), None);
    }

    #[test]
    fn test_string_only_with_string() {
        assert_eq!(promote(TypeId::String, TypeId::String), Some(TypeId::String));
        assert_eq!(promote(TypeId::String, TypeId::Int32), None);
    }

    #[test]
    fn test_common_type_error_names_operator() {
        let err = common_type("Column.add", TypeId::String, TypeId::Float64).unwrap_err();
        assert_eq!(err.operator(), Some("Column.add"));
        assert!(err.to_string().contains("STRING"));
        assert!(err.to_string().contains("FLOAT64"));
    }
}
