//! Comparison node execution

use crate::error::{EvaluationError, Result};
use verdict_core::{AttributeContext, ComparisonOp, Scalar};

/// Compare a context attribute against a rule literal
pub(crate) fn execute_compare(
    context: &AttributeContext,
    attribute: &str,
    op: ComparisonOp,
    literal: &Scalar,
) -> Result<bool> {
    let actual = context
        .get(attribute)
        .ok_or_else(|| EvaluationError::MissingAttribute(attribute.to_string()))?;

    match (actual, op, literal) {
        (Scalar::Int(l), ComparisonOp::Gt, Scalar::Int(r)) => Ok(l > r),
        (Scalar::Int(l), ComparisonOp::Lt, Scalar::Int(r)) => Ok(l < r),

        (Scalar::Int(l), ComparisonOp::Eq, Scalar::Int(r)) => Ok(l == r),
        (Scalar::String(l), ComparisonOp::Eq, Scalar::String(r)) => Ok(l == r),
        (_, ComparisonOp::Eq, _) => {
            tracing::debug!(
                "Cross-type equality on '{}': {} == {}, returning false",
                attribute,
                actual.type_name(),
                literal.type_name()
            );
            Ok(false)
        }

        _ => Err(EvaluationError::TypeMismatch {
            attribute: attribute.to_string(),
            message: format!(
                "'{}' needs int operands, got {} {} {}",
                op,
                actual.type_name(),
                op,
                literal.type_name()
            ),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> AttributeContext {
        AttributeContext::new()
            .with("age", 35)
            .with("department", "Sales")
    }

    #[test]
    fn test_ordering() {
        assert!(execute_compare(&ctx(), "age", ComparisonOp::Gt, &Scalar::Int(30)).unwrap());
        assert!(!execute_compare(&ctx(), "age", ComparisonOp::Lt, &Scalar::Int(30)).unwrap());
        assert!(!execute_compare(&ctx(), "age", ComparisonOp::Gt, &Scalar::Int(35)).unwrap());
    }

    #[test]
    fn test_equality() {
        assert!(execute_compare(&ctx(), "department", ComparisonOp::Eq, &"Sales".into()).unwrap());
        assert!(!execute_compare(&ctx(), "department", ComparisonOp::Eq, &"sales".into()).unwrap());
        assert!(execute_compare(&ctx(), "age", ComparisonOp::Eq, &Scalar::Int(35)).unwrap());
    }

    #[test]
    fn test_cross_type_equality_is_false() {
        assert!(!execute_compare(&ctx(), "age", ComparisonOp::Eq, &"35".into()).unwrap());
        assert!(!execute_compare(&ctx(), "department", ComparisonOp::Eq, &Scalar::Int(1)).unwrap());
    }

    #[test]
    fn test_ordering_type_mismatch() {
        let err = execute_compare(&ctx(), "department", ComparisonOp::Gt, &Scalar::Int(1)).unwrap_err();
        assert!(matches!(err, EvaluationError::TypeMismatch { ref attribute, .. } if attribute == "department"));

        let err = execute_compare(&ctx(), "age", ComparisonOp::Lt, &"x".into()).unwrap_err();
        assert_eq!(err.reason_code(), "type_mismatch");
    }

    #[test]
    fn test_missing_attribute() {
        let err = execute_compare(&ctx(), "salary", ComparisonOp::Gt, &Scalar::Int(1)).unwrap_err();
        assert_eq!(err, EvaluationError::MissingAttribute("salary".to_string()));
    }
}
