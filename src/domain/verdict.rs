use std::fmt;

use serde::Deserialize;

use crate::error::ExtractionError;

use super::{
    extraction::{ExtractionResult, PriceReading},
    price::NormalizedPrice,
};

/// Relation that must hold between the left and right retailer's prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricePredicate {
    LessThan,
    LessOrEqual,
    GreaterThan,
    GreaterOrEqual,
    Equal,
}

impl PricePredicate {
    pub fn holds(&self, left: NormalizedPrice, right: NormalizedPrice) -> bool {
        match self {
            PricePredicate::LessThan => left < right,
            PricePredicate::LessOrEqual => left <= right,
            PricePredicate::GreaterThan => left > right,
            PricePredicate::GreaterOrEqual => left >= right,
            PricePredicate::Equal => left == right,
        }
    }
}

impl fmt::Display for PricePredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            PricePredicate::LessThan => "<",
            PricePredicate::LessOrEqual => "<=",
            PricePredicate::GreaterThan => ">",
            PricePredicate::GreaterOrEqual => ">=",
            PricePredicate::Equal => "==",
        };
        f.write_str(symbol)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => f.write_str("left"),
            Side::Right => f.write_str("right"),
        }
    }
}

#[derive(Debug)]
pub struct SideFailure {
    pub side: Side,
    pub error: ExtractionError,
}

#[derive(Debug)]
pub enum FailureReason {
    /// At least one side produced no price; prices were never compared.
    ExtractionFailed(Vec<SideFailure>),
    PredicateFailed {
        left: PriceReading,
        right: PriceReading,
        predicate: PricePredicate,
    },
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::ExtractionFailed(failures) => {
                write!(f, "extraction failed")?;
                for failure in failures {
                    write!(f, "; {} side: {}", failure.side, failure.error)?;
                }
                Ok(())
            }
            FailureReason::PredicateFailed {
                left,
                right,
                predicate,
            } => write!(
                f,
                "expected {} price ₹{} {} {} price ₹{}",
                left.retailer, left.price, predicate, right.retailer, right.price
            ),
        }
    }
}

#[derive(Debug)]
pub enum ComparisonVerdict {
    Pass {
        left: PriceReading,
        right: PriceReading,
    },
    Fail(FailureReason),
}

impl ComparisonVerdict {
    pub fn is_pass(&self) -> bool {
        matches!(self, ComparisonVerdict::Pass { .. })
    }

    pub fn failing_sides(&self) -> Vec<Side> {
        match self {
            ComparisonVerdict::Fail(FailureReason::ExtractionFailed(failures)) => {
                failures.iter().map(|f| f.side).collect()
            }
            _ => vec![],
        }
    }
}

pub fn compare(
    left: ExtractionResult,
    right: ExtractionResult,
    predicate: PricePredicate,
) -> ComparisonVerdict {
    let (left, right) = match (left, right) {
        (ExtractionResult::Success(left), ExtractionResult::Success(right)) => (left, right),
        (left, right) => {
            let failures = [(Side::Left, left), (Side::Right, right)]
                .into_iter()
                .filter_map(|(side, result)| match result {
                    ExtractionResult::Failure(error) => Some(SideFailure { side, error }),
                    ExtractionResult::Success(_) => None,
                })
                .collect();
            return ComparisonVerdict::Fail(FailureReason::ExtractionFailed(failures));
        }
    };

    match predicate.holds(left.price, right.price) {
        true => ComparisonVerdict::Pass { left, right },
        false => ComparisonVerdict::Fail(FailureReason::PredicateFailed {
            left,
            right,
            predicate,
        }),
    }
}
