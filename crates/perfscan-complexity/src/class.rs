//! Cost algebra and the fixed set of reported complexity classes

use std::cmp::Ordering;
use std::fmt;

use serde::{Serialize, Serializer};

/// Growth as `n^degree * log^log n`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Cost {
    pub degree: u32,
    pub log: u32,
}

impl Cost {
    pub const CONSTANT: Cost = Cost { degree: 0, log: 0 };
    pub const LINEAR: Cost = Cost { degree: 1, log: 0 };
    pub const LOG: Cost = Cost { degree: 0, log: 1 };

    pub fn new(degree: u32, log: u32) -> Self {
        Self { degree, log }
    }

    pub fn is_constant(&self) -> bool {
        *self == Cost::CONSTANT
    }

    /// Cost of running `inner` once per unit of `self`
    pub fn times(self, inner: Cost) -> Cost {
        Cost {
            degree: self.degree + inner.degree,
            log: self.log + inner.log,
        }
    }
}

impl PartialOrd for Cost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cost {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.degree, self.log).cmp(&(other.degree, other.log))
    }
}

/// Asymptotic class attached to a scope
///
/// Variants are declared in growth order; `Indeterminate` sorts last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ComplexityClass {
    Constant,
    Logarithmic,
    Linear,
    Linearithmic,
    Quadratic,
    /// `O(n^k)` for k >= 3
    Polynomial(u32),
    Exponential,
    Indeterminate,
}

impl ComplexityClass {
    /// Smallest class that bounds `cost`
    pub fn from_cost(cost: Cost) -> ComplexityClass {
        match (cost.degree, cost.log) {
            (0, 0) => ComplexityClass::Constant,
            (0, 1) => ComplexityClass::Logarithmic,
            // log^2 n and above round up to n
            (0, _) => ComplexityClass::Linear,
            (1, 0) => ComplexityClass::Linear,
            (1, 1) => ComplexityClass::Linearithmic,
            (1, _) => ComplexityClass::Quadratic,
            (2, 0) => ComplexityClass::Quadratic,
            (2, _) => ComplexityClass::Polynomial(3),
            (d, 0) => ComplexityClass::Polynomial(d),
            (d, _) => ComplexityClass::Polynomial(d + 1),
        }
    }

    /// O(n²) or any faster-growing class; indeterminate is not included
    pub fn is_quadratic_or_worse(&self) -> bool {
        matches!(
            self,
            ComplexityClass::Quadratic | ComplexityClass::Polynomial(_) | ComplexityClass::Exponential
        )
    }

    pub fn is_indeterminate(&self) -> bool {
        *self == ComplexityClass::Indeterminate
    }
}

impl fmt::Display for ComplexityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComplexityClass::Constant => f.write_str("O(1)"),
            ComplexityClass::Logarithmic => f.write_str("O(log n)"),
            ComplexityClass::Linear => f.write_str("O(n)"),
            ComplexityClass::Linearithmic => f.write_str("O(n log n)"),
            ComplexityClass::Quadratic => f.write_str("O(n²)"),
            ComplexityClass::Polynomial(3) => f.write_str("O(n³)"),
            ComplexityClass::Polynomial(k) => write!(f, "O(n^{})", k),
            ComplexityClass::Exponential => f.write_str("O(2^n)"),
            ComplexityClass::Indeterminate => f.write_str("indeterminate"),
        }
    }
}

impl Serialize for ComplexityClass {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
