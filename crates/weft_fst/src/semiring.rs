//! Arc-weight semirings.
//!
//! Weights form a semiring: `plus` accumulates alternative paths, `times`
//! accumulates weights along a path. Three instantiations are provided,
//! selected by the compiler's `--arc_type` flag:
//!
//! | arc type   | carrier | plus        | times | path property |
//! |------------|---------|-------------|-------|---------------|
//! | `standard` | f32     | min         | +     | yes           |
//! | `log`      | f32     | -log(e^-x + e^-y) | + | no        |
//! | `log64`    | f64     | -log(e^-x + e^-y) | + | no        |
//!
//! The path property (natural total order, `plus` picks one operand) is what
//! shortest-path and pruning need; operations that require it are only
//! registered for `standard` arcs.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The algebra every arc weight must supply.
///
/// Weights are small `Copy` values. `key_bits` is a stable hashable encoding
/// used by the label/weight encoder during optimization.
pub trait Semiring:
    Copy
    + PartialEq
    + fmt::Debug
    + fmt::Display
    + Send
    + Sync
    + Serialize
    + DeserializeOwned
    + 'static
{
    /// Name used by the CLI and stored in archives ("standard", "log", "log64").
    const ARC_TYPE: &'static str;

    /// Whether the semiring has the path property (a natural total order
    /// under which `plus` selects the better operand).
    const HAS_PATH: bool;

    /// The annihilator: weight of an impossible path.
    fn zero() -> Self;

    /// The identity: weight of the empty path.
    fn one() -> Self;

    /// Combines alternative paths.
    fn plus(self, rhs: Self) -> Self;

    /// Extends a path.
    fn times(self, rhs: Self) -> Self;

    /// Equality up to floating-point convergence error.
    fn approx_eq(self, rhs: Self) -> bool;

    /// Natural order for path semirings: `true` if `self` is strictly
    /// better than `rhs`. Unused when [`Semiring::HAS_PATH`] is false.
    fn natural_less(self, rhs: Self) -> bool;

    /// Parses the textual form used in angle-bracket weights (`<0.5>`).
    fn parse_text(text: &str) -> Option<Self>;

    /// Stable bit pattern for hashing in the encode table.
    fn key_bits(self) -> u64;
}

const F32_DELTA: f32 = 1e-5;
const F64_DELTA: f64 = 1e-9;

fn f32_approx(a: f32, b: f32) -> bool {
    (a.is_infinite() && b.is_infinite() && a.signum() == b.signum()) || (a - b).abs() <= F32_DELTA
}

fn f64_approx(a: f64, b: f64) -> bool {
    (a.is_infinite() && b.is_infinite() && a.signum() == b.signum()) || (a - b).abs() <= F64_DELTA
}

/// `-log(e^-x + e^-y)` computed without overflow.
fn log_plus_f64(x: f64, y: f64) -> f64 {
    if x == f64::INFINITY {
        return y;
    }
    if y == f64::INFINITY {
        return x;
    }
    let (lo, hi) = if x <= y { (x, y) } else { (y, x) };
    lo - (-(hi - lo)).exp().ln_1p()
}

/// Tropical weight: the `standard` arc type. Plus is min, times is addition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TropicalWeight(pub f32);

impl Semiring for TropicalWeight {
    const ARC_TYPE: &'static str = "standard";
    const HAS_PATH: bool = true;

    fn zero() -> Self {
        TropicalWeight(f32::INFINITY)
    }

    fn one() -> Self {
        TropicalWeight(0.0)
    }

    fn plus(self, rhs: Self) -> Self {
        if self.0 <= rhs.0 {
            self
        } else {
            rhs
        }
    }

    fn times(self, rhs: Self) -> Self {
        if self.0 == f32::INFINITY || rhs.0 == f32::INFINITY {
            Self::zero()
        } else {
            TropicalWeight(self.0 + rhs.0)
        }
    }

    fn approx_eq(self, rhs: Self) -> bool {
        f32_approx(self.0, rhs.0)
    }

    fn natural_less(self, rhs: Self) -> bool {
        self.0 < rhs.0
    }

    fn parse_text(text: &str) -> Option<Self> {
        text.trim().parse::<f32>().ok().map(TropicalWeight)
    }

    fn key_bits(self) -> u64 {
        self.0.to_bits() as u64
    }
}

impl fmt::Display for TropicalWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Log weight over f32: the `log` arc type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogWeight(pub f32);

impl Semiring for LogWeight {
    const ARC_TYPE: &'static str = "log";
    const HAS_PATH: bool = false;

    fn zero() -> Self {
        LogWeight(f32::INFINITY)
    }

    fn one() -> Self {
        LogWeight(0.0)
    }

    fn plus(self, rhs: Self) -> Self {
        LogWeight(log_plus_f64(self.0 as f64, rhs.0 as f64) as f32)
    }

    fn times(self, rhs: Self) -> Self {
        if self.0 == f32::INFINITY || rhs.0 == f32::INFINITY {
            Self::zero()
        } else {
            LogWeight(self.0 + rhs.0)
        }
    }

    fn approx_eq(self, rhs: Self) -> bool {
        f32_approx(self.0, rhs.0)
    }

    fn natural_less(self, _rhs: Self) -> bool {
        false
    }

    fn parse_text(text: &str) -> Option<Self> {
        text.trim().parse::<f32>().ok().map(LogWeight)
    }

    fn key_bits(self) -> u64 {
        self.0.to_bits() as u64
    }
}

impl fmt::Display for LogWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Log weight over f64: the `log64` arc type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Log64Weight(pub f64);

impl Semiring for Log64Weight {
    const ARC_TYPE: &'static str = "log64";
    const HAS_PATH: bool = false;

    fn zero() -> Self {
        Log64Weight(f64::INFINITY)
    }

    fn one() -> Self {
        Log64Weight(0.0)
    }

    fn plus(self, rhs: Self) -> Self {
        Log64Weight(log_plus_f64(self.0, rhs.0))
    }

    fn times(self, rhs: Self) -> Self {
        if self.0 == f64::INFINITY || rhs.0 == f64::INFINITY {
            Self::zero()
        } else {
            Log64Weight(self.0 + rhs.0)
        }
    }

    fn approx_eq(self, rhs: Self) -> bool {
        f64_approx(self.0, rhs.0)
    }

    fn natural_less(self, _rhs: Self) -> bool {
        false
    }

    fn parse_text(text: &str) -> Option<Self> {
        text.trim().parse::<f64>().ok().map(Log64Weight)
    }

    fn key_bits(self) -> u64 {
        self.0.to_bits()
    }
}

impl fmt::Display for Log64Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tropical_plus_is_min() {
        let a = TropicalWeight(2.0);
        let b = TropicalWeight(3.0);
        assert_eq!(a.plus(b), a);
        assert_eq!(b.plus(a), a);
    }

    #[test]
    fn tropical_times_is_addition() {
        let a = TropicalWeight(2.0);
        let b = TropicalWeight(3.0);
        assert_eq!(a.times(b), TropicalWeight(5.0));
    }

    #[test]
    fn zero_annihilates_times() {
        let w = TropicalWeight(1.5);
        assert_eq!(w.times(TropicalWeight::zero()), TropicalWeight::zero());
        let l = LogWeight(1.5);
        assert_eq!(l.times(LogWeight::zero()), LogWeight::zero());
    }

    #[test]
    fn one_is_times_identity() {
        let w = TropicalWeight(1.5);
        assert_eq!(w.times(TropicalWeight::one()), w);
    }

    #[test]
    fn log_plus_of_equal_weights() {
        // -log(2 * e^-1) = 1 - log 2
        let w = LogWeight(1.0).plus(LogWeight(1.0));
        assert!(w.approx_eq(LogWeight(1.0 - std::f32::consts::LN_2)));
    }

    #[test]
    fn log_plus_with_zero_is_identity() {
        let w = LogWeight(0.7);
        assert!(w.plus(LogWeight::zero()).approx_eq(w));
        assert!(LogWeight::zero().plus(w).approx_eq(w));
    }

    #[test]
    fn tropical_natural_order() {
        assert!(TropicalWeight(1.0).natural_less(TropicalWeight(2.0)));
        assert!(!TropicalWeight(2.0).natural_less(TropicalWeight(2.0)));
    }

    #[test]
    fn parse_text_reads_floats() {
        assert_eq!(TropicalWeight::parse_text(" 0.5 "), Some(TropicalWeight(0.5)));
        assert_eq!(TropicalWeight::parse_text("x"), None);
        assert_eq!(Log64Weight::parse_text("2"), Some(Log64Weight(2.0)));
    }

    #[test]
    fn zero_approx_eq_zero() {
        assert!(TropicalWeight::zero().approx_eq(TropicalWeight::zero()));
        assert!(!TropicalWeight::zero().approx_eq(TropicalWeight::one()));
    }
}
