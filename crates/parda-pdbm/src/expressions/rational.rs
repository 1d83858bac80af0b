//! Exact arbitrary-precision rational numbers with infinities and NaN
//!
//! Difference bounds need two things ordinary rationals do not have: a
//! `+∞` sentinel for "no upper bound" and a well-defined result for the
//! degenerate arithmetic that sentinel produces (`∞ - ∞`, `0 · ∞`). The
//! [`Rational`] type extends [`num::BigRational`] with `±∞` and `NaN` and
//! follows the usual extended-real rules.
//!
//! The variants are declared so that the derived order is the total order
//! required for canonical hashing: `NaN > +∞ > finite > -∞`. Equality is
//! structural, so `NaN == NaN`.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Mutex, OnceLock};

use num::bigint::Sign;
use num::{BigInt, BigRational, One, Signed, Zero};

/// Small integers are interned process-wide; see [`Rational::from_int`]
const SMALL_INT_RANGE: i64 = 16;

/// Operand magnitude below which [`Rational::from_ratio`] results are cached
const CACHE_MAGNITUDE: u64 = 1 << 10;

static SMALL_INTS: OnceLock<Vec<Rational>> = OnceLock::new();
static RATIO_CACHE: OnceLock<Mutex<HashMap<(i64, i64), Rational>>> = OnceLock::new();

fn small_ints() -> &'static [Rational] {
    SMALL_INTS.get_or_init(|| {
        (-SMALL_INT_RANGE..=SMALL_INT_RANGE)
            .map(|n| Rational::Finite(BigRational::from_integer(BigInt::from(n))))
            .collect()
    })
}

/// An exact rational number extended with `±∞` and `NaN`
///
/// Finite values are kept in canonical form (`gcd(p, q) = 1`, `q > 0`) by
/// the underlying [`BigRational`]. The derived [`Ord`] is the total order
/// `NaN > +∞ > finite > -∞`.
///
/// # Example
///
/// ```
/// use parda_pdbm::Rational;
///
/// let half = Rational::from_ratio(2, 4);
/// assert_eq!(half, Rational::from_ratio(1, 2));
/// assert!(half < Rational::one());
/// assert!(Rational::infinity() > Rational::from_int(1_000_000));
/// assert!(Rational::nan() > Rational::infinity());
///
/// let sum = half + Rational::from_ratio(1, 3);
/// assert_eq!(sum, Rational::from_ratio(5, 6));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Rational {
    /// Negative infinity
    NegInfinity,
    /// A finite rational in canonical form
    Finite(BigRational),
    /// Positive infinity
    Infinity,
    /// Not a number, the result of `∞ - ∞`, `0 · ∞` and `0 / 0`
    Nan,
}

impl Rational {
    /// The number 0
    pub fn zero() -> Self {
        Rational::from_int(0)
    }

    /// The number 1
    pub fn one() -> Self {
        Rational::from_int(1)
    }

    /// Positive infinity
    pub fn infinity() -> Self {
        Rational::Infinity
    }

    /// Negative infinity
    pub fn neg_infinity() -> Self {
        Rational::NegInfinity
    }

    /// Not a number
    pub fn nan() -> Self {
        Rational::Nan
    }

    /// The integer `n` as a rational
    ///
    /// Small integers are served from a process-wide table.
    pub fn from_int(n: i64) -> Self {
        if (-SMALL_INT_RANGE..=SMALL_INT_RANGE).contains(&n) {
            return small_ints()[(n + SMALL_INT_RANGE) as usize].clone();
        }
        Rational::Finite(BigRational::from_integer(BigInt::from(n)))
    }

    /// The fraction `numerator / denominator`, simplified
    ///
    /// A zero denominator yields `±∞` according to the sign of the
    /// numerator, or `NaN` for `0/0`. Results with small operands are
    /// interned in a process-wide cache.
    ///
    /// # Example
    ///
    /// ```
    /// use parda_pdbm::Rational;
    ///
    /// assert_eq!(Rational::from_ratio(4, 8), Rational::from_ratio(1, 2));
    /// assert_eq!(Rational::from_ratio(3, -6), Rational::from_ratio(-1, 2));
    /// assert_eq!(Rational::from_ratio(1, 0), Rational::infinity());
    /// assert_eq!(Rational::from_ratio(-1, 0), Rational::neg_infinity());
    /// assert_eq!(Rational::from_ratio(0, 0), Rational::nan());
    /// ```
    pub fn from_ratio(numerator: i64, denominator: i64) -> Self {
        if denominator != 0
            && numerator.unsigned_abs() < CACHE_MAGNITUDE
            && denominator.unsigned_abs() < CACHE_MAGNITUDE
        {
            let cache = RATIO_CACHE.get_or_init(|| Mutex::new(HashMap::new()));
            let mut map = cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            return map
                .entry((numerator, denominator))
                .or_insert_with(|| {
                    Self::from_bigints(BigInt::from(numerator), BigInt::from(denominator))
                })
                .clone();
        }
        Self::from_bigints(BigInt::from(numerator), BigInt::from(denominator))
    }

    /// The fraction `numerator / denominator` over big integers
    pub fn from_bigints(numerator: BigInt, denominator: BigInt) -> Self {
        if denominator.is_zero() {
            return match numerator.sign() {
                Sign::Plus => Rational::Infinity,
                Sign::Minus => Rational::NegInfinity,
                Sign::NoSign => Rational::Nan,
            };
        }
        Rational::Finite(BigRational::new(numerator, denominator))
    }

    /// Check whether the value is finite (neither infinite nor NaN)
    pub fn is_finite(&self) -> bool {
        matches!(self, Rational::Finite(_))
    }

    /// Check whether the value is `+∞` or `-∞`
    pub fn is_infinite(&self) -> bool {
        matches!(self, Rational::Infinity | Rational::NegInfinity)
    }

    /// Check whether the value is NaN
    pub fn is_nan(&self) -> bool {
        matches!(self, Rational::Nan)
    }

    /// Check whether the value is 0
    pub fn is_zero(&self) -> bool {
        matches!(self, Rational::Finite(r) if r.is_zero())
    }

    /// Check whether the value is a finite integer
    pub fn is_integer(&self) -> bool {
        matches!(self, Rational::Finite(r) if r.is_integer())
    }

    /// Sign of the value: 1, 0 or -1; infinities count with their sign
    ///
    /// # Panics
    ///
    /// Panics on NaN, which has no sign.
    pub fn signum(&self) -> i32 {
        match self {
            Rational::Nan => panic!("signum of NaN"),
            Rational::Infinity => 1,
            Rational::NegInfinity => -1,
            Rational::Finite(r) => {
                if r.is_positive() {
                    1
                } else if r.is_negative() {
                    -1
                } else {
                    0
                }
            }
        }
    }

    /// Absolute value; NaN stays NaN
    pub fn abs(&self) -> Rational {
        match self {
            Rational::Nan => Rational::Nan,
            Rational::Infinity | Rational::NegInfinity => Rational::Infinity,
            Rational::Finite(r) => Rational::Finite(r.abs()),
        }
    }

    /// Multiplicative inverse; `1/0` is `+∞`, `1/±∞` is 0
    pub fn reciprocal(&self) -> Rational {
        match self {
            Rational::Nan => Rational::Nan,
            Rational::Infinity | Rational::NegInfinity => Rational::zero(),
            Rational::Finite(r) if r.is_zero() => Rational::Infinity,
            Rational::Finite(r) => Rational::Finite(r.recip()),
        }
    }

    /// The greater of two values; NaN is absorbing
    pub fn max(a: &Rational, b: &Rational) -> Rational {
        if a.is_nan() || b.is_nan() {
            return Rational::Nan;
        }
        if a >= b { a.clone() } else { b.clone() }
    }
}

impl From<i64> for Rational {
    fn from(n: i64) -> Self {
        Rational::from_int(n)
    }
}

impl std::ops::Add<&Rational> for &Rational {
    type Output = Rational;

    fn add(self, rhs: &Rational) -> Rational {
        use Rational::*;
        match (self, rhs) {
            (Nan, _) | (_, Nan) => Nan,
            (Infinity, NegInfinity) | (NegInfinity, Infinity) => Nan,
            (Infinity, _) | (_, Infinity) => Infinity,
            (NegInfinity, _) | (_, NegInfinity) => NegInfinity,
            (Finite(a), Finite(b)) => Finite(a + b),
        }
    }
}

impl std::ops::Sub<&Rational> for &Rational {
    type Output = Rational;

    fn sub(self, rhs: &Rational) -> Rational {
        self + &(-rhs)
    }
}

impl std::ops::Mul<&Rational> for &Rational {
    type Output = Rational;

    fn mul(self, rhs: &Rational) -> Rational {
        use Rational::*;
        match (self, rhs) {
            (Nan, _) | (_, Nan) => Nan,
            (Finite(a), Finite(b)) => Finite(a * b),
            _ => {
                // at least one infinite operand
                if self.is_zero() || rhs.is_zero() {
                    return Nan;
                }
                if self.signum() * rhs.signum() > 0 {
                    Infinity
                } else {
                    NegInfinity
                }
            }
        }
    }
}

impl std::ops::Div<&Rational> for &Rational {
    type Output = Rational;

    fn div(self, rhs: &Rational) -> Rational {
        use Rational::*;
        match (self, rhs) {
            (Nan, _) | (_, Nan) => Nan,
            _ if rhs.is_zero() => {
                if self.is_zero() {
                    Nan
                } else if self.signum() > 0 {
                    Infinity
                } else {
                    NegInfinity
                }
            }
            (_, Infinity) | (_, NegInfinity) => {
                if self.is_infinite() {
                    Nan
                } else {
                    Rational::zero()
                }
            }
            (Infinity, _) | (NegInfinity, _) => {
                if self.signum() * rhs.signum() > 0 {
                    Infinity
                } else {
                    NegInfinity
                }
            }
            (Finite(a), Finite(b)) => Finite(a / b),
        }
    }
}

impl std::ops::Neg for &Rational {
    type Output = Rational;

    fn neg(self) -> Rational {
        match self {
            Rational::Nan => Rational::Nan,
            Rational::Infinity => Rational::NegInfinity,
            Rational::NegInfinity => Rational::Infinity,
            Rational::Finite(r) => Rational::Finite(-r),
        }
    }
}

impl std::ops::Add for Rational {
    type Output = Rational;
    fn add(self, rhs: Rational) -> Rational {
        &self + &rhs
    }
}

impl std::ops::Sub for Rational {
    type Output = Rational;
    fn sub(self, rhs: Rational) -> Rational {
        &self - &rhs
    }
}

impl std::ops::Mul for Rational {
    type Output = Rational;
    fn mul(self, rhs: Rational) -> Rational {
        &self * &rhs
    }
}

impl std::ops::Div for Rational {
    type Output = Rational;
    fn div(self, rhs: Rational) -> Rational {
        &self / &rhs
    }
}

impl std::ops::Neg for Rational {
    type Output = Rational;
    fn neg(self) -> Rational {
        -&self
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rational::Nan => write!(f, "NaN"),
            Rational::Infinity => write!(f, "∞"),
            Rational::NegInfinity => write!(f, "-∞"),
            Rational::Finite(r) => {
                if r.is_integer() {
                    write!(f, "{}", r.numer())
                } else {
                    write!(f, "{}/{}", r.numer(), r.denom())
                }
            }
        }
    }
}

/// Error returned when a string cannot be parsed as a [`Rational`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRationalError {
    input: String,
}

impl fmt::Display for ParseRationalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid rational literal: `{}`", self.input)
    }
}

impl std::error::Error for ParseRationalError {}

impl FromStr for Rational {
    type Err = ParseRationalError;

    /// Parse `p/q` fractions, integers, decimal literals, `inf`/`∞` (with
    /// optional sign) and `NaN`
    ///
    /// # Example
    ///
    /// ```
    /// use parda_pdbm::Rational;
    ///
    /// assert_eq!("3/4".parse::<Rational>().unwrap(), Rational::from_ratio(3, 4));
    /// assert_eq!("-0.25".parse::<Rational>().unwrap(), Rational::from_ratio(-1, 4));
    /// assert_eq!("∞".parse::<Rational>().unwrap(), Rational::infinity());
    /// assert!("1/x".parse::<Rational>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseRationalError {
            input: s.to_string(),
        };
        let t = s.trim();
        if t.is_empty() {
            return Err(err());
        }

        match t {
            "∞" | "+∞" => return Ok(Rational::Infinity),
            "-∞" => return Ok(Rational::NegInfinity),
            _ => {}
        }
        let lower = t.to_ascii_lowercase();
        match lower.as_str() {
            "inf" | "+inf" | "infinity" | "+infinity" => return Ok(Rational::Infinity),
            "-inf" | "-infinity" => return Ok(Rational::NegInfinity),
            "nan" => return Ok(Rational::Nan),
            _ => {}
        }

        if let Some((num, den)) = t.split_once('/') {
            let num = BigInt::from_str(num.trim()).map_err(|_| err())?;
            let den = BigInt::from_str(den.trim()).map_err(|_| err())?;
            return Ok(Rational::from_bigints(num, den));
        }

        if let Some((whole, frac)) = t.split_once('.') {
            if frac.is_empty() || !frac.bytes().all(|b| b.is_ascii_digit()) {
                return Err(err());
            }
            let negative = whole.starts_with('-');
            let whole = BigInt::from_str(whole).map_err(|_| err())?;
            let frac_value = BigInt::from_str(frac).map_err(|_| err())?;
            let den = (0..frac.len()).fold(BigInt::one(), |acc, _| acc * BigInt::from(10));
            let mut num = whole.abs() * &den + frac_value;
            if negative {
                num = -num;
            }
            return Ok(Rational::from_bigints(num, den));
        }

        let num = BigInt::from_str(t).map_err(|_| err())?;
        Ok(Rational::from_bigints(num, BigInt::one()))
    }
}
