use std::{
    iter::Sum,
    ops::{Add, Div, Sub},
    str::FromStr,
};

/// an amount of cpu time, in units of `USER_HZ` (usually hundredths of a second).
#[derive(Clone, Copy, Debug, Default, Eq, Ord, PartialEq, PartialOrd)]
pub struct UserHz(u64);

// === impl UserHz ===

impl UserHz {
    pub const fn new(hz: u64) -> Self {
        Self(hz)
    }
}

impl FromStr for UserHz {
    type Err = <u64 as FromStr>::Err;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

impl Add for UserHz {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        let (Self(lhs), Self(rhs)) = (self, rhs);
        Self(lhs.saturating_add(rhs))
    }
}

/// NB: subtraction saturates at zero. some counters, like iowait, are allowed to go
/// backwards between two readings.
impl Sub for UserHz {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        let (Self(lhs), Self(rhs)) = (self, rhs);
        Self(lhs.saturating_sub(rhs))
    }
}

impl Div for UserHz {
    type Output = f64;
    fn div(self, rhs: Self) -> Self::Output {
        let (Self(lhs), Self(rhs)) = (self, rhs);
        lhs as f64 / rhs as f64
    }
}

impl Sum for UserHz {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}
