use std::fmt::Display;

/// Share of `part` in `whole` as a percentage. An empty whole yields 0 instead of NaN.
/// Multiplying first keeps whole percentages exact, 3 of 5 is 60 and not 60.00000000000001.
pub fn percent_of(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.
    } else {
        part as f64 * 100. / whole as f64
    }
}

/// Rounds to the nearest whole number with halves going up, so 62.5 is shown as 63.
/// Float formatting with `{:.0}` would round halves to even instead.
pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Percentage shown as a whole number, e.g. `75%`. The stored value keeps full precision.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Percentage(pub f64);

impl Display for Percentage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", round_half_up(self.0))
    }
}

/// Signal to noise split shown as `80:20`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Split {
    pub signal: f64,
    pub noise: f64,
}

impl Split {
    pub fn new(signal: f64, noise: f64) -> Self {
        Self { signal, noise }
    }
}

impl Display for Split {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}",
            round_half_up(self.signal),
            round_half_up(self.noise)
        )
    }
}
