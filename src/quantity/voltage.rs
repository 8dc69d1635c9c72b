use std::ops::Mul;

use crate::quantity::{current::Milliamps, power::Watts};

quantity!(Volts, via: f64, suffix: "V", precision: 2);

impl Mul<Milliamps> for Volts {
    type Output = Watts;

    fn mul(self, current: Milliamps) -> Self::Output {
        Watts(self.0 * (current.0 / 1000.0))
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn power_from_milliamps() {
        let power = Volts(12.0) * Milliamps(250.0);
        assert_abs_diff_eq!(power.0, 3.0);
    }

    #[test]
    fn display() {
        assert_eq!(Volts(12.346).to_string(), "12.35 V");
        assert_eq!(format!("{:?}", Volts(9.0)), "9.00V");
    }
}
