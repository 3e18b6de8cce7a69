// wg-core/src/units.rs

use uom::si::f64::Pressure as UomPressure;

// Public canonical unit types (SI, f64)
pub type Pressure = UomPressure;

#[inline]
pub fn pa(v: f64) -> Pressure {
    use uom::si::pressure::pascal;
    Pressure::new::<pascal>(v)
}

#[inline]
pub fn bar(v: f64) -> Pressure {
    use uom::si::pressure::bar;
    Pressure::new::<bar>(v)
}

/// Pressure expressed in bar, the unit case files and reports use.
#[inline]
pub fn in_bar(p: Pressure) -> f64 {
    use uom::si::pressure::bar;
    p.get::<bar>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_smoke() {
        let p = pa(101_325.0);
        assert_eq!(p.value, 101_325.0);
        assert!((in_bar(bar(50.0)) - 50.0).abs() < 1e-12);
        assert!((bar(1.0).value - 1e5).abs() < 1e-9);
    }
}
