//! Monetary amount helpers
//!
//! Amounts are plain f64 euros; VAT-derived fields are rounded to 2
//! decimals at snapshot time and never recomputed afterwards.

/// Round to 2 decimal places
pub fn round2(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Convert a unit price in euros to minor currency units (cents)
///
/// Payment gateways expect integer minor units per line item.
pub fn to_minor_units(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

/// Split a gross total into (net, vat) for a VAT percentage in [0, 100)
///
/// `net = total / (1 + vat/100)`, `vat = total - net`, both rounded to
/// 2 decimals so that `net + vat == total` exactly.
pub fn vat_split(total_price: f64, vat_percentage: f64) -> (f64, f64) {
    let without_vat = round2(total_price / (1.0 + vat_percentage / 100.0));
    let vat = round2(total_price - without_vat);
    (without_vat, vat)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vat_split_spanish_rate() {
        // 25.00 gross at 21% VAT
        let (net, vat) = vat_split(25.0, 21.0);
        assert_eq!(net, 20.66);
        assert_eq!(vat, 4.34);
        assert_eq!(round2(net + vat), 25.0);
    }

    #[test]
    fn vat_split_zero_rate() {
        let (net, vat) = vat_split(10.0, 0.0);
        assert_eq!(net, 10.0);
        assert_eq!(vat, 0.0);
    }

    #[test]
    fn vat_split_adds_up_within_tolerance() {
        for rate in [4.0, 10.0, 21.0, 25.5, 99.0] {
            for total in [0.01, 1.0, 19.99, 123.45, 10_000.0] {
                let (net, vat) = vat_split(total, rate);
                assert!((net + vat - total).abs() < 0.01, "rate={rate} total={total}");
            }
        }
    }

    #[test]
    fn minor_units() {
        assert_eq!(to_minor_units(10.0), 1000);
        assert_eq!(to_minor_units(5.99), 599);
        assert_eq!(to_minor_units(0.1), 10);
    }
}
