//! Internal Rate of Return (IRR) on annual fund cashflows

const TOLERANCE: f64 = 1e-10;
const MAX_ITERATIONS: usize = 1000;
const MIN_RATE: f64 = -0.99;
const MAX_RATE: f64 = 10.0;

/// Annual IRR of a cashflow series, one entry per year starting at t = 0
///
/// Newton-Raphson from a 10% guess, falling back to bisection over
/// `[-99%, 1000%]`. `None` when the series has no sign change or no root
/// is found.
pub fn calculate_irr(cashflows: &[f64]) -> Option<f64> {
    if cashflows.is_empty() {
        return None;
    }

    if cashflows.iter().all(|&cf| cf.abs() < 1e-10) {
        return Some(0.0);
    }

    let has_positive = cashflows.iter().any(|&cf| cf > 1e-10);
    let has_negative = cashflows.iter().any(|&cf| cf < -1e-10);
    if !has_positive || !has_negative {
        return None;
    }

    let mut rate = 0.10;
    for _ in 0..MAX_ITERATIONS {
        let (npv, dnpv) = npv_and_derivative(cashflows, rate);
        if dnpv.abs() < 1e-20 {
            return irr_bisection(cashflows);
        }

        let next = (rate - npv / dnpv).clamp(MIN_RATE, MAX_RATE);
        if (next - rate).abs() < TOLERANCE {
            return Some(next);
        }
        rate = next;
    }

    irr_bisection(cashflows)
}

/// LP IRR: initial capital paid in at t = 0, yearly distributions received at t = 1, 2, ...
pub fn calculate_lp_irr(initial_capital: f64, yearly_distributions: &[f64]) -> Option<f64> {
    let mut cashflows = Vec::with_capacity(yearly_distributions.len() + 1);
    cashflows.push(-initial_capital);
    cashflows.extend_from_slice(yearly_distributions);
    calculate_irr(&cashflows)
}

fn npv_and_derivative(cashflows: &[f64], rate: f64) -> (f64, f64) {
    let mut npv = 0.0;
    let mut dnpv = 0.0;
    for (t, &cf) in cashflows.iter().enumerate() {
        npv += cf / (1.0 + rate).powi(t as i32);
        if t > 0 {
            dnpv -= (t as f64) * cf / (1.0 + rate).powi(t as i32 + 1);
        }
    }
    (npv, dnpv)
}

fn npv_at_rate(cashflows: &[f64], rate: f64) -> f64 {
    cashflows
        .iter()
        .enumerate()
        .map(|(t, &cf)| cf / (1.0 + rate).powi(t as i32))
        .sum()
}

fn irr_bisection(cashflows: &[f64]) -> Option<f64> {
    let mut low = MIN_RATE;
    let mut high = MAX_RATE;
    let mut npv_low = npv_at_rate(cashflows, low);

    if npv_low * npv_at_rate(cashflows, high) > 0.0 {
        return None;
    }

    for _ in 0..MAX_ITERATIONS {
        let mid = (low + high) / 2.0;
        let npv_mid = npv_at_rate(cashflows, mid);

        if npv_mid.abs() < TOLERANCE || (high - low) / 2.0 < TOLERANCE {
            return Some(mid);
        }

        if npv_mid * npv_low < 0.0 {
            high = mid;
        } else {
            low = mid;
            npv_low = npv_mid;
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_single_period() {
        let irr = calculate_irr(&[-1000.0, 1100.0]).unwrap();
        assert_abs_diff_eq!(irr, 0.10, epsilon = 1e-8);
    }

    #[test]
    fn test_fund_shaped_flows() {
        // Capital out at t = 0, doubled after five years
        let irr = calculate_lp_irr(1_000.0, &[0.0, 0.0, 0.0, 0.0, 2_000.0]).unwrap();
        assert_abs_diff_eq!(irr, 2.0_f64.powf(0.2) - 1.0, epsilon = 1e-8);
    }

    #[test]
    fn test_losing_fund_has_negative_irr() {
        let irr = calculate_lp_irr(1_000.0, &[0.0, 0.0, 500.0]).unwrap();
        assert!(irr < 0.0);
        assert_abs_diff_eq!(irr, 0.5_f64.powf(1.0 / 3.0) - 1.0, epsilon = 1e-8);
    }

    #[test]
    fn test_no_sign_change() {
        assert!(calculate_irr(&[100.0, 200.0]).is_none());
        assert!(calculate_lp_irr(1_000.0, &[0.0, 0.0]).is_none());
        assert!(calculate_irr(&[]).is_none());
    }
}
