use rust_decimal::Decimal;

fn group_thousands(int_part: &str) -> String {
    let mut with_commas = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    with_commas.chars().rev().collect()
}

/// Format a decimal as a dollar amount with thousands separators: $1,234.56
pub fn money(val: Decimal) -> String {
    let negative = val.is_sign_negative() && !val.is_zero();
    let cents = format!("{:.2}", val.abs().round_dp(2));
    let (int_part, dec_part) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));
    let with_commas = group_thousands(int_part);

    if negative {
        format!("-${with_commas}.{dec_part}")
    } else {
        format!("${with_commas}.{dec_part}")
    }
}

/// One decimal place, the way progress labels show it.
pub fn percent(val: f64) -> String {
    format!("{val:.1}%")
}

pub fn number(n: usize) -> String {
    group_thousands(&n.to_string())
}

/// Compact axis label: "$Xk", "$X.Xk", "$XM".
pub fn compact(val: f64) -> String {
    if val >= 1_000_000.0 {
        let m = val / 1_000_000.0;
        if m == m.floor() {
            format!("${}M", m as u64)
        } else {
            format!("${:.1}M", m)
        }
    } else if val >= 1000.0 {
        let k = val / 1000.0;
        if k == k.floor() {
            format!("${}k", k as u64)
        } else {
            format!("${:.1}k", k)
        }
    } else {
        format!("${}", val as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_money_formatting() {
        assert_eq!(money(d("1234.56")), "$1,234.56");
        assert_eq!(money(d("-500.00")), "-$500.00");
        assert_eq!(money(Decimal::ZERO), "$0.00");
        assert_eq!(money(d("1000000.99")), "$1,000,000.99");
        assert_eq!(money(d("42.1")), "$42.10");
        assert_eq!(money(d("5")), "$5.00");
    }

    #[test]
    fn test_percent_and_number() {
        assert_eq!(percent(26.24), "26.2%");
        assert_eq!(percent(120.0), "120.0%");
        assert_eq!(number(1234567), "1,234,567");
        assert_eq!(number(12), "12");
    }

    #[test]
    fn test_compact() {
        assert_eq!(compact(2500.0), "$2.5k");
        assert_eq!(compact(5000.0), "$5k");
        assert_eq!(compact(1_000_000.0), "$1M");
        assert_eq!(compact(750.0), "$750");
    }
}
