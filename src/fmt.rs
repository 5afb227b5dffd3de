/// Format a float as a dollar amount with thousands separators: $1,234.56
pub fn money(val: f64) -> String {
    let negative = val < 0.0;
    let abs = val.abs();
    let cents = format!("{:.2}", abs);
    let parts: Vec<&str> = cents.split('.').collect();
    let int_part = parts[0];
    let dec_part = parts[1];

    let mut with_commas = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    let with_commas: String = with_commas.chars().rev().collect();

    if negative {
        format!("-${with_commas}.{dec_part}")
    } else {
        format!("${with_commas}.{dec_part}")
    }
}

/// Format a day-change percentage with an explicit sign: +1.25% / -0.80%
pub fn signed_pct(val: f64) -> String {
    if val >= 0.0 {
        format!("+{:.2}%", val)
    } else {
        format!("{:.2}%", val)
    }
}

/// Format a dollar amount as compact "$Xk" or "$X.Xk" for thousands, "$XM" for millions.
pub fn compact_money(val: f64) -> String {
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

    #[test]
    fn test_money_formatting() {
        assert_eq!(money(1234.56), "$1,234.56");
        assert_eq!(money(-500.00), "-$500.00");
        assert_eq!(money(0.0), "$0.00");
        assert_eq!(money(1000000.99), "$1,000,000.99");
        assert_eq!(money(42.10), "$42.10");
    }

    #[test]
    fn test_signed_pct() {
        assert_eq!(signed_pct(1.254), "+1.25%");
        assert_eq!(signed_pct(-0.8), "-0.80%");
        assert_eq!(signed_pct(0.0), "+0.00%");
    }

    #[test]
    fn test_compact_money() {
        assert_eq!(compact_money(500.0), "$500");
        assert_eq!(compact_money(1000.0), "$1k");
        assert_eq!(compact_money(2500.0), "$2.5k");
        assert_eq!(compact_money(1_000_000.0), "$1M");
        assert_eq!(compact_money(1_500_000.0), "$1.5M");
    }
}
