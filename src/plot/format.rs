/// French tick formatting: space as thousands separator, comma as decimal
/// separator. `digits == 0` rounds half to even.
pub fn fmt_fr(x: f64, digits: usize) -> String {
    if !x.is_finite() {
        return x.to_string();
    }
    let (sign, abs) = if x < 0.0 { ("-", -x) } else { ("", x) };
    let rendered = if digits == 0 {
        format!("{:.0}", abs.round_ties_even())
    } else {
        format!("{:.*}", digits, abs)
    };
    let (int_part, frac_part) = match rendered.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (rendered.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(c);
    }

    // "-0" is not worth printing
    let sign = if grouped.chars().all(|c| c == '0' || c == ' ')
        && frac_part.map_or(true, |f| f.chars().all(|c| c == '0'))
    {
        ""
    } else {
        sign
    };

    match frac_part {
        Some(f) => format!("{sign}{grouped},{f}"),
        None => format!("{sign}{grouped}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_get_space_separators() {
        assert_eq!(fmt_fr(0.0, 0), "0");
        assert_eq!(fmt_fr(999.0, 0), "999");
        assert_eq!(fmt_fr(1000.0, 0), "1 000");
        assert_eq!(fmt_fr(1234567.0, 0), "1 234 567");
        assert_eq!(fmt_fr(-12345.4, 0), "-12 345");
    }

    #[test]
    fn rounding_is_half_to_even() {
        assert_eq!(fmt_fr(2.5, 0), "2");
        assert_eq!(fmt_fr(3.5, 0), "4");
        assert_eq!(fmt_fr(-0.4, 0), "0");
    }

    #[test]
    fn decimals_use_a_comma() {
        assert_eq!(fmt_fr(1234.567, 2), "1 234,57");
        assert_eq!(fmt_fr(0.5, 2), "0,50");
        assert_eq!(fmt_fr(-1.26, 1), "-1,3");
    }

    #[test]
    fn non_finite_passthrough() {
        assert_eq!(fmt_fr(f64::NAN, 0), "NaN");
        assert_eq!(fmt_fr(f64::INFINITY, 2), "inf");
    }
}
