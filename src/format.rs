/// Format a count with `.` thousands separators, the id-ID convention.
pub fn format_population(value: u64) -> String {
    let digits = value.to_string();
    let lead = digits.len() % 3;
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (i + 3 - lead) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

/// "1.234 people", or "no data" when the join found nothing.
pub fn population_label(population: Option<u64>) -> String {
    match population {
        Some(value) => {
            let mut out = format_population(value);
            out.push_str(" people");
            out
        }
        None => "no data".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formats_zero() {
        assert_eq!(format_population(0), "0");
    }

    #[test]
    fn test_formats_below_thousand() {
        assert_eq!(format_population(999), "999");
    }

    #[test]
    fn test_formats_exact_thousand() {
        assert_eq!(format_population(1_000), "1.000");
    }

    #[test]
    fn test_formats_millions() {
        assert_eq!(format_population(25_000_000), "25.000.000");
        assert_eq!(format_population(1_234_567), "1.234.567");
    }

    #[test]
    fn test_formats_u64_max() {
        assert_eq!(format_population(u64::MAX), "18.446.744.073.709.551.615");
    }

    #[test]
    fn test_labels_join_miss() {
        assert_eq!(population_label(None), "no data");
        assert_eq!(population_label(Some(10_500)), "10.500 people");
    }
}
