/// Format a number for display.
///
/// Uses the shortest representation that round-trips, without a trailing
/// `.0` for whole numbers. Negative zero prints as `0`.
pub fn format_number(n: f64) -> String {
    if n == 0.0 {
        "0".to_string()
    } else {
        n.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::format_number;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(10.0), "10");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(0.25), "0.25");
        assert_eq!(format_number(-3.5), "-3.5");
    }
}
