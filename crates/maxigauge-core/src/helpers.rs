//! Formatting helpers for diagnostics and display.
//!
//! The controller protocol mixes printable ASCII with invisible control
//! bytes, so every reply is logged both as escaped text and as a hex dump.

/// Render bytes as space-separated uppercase hex pairs.
///
/// # Example
///
/// ```
/// use maxigauge_core::hex_dump;
///
/// assert_eq!(hex_dump(b"???"), "3F 3F 3F");
/// assert_eq!(hex_dump(&[0x06, 0x0D, 0x0A]), "06 0D 0A");
/// assert_eq!(hex_dump(&[]), "");
/// ```
pub fn hex_dump(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render bytes as text with control characters escaped (`\u{6}`, `\r`).
pub fn escape_bytes(data: &[u8]) -> String {
    String::from_utf8_lossy(data).escape_debug().to_string()
}

/// Format a pressure like the controller's display attribute (`%8.3e`).
///
/// Three decimals, a signed two-digit exponent, right-aligned in eight
/// columns. NaN renders as `nan`.
///
/// # Example
///
/// ```
/// use maxigauge_core::format_pressure;
///
/// assert_eq!(format_pressure(1.234e-5), "1.234e-05");
/// assert_eq!(format_pressure(1013.25), "1.013e+03");
/// ```
pub fn format_pressure(value: f64) -> String {
    if value.is_nan() {
        return format!("{:>8}", "nan");
    }
    if value.is_infinite() {
        let s = if value > 0.0 { "inf" } else { "-inf" };
        return format!("{s:>8}");
    }

    // Rust renders `1.234e-5`; widen the exponent to sign + two digits.
    let raw = format!("{value:.3e}");
    let formatted = match raw.split_once('e') {
        Some((mantissa, exp)) => {
            let exp: i32 = exp.parse().unwrap_or(0);
            let sign = if exp < 0 { '-' } else { '+' };
            format!("{mantissa}e{sign}{:02}", exp.abs())
        }
        None => raw,
    };
    format!("{formatted:>8}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_dump_control_bytes() {
        assert_eq!(hex_dump(&[0x15, 0x0D, 0x0A]), "15 0D 0A");
        assert_eq!(hex_dump(b"PR1"), "50 52 31");
    }

    #[test]
    fn escape_shows_control_characters() {
        assert_eq!(escape_bytes(b"\x06\r\n"), "\\u{6}\\r\\n");
        assert_eq!(escape_bytes(b"0,1.0E-05"), "0,1.0E-05");
    }

    #[test]
    fn format_pressure_small_and_large() {
        assert_eq!(format_pressure(1.234e-5), "1.234e-05");
        assert_eq!(format_pressure(2.0e-10), "2.000e-10");
        assert_eq!(format_pressure(1000.0), "1.000e+03");
    }

    #[test]
    fn format_pressure_zero_and_negative() {
        assert_eq!(format_pressure(0.0), "0.000e+00");
        assert_eq!(format_pressure(-2.5e-3), "-2.500e-03");
    }

    #[test]
    fn format_pressure_rounding_carries_into_exponent() {
        assert_eq!(format_pressure(9.9996e-5), "1.000e-04");
    }

    #[test]
    fn format_pressure_non_finite() {
        assert_eq!(format_pressure(f64::NAN), "     nan");
        assert_eq!(format_pressure(f64::INFINITY), "     inf");
    }
}
