//! Best-effort integer parsing.
//!
//! Checksum records carry numbers as text and older agents are known to emit garbage in some
//! numeric fields. These helpers accept the longest numeric prefix (after optional leading
//! whitespace and a sign) and fall back to `0` when there is none, saturating instead of
//! wrapping on overflow.

#[inline]
fn is_c_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\x0b' | b'\x0c' | b'\r')
}

pub(crate) fn parse_long_lenient(text: &str) -> i64 {
    let bytes = text.as_bytes();
    let start = bytes.iter().position(|&b| !is_c_space(b)).unwrap_or(bytes.len());
    let rest = &bytes[start..];

    let (negative, digits) = match rest.first() {
        Some(b'-') => (true, &rest[1..]),
        Some(b'+') => (false, &rest[1..]),
        _ => (false, rest),
    };

    let mut value: i64 = 0;
    for d in digits.iter().take_while(|b| b.is_ascii_digit()) {
        let d = i64::from(d - b'0');
        value = if negative {
            value.saturating_mul(10).saturating_sub(d)
        } else {
            value.saturating_mul(10).saturating_add(d)
        };
    }

    value
}

pub(crate) fn parse_int_lenient(text: &str) -> i32 {
    let value = parse_long_lenient(text);
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}
