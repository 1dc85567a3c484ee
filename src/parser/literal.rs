//! Decoding of numeric, character and string literal spellings.

/// Value and type suffix of an integer literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntLiteral {
    pub value: u64,
    pub unsigned: bool,
    /// Number of `l` suffixes: 0, 1 (`long`) or 2 (`long long`).
    pub longs: u8,
}

/// Parse an integer literal such as `42`, `0x1Fu`, `017`, `0b101`, `10ull`.
pub fn parse_integer(text: &str) -> Option<IntLiteral> {
    let digits_end = text
        .char_indices()
        .rev()
        .take_while(|(_, c)| matches!(c, 'u' | 'U' | 'l' | 'L'))
        .last()
        .map_or(text.len(), |(idx, _)| idx);
    let (body, suffix) = text.split_at(digits_end);
    let unsigned = suffix.contains(['u', 'U']);
    let longs = suffix.chars().filter(|c| matches!(c, 'l' | 'L')).count() as u8;
    if longs > 2 {
        return None;
    }

    let body: String = body.chars().filter(|&c| c != '\'').collect();
    let value = if let Some(hex) = body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16).ok()?
    } else if let Some(bin) = body.strip_prefix("0b").or_else(|| body.strip_prefix("0B")) {
        u64::from_str_radix(bin, 2).ok()?
    } else if body.len() > 1 && body.starts_with('0') {
        u64::from_str_radix(&body[1..], 8).ok()?
    } else {
        body.parse::<u64>().ok()?
    };
    Some(IntLiteral {
        value,
        unsigned,
        longs,
    })
}

/// Parse a floating literal. Returns the value and whether it has an `f`
/// suffix.
pub fn parse_float(text: &str) -> Option<(f64, bool)> {
    let is_hex = text.starts_with("0x") || text.starts_with("0X");
    let is_float = text.ends_with(['f', 'F']) && (!is_hex || text.contains(['p', 'P']));
    let body = text.trim_end_matches(['f', 'F', 'l', 'L']);
    let value = match body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
        Some(hex) => parse_hex_float(hex)?,
        None => body.parse::<f64>().ok()?,
    };
    Some((value, is_float))
}

fn parse_hex_float(hex: &str) -> Option<f64> {
    let (mantissa, exponent) = match hex.find(['p', 'P']) {
        Some(idx) => (&hex[..idx], hex[idx + 1..].parse::<i32>().ok()?),
        None => (hex, 0),
    };
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let mut value = 0f64;
    for c in int_part.chars() {
        value = value * 16.0 + f64::from(c.to_digit(16)?);
    }
    let mut scale = 1.0 / 16.0;
    for c in frac_part.chars() {
        value += f64::from(c.to_digit(16)?) * scale;
        scale /= 16.0;
    }
    Some(value * 2f64.powi(exponent))
}

/// Value of a character literal like `'a'`, `'\n'` or `'\x41'`.
pub fn parse_char(text: &str) -> Option<i64> {
    let start = text.find('\'')?;
    let inner = text.get(start + 1..text.len().checked_sub(1)?)?;
    let decoded = unescape(inner);
    let mut value: i64 = 0;
    for c in decoded.chars() {
        value = (value << 8) | i64::from(c as u32 & 0xff);
    }
    Some(value)
}

/// Contents of a string literal with the quotes removed and escapes decoded.
pub fn parse_string(text: &str) -> String {
    let Some(start) = text.find('"') else {
        return String::new();
    };
    let inner = text
        .get(start + 1..text.len().saturating_sub(1))
        .unwrap_or("");
    unescape(inner)
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(esc) = chars.next() else {
            out.push('\\');
            break;
        };
        match esc {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'a' => out.push('\x07'),
            'b' => out.push('\x08'),
            'f' => out.push('\x0c'),
            'v' => out.push('\x0b'),
            'e' => out.push('\x1b'),
            'x' => {
                let mut value = 0u32;
                while let Some(d) = chars.peek().and_then(|c| c.to_digit(16)) {
                    value = value.wrapping_mul(16).wrapping_add(d);
                    chars.next();
                }
                out.push(char::from_u32(value & 0xff).unwrap_or('\0'));
            }
            '0'..='7' => {
                let mut value = esc.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match chars.peek().and_then(|c| c.to_digit(8)) {
                        Some(d) => {
                            value = value * 8 + d;
                            chars.next();
                        }
                        None => break,
                    }
                }
                out.push(char::from_u32(value & 0xff).unwrap_or('\0'));
            }
            other => out.push(other),
        }
    }
    out
}

/// Quote `s` as a string literal spelling, as `#param` does.
pub fn stringify(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers() {
        assert_eq!(parse_integer("42").map(|l| l.value), Some(42));
        assert_eq!(parse_integer("0x1F").map(|l| l.value), Some(31));
        assert_eq!(parse_integer("017").map(|l| l.value), Some(15));
        assert_eq!(parse_integer("0b101").map(|l| l.value), Some(5));
        assert_eq!(parse_integer("0").map(|l| l.value), Some(0));
        let lit = parse_integer("10ull").unwrap();
        assert!(lit.unsigned);
        assert_eq!(lit.longs, 2);
        assert_eq!(parse_integer("1.5"), None);
    }

    #[test]
    fn floats() {
        assert_eq!(parse_float("1.5"), Some((1.5, false)));
        assert_eq!(parse_float("2.0f"), Some((2.0, true)));
        assert_eq!(parse_float("0x1p3"), Some((8.0, false)));
        assert_eq!(parse_float("1e2"), Some((100.0, false)));
    }

    #[test]
    fn chars_and_strings() {
        assert_eq!(parse_char("'a'"), Some(97));
        assert_eq!(parse_char("'\\n'"), Some(10));
        assert_eq!(parse_char("'\\x41'"), Some(65));
        assert_eq!(parse_string("\"foo\\n\""), "foo\n");
        assert_eq!(parse_string("L\"wide\""), "wide");
        assert_eq!(stringify("a \"b\""), "\"a \\\"b\\\"\"");
    }
}
