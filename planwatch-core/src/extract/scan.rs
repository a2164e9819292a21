//! Text scanning helpers for plan descriptions
//!
//! The marketing text on tariff pages is semi-structured ("50 GB | 1000
//! Minuten | ..."), so extraction boils down to "first number followed by a
//! unit token". These scanners replicate that left-to-right, first-match
//! semantics with plain string walking.

/// Byte-wise ASCII case-insensitive prefix test. Multi-byte UTF-8 sequences
/// never compare equal to ASCII needles, so this is safe on arbitrary text.
pub fn starts_with_ci(text: &str, prefix: &str) -> bool {
    let t = text.as_bytes();
    let p = prefix.as_bytes();
    t.len() >= p.len() && t[..p.len()].eq_ignore_ascii_case(p)
}

/// ASCII case-insensitive substring test
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    let h = haystack.as_bytes();
    let n = needle.as_bytes();
    if n.len() > h.len() {
        return false;
    }
    (0..=h.len() - n.len()).any(|i| h[i..i + n.len()].eq_ignore_ascii_case(n))
}

/// How much of a number token a scanner accepts
#[derive(Clone, Copy, PartialEq)]
enum NumberStyle {
    /// Digits only, e.g. `1000`
    Integer,
    /// Digits with an optional fraction, e.g. `5.5`
    Decimal,
    /// Decimal with optional apostrophe grouping, e.g. `1'000`
    Grouped,
}

/// First integer immediately followed (after optional whitespace) by `unit`
pub fn int_before<'a>(text: &'a str, unit: &str) -> Option<&'a str> {
    number_before(text, &[unit], NumberStyle::Integer, false)
}

/// First decimal number followed by `unit`
pub fn decimal_before<'a>(text: &'a str, unit: &str) -> Option<&'a str> {
    number_before(text, &[unit], NumberStyle::Decimal, false)
}

/// First possibly apostrophe-grouped number followed by `unit`,
/// e.g. `1'000 Minuten`
pub fn grouped_number_before<'a>(text: &'a str, unit: &str) -> Option<&'a str> {
    number_before(text, &[unit], NumberStyle::Grouped, false)
}

/// Case-insensitive variant of [`decimal_before`] accepting any of `units`
pub fn decimal_before_any_ci<'a>(text: &'a str, units: &[&str]) -> Option<&'a str> {
    number_before(text, units, NumberStyle::Decimal, true)
}

fn number_before<'a>(
    text: &'a str,
    units: &[&str],
    style: NumberStyle,
    ci: bool,
) -> Option<&'a str> {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if !bytes[i].is_ascii_digit() {
            // Advance one full character
            i += text[i..].chars().next().map_or(1, char::len_utf8);
            continue;
        }

        let start = i;
        let end = scan_number(bytes, start, style);
        if unit_follows(text, end, units, ci) {
            return Some(&text[start..end]);
        }
        // No unit after this token; retry from the next position so that
        // e.g. the fractional digits of "5.5 GB" can still match an
        // integer-only scan, mirroring first-match regex behavior.
        i = start + 1;
    }
    None
}

/// Consume a number token starting at a digit, returning the end offset
fn scan_number(bytes: &[u8], start: usize, style: NumberStyle) -> usize {
    let mut j = start;
    while j < bytes.len() && bytes[j].is_ascii_digit() {
        j += 1;
    }
    if style != NumberStyle::Integer
        && j + 1 < bytes.len()
        && bytes[j] == b'.'
        && bytes[j + 1].is_ascii_digit()
    {
        j += 1;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
    }
    if style == NumberStyle::Grouped {
        while j + 1 < bytes.len() && bytes[j] == b'\'' && bytes[j + 1].is_ascii_digit() {
            j += 1;
            while j < bytes.len() && bytes[j].is_ascii_digit() {
                j += 1;
            }
        }
    }
    j
}

/// Whether one of `units` follows position `end`, after optional whitespace
fn unit_follows(text: &str, end: usize, units: &[&str], ci: bool) -> bool {
    let mut k = end;
    while let Some(c) = text[k..].chars().next() {
        if c.is_whitespace() {
            k += c.len_utf8();
        } else {
            break;
        }
    }
    units.iter().any(|unit| {
        if ci {
            starts_with_ci(&text[k..], unit)
        } else {
            text[k..].starts_with(unit)
        }
    })
}

/// First integer or unlimited-marker word followed by any of `units`,
/// all matched case-insensitively. Used by the free-text fallback, where
/// "unlimited 5 GB" style phrasing is possible.
pub fn word_or_int_before_any_ci<'a>(
    text: &'a str,
    words: &[&str],
    units: &[&str],
) -> Option<&'a str> {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i].is_ascii_digit() {
            let end = scan_number(bytes, i, NumberStyle::Integer);
            if unit_follows(text, end, units, true) {
                return Some(&text[i..end]);
            }
            i += 1;
            continue;
        }
        for word in words {
            if starts_with_ci(&text[i..], word) && unit_follows(text, i + word.len(), units, true) {
                return Some(&text[i..i + word.len()]);
            }
        }
        i += text[i..].chars().next().map_or(1, char::len_utf8);
    }
    None
}

/// First currency-prefixed amount, e.g. `CHF 19.90` or `Fr. 20`.
/// The fraction is only consumed when it has exactly two digits.
pub fn currency_amount(text: &str) -> Option<f64> {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let rest = &text[i..];
        let prefix_len = if starts_with_ci(rest, "CHF") || starts_with_ci(rest, "Fr.") {
            Some(3)
        } else if starts_with_ci(rest, "Fr") {
            Some(2)
        } else {
            None
        };

        if let Some(len) = prefix_len {
            let mut k = i + len;
            while let Some(c) = text[k..].chars().next() {
                if c.is_whitespace() {
                    k += c.len_utf8();
                } else {
                    break;
                }
            }
            if k < bytes.len() && bytes[k].is_ascii_digit() {
                let start = k;
                while k < bytes.len() && bytes[k].is_ascii_digit() {
                    k += 1;
                }
                if k + 2 < bytes.len()
                    && bytes[k] == b'.'
                    && bytes[k + 1].is_ascii_digit()
                    && bytes[k + 2].is_ascii_digit()
                {
                    k += 3;
                }
                if let Ok(amount) = text[start..k].parse::<f64>() {
                    return Some(amount);
                }
            }
        }

        i += rest.chars().next().map_or(1, char::len_utf8);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_int_before_unit() {
        assert_eq!(int_before("Mit 50 GB Daten", "GB"), Some("50"));
        assert_eq!(int_before("1000 Minuten | 500 SMS", "SMS"), Some("500"));
        assert_eq!(int_before("keine Daten", "GB"), None);
    }

    #[test]
    fn int_scan_recovers_from_fractions() {
        // "5.5 GB": the integer scanner cannot take "5.5", but restarting
        // inside the token still yields the "5 GB" match.
        assert_eq!(int_before("5.5 GB", "GB"), Some("5"));
        assert_eq!(decimal_before("5.5 GB", "GB"), Some("5.5"));
    }

    #[test]
    fn unit_must_follow_number() {
        assert_eq!(int_before("GB 50", "GB"), None);
        assert_eq!(int_before("50GB", "GB"), Some("50"));
    }

    #[test]
    fn grouped_numbers_keep_apostrophes() {
        assert_eq!(
            grouped_number_before("1'000 Minuten inkl.", "Minuten"),
            Some("1'000")
        );
        assert_eq!(grouped_number_before("100 Minuten", "Minuten"), Some("100"));
    }

    #[test]
    fn case_insensitive_units() {
        assert_eq!(decimal_before_any_ci("2.5 gb surf", &["GB", "TB"]), Some("2.5"));
        assert_eq!(decimal_before_any_ci("1 TB inkl.", &["GB", "TB"]), Some("1"));
    }

    #[test]
    fn word_or_int_matches_either() {
        let words = ["unlimited", "unlimitiert"];
        assert_eq!(
            word_or_int_before_any_ci("Unlimited Minutes", &words, &["min"]),
            Some("Unlimited")
        );
        assert_eq!(
            word_or_int_before_any_ci("300 min included", &words, &["min"]),
            Some("300")
        );
        assert_eq!(
            word_or_int_before_any_ci("no calls at all", &words, &["min"]),
            None
        );
    }

    #[test]
    fn currency_amounts() {
        assert_eq!(currency_amount("nur CHF 19.90 pro Monat"), Some(19.90));
        assert_eq!(currency_amount("Fr. 25"), Some(25.0));
        assert_eq!(currency_amount("fr 9.95"), Some(9.95));
        // Fraction with a single digit is not consumed
        assert_eq!(currency_amount("CHF 10.5"), Some(10.0));
        assert_eq!(currency_amount("kostenlos"), None);
    }

    #[test]
    fn contains_ci_handles_non_ascii() {
        assert!(contains_ci("unlimitierte GB für dich", "gb"));
        assert!(!contains_ci("Daten", "GB"));
    }
}
