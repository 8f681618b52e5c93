#![forbid(unsafe_code)]

pub mod table;

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Formats a server RFC 3339 timestamp with the configured
/// `ui.date_format` pattern. Unparseable input is shown as-is so a
/// misbehaving server never hides a row.
#[must_use]
pub fn format_timestamp(raw: &str, pattern: &str) -> String {
    if raw.trim().is_empty() {
        return "-".to_owned();
    }
    let Ok(parsed) = OffsetDateTime::parse(raw, &Rfc3339) else {
        return raw.to_owned();
    };
    let Ok(format) = time::format_description::parse(pattern) else {
        return raw.to_owned();
    };
    parsed.format(&format).unwrap_or_else(|_| raw.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_rfc3339() {
        let out = format_timestamp(
            "2024-03-05T09:30:00.000Z",
            "[day]/[month]/[year] [hour]:[minute]",
        );
        assert_eq!(out, "05/03/2024 09:30");
    }

    #[test]
    fn passes_through_garbage() {
        assert_eq!(format_timestamp("not a date", "[year]"), "not a date");
    }

    #[test]
    fn empty_becomes_dash() {
        assert_eq!(format_timestamp("", "[year]"), "-");
    }
}
