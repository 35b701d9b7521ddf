//! Visitor count formatting for labels and tooltips.
//!
//! Counts below one million are shown as grouped integers (`"987,654"`);
//! larger counts as millions with one decimal (`"4.5 million"` / `"4.5M"`).

use num_format::{Locale, ToFormattedString};

const MILLION: u64 = 1_000_000;

/// Map a user-provided locale tag to a `num_format::Locale` and its decimal separator char.
///
/// Supported tags (case-insensitive): `en`, `us`, `en_US`, `de`, `de_DE`, `german`,
/// `fr`, `es`, `it`, `pt`, `nl`. Defaults to English.
pub fn map_locale(tag: &str) -> (&'static Locale, char) {
    match tag.to_lowercase().as_str() {
        "de" | "de_de" | "german" => (&Locale::de, ','),
        "fr" | "fr_fr" => (&Locale::fr, ','),
        "es" | "es_es" => (&Locale::es, ','),
        "it" | "it_it" => (&Locale::it, ','),
        "pt" | "pt_pt" | "pt_br" => (&Locale::pt, ','),
        "nl" | "nl_nl" => (&Locale::nl, ','),
        _ => (&Locale::en, '.'), // default
    }
}

/// `"4.5 million"` style (English grouping).
pub fn format_visitor_count(count: u64) -> String {
    format_visitor_count_locale(count, "en")
}

/// `"4.5M"` style (English grouping).
pub fn format_visitor_count_abbrev(count: u64) -> String {
    format_visitor_count_abbrev_locale(count, "en")
}

pub fn format_visitor_count_locale(count: u64, locale_tag: &str) -> String {
    format_with_suffix(count, locale_tag, " million")
}

pub fn format_visitor_count_abbrev_locale(count: u64, locale_tag: &str) -> String {
    format_with_suffix(count, locale_tag, "M")
}

fn format_with_suffix(count: u64, locale_tag: &str, suffix: &str) -> String {
    let (locale, decimal) = map_locale(locale_tag);
    if count < MILLION {
        return count.to_formatted_string(locale);
    }
    let mut millions = millions_one_decimal(count);
    if decimal != '.' {
        millions = millions.replace('.', &decimal.to_string());
    }
    format!("{millions}{suffix}")
}

/// `count / 1e6` with one decimal, rounding like JavaScript's `toFixed(1)`:
/// the decimal expansion of the binary quotient decides, and exact ties
/// (only possible at `k + 0.25`/`k + 0.75`) round up instead of to even.
fn millions_one_decimal(count: u64) -> String {
    const QUARTER: u64 = MILLION / 4;
    if count % QUARTER == 0 && (count / QUARTER) % 2 == 1 {
        let tenths = count / (MILLION / 10) + 1;
        return format!("{}.{}", tenths / 10, tenths % 10);
    }
    format!("{:.1}", count as f64 / MILLION as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn below_a_million_is_grouped() {
        assert_eq!(format_visitor_count(0), "0");
        assert_eq!(format_visitor_count(999), "999");
        assert_eq!(format_visitor_count(987_654), "987,654");
        assert_eq!(format_visitor_count_abbrev(987_654), "987,654");
        assert_eq!(format_visitor_count(999_999), "999,999");
    }

    #[test]
    fn millions_get_one_decimal() {
        assert_eq!(format_visitor_count(4_500_000), "4.5 million");
        assert_eq!(format_visitor_count_abbrev(4_500_000), "4.5M");
        assert_eq!(format_visitor_count(1_000_000), "1.0 million");
        assert_eq!(format_visitor_count_abbrev(12_937_633), "12.9M");
    }

    #[test]
    fn exact_ties_round_up() {
        assert_eq!(format_visitor_count_abbrev(1_250_000), "1.3M");
        assert_eq!(format_visitor_count_abbrev(2_750_000), "2.8M");
        // 1.15 is stored slightly below the tie
        assert_eq!(format_visitor_count_abbrev(1_150_000), "1.1M");
        assert_eq!(format_visitor_count_abbrev(1_449_999), "1.4M");
    }

    #[test]
    fn locale_changes_separators() {
        assert_eq!(format_visitor_count_locale(987_654, "de"), "987.654");
        assert_eq!(format_visitor_count_locale(4_500_000, "de"), "4,5 million");
        assert_eq!(format_visitor_count_abbrev_locale(4_500_000, "xx"), "4.5M");
    }
}
