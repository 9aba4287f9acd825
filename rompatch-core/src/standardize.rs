//! Canonical patch filename rules.
//!
//! A canonical name has five underscore-separated fields:
//! ```text
//! {TITLE}_{SYSTEM}_{BASEROM}-{CRC}_{VERSION}{VARIANT}_{YEAR}.{ext}
//! EMERALD-ENHANCED_GBA_EM-1961_11.010_2025.xdelta
//! ```

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use unicode_normalization::UnicodeNormalization;

/// Version core used when a version string has no leading number.
pub const DEFAULT_VERSION: &str = "0.0";

/// Year used when the release date is missing or unparseable.
pub const UNKNOWN_YEAR: &str = "0000";

const FRANCHISE_PREFIX: &str = "pokemon";

/// Normalize a title to an uppercase, hyphen-separated token.
///
/// Accents are folded to ASCII, a leading "Pokemon " is dropped, spaces
/// become hyphens and anything other than `[A-Za-z0-9-]` is removed.
///
/// ```
/// use rompatch_core::standardize::normalize_title;
///
/// assert_eq!(normalize_title("Pokémon Emerald Enhanced"), "EMERALD-ENHANCED");
/// assert_eq!(normalize_title("PMD: Explorers of Sky"), "PMD-EXPLORERS-OF-SKY");
/// ```
pub fn normalize_title(title: &str) -> String {
    let ascii: String = title.nfkd().filter(char::is_ascii).collect();
    let unprefixed = strip_franchise_prefix(&ascii);

    unprefixed
        .replace(' ', "-")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Remove a case-insensitive "pokemon" followed by at least one whitespace char.
fn strip_franchise_prefix(title: &str) -> &str {
    let n = FRANCHISE_PREFIX.len();
    match title.get(..n) {
        Some(head) if head.eq_ignore_ascii_case(FRANCHISE_PREFIX) => {
            let rest = &title[n..];
            let trimmed = rest.trim_start();
            if trimmed.len() < rest.len() {
                trimmed
            } else {
                title
            }
        }
        _ => title,
    }
}

/// Split a version string into its numeric core and a variant suffix.
///
/// Only a *leading* run of digits and dots counts as the core. A string
/// such as `"FULLRELEASE1.1.10_2"` therefore has core `"0.0"` and the
/// digits stay inside the variant.
///
/// ```
/// use rompatch_core::standardize::parse_version;
///
/// assert_eq!(parse_version("v1.1 VANILLA+"), ("1.1".to_string(), "VANILLA+".to_string()));
/// assert_eq!(parse_version("-"), ("0.0".to_string(), String::new()));
/// ```
pub fn parse_version(version: &str) -> (String, String) {
    let version = version.trim();
    if version.is_empty() || version == "-" {
        return (DEFAULT_VERSION.to_string(), String::new());
    }

    let version = version
        .strip_prefix(['v', 'V'])
        .unwrap_or(version);

    let core_len = version
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(version.len());

    if core_len == 0 {
        return (DEFAULT_VERSION.to_string(), clean_variant(version));
    }

    let (core, rest) = version.split_at(core_len);
    (core.to_string(), clean_variant(rest))
}

/// Keep word characters, `-` and `+`; uppercase the result.
fn clean_variant(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '+'))
        .flat_map(char::to_uppercase)
        .collect()
}

/// Four-digit release year from an ISO-8601 date, or `"0000"`.
pub fn extract_year(date: Option<&str>) -> String {
    date.map(str::trim)
        .filter(|d| !d.is_empty())
        .and_then(parse_iso_year)
        .map(|year| format!("{year:04}"))
        .unwrap_or_else(|| UNKNOWN_YEAR.to_string())
}

fn parse_iso_year(date: &str) -> Option<i32> {
    for fmt in ["%Y-%m-%d", "%Y%m%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(date, fmt) {
            return Some(d.year());
        }
    }
    for fmt in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(date, fmt) {
            return Some(dt.year());
        }
    }
    DateTime::parse_from_rfc3339(date).ok().map(|dt| dt.year())
}

/// Assemble a canonical patch filename. No validation is done here; the
/// caller passes already-normalized parts.
#[allow(clippy::too_many_arguments)]
pub fn generate_filename(
    title: &str,
    system: &str,
    baserom: &str,
    crc: &str,
    version: &str,
    variant: &str,
    year: &str,
    extension: &str,
) -> String {
    format!("{title}_{system}_{baserom}-{crc}_{version}{variant}_{year}.{extension}")
}

/// CRC code from the `{BASEROM}-{CRC}` field of a canonical filename.
pub fn crc_from_filename<'a>(filename: &'a str, baserom: &str) -> Option<&'a str> {
    let field = filename.split('_').nth(2)?;
    let crc = field.strip_prefix(baserom)?.strip_prefix('-')?;
    (!crc.is_empty()).then_some(crc)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pv(s: &str) -> (String, String) {
        parse_version(s)
    }

    fn pair(core: &str, variant: &str) -> (String, String) {
        (core.to_string(), variant.to_string())
    }

    #[test]
    fn test_normalize_title() {
        assert_eq!(normalize_title("Emerald Enhanced"), "EMERALD-ENHANCED");
        assert_eq!(normalize_title("Pokemon Emerald Enhanced"), "EMERALD-ENHANCED");
        assert_eq!(normalize_title("POKEMON   Emerald"), "EMERALD");
        assert_eq!(normalize_title("Black 2 Kaizo"), "BLACK-2-KAIZO");
        assert_eq!(normalize_title("PMD: Explorers of Sky"), "PMD-EXPLORERS-OF-SKY");
        assert_eq!(normalize_title("Gold 97: Reforged"), "GOLD-97-REFORGED");
        assert_eq!(normalize_title("Pokémon Église"), "EGLISE");
        assert_eq!(normalize_title(""), "");
    }

    #[test]
    fn test_prefix_needs_trailing_whitespace() {
        assert_eq!(normalize_title("Pokemon"), "POKEMON");
        assert_eq!(normalize_title("Pokemonium Red"), "POKEMONIUM-RED");
        assert_eq!(normalize_title("Super Pokemon Red"), "SUPER-POKEMON-RED");
    }

    #[test]
    fn test_parse_version() {
        assert_eq!(pv("v11.010"), pair("11.010", ""));
        assert_eq!(pv("V1.2.3"), pair("1.2.3", ""));
        assert_eq!(pv("v1.1 VANILLA+"), pair("1.1", "VANILLA+"));
        assert_eq!(pv("v1.1VANILLA+"), pair("1.1", "VANILLA+"));
        assert_eq!(pv("1.0.5"), pair("1.0.5", ""));
        assert_eq!(pv("2.0 beta (hotfix)"), pair("2.0", "BETAHOTFIX"));
        assert_eq!(pv("1.0 alpha_2-x"), pair("1.0", "ALPHA_2-X"));
        assert_eq!(pv(""), pair("0.0", ""));
        assert_eq!(pv("-"), pair("0.0", ""));
        assert_eq!(pv("  -  "), pair("0.0", ""));
        assert_eq!(pv("Beta"), pair("0.0", "BETA"));
    }

    #[test]
    fn test_embedded_digits_stay_in_variant() {
        assert_eq!(pv("FULLRELEASE1.1.10_2"), pair("0.0", "FULLRELEASE1110_2"));
    }

    #[test]
    fn test_version_core_has_no_letters() {
        for input in [
            "v11.010",
            "v1.1VANILLA+",
            "1.0.5",
            "FULLRELEASE1.1.10_2",
            "vv2",
            "3a.4",
            "Final",
        ] {
            let (core, _) = pv(input);
            assert!(
                !core.chars().any(char::is_alphabetic),
                "core {core:?} of {input:?} contains letters"
            );
        }
    }

    #[test]
    fn test_extract_year() {
        assert_eq!(extract_year(Some("2024-05-13")), "2024");
        assert_eq!(extract_year(Some("2025-11-03")), "2025");
        assert_eq!(extract_year(Some("20230102")), "2023");
        assert_eq!(extract_year(Some("2022-03-04T10:20:30")), "2022");
        assert_eq!(extract_year(Some("2021-06-07 08:09")), "2021");
        assert_eq!(extract_year(Some("2020-01-01T00:00:00+02:00")), "2020");
        assert_eq!(extract_year(Some("")), "0000");
        assert_eq!(extract_year(Some("someday")), "0000");
        assert_eq!(extract_year(Some("2024-13-01")), "0000");
        assert_eq!(extract_year(None), "0000");
    }

    #[test]
    fn test_generate_filename() {
        assert_eq!(
            generate_filename(
                "EMERALD-ENHANCED", "GBA", "EM", "1961", "11.010", "", "2025", "xdelta"
            ),
            "EMERALD-ENHANCED_GBA_EM-1961_11.010_2025.xdelta"
        );
        assert_eq!(
            generate_filename(
                "BLACK-2-KAIZO", "NDS", "B2", "6149", "0.0", "FULLRELEASE1110_2", "2022", "xdelta"
            ),
            "BLACK-2-KAIZO_NDS_B2-6149_0.0FULLRELEASE1110_2_2022.xdelta"
        );
    }

    #[test]
    fn test_crc_from_filename() {
        let name = "FIRE-RED-PLUS_GBA_FR-84EE_1.0_2020.bps";
        assert_eq!(crc_from_filename(name, "FR"), Some("84EE"));
        assert_eq!(crc_from_filename(name, "EM"), None);
        assert_eq!(crc_from_filename("fire red plus.bps", "FR"), None);
        assert_eq!(crc_from_filename("A_GBA_FR-_1.0_2020.bps", "FR"), None);
    }
}
