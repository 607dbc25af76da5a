//! Location text helpers: stray `NULL` cleanup and a US-location heuristic.

use once_cell::sync::Lazy;
use regex::Regex;

const US_STATE_NAMES: &[&str] = &[
    "ALABAMA", "ALASKA", "ARIZONA", "ARKANSAS", "CALIFORNIA", "COLORADO", "CONNECTICUT",
    "DELAWARE", "FLORIDA", "GEORGIA", "HAWAII", "IDAHO", "ILLINOIS", "INDIANA", "IOWA",
    "KANSAS", "KENTUCKY", "LOUISIANA", "MAINE", "MARYLAND", "MASSACHUSETTS", "MICHIGAN",
    "MINNESOTA", "MISSISSIPPI", "MISSOURI", "MONTANA", "NEBRASKA", "NEVADA", "NEW HAMPSHIRE",
    "NEW JERSEY", "NEW MEXICO", "NEW YORK", "NORTH CAROLINA", "NORTH DAKOTA", "OHIO",
    "OKLAHOMA", "OREGON", "PENNSYLVANIA", "RHODE ISLAND", "SOUTH CAROLINA", "SOUTH DAKOTA",
    "TENNESSEE", "TEXAS", "UTAH", "VERMONT", "VIRGINIA", "WASHINGTON", "WEST VIRGINIA",
    "WISCONSIN", "WYOMING",
];

const FOREIGN_COUNTRIES: &[&str] = &[
    "CANADA", "MEXICO", "UNITED KINGDOM", "UK", "ENGLAND", "SCOTLAND", "WALES", "IRELAND",
    "GERMANY", "FRANCE", "SPAIN", "ITALY", "NETHERLANDS", "BELGIUM", "SWITZERLAND", "SWEDEN",
    "NORWAY", "DENMARK", "FINLAND", "POLAND", "PORTUGAL", "AUSTRIA", "CZECH REPUBLIC",
    "HUNGARY", "ROMANIA", "GREECE", "UKRAINE", "RUSSIA", "TURKEY", "ISRAEL", "EGYPT",
    "NIGERIA", "KENYA", "SOUTH AFRICA", "UAE", "UNITED ARAB EMIRATES", "SAUDI ARABIA", "QATAR",
    "INDIA", "PAKISTAN", "BANGLADESH", "SRI LANKA", "CHINA", "HONG KONG", "TAIWAN", "JAPAN",
    "KOREA", "SOUTH KOREA", "SINGAPORE", "MALAYSIA", "INDONESIA", "THAILAND", "VIETNAM",
    "PHILIPPINES", "AUSTRALIA", "NEW ZEALAND", "BRAZIL", "ARGENTINA", "CHILE", "COLOMBIA",
    "PERU", "COSTA RICA",
];

static NULL_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*,\s*NULL\b").expect("valid regex"));
static US_COUNTRY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:USA|UNITED STATES(?: OF AMERICA)?)\b|\bU\.S\.(?:A\.?)?|(?:^|,)\s*US\s*$")
        .expect("valid regex")
});
static FOREIGN_COUNTRY: Lazy<Regex> = Lazy::new(|| {
    let alternation = FOREIGN_COUNTRIES
        .iter()
        .map(|c| regex::escape(c))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"\b(?:{alternation})\b")).expect("valid regex")
});

/// Removes `", NULL"` fragments left behind when an LLM filled a missing
/// state/province with the sentinel, e.g. `"Paris, NULL"` → `"Paris"`.
pub fn strip_null_tokens(location: &str) -> String {
    NULL_TOKEN.replace_all(location, "").trim().to_string()
}

/// Heuristic: does this location text describe a place in the United States?
///
/// True for an explicit US country token or a full state name as one of the
/// comma-separated parts. Otherwise any recognizable foreign country makes it
/// false, and whatever is left counts as US, two-letter state codes included.
/// A code never outranks a country: `"Berlin, DE, Germany"` is not Delaware.
/// Empty and `NULL` are false.
pub fn is_us_location(location: &str) -> bool {
    let upper = location.trim().to_uppercase();
    if upper.is_empty() || upper == "NULL" {
        return false;
    }

    if US_COUNTRY.is_match(&upper) {
        return true;
    }

    // Checked before the country table so "New Mexico" is not Mexico.
    if upper
        .split(',')
        .map(str::trim)
        .any(|part| US_STATE_NAMES.contains(&part))
    {
        return true;
    }

    !FOREIGN_COUNTRY.is_match(&upper)
}
