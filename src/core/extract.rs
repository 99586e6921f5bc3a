//! Cell text extraction: cargo quantities, prices and distances

use crate::error::{EnhanceError, EnhanceResult};
use crate::types::CargoDescriptor;
use regex::Regex;
use std::sync::OnceLock;

const WEIGHT_MARKER: &str = "kg";

// ASCII digits only: `f64::from_str` rejects any other script.

fn weight_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([0-9]+)kg").expect("weight pattern is valid"))
}

fn count_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([0-9]+) .*").expect("count pattern is valid"))
}

fn float_prefix_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[+-]?(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?")
            .expect("float prefix pattern is valid")
    })
}

/// Quantity token of a cargo cell.
///
/// `"300kg Passengers"` gives `"300"`, `"12 Crates of fish"` gives `"12"`,
/// text with neither gives `None`. A `kg` marker without a number right
/// before it is an error.
pub fn extract_quantity(text: &str) -> EnhanceResult<Option<String>> {
    if text.contains(WEIGHT_MARKER) {
        return weight_regex()
            .captures(text)
            .map(|caps| Some(caps[1].to_string()))
            .ok_or_else(|| {
                EnhanceError::Extraction(format!("no weight before 'kg' in {text:?}"))
            });
    }
    Ok(count_regex().captures(text).map(|caps| caps[1].to_string()))
}

/// True when the cargo cell describes a passenger load by weight
pub fn extract_cargo(text: &str) -> bool {
    text.contains(WEIGHT_MARKER)
}

/// Classify a cargo cell
pub fn parse_cargo(text: &str) -> EnhanceResult<CargoDescriptor> {
    let quantity = extract_quantity(text)?;
    let value = quantity.as_deref().map(parse_float);
    Ok(match (extract_cargo(text), value) {
        (true, Some(kg)) => CargoDescriptor::Weight(kg),
        (false, Some(n)) => CargoDescriptor::Count(n),
        (_, None) => CargoDescriptor::Absent,
    })
}

/// Parse a currency string such as `"$1,234.50"`.
///
/// Only the first `$` and the first `,` are removed, so `"$1,234,567"` reads
/// as 1234. Negative amounts are not expected on the site.
pub fn get_price(text: &str) -> f64 {
    let without_symbol = text.replacen('$', "", 1);
    parse_float(&without_symbol.replacen(',', "", 1))
}

/// Distance cell value (`NaN` when the cell holds no number)
pub fn parse_range(text: &str) -> f64 {
    parse_float(text)
}

/// Longest leading decimal number after leading whitespace, `NaN` if there is none
pub fn parse_float(text: &str) -> f64 {
    let trimmed = text.trim_start();
    float_prefix_regex()
        .find(trimmed)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(f64::NAN)
}
