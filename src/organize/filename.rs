//! Preview filename grammar
//!
//! Preview pages are named `<prefix>_<Instrument>_<Part>_<NNN>.png`:
//!
//! * tokens are separated by `_`
//! * `<Part>` is a single uppercase letter or `All`; the token right
//!   before it is the instrument (letters, digits and `-`)
//! * the last token of the stem is the zero-padded page number
//!
//! e.g. `way-maker_Flute_All_001.png` is page 1 of `Flute`. The prefix is
//! optional.

use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

/// File extension of saved preview pages
pub const PAGE_EXTENSION: &str = "png";

/// Instrument used when a filename doesn't carry one
pub const UNKNOWN_INSTRUMENT: &str = "unknown-instrument";

/// `<Instrument>_<Part>_` where `<Part>` is one uppercase letter or `All`;
/// the first match in the stem wins
static INSTRUMENT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|_)([A-Za-z0-9-]+)_(?:[A-Z]|All)_").expect("valid instrument pattern")
});

/// Trailing `_<digits>` of the stem
static PAGE_NUMBER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_([0-9]+)$").expect("valid page number pattern"));

fn stem(file_name: &str) -> &str {
    file_name
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(file_name)
}

/// Page number from the trailing numeric token, e.g. `001` -> 1
pub fn page_number(file_name: &str) -> Option<u32> {
    PAGE_NUMBER_PATTERN
        .captures(stem(file_name))
        .and_then(|captures| captures[1].parse().ok())
}

/// Instrument named in the filename, if the grammar matches
pub fn instrument_name(file_name: &str) -> Option<&str> {
    INSTRUMENT_PATTERN
        .captures(stem(file_name))
        .and_then(|captures| captures.get(1))
        .map(|instrument| instrument.as_str())
}

/// Instrument for a filename, falling back to `unknown-instrument`
pub fn instrument_or_unknown(file_name: &str) -> String {
    instrument_name(file_name)
        .unwrap_or(UNKNOWN_INSTRUMENT)
        .to_string()
}

/// Whether a path looks like a saved preview page
pub fn is_page_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(PAGE_EXTENSION))
        .unwrap_or(false)
}
