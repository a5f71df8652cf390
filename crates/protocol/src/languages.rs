//! Language catalogue: source languages, translation directions and
//! display names.

use std::collections::BTreeMap;

/// Source languages the service recognizes, with display names.
pub const SOURCE_LANGUAGES: &[(&str, &str)] = &[
    ("zh", "Chinese"),
    ("en", "English"),
    ("ja", "Japanese"),
    ("yue", "Cantonese"),
    ("ko", "Korean"),
    ("de", "German"),
    ("fr", "French"),
    ("ru", "Russian"),
    ("it", "Italian"),
    ("es", "Spanish"),
];

/// Minimal source list used when the server's list cannot be fetched.
pub const FALLBACK_SOURCE_LANGUAGES: &[(&str, &str)] = &[
    ("zh", "Chinese"),
    ("en", "English"),
    ("ja", "Japanese"),
    ("yue", "Cantonese"),
    ("ko", "Korean"),
];

/// Supported translation directions: source code → target codes.
const TRANSLATION_DIRECTIONS: &[(&str, &[&str])] = &[
    ("zh", &["en", "ja", "ko"]),
    ("en", &["zh", "ja", "ko"]),
    ("ja", &["zh", "en"]),
    ("yue", &["zh", "en"]),
    ("ko", &["zh", "en"]),
    ("de", &["zh", "en"]),
    ("fr", &["zh", "en"]),
    ("ru", &["zh", "en"]),
    ("it", &["zh", "en"]),
    ("es", &["zh", "en"]),
];

/// Display names for every code that may appear as a translation target.
const DISPLAY_NAMES: &[(&str, &str)] = &[
    ("zh", "Chinese"),
    ("en", "English"),
    ("ja", "Japanese"),
    ("ko", "Korean"),
    ("fr", "French"),
    ("de", "German"),
    ("es", "Spanish"),
    ("it", "Italian"),
    ("ru", "Russian"),
    ("pt", "Portuguese"),
    ("ar", "Arabic"),
    ("hi", "Hindi"),
    ("th", "Thai"),
    ("vi", "Vietnamese"),
    ("yue", "Cantonese"),
];

/// Target languages selectable for `source`. Empty for unknown sources.
pub fn supported_targets(source: &str) -> &'static [&'static str] {
    TRANSLATION_DIRECTIONS
        .iter()
        .find(|(src, _)| *src == source)
        .map(|(_, targets)| *targets)
        .unwrap_or(&[])
}

/// Returns `true` if `source` → `target` is a supported direction.
pub fn is_supported_direction(source: &str, target: &str) -> bool {
    supported_targets(source).contains(&target)
}

/// Human-readable name for a language code; the code itself if unknown.
pub fn display_name(code: &str) -> &str {
    DISPLAY_NAMES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
        .unwrap_or(code)
}

/// The fallback source list as an owned map.
pub fn fallback_languages() -> BTreeMap<String, String> {
    FALLBACK_SOURCE_LANGUAGES
        .iter()
        .map(|(code, name)| (code.to_string(), name.to_string()))
        .collect()
}
