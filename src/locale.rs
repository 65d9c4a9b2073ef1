//! Culture codes and culture detection from locale file paths.

use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

/// RFC 5646 culture codes, in both original and normalized form.
/// Based on <http://tools.ietf.org/html/rfc5646>
static CULTURE_CODES: LazyLock<HashSet<String>> = LazyLock::new(|| {
    [
        "af", "af-ZA", "ar", "ar-AE", "ar-BH", "ar-DZ", "ar-EG", "ar-IQ", "ar-JO", "ar-KW", "ar-LB",
        "ar-LY", "ar-MA", "ar-OM", "ar-QA", "ar-SA", "ar-SY", "ar-TN", "ar-YE", "az", "az-AZ",
        "az-Cyrl-AZ", "be", "be-BY", "bg", "bg-BG", "bs-BA", "ca", "ca-ES", "cs", "cs-CZ", "cy",
        "cy-GB", "da", "da-DK", "de", "de-AT", "de-CH", "de-DE", "de-LI", "de-LU", "dv", "dv-MV",
        "el", "el-GR", "en", "en-AU", "en-BZ", "en-CA", "en-CB", "en-GB", "en-IE", "en-JM", "en-NZ",
        "en-PH", "en-TT", "en-US", "en-ZA", "en-ZW", "eo", "es", "es-AR", "es-BO", "es-CL", "es-CO",
        "es-CR", "es-DO", "es-EC", "es-ES", "es-GT", "es-HN", "es-MX", "es-NI", "es-PA", "es-PE",
        "es-PR", "es-PY", "es-SV", "es-UY", "es-VE", "et", "et-EE", "eu", "eu-ES", "fa", "fa-IR",
        "fi", "fi-FI", "fo", "fo-FO", "fr", "fr-BE", "fr-CA", "fr-CH", "fr-FR", "fr-LU", "fr-MC",
        "gl", "gl-ES", "gu", "gu-IN", "he", "he-IL", "hi", "hi-IN", "hr", "hr-BA", "hr-HR", "hu",
        "hu-HU", "hy", "hy-AM", "id", "id-ID", "is", "is-IS", "it", "it-CH", "it-IT", "ja", "ja-JP",
        "ka", "ka-GE", "kk", "kk-KZ", "kn", "kn-IN", "ko", "ko-KR", "kok", "kok-IN", "ky", "ky-KG",
        "lt", "lt-LT", "lv", "lv-LV", "mi", "mi-NZ", "mk", "mk-MK", "mn", "mn-MN", "mr", "mr-IN",
        "ms", "ms-BN", "ms-MY", "mt", "mt-MT", "nb", "nb-NO", "nl", "nl-BE", "nl-NL", "nn-NO", "ns",
        "ns-ZA", "pa", "pa-IN", "pl", "pl-PL", "ps", "ps-AR", "pt", "pt-BR", "pt-PT", "qu", "qu-BO",
        "qu-EC", "qu-PE", "ro", "ro-RO", "ru", "ru-RU", "sa", "sa-IN", "se", "se-FI", "se-NO",
        "se-SE", "sk", "sk-SK", "sl", "sl-SI", "sq", "sq-AL", "sr-BA", "sr-Cyrl-BA", "sr-SP",
        "sr-Cyrl-SP", "sv", "sv-FI", "sv-SE", "sw", "sw-KE", "syr", "syr-SY", "ta", "ta-IN", "te",
        "te-IN", "th", "th-TH", "tl", "tl-PH", "tn", "tn-ZA", "tr", "tr-TR", "tt", "tt-RU", "ts",
        "uk", "uk-UA", "ur", "ur-PK", "uz", "uz-UZ", "uz-Cyrl-UZ", "vi", "vi-VN", "xh", "xh-ZA",
        "zh", "zh-CN", "zh-HK", "zh-MO", "zh-SG", "zh-TW", "zu", "zu-ZA", "zh-Hans", "zh-Hant",
        "sr-Latn", "sr-Cyrl", "pt-AO", "es-419", "fil", "ga", "ga-IE", "km", "lo", "my", "ne", "si",
        "am",
    ]
    .iter()
    .flat_map(|code| {
        let code = (*code).to_string();
        let normalized = normalize_culture_code(&code);
        [code, normalized]
    })
    .collect()
});

/// Normalize culture code (lowercase and replace - with _)
#[must_use]
pub fn normalize_culture_code(code: &str) -> String {
    code.to_lowercase().replace('-', "_")
}

/// Returns true if `code` is a known culture code in original or normalized form.
#[must_use]
pub fn is_known_culture(code: &str) -> bool {
    CULTURE_CODES.contains(code) || CULTURE_CODES.contains(&normalize_culture_code(code))
}

/// Detect culture from a locale file path.
///
/// Splits the path by '/' and '.', then searches backwards for a part
/// that is a known culture code.
///
/// # Examples
/// - `locales/en.json` → `en`
/// - `messages/ja-JP.json` → `ja-JP`
/// - `translations/en_US/common.json` → `en_US`
#[must_use]
pub fn detect_culture_from_path(file_path: &Path) -> Option<String> {
    let path_str = file_path.to_string_lossy();

    path_str
        .split(['/', '\\', '.'])
        .rev()
        .find(|part| !part.is_empty() && is_known_culture(part))
        .map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("/path/to/locales/en/common.json", Some("en"))]
    #[case("/path/to/locales/fr.json", Some("fr"))]
    #[case("/path/to/locales/zh-Hans.json", Some("zh-Hans"))]
    #[case("/path/to/locales/hoge/common.json", None)]
    #[case("/path/to/locales/en-trans.json", None)] // Hyphenated, not separated
    #[case("/path/to/locales/en_us/strings.json", Some("en_us"))]
    #[case("/path/to/Strings.it.json", Some("it"))]
    // When multiple culture names are included, the last match is returned
    #[case("/path/to/locales/en/ja.json", Some("ja"))]
    fn test_detect_culture_from_path(#[case] path: &str, #[case] expected: Option<&str>) {
        let result = detect_culture_from_path(Path::new(path));
        assert_eq!(result.as_deref(), expected);
    }

    #[rstest]
    #[case("en", true)]
    #[case("en-US", true)]
    #[case("EN_us", true)]
    #[case("zh-Hans", true)]
    #[case("klingon", false)]
    #[case("", false)]
    fn test_is_known_culture(#[case] code: &str, #[case] expected: bool) {
        assert_eq!(is_known_culture(code), expected);
    }
}
