// Code-fence language detection.
//
// Character-frequency vote between XML, Java, and Kotlin — the languages
// that appear in the source codelabs. Anything inconclusive falls back to
// the caller-supplied default, so detection never fails.

/// Guess the fence language for a code block. Returns `fallback` when no
/// heuristic is confident enough.
pub fn detect(code: &str, fallback: &str) -> String {
    let count = |needles: &[&str]| -> usize {
        needles.iter().map(|needle| code.matches(needle).count()).sum()
    };

    let xml = count(&["<", ">", "/", "\""]);
    let java_kotlin = count(&["(", ")", "{", "}", "."]);
    let java = count(&[";", "@"]);
    let kotlin = count(&["?", "!", ":"]);

    if xml > java_kotlin {
        if xml >= 4 {
            return "xml".to_string();
        }
    } else if java > kotlin {
        if java >= 3 {
            return "java".to_string();
        }
    } else if kotlin >= 3 {
        return "kotlin".to_string();
    }

    fallback.to_string()
}
