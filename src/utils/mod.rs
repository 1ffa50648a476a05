use regex::Regex;
use std::sync::LazyLock;

/// Everything outside letters, digits, Latin script, `.`, `-`, `_`, whitespace and `#`.
static INVALID_PATH_CHARACTERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}\p{Latin}._\s#-]").unwrap());

static SEQUENCE_NUMBER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"https?://delivery\.tekpub\.com/.+[^/]+/([0-9]+)/hd/file\.mp4\?token=[A-Za-z0-9_]+",
    )
    .unwrap()
});

static WHITESPACE_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Turn arbitrary text into a single, safe path segment.
///
/// The text is trimmed, lexically normalized (empty, `.` and `..` components are
/// resolved) and stripped of every disallowed character. The result may be empty.
pub fn clean_path(raw: &str) -> String {
    let normalized = normalize_components(raw.trim());
    let stripped = INVALID_PATH_CHARACTERS.replace_all(&normalized, "");
    let cleaned = stripped.trim();

    // a bare dot segment would address the parent folder itself
    if cleaned == "." || cleaned == ".." {
        return String::new();
    }

    cleaned.to_string()
}

/// Lexical path cleaning on `/` and `\` separated text.
///
/// `..` never climbs above the start of the text, so the result stays relative.
fn normalize_components(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();

    for part in path.split(['/', '\\']) {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            _ => parts.push(part),
        }
    }

    parts.join("/")
}

/// Replace every run of whitespace with a single hyphen.
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_PATTERN.replace_all(text, "-").into_owned()
}

/// Extract the episode number from a delivery download link,
/// e.g. `.../77/hd/file.mp4?token=abc123` yields `Some(77)`.
pub fn extract_sequence_number(link: &str) -> Option<u64> {
    let caps = SEQUENCE_NUMBER_PATTERN.captures(link)?;
    caps.get(1)?.as_str().parse().ok()
}
