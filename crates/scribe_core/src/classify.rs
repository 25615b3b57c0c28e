/// Display severity of a single console line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Severity {
    Error,
    Warning,
    Info,
    #[default]
    Normal,
}

/// Classify a raw log line by case-insensitive keyword lookup.
///
/// Precedence is error ("error", "exception") over warning ("warning", "warn")
/// over info ("info"). Anything else is `Normal`.
pub fn classify(line: &str) -> Severity {
    let lowered = line.to_lowercase();
    if lowered.contains("error") || lowered.contains("exception") {
        Severity::Error
    } else if lowered.contains("warn") {
        // "warn" also covers "warning".
        Severity::Warning
    } else if lowered.contains("info") {
        Severity::Info
    } else {
        Severity::Normal
    }
}
