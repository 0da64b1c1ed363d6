/// Sanitize recognized text before normalization.
/// Strips control characters, unifies line endings, trims line ends.
/// Blank lines are kept so line-anchored patterns still see the layout.
pub fn sanitize_ocr_text(raw: &str) -> String {
    raw.replace("\r\n", "\n")
        .replace('\r', "\n")
        .chars()
        .filter(|c| !c.is_control() || matches!(c, '\n' | '\t'))
        .collect::<String>()
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
}
