/// Formats a countdown as MM:SS, clamping negative values to zero.
pub fn format_clock(secs: f64) -> String {
    let whole = secs.max(0.0) as u64;
    format!("{:02}:{:02}", whole / 60, whole % 60)
}

/// Reduces a subject id to a filename-safe token.
pub fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() {
        String::from("subject")
    } else {
        cleaned
    }
}
