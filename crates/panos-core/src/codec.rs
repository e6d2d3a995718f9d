// ── Field codec ──
//
// Handlers take list-valued fields as one comma-separated string. This
// module is the only place that format is parsed or produced; everything
// past it works on ordered `Vec<String>`s.

/// Split a comma-separated argument into trimmed members.
///
/// Empty segments are kept (`"a,,b"` gives three members) so the device
/// reports them instead of them vanishing locally.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',').map(|s| s.trim().to_owned()).collect()
}

/// [`split_list`] over an optional argument.
pub fn split_optional(raw: Option<&str>) -> Option<Vec<String>> {
    raw.map(split_list)
}

/// The inverse of [`split_list`] for trimmed members.
pub fn join_list(values: &[String]) -> String {
    values.join(",")
}

/// Render members for display: `['trust', 'dmz']`, stored order,
/// nothing sorted or removed.
pub fn render_list(values: &[String]) -> String {
    let items: Vec<String> = values.iter().map(|v| quote(v)).collect();
    format!("[{}]", items.join(", "))
}

fn quote(value: &str) -> String {
    if value.contains('\'') && !value.contains('"') {
        return format!("\"{}\"", value.replace('\\', "\\\\"));
    }
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}
