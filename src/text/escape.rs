use memchr::memchr3;

/// Appends `value` to `out` with `&`, `<` and `>` replaced by entities.
pub fn escape_text_into(out: &mut String, value: &str) {
    let bytes = value.as_bytes();
    let mut start = 0;
    while let Some(offset) = memchr3(b'&', b'<', b'>', &bytes[start..]) {
        let idx = start + offset;
        out.push_str(&value[start..idx]);
        out.push_str(match bytes[idx] {
            b'&' => "&amp;",
            b'<' => "&lt;",
            _ => "&gt;",
        });
        start = idx + 1;
    }
    out.push_str(&value[start..]);
}

pub fn needs_escape(value: &str) -> bool {
    value.bytes().any(crate::constants::is_markup_reserved)
}
