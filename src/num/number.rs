use itoa::Buffer as ItoaBuffer;
use ryu::Buffer as RyuBuffer;
use serde_json::Number;

/// Shortest decimal text that round-trips `n`, never in exponent form.
pub fn format_json_number(n: &Number) -> String {
    let mut out = String::new();
    write_canonical_number_into(n, &mut out);
    out
}

pub(crate) fn write_canonical_number_into(n: &Number, out: &mut String) {
    if let Some(u) = n.as_u64() {
        out.push_str(ItoaBuffer::new().format(u));
    } else if let Some(i) = n.as_i64() {
        out.push_str(ItoaBuffer::new().format(i));
    } else if let Some(f) = n.as_f64() {
        write_f64_canonical_into(f, out);
    }
}

fn write_f64_canonical_into(f: f64, out: &mut String) {
    if !f.is_finite() {
        out.push('0');
        return;
    }

    let mut buf = RyuBuffer::new();
    let formatted = buf.format_finite(f);

    // ryu switches to exponent form outside ~1e-5..1e16; Display never does
    // and is still the shortest round-trip representation.
    if formatted.contains('e') || formatted.contains('E') {
        out.push_str(&f.to_string());
    } else {
        push_trimmed_decimal(formatted, out);
    }
}

fn push_trimmed_decimal(s: &str, out: &mut String) {
    if let Some((int_part, frac_part)) = s.split_once('.') {
        let trimmed = frac_part.trim_end_matches('0');
        out.push_str(int_part);
        if !trimmed.is_empty() {
            out.push('.');
            out.push_str(trimmed);
        }
    } else {
        out.push_str(s);
    }
}
