//! Numeric and line formatting shared by the emitters.

/// Fixed 4-decimal float, as used by every DirectX list.
pub fn fixed4(v: f64) -> String {
    format!("{:.4}", v)
}

/// DirectX vector entry: `x;y;z;`.
pub fn vec3_entry(v: [f64; 3]) -> String {
    format!("{};{};{};", fixed4(v[0]), fixed4(v[1]), fixed4(v[2]))
}

/// DirectX texture coordinate entry: `u;v;`.
pub fn uv_entry(uv: [f64; 2]) -> String {
    format!("{};{};", fixed4(uv[0]), fixed4(uv[1]))
}

/// Java float literal body: width 9, 5 decimals.
pub fn java_float(v: f64) -> String {
    format!("{:9.5}", v)
}

/// Shortest round-trip float text with a mandatory fractional part and a
/// signed two-digit exponent, e.g. `1.0`, `0.5`, `1.0e-05`.
pub fn shortest_float(v: f64) -> String {
    let text = format!("{:?}", v);
    let Some((mantissa, exponent)) = text.split_once('e') else {
        return text;
    };
    let mantissa = if mantissa.contains('.') {
        mantissa.to_string()
    } else {
        format!("{}.0", mantissa)
    };
    let (sign, digits) = match exponent.strip_prefix('-') {
        Some(digits) => ('-', digits),
        None => ('+', exponent),
    };
    format!("{}e{}{:0>2}", mantissa, sign, digits)
}

/// Append a chunk as a whole line: a newline is added unless the chunk
/// already ends with one. An empty chunk becomes a blank line.
pub fn put_line(out: &mut String, chunk: &str) {
    out.push_str(chunk);
    if !chunk.ends_with('\n') {
        out.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_precision() {
        assert_eq!(fixed4(1.5), "1.5000");
        assert_eq!(fixed4(-0.5), "-0.5000");
        assert_eq!(vec3_entry([-2.0, 3.0, 1.0]), "-2.0000;3.0000;1.0000;");
        assert_eq!(uv_entry([1.5, -0.5]), "1.5000;-0.5000;");
    }

    #[test]
    fn test_java_float_width() {
        assert_eq!(java_float(3.27394), "  3.27394");
        assert_eq!(java_float(-0.79922), " -0.79922");
        assert_eq!(java_float(32.22387), " 32.22387");
        assert_eq!(java_float(-12.81492), "-12.81492");
    }

    #[test]
    fn test_shortest_float() {
        assert_eq!(shortest_float(1.0), "1.0");
        assert_eq!(shortest_float(0.5), "0.5");
        assert_eq!(shortest_float(0.0), "0.0");
        assert_eq!(shortest_float(51.0 / 255.0), "0.2");
        assert_eq!(shortest_float(0.00001), "1.0e-05");
        assert_eq!(shortest_float(1.5e20), "1.5e+20");
    }

    #[test]
    fn test_put_line() {
        let mut out = String::new();
        put_line(&mut out, "a");
        put_line(&mut out, "b\n");
        put_line(&mut out, "");
        put_line(&mut out, "}");
        assert_eq!(out, "a\nb\n\n}\n");
    }
}
