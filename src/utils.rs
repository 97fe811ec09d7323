use base64::{engine::general_purpose, Engine as _};
use itertools::Itertools;

pub const FALLBACK_MIME: &str = "application/octet-stream";

/// Entity-escape the five XML special characters. Every piece of text that
/// ends up inside the hand-built SVG markup goes through here.
pub fn escape_xml(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

pub fn encode_data_uri(mime: &str, bytes: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        mime,
        general_purpose::STANDARD.encode(bytes)
    )
}

/// `content-type` header value without its parameters, e.g.
/// `image/png; charset=binary` => `image/png`.
pub fn essence(content_type: &str) -> Option<&str> {
    content_type
        .split(';')
        .next()
        .map(str::trim)
        .filter(|mime| !mime.is_empty())
}

pub fn group_thousands(num: u64) -> String {
    let digits = num.to_string();
    digits
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|chunk| std::str::from_utf8(chunk).unwrap_or_default())
        .join(",")
}
