// src/services/document/escape.rs

// Dois contextos, duas regras. Texto livre que entra no HTML passa por
// `escape_html`; texto que vira literal de string dentro de <script> passa
// por `escape_js_string`. Um atributo com código (onclick="...") precisaria
// das duas, nessa ordem: primeiro JS, depois HTML.

/// Escapa os sete caracteres que quebram marcação: `& < > " ' \n \r`.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + raw.len() / 8);
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            other => out.push(other),
        }
    }
    out
}

/// Conteúdo de um literal JS delimitado por aspas duplas (ou simples, ou crase).
/// `</` vira `<\/` para não fechar o <script> no meio da string.
pub fn escape_js_string(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 8);
    let mut prev = '\0';
    for c in raw.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\'' => out.push_str("\\'"),
            '`' => out.push_str("\\`"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            '/' if prev == '<' => out.push_str("\\/"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            other => out.push(other),
        }
        prev = c;
    }
    out
}

/// Literal JS completo, com as aspas.
pub fn js_string(raw: &str) -> String {
    format!("\"{}\"", escape_js_string(raw))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use proptest::prelude::*;

    // Decodifica exatamente as entidades que `escape_html` produz,
    // como o navegador faz ao ler o texto de volta.
    pub(crate) fn unescape_html(escaped: &str) -> String {
        let mut out = String::with_capacity(escaped.len());
        let mut rest = escaped;
        while let Some(pos) = rest.find('&') {
            out.push_str(&rest[..pos]);
            rest = &rest[pos..];
            let Some(end) = rest.find(';') else {
                out.push_str(rest);
                return out;
            };
            let entity = &rest[..=end];
            let decoded = match entity {
                "&amp;" => Some('&'),
                "&lt;" => Some('<'),
                "&gt;" => Some('>'),
                "&quot;" => Some('"'),
                "&#39;" => Some('\''),
                "&#10;" => Some('\n'),
                "&#13;" => Some('\r'),
                _ => None,
            };
            match decoded {
                Some(c) => {
                    out.push(c);
                    rest = &rest[end + 1..];
                }
                None => {
                    out.push('&');
                    rest = &rest[1..];
                }
            }
        }
        out.push_str(rest);
        out
    }

    #[test]
    fn escapes_all_seven_characters() {
        let raw = "a & b < c > d \" e ' f \n g \r h";
        let escaped = escape_html(raw);
        assert_eq!(
            escaped,
            "a &amp; b &lt; c &gt; d &quot; e &#39; f &#10; g &#13; h"
        );
        assert_eq!(unescape_html(&escaped), raw);
    }

    #[test]
    fn already_escaped_text_is_escaped_again() {
        assert_eq!(escape_html("&amp;"), "&amp;amp;");
        assert_eq!(unescape_html("&amp;amp;"), "&amp;");
    }

    #[test]
    fn js_escaping_keeps_script_block_closed() {
        let raw = "O'Brien \"X\"\n</script><script>alert(1)</script>";
        let escaped = escape_js_string(raw);
        assert!(!escaped.contains("</script>"));
        assert!(!escaped.contains('\n'));
        assert_eq!(
            escaped,
            "O\\'Brien \\\"X\\\"\\n<\\/script><script>alert(1)<\\/script>"
        );
    }

    #[test]
    fn js_escaping_handles_backslash_and_separators() {
        assert_eq!(escape_js_string("C:\\temp"), "C:\\\\temp");
        assert_eq!(escape_js_string("a\u{2028}b"), "a\\u2028b");
        assert_eq!(escape_js_string("tab\there"), "tab\\there");
        assert_eq!(escape_js_string("\u{0}"), "\\u0000");
        assert_eq!(js_string("`x`"), "\"\\`x\\`\"");
    }

    proptest! {
        #[test]
        fn html_escaping_round_trips(
            prefix in ".*",
            suffix in ".*",
        ) {
            let raw = format!("{prefix}&<>\"'\n\r{suffix}");
            let escaped = escape_html(&raw);
            prop_assert!(!escaped.contains(['<', '>', '"', '\'', '\n', '\r']));
            prop_assert_eq!(unescape_html(&escaped), raw);
        }

        #[test]
        fn js_escaped_text_has_no_raw_breakers(raw in ".*") {
            let escaped = escape_js_string(&raw);
            let has_breaker = escaped.contains(['\n', '\r', '\u{2028}', '\u{2029}']);
            prop_assert!(!has_breaker);
            prop_assert!(!escaped.contains("</"));
        }
    }
}
