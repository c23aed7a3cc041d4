use std::sync::OnceLock;

use regex::Regex;

fn nbsp_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)&nbsp;").expect("valid pattern"))
}

fn entity_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)&[a-z]+;").expect("valid pattern"))
}

fn line_break_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<br\s*/?>").expect("valid pattern"))
}

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("valid pattern"))
}

fn space_run_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Whitespace runs excluding newline, which line-break tags inject.
    RE.get_or_init(|| Regex::new(r"[^\S\n]+").expect("valid pattern"))
}

fn newline_trim_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[ \t]*\n[ \t]*").expect("valid pattern"))
}

/// Strip markup and entities from rich-text cell content.
///
/// In order: `&nbsp;` becomes a space, any other named entity becomes a space,
/// `<br>` variants become a literal newline, all remaining tags become spaces,
/// whitespace runs (other than newlines) collapse to one space, spaces around
/// newlines are trimmed, and the ends are trimmed. Total: any input, including
/// empty, yields a plain string.
pub fn sanitize(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    let s = nbsp_re().replace_all(raw, " ");
    let s = entity_re().replace_all(&s, " ");
    let s = line_break_re().replace_all(&s, "\n");
    let s = tag_re().replace_all(&s, " ");
    let s = space_run_re().replace_all(&s, " ");
    let s = newline_trim_re().replace_all(&s, "\n");
    s.trim().to_string()
}
