//! Textual extraction of fenced blocks and the scene entry point from model
//! output. These are deliberately small scans over the supported shapes, not
//! a parser for the generated language.

const FENCE: &str = "```";

/// Marker that begins real generated code; anything the model emits before it
/// (prose, stray backticks) is discarded.
pub const IMPORT_MARKER: &str = "from manim import";

/// Returns the trimmed interior of the first fence opened with the given tag
/// (e.g. "python", "json"). An opening fence with no closing fence after it
/// is treated as not found rather than returning an unterminated block.
pub fn fenced_block<'a>(text: &'a str, tag: &str) -> Option<&'a str> {
    let open = format!("{FENCE}{tag}");
    let body_start = text.find(&open)? + open.len();
    let body_len = text[body_start..].find(FENCE)?;
    Some(text[body_start..body_start + body_len].trim())
}

/// Drops everything before the first [`IMPORT_MARKER`]. Code without the
/// marker is returned unmodified.
pub fn strip_preamble(code: &str) -> &str {
    match code.find(IMPORT_MARKER) {
        Some(idx) => &code[idx..],
        None => code,
    }
}

/// Finds the name of the first `class <Name>(Scene):` in the code, which the
/// renderer needs as its entry point. Single-line headers with the literal
/// `Scene` base only; multi-line headers and import aliases for the base
/// class are not recognized.
pub fn scene_class_name(code: &str) -> Option<&str> {
    let mut offset = 0;
    while let Some(rel) = code[offset..].find("class") {
        let after_kw = offset + rel + "class".len();
        offset = after_kw;
        let rest = &code[after_kw..];
        let name = rest.trim_start();
        if name.len() == rest.len() {
            // "class" ran straight into another token ("classes", "classX").
            continue;
        }
        let name_len = name
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(name.len());
        if name_len == 0 {
            continue;
        }
        if name[name_len..].starts_with("(Scene):") {
            return Some(&name[..name_len]);
        }
    }
    None
}
