//! Lightweight code markup handling for message content
//!
//! Model replies mark code with triple-backtick fences and single-backtick
//! inline spans. [`tokenize`] splits content into plain text and code
//! segments once; the display, clipboard and speech helpers are folds over
//! that segment list.

use regex::Regex;
use std::sync::OnceLock;

/// Spoken in place of a fenced code block
pub const SPEECH_CODE_PLACEHOLDER: &str = "Code block omitted in speech";

const FENCE: &str = "```";
const TICK: char = '`';

/// A run of message content
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Prose outside any code markup
    Text(&'a str),
    /// Body of a single-backtick span
    InlineCode(&'a str),
    /// Body of a triple-backtick block, fences excluded
    FencedCode(&'a str),
}

impl Segment<'_> {
    pub fn is_code(&self) -> bool {
        !matches!(self, Segment::Text(_))
    }
}

/// Split `input` into text and code segments in document order.
///
/// A fence closes at the next fence; an unclosed fence is literal text. An
/// inline span closes at the next backtick on the same line and must be
/// non-empty, otherwise the backtick is literal text.
pub fn tokenize(input: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut text_start = 0;
    let mut pos = 0;

    // Backticks are ASCII, so every index we stop at is a char boundary.
    while let Some(offset) = input[pos..].find(TICK) {
        let tick = pos + offset;

        if input[tick..].starts_with(FENCE) {
            let body_start = tick + FENCE.len();
            match input[body_start..].find(FENCE) {
                Some(len) => {
                    push_text(&mut segments, &input[text_start..tick]);
                    segments.push(Segment::FencedCode(&input[body_start..body_start + len]));
                    pos = body_start + len + FENCE.len();
                    text_start = pos;
                }
                None => pos = body_start,
            }
            continue;
        }

        let body_start = tick + 1;
        let rest = &input[body_start..];
        let line = &rest[..rest.find('\n').unwrap_or(rest.len())];
        match line.find(TICK) {
            Some(len) if len > 0 => {
                push_text(&mut segments, &input[text_start..tick]);
                segments.push(Segment::InlineCode(&rest[..len]));
                pos = body_start + len + 1;
                text_start = pos;
            }
            _ => pos = body_start,
        }
    }

    push_text(&mut segments, &input[text_start..]);
    segments
}

fn push_text<'a>(segments: &mut Vec<Segment<'a>>, text: &'a str) {
    if !text.is_empty() {
        segments.push(Segment::Text(text));
    }
}

fn bold_pattern() -> &'static Regex {
    static BOLD: OnceLock<Regex> = OnceLock::new();
    BOLD.get_or_init(|| Regex::new(r"\*\*(.*?)\*\*").expect("bold pattern is valid"))
}

fn italic_pattern() -> &'static Regex {
    static ITALIC: OnceLock<Regex> = OnceLock::new();
    ITALIC.get_or_init(|| Regex::new(r"\*(.*?)\*").expect("italic pattern is valid"))
}

fn strip_emphasis(text: &str) -> String {
    let without_bold = bold_pattern().replace_all(text, "$1");
    italic_pattern().replace_all(&without_bold, "$1").into_owned()
}

// Private-use delimiters around the index of a code segment held out of the prose
const SLOT_OPEN: char = '\u{E000}';
const SLOT_CLOSE: char = '\u{E001}';

/// Strip emphasis across the whole message, with every code segment swapped
/// for an opaque slot, then put `render`ed code back into the slots.
///
/// Emphasis may wrap or span code, but markers inside code are never touched.
fn strip_emphasis_around_code(text: &str, render: impl Fn(Segment<'_>) -> String) -> String {
    let mut prose = String::with_capacity(text.len());
    let mut code = Vec::new();

    for segment in tokenize(text) {
        match segment {
            Segment::Text(t) => prose.push_str(t),
            other => {
                prose.push(SLOT_OPEN);
                prose.push_str(&code.len().to_string());
                prose.push(SLOT_CLOSE);
                code.push(render(other));
            }
        }
    }

    if code.is_empty() {
        return strip_emphasis(&prose);
    }
    fill_slots(&strip_emphasis(&prose), &code)
}

fn fill_slots(prose: &str, code: &[String]) -> String {
    let mut out = String::with_capacity(prose.len());
    let mut rest = prose;

    while let Some(open) = rest.find(SLOT_OPEN) {
        out.push_str(&rest[..open]);
        let after = &rest[open + SLOT_OPEN.len_utf8()..];
        let filled = after.find(SLOT_CLOSE).and_then(|close| {
            let index: usize = after[..close].parse().ok()?;
            Some((code.get(index)?, close))
        });

        match filled {
            Some((body, close)) => {
                out.push_str(body);
                rest = &after[close + SLOT_CLOSE.len_utf8()..];
            }
            None => {
                out.push(SLOT_OPEN);
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

/// Remove `**bold**` and `*italic*` markers from prose, leaving code intact
pub fn strip_emphasis_markup(text: &str) -> String {
    strip_emphasis_around_code(text, |segment| match segment {
        Segment::InlineCode(code) => format!("{TICK}{code}{TICK}"),
        Segment::FencedCode(code) => format!("{FENCE}{code}{FENCE}"),
        Segment::Text(t) => t.to_string(),
    })
}

/// Prepare text for the speech engine: no emphasis markers, no code read aloud
pub fn sanitize_for_speech(text: &str) -> String {
    strip_emphasis_around_code(text, |segment| match segment {
        Segment::InlineCode(code) => code.to_string(),
        Segment::FencedCode(_) => SPEECH_CODE_PLACEHOLDER.to_string(),
        Segment::Text(t) => t.to_string(),
    })
}

/// Collect the code in a message for the clipboard.
///
/// Fenced blocks come first, then inline spans, each group in document order,
/// separated by a blank line. Content without code is returned unchanged.
pub fn extract_code(content: &str) -> String {
    let segments = tokenize(content);

    let fenced = segments.iter().filter_map(|segment| match segment {
        Segment::FencedCode(code) => Some(code.trim_start()),
        _ => None,
    });
    let inline = segments.iter().filter_map(|segment| match segment {
        Segment::InlineCode(code) => Some(*code),
        _ => None,
    });

    let code: Vec<&str> = fenced.chain(inline).collect();
    if code.is_empty() {
        content.to_string()
    } else {
        code.join("\n\n")
    }
}

/// Whether the content carries any code markup worth copying
pub fn contains_code(content: &str) -> bool {
    tokenize(content).iter().any(Segment::is_code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_mixed_content() {
        let segments = tokenize("Run ```cargo test``` or `ls` now");
        assert_eq!(
            segments,
            vec![
                Segment::Text("Run "),
                Segment::FencedCode("cargo test"),
                Segment::Text(" or "),
                Segment::InlineCode("ls"),
                Segment::Text(" now"),
            ]
        );
    }

    #[test]
    fn test_tokenize_unclosed_markers_are_text() {
        assert_eq!(tokenize("a ``` b"), vec![Segment::Text("a ``` b")]);
        assert_eq!(tokenize("it`s fine"), vec![Segment::Text("it`s fine")]);
        assert_eq!(tokenize("``"), vec![Segment::Text("``")]);
    }

    #[test]
    fn test_inline_span_does_not_cross_lines() {
        let segments = tokenize("open `tick\nclose` here");
        assert!(segments.iter().all(|s| !s.is_code()));
    }

    #[test]
    fn test_fence_body_keeps_backticks() {
        let segments = tokenize("```let s = `x`;```");
        assert_eq!(segments, vec![Segment::FencedCode("let s = `x`;")]);
    }

    #[test]
    fn test_tokenize_multibyte_text() {
        let segments = tokenize("café `naïve` ünïcode");
        assert_eq!(
            segments,
            vec![
                Segment::Text("café "),
                Segment::InlineCode("naïve"),
                Segment::Text(" ünïcode"),
            ]
        );
    }

    #[test]
    fn test_strip_emphasis_markup() {
        assert_eq!(strip_emphasis_markup("**hi** and *there*"), "hi and there");
    }

    #[test]
    fn test_strip_emphasis_preserves_code() {
        let text = "**Note**: use `a*b*c` and ```x **y**```";
        assert_eq!(
            strip_emphasis_markup(text),
            "Note: use `a*b*c` and ```x **y**```"
        );
    }

    #[test]
    fn test_emphasis_wrapping_code_is_stripped() {
        let text = "Use **`cargo`** now and *see `x` here*";
        assert_eq!(strip_emphasis_markup(text), "Use `cargo` now and see `x` here");
        assert_eq!(sanitize_for_speech(text), "Use cargo now and see x here");
    }

    #[test]
    fn test_emphasis_spanning_fenced_code() {
        let text = "*run ```a **b**``` first*";
        assert_eq!(strip_emphasis_markup(text), "run ```a **b**``` first");
        assert_eq!(
            sanitize_for_speech(text),
            format!("run {} first", SPEECH_CODE_PLACEHOLDER)
        );
    }

    #[test]
    fn test_private_use_text_survives() {
        let text = "odd \u{E000}9\u{E001} and `x`";
        assert_eq!(strip_emphasis_markup(text), text);
    }

    #[test]
    fn test_sanitize_for_speech() {
        let spoken = sanitize_for_speech("See ```code here``` and `inline`");
        assert_eq!(spoken, format!("See {} and inline", SPEECH_CODE_PLACEHOLDER));
        assert!(!spoken.contains('`'));
    }

    #[test]
    fn test_sanitize_for_speech_strips_emphasis() {
        assert_eq!(sanitize_for_speech("*Sure*, **done**."), "Sure, done.");
    }

    #[test]
    fn test_extract_code() {
        assert_eq!(extract_code("text ```a``` more `b`"), "a\n\nb");
    }

    #[test]
    fn test_extract_code_groups_fenced_before_inline() {
        let content = "`first` then ```\nblock\n``` then `last`";
        assert_eq!(extract_code(content), "block\n\n\nfirst\n\nlast");
    }

    #[test]
    fn test_extract_code_without_code_returns_content() {
        assert_eq!(extract_code("plain words"), "plain words");
    }

    #[test]
    fn test_contains_code() {
        assert!(contains_code("use `x`"));
        assert!(contains_code("```\nfn main() {}\n```"));
        assert!(!contains_code("no code here"));
        assert!(!contains_code("a lone ` tick"));
    }
}
