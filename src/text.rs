//! Chapter and writing body presentation.
//!
//! Body text is plain text with a few conventions:
//!
//! - a blank line separates paragraphs; a single newline is a line break,
//! - `**strong**` and `*emphasis*` (strong is matched first),
//! - a line of three or more `-` or `*` alone is a scene break.
//!
//! Bodies come from external content files, so the whole text is HTML-escaped
//! before any structure is recognized. None of the escaped characters take
//! part in the conventions above.

use chrono::{DateTime, Datelike, NaiveDate};

/// Rendered in place of an empty chapter body.
pub const EMPTY_BODY_PLACEHOLDER: &str = "<p>(Bab ini belum memiliki isi)</p>";

/// Inline content of a paragraph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Inline {
    /// HTML-escaped text.
    Text(String),
    Strong(Vec<Inline>),
    Emphasis(Vec<Inline>),
    LineBreak,
}

/// Block-level content of a body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Block {
    Paragraph(Vec<Inline>),
    SceneBreak,
}

/// Escape text for use in HTML content and quoted attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 8);
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Parse a body into blocks. Blank input yields no blocks.
pub fn parse_blocks(raw: &str) -> Vec<Block> {
    let normalized = raw.replace("\r\n", "\n").replace('\r', "\n");
    let escaped = escape_html(normalized.trim());

    let mut blocks = Vec::new();
    let mut lines: Vec<&str> = Vec::new();
    for line in escaped.split('\n') {
        if line.trim().is_empty() {
            flush_paragraph(&mut lines, &mut blocks);
        } else if is_scene_break(line) {
            flush_paragraph(&mut lines, &mut blocks);
            blocks.push(Block::SceneBreak);
        } else {
            lines.push(line);
        }
    }
    flush_paragraph(&mut lines, &mut blocks);
    blocks
}

fn flush_paragraph(lines: &mut Vec<&str>, blocks: &mut Vec<Block>) {
    if lines.is_empty() {
        return;
    }
    let last = lines.len() - 1;
    let mut inlines = Vec::new();
    for (idx, line) in lines.drain(..).enumerate() {
        let line = match (idx == 0, idx == last) {
            (true, true) => line.trim(),
            (true, false) => line.trim_start(),
            (false, true) => line.trim_end(),
            (false, false) => line,
        };
        if idx > 0 {
            inlines.push(Inline::LineBreak);
        }
        inlines.extend(parse_inlines(line, true, true));
    }
    blocks.push(Block::Paragraph(inlines));
}

fn is_scene_break(line: &str) -> bool {
    let mut marks = line.chars().filter(|c| !c.is_whitespace());
    let Some(first) = marks.next() else {
        return false;
    };
    if first != '-' && first != '*' {
        return false;
    }
    let mut count = 1;
    for ch in marks {
        if ch != first {
            return false;
        }
        count += 1;
    }
    count >= 3
}

/// Emphasis markers must hug their content: `2 * 3 * 4` stays literal.
fn valid_inner(inner: &str) -> bool {
    !inner.is_empty()
        && !inner.starts_with(char::is_whitespace)
        && !inner.ends_with(char::is_whitespace)
}

fn push_text(out: &mut Vec<Inline>, plain: &mut String) {
    if !plain.is_empty() {
        out.push(Inline::Text(core::mem::take(plain)));
    }
}

/// Position of the first lone `*` in `body`, stepping over `**` pairs.
fn find_single_close(body: &str) -> Option<usize> {
    let bytes = body.as_bytes();
    let mut idx = 0;
    while idx < bytes.len() {
        if bytes[idx] == b'*' {
            if bytes.get(idx + 1) == Some(&b'*') {
                idx += 2;
                continue;
            }
            return Some(idx);
        }
        idx += 1;
    }
    None
}

fn parse_inlines(text: &str, allow_strong: bool, allow_emphasis: bool) -> Vec<Inline> {
    let mut out = Vec::new();
    let mut plain = String::new();
    let mut rest = text;

    while let Some(pos) = rest.find('*') {
        let (before, marker) = rest.split_at(pos);
        let double = marker.starts_with("**");

        if double && allow_strong {
            let body = &marker[2..];
            if let Some(mut end) = body.find("**") {
                // `***x***`: an odd count of lone stars means the closing run
                // also ends an emphasis opened inside.
                if body[end + 2..].starts_with('*')
                    && body[..end].matches('*').count() % 2 == 1
                {
                    end += 1;
                }
                let inner = &body[..end];
                if valid_inner(inner) {
                    plain.push_str(before);
                    push_text(&mut out, &mut plain);
                    out.push(Inline::Strong(parse_inlines(inner, false, allow_emphasis)));
                    rest = &body[end + 2..];
                    continue;
                }
            }
        } else if !double && allow_emphasis {
            let body = &marker[1..];
            if let Some(end) = find_single_close(body) {
                let inner = &body[..end];
                if valid_inner(inner) {
                    plain.push_str(before);
                    push_text(&mut out, &mut plain);
                    out.push(Inline::Emphasis(parse_inlines(inner, allow_strong, false)));
                    rest = &body[end + 1..];
                    continue;
                }
            }
        }

        let width = if double { 2 } else { 1 };
        plain.push_str(&rest[..pos + width]);
        rest = &marker[width..];
    }

    plain.push_str(rest);
    push_text(&mut out, &mut plain);
    out
}

fn inlines_to_html(inlines: &[Inline], out: &mut String) {
    for inline in inlines {
        match inline {
            Inline::Text(text) => out.push_str(text),
            Inline::Strong(children) => {
                out.push_str("<strong>");
                inlines_to_html(children, out);
                out.push_str("</strong>");
            }
            Inline::Emphasis(children) => {
                out.push_str("<em>");
                inlines_to_html(children, out);
                out.push_str("</em>");
            }
            Inline::LineBreak => out.push_str("<br>"),
        }
    }
}

/// Project blocks to HTML.
pub fn blocks_to_html(blocks: &[Block]) -> String {
    let mut out = String::new();
    for block in blocks {
        match block {
            Block::Paragraph(inlines) => {
                out.push_str("<p>");
                inlines_to_html(inlines, &mut out);
                out.push_str("</p>");
            }
            Block::SceneBreak => out.push_str("<hr class=\"scene-break\">"),
        }
    }
    out
}

/// Render a body to HTML, or [`EMPTY_BODY_PLACEHOLDER`] when there is none.
pub fn render_body(raw: Option<&str>) -> String {
    let blocks = parse_blocks(raw.unwrap_or_default());
    if blocks.is_empty() {
        EMPTY_BODY_PLACEHOLDER.to_string()
    } else {
        blocks_to_html(&blocks)
    }
}

/// Trimmed value, or `fallback` when blank.
pub fn safe_text(value: &str, fallback: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Cut `text` to `max` characters, appending `...` when shortened.
pub fn truncate(text: &str, max: usize) -> String {
    let trimmed = text.trim();
    match trimmed.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}

const MONTHS_ID: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

/// Format an ISO date (`2024-01-05`, optionally with a time part) as
/// `05 Januari 2024`. Unrecognized input is returned trimmed but otherwise
/// unchanged; blank input yields an empty string.
pub fn format_date(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    let date = DateTime::parse_from_rfc3339(trimmed)
        .map(|dt| dt.date_naive())
        .ok()
        .or_else(|| {
            trimmed
                .get(..10)
                .and_then(|head| NaiveDate::parse_from_str(head, "%Y-%m-%d").ok())
        });
    match date {
        Some(date) => format!(
            "{:02} {} {}",
            date.day(),
            MONTHS_ID[date.month0() as usize],
            date.year()
        ),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Inline {
        Inline::Text(s.to_string())
    }

    #[test]
    fn blank_line_splits_paragraphs() {
        let blocks = parse_blocks("Hello\n\nWorld");
        assert_eq!(
            blocks,
            vec![
                Block::Paragraph(vec![text("Hello")]),
                Block::Paragraph(vec![text("World")]),
            ]
        );
        assert_eq!(render_body(Some("Hello\n\nWorld")), "<p>Hello</p><p>World</p>");
    }

    #[test]
    fn single_newline_is_line_break_and_crlf_is_normalized() {
        assert_eq!(
            render_body(Some("Baris satu\r\nbaris dua\r\n\r\n  Paragraf baru  ")),
            "<p>Baris satu<br>baris dua</p><p>Paragraf baru</p>"
        );
        assert_eq!(render_body(Some("a\n \t \nb")), "<p>a</p><p>b</p>");
    }

    #[test]
    fn markup_is_escaped_before_structure() {
        let html = render_body(Some("<script>alert('x')</script> & \"kutip\""));
        assert_eq!(
            html,
            "<p>&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt; &amp; &quot;kutip&quot;</p>"
        );
        assert!(!html.contains("<script>"));

        let html = render_body(Some("**<b>tebal</b>**"));
        assert_eq!(html, "<p><strong>&lt;b&gt;tebal&lt;/b&gt;</strong></p>");
    }

    #[test]
    fn strong_is_matched_before_emphasis() {
        assert_eq!(
            parse_inlines("**bold** and *italic*", true, true),
            vec![
                Inline::Strong(vec![text("bold")]),
                text(" and "),
                Inline::Emphasis(vec![text("italic")]),
            ]
        );
        assert_eq!(
            render_body(Some("**bold** and *italic*")),
            "<p><strong>bold</strong> and <em>italic</em></p>"
        );
    }

    #[test]
    fn emphasis_nests_inside_strong() {
        assert_eq!(
            render_body(Some("**sangat *penting* sekali**")),
            "<p><strong>sangat <em>penting</em> sekali</strong></p>"
        );
    }

    #[test]
    fn triple_star_run_is_strong_around_emphasis() {
        assert_eq!(
            parse_inlines("***x***", true, true),
            vec![Inline::Strong(vec![Inline::Emphasis(vec![text("x")])])]
        );
        assert_eq!(render_body(Some("***x***")), "<p><strong><em>x</em></strong></p>");
        assert_eq!(render_body(Some("**a *b***")), "<p><strong>a <em>b</em></strong></p>");
        assert_eq!(render_body(Some("**tebal***")), "<p><strong>tebal</strong>*</p>");
    }

    #[test]
    fn strong_nests_inside_emphasis() {
        assert_eq!(render_body(Some("*a **b** c*")), "<p><em>a <strong>b</strong> c</em></p>");
        assert_eq!(render_body(Some("*a ** b*")), "<p><em>a ** b</em></p>");
    }

    #[test]
    fn unmatched_markers_stay_literal() {
        assert_eq!(render_body(Some("2 * 3 * 4")), "<p>2 * 3 * 4</p>");
        assert_eq!(render_body(Some("**belum selesai")), "<p>**belum selesai</p>");
        assert_eq!(render_body(Some("satu *dua")), "<p>satu *dua</p>");
    }

    #[test]
    fn scene_break_lines_split_paragraphs() {
        assert_eq!(
            parse_blocks("Awal\n***\nAkhir\n\n- - -\n\nPenutup"),
            vec![
                Block::Paragraph(vec![text("Awal")]),
                Block::SceneBreak,
                Block::Paragraph(vec![text("Akhir")]),
                Block::SceneBreak,
                Block::Paragraph(vec![text("Penutup")]),
            ]
        );
        assert_eq!(
            render_body(Some("a\n\n---\n\nb")),
            "<p>a</p><hr class=\"scene-break\"><p>b</p>"
        );
        assert!(!is_scene_break("--"));
        assert!(!is_scene_break("-*-"));
        assert!(is_scene_break("  *****  "));
    }

    #[test]
    fn empty_or_absent_body_renders_placeholder() {
        assert_eq!(render_body(None), EMPTY_BODY_PLACEHOLDER);
        assert_eq!(render_body(Some("  \n\r\n ")), EMPTY_BODY_PLACEHOLDER);
    }

    #[test]
    fn truncate_counts_characters() {
        assert_eq!(truncate("  pendek  ", 10), "pendek");
        assert_eq!(truncate("abcdef", 3), "abc...");
        assert_eq!(truncate("ééééé", 2), "éé...");
        assert_eq!(truncate("abc", 3), "abc");
    }

    #[test]
    fn safe_text_falls_back_on_blank() {
        assert_eq!(safe_text("  ", "Umum"), "Umum");
        assert_eq!(safe_text(" Fiksi ", "Umum"), "Fiksi");
    }

    #[test]
    fn format_date_uses_indonesian_month_names() {
        assert_eq!(format_date("2024-01-05"), "05 Januari 2024");
        assert_eq!(format_date("2023-12-31T23:00:00Z"), "31 Desember 2023");
        assert_eq!(format_date("2024-08-17 10:00"), "17 Agustus 2024");
        assert_eq!(format_date("kemarin"), "kemarin");
        assert_eq!(format_date(""), "");
    }
}
