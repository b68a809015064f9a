//! Lightweight lexical views over source text.
//!
//! Rules never parse fixture code. They work on a *masked* copy of each line
//! where comment text and string-literal contents are replaced by spaces, so
//! column positions survive and a `console.log` inside a comment or string
//! never matches. Blocks are found by brace counting (C-like sources) or by
//! indentation after a trailing `:` (Python-like sources).

use regex::Regex;
use std::sync::LazyLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Comment syntax family, chosen from the file extension.
pub enum Dialect {
    /// `//` and `/* */` comments.
    CStyle,
    /// `#` line comments.
    Hash,
}

impl Dialect {
    pub fn for_id(id: &str) -> Dialect {
        let ext = id.rsplit_once('.').map(|(_, e)| e).unwrap_or("");
        match ext {
            "py" | "rb" | "sh" => Dialect::Hash,
            _ => Dialect::CStyle,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum State {
    Code,
    LineComment,
    BlockComment,
    Str(char),
    Template,
}

/// Mask comments and string contents, one output line per `str::lines` line.
pub fn mask(text: &str, dialect: Dialect) -> Vec<String> {
    let mut out = Vec::new();
    let mut cur = String::new();
    let mut state = State::Code;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\r' && chars.peek() == Some(&'\n') {
            continue;
        }
        if c == '\n' {
            out.push(std::mem::take(&mut cur));
            if matches!(state, State::LineComment | State::Str(_)) {
                state = State::Code;
            }
            continue;
        }
        match state {
            State::Code => match c {
                '/' if dialect == Dialect::CStyle && chars.peek() == Some(&'/') => {
                    chars.next();
                    cur.push_str("  ");
                    state = State::LineComment;
                }
                '/' if dialect == Dialect::CStyle && chars.peek() == Some(&'*') => {
                    chars.next();
                    cur.push_str("  ");
                    state = State::BlockComment;
                }
                '#' if dialect == Dialect::Hash => {
                    cur.push(' ');
                    state = State::LineComment;
                }
                '\'' | '"' => {
                    cur.push(c);
                    state = State::Str(c);
                }
                '`' => {
                    cur.push(c);
                    state = State::Template;
                }
                _ => cur.push(c),
            },
            State::LineComment => cur.push(' '),
            State::BlockComment => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    cur.push_str("  ");
                    state = State::Code;
                } else {
                    cur.push(' ');
                }
            }
            State::Str(_) | State::Template if c == '\\' => {
                cur.push(' ');
                if let Some(&next) = chars.peek() {
                    if next != '\n' {
                        chars.next();
                        cur.push(' ');
                    }
                }
            }
            State::Str(q) => {
                if c == q {
                    cur.push(c);
                    state = State::Code;
                } else {
                    cur.push(' ');
                }
            }
            State::Template => {
                if c == '`' {
                    cur.push(c);
                    state = State::Code;
                } else {
                    cur.push(' ');
                }
            }
        }
    }
    if !cur.is_empty() {
        out.push(cur);
    }
    out
}

/// Leading whitespace width of a line.
pub fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

/// Last line (0-indexed, inclusive) of the block opened at or after `start`.
///
/// A header whose code ends in `:` opens an indentation block; otherwise the
/// first `{` opens a brace block. A `;` before any `{` means no block.
pub fn block_end(lines: &[String], start: usize) -> Option<usize> {
    let header = lines.get(start)?;
    let trimmed = header.trim_end();
    if trimmed.ends_with(':') && !trimmed.contains('{') {
        return Some(indent_block_end(lines, start));
    }
    let mut depth: usize = 0;
    let mut opened = false;
    for (i, line) in lines.iter().enumerate().skip(start) {
        for c in line.chars() {
            match c {
                '{' => {
                    depth += 1;
                    opened = true;
                }
                '}' if opened => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return Some(i);
                    }
                }
                ';' if !opened => return None,
                _ => {}
            }
        }
    }
    None
}

fn indent_block_end(lines: &[String], start: usize) -> usize {
    let base = indent_of(&lines[start]);
    let mut end = start;
    for (i, line) in lines.iter().enumerate().skip(start + 1) {
        if line.trim().is_empty() {
            continue;
        }
        if indent_of(line) <= base {
            break;
        }
        end = i;
    }
    end
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A named region of lines, 0-indexed and inclusive on both ends.
pub struct Span {
    pub name: String,
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn contains(&self, line: usize) -> bool {
        self.start <= line && line <= self.end
    }

    /// Whether `other` lies inside this span and is not the same region.
    pub fn encloses(&self, other: &Span) -> bool {
        self != other && self.start <= other.start && other.end <= self.end
    }
}

const NON_METHOD_WORDS: &[&str] = &[
    "if", "for", "while", "switch", "catch", "with", "return", "function", "else", "do", "try",
    "new", "typeof", "await", "super", "elif", "except",
];

static FUNCTION_KW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bfunction\b\s*\*?\s*([A-Za-z_$][\w$]*)?\s*(?:<[^>]*>)?\s*\(").unwrap()
});
static ARROW_BLOCK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"=>\s*\{\s*$").unwrap());
static ARROW_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:export\s+)?(?:(?:const|let|var|private|public|protected|readonly|static)\s+)*([A-Za-z_$][\w$]*)\s*(?::[^=]*)?=[^=>]").unwrap()
});
static METHOD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*(?:(?:public|private|protected|static|async|get|set|readonly|override|export|default)\s+)*\*?\s*([A-Za-z_$][\w$]*)\s*(?:<[^>]*>)?\s*\(.*\)\s*(?::[^{]*)?\{\s*$",
    )
    .unwrap()
});
static PY_DEF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:async\s+)?def\s+([A-Za-z_]\w*)\s*\(").unwrap());
static CLASS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bclass\s+([A-Za-z_$][\w$]*)").unwrap());

fn function_header(line: &str) -> Option<String> {
    if let Some(c) = PY_DEF.captures(line) {
        return Some(c[1].to_string());
    }
    if let Some(c) = FUNCTION_KW.captures(line) {
        return Some(
            c.get(1)
                .map(|m| m.as_str().to_string())
                .unwrap_or_else(|| "<anonymous>".to_string()),
        );
    }
    if ARROW_BLOCK.is_match(line) {
        return Some(
            ARROW_NAME
                .captures(line)
                .map(|c| c[1].to_string())
                .unwrap_or_else(|| "<anonymous>".to_string()),
        );
    }
    if let Some(c) = METHOD.captures(line) {
        let name = &c[1];
        if !NON_METHOD_WORDS.contains(&name) {
            return Some(name.to_string());
        }
    }
    None
}

/// Function and method regions of masked `lines`, in header order.
pub fn functions(lines: &[String]) -> Vec<Span> {
    let mut out = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        if CLASS.is_match(line) {
            continue;
        }
        if let Some(name) = function_header(line) {
            if let Some(end) = block_end(lines, i) {
                out.push(Span {
                    name,
                    start: i,
                    end,
                });
            }
        }
    }
    out
}

/// Class regions of masked `lines`, in header order.
pub fn classes(lines: &[String]) -> Vec<Span> {
    lines
        .iter()
        .enumerate()
        .filter_map(|(i, line)| {
            let name = CLASS.captures(line)?[1].to_string();
            let end = block_end(lines, i)?;
            Some(Span {
                name,
                start: i,
                end,
            })
        })
        .collect()
}

/// Innermost span containing `line`.
pub fn innermost(spans: &[Span], line: usize) -> Option<&Span> {
    spans
        .iter()
        .filter(|s| s.contains(line))
        .max_by_key(|s| s.start)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn masked(src: &str) -> Vec<String> {
        mask(src, Dialect::CStyle)
    }

    #[test]
    fn test_mask_blanks_comments_and_strings_keeping_columns() {
        let src = "const a = 'x // y'; // note\n/* block\n still */ b = \"q\";\n";
        let out = masked(src);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0], format!("const a = '{}';{}", " ".repeat(6), " ".repeat(8)));
        assert_eq!(out[1].trim(), "");
        assert_eq!(out[2], format!("{}b = \" \";", " ".repeat(10)));
        assert_eq!(out[0].chars().count(), src.lines().next().unwrap().chars().count());
    }

    #[test]
    fn test_mask_line_count_matches_source_lines() {
        let src = "a\r\nb\n`tmpl\nline`\n// end";
        assert_eq!(masked(src).len(), src.lines().count());
        let py = mask("x = 1  # 0.85\nprint('#')\n", Dialect::Hash);
        assert_eq!(py[0].trim_end(), "x = 1");
        assert_eq!(py[1], "print(' ')");
    }

    #[test]
    fn test_block_end_brace_and_indent() {
        let src = masked("function f() {\n  if (x) {\n    y();\n  }\n}\nz();\n");
        assert_eq!(block_end(&src, 0), Some(4));
        assert_eq!(block_end(&src, 1), Some(3));
        assert_eq!(block_end(&src, 5), None);

        let py = mask("def f():\n    a = 1\n\n    b = 2\nc = 3\n", Dialect::Hash);
        assert_eq!(block_end(&py, 0), Some(3));
    }

    #[test]
    fn test_functions_find_methods_arrows_and_keywords() {
        let src = masked(
            "export class Svc {\n  async load(id: string): Promise<X> {\n    if (id) {\n      return 1;\n    }\n  }\n  static getInstance(): Svc {\n    return s;\n  }\n}\nexport const run = async () => {\n  items.forEach(i => {\n    go(i);\n  });\n};\nfunction helper(a) {\n}\n",
        );
        let names: Vec<_> = functions(&src).into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["load", "getInstance", "run", "<anonymous>", "helper"]);
        let cls = classes(&src);
        assert_eq!(cls.len(), 1);
        assert_eq!((cls[0].start, cls[0].end), (0, 9));
    }

    #[test]
    fn test_innermost_prefers_nested_span() {
        let spans = vec![
            Span { name: "outer".into(), start: 0, end: 10 },
            Span { name: "inner".into(), start: 3, end: 5 },
        ];
        assert_eq!(innermost(&spans, 4).unwrap().name, "inner");
        assert_eq!(innermost(&spans, 7).unwrap().name, "outer");
        assert!(innermost(&spans, 11).is_none());
        assert!(spans[0].encloses(&spans[1]));
    }
}
