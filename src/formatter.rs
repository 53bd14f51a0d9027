//! Output formatters applied to rendered code before it is written.

/// Reformats rendered source text.
///
/// An `Err` carries a human readable reason and means the rendered text is not
/// well-formed; the caller attaches the template name.
pub trait CodeFormatter {
    fn format(&self, source: &str) -> Result<String, String>;
}

/// Formatter for JavaScript sources.
///
/// Re-indents every line by bracket depth, trims trailing whitespace, collapses
/// runs of blank lines and ends the output with a single newline. Lines inside a
/// multi-line template literal are kept verbatim. Regular expression literals are
/// not recognized, so brackets inside them must be balanced.
#[derive(Debug, Clone)]
pub struct JsFormatter {
    indent: String,
}

impl JsFormatter {
    pub fn new() -> Self {
        Self { indent: "  ".to_string() }
    }

    pub fn with_indent(width: usize) -> Self {
        Self { indent: " ".repeat(width) }
    }
}

impl Default for JsFormatter {
    fn default() -> Self {
        JsFormatter::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Frame {
    /// Opening bracket and the indent level of the lines it encloses
    Bracket(char, usize),
    Template,
}

enum Line {
    Blank,
    Text(String),
}

fn opener_for(closer: char) -> char {
    match closer {
        ')' => '(',
        ']' => '[',
        _ => '{',
    }
}

/// Indent level of a line that starts with `closers` closing brackets.
fn line_level(stack: &[Frame], closers: usize) -> usize {
    stack
        .iter()
        .rev()
        .filter_map(|frame| match frame {
            Frame::Bracket(_, level) => Some(*level),
            Frame::Template => None,
        })
        .nth(closers)
        .unwrap_or(0)
}

fn leading_closers(line: &str) -> usize {
    line.chars()
        .filter(|c| !c.is_whitespace())
        .take_while(|c| matches!(c, ')' | ']' | '}'))
        .count()
}

/// Advances the bracket/string state over one line.
/// Brackets opened on this line enclose lines at `inner_level`.
fn scan(
    line: &str,
    number: usize,
    inner_level: usize,
    stack: &mut Vec<Frame>,
    in_block_comment: &mut bool,
) -> Result<(), String> {
    let chars: Vec<char> = line.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();

        if *in_block_comment {
            if c == '*' && next == Some('/') {
                *in_block_comment = false;
                i += 2;
            } else {
                i += 1;
            }
            continue;
        }

        if stack.last() == Some(&Frame::Template) {
            match c {
                '\\' => i += 2,
                '`' => {
                    stack.pop();
                    i += 1;
                }
                '$' if next == Some('{') => {
                    stack.push(Frame::Bracket('{', inner_level));
                    i += 2;
                }
                _ => i += 1,
            }
            continue;
        }

        match c {
            '/' if next == Some('/') => break,
            '/' if next == Some('*') => {
                *in_block_comment = true;
                i += 2;
                continue;
            }
            '\'' | '"' => {
                let mut j = i + 1;
                let mut closed = false;
                while j < chars.len() {
                    if chars[j] == '\\' {
                        j += 2;
                        continue;
                    }
                    if chars[j] == c {
                        closed = true;
                        break;
                    }
                    j += 1;
                }
                if !closed {
                    return Err(format!("unterminated string on line {number}"));
                }
                i = j;
            }
            '`' => stack.push(Frame::Template),
            '(' | '[' | '{' => stack.push(Frame::Bracket(c, inner_level)),
            ')' | ']' | '}' => match stack.pop() {
                Some(Frame::Bracket(open, _)) if open == opener_for(c) => {}
                _ => return Err(format!("unexpected '{c}' on line {number}")),
            },
            _ => {}
        }
        i += 1;
    }
    Ok(())
}

impl CodeFormatter for JsFormatter {
    fn format(&self, source: &str) -> Result<String, String> {
        let mut stack: Vec<Frame> = Vec::new();
        let mut in_block_comment = false;
        let mut lines = Vec::new();

        for (index, raw) in source.lines().enumerate() {
            let trimmed = raw.trim();
            let level = if in_block_comment {
                line_level(&stack, 0)
            } else {
                line_level(&stack, leading_closers(trimmed))
            };
            let line = if stack.last() == Some(&Frame::Template) {
                Line::Text(raw.trim_end().to_string())
            } else if trimmed.is_empty() {
                Line::Blank
            } else if in_block_comment {
                let prefix = if trimmed.starts_with('*') { " " } else { "" };
                Line::Text(format!("{}{prefix}{trimmed}", self.indent.repeat(level)))
            } else {
                Line::Text(format!("{}{trimmed}", self.indent.repeat(level)))
            };
            scan(raw, index + 1, level + 1, &mut stack, &mut in_block_comment)?;
            lines.push(line);
        }

        if in_block_comment {
            return Err("unterminated block comment".to_string());
        }
        match stack.last() {
            Some(Frame::Bracket(open, _)) => return Err(format!("unclosed '{open}'")),
            Some(Frame::Template) => return Err("unterminated template literal".to_string()),
            None => {}
        }

        let mut output = String::new();
        let mut pending_blank = false;
        for line in lines {
            match line {
                Line::Blank => pending_blank = !output.is_empty(),
                Line::Text(text) => {
                    if pending_blank {
                        output.push('\n');
                        pending_blank = false;
                    }
                    output.push_str(&text);
                    output.push('\n');
                }
            }
        }
        Ok(output)
    }
}
