//! crates/interactive_markdown/src/block.rs
//!
//! A minimal line-oriented block parser. Rules follow a two-phase contract:
//! in silent mode a rule only reports whether it would match at the current
//! line; otherwise it emits its tokens and advances the cursor.

use std::fmt::Write;

/// A block-level node produced by the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Rule-specific token type, e.g. `"text"`.
    pub kind: &'static str,
    /// Element rendered for this token. Empty for raw text.
    pub tag: &'static str,
    pub attrs: Vec<(String, String)>,
    /// Source text the token was built from.
    pub content: String,
    /// Source line range `[start, end)`.
    pub map: (usize, usize),
}

pub const TEXT_TOKEN: &str = "text";

impl Token {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Parser state shared by the rules: the source lines, a cursor and the
/// tokens emitted so far.
#[derive(Debug)]
pub struct BlockState<'src> {
    lines: Vec<&'src str>,
    /// Index of the line the next rule inspects.
    pub line: usize,
    tokens: Vec<Token>,
}

impl<'src> BlockState<'src> {
    pub fn new(src: &'src str) -> Self {
        Self {
            lines: src.lines().collect(),
            line: 0,
            tokens: Vec::new(),
        }
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// The current line with its leading indentation skipped.
    pub fn current_line(&self) -> Option<&'src str> {
        self.lines
            .get(self.line)
            .map(|line| line.trim_start_matches([' ', '\t']))
    }

    pub fn raw_line(&self, index: usize) -> Option<&'src str> {
        self.lines.get(index).copied()
    }

    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }
}

/// A block-level parsing rule.
pub trait BlockRule: Send + Sync {
    fn name(&self) -> &'static str;

    /// Tries the rule at `state.line`.
    ///
    /// Returns `false` without touching `state` when the rule does not match.
    /// In silent mode a match returns `true` and emits nothing. Otherwise the
    /// rule pushes its token(s) and moves `state.line` past the lines it consumed.
    fn apply(&self, state: &mut BlockState<'_>, silent: bool) -> bool;
}

/// Runs a set of block rules over a document. Lines no rule claims are
/// grouped into `text` tokens and passed through untouched.
#[derive(Default)]
pub struct BlockParser {
    rules: Vec<Box<dyn BlockRule>>,
}

impl BlockParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rule(mut self, rule: impl BlockRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Name of the first rule that would match at the current line, without
    /// emitting anything.
    pub fn probe(&self, state: &mut BlockState<'_>) -> Option<&'static str> {
        self.rules
            .iter()
            .find(|rule| rule.apply(&mut *state, true))
            .map(|rule| rule.name())
    }

    pub fn parse(&self, src: &str) -> Vec<Token> {
        let mut state = BlockState::new(src);

        while state.line < state.line_count() {
            let start = state.line;
            if self.rules.iter().any(|rule| rule.apply(&mut state, false)) {
                if state.line == start {
                    // A matching rule must consume input.
                    state.line += 1;
                }
                continue;
            }
            self.push_text(&mut state);
        }

        state.into_tokens()
    }

    /// Collects unclaimed lines up to the next line some rule would take.
    fn push_text(&self, state: &mut BlockState<'_>) {
        let start = state.line;
        let mut content = String::new();
        loop {
            if let Some(line) = state.raw_line(state.line) {
                content.push_str(line);
                content.push('\n');
            }
            state.line += 1;
            if state.line >= state.line_count() || self.probe(state).is_some() {
                break;
            }
        }
        state.push(Token {
            kind: TEXT_TOKEN,
            tag: "",
            attrs: Vec::new(),
            content,
            map: (start, state.line),
        });
    }
}

/// Rendering switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// HTML-escape attribute values. Off by default: values are written
    /// verbatim, so untrusted source can break out of the attribute.
    pub escape_attributes: bool,
}

/// Renders tokens back to text. Text tokens are emitted unchanged; tokens
/// with a tag become a self-closing element carrying their attributes.
pub fn render(tokens: &[Token], options: RenderOptions) -> String {
    let mut out = String::new();
    for token in tokens {
        if token.tag.is_empty() {
            out.push_str(&token.content);
            continue;
        }
        out.push('<');
        out.push_str(token.tag);
        for (name, value) in &token.attrs {
            if options.escape_attributes {
                let _ = write!(out, " {}='{}'", name, escape_html(value));
            } else {
                let _ = write!(out, " {}='{}'", name, value);
            }
        }
        out.push_str(" />\n");
    }
    out
}

pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Claims lines that are exactly `---`.
    struct RuleLine;

    impl BlockRule for RuleLine {
        fn name(&self) -> &'static str {
            "rule_line"
        }

        fn apply(&self, state: &mut BlockState<'_>, silent: bool) -> bool {
            if state.current_line() != Some("---") {
                return false;
            }
            if silent {
                return true;
            }
            state.push(Token {
                kind: "hr",
                tag: "hr",
                attrs: Vec::new(),
                content: "---".to_string(),
                map: (state.line, state.line + 1),
            });
            state.line += 1;
            true
        }
    }

    #[test]
    fn unclaimed_lines_group_into_text_until_a_rule_matches() {
        let parser = BlockParser::new().with_rule(RuleLine);
        let tokens = parser.parse("one\ntwo\n---\nthree");

        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].kind, TEXT_TOKEN);
        assert_eq!(tokens[0].content, "one\ntwo\n");
        assert_eq!(tokens[0].map, (0, 2));
        assert_eq!(tokens[1].kind, "hr");
        assert_eq!(tokens[1].map, (2, 3));
        assert_eq!(tokens[2].content, "three\n");
    }

    #[test]
    fn probe_reports_without_emitting() {
        let parser = BlockParser::new().with_rule(RuleLine);
        let mut state = BlockState::new("  ---");

        assert_eq!(parser.probe(&mut state), Some("rule_line"));
        assert!(state.tokens().is_empty());
        assert_eq!(state.line, 0);
    }

    #[test]
    fn render_writes_attributes_verbatim_unless_escaping() {
        let token = Token {
            kind: "x",
            tag: "div",
            attrs: vec![("data-x".to_string(), "<b>'hi'</b>".to_string())],
            content: String::new(),
            map: (0, 1),
        };

        let raw = render(std::slice::from_ref(&token), RenderOptions::default());
        assert_eq!(raw, "<div data-x='<b>'hi'</b>' />\n");

        let escaped = render(&[token], RenderOptions { escape_attributes: true });
        assert_eq!(escaped, "<div data-x='&lt;b&gt;&#39;hi&#39;&lt;/b&gt;' />\n");
    }

    #[test]
    fn empty_source_has_no_tokens() {
        assert!(BlockParser::new().parse("").is_empty());
    }
}
