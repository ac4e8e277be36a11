use crate::ContentNode;
use crate::ElementNode;

/// Parse a markup fragment into a node tree.
///
/// Recovery rules, in the order the input is scanned:
/// - `<!--` opens a comment; an unterminated comment runs to end of input.
/// - `</name>` closes the nearest open `name`, completing any elements
///   opened after it; a close tag with no matching open element is dropped.
/// - `<` followed by an ASCII letter opens an element. Void elements and
///   `/>` never take children.
/// - Any other `<` is literal text.
/// - Elements still open at end of input are closed there.
pub fn parse_fragment(input: &str) -> Vec<ContentNode> {
    Parser::new(input).run()
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Advance by `n` bytes. Callers only pass counts landing on char
    /// boundaries (ASCII delimiters or indices found within `rest`).
    fn bump_bytes(&mut self, n: usize) {
        self.pos += n;
    }

    fn next_char(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
        &self.input[start..self.pos]
    }

    fn run(mut self) -> Vec<ContentNode> {
        let mut roots: Vec<ContentNode> = Vec::new();
        let mut stack: Vec<ElementNode> = Vec::new();
        let mut text = String::new();

        while !self.at_end() {
            let rest = self.rest();
            if rest.starts_with("<!--") {
                flush_text(&mut text, &mut roots, &mut stack);
                self.bump_bytes(4);
                let body = match self.rest().find("-->") {
                    Some(idx) => {
                        let body = &self.rest()[..idx];
                        self.bump_bytes(idx + 3);
                        body
                    }
                    None => {
                        let body = self.rest();
                        self.pos = self.input.len();
                        body
                    }
                };
                attach(&mut roots, &mut stack, ContentNode::Comment(body.to_string()));
            } else if rest.starts_with("</") {
                let after = &rest[2..];
                match after.find('>') {
                    Some(idx) => {
                        flush_text(&mut text, &mut roots, &mut stack);
                        let name = close_tag_name(&after[..idx]);
                        self.bump_bytes(2 + idx + 1);
                        if !name.is_empty() && stack.iter().any(|el| el.tag == name) {
                            while let Some(el) = stack.pop() {
                                let matched = el.tag == name;
                                attach(&mut roots, &mut stack, ContentNode::Element(el));
                                if matched {
                                    break;
                                }
                            }
                        }
                    }
                    None => {
                        // No terminator ahead; keep the raw remainder as text.
                        text.push_str(rest);
                        self.pos = self.input.len();
                    }
                }
            } else if rest.starts_with('<')
                && rest[1..]
                    .chars()
                    .next()
                    .is_some_and(|c| c.is_ascii_alphabetic())
            {
                flush_text(&mut text, &mut roots, &mut stack);
                self.parse_element(&mut roots, &mut stack);
            } else if let Some(c) = self.next_char() {
                text.push(c);
            }
        }

        flush_text(&mut text, &mut roots, &mut stack);
        while let Some(el) = stack.pop() {
            attach(&mut roots, &mut stack, ContentNode::Element(el));
        }
        roots
    }

    fn parse_element(&mut self, roots: &mut Vec<ContentNode>, stack: &mut Vec<ElementNode>) {
        self.bump_bytes(1); // '<'
        let tag = self
            .eat_while(|c| c.is_ascii_alphanumeric())
            .to_ascii_lowercase();
        let mut element = ElementNode::new(tag);
        let mut self_closing = false;

        loop {
            self.eat_while(|c| c.is_whitespace());
            match self.peek() {
                None => break, // input ended inside the tag; treat it as closed
                Some('>') => {
                    self.bump_bytes(1);
                    break;
                }
                Some('/') => {
                    self.bump_bytes(1);
                    if self.peek() == Some('>') {
                        self.bump_bytes(1);
                        self_closing = true;
                        break;
                    }
                    // stray slash inside the tag
                }
                Some(_) => self.parse_attr(&mut element),
            }
        }

        if self_closing || element.is_void() {
            attach(roots, stack, ContentNode::Element(element));
        } else {
            stack.push(element);
        }
    }

    fn parse_attr(&mut self, element: &mut ElementNode) {
        let name = self.eat_while(|c| !c.is_whitespace() && c != '=' && c != '>' && c != '/');
        if name.is_empty() {
            // Unexpected delimiter; consume one char so scanning advances.
            self.next_char();
            return;
        }
        let name = name.to_ascii_lowercase();

        self.eat_while(|c| c.is_whitespace());
        if self.peek() != Some('=') {
            element.attrs.push((name, String::new()));
            return;
        }
        self.bump_bytes(1); // '='
        self.eat_while(|c| c.is_whitespace());

        let value = match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.bump_bytes(1);
                let value = self.eat_while(|c| c != quote).to_string();
                if !self.at_end() {
                    self.bump_bytes(1); // closing quote
                }
                value
            }
            _ => self
                .eat_while(|c| !c.is_whitespace() && c != '>')
                .to_string(),
        };
        element.attrs.push((name, value));
    }
}

fn close_tag_name(raw: &str) -> String {
    raw.trim()
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase()
}

fn attach(roots: &mut Vec<ContentNode>, stack: &mut Vec<ElementNode>, node: ContentNode) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => roots.push(node),
    }
}

fn flush_text(text: &mut String, roots: &mut Vec<ContentNode>, stack: &mut Vec<ElementNode>) {
    if !text.is_empty() {
        attach(roots, stack, ContentNode::Text(std::mem::take(text)));
    }
}
