//! Minimal HTML-fragment tree for composer content.
//!
//! The composer stores its content as markup text. Whenever a pass needs to
//! inspect or rewrite embedded structure (image sources, plain-text
//! projection), the markup is parsed into this node tree, transformed, and
//! serialized back. Binding to a concrete editing surface happens outside
//! this crate; nothing here touches a live editor.
//!
//! The parser is intentionally forgiving: composer content is produced by a
//! rich-text editor, not by adversarial documents.
//! Tag and attribute names are lowercased, text is preserved verbatim (no
//! entity decoding), unmatched close tags are ignored and unclosed elements
//! are closed at end of input.

mod parser;
mod serializer;

pub use parser::parse_fragment;
pub use serializer::serialize;

/// Element names that never carry children.
const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentNode {
    /// Raw text, stored exactly as written (entities are not decoded).
    Text(String),
    /// Contents of a `<!-- -->` block, without the delimiters.
    Comment(String),
    Element(ElementNode),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementNode {
    /// Lowercased tag name.
    pub tag: String,
    /// Attributes in source order; names lowercased, values verbatim.
    pub attrs: Vec<(String, String)>,
    pub children: Vec<ContentNode>,
}

impl ElementNode {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(attr, _)| attr == name)
            .map(|(_, value)| value.as_str())
    }

    /// Replace the named attribute's value, or append it when absent.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|(attr, _)| attr == name) {
            Some((_, existing)) => *existing = value,
            None => self.attrs.push((name.to_string(), value)),
        }
    }

    pub fn is_void(&self) -> bool {
        VOID_TAGS.contains(&self.tag.as_str())
    }
}

/// Concatenated text content in document order. Comments and markup
/// contribute nothing; entities stay undecoded, matching what [`parse_fragment`]
/// stored.
pub fn plain_text(nodes: &[ContentNode]) -> String {
    let mut out = String::new();
    collect_text(nodes, &mut out);
    out
}

fn collect_text(nodes: &[ContentNode], out: &mut String) {
    for node in nodes {
        match node {
            ContentNode::Text(text) => out.push_str(text),
            ContentNode::Comment(_) => {}
            ContentNode::Element(element) => collect_text(&element.children, out),
        }
    }
}

/// Visit every element in document order, each element before its children.
pub fn for_each_element(nodes: &[ContentNode], f: &mut impl FnMut(&ElementNode)) {
    for node in nodes {
        if let ContentNode::Element(element) = node {
            f(element);
            for_each_element(&element.children, f);
        }
    }
}
