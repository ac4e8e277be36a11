use crate::ContentNode;

/// Render a node tree back to markup.
///
/// Output is normalized rather than byte-identical to the parsed input:
/// tag and attribute names come out lowercase, attribute values are always
/// double-quoted, and void elements are emitted without a closing tag.
pub fn serialize(nodes: &[ContentNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        write_node(node, &mut out);
    }
    out
}

fn write_node(node: &ContentNode, out: &mut String) {
    match node {
        ContentNode::Text(text) => out.push_str(text),
        ContentNode::Comment(body) => {
            out.push_str("<!--");
            out.push_str(body);
            out.push_str("-->");
        }
        ContentNode::Element(element) => {
            out.push('<');
            out.push_str(&element.tag);
            for (name, value) in &element.attrs {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                out.push_str(&value.replace('"', "&quot;"));
                out.push('"');
            }
            out.push('>');
            if !element.is_void() {
                for child in &element.children {
                    write_node(child, out);
                }
                out.push_str("</");
                out.push_str(&element.tag);
                out.push('>');
            }
        }
    }
}
