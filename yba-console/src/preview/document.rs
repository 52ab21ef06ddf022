//! Minimal rich-document model for alert channel templates
//!
//! A document is a list of paragraphs; a paragraph holds text runs and
//! inline alert variables. The text form puts one paragraph per line and
//! writes variables as `{{ name }}`.

use serde::{Deserialize, Serialize};

const VARIABLE_OPEN: &str = "{{";
const VARIABLE_CLOSE: &str = "}}";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Node {
    Paragraph { children: Vec<Node> },
    Text { text: String },
    AlertVariable { variable: String },
}

impl Node {
    pub fn paragraph(children: Vec<Node>) -> Self {
        Node::Paragraph { children }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Node::Text { text: text.into() }
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Node::AlertVariable {
            variable: name.into(),
        }
    }
}

/// Holds the document being displayed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Editor {
    children: Vec<Node>,
}

impl Editor {
    pub fn new(children: Vec<Node>) -> Self {
        Self { children }
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Remove every node
    pub fn clear(&mut self) {
        self.children.clear();
    }

    /// Append nodes at the end of the document
    pub fn insert_nodes(&mut self, nodes: Vec<Node>) {
        self.children.extend(nodes);
    }

    pub fn to_text(&self) -> String {
        TextSerializer::serialize(&self.children)
    }
}

/// Document → plain text template
pub struct TextSerializer;

impl TextSerializer {
    pub fn serialize(nodes: &[Node]) -> String {
        nodes
            .iter()
            .map(Self::serialize_node)
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn serialize_node(node: &Node) -> String {
        match node {
            Node::Paragraph { children } => children.iter().map(Self::serialize_node).collect(),
            Node::Text { text } => text.clone(),
            Node::AlertVariable { variable } => {
                format!("{} {} {}", VARIABLE_OPEN, variable, VARIABLE_CLOSE)
            }
        }
    }
}

/// Plain text → document
pub struct TextDeserializer;

impl TextDeserializer {
    pub fn deserialize(text: &str) -> Vec<Node> {
        text.split('\n')
            .map(|line| Node::paragraph(Self::parse_line(line)))
            .collect()
    }

    fn parse_line(line: &str) -> Vec<Node> {
        let mut nodes = Vec::new();
        let mut pending = String::new();
        let mut rest = line;

        while let Some(start) = rest.find(VARIABLE_OPEN) {
            let after_open = &rest[start + VARIABLE_OPEN.len()..];
            let Some(end) = after_open.find(VARIABLE_CLOSE) else {
                break;
            };

            let name = after_open[..end].trim();
            if !is_variable_name(name) {
                // a later `{{` may still open a real variable
                pending.push_str(&rest[..start + VARIABLE_OPEN.len()]);
                rest = after_open;
                continue;
            }

            pending.push_str(&rest[..start]);
            if !pending.is_empty() {
                nodes.push(Node::text(std::mem::take(&mut pending)));
            }
            nodes.push(Node::variable(name));
            rest = &after_open[end + VARIABLE_CLOSE.len()..];
        }

        pending.push_str(rest);
        if !pending.is_empty() || nodes.is_empty() {
            nodes.push(Node::text(pending));
        }
        nodes
    }
}

fn is_variable_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | '-' | '$'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_paragraphs_and_variables() {
        let doc = vec![
            Node::paragraph(vec![
                Node::text("Alert "),
                Node::variable("alert_name"),
                Node::text(" fired"),
            ]),
            Node::paragraph(vec![Node::text("Severity: "), Node::variable("severity")]),
        ];

        assert_eq!(
            TextSerializer::serialize(&doc),
            "Alert {{ alert_name }} fired\nSeverity: {{ severity }}"
        );
    }

    #[test]
    fn test_deserialize_recognizes_variables() {
        let nodes = TextDeserializer::deserialize("Hi {{name}}, {{ count }} new");
        assert_eq!(
            nodes,
            vec![Node::paragraph(vec![
                Node::text("Hi "),
                Node::variable("name"),
                Node::text(", "),
                Node::variable("count"),
                Node::text(" new"),
            ])]
        );
    }

    #[test]
    fn test_deserialize_keeps_malformed_braces_as_text() {
        let nodes = TextDeserializer::deserialize("{{ }} and {{ not closed");
        assert_eq!(
            nodes,
            vec![Node::paragraph(vec![Node::text("{{ }} and {{ not closed")])]
        );
    }

    #[test]
    fn test_unmatched_open_before_variable() {
        let nodes = TextDeserializer::deserialize("{{ a {{ b }}");
        assert_eq!(
            nodes,
            vec![Node::paragraph(vec![Node::text("{{ a "), Node::variable("b")])]
        );
    }

    #[test]
    fn test_empty_lines_become_empty_paragraphs() {
        let nodes = TextDeserializer::deserialize("a\n\nb");
        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[1], Node::paragraph(vec![Node::text("")]));
    }

    #[test]
    fn test_text_round_trip() {
        let text = "Universe {{ universe_name }} is down\n\nSee {{ alert_url }}";
        assert_eq!(TextSerializer::serialize(&TextDeserializer::deserialize(text)), text);
    }

    #[test]
    fn test_editor_clear_then_insert() {
        let mut editor = Editor::new(TextDeserializer::deserialize("old"));
        editor.clear();
        assert!(editor.children().is_empty());

        editor.insert_nodes(TextDeserializer::deserialize("new {{ x }}"));
        assert_eq!(editor.to_text(), "new {{ x }}");
    }
}
