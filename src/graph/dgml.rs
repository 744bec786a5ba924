//! DGML Export
//!
//! Serializes a dependency graph to the Visual Studio DGML dialect: a flat
//! list of `<Node>` and `<Link>` elements inside a `<DirectedGraph>` root
//! with the `vs/2009/dgml` namespace. Open the saved file in any DGML viewer
//! to inspect a frame's pass dependencies.

use std::fmt::Write as _;
use std::io;
use std::path::Path;

/// Layout direction hint for DGML viewers.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum GraphDirection {
    #[default]
    Default,
    TopToBottom,
    BottomToTop,
    LeftToRight,
    RightToLeft,
}

impl GraphDirection {
    fn name(self) -> Option<&'static str> {
        match self {
            Self::Default => None,
            Self::TopToBottom => Some("TopToBottom"),
            Self::BottomToTop => Some("BottomToTop"),
            Self::LeftToRight => Some("LeftToRight"),
            Self::RightToLeft => Some("RightToLeft"),
        }
    }
}

/// A graph node: one render pass.
#[derive(Clone, Debug)]
pub struct Node {
    pub id: String,
    pub label: String,
}

/// A directed edge; the label names the resource that caused the dependency.
#[derive(Clone, Debug)]
pub struct Link {
    pub source: String,
    pub target: String,
    pub label: String,
}

/// A DGML document.
pub struct Graph {
    title: String,
    direction: GraphDirection,
    nodes: Vec<Node>,
    links: Vec<Link>,
}

impl Graph {
    #[must_use]
    pub fn new(title: &str, direction: GraphDirection) -> Self {
        Self {
            title: title.to_owned(),
            direction,
            nodes: Vec::new(),
            links: Vec::new(),
        }
    }

    pub fn add_node(&mut self, id: &str, label: &str) {
        self.nodes.push(Node {
            id: id.to_owned(),
            label: label.to_owned(),
        });
    }

    pub fn add_link(&mut self, source: &str, target: &str, label: &str) {
        self.links.push(Link {
            source: source.to_owned(),
            target: target.to_owned(),
            label: label.to_owned(),
        });
    }

    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    #[must_use]
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// The complete document, prolog included.
    #[must_use]
    pub fn to_xml_string(&self) -> String {
        let mut out = String::new();
        out.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");

        begin_element(&mut out, "DirectedGraph");
        attribute(&mut out, "Title", &self.title);
        if let Some(direction) = self.direction.name() {
            attribute(&mut out, "Layout", "Sugiyama");
            attribute(&mut out, "GraphDirection", direction);
        }
        attribute(&mut out, "xmlns", "http://schemas.microsoft.com/vs/2009/dgml");
        close_element(&mut out);

        begin_element(&mut out, "Nodes");
        close_element(&mut out);
        for node in &self.nodes {
            begin_element(&mut out, "Node");
            attribute(&mut out, "Id", &node.id);
            attribute(&mut out, "Label", &node.label);
            end_close_element(&mut out);
        }
        end_element(&mut out, "Nodes");

        begin_element(&mut out, "Links");
        close_element(&mut out);
        for link in &self.links {
            begin_element(&mut out, "Link");
            attribute(&mut out, "Source", &link.source);
            attribute(&mut out, "Target", &link.target);
            attribute(&mut out, "Label", &link.label);
            end_close_element(&mut out);
        }
        end_element(&mut out, "Links");

        end_element(&mut out, "DirectedGraph");
        out
    }

    pub fn serialize(&self, writer: &mut dyn io::Write) -> io::Result<()> {
        writer.write_all(self.to_xml_string().as_bytes())
    }

    pub fn save_as(&self, path: &Path) -> io::Result<()> {
        let mut file = std::fs::File::create(path)?;
        self.serialize(&mut file)
    }
}

// ============================================================================
// XML Writer
// ============================================================================

fn begin_element(out: &mut String, name: &str) {
    let _ = write!(out, "<{name}");
}

fn close_element(out: &mut String) {
    out.push_str(">\n");
}

fn end_close_element(out: &mut String) {
    out.push_str(" />\n");
}

fn end_element(out: &mut String, name: &str) {
    let _ = writeln!(out, "</{name}>");
}

/// Writes ` Name="Value"`, escaped. Empty values are skipped entirely, which
/// is how unlabeled links end up without a `Label` attribute.
fn attribute(out: &mut String, name: &str, value: &str) {
    if value.is_empty() {
        return;
    }
    let _ = write!(out, " {name}=\"");
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::{Graph, GraphDirection};

    #[test]
    fn prolog_and_namespace() {
        let graph = Graph::new("Frame", GraphDirection::Default);
        let xml = graph.to_xml_string();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
        assert!(xml.contains("xmlns=\"http://schemas.microsoft.com/vs/2009/dgml\""));
        assert!(xml.ends_with("</DirectedGraph>\n"));
    }

    #[test]
    fn attribute_escaping() {
        let mut graph = Graph::new("a & b", GraphDirection::Default);
        graph.add_node("n<1>", "\"quoted\"");
        let xml = graph.to_xml_string();
        assert!(xml.contains("Title=\"a &amp; b\""));
        assert!(xml.contains("Id=\"n&lt;1&gt;\""));
        assert!(xml.contains("Label=\"&quot;quoted&quot;\""));
    }

    #[test]
    fn empty_label_is_skipped() {
        let mut graph = Graph::new("Frame", GraphDirection::Default);
        graph.add_link("A", "B", "");
        let xml = graph.to_xml_string();
        assert!(xml.contains("<Link Source=\"A\" Target=\"B\" />"));
        assert!(!xml.contains("Label"));
    }

    #[test]
    fn direction_adds_layout() {
        let graph = Graph::new("Frame", GraphDirection::LeftToRight);
        let xml = graph.to_xml_string();
        assert!(xml.contains("Layout=\"Sugiyama\""));
        assert!(xml.contains("GraphDirection=\"LeftToRight\""));
    }
}
