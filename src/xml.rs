//! A small ordered element tree on top of quick-xml.
//!
//! The codec never looks at the event stream directly: [`XmlDocument::parse`]
//! folds quick-xml events into [`XmlNode`]s, and the GPX entities read and
//! build those nodes. Rendering goes the other way.

use quick_xml::Reader;
use quick_xml::errors::IllFormedError;
use quick_xml::escape::{escape, unescape};
use quick_xml::events::{BytesRef, BytesStart, Event};

use crate::error::{GpxError, Result};
use crate::options::WriteOptions;

/// One XML element: name, ordered attributes, ordered child elements and its
/// own (trimmed) text content.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlNode {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
    pub text: String,
}

impl XmlNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Leaf element holding only text, e.g. `<name>Dollar Lake</name>`.
    pub fn with_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            ..Default::default()
        }
    }

    /// Element name without its namespace prefix.
    pub fn local_name(&self) -> &str {
        match self.name.split_once(':') {
            Some((_, local)) => local,
            None => &self.name,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Set an attribute, replacing an existing one in place so attribute order is stable.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    /// First child element with the given local name.
    pub fn child(&self, name: &str) -> Option<&XmlNode> {
        self.children_named(name).next()
    }

    /// All child elements with the given local name, in document order.
    pub fn children_named<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a XmlNode> {
        self.children
            .iter()
            .filter(move |child| child.local_name() == name)
    }

    /// Text of the first matching child; `None` when the child is absent or empty.
    pub fn child_value(&self, name: &str) -> Option<&str> {
        self.child(name)
            .map(|child| child.text.as_str())
            .filter(|text| !text.is_empty())
    }

    /// Depth-first search below this node (the node itself is not considered).
    pub fn first_descendant(&self, name: &str) -> Option<&XmlNode> {
        find_descendant(&self.children, name)
    }

    pub fn append_child(&mut self, child: XmlNode) {
        self.children.push(child);
    }

    pub fn append_children(&mut self, children: impl IntoIterator<Item = XmlNode>) {
        self.children.extend(children);
    }
}

fn find_descendant<'a>(nodes: &'a [XmlNode], name: &str) -> Option<&'a XmlNode> {
    for node in nodes {
        if node.local_name() == name {
            return Some(node);
        }
        if let Some(found) = find_descendant(&node.children, name) {
            return Some(found);
        }
    }
    None
}

/// The outer wrapper around the top-level element(s) of a parsed or
/// to-be-rendered document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlDocument {
    pub children: Vec<XmlNode>,
}

impl XmlDocument {
    pub fn with_root(root: XmlNode) -> Self {
        Self {
            children: vec![root],
        }
    }

    pub fn root(&self) -> Option<&XmlNode> {
        self.children.first()
    }

    pub fn first_descendant(&self, name: &str) -> Option<&XmlNode> {
        find_descendant(&self.children, name)
    }

    /// Build the element tree for an XML string.
    ///
    /// Comments, processing instructions, the declaration and doctype are
    /// dropped. Text is unescaped and trimmed. Structural problems come back
    /// as [`GpxError::Xml`] exactly as quick-xml reports them.
    pub fn parse(xml: &str) -> Result<Self> {
        let xml = xml.strip_prefix('\u{feff}').unwrap_or(xml);
        let mut reader = Reader::from_str(xml);
        let mut document = XmlDocument::default();
        let mut open: Vec<XmlNode> = Vec::new();

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => open.push(start_node(&e)?),
                Ok(Event::Empty(e)) => {
                    let node = start_node(&e)?;
                    attach(&mut document, &mut open, node);
                }
                Ok(Event::End(_)) => {
                    // quick-xml has already checked that the end tag matches.
                    if let Some(mut node) = open.pop() {
                        let trimmed = node.text.trim();
                        if trimmed.len() != node.text.len() {
                            node.text = trimmed.to_string();
                        }
                        attach(&mut document, &mut open, node);
                    }
                }
                Ok(Event::Text(e)) => {
                    if let Some(node) = open.last_mut() {
                        node.text.push_str(&String::from_utf8_lossy(&e));
                    }
                }
                Ok(Event::CData(e)) => {
                    if let Some(node) = open.last_mut() {
                        node.text.push_str(&String::from_utf8_lossy(&e));
                    }
                }
                Ok(Event::GeneralRef(e)) => {
                    if let Some(node) = open.last_mut() {
                        push_reference(&mut node.text, &e);
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(GpxError::Xml(e)),
                _ => {}
            }
        }

        if let Some(unclosed) = open.pop() {
            return Err(GpxError::Xml(quick_xml::Error::IllFormed(
                IllFormedError::MissingEndTag(unclosed.name),
            )));
        }

        Ok(document)
    }

    /// Render the tree as XML text.
    pub fn to_xml_string(&self, options: &WriteOptions) -> String {
        let mut out = String::new();
        if options.xml_declaration {
            out.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
            if options.indent > 0 {
                out.push('\n');
            }
        }
        for node in &self.children {
            write_node(&mut out, node, 0, options.indent);
            if options.indent > 0 {
                out.push('\n');
            }
        }
        out
    }
}

fn start_node(e: &BytesStart<'_>) -> Result<XmlNode> {
    let mut node = XmlNode::new(String::from_utf8_lossy(e.name().as_ref()));
    for attr_result in e.attributes() {
        let attr = attr_result.map_err(|e| GpxError::Xml(e.into()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let raw = String::from_utf8_lossy(&attr.value);
        let value = unescape(&raw).map_err(|e| GpxError::Xml(e.into()))?;
        node.attributes.push((key, value.into_owned()));
    }
    Ok(node)
}

fn attach(document: &mut XmlDocument, open: &mut [XmlNode], node: XmlNode) {
    match open.last_mut() {
        Some(parent) => parent.children.push(node),
        None => document.children.push(node),
    }
}

/// Resolve `&...;` in text content: character references and the five
/// predefined entities. Anything else is kept verbatim.
fn push_reference(text: &mut String, e: &BytesRef<'_>) {
    if let Ok(Some(ch)) = e.resolve_char_ref() {
        text.push(ch);
        return;
    }
    let name = String::from_utf8_lossy(e);
    match &*name {
        "amp" => text.push('&'),
        "lt" => text.push('<'),
        "gt" => text.push('>'),
        "quot" => text.push('"'),
        "apos" => text.push('\''),
        other => {
            text.push('&');
            text.push_str(other);
            text.push(';');
        }
    }
}

fn write_node(out: &mut String, node: &XmlNode, depth: usize, indent: usize) {
    push_indent(out, depth, indent);
    out.push('<');
    out.push_str(&node.name);
    for (key, value) in &node.attributes {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        out.push_str(&escape(value.as_str()));
        out.push('"');
    }

    if node.children.is_empty() && node.text.is_empty() {
        out.push_str("/>");
        return;
    }

    out.push('>');
    out.push_str(&escape(node.text.as_str()));
    if !node.children.is_empty() {
        for child in &node.children {
            if indent > 0 {
                out.push('\n');
            }
            write_node(out, child, depth + 1, indent);
        }
        if indent > 0 {
            out.push('\n');
            push_indent(out, depth, indent);
        }
    }
    out.push_str("</");
    out.push_str(&node.name);
    out.push('>');
}

fn push_indent(out: &mut String, depth: usize, indent: usize) {
    out.extend(std::iter::repeat_n(' ', depth * indent));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_attributes_and_children() {
        let xml = r#"<?xml version="1.0"?>
<gpx creator="test">
  <wpt lat="45.1" lon="-121.7">
    <name>Dollar Lake</name>
    <ele>1823</ele>
  </wpt>
</gpx>"#;
        let doc = XmlDocument::parse(xml).unwrap();
        let gpx = doc.root().unwrap();
        assert_eq!(gpx.name, "gpx");
        assert_eq!(gpx.attribute("creator"), Some("test"));
        assert_eq!(gpx.text, "");

        let wpt = gpx.child("wpt").unwrap();
        assert_eq!(wpt.attribute("lat"), Some("45.1"));
        assert_eq!(wpt.attribute("lon"), Some("-121.7"));
        assert_eq!(wpt.attribute("ele"), None);
        assert_eq!(wpt.child_value("name"), Some("Dollar Lake"));
        assert_eq!(wpt.child_value("ele"), Some("1823"));
        assert_eq!(wpt.child_value("desc"), None);
    }

    #[test]
    fn test_children_named_keeps_order() {
        let xml = r#"<trk><trkseg id="a"/><name>x</name><trkseg id="b"/><trkseg id="c"/></trk>"#;
        let doc = XmlDocument::parse(xml).unwrap();
        let ids: Vec<&str> = doc
            .root()
            .unwrap()
            .children_named("trkseg")
            .filter_map(|n| n.attribute("id"))
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_empty_child_has_no_value() {
        let doc = XmlDocument::parse("<wpt><desc>   </desc><sym/></wpt>").unwrap();
        let wpt = doc.root().unwrap();
        assert!(wpt.child("desc").is_some());
        assert_eq!(wpt.child_value("desc"), None);
        assert_eq!(wpt.child_value("sym"), None);
    }

    #[test]
    fn test_entities_and_cdata() {
        let xml = r#"<wpt note="a &amp; b"><name>Wy&apos;East &#66;asin</name><desc><![CDATA[<b>bold</b>]]></desc></wpt>"#;
        let doc = XmlDocument::parse(xml).unwrap();
        let wpt = doc.root().unwrap();
        assert_eq!(wpt.attribute("note"), Some("a & b"));
        assert_eq!(wpt.child_value("name"), Some("Wy'East Basin"));
        assert_eq!(wpt.child_value("desc"), Some("<b>bold</b>"));
    }

    #[test]
    fn test_namespaced_names_match_by_local_name() {
        let xml = r#"<gpx:gpx xmlns:gpx="http://www.topografix.com/GPX/1/1"><gpx:wpt lat="1" lon="2"/></gpx:gpx>"#;
        let doc = XmlDocument::parse(xml).unwrap();
        let gpx = doc.first_descendant("gpx").unwrap();
        assert_eq!(gpx.local_name(), "gpx");
        assert_eq!(
            gpx.attribute("xmlns:gpx"),
            Some("http://www.topografix.com/GPX/1/1")
        );
        assert!(gpx.child("wpt").is_some());
    }

    #[test]
    fn test_first_descendant_is_depth_first() {
        let xml = r#"<outer><a><gpx id="deep"/></a><gpx id="shallow"/></outer>"#;
        let doc = XmlDocument::parse(xml).unwrap();
        assert_eq!(
            doc.first_descendant("gpx").unwrap().attribute("id"),
            Some("deep")
        );
        assert!(doc.first_descendant("trk").is_none());
    }

    #[test]
    fn test_bom_and_comments_ignored() {
        let xml = "\u{feff}<?xml version=\"1.0\"?><!-- made by hand --><gpx><?pi data?></gpx>";
        let doc = XmlDocument::parse(xml).unwrap();
        assert_eq!(doc.children.len(), 1);
        assert!(doc.root().unwrap().children.is_empty());
    }

    #[test]
    fn test_mismatched_end_tag_is_xml_error() {
        let err = XmlDocument::parse("<gpx><wpt></trk></gpx>").unwrap_err();
        assert!(matches!(err, GpxError::Xml(_)));
    }

    #[test]
    fn test_unclosed_element_is_xml_error() {
        let err = XmlDocument::parse("<gpx><wpt lat=\"1\" lon=\"2\">").unwrap_err();
        assert!(matches!(err, GpxError::Xml(_)));
    }

    #[test]
    fn test_set_attribute_replaces_in_place() {
        let mut node = XmlNode::new("wpt");
        node.set_attribute("lat", "1");
        node.set_attribute("lon", "2");
        node.set_attribute("lat", "3");
        assert_eq!(
            node.attributes,
            vec![
                ("lat".to_string(), "3".to_string()),
                ("lon".to_string(), "2".to_string())
            ]
        );
    }

    #[test]
    fn test_render_compact() {
        let mut wpt = XmlNode::new("wpt");
        wpt.set_attribute("lat", "1.5");
        wpt.append_child(XmlNode::with_text("name", "A & B"));
        let mut gpx = XmlNode::new("gpx");
        gpx.append_children(vec![wpt, XmlNode::new("trk")]);

        let text = XmlDocument::with_root(gpx).to_xml_string(&WriteOptions::compact());
        assert_eq!(
            text,
            r#"<gpx><wpt lat="1.5"><name>A &amp; B</name></wpt><trk/></gpx>"#
        );
    }

    #[test]
    fn test_render_indented_with_declaration() {
        let mut gpx = XmlNode::new("gpx");
        gpx.set_attribute("creator", "\"me\"");
        gpx.append_child(XmlNode::with_text("name", "x"));

        let text = XmlDocument::with_root(gpx).to_xml_string(&WriteOptions::default());
        let expected = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
                        <gpx creator=\"&quot;me&quot;\">\n  <name>x</name>\n</gpx>\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_render_then_parse_is_same_tree() {
        let mut pt = XmlNode::new("trkpt");
        pt.set_attribute("lat", "45.41");
        pt.set_attribute("lon", "-121.713");
        pt.append_child(XmlNode::with_text("ele", "1777"));
        let mut seg = XmlNode::new("trkseg");
        seg.append_child(pt);
        let mut trk = XmlNode::new("trk");
        trk.append_child(XmlNode::with_text("name", "<Barrett> 'Spur'"));
        trk.append_child(seg);
        let original = XmlDocument::with_root(trk);

        let reparsed = XmlDocument::parse(&original.to_xml_string(&WriteOptions::default())).unwrap();
        assert_eq!(reparsed, original);
    }
}
