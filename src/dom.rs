//! HTML parser – converts the composed document markup into a simple DOM
//! tree.
//!
//! The structural template only emits a controlled subset of elements, but
//! header/footer fragments are user-authored, so the parser also accepts the
//! inline markup people actually paste into those blocks:
//! - Structural: div, p, h1-h3, ul, ol, li, table, tr, td, th, img, br
//! - Inline: span, strong, em, b, i
//! - Styling via `class` and `style` attributes
//!
//! Unknown tags are kept in the tree and hidden at style time.

use std::collections::HashMap;

// ---------------------------------------------------------------------------
// DOM types
// ---------------------------------------------------------------------------

/// The tag name of a supported element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Tag {
    Div,
    P,
    H1,
    H2,
    H3,
    Ul,
    Ol,
    Li,
    Table,
    Tr,
    Td,
    Th,
    Span,
    Strong,
    Em,
    Br,
    Img,
    Body,
    Html,
    Head,
    /// Unknown tags are kept but hidden at style resolution.
    Unknown(String),
}

impl Tag {
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "div" => Tag::Div,
            "p" => Tag::P,
            "h1" => Tag::H1,
            "h2" => Tag::H2,
            "h3" => Tag::H3,
            "ul" => Tag::Ul,
            "ol" => Tag::Ol,
            "li" => Tag::Li,
            "table" => Tag::Table,
            "tr" => Tag::Tr,
            "td" => Tag::Td,
            "th" => Tag::Th,
            "span" => Tag::Span,
            "strong" | "b" => Tag::Strong,
            "em" | "i" => Tag::Em,
            "br" => Tag::Br,
            "img" => Tag::Img,
            "body" => Tag::Body,
            "html" => Tag::Html,
            "head" => Tag::Head,
            _ => Tag::Unknown(s.to_string()),
        }
    }

    /// Elements that never have children.
    pub fn is_void(&self) -> bool {
        matches!(self, Tag::Img | Tag::Br)
    }

    pub fn is_inline(&self) -> bool {
        matches!(self, Tag::Span | Tag::Strong | Tag::Em | Tag::Br)
    }

    pub fn is_table_part(&self) -> bool {
        matches!(self, Tag::Table | Tag::Tr | Tag::Td | Tag::Th)
    }

    /// Name as written in a selector.
    pub fn selector_name(&self) -> &str {
        match self {
            Tag::Div => "div",
            Tag::P => "p",
            Tag::H1 => "h1",
            Tag::H2 => "h2",
            Tag::H3 => "h3",
            Tag::Ul => "ul",
            Tag::Ol => "ol",
            Tag::Li => "li",
            Tag::Table => "table",
            Tag::Tr => "tr",
            Tag::Td => "td",
            Tag::Th => "th",
            Tag::Span => "span",
            Tag::Strong => "strong",
            Tag::Em => "em",
            Tag::Br => "br",
            Tag::Img => "img",
            Tag::Body => "body",
            Tag::Html => "html",
            Tag::Head => "head",
            Tag::Unknown(name) => name,
        }
    }
}

/// A node in the DOM tree.
#[derive(Debug, Clone)]
pub enum DomNode {
    Element(ElementNode),
    Text(String),
}

/// An element node carrying tag, attributes, and children.
#[derive(Debug, Clone)]
pub struct ElementNode {
    pub tag: Tag,
    pub attributes: HashMap<String, String>,
    pub children: Vec<DomNode>,
}

impl ElementNode {
    pub fn new(tag: Tag) -> Self {
        Self {
            tag,
            attributes: HashMap::new(),
            children: Vec::new(),
        }
    }

    pub fn classes(&self) -> Vec<&str> {
        self.attributes
            .get("class")
            .map(|c| c.split_whitespace().collect())
            .unwrap_or_default()
    }

    pub fn inline_style(&self) -> Option<&str> {
        self.attributes.get("style").map(|s| s.as_str())
    }

    pub fn src(&self) -> Option<&str> {
        self.attributes.get("src").map(|s| s.as_str())
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().iter().any(|c| *c == class)
    }
}

// ---------------------------------------------------------------------------
// Parser – recursive descent over the controlled subset
// ---------------------------------------------------------------------------

/// Parse an HTML string into a list of DOM nodes.
///
/// Hand-written for the constrained inputs this crate composes; a full HTML5
/// parser would be overkill for the fixed template plus simple fragments.
pub fn parse_html(html: &str) -> Vec<DomNode> {
    let mut cursor = Cursor::new(html);
    cursor.parse_nodes()
}

struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn parse_nodes(&mut self) -> Vec<DomNode> {
        let mut nodes = Vec::new();
        loop {
            self.skip_inter_element_whitespace();
            if self.at_end() || self.peek("</") {
                break;
            }
            if let Some(node) = self.parse_node() {
                nodes.push(node);
            }
        }
        nodes
    }

    fn parse_node(&mut self) -> Option<DomNode> {
        if self.peek("<!--") {
            self.skip_comment();
            return None;
        }
        if self.peek("<!") || self.peek("<?") {
            // Doctype / processing instruction: skip to '>'.
            while !self.at_end() && !self.peek(">") {
                self.bump();
            }
            if !self.at_end() {
                self.bump();
            }
            return None;
        }
        if self.peek("<") {
            Some(self.parse_element())
        } else {
            Some(self.parse_text())
        }
    }

    fn parse_text(&mut self) -> DomNode {
        let start = self.pos;
        while !self.at_end() && !self.peek("<") {
            self.bump();
        }
        DomNode::Text(decode_entities(&self.input[start..self.pos]))
    }

    fn parse_element(&mut self) -> DomNode {
        self.bump(); // '<'
        let name = self.parse_name();
        let tag = Tag::parse(&name);
        let mut elem = ElementNode::new(tag.clone());

        loop {
            self.skip_whitespace();
            if self.at_end() || self.peek(">") || self.peek("/>") {
                break;
            }
            let (key, value) = self.parse_attribute();
            elem.attributes.insert(key, value);
        }

        if self.peek("/>") {
            self.pos += 2;
            return DomNode::Element(elem);
        }
        if self.peek(">") {
            self.bump();
        }
        if tag.is_void() {
            return DomNode::Element(elem);
        }

        elem.children = self.parse_nodes();

        // Consume the closing tag if present; a mismatched or missing close
        // simply ends the element.
        if self.peek("</") {
            self.pos += 2;
            self.parse_name();
            self.skip_whitespace();
            if self.peek(">") {
                self.bump();
            }
        }

        DomNode::Element(elem)
    }

    fn parse_name(&mut self) -> String {
        let start = self.pos;
        while let Some(c) = self.current() {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                self.bump();
            } else {
                break;
            }
        }
        self.input[start..self.pos].to_string()
    }

    fn parse_attribute(&mut self) -> (String, String) {
        let key = self.parse_name();
        self.skip_whitespace();
        if !self.peek("=") {
            return (key, String::new());
        }
        self.bump();
        self.skip_whitespace();
        (key, self.parse_attribute_value())
    }

    fn parse_attribute_value(&mut self) -> String {
        for quote in ['"', '\''] {
            if self.current() == Some(quote) {
                self.bump();
                let start = self.pos;
                while !self.at_end() && self.current() != Some(quote) {
                    self.bump();
                }
                let val = decode_entities(&self.input[start..self.pos]);
                if !self.at_end() {
                    self.bump();
                }
                return val;
            }
        }
        // Unquoted value.
        let start = self.pos;
        while let Some(c) = self.current() {
            if c.is_whitespace() || c == '>' || c == '/' {
                break;
            }
            self.bump();
        }
        self.input[start..self.pos].to_string()
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.current(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    /// Skip runs of whitespace between elements, but keep whitespace that is
    /// part of text content.
    fn skip_inter_element_whitespace(&mut self) {
        let saved = self.pos;
        self.skip_whitespace();
        if !self.at_end() && !self.peek("<") {
            self.pos = saved;
        }
    }

    fn skip_comment(&mut self) {
        self.pos += 4; // "<!--"
        while !self.at_end() && !self.peek("-->") {
            self.bump();
        }
        if !self.at_end() {
            self.pos += 3;
        }
    }

    fn peek(&self, s: &str) -> bool {
        self.input[self.pos..].starts_with(s)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn current(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) {
        if let Some(c) = self.current() {
            self.pos += c.len_utf8();
        }
    }
}

fn decode_entities(s: &str) -> String {
    s.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&nbsp;", "\u{00A0}")
}

/// Find the `<body>` element and return its children, or all nodes when no
/// `<body>` is present.
pub fn body_children(nodes: &[DomNode]) -> Vec<DomNode> {
    for node in nodes {
        if let DomNode::Element(e) = node {
            if e.tag == Tag::Body {
                return e.children.clone();
            }
            if e.tag == Tag::Html {
                let inner = body_children(&e.children);
                if !inner.is_empty() {
                    return inner;
                }
            }
        }
    }
    nodes.to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_div_with_classes() {
        let nodes = parse_html(r#"<div class="totals grand"><p>Total</p></div>"#);
        assert_eq!(nodes.len(), 1);
        let DomNode::Element(e) = &nodes[0] else {
            panic!("expected element");
        };
        assert_eq!(e.tag, Tag::Div);
        assert_eq!(e.classes(), vec!["totals", "grand"]);
        assert_eq!(e.children.len(), 1);
    }

    #[test]
    fn parse_void_elements() {
        let nodes = parse_html(r#"<img class="logo" src="logo.png" /><br>"#);
        assert_eq!(nodes.len(), 2);
        let DomNode::Element(img) = &nodes[0] else {
            panic!("expected img");
        };
        assert_eq!(img.tag, Tag::Img);
        assert_eq!(img.src(), Some("logo.png"));
        let DomNode::Element(br) = &nodes[1] else {
            panic!("expected br");
        };
        assert_eq!(br.tag, Tag::Br);
    }

    #[test]
    fn parse_inline_markup() {
        let nodes = parse_html("<p>Pay <strong>now</strong> or <em>later</em></p>");
        let DomNode::Element(p) = &nodes[0] else {
            panic!("expected p");
        };
        assert_eq!(p.children.len(), 4);
        assert!(matches!(
            &p.children[1],
            DomNode::Element(e) if e.tag == Tag::Strong
        ));
    }

    #[test]
    fn parse_table_rows() {
        let nodes = parse_html(
            "<table><tr><th>Item</th><th>Qty</th></tr><tr><td>A</td><td>1</td></tr></table>",
        );
        let DomNode::Element(table) = &nodes[0] else {
            panic!("expected table");
        };
        assert_eq!(table.tag, Tag::Table);
        assert_eq!(table.children.len(), 2);
    }

    #[test]
    fn entities_decode_in_text_and_attributes() {
        let nodes = parse_html(r#"<p title="A &amp; B">x &lt; y</p>"#);
        let DomNode::Element(p) = &nodes[0] else {
            panic!("expected p");
        };
        assert_eq!(p.attributes.get("title").unwrap(), "A & B");
        assert!(matches!(&p.children[0], DomNode::Text(t) if t == "x < y"));
    }

    #[test]
    fn unknown_tags_are_kept() {
        let nodes = parse_html("<script>alert(1)</script>");
        let DomNode::Element(e) = &nodes[0] else {
            panic!("expected element");
        };
        assert!(matches!(&e.tag, Tag::Unknown(name) if name == "script"));
    }
}
