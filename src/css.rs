//! Stylesheet engine – parses the compiled CSS text and resolves a flat
//! [`ComputedStyle`] per element for the layout engine.
//!
//! The selector surface is exactly what the theme compiler emits: element
//! selectors, single-class selectors, and `tr:nth-child(even)` for row
//! striping, plus an `@page` rule fixing the page geometry. Anything fancier
//! is skipped with a debug log. Color values are validated strictly at parse
//! time: a stylesheet carrying a malformed color is rejected as a whole,
//! which is how a bad theme color aborts the document instead of rendering
//! half-styled.

use std::collections::HashMap;

use crate::dom::{DomNode, ElementNode, Tag};
use crate::error::RenderError;

// ---------------------------------------------------------------------------
// Colors and lengths
// ---------------------------------------------------------------------------

/// RGBA color, components 0.0 – 1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Self = Self { r: 0.0, g: 0.0, b: 0.0, a: 1.0 };
    pub const WHITE: Self = Self { r: 1.0, g: 1.0, b: 1.0, a: 1.0 };
    pub const TRANSPARENT: Self = Self { r: 0.0, g: 0.0, b: 0.0, a: 0.0 };

    pub fn is_transparent(&self) -> bool {
        self.a < 0.001
    }

    /// Parse `#rgb`, `#rrggbb`, or a small set of named colors.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if let Some(hex) = value.strip_prefix('#') {
            return Self::from_hex_digits(hex);
        }
        match value.to_ascii_lowercase().as_str() {
            "white" => Some(Self::WHITE),
            "black" => Some(Self::BLACK),
            "transparent" => Some(Self::TRANSPARENT),
            "red" => Some(Self { r: 1.0, g: 0.0, b: 0.0, a: 1.0 }),
            "green" => Some(Self { r: 0.0, g: 0.5, b: 0.0, a: 1.0 }),
            "blue" => Some(Self { r: 0.0, g: 0.0, b: 1.0, a: 1.0 }),
            "yellow" => Some(Self { r: 1.0, g: 1.0, b: 0.0, a: 1.0 }),
            "gray" | "grey" => Some(Self { r: 0.5, g: 0.5, b: 0.5, a: 1.0 }),
            _ => None,
        }
    }

    fn from_hex_digits(hex: &str) -> Option<Self> {
        let channel = |s: &str| u8::from_str_radix(s, 16).ok().map(|v| v as f32 / 255.0);
        match hex.len() {
            6 => Some(Self {
                r: channel(&hex[0..2])?,
                g: channel(&hex[2..4])?,
                b: channel(&hex[4..6])?,
                a: 1.0,
            }),
            3 => Some(Self {
                r: channel(&hex[0..1].repeat(2))?,
                g: channel(&hex[1..2].repeat(2))?,
                b: channel(&hex[2..3].repeat(2))?,
                a: 1.0,
            }),
            _ => None,
        }
    }
}

const MM_TO_PT: f32 = 72.0 / 25.4;

/// Parse a CSS length into points. `px` maps 1:1 to pt (the PDF renderer
/// works at 72 dpi); bare numbers are taken as points.
pub fn parse_length_pt(value: &str) -> Option<f32> {
    let value = value.trim();
    if let Some(v) = value.strip_suffix("pt") {
        return v.trim().parse().ok();
    }
    if let Some(v) = value.strip_suffix("px") {
        return v.trim().parse().ok();
    }
    if let Some(v) = value.strip_suffix("mm") {
        return v.trim().parse::<f32>().ok().map(|n| n * MM_TO_PT);
    }
    if let Some(v) = value.strip_suffix("in") {
        return v.trim().parse::<f32>().ok().map(|n| n * 72.0);
    }
    value.parse().ok()
}

/// Width/height dimension.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Dimension {
    #[default]
    Auto,
    Pt(f32),
    Percent(f32),
}

pub fn parse_dimension(value: &str) -> Dimension {
    let value = value.trim();
    if value == "auto" {
        Dimension::Auto
    } else if let Some(p) = value.strip_suffix('%') {
        p.trim()
            .parse::<f32>()
            .map(Dimension::Percent)
            .unwrap_or(Dimension::Auto)
    } else {
        parse_length_pt(value).map(Dimension::Pt).unwrap_or(Dimension::Auto)
    }
}

// ---------------------------------------------------------------------------
// Page geometry
// ---------------------------------------------------------------------------

/// Geometry from the `@page` rule. Defaults to A4 with a 20 mm margin, the
/// fixed geometry the theme compiler emits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width_pt: f32,
    pub height_pt: f32,
    pub margin_pt: f32,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            // A4: 210 mm × 297 mm
            width_pt: 595.28,
            height_pt: 841.89,
            margin_pt: 20.0 * MM_TO_PT,
        }
    }
}

impl PageGeometry {
    pub fn content_width(&self) -> f32 {
        self.width_pt - 2.0 * self.margin_pt
    }

    pub fn content_height(&self) -> f32 {
        self.height_pt - 2.0 * self.margin_pt
    }
}

// ---------------------------------------------------------------------------
// Stylesheet model
// ---------------------------------------------------------------------------

/// A simple selector: element name, class name, or `element:nth-child(even)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Element(String),
    Class(String),
    NthChildEven(String),
}

impl Selector {
    /// Parse one selector. Returns `None` for forms outside the supported
    /// surface (descendant combinators, ids, attribute selectors).
    fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() || text.contains(char::is_whitespace) {
            return None;
        }
        if let Some(class) = text.strip_prefix('.') {
            if class.is_empty() || class.contains('.') || class.contains(':') {
                return None;
            }
            return Some(Selector::Class(class.to_string()));
        }
        if let Some((element, pseudo)) = text.split_once(':') {
            if pseudo == "nth-child(even)" {
                return Some(Selector::NthChildEven(element.to_string()));
            }
            return None;
        }
        if text.contains('.') {
            return None;
        }
        Some(Selector::Element(text.to_string()))
    }
}

#[derive(Debug, Clone)]
pub struct Declaration {
    pub property: String,
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct Rule {
    pub selector: Selector,
    pub declarations: Vec<Declaration>,
}

/// A parsed stylesheet: page geometry plus an ordered rule list.
#[derive(Debug, Clone)]
pub struct Stylesheet {
    pub page: PageGeometry,
    pub rules: Vec<Rule>,
}

impl Stylesheet {
    /// Parse CSS text, validating color values strictly.
    pub fn parse(css: &str) -> Result<Self, RenderError> {
        let css = strip_comments(css);
        let mut page = PageGeometry::default();
        let mut rules = Vec::new();

        let mut rest = css.as_str();
        while let Some(open) = rest.find('{') {
            let selector_text = rest[..open].trim().to_string();
            let close = rest[open + 1..]
                .find('}')
                .ok_or_else(|| RenderError::Stylesheet("unbalanced `{` in stylesheet".into()))?;
            let body = &rest[open + 1..open + 1 + close];
            rest = &rest[open + close + 2..];

            let declarations = parse_declarations(body)?;

            if selector_text == "@page" {
                apply_page_declarations(&mut page, &declarations);
                continue;
            }

            for sel_text in selector_text.split(',') {
                match Selector::parse(sel_text) {
                    Some(selector) => rules.push(Rule {
                        selector,
                        declarations: declarations.clone(),
                    }),
                    None => {
                        log::debug!("skipping unsupported selector `{}`", sel_text.trim());
                    }
                }
            }
        }
        if !rest.trim().is_empty() {
            return Err(RenderError::Stylesheet(format!(
                "trailing content outside rules: `{}`",
                rest.trim()
            )));
        }

        Ok(Self { page, rules })
    }

    /// Base style for the document root: defaults plus any `body` rules.
    /// Inherited text properties flow from here into every element.
    pub fn body_style(&self) -> ComputedStyle {
        let mut style = ComputedStyle::default();
        for rule in &self.rules {
            if rule.selector == Selector::Element("body".into()) {
                for decl in &rule.declarations {
                    apply_declaration(&mut style, &decl.property, &decl.value);
                }
            }
        }
        style
    }
}

fn strip_comments(css: &str) -> String {
    let mut out = String::with_capacity(css.len());
    let mut rest = css;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        match rest[start..].find("*/") {
            Some(end) => rest = &rest[start + end + 2..],
            None => return out,
        }
    }
    out.push_str(rest);
    out
}

fn parse_declarations(body: &str) -> Result<Vec<Declaration>, RenderError> {
    let mut declarations = Vec::new();
    for decl in body.split(';') {
        let decl = decl.trim();
        if decl.is_empty() {
            continue;
        }
        let Some((property, value)) = decl.split_once(':') else {
            continue;
        };
        let property = property.trim().to_ascii_lowercase();
        let value = value.trim().to_string();
        validate_colors(&property, &value)?;
        declarations.push(Declaration { property, value });
    }
    Ok(declarations)
}

/// Strict color validation for the composed stylesheet. A color slot that
/// does not parse rejects the whole document.
fn validate_colors(property: &str, value: &str) -> Result<(), RenderError> {
    let invalid = |value: &str| RenderError::InvalidColor {
        property: property.to_string(),
        value: value.to_string(),
    };

    match property {
        "color" | "background-color" | "background" | "border-color" => {
            if Color::parse(value).is_none() {
                return Err(invalid(value));
            }
        }
        "border" | "border-top" | "border-right" | "border-bottom" | "border-left" => {
            for token in value.split_whitespace() {
                if matches!(token, "solid" | "dashed" | "dotted" | "none")
                    || parse_length_pt(token).is_some()
                {
                    continue;
                }
                if Color::parse(token).is_none() {
                    return Err(invalid(token));
                }
            }
        }
        _ => {}
    }
    Ok(())
}

fn apply_page_declarations(page: &mut PageGeometry, declarations: &[Declaration]) {
    for decl in declarations {
        match decl.property.as_str() {
            "size" => match decl.value.to_ascii_lowercase().as_str() {
                "a4" => {
                    page.width_pt = 595.28;
                    page.height_pt = 841.89;
                }
                "letter" => {
                    page.width_pt = 612.0;
                    page.height_pt = 792.0;
                }
                other => {
                    let parts: Vec<&str> = other.split_whitespace().collect();
                    if parts.len() == 2 {
                        if let (Some(w), Some(h)) =
                            (parse_length_pt(parts[0]), parse_length_pt(parts[1]))
                        {
                            page.width_pt = w;
                            page.height_pt = h;
                        }
                    }
                }
            },
            "margin" => {
                if let Some(m) = parse_length_pt(&decl.value) {
                    page.margin_pt = m;
                }
            }
            _ => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Computed style
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Display {
    Block,
    Flex,
    Inline,
    InlineBlock,
    ListItem,
    Table,
    TableRow,
    TableCell,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlexDirection {
    Row,
    Column,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JustifyContent {
    Start,
    End,
    Center,
    SpaceBetween,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignItems {
    Start,
    End,
    Center,
    Stretch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontWeight {
    Normal,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    Normal,
    Italic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextDecoration {
    None,
    Underline,
}

/// One border edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub width: f32,
    pub color: Color,
}

impl Edge {
    pub const NONE: Self = Self { width: 0.0, color: Color::BLACK };

    pub fn is_visible(&self) -> bool {
        self.width > 0.05
    }
}

/// Fully resolved style for a single element.
#[derive(Debug, Clone)]
pub struct ComputedStyle {
    pub display: Display,
    pub flex_direction: FlexDirection,
    pub justify_content: JustifyContent,
    pub align_items: AlignItems,
    pub gap: f32,
    pub flex_grow: f32,
    pub flex_shrink: f32,

    pub width: Dimension,
    pub height: Dimension,
    pub max_width: Dimension,
    pub max_height: Dimension,

    pub margin_top: f32,
    pub margin_right: f32,
    pub margin_bottom: f32,
    pub margin_left: f32,
    pub padding_top: f32,
    pub padding_right: f32,
    pub padding_bottom: f32,
    pub padding_left: f32,

    pub border_top: Edge,
    pub border_right: Edge,
    pub border_bottom: Edge,
    pub border_left: Edge,

    pub font_family: String,
    pub font_size: f32,
    pub font_weight: FontWeight,
    pub font_style: FontStyle,
    pub line_height: f32,
    pub color: Color,
    pub text_align: TextAlign,
    pub text_decoration: TextDecoration,

    pub background_color: Color,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self {
            display: Display::Block,
            flex_direction: FlexDirection::Row,
            justify_content: JustifyContent::Start,
            align_items: AlignItems::Stretch,
            gap: 0.0,
            flex_grow: 0.0,
            flex_shrink: 1.0,
            width: Dimension::Auto,
            height: Dimension::Auto,
            max_width: Dimension::Auto,
            max_height: Dimension::Auto,
            margin_top: 0.0,
            margin_right: 0.0,
            margin_bottom: 0.0,
            margin_left: 0.0,
            padding_top: 0.0,
            padding_right: 0.0,
            padding_bottom: 0.0,
            padding_left: 0.0,
            border_top: Edge::NONE,
            border_right: Edge::NONE,
            border_bottom: Edge::NONE,
            border_left: Edge::NONE,
            font_family: "Helvetica, Arial, sans-serif".to_string(),
            font_size: 10.0,
            font_weight: FontWeight::Normal,
            font_style: FontStyle::Normal,
            line_height: 1.4,
            color: Color { r: 0.2, g: 0.2, b: 0.2, a: 1.0 },
            text_align: TextAlign::Left,
            text_decoration: TextDecoration::None,
            background_color: Color::TRANSPARENT,
        }
    }
}

/// Tag-intrinsic defaults, applied before stylesheet rules.
fn base_style_for_tag(tag: &Tag) -> ComputedStyle {
    let mut s = ComputedStyle::default();
    match tag {
        Tag::H1 => {
            s.font_size = 24.0;
            s.font_weight = FontWeight::Bold;
            s.margin_top = 12.0;
            s.margin_bottom = 10.0;
        }
        Tag::H2 => {
            s.font_size = 18.0;
            s.font_weight = FontWeight::Bold;
            s.margin_top = 10.0;
            s.margin_bottom = 8.0;
        }
        Tag::H3 => {
            s.font_size = 14.0;
            s.font_weight = FontWeight::Bold;
            s.margin_top = 8.0;
            s.margin_bottom = 6.0;
        }
        Tag::P => {
            s.margin_bottom = 6.0;
        }
        Tag::Ul | Tag::Ol => {
            s.margin_bottom = 6.0;
            s.padding_left = 18.0;
        }
        Tag::Li => {
            s.display = Display::ListItem;
            s.margin_bottom = 3.0;
        }
        Tag::Table => {
            s.display = Display::Table;
        }
        Tag::Tr => {
            s.display = Display::TableRow;
        }
        Tag::Td | Tag::Th => {
            s.display = Display::TableCell;
            if *tag == Tag::Th {
                s.font_weight = FontWeight::Bold;
            }
        }
        Tag::Span | Tag::Br => {
            s.display = Display::Inline;
        }
        Tag::Strong => {
            s.display = Display::Inline;
            s.font_weight = FontWeight::Bold;
        }
        Tag::Em => {
            s.display = Display::Inline;
            s.font_style = FontStyle::Italic;
        }
        Tag::Img => {
            s.display = Display::InlineBlock;
        }
        Tag::Div | Tag::Body | Tag::Html | Tag::Head => {}
        Tag::Unknown(_) => {
            // Unrecognised elements (scripts pasted into fragments, etc.)
            // take no part in layout.
            s.display = Display::None;
        }
    }
    s
}

// ---------------------------------------------------------------------------
// Cascade
// ---------------------------------------------------------------------------

/// Resolve the style for one element.
///
/// Cascade order: tag defaults, inherited text properties, element rules,
/// `nth-child(even)` rules, class rules, inline `style` attribute.
/// `child_index` is the element's 1-based position among its parent's
/// element children (for the striping selector).
pub fn resolve_style(
    element: &ElementNode,
    parent: Option<&ComputedStyle>,
    sheet: &Stylesheet,
    child_index: usize,
) -> ComputedStyle {
    let mut style = base_style_for_tag(&element.tag);

    if let Some(p) = parent {
        style.font_family = p.font_family.clone();
        style.font_size = match element.tag {
            Tag::H1 | Tag::H2 | Tag::H3 => style.font_size,
            _ => p.font_size,
        };
        style.font_weight = match element.tag {
            Tag::Strong | Tag::Th | Tag::H1 | Tag::H2 | Tag::H3 => style.font_weight,
            _ => p.font_weight,
        };
        style.font_style = match element.tag {
            Tag::Em => style.font_style,
            _ => p.font_style,
        };
        style.color = p.color;
        style.text_align = p.text_align;
        style.line_height = p.line_height;
    }

    let tag_name = element.tag.selector_name();
    let classes = element.classes();

    // Element rules, then striping, then class rules – in source order
    // within each bucket.
    for rule in &sheet.rules {
        if matches!(&rule.selector, Selector::Element(name) if name == tag_name) {
            apply_rule(&mut style, rule);
        }
    }
    if child_index % 2 == 0 {
        for rule in &sheet.rules {
            if matches!(&rule.selector, Selector::NthChildEven(name) if name == tag_name) {
                apply_rule(&mut style, rule);
            }
        }
    }
    for rule in &sheet.rules {
        if matches!(&rule.selector, Selector::Class(name) if classes.contains(&name.as_str())) {
            apply_rule(&mut style, rule);
        }
    }

    if let Some(inline) = element.inline_style() {
        for decl in inline.split(';') {
            if let Some((prop, value)) = decl.split_once(':') {
                apply_declaration(&mut style, prop.trim(), value.trim());
            }
        }
    }

    style
}

fn apply_rule(style: &mut ComputedStyle, rule: &Rule) {
    for decl in &rule.declarations {
        apply_declaration(style, &decl.property, &decl.value);
    }
}

/// Apply a single declaration. Lenient: values that fail to parse leave the
/// style unchanged (strict color checking already happened at parse time for
/// stylesheet rules).
fn apply_declaration(s: &mut ComputedStyle, property: &str, value: &str) {
    match property {
        "display" => {
            s.display = match value {
                "block" => Display::Block,
                "flex" => Display::Flex,
                "inline" => Display::Inline,
                "inline-block" => Display::InlineBlock,
                "none" => Display::None,
                _ => s.display,
            }
        }
        "flex-direction" => {
            s.flex_direction = match value {
                "row" => FlexDirection::Row,
                "column" => FlexDirection::Column,
                _ => s.flex_direction,
            }
        }
        "justify-content" => {
            s.justify_content = match value {
                "flex-start" | "start" => JustifyContent::Start,
                "flex-end" | "end" => JustifyContent::End,
                "center" => JustifyContent::Center,
                "space-between" => JustifyContent::SpaceBetween,
                _ => s.justify_content,
            }
        }
        "align-items" => {
            s.align_items = match value {
                "flex-start" | "start" => AlignItems::Start,
                "flex-end" | "end" => AlignItems::End,
                "center" => AlignItems::Center,
                "stretch" => AlignItems::Stretch,
                _ => s.align_items,
            }
        }
        "gap" => {
            if let Some(v) = parse_length_pt(value) {
                s.gap = v;
            }
        }
        "flex-grow" => {
            if let Ok(v) = value.parse() {
                s.flex_grow = v;
            }
        }
        "flex-shrink" => {
            if let Ok(v) = value.parse() {
                s.flex_shrink = v;
            }
        }
        "width" => s.width = parse_dimension(value),
        "height" => s.height = parse_dimension(value),
        "max-width" => s.max_width = parse_dimension(value),
        "max-height" => s.max_height = parse_dimension(value),
        "margin" => apply_box_shorthand(
            value,
            [&mut s.margin_top, &mut s.margin_right, &mut s.margin_bottom, &mut s.margin_left],
        ),
        "margin-top" => apply_length(value, &mut s.margin_top),
        "margin-right" => apply_length(value, &mut s.margin_right),
        "margin-bottom" => apply_length(value, &mut s.margin_bottom),
        "margin-left" => apply_length(value, &mut s.margin_left),
        "padding" => apply_box_shorthand(
            value,
            [&mut s.padding_top, &mut s.padding_right, &mut s.padding_bottom, &mut s.padding_left],
        ),
        "padding-top" => apply_length(value, &mut s.padding_top),
        "padding-right" => apply_length(value, &mut s.padding_right),
        "padding-bottom" => apply_length(value, &mut s.padding_bottom),
        "padding-left" => apply_length(value, &mut s.padding_left),
        "border" => {
            if let Some(edge) = parse_border_shorthand(value) {
                s.border_top = edge;
                s.border_right = edge;
                s.border_bottom = edge;
                s.border_left = edge;
            }
        }
        "border-top" => {
            if let Some(edge) = parse_border_shorthand(value) {
                s.border_top = edge;
            }
        }
        "border-right" => {
            if let Some(edge) = parse_border_shorthand(value) {
                s.border_right = edge;
            }
        }
        "border-bottom" => {
            if let Some(edge) = parse_border_shorthand(value) {
                s.border_bottom = edge;
            }
        }
        "border-left" => {
            if let Some(edge) = parse_border_shorthand(value) {
                s.border_left = edge;
            }
        }
        "font-family" => s.font_family = value.to_string(),
        "font-size" => {
            if let Some(v) = parse_length_pt(value) {
                s.font_size = v;
            }
        }
        "font-weight" => {
            s.font_weight = match value {
                "bold" | "700" | "800" | "900" => FontWeight::Bold,
                "normal" | "400" => FontWeight::Normal,
                _ => s.font_weight,
            }
        }
        "font-style" => {
            s.font_style = match value {
                "italic" => FontStyle::Italic,
                "normal" => FontStyle::Normal,
                _ => s.font_style,
            }
        }
        "line-height" => {
            if let Ok(factor) = value.parse::<f32>() {
                s.line_height = factor;
            } else if let Some(pt) = parse_length_pt(value) {
                if s.font_size > 0.0 {
                    s.line_height = pt / s.font_size;
                }
            }
        }
        "color" => {
            if let Some(c) = Color::parse(value) {
                s.color = c;
            }
        }
        "text-align" => {
            s.text_align = match value {
                "left" => TextAlign::Left,
                "center" => TextAlign::Center,
                "right" => TextAlign::Right,
                _ => s.text_align,
            }
        }
        "text-decoration" => {
            s.text_decoration = match value {
                "underline" => TextDecoration::Underline,
                "none" => TextDecoration::None,
                _ => s.text_decoration,
            }
        }
        "background-color" | "background" => {
            if let Some(c) = Color::parse(value) {
                s.background_color = c;
            }
        }
        _ => {}
    }
}

fn apply_length(value: &str, slot: &mut f32) {
    if let Some(v) = parse_length_pt(value) {
        *slot = v;
    }
}

fn apply_box_shorthand(value: &str, [top, right, bottom, left]: [&mut f32; 4]) {
    let parts: Vec<f32> = value
        .split_whitespace()
        .filter_map(parse_length_pt)
        .collect();
    match parts.len() {
        1 => {
            *top = parts[0];
            *right = parts[0];
            *bottom = parts[0];
            *left = parts[0];
        }
        2 => {
            *top = parts[0];
            *bottom = parts[0];
            *right = parts[1];
            *left = parts[1];
        }
        4 => {
            *top = parts[0];
            *right = parts[1];
            *bottom = parts[2];
            *left = parts[3];
        }
        _ => {}
    }
}

fn parse_border_shorthand(value: &str) -> Option<Edge> {
    if value.trim() == "none" {
        return Some(Edge::NONE);
    }
    let mut width = 1.0;
    let mut color = Color::BLACK;
    for token in value.split_whitespace() {
        if matches!(token, "solid" | "dashed" | "dotted") {
            continue;
        }
        if let Some(w) = parse_length_pt(token) {
            width = w;
        } else if let Some(c) = Color::parse(token) {
            color = c;
        } else {
            return None;
        }
    }
    Some(Edge { width, color })
}

// ---------------------------------------------------------------------------
// Styled tree
// ---------------------------------------------------------------------------

/// A DOM node annotated with its computed style.
#[derive(Debug, Clone)]
pub enum StyledNode {
    Element {
        tag: Tag,
        style: ComputedStyle,
        children: Vec<StyledNode>,
        attrs: HashMap<String, String>,
    },
    Text {
        text: String,
        style: ComputedStyle,
    },
}

/// Build a styled tree, resolving the cascade top-down. The root inherits
/// from the stylesheet's `body` rule.
pub fn build_styled_tree(nodes: &[DomNode], sheet: &Stylesheet) -> Vec<StyledNode> {
    let body = sheet.body_style();
    style_children(nodes, &body, sheet)
}

fn style_children(
    nodes: &[DomNode],
    parent_style: &ComputedStyle,
    sheet: &Stylesheet,
) -> Vec<StyledNode> {
    let mut result = Vec::new();
    let mut element_index = 0usize;
    for node in nodes {
        match node {
            DomNode::Element(e) => {
                element_index += 1;
                let style = resolve_style(e, Some(parent_style), sheet, element_index);
                let children = style_children(&e.children, &style, sheet);
                result.push(StyledNode::Element {
                    tag: e.tag.clone(),
                    style,
                    children,
                    attrs: e.attributes.clone(),
                });
            }
            DomNode::Text(text) => {
                if !text.trim().is_empty() {
                    let mut style = parent_style.clone();
                    // Text runs carry only typography; box properties of the
                    // enclosing element must not repeat on the run itself.
                    style.background_color = Color::TRANSPARENT;
                    style.border_top = Edge::NONE;
                    style.border_right = Edge::NONE;
                    style.border_bottom = Edge::NONE;
                    style.border_left = Edge::NONE;
                    style.margin_top = 0.0;
                    style.margin_right = 0.0;
                    style.margin_bottom = 0.0;
                    style.margin_left = 0.0;
                    style.padding_top = 0.0;
                    style.padding_right = 0.0;
                    style.padding_bottom = 0.0;
                    style.padding_left = 0.0;
                    style.width = Dimension::Auto;
                    result.push(StyledNode::Text {
                        text: text.clone(),
                        style,
                    });
                }
            }
        }
    }
    result
}
