//! Visual tree handed to the host compositor.
//!
//! Nodes carry CSS-like styling. Only the properties a template sets are
//! populated, so serialized trees stay small and diffable frame to frame.

use std::fmt;

use serde::{Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    Element(Element),
    Text { text: String },
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(element) => Some(element),
            Self::Text { .. } => None,
        }
    }

    /// Every element in the subtree, depth-first, self included.
    pub fn elements(&self) -> Vec<&Element> {
        let mut out = Vec::new();
        collect_elements(self, &mut out);
        out
    }

    /// Concatenated text content of the subtree.
    pub fn text_content(&self) -> String {
        match self {
            Self::Text { text } => text.clone(),
            Self::Element(element) => element
                .children
                .iter()
                .map(Node::text_content)
                .collect(),
        }
    }
}

fn collect_elements<'a>(node: &'a Node, out: &mut Vec<&'a Element>) {
    if let Node::Element(element) = node {
        out.push(element);
        for child in &element.children {
            collect_elements(child, out);
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Self::Element(element)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    /// Covers the whole frame.
    Fill,
    Block,
    Span,
    /// Groups siblings without adding a box.
    Fragment,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Element {
    pub kind: ElementKind,
    /// Stable identity among siblings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub style: Style,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            key: None,
            style: Style::default(),
            children: Vec::new(),
        }
    }

    pub fn fill() -> Self {
        Self::new(ElementKind::Fill)
    }

    pub fn block() -> Self {
        Self::new(ElementKind::Block)
    }

    pub fn span() -> Self {
        Self::new(ElementKind::Span)
    }

    pub fn fragment() -> Self {
        Self::new(ElementKind::Fragment)
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(children);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Style {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<Layout>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding: Option<Padding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<Rgba>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub box_shadow: Vec<Shadow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Rgba>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_stroke: Option<Stroke>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub stroke_under_fill: bool,
    /// `Some(vec![])` clears an inherited shadow.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_shadow: Option<Vec<Shadow>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_transform: Option<crate::fit::TextTransform>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_align: Option<TextAlign>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub white_space: Option<WhiteSpace>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transform: Option<Transform>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub transitions: Vec<Transition>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub pointer_events_none: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    /// Flex box centering children on both axes.
    Centered,
    /// Flex row centering children horizontally.
    CenteredRow,
    Inline,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "anchor", rename_all = "snake_case")]
pub enum Position {
    /// Absolutely placed, spanning the full frame width, `offset` px above the bottom edge.
    Bottom { offset: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Padding {
    pub vertical: f64,
    pub horizontal: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAlign {
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WhiteSpace {
    Pre,
    PreWrap,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Stroke {
    pub width: f64,
    pub color: Rgba,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Shadow {
    pub offset_x: f64,
    pub offset_y: f64,
    pub blur: f64,
    pub color: Rgba,
}

impl Shadow {
    pub const fn glow(blur: f64, color: Rgba) -> Self {
        Self {
            offset_x: 0.0,
            offset_y: 0.0,
            blur,
            color,
        }
    }
}

/// Scale about the element center, then vertical translation in px.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Transform {
    pub scale: f64,
    pub translate_y: f64,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        scale: 1.0,
        translate_y: 0.0,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionProperty {
    Color,
    TextShadow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    Linear,
    EaseOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Transition {
    pub property: TransitionProperty,
    pub duration_ms: u32,
    pub easing: Easing,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const BLACK: Self = Self::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a >= 1.0 {
            write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
        }
    }
}

impl Serialize for Rgba {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
