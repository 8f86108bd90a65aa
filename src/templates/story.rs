//! Story captions: centered and uppercase like the primary template, but the
//! spoken word keeps its white fill and glows instead of changing color.

use crate::fit::{clamped_font_size, FitRequest, TextTransform};
use crate::highlight::highlighted_token_index;
use crate::scene::{
    Easing, Element, Layout, Node, Rgba, Shadow, Stroke, Style, Transition, TransitionProperty,
    WhiteSpace,
};
use crate::schema::Page;

use super::{entrance_transform, token_key, RenderContext, RenderParams};

pub const MAX_FONT_SIZE: f64 = 82.0;
pub const FIT_WIDTH_RATIO: f64 = 0.92;
pub const STROKE: Stroke = Stroke {
    width: 20.0,
    color: Rgba::BLACK,
};
pub const ACTIVE_GLOW: [Shadow; 2] = [
    Shadow::glow(25.0, Rgba::WHITE),
    Shadow::glow(40.0, Rgba::WHITE),
];

const GLOW_TRANSITION: Transition = Transition {
    property: TransitionProperty::TextShadow,
    duration_ms: 200,
    easing: Easing::EaseOut,
};

// Fitted without the uppercase transform even though the text renders uppercase.
pub fn font_size(context: &RenderContext<'_>, page: &Page) -> f64 {
    clamped_font_size(
        context.measurer,
        FitRequest {
            text: &page.text,
            within_width: context.width * FIT_WIDTH_RATIO,
            text_transform: TextTransform::None,
        },
        MAX_FONT_SIZE,
    )
}

pub fn render(context: &RenderContext<'_>, params: &RenderParams<'_>) -> Node {
    let page = params.page;
    let highlighted = highlighted_token_index(page, params.time_in_ms);

    let words = page.tokens.iter().enumerate().map(|(index, token)| {
        let active = highlighted == Some(index);
        Node::from(
            Element::span()
                .with_key(token_key(token.from_ms))
                .with_style(Style {
                    layout: Some(Layout::Inline),
                    white_space: Some(WhiteSpace::Pre),
                    color: Some(Rgba::WHITE),
                    text_stroke: Some(STROKE),
                    text_shadow: Some(if active {
                        ACTIVE_GLOW.to_vec()
                    } else {
                        Vec::new()
                    }),
                    transitions: vec![GLOW_TRANSITION],
                    ..Style::default()
                })
                .with_child(Node::text(token.text.as_str())),
        )
    });

    let block = Element::block()
        .with_style(Style {
            font_size: Some(font_size(context, page)),
            color: Some(Rgba::WHITE),
            text_stroke: Some(STROKE),
            stroke_under_fill: true,
            transform: Some(entrance_transform(params.enter_progress)),
            font_family: Some(context.measurer.family().to_owned()),
            text_transform: Some(TextTransform::Uppercase),
            ..Style::default()
        })
        .with_child(Element::span().with_children(words));

    Element::fill()
        .with_style(Style {
            layout: Some(Layout::Centered),
            ..Style::default()
        })
        .with_child(block)
        .into()
}
