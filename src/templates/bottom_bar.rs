//! Karaoke bar: a translucent panel pinned near the bottom edge. The spoken
//! word turns cyan and glows. The bar does not animate in.

use crate::fit::{clamped_font_size, FitRequest, TextTransform};
use crate::highlight::highlighted_token_index;
use crate::scene::{
    Easing, Element, Layout, Node, Padding, Position, Rgba, Shadow, Stroke, Style, TextAlign,
    Transition, TransitionProperty, WhiteSpace,
};
use crate::schema::Page;

use super::{token_key, RenderContext, RenderParams};

pub const MAX_FONT_SIZE: f64 = 82.0;
pub const FIT_WIDTH_RATIO: f64 = 0.92;
pub const BOTTOM_OFFSET: f64 = 72.0;
pub const BACKGROUND: Rgba = Rgba::rgba(0, 0, 0, 0.35);
pub const HIGHLIGHT_COLOR: Rgba = Rgba::rgb(0x00, 0xE5, 0xFF);
pub const STROKE: Stroke = Stroke {
    width: 3.0,
    color: Rgba::rgba(0, 0, 0, 0.8),
};
pub const ACTIVE_GLOW: Shadow = Shadow::glow(12.0, Rgba::rgba(0, 229, 255, 0.7));
pub const IDLE_SHADOW: Shadow = Shadow::glow(6.0, Rgba::rgba(0, 0, 0, 0.45));

const PANEL_SHADOW: Shadow = Shadow {
    offset_x: 0.0,
    offset_y: 6.0,
    blur: 20.0,
    color: Rgba::rgba(0, 0, 0, 0.25),
};
const TRANSITION_MS: u32 = 120;

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
        let (color, shadow) = if active {
            (HIGHLIGHT_COLOR, ACTIVE_GLOW)
        } else {
            (Rgba::WHITE, IDLE_SHADOW)
        };
        Node::from(
            Element::span()
                .with_key(token_key(token.from_ms))
                .with_style(Style {
                    layout: Some(Layout::Inline),
                    white_space: Some(WhiteSpace::PreWrap),
                    color: Some(color),
                    text_shadow: Some(vec![shadow]),
                    transitions: vec![
                        Transition {
                            property: TransitionProperty::Color,
                            duration_ms: TRANSITION_MS,
                            easing: Easing::Linear,
                        },
                        Transition {
                            property: TransitionProperty::TextShadow,
                            duration_ms: TRANSITION_MS,
                            easing: Easing::Linear,
                        },
                    ],
                    ..Style::default()
                })
                .with_child(Node::text(token.text.as_str())),
        )
    });

    let panel = Element::block()
        .with_style(Style {
            background: Some(BACKGROUND),
            border_radius: Some(8.0),
            padding: Some(Padding {
                vertical: 12.0,
                horizontal: 28.0,
            }),
            max_width: Some(context.width * FIT_WIDTH_RATIO),
            font_family: Some(context.measurer.family().to_owned()),
            font_size: Some(font_size(context, page)),
            line_height: Some(1.15),
            color: Some(Rgba::WHITE),
            text_stroke: Some(STROKE),
            text_align: Some(TextAlign::Center),
            text_transform: Some(TextTransform::None),
            box_shadow: vec![PANEL_SHADOW],
            ..Style::default()
        })
        .with_children(words);

    let row = Element::block()
        .with_style(Style {
            layout: Some(Layout::CenteredRow),
            position: Some(Position::Bottom {
                offset: BOTTOM_OFFSET,
            }),
            ..Style::default()
        })
        .with_child(panel);

    Element::fill()
        .with_style(Style {
            layout: Some(Layout::Centered),
            pointer_events_none: true,
            ..Style::default()
        })
        .with_child(row)
        .into()
}
