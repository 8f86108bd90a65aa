//! Centered bold uppercase captions; the spoken word switches to the accent color.

use crate::fit::{clamped_font_size, FitRequest, TextTransform};
use crate::highlight::highlighted_token_index;
use crate::scene::{Element, Layout, Node, Rgba, Stroke, Style, WhiteSpace};
use crate::schema::Page;

use super::{entrance_transform, token_key, RenderContext, RenderParams};

pub const MAX_FONT_SIZE: f64 = 120.0;
pub const FIT_WIDTH_RATIO: f64 = 0.9;
pub const HIGHLIGHT_COLOR: Rgba = Rgba::rgb(0x39, 0xE5, 0x08);
pub const STROKE: Stroke = Stroke {
    width: 20.0,
    color: Rgba::BLACK,
};

pub fn font_size(context: &RenderContext<'_>, page: &Page) -> f64 {
    clamped_font_size(
        context.measurer,
        FitRequest {
            text: &page.text,
            within_width: context.width * FIT_WIDTH_RATIO,
            text_transform: TextTransform::Uppercase,
        },
        MAX_FONT_SIZE,
    )
}

pub fn render(context: &RenderContext<'_>, params: &RenderParams<'_>) -> Node {
    let page = params.page;
    let highlighted = highlighted_token_index(page, params.time_in_ms);
    let transform = entrance_transform(params.enter_progress);

    let words = page.tokens.iter().enumerate().map(|(index, token)| {
        let active = highlighted == Some(index);
        Node::from(
            Element::span()
                .with_key(token_key(token.from_ms))
                .with_style(Style {
                    layout: Some(Layout::Inline),
                    white_space: Some(WhiteSpace::Pre),
                    color: Some(if active { HIGHLIGHT_COLOR } else { Rgba::WHITE }),
                    ..Style::default()
                })
                .with_child(Node::text(token.text.as_str())),
        )
    });

    // The entrance transform sits on both the block and the run container,
    // so the pop-in compounds.
    let runs = Element::span()
        .with_style(Style {
            transform: Some(transform),
            ..Style::default()
        })
        .with_children(words);

    let block = Element::block()
        .with_style(Style {
            font_size: Some(font_size(context, page)),
            color: Some(Rgba::WHITE),
            text_stroke: Some(STROKE),
            stroke_under_fill: true,
            transform: Some(transform),
            font_family: Some(context.measurer.family().to_owned()),
            text_transform: Some(TextTransform::Uppercase),
            ..Style::default()
        })
        .with_child(runs);

    Element::fill()
        .with_style(Style {
            layout: Some(Layout::Centered),
            ..Style::default()
        })
        .with_child(block)
        .into()
}
