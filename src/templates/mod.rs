//! Caption templates and the identifier table that selects between them.

pub mod bottom_bar;
pub mod story;
pub mod tiktok;

use tracing::debug;

use crate::animation::lerp_clamped;
use crate::fit::TextMeasurer;
use crate::scene::{Element, Node, Transform};
use crate::schema::{Page, TemplateId};

/// Output frame and font metrics shared by every render pass.
#[derive(Clone, Copy)]
pub struct RenderContext<'a> {
    pub width: f64,
    pub height: f64,
    pub measurer: &'a dyn TextMeasurer,
}

impl<'a> RenderContext<'a> {
    pub fn new(width: u32, height: u32, measurer: &'a dyn TextMeasurer) -> Self {
        Self {
            width: f64::from(width),
            height: f64::from(height),
            measurer,
        }
    }
}

/// Immutable input of one render pass.
#[derive(Debug, Clone, Copy)]
pub struct RenderParams<'a> {
    pub page: &'a Page,
    pub time_in_ms: f64,
    pub enter_progress: f64,
}

pub type TemplateFn = fn(&RenderContext<'_>, &RenderParams<'_>) -> Node;

pub const TEMPLATE_TABLE: [(TemplateId, TemplateFn); 4] = [
    (TemplateId::Tiktok, tiktok::render),
    (TemplateId::BottomKaraoke, render_composite),
    (TemplateId::BottomBar, bottom_bar::render),
    (TemplateId::TiktokStory, story::render),
];

pub fn template_fn(id: TemplateId) -> TemplateFn {
    TEMPLATE_TABLE
        .iter()
        .find(|(candidate, _)| *candidate == id)
        .map_or(tiktok::render, |(_, render)| *render)
}

/// Resolves a raw identifier, falling back to the default template.
pub fn resolve_template(raw: &str) -> TemplateId {
    TemplateId::parse(raw).unwrap_or_else(|| {
        debug!(requested = raw, fallback = %TemplateId::DEFAULT, "unknown template");
        TemplateId::DEFAULT
    })
}

pub fn select_template(raw: &str) -> TemplateFn {
    template_fn(resolve_template(raw))
}

/// Remembers the last resolved identifier so a frame loop only resolves on change.
#[derive(Debug, Default)]
pub struct TemplateSelector {
    cached: Option<(String, TemplateId)>,
    resolutions: u32,
}

impl TemplateSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&mut self, raw: &str) -> (TemplateId, TemplateFn) {
        let id = match &self.cached {
            Some((cached_raw, id)) if cached_raw == raw => *id,
            _ => {
                let id = resolve_template(raw);
                self.resolutions += 1;
                self.cached = Some((raw.to_owned(), id));
                id
            }
        };
        (id, template_fn(id))
    }

    /// Number of times an identifier was actually resolved.
    pub fn resolutions(&self) -> u32 {
        self.resolutions
    }
}

/// Primary centered captions with the karaoke bar stacked in the same frame.
pub fn render_composite(context: &RenderContext<'_>, params: &RenderParams<'_>) -> Node {
    Element::fragment()
        .with_child(tiktok::render(context, params))
        .with_child(bottom_bar::render(context, params))
        .into()
}

/// Pop-in transform: scale 0.8 -> 1 and drop 50px -> 0 as progress goes 0 -> 1.
pub fn entrance_transform(enter_progress: f64) -> Transform {
    Transform {
        scale: lerp_clamped(enter_progress, 0.8, 1.0),
        translate_y: lerp_clamped(enter_progress, 50.0, 0.0),
    }
}

pub(crate) fn token_key(from_ms: f64) -> String {
    format!("{from_ms}")
}
