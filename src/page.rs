use serde::Serialize;
use tracing::trace;

use crate::animation::{enter_progress, FrameClock};
use crate::highlight::highlighted_token_index;
use crate::scene::{Element, Node, Style};
use crate::schema::{Page, TemplateId};
use crate::templates::{RenderContext, RenderParams, TemplateSelector};

/// Everything produced for one frame of a page.
#[derive(Debug, Clone, Serialize)]
pub struct FrameSample {
    pub frame: u32,
    pub elapsed_ms: f64,
    pub enter_progress: f64,
    pub active_token: Option<usize>,
    pub template: TemplateId,
    pub tree: Node,
}

/// Drives the templates from a frame counter. `frame` counts from the first
/// frame the page is on screen.
pub struct PageRenderer<'a> {
    context: RenderContext<'a>,
    clock: FrameClock,
    selector: TemplateSelector,
}

impl<'a> PageRenderer<'a> {
    pub fn new(context: RenderContext<'a>, fps: u32) -> Self {
        Self {
            context,
            clock: FrameClock::new(fps),
            selector: TemplateSelector::new(),
        }
    }

    pub fn render_frame(&mut self, page: &Page, template: &str, frame: u32) -> FrameSample {
        let elapsed_ms = self.clock.elapsed_ms(frame);
        let progress = enter_progress(frame, self.clock.fps);
        let (template, render) = self.selector.select(template);
        let params = RenderParams {
            page,
            time_in_ms: elapsed_ms,
            enter_progress: progress,
        };

        let tree = Element::fill()
            .with_style(Style {
                width: Some(self.context.width),
                height: Some(self.context.height),
                ..Style::default()
            })
            .with_child(render(&self.context, &params))
            .into();
        let active_token = highlighted_token_index(page, elapsed_ms);
        trace!(frame, elapsed_ms, progress, ?active_token, %template, "rendered frame");

        FrameSample {
            frame,
            elapsed_ms,
            enter_progress: progress,
            active_token,
            template,
            tree,
        }
    }

    /// Every frame of the page's on-screen window, in order.
    pub fn render_page(&mut self, page: &Page, template: &str) -> Vec<FrameSample> {
        (0..page.frame_count(self.clock.fps))
            .map(|frame| self.render_frame(page, template, frame))
            .collect()
    }

    pub fn template_resolutions(&self) -> u32 {
        self.selector.resolutions()
    }
}
