use captionfx::animation::enter_progress;
use captionfx::fit::{TextMeasurer, SAMPLE_FONT_SIZE};
use captionfx::highlight::highlighted_token_index;
use captionfx::page::PageRenderer;
use captionfx::scene::Node;
use captionfx::schema::{Page, TemplateId, Token};
use captionfx::templates::{
    bottom_bar, render_composite, select_template, story, tiktok, RenderContext, RenderParams,
    TemplateFn,
};

/// Glyphs a full em wide: makes fitted sizes easy to predict.
struct WideMeasurer;

impl TextMeasurer for WideMeasurer {
    fn measure_width(&self, text: &str, font_size: f64) -> f64 {
        text.chars().count() as f64 * font_size
    }

    fn family(&self) -> &str {
        "Wide"
    }
}

fn sentence(start_ms: f64, words: &[&str], word_ms: f64) -> Page {
    let tokens = words
        .iter()
        .enumerate()
        .map(|(index, word)| {
            let from = start_ms + index as f64 * word_ms;
            Token::new(*word, from, from + word_ms)
        })
        .collect();
    Page::from_tokens(start_ms, tokens)
}

fn font_sizes(node: &Node) -> Vec<f64> {
    node.elements()
        .into_iter()
        .filter_map(|element| element.style.font_size)
        .collect()
}

#[test]
fn resolver_matches_the_worked_example() {
    let page = Page::from_tokens(
        1000.0,
        vec![
            Token::new("hi", 1000.0, 1500.0),
            Token::new("there", 1500.0, 1900.0),
        ],
    );
    assert_eq!(highlighted_token_index(&page, 200.0), Some(0));
    assert_eq!(highlighted_token_index(&page, 600.0), Some(1));
    assert_eq!(highlighted_token_index(&page, 1000.0), None);
}

#[test]
fn font_size_never_exceeds_template_maximum() {
    let templates: [(TemplateFn, f64); 3] = [
        (tiktok::render, tiktok::MAX_FONT_SIZE),
        (bottom_bar::render, bottom_bar::MAX_FONT_SIZE),
        (story::render, story::MAX_FONT_SIZE),
    ];
    let captions: [&[&str]; 3] = [
        &["a"],
        &["two", " words"],
        &["much", " longer", " caption", " line"],
    ];
    let measurer = WideMeasurer;

    for width in [200, 720, 1080, 4096, 16_384] {
        let context = RenderContext::new(width, 1920, &measurer);
        for words in captions {
            let page = sentence(0.0, words, 300.0);
            let params = RenderParams {
                page: &page,
                time_in_ms: 100.0,
                enter_progress: 1.0,
            };
            for (render, max) in templates {
                for size in font_sizes(&render(&context, &params)) {
                    assert!(size <= max, "width {width}: {size} > {max}");
                    assert!(size > 0.0);
                }
            }
        }
    }
}

#[test]
fn fitted_size_is_used_when_below_the_maximum() {
    let measurer = WideMeasurer;
    let context = RenderContext::new(1000, 1920, &measurer);
    // 20 glyphs at 100px measure 2000px; 900px of room fits 45px.
    let page = sentence(0.0, &["abcdefghij", "klmnopqrst"], 300.0);
    let params = RenderParams {
        page: &page,
        time_in_ms: 0.0,
        enter_progress: 1.0,
    };
    let sizes = font_sizes(&tiktok::render(&context, &params));
    assert_eq!(sizes.len(), 1);
    assert!((sizes[0] - 900.0 / (20.0 * SAMPLE_FONT_SIZE) * SAMPLE_FONT_SIZE).abs() < 1e-9);
}

#[test]
fn selector_falls_back_for_unknown_identifiers() {
    let default = tiktok::render as TemplateFn as usize;
    for raw in ["", "story", "BOTTOM_KARAOKE", "tiktok "] {
        assert_eq!(select_template(raw) as usize, default, "{raw:?}");
    }
    assert_eq!(
        select_template("bottom_karaoke") as usize,
        render_composite as TemplateFn as usize
    );
}

#[test]
fn entrance_progress_pops_in_within_five_frames() {
    assert_eq!(enter_progress(0, 30), 0.0);
    assert!(enter_progress(5, 30) > 0.99);
    for frame in 0..90 {
        let progress = enter_progress(frame, 30);
        assert!((0.0..=1.0).contains(&progress), "frame {frame}: {progress}");
    }
}

#[test]
fn composite_frame_carries_both_layers() {
    let measurer = WideMeasurer;
    let mut renderer = PageRenderer::new(RenderContext::new(1080, 1920, &measurer), 30);
    let page = sentence(2000.0, &["one", " two", " three"], 250.0);

    let sample = renderer.render_frame(&page, "bottom_karaoke", 9);
    assert_eq!(sample.template, TemplateId::BottomKaraoke);
    assert_eq!(sample.active_token, Some(1));

    let root = sample.tree.as_element().expect("root element");
    let fragment = root.children[0].as_element().expect("fragment");
    assert_eq!(fragment.children.len(), 2);
    assert_eq!(fragment.children[0].text_content(), page.text);
    assert_eq!(fragment.children[1].text_content(), page.text);

    let sizes = font_sizes(&sample.tree);
    assert_eq!(sizes.len(), 2);
    assert!(sizes[0] <= tiktok::MAX_FONT_SIZE);
    assert!(sizes[1] <= bottom_bar::MAX_FONT_SIZE);
}
