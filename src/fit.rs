use serde::Serialize;

/// Size the measurer is sampled at; fitted sizes scale linearly from it.
pub const SAMPLE_FONT_SIZE: f64 = 100.0;

/// Single-line advance width of text at a given pixel size.
pub trait TextMeasurer {
    fn measure_width(&self, text: &str, font_size: f64) -> f64;

    fn family(&self) -> &str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextTransform {
    None,
    Uppercase,
}

impl TextTransform {
    pub fn apply(self, text: &str) -> String {
        match self {
            Self::None => text.to_owned(),
            Self::Uppercase => text.to_uppercase(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FitRequest<'a> {
    pub text: &'a str,
    pub within_width: f64,
    pub text_transform: TextTransform,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FittedText {
    /// Largest size at which the text fits. Infinite when the text has no width.
    pub font_size: f64,
}

pub fn fit_text(measurer: &dyn TextMeasurer, request: FitRequest<'_>) -> FittedText {
    let text = request.text_transform.apply(request.text);
    let sampled = measurer.measure_width(&text, SAMPLE_FONT_SIZE);
    let font_size = if sampled > 0.0 {
        request.within_width / sampled * SAMPLE_FONT_SIZE
    } else {
        f64::INFINITY
    };
    FittedText { font_size }
}

/// Fits `request` and caps the result at `max_font_size`.
pub fn clamped_font_size(
    measurer: &dyn TextMeasurer,
    request: FitRequest<'_>,
    max_font_size: f64,
) -> f64 {
    fit_text(measurer, request).font_size.min(max_font_size)
}

/// Metric-free fallback used when no font file is configured.
#[derive(Debug, Clone)]
pub struct AverageAdvanceMeasurer {
    family: String,
    advance_em: f64,
    space_em: f64,
}

impl Default for AverageAdvanceMeasurer {
    fn default() -> Self {
        Self {
            family: "sans-serif".to_owned(),
            advance_em: 0.6,
            space_em: 0.3,
        }
    }
}

impl TextMeasurer for AverageAdvanceMeasurer {
    fn measure_width(&self, text: &str, font_size: f64) -> f64 {
        text.chars()
            .filter(|ch| !ch.is_control())
            .map(|ch| {
                if ch.is_whitespace() {
                    self.space_em
                } else {
                    self.advance_em
                }
            })
            .sum::<f64>()
            * font_size
    }

    fn family(&self) -> &str {
        &self.family
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Uppercase letters are twice as wide as everything else.
    struct CaseSensitiveMeasurer;

    impl TextMeasurer for CaseSensitiveMeasurer {
        fn measure_width(&self, text: &str, font_size: f64) -> f64 {
            text.chars()
                .map(|ch| if ch.is_uppercase() { 1.0 } else { 0.5 })
                .sum::<f64>()
                * font_size
        }

        fn family(&self) -> &str {
            "test"
        }
    }

    #[test]
    fn fitted_size_fills_the_available_width() {
        let fitted = fit_text(
            &CaseSensitiveMeasurer,
            FitRequest {
                text: "abcd",
                within_width: 400.0,
                text_transform: TextTransform::None,
            },
        );
        assert!((fitted.font_size - 200.0).abs() < 1e-9);
    }

    #[test]
    fn uppercase_transform_is_measured() {
        let request = FitRequest {
            text: "abcd",
            within_width: 400.0,
            text_transform: TextTransform::Uppercase,
        };
        assert!((fit_text(&CaseSensitiveMeasurer, request).font_size - 100.0).abs() < 1e-9);
    }

    #[test]
    fn clamp_never_exceeds_the_maximum() {
        let request = FitRequest {
            text: "ab",
            within_width: 10_000.0,
            text_transform: TextTransform::None,
        };
        assert!(fit_text(&CaseSensitiveMeasurer, request).font_size > 120.0);
        assert_eq!(clamped_font_size(&CaseSensitiveMeasurer, request, 120.0), 120.0);

        let narrow = FitRequest {
            within_width: 20.0,
            ..request
        };
        assert!((clamped_font_size(&CaseSensitiveMeasurer, narrow, 120.0) - 20.0).abs() < 1e-9);
    }

    #[test]
    fn empty_text_fits_at_the_maximum() {
        let request = FitRequest {
            text: "",
            within_width: 500.0,
            text_transform: TextTransform::Uppercase,
        };
        assert!(fit_text(&CaseSensitiveMeasurer, request).font_size.is_infinite());
        assert_eq!(clamped_font_size(&CaseSensitiveMeasurer, request, 82.0), 82.0);
    }

    #[test]
    fn average_measurer_treats_spaces_as_narrow() {
        let measurer = AverageAdvanceMeasurer::default();
        assert!((measurer.measure_width("ab c", 10.0) - 21.0).abs() < 1e-9);
    }
}
