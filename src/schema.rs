use std::fmt;
use std::path::PathBuf;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OverlayManifest {
    pub environment: Environment,
    #[serde(default)]
    pub template: TemplateName,
    pub captions: PathBuf,
    #[serde(default)]
    pub font: Option<FontSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Environment {
    pub resolution: Resolution,
    pub fps: u32,
}

impl Environment {
    pub fn validate(&self) -> Result<()> {
        if self.resolution.width == 0 || self.resolution.height == 0 {
            bail!(
                "resolution must be positive, got {}x{}",
                self.resolution.width,
                self.resolution.height
            );
        }

        if self.fps == 0 {
            bail!("fps must be > 0");
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FontSpec {
    pub path: PathBuf,
    #[serde(default)]
    pub sha256: Option<String>,
}

/// Raw template identifier as written by the user. Kept as a string so that
/// unknown identifiers survive loading and fall back at selection time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct TemplateName(pub String);

impl Default for TemplateName {
    fn default() -> Self {
        Self(TemplateId::DEFAULT.as_str().to_owned())
    }
}

impl TemplateName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateId {
    Tiktok,
    BottomKaraoke,
    BottomBar,
    TiktokStory,
}

impl TemplateId {
    pub const DEFAULT: Self = Self::Tiktok;

    pub const ALL: [Self; 4] = [
        Self::Tiktok,
        Self::BottomKaraoke,
        Self::BottomBar,
        Self::TiktokStory,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tiktok => "tiktok",
            Self::BottomKaraoke => "bottom_karaoke",
            Self::BottomBar => "bottom_bar",
            Self::TiktokStory => "tiktok_story",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.as_str() == raw)
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Tiktok => "centered bold uppercase, accent color on the spoken word",
            Self::BottomKaraoke => "tiktok overlaid with the karaoke bottom bar",
            Self::BottomBar => "karaoke bar on a translucent panel near the bottom edge",
            Self::TiktokStory => "centered uppercase, spoken word glows white",
        }
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub text: String,
    pub from_ms: f64,
    pub to_ms: f64,
}

impl Token {
    pub fn new(text: impl Into<String>, from_ms: f64, to_ms: f64) -> Self {
        Self {
            text: text.into(),
            from_ms,
            to_ms,
        }
    }

    pub fn contains(&self, absolute_ms: f64) -> bool {
        self.from_ms <= absolute_ms && self.to_ms > absolute_ms
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub text: String,
    pub start_ms: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<f64>,
    pub tokens: Vec<Token>,
}

impl Page {
    /// Builds a page whose text is the concatenation of its tokens.
    pub fn from_tokens(start_ms: f64, tokens: Vec<Token>) -> Self {
        let text = tokens.iter().map(|token| token.text.as_str()).collect();
        Self {
            text,
            start_ms,
            duration_ms: None,
            tokens,
        }
    }

    /// Absolute time at which the page leaves the screen.
    pub fn end_ms(&self) -> f64 {
        match self.duration_ms {
            Some(duration) => self.start_ms + duration,
            None => self
                .tokens
                .iter()
                .map(|token| token.to_ms)
                .fold(self.start_ms, f64::max),
        }
    }

    pub fn frame_count(&self, fps: u32) -> u32 {
        let window = (self.end_ms() - self.start_ms).max(0.0);
        let frames = (window * f64::from(fps) / 1000.0).ceil();
        frames.max(1.0) as u32
    }

    pub fn validate(&self) -> Result<()> {
        if !self.start_ms.is_finite() {
            bail!("startMs must be finite");
        }
        if let Some(duration) = self.duration_ms {
            if !duration.is_finite() || duration < 0.0 {
                bail!("durationMs must be a finite value >= 0, got {duration}");
            }
        }
        for (index, token) in self.tokens.iter().enumerate() {
            if !token.from_ms.is_finite() || !token.to_ms.is_finite() {
                bail!("token {index} ('{}') has non-finite timing", token.text);
            }
            if token.to_ms < token.from_ms {
                bail!(
                    "token {index} ('{}') ends before it starts: fromMs={} toMs={}",
                    token.text,
                    token.from_ms,
                    token.to_ms
                );
            }
        }
        Ok(())
    }

    /// Index pairs of neighbouring tokens whose windows overlap or run backwards.
    pub fn overlapping_tokens(&self) -> Vec<(usize, usize)> {
        self.tokens
            .windows(2)
            .enumerate()
            .filter(|(_, pair)| pair[1].from_ms < pair[0].to_ms)
            .map(|(index, _)| (index, index + 1))
            .collect()
    }
}
