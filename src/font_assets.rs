use std::fs;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use fontdue::{Font, FontSettings};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::fit::TextMeasurer;
use crate::schema::Page;

pub const FONT_ASSET_HASH_MISMATCH: &str = "FONT_ASSET_HASH_MISMATCH";

pub fn read_font_bytes(path: &Path, pinned_sha256: Option<&str>) -> Result<Vec<u8>> {
    let bytes =
        fs::read(path).with_context(|| format!("failed to read font file '{}'", path.display()))?;

    if let Some(expected) = pinned_sha256 {
        let actual = sha256_hex(&bytes);
        if !actual.eq_ignore_ascii_case(expected.trim()) {
            bail!(
                "{}: {} expected sha256={} actual sha256={}",
                FONT_ASSET_HASH_MISMATCH,
                path.display(),
                expected.trim(),
                actual
            );
        }
    }

    Ok(bytes)
}

/// Caption font with real glyph metrics.
pub struct FontMeasurer {
    font: Font,
    family: String,
}

impl FontMeasurer {
    pub fn load(path: &Path, pinned_sha256: Option<&str>) -> Result<Self> {
        let bytes = read_font_bytes(path, pinned_sha256)?;
        let family = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "caption".to_owned());
        Self::from_bytes(bytes, family)
            .with_context(|| format!("failed to load caption font '{}'", path.display()))
    }

    pub fn from_bytes(bytes: Vec<u8>, family: impl Into<String>) -> Result<Self> {
        let family = family.into();
        let font = Font::from_bytes(bytes, FontSettings::default())
            .map_err(|error| anyhow!("failed to parse font {family}: {error}"))?;
        debug!(%family, glyphs = font.glyph_count(), "loaded caption font");
        Ok(Self { font, family })
    }

    /// Characters in `text` the font has no glyph for.
    pub fn missing_codepoints(&self, text: &str) -> Vec<char> {
        let mut missing = text
            .chars()
            .filter(|ch| !ch.is_whitespace() && !ch.is_control())
            .filter(|ch| self.font.lookup_glyph_index(*ch) == 0)
            .collect::<Vec<_>>();
        missing.sort_unstable();
        missing.dedup();
        missing
    }

    pub fn warn_missing_codepoints(&self, pages: &[Page]) {
        for (index, page) in pages.iter().enumerate() {
            let missing = self.missing_codepoints(&page.text.to_uppercase());
            if !missing.is_empty() {
                let listed = missing
                    .iter()
                    .map(|ch| format!("U+{:04X}", *ch as u32))
                    .collect::<Vec<_>>()
                    .join(", ");
                warn!(page = index, font = %self.family, "missing glyphs: {listed}");
            }
        }
    }
}

impl TextMeasurer for FontMeasurer {
    fn measure_width(&self, text: &str, font_size: f64) -> f64 {
        let px = font_size as f32;
        let mut width = 0.0_f32;
        let mut previous = None;
        for ch in text.chars().filter(|ch| !ch.is_control()) {
            if let Some(left) = previous {
                width += self.font.horizontal_kern(left, ch, px).unwrap_or(0.0);
            }
            width += self.font.metrics(ch, px).advance_width;
            previous = Some(ch);
        }
        f64::from(width)
    }

    fn family(&self) -> &str {
        &self.family
    }
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}
