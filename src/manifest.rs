use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use tracing::{debug, warn};

use crate::fit::{AverageAdvanceMeasurer, TextMeasurer};
use crate::font_assets::FontMeasurer;
use crate::schema::{OverlayManifest, Page};

/// A manifest with its caption pages loaded and every path resolved.
#[derive(Debug, Clone)]
pub struct LoadedOverlay {
    pub manifest: OverlayManifest,
    pub pages: Vec<Page>,
}

impl LoadedOverlay {
    pub fn token_count(&self) -> usize {
        self.pages.iter().map(|page| page.tokens.len()).sum()
    }

    pub fn page(&self, index: usize) -> Result<&Page> {
        self.pages.get(index).ok_or_else(|| {
            anyhow!(
                "page {} out of range; captions define {} page(s)",
                index,
                self.pages.len()
            )
        })
    }

    /// Font metrics for fitting. Falls back to average advances without a font.
    pub fn measurer(&self) -> Result<Box<dyn TextMeasurer>> {
        match &self.manifest.font {
            Some(font) => {
                let measurer = FontMeasurer::load(&font.path, font.sha256.as_deref())?;
                measurer.warn_missing_codepoints(&self.pages);
                Ok(Box::new(measurer))
            }
            None => {
                warn!("no font configured; fitting with average glyph advances");
                Ok(Box::new(AverageAdvanceMeasurer::default()))
            }
        }
    }
}

pub fn load_and_validate_manifest(path: &Path) -> Result<LoadedOverlay> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read manifest {}", path.display()))?;
    let mut manifest: OverlayManifest = serde_yaml::from_str(&contents).map_err(|error| {
        let location = error
            .location()
            .map(|location| format!("line {}, column {}", location.line(), location.column()))
            .unwrap_or_else(|| "unknown location".to_owned());
        anyhow!(
            "failed to parse yaml in {} at {}: {}",
            path.display(),
            location,
            error
        )
    })?;

    validate_manifest(&mut manifest, path)?;
    let pages = load_captions(&manifest.captions)?;
    debug!(
        manifest = %path.display(),
        pages = pages.len(),
        template = manifest.template.as_str(),
        "loaded overlay manifest"
    );
    Ok(LoadedOverlay { manifest, pages })
}

fn validate_manifest(manifest: &mut OverlayManifest, manifest_path: &Path) -> Result<()> {
    manifest.environment.validate()?;

    let manifest_dir = manifest_path
        .parent()
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);

    manifest.captions = resolve_and_validate_path(&manifest_dir, &manifest.captions, "captions")?;
    if let Some(font) = &mut manifest.font {
        font.path = resolve_and_validate_path(&manifest_dir, &font.path, "font.path")?;
    }

    Ok(())
}

pub fn load_captions(path: &Path) -> Result<Vec<Page>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read captions {}", path.display()))?;
    let pages: Vec<Page> = serde_json::from_str(&contents).map_err(|error| {
        anyhow!(
            "failed to parse captions json in {} at line {}, column {}: {}",
            path.display(),
            error.line(),
            error.column(),
            error
        )
    })?;

    if pages.is_empty() {
        bail!("captions {} must define at least one page", path.display());
    }

    for (index, page) in pages.iter().enumerate() {
        page.validate()
            .with_context(|| format!("failed validating caption page {index}"))?;
        for (left, right) in page.overlapping_tokens() {
            warn!(
                page = index,
                "tokens {left} and {right} overlap; the earlier token wins while both are active"
            );
        }
    }

    Ok(pages)
}

fn resolve_and_validate_path(manifest_dir: &Path, path: &Path, field_name: &str) -> Result<PathBuf> {
    let resolved = if path.is_absolute() {
        path.to_path_buf()
    } else {
        manifest_dir.join(path)
    };

    if !resolved.exists() {
        bail!("{} does not exist: {}", field_name, resolved.display());
    }

    if !resolved.is_file() {
        bail!("{} is not a file: {}", field_name, resolved.display());
    }

    Ok(resolved)
}
