//! Choosing the font a program starts with.

use std::path::PathBuf;

use crate::{FcError, FontResolver};

#[cfg(feature = "parsing")]
use crate::metrics::FontFace;

/// Family used when the requested font is not installed.
pub const DEFAULT_FAMILY: &str = "SimSun";

/// Resolves `requested`, falling back to [`DEFAULT_FAMILY`].
///
/// A missing default font is a configuration error the caller cannot
/// recover from, reported as [`FcError::DefaultFontMissing`].
pub fn select_font<R: FontResolver + ?Sized>(resolver: &R, requested: &str) -> Result<PathBuf, FcError> {
    if let Some(path) = resolver.resolve_single(requested) {
        log::debug!("Using {requested:?} from {}", path.display());
        return Ok(path);
    }

    log::warn!("Font {requested:?} is not installed, falling back to {DEFAULT_FAMILY:?}");

    resolver
        .resolve_single(DEFAULT_FAMILY)
        .ok_or_else(|| FcError::DefaultFontMissing {
            requested: String::from(requested),
            default: DEFAULT_FAMILY,
        })
}

/// A selected and parsed font at a fixed point size.
#[cfg(feature = "parsing")]
#[derive(Debug, Clone)]
pub struct SelectedFont {
    pub face: FontFace,
    pub point_size: f32,
}

#[cfg(feature = "parsing")]
impl SelectedFont {
    pub fn line_height(&self) -> u32 {
        self.face.line_height(self.point_size)
    }

    pub fn measure(&self, text: &str) -> u32 {
        self.face.measure(text, self.point_size)
    }
}

/// [`select_font`], then opens the font.
///
/// Text is laid out on a character grid, so a proportional font is allowed
/// but warned about. The default family is exempt from the warning.
#[cfg(feature = "parsing")]
pub fn open_font<R: FontResolver + ?Sized>(
    resolver: &R,
    requested: &str,
    point_size: f32,
) -> Result<SelectedFont, FcError> {
    let path = select_font(resolver, requested)?;
    let face = FontFace::open(&path)?;

    if !face.is_fixed_width() && requested != DEFAULT_FAMILY {
        log::warn!("{requested:?} ({}) is not a fixed-width font", path.display());
    }

    Ok(SelectedFont { face, point_size })
}
