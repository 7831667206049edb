//! Just enough font parsing to lay out fixed-size text: fixed-pitch flag,
//! line height and string widths.

use std::path::{Path, PathBuf};

use allsorts::binary::read::ReadScope;
use allsorts::font::read_cmap_subtable;
use allsorts::font_data::FontData;
use allsorts::post::PostTable;
use allsorts::tables::cmap::Cmap;
use allsorts::tables::{FontTableProvider, HeadTable, HheaTable, HmtxTable, MaxpTable};
use allsorts::tag;

use crate::FcError;

/// The first face of a font file, reduced to its horizontal metrics.
///
/// All sizes are in pixels at 72 dpi, i.e. a point size is used directly as
/// a pixel size.
#[derive(Debug, Clone)]
pub struct FontFace {
    path: PathBuf,
    units_per_em: u16,
    ascender: i16,
    descender: i16,
    line_gap: i16,
    fixed_pitch: bool,
    /// Advance width of every glyph, indexed by glyph id
    advances: Vec<u16>,
    cmap_data: Vec<u8>,
}

impl FontFace {
    pub fn open(path: &Path) -> Result<Self, FcError> {
        let bytes = read_font_file(path)?;
        Self::parse(path, &bytes[..])
    }

    /// Parses a font that is already in memory. `path` is only used for
    /// error messages.
    pub fn parse(path: &Path, bytes: &[u8]) -> Result<Self, FcError> {
        let parse_error = |reason: String| FcError::FontParse {
            path: path.to_path_buf(),
            reason,
        };

        let scope = ReadScope::new(bytes);
        let font_file = scope
            .read::<FontData<'_>>()
            .map_err(|e| parse_error(format!("not a font file: {e:?}")))?;
        let provider = font_file
            .table_provider(0)
            .map_err(|e| parse_error(format!("no face at index 0: {e:?}")))?;

        let table = |tag: u32, name: &str| -> Result<Vec<u8>, FcError> {
            match provider.table_data(tag) {
                Ok(Some(data)) => Ok(data.into_owned()),
                Ok(None) => Err(parse_error(format!("missing {name} table"))),
                Err(e) => Err(parse_error(format!("unreadable {name} table: {e:?}"))),
            }
        };

        let head_data = table(tag::HEAD, "head")?;
        let head = ReadScope::new(&head_data)
            .read::<HeadTable>()
            .map_err(|e| parse_error(format!("head: {e:?}")))?;

        let hhea_data = table(tag::HHEA, "hhea")?;
        let hhea = ReadScope::new(&hhea_data)
            .read::<HheaTable>()
            .map_err(|e| parse_error(format!("hhea: {e:?}")))?;

        let maxp_data = table(tag::MAXP, "maxp")?;
        let maxp = ReadScope::new(&maxp_data)
            .read::<MaxpTable>()
            .map_err(|e| parse_error(format!("maxp: {e:?}")))?;

        let hmtx_data = table(tag::HMTX, "hmtx")?;
        let hmtx = ReadScope::new(&hmtx_data)
            .read_dep::<HmtxTable<'_>>((usize::from(maxp.num_glyphs), usize::from(hhea.num_h_metrics)))
            .map_err(|e| parse_error(format!("hmtx: {e:?}")))?;

        // Glyphs past the last long metric repeat its advance
        let long_advances: Vec<u16> = hmtx.h_metrics.iter().map(|metric| metric.advance_width).collect();
        let last_advance = long_advances.last().copied().unwrap_or(0);
        let mut advances = long_advances;
        advances.resize(usize::from(maxp.num_glyphs).max(advances.len()), last_advance);

        // A font without post table is treated as proportional
        let fixed_pitch = match provider.table_data(tag::POST) {
            Ok(Some(post_data)) => ReadScope::new(&post_data)
                .read::<PostTable<'_>>()
                .map(|post| post.header.is_fixed_pitch != 0)
                .unwrap_or(false),
            _ => false,
        };

        let cmap_data = table(tag::CMAP, "cmap")?;

        if head.units_per_em == 0 {
            return Err(parse_error(String::from("units per em is zero")));
        }

        Ok(Self {
            path: path.to_path_buf(),
            units_per_em: head.units_per_em,
            ascender: hhea.ascender,
            descender: hhea.descender,
            line_gap: hhea.line_gap,
            fixed_pitch,
            advances,
            cmap_data,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn units_per_em(&self) -> u16 {
        self.units_per_em
    }

    /// True if the font declares itself monospaced.
    pub fn is_fixed_width(&self) -> bool {
        self.fixed_pitch
    }

    /// Distance between two baselines at `point_size`, rounded up.
    pub fn line_height(&self, point_size: f32) -> u32 {
        let units = i32::from(self.ascender) - i32::from(self.descender) + i32::from(self.line_gap);
        self.scale(units.max(0) as u32, point_size)
    }

    /// Width of `text` at `point_size`, rounded up. Characters the font has
    /// no glyph for are measured with the missing-glyph glyph.
    pub fn measure(&self, text: &str, point_size: f32) -> u32 {
        let units: u32 = self
            .glyph_ids(text)
            .into_iter()
            .map(|glyph_id| u32::from(self.advance(glyph_id)))
            .sum();
        self.scale(units, point_size)
    }

    /// Glyph ids for every character of `text`, 0 for unmapped characters.
    pub fn glyph_ids(&self, text: &str) -> Vec<u16> {
        let subtable = ReadScope::new(&self.cmap_data)
            .read::<Cmap<'_>>()
            .ok()
            .and_then(|cmap| read_cmap_subtable(&cmap).ok().flatten());

        let Some((_, subtable)) = subtable else {
            log::warn!("{} has no usable cmap subtable", self.path.display());
            return vec![0; text.chars().count()];
        };

        text.chars()
            .map(|c| subtable.map_glyph(u32::from(c)).ok().flatten().unwrap_or(0))
            .collect()
    }

    fn advance(&self, glyph_id: u16) -> u16 {
        self.advances.get(usize::from(glyph_id)).copied().unwrap_or(0)
    }

    fn scale(&self, units: u32, point_size: f32) -> u32 {
        (units as f32 * point_size / f32::from(self.units_per_em)).ceil() as u32
    }
}

#[cfg(not(target_family = "wasm"))]
fn read_font_file(path: &Path) -> Result<mmapio::Mmap, FcError> {
    use mmapio::MmapOptions;
    use std::fs::File;

    let io_error = |source| FcError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(io_error)?;
    // SAFETY: every table is copied out of the mapping while parsing
    unsafe { MmapOptions::new().map(&file).map_err(io_error) }
}

#[cfg(target_family = "wasm")]
fn read_font_file(path: &Path) -> Result<Vec<u8>, FcError> {
    std::fs::read(path).map_err(|source| FcError::Io {
        path: path.to_path_buf(),
        source,
    })
}
