//! Fallback-chain resolution through fontconfig.

use std::collections::HashSet;
use std::path::PathBuf;
use std::ptr;

use crate::families::list_families;
use crate::registry::matches_display_name;
use crate::fontconfig::bindings::{self, objects, FC_FALSE, FC_TRUE};
use crate::fontconfig::{FontConfigHandle, FontSet, Pattern, QuietStderr};
use crate::{FcError, FcResolverOptions, FontDescriptor, FontResolver};

/// One font of a sorted fallback chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RankedFont {
    pub path: PathBuf,
    pub families: Vec<String>,
}

/// Resolves descriptors into ranked font files using the system's
/// fontconfig configuration.
///
/// ```rust,no_run
/// use rust_fontchain::{FcFallbackResolver, FontDescriptor};
///
/// let resolver = FcFallbackResolver::new().unwrap();
/// let chain = resolver.resolve(&FontDescriptor {
///     families: vec!["Helvetica".to_string()],
///     language: Some("zh-cn".to_string()),
///     ..Default::default()
/// });
///
/// println!("best match: {:?}", chain.first());
/// ```
#[derive(Debug)]
pub struct FcFallbackResolver {
    handle: FontConfigHandle,
}

impl FcFallbackResolver {
    /// Opens fontconfig with the default options.
    pub fn new() -> Result<Self, FcError> {
        Self::with_options(FcResolverOptions::default())
    }

    pub fn with_options(options: FcResolverOptions) -> Result<Self, FcError> {
        Ok(Self {
            handle: FontConfigHandle::open(options)?,
        })
    }

    pub fn handle(&self) -> &FontConfigHandle {
        &self.handle
    }

    /// Returns the font files to try for `descriptor`, best match first.
    ///
    /// Fonts that add no glyph coverage over better-ranked ones are left out
    /// (unless trimming was disabled in the options). An empty descriptor
    /// yields the platform's default chain. "Nothing matched" is an empty
    /// vector, never an error.
    ///
    /// Names containing a null byte cannot reach fontconfig and are skipped;
    /// if that leaves none of the requested families, the chain is empty.
    pub fn resolve(&self, descriptor: &FontDescriptor) -> Vec<PathBuf> {
        let chain: Vec<PathBuf> = sort_fonts(&self.handle, descriptor)
            .into_iter()
            .map(|font| font.path)
            .collect();

        log::debug!("Resolved {descriptor:?} to {} fonts", chain.len());
        chain
    }

    /// Returns the best-ranked font one of whose family names starts with
    /// `name` (ignoring case), or `None` if fontconfig could only offer
    /// substitutes.
    pub fn resolve_single(&self, name: &str) -> Option<PathBuf> {
        if name.is_empty() {
            return None;
        }

        sort_fonts(&self.handle, &FontDescriptor::family(name))
            .into_iter()
            .find(|font| {
                font.families
                    .iter()
                    .any(|family| matches_display_name(family, name))
            })
            .map(|font| font.path)
    }

    /// Lists the installed families supporting `language`, see
    /// [`list_families`](crate::families::list_families).
    pub fn list_families(&self, language: &str) -> Vec<String> {
        list_families(&self.handle, language)
    }
}

impl FontResolver for FcFallbackResolver {
    fn resolve_single(&self, name: &str) -> Option<PathBuf> {
        FcFallbackResolver::resolve_single(self, name)
    }

    fn resolve_chain(&self, descriptor: &FontDescriptor) -> Vec<PathBuf> {
        self.resolve(descriptor)
    }
}

/// Runs the full fontconfig pipeline for `descriptor`.
///
/// The steps must happen in exactly this order: configured substitution
/// rewrites aliases and generic names, then defaults fill whatever is still
/// unset, then the sort ranks every installed font against the result.
pub(crate) fn sort_fonts(handle: &FontConfigHandle, descriptor: &FontDescriptor) -> Vec<RankedFont> {
    let options = handle.options();

    if names_only_unencodable_families(descriptor) {
        log::warn!("No family of {descriptor:?} can be passed to fontconfig, nothing matches");
        return Vec::new();
    }

    handle.with_config(|lib, config| {
        // 1. fresh working pattern, the descriptor itself is never touched
        let Some(pattern) = Pattern::from_descriptor(lib, descriptor) else {
            log::error!("fontconfig could not allocate a pattern");
            return Vec::new();
        };

        // 2. aliases and configured substitution rules
        let substituted = unsafe {
            (lib.FcConfigSubstitute)(config, pattern.as_ptr(), bindings::FC_MATCH_PATTERN)
        };
        if !bindings::fcbool(substituted) {
            log::error!("FcConfigSubstitute failed for {descriptor:?}");
            return Vec::new();
        }

        // 3. platform defaults for everything still unspecified
        {
            let _quiet = QuietStderr::acquire_if(options.suppress_warnings);
            unsafe { (lib.FcDefaultSubstitute)(pattern.as_ptr()) };
        }

        // 4. rank every installed font
        let trim = if options.trim { FC_TRUE } else { FC_FALSE };
        let mut result = bindings::FC_RESULT_MATCH;
        let sorted = unsafe {
            let ptr = (lib.FcFontSort)(config, pattern.as_ptr(), trim, ptr::null_mut(), &mut result);
            FontSet::from_ptr(ptr, lib)
        };

        let Some(sorted) = sorted else {
            log::debug!("FcFontSort returned no font set for {descriptor:?}");
            return Vec::new();
        };
        if result != bindings::FC_RESULT_MATCH {
            log::debug!("FcFontSort found no match for {descriptor:?} (result {result})");
            return Vec::new();
        }

        // 5. file paths, in rank order
        let mut seen = HashSet::new();
        let mut fonts = Vec::with_capacity(sorted.len());

        for font in sorted.iter() {
            let Some(file) = font.get_string(objects::FC_FILE, 0) else {
                log::error!("fontconfig ranked a font without a file path, skipping it");
                continue;
            };

            let path = handle.font_path(file);
            if !path.exists() {
                log::error!(
                    "fontconfig ranked {} but the file does not exist, skipping it",
                    path.display()
                );
                continue;
            }

            // Faces of one collection file share a path, keep the best-ranked
            if !seen.insert(path.clone()) {
                continue;
            }

            let families = font
                .strings(objects::FC_FAMILY)
                .map(|family| family.to_string_lossy().into_owned())
                .collect();

            fonts.push(RankedFont { path, families });
        }

        fonts
    })
}

/// True if `descriptor` asks for families but every one of them contains a
/// null byte. fontconfig cannot represent such names, and dropping them all
/// would silently turn the request into one for the default chain.
pub(crate) fn names_only_unencodable_families(descriptor: &FontDescriptor) -> bool {
    !descriptor.families.is_empty()
        && descriptor.families.iter().all(|family| family.contains('\0'))
}
