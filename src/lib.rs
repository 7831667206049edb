//! Turns font requests into ranked lists of font files on disk
//!
//! Two platform backends are available:
//!
//! - [`FcFallbackResolver`] asks the system's fontconfig (loaded at runtime)
//!   for a full fallback chain: aliases, configured substitutions and glyph
//!   coverage all influence the ranking.
//! - [`FcRegistryResolver`] looks a display name up in the Windows font
//!   registry, which knows nothing but exact installations.
//!
//! Both implement [`FontResolver`]; [`system_resolver`] returns the one
//! native to the compilation target.
//!
//! # Usage
//!
//! ```rust,no_run
//! use rust_fontchain::{FcFallbackResolver, FontDescriptor};
//!
//! fn main() {
//!
//!     let resolver = FcFallbackResolver::new().unwrap();
//!     let chain = resolver.resolve(&FontDescriptor {
//!         families: vec![String::from("Consolas")],
//!         language: Some(String::from("zh-cn")),
//!         .. Default::default()
//!     });
//!
//!     println!("fallback chain: {:#?}", chain);
//! }
//! ```

use std::path::PathBuf;

pub mod chain;
pub mod descriptor;
pub mod error;
pub mod families;
pub mod fontconfig;
pub mod registry;
pub mod select;

#[cfg(feature = "parsing")]
pub mod metrics;

#[cfg(feature = "ffi")]
pub mod ffi;

#[cfg(test)]
mod tests;

pub use crate::chain::FcFallbackResolver;
pub use crate::descriptor::{FcSlant, FcWeight, FontDescriptor};
pub use crate::error::FcError;
pub use crate::families::{list_families, pick_family_name};
pub use crate::fontconfig::{FcResolverOptions, FcVersion, FontConfigHandle};
pub use crate::registry::{
    FcRegistryResolver, MemoryRegistry, RegistryScope, RegistrySource, RegistryValue,
};
#[cfg(windows)]
pub use crate::registry::WindowsRegistry;
pub use crate::select::{select_font, DEFAULT_FAMILY};
#[cfg(feature = "parsing")]
pub use crate::metrics::FontFace;
#[cfg(feature = "parsing")]
pub use crate::select::{open_font, SelectedFont};

/// A way of finding font files for a request.
pub trait FontResolver {
    /// Finds the file of one installed font by name, `None` if it is not
    /// installed. Never returns a substitute for a different font.
    fn resolve_single(&self, name: &str) -> Option<PathBuf>;

    /// Returns the files to try for `descriptor`, best match first and
    /// without duplicates. An empty vector means nothing matched.
    fn resolve_chain(&self, descriptor: &FontDescriptor) -> Vec<PathBuf>;
}

impl<R: FontResolver + ?Sized> FontResolver for &R {
    fn resolve_single(&self, name: &str) -> Option<PathBuf> {
        (**self).resolve_single(name)
    }

    fn resolve_chain(&self, descriptor: &FontDescriptor) -> Vec<PathBuf> {
        (**self).resolve_chain(descriptor)
    }
}

/// The resolver native to the target platform.
#[cfg(windows)]
pub type SystemResolver = FcRegistryResolver<WindowsRegistry>;

/// The resolver native to the target platform.
#[cfg(not(windows))]
pub type SystemResolver = FcFallbackResolver;

/// Creates the platform's [`SystemResolver`].
///
/// Only fails where fontconfig is used and cannot be loaded.
#[cfg(windows)]
pub fn system_resolver() -> Result<SystemResolver, FcError> {
    Ok(FcRegistryResolver::new(WindowsRegistry::new()))
}

/// Creates the platform's [`SystemResolver`].
///
/// Only fails where fontconfig is used and cannot be loaded.
#[cfg(not(windows))]
pub fn system_resolver() -> Result<SystemResolver, FcError> {
    FcFallbackResolver::new()
}
