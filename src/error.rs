use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that make a resolver unusable or a selected font unloadable.
///
/// "No font matched" is never an error: resolvers return an empty
/// chain or `None` for that.
#[derive(Debug, Error)]
pub enum FcError {
    #[error("could not load the fontconfig library (tried {tried:?})")]
    LibraryNotFound {
        tried: Vec<String>,
        #[source]
        source: libloading::Error,
    },

    #[error("fontconfig library is missing the `{symbol}` entry point")]
    MissingSymbol {
        symbol: &'static str,
        #[source]
        source: libloading::Error,
    },

    #[error("fontconfig failed to load its configuration and font set")]
    ConfigLoadFailed,

    #[error("neither {requested:?} nor the default font {default:?} is installed")]
    DefaultFontMissing {
        requested: String,
        default: &'static str,
    },

    #[error("failed to read font file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse font file {path}: {reason}")]
    FontParse { path: PathBuf, reason: String },
}
