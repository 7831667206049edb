// See https://www.freedesktop.org/software/fontconfig/fontconfig-devel/
// for documentation of the library API

use std::ffi::{c_char, c_int};
use std::path::Path;

use libloading::Library;

use crate::FcError;

pub type FcChar8 = c_char;
pub type FcBool = c_int;
pub type FcResult = c_int;
pub type FcMatchKind = c_int;

pub const FC_TRUE: FcBool = 1;
pub const FC_FALSE: FcBool = 0;

pub const FC_RESULT_MATCH: FcResult = 0;

pub const FC_MATCH_PATTERN: FcMatchKind = 0;

#[repr(C)]
pub struct FcConfig {
    _private: [u8; 0],
}

#[repr(C)]
pub struct FcPattern {
    _private: [u8; 0],
}

#[repr(C)]
pub struct FcCharSet {
    _private: [u8; 0],
}

#[repr(C)]
pub struct FcFontSet {
    pub nfont: c_int,
    pub sfont: c_int,
    pub fonts: *mut *mut FcPattern,
}

#[repr(C)]
pub struct FcObjectSet {
    pub nobject: c_int,
    pub sobject: c_int,
    pub objects: *mut *const c_char,
}

#[inline]
pub(crate) fn fcbool(value: FcBool) -> bool {
    value != FC_FALSE
}

/// Library names tried in order when no explicit path is configured.
#[cfg(target_os = "macos")]
pub const LIBRARY_NAMES: &[&str] = &["libfontconfig.1.dylib", "libfontconfig.dylib"];
#[cfg(windows)]
pub const LIBRARY_NAMES: &[&str] = &["libfontconfig-1.dll", "fontconfig.dll"];
#[cfg(not(any(target_os = "macos", windows)))]
pub const LIBRARY_NAMES: &[&str] = &["libfontconfig.so.1", "libfontconfig.so"];

macro_rules! fontconfig_functions {
    ($( $name:ident : fn($($arg:ty),*) $(-> $ret:ty)?; )*) => {
        /// Entry points resolved from the fontconfig shared library.
        ///
        /// The function pointers stay valid for as long as `_library` is
        /// loaded, which is the lifetime of this struct.
        #[allow(non_snake_case)]
        pub(crate) struct FcLibrary {
            $( pub(crate) $name: unsafe extern "C" fn($($arg),*) $(-> $ret)?, )*
            _library: Library,
        }

        impl FcLibrary {
            #[allow(non_snake_case)]
            fn from_library(library: Library) -> Result<Self, FcError> {
                $(
                    // SAFETY: the signature matches the C prototype in fontconfig.h
                    let $name = unsafe {
                        *library
                            .get::<unsafe extern "C" fn($($arg),*) $(-> $ret)?>(
                                concat!(stringify!($name), "\0").as_bytes(),
                            )
                            .map_err(|source| FcError::MissingSymbol {
                                symbol: stringify!($name),
                                source,
                            })?
                    };
                )*

                Ok(Self {
                    $( $name, )*
                    _library: library,
                })
            }
        }
    };
}

fontconfig_functions! {
    FcGetVersion: fn() -> c_int;
    FcInitLoadConfigAndFonts: fn() -> *mut FcConfig;
    FcConfigDestroy: fn(*mut FcConfig);
    FcConfigGetSysRoot: fn(*const FcConfig) -> *const FcChar8;
    FcConfigSubstitute: fn(*mut FcConfig, *mut FcPattern, FcMatchKind) -> FcBool;
    FcDefaultSubstitute: fn(*mut FcPattern);
    FcFontSort: fn(*mut FcConfig, *mut FcPattern, FcBool, *mut *mut FcCharSet, *mut FcResult) -> *mut FcFontSet;
    FcFontList: fn(*mut FcConfig, *mut FcPattern, *mut FcObjectSet) -> *mut FcFontSet;
    FcFontSetDestroy: fn(*mut FcFontSet);
    FcPatternCreate: fn() -> *mut FcPattern;
    FcPatternDestroy: fn(*mut FcPattern);
    FcPatternAddString: fn(*mut FcPattern, *const c_char, *const FcChar8) -> FcBool;
    FcPatternAddInteger: fn(*mut FcPattern, *const c_char, c_int) -> FcBool;
    FcPatternGetString: fn(*const FcPattern, *const c_char, c_int, *mut *mut FcChar8) -> FcResult;
    FcObjectSetCreate: fn() -> *mut FcObjectSet;
    FcObjectSetAdd: fn(*mut FcObjectSet, *const c_char) -> FcBool;
    FcObjectSetDestroy: fn(*mut FcObjectSet);
}

impl FcLibrary {
    /// Loads fontconfig from `path`, or from the platform's usual library
    /// names if `path` is `None`.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self, FcError> {
        let candidates: Vec<String> = match path {
            Some(p) => vec![p.to_string_lossy().into_owned()],
            None => LIBRARY_NAMES.iter().map(|s| s.to_string()).collect(),
        };

        let mut last_error = None;
        for candidate in &candidates {
            // SAFETY: loading fontconfig runs no initialisers with preconditions
            match unsafe { Library::new(candidate) } {
                Ok(library) => {
                    log::debug!("Loaded fontconfig from {candidate}");
                    return Self::from_library(library);
                }
                Err(e) => last_error = Some(e),
            }
        }

        match last_error {
            Some(source) => Err(FcError::LibraryNotFound {
                tried: candidates,
                source,
            }),
            // `candidates` is never empty
            None => Err(FcError::ConfigLoadFailed),
        }
    }
}

/// Well-known pattern object names (`FC_*` in fontconfig.h).
pub mod objects {
    use std::ffi::CStr;

    pub const FC_FAMILY: &CStr = c"family";
    pub const FC_FAMILYLANG: &CStr = c"familylang";
    pub const FC_SLANT: &CStr = c"slant";
    pub const FC_WEIGHT: &CStr = c"weight";
    pub const FC_FILE: &CStr = c"file";
    pub const FC_LANG: &CStr = c"lang";
}
