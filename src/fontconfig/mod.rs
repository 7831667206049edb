//! Runtime-loaded fontconfig and the process-scoped handle on its config.

pub(crate) mod bindings;
mod font_set;
mod pattern;
mod quiet;

use std::ffi::CStr;
use std::fmt;
use std::path::{Path, PathBuf};
use std::ptr::NonNull;
use std::sync::{Mutex, PoisonError};

pub(crate) use self::bindings::FcLibrary;
pub(crate) use self::font_set::{FontSet, ObjectSet};
pub(crate) use self::pattern::Pattern;
pub(crate) use self::quiet::QuietStderr;

use crate::FcError;

/// Runtime configuration of a [`FontConfigHandle`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FcResolverOptions {
    /// Silence fontconfig's stderr warnings while loading the config and
    /// while filling in default attributes.
    pub suppress_warnings: bool,
    /// Drop fonts from a fallback chain that add no glyph coverage over the
    /// fonts ranked before them.
    pub trim: bool,
    /// Load fontconfig from this file instead of the usual library names.
    pub library_path: Option<PathBuf>,
}

impl Default for FcResolverOptions {
    fn default() -> Self {
        Self {
            suppress_warnings: true,
            trim: true,
            library_path: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct FcVersion {
    pub major: u8,
    pub minor: u8,
    pub revision: u8,
}

impl FcVersion {
    /// Decodes `FcGetVersion()`, which packs the version as
    /// `major * 10000 + minor * 100 + revision`.
    pub fn from_packed(value: i32) -> Self {
        let value = value.max(0);
        Self {
            major: (value / 10_000) as u8,
            minor: (value % 10_000 / 100) as u8,
            revision: (value % 100) as u8,
        }
    }
}

impl fmt::Display for FcVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.revision)
    }
}

struct ConfigPtr(NonNull<bindings::FcConfig>);

// SAFETY: the config is only ever touched while holding the handle's mutex
unsafe impl Send for ConfigPtr {}

/// Exclusive owner of one loaded fontconfig configuration.
///
/// Created once per resolver and destroyed exactly once when dropped. Every
/// use goes through [`FontConfigHandle::with_config`], which serializes
/// callers on a single mutex: fontconfig makes no promise that one config
/// may be used from several threads at once.
pub struct FontConfigHandle {
    config: Mutex<ConfigPtr>,
    sysroot: Option<PathBuf>,
    version: FcVersion,
    options: FcResolverOptions,
    // Unloaded after `drop` has destroyed the config
    lib: FcLibrary,
}

impl FontConfigHandle {
    /// Loads fontconfig and its configuration (system files plus any user
    /// overrides) together with the installed font set.
    pub fn open(options: FcResolverOptions) -> Result<Self, FcError> {
        let lib = FcLibrary::load(options.library_path.as_deref())?;

        // SAFETY: FcGetVersion has no preconditions
        let version = FcVersion::from_packed(unsafe { (lib.FcGetVersion)() });
        log::info!("Using fontconfig version {version}");

        let config = {
            let _quiet = QuietStderr::acquire_if(options.suppress_warnings);
            // SAFETY: FcInitLoadConfigAndFonts has no preconditions
            NonNull::new(unsafe { (lib.FcInitLoadConfigAndFonts)() })
        };
        let config = config.ok_or(FcError::ConfigLoadFailed)?;

        // SAFETY: config is valid; the returned string is owned by the config
        let sysroot = unsafe {
            let raw = (lib.FcConfigGetSysRoot)(config.as_ptr());
            (!raw.is_null()).then(|| PathBuf::from(CStr::from_ptr(raw).to_string_lossy().into_owned()))
        };

        Ok(Self {
            config: Mutex::new(ConfigPtr(config)),
            sysroot,
            version,
            options,
            lib,
        })
    }

    pub fn version(&self) -> FcVersion {
        self.version
    }

    pub fn options(&self) -> &FcResolverOptions {
        &self.options
    }

    /// Runs `f` with exclusive access to the config.
    pub(crate) fn with_config<R>(
        &self,
        f: impl FnOnce(&FcLibrary, *mut bindings::FcConfig) -> R,
    ) -> R {
        let config = self.config.lock().unwrap_or_else(PoisonError::into_inner);
        f(&self.lib, config.0.as_ptr())
    }

    /// Turns a file name reported by fontconfig into a filesystem path.
    ///
    /// Relative names are relative to the configured sysroot, if any.
    pub(crate) fn font_path(&self, file: &CStr) -> PathBuf {
        let path = cstr_to_path(file);
        match &self.sysroot {
            Some(sysroot) if path.is_relative() => sysroot.join(path),
            _ => path,
        }
    }
}

impl Drop for FontConfigHandle {
    fn drop(&mut self) {
        let config = self.config.get_mut().unwrap_or_else(PoisonError::into_inner);

        // No FcFini() here, other fontconfig users in this process may
        // still rely on the library's global state
        unsafe { (self.lib.FcConfigDestroy)(config.0.as_ptr()) }
    }
}

impl fmt::Debug for FontConfigHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontConfigHandle")
            .field("version", &self.version)
            .field("sysroot", &self.sysroot)
            .field("options", &self.options)
            .finish()
    }
}

#[cfg(unix)]
fn cstr_to_path(file: &CStr) -> PathBuf {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    Path::new(OsStr::from_bytes(file.to_bytes())).to_path_buf()
}

#[cfg(not(unix))]
fn cstr_to_path(file: &CStr) -> PathBuf {
    Path::new(&*file.to_string_lossy()).to_path_buf()
}
