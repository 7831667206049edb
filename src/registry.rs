//! Direct font lookup in the Windows font registry.
//!
//! Windows records installed fonts as string values under
//! `Software\Microsoft\Windows NT\CurrentVersion\Fonts`, once per user
//! (`HKEY_CURRENT_USER`) and once machine-wide (`HKEY_LOCAL_MACHINE`). The
//! value name is a display name such as `"SimSun & NSimSun (TrueType)"`, the
//! value data either a bare file name relative to the system font directory
//! or a full path.
//!
//! # Architecture
//!
//! - [`RegistrySource`]: opens one scope and enumerates its values. The real
//!   backend is [`WindowsRegistry`] (Windows only); [`MemoryRegistry`] holds
//!   the same data in memory and works everywhere.
//! - [`FcRegistryResolver`]: the lookup policy on top of any source. It
//!   keeps no state between calls; every lookup opens and closes its own
//!   registry keys.
//!
//! # Usage
//!
//! ```rust
//! use rust_fontchain::registry::{FcRegistryResolver, MemoryRegistry, RegistryScope};
//!
//! let mut registry = MemoryRegistry::new(r"C:\Windows\Fonts");
//! registry.insert(RegistryScope::LocalMachine, "SimSun & NSimSun (TrueType)", "simsun.ttc");
//!
//! let resolver = FcRegistryResolver::new(registry);
//! let path = resolver.lookup("simsun").unwrap();
//! assert!(path.ends_with("simsun.ttc"));
//! ```

use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;

use crate::{FontDescriptor, FontResolver};

/// Registry key holding the font registrations, below either root key.
pub const FONTS_SUBKEY: &str = r"Software\Microsoft\Windows NT\CurrentVersion\Fonts";

/// Where a font registration lives. Lookups search them in declaration
/// order: per-user registrations override machine-wide ones.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RegistryScope {
    /// `HKEY_CURRENT_USER`
    CurrentUser,
    /// `HKEY_LOCAL_MACHINE`
    LocalMachine,
}

impl RegistryScope {
    pub const SEARCH_ORDER: [RegistryScope; 2] = [RegistryScope::CurrentUser, RegistryScope::LocalMachine];
}

/// One string value of the fonts key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegistryValue {
    /// Display name, e.g. `"Consolas (TrueType)"`
    pub name: String,
    /// File name relative to the system font directory, or an absolute path
    pub data: String,
}

/// Access to the font registrations of one machine.
pub trait RegistrySource {
    /// Iterator over the values of one opened scope. Dropping it releases
    /// whatever the open acquired.
    type Values: Iterator<Item = RegistryValue>;

    /// Opens the fonts key of `scope`, `None` if it cannot be opened.
    fn open_scope(&self, scope: RegistryScope) -> Option<Self::Values>;

    /// Directory that relative registry values are relative to.
    fn system_font_dir(&self) -> PathBuf;
}

/// Case-insensitive prefix match of a requested font name against a
/// registered display name.
///
/// `"simsun"` matches `"SimSun & NSimSun (TrueType)"`. An empty request
/// matches nothing.
pub fn matches_display_name(display_name: &str, requested: &str) -> bool {
    if requested.is_empty() {
        return false;
    }

    let mut display = display_name.chars().flat_map(char::to_lowercase);
    requested
        .chars()
        .flat_map(char::to_lowercase)
        .all(|c| display.next() == Some(c))
}

/// True for paths Windows considers absolute (`C:\...`, `C:/...`,
/// `\\server\share\...`), whatever the host platform, as well as for paths
/// absolute on the host.
pub fn is_absolute_registry_path(data: &str) -> bool {
    let bytes = data.as_bytes();

    let drive_absolute = bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && matches!(bytes[2], b'\\' | b'/');
    let unc = data.starts_with(r"\\") || data.starts_with("//");

    drive_absolute || unc || std::path::Path::new(data).is_absolute()
}

/// Looks fonts up by display name in a [`RegistrySource`].
#[derive(Debug, Clone)]
pub struct FcRegistryResolver<S> {
    source: S,
}

impl<S: RegistrySource> FcRegistryResolver<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Finds the file of the first registration whose display name starts
    /// with `name` (ignoring case), per-user registrations first.
    ///
    /// `None` simply means the font is not installed.
    pub fn lookup(&self, name: &str) -> Option<PathBuf> {
        let (scope, value) = RegistryScope::SEARCH_ORDER
            .iter()
            .find_map(|scope| self.find_in_scope(*scope, name).map(|value| (*scope, value)))?;

        let path = self.registry_path(&value.data);
        log::debug!("Found {name:?} as {:?} in {scope:?}: {}", value.name, path.display());
        Some(path)
    }

    fn find_in_scope(&self, scope: RegistryScope, name: &str) -> Option<RegistryValue> {
        let Some(mut values) = self.source.open_scope(scope) else {
            log::trace!("Font registry scope {scope:?} unavailable, skipping it");
            return None;
        };
        values.find(|value| matches_display_name(&value.name, name))
    }

    fn registry_path(&self, data: &str) -> PathBuf {
        if is_absolute_registry_path(data) {
            PathBuf::from(data)
        } else {
            self.source.system_font_dir().join(data)
        }
    }
}

impl<S: RegistrySource> FontResolver for FcRegistryResolver<S> {
    fn resolve_single(&self, name: &str) -> Option<PathBuf> {
        self.lookup(name)
    }

    /// Looks up every requested family in turn. The registry knows no
    /// aliases or defaults, so families that are not installed are skipped
    /// and an empty descriptor yields an empty chain.
    fn resolve_chain(&self, descriptor: &FontDescriptor) -> Vec<PathBuf> {
        let mut seen = HashSet::new();
        descriptor
            .families
            .iter()
            .filter_map(|family| self.lookup(family))
            .filter(|path| seen.insert(path.clone()))
            .collect()
    }
}

// ── In-memory registry ──────────────────────────────────────────────────────

/// A font registry held in memory.
///
/// Values keep their insertion order inside a scope, as enumeration order
/// decides which of several matching registrations wins. A scope that never
/// received a value behaves like a key that cannot be opened.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MemoryRegistry {
    scopes: BTreeMap<RegistryScope, Vec<RegistryValue>>,
    font_dir: PathBuf,
}

impl MemoryRegistry {
    pub fn new(font_dir: impl Into<PathBuf>) -> Self {
        Self {
            scopes: BTreeMap::new(),
            font_dir: font_dir.into(),
        }
    }

    /// Adds a registration at the end of `scope`.
    pub fn insert(&mut self, scope: RegistryScope, name: &str, data: &str) -> &mut Self {
        self.scopes.entry(scope).or_default().push(RegistryValue {
            name: String::from(name),
            data: String::from(data),
        });
        self
    }

    /// Makes `scope` openable even without values.
    pub fn create_scope(&mut self, scope: RegistryScope) -> &mut Self {
        self.scopes.entry(scope).or_default();
        self
    }
}

impl RegistrySource for MemoryRegistry {
    type Values = std::vec::IntoIter<RegistryValue>;

    fn open_scope(&self, scope: RegistryScope) -> Option<Self::Values> {
        self.scopes.get(&scope).map(|values| values.clone().into_iter())
    }

    fn system_font_dir(&self) -> PathBuf {
        self.font_dir.clone()
    }
}

/// What to do after one `RegEnumValueW` call.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(not(windows), allow(dead_code))]
pub(crate) enum EnumerationStep {
    Read,
    /// This value is unreadable, the next one may not be
    Skip,
    Stop,
}

// Win32 error codes, identical on every host so the policy is testable
const ERROR_SUCCESS_CODE: u32 = 0;
const ERROR_MORE_DATA_CODE: u32 = 234;

/// Maps a `RegEnumValueW` status to the next step. Only a value that grew
/// past the queried buffer size is skipped; any other failure, including
/// `ERROR_NO_MORE_ITEMS`, ends the enumeration.
#[cfg_attr(not(windows), allow(dead_code))]
pub(crate) fn enumeration_step(status: u32) -> EnumerationStep {
    match status {
        ERROR_SUCCESS_CODE => EnumerationStep::Read,
        ERROR_MORE_DATA_CODE => EnumerationStep::Skip,
        _ => EnumerationStep::Stop,
    }
}

// ── Windows registry ────────────────────────────────────────────────────────

#[cfg(windows)]
pub use self::windows::{RegistryKeyValues, WindowsRegistry};

#[cfg(windows)]
mod windows {
    use std::path::PathBuf;
    use std::ptr;

    use windows_sys::Win32::Foundation::{ERROR_SUCCESS, MAX_PATH};
    use windows_sys::Win32::System::Registry::{
        RegCloseKey, RegEnumValueW, RegOpenKeyExW, RegQueryInfoKeyW, HKEY, HKEY_CURRENT_USER,
        HKEY_LOCAL_MACHINE, KEY_READ, REG_SZ,
    };
    use windows_sys::Win32::System::SystemInformation::GetWindowsDirectoryW;

    use super::{enumeration_step, EnumerationStep, RegistryScope, RegistrySource, RegistryValue, FONTS_SUBKEY};

    /// The registry of the running Windows system.
    #[derive(Debug, Default, Copy, Clone)]
    pub struct WindowsRegistry;

    impl WindowsRegistry {
        pub fn new() -> Self {
            Self
        }
    }

    impl RegistrySource for WindowsRegistry {
        type Values = RegistryKeyValues;

        fn open_scope(&self, scope: RegistryScope) -> Option<RegistryKeyValues> {
            let root = match scope {
                RegistryScope::CurrentUser => HKEY_CURRENT_USER,
                RegistryScope::LocalMachine => HKEY_LOCAL_MACHINE,
            };
            RegistryKeyValues::open(root, FONTS_SUBKEY)
        }

        fn system_font_dir(&self) -> PathBuf {
            let mut buffer = [0u16; MAX_PATH as usize];
            // SAFETY: the buffer length is passed along
            let len = unsafe { GetWindowsDirectoryW(buffer.as_mut_ptr(), buffer.len() as u32) };

            let windows_dir = if len == 0 || len as usize > buffer.len() {
                log::warn!("GetWindowsDirectoryW failed, assuming C:\\Windows");
                PathBuf::from(r"C:\Windows")
            } else {
                PathBuf::from(String::from_utf16_lossy(&buffer[..len as usize]))
            };
            windows_dir.join("Fonts")
        }
    }

    /// The string values of one open registry key; the key is closed on drop.
    pub struct RegistryKeyValues {
        key: HKEY,
        index: u32,
        name_buffer: Vec<u16>,
        data_buffer: Vec<u8>,
    }

    impl RegistryKeyValues {
        fn open(root: HKEY, subkey: &str) -> Option<Self> {
            let subkey: Vec<u16> = subkey.encode_utf16().chain(Some(0)).collect();
            let mut key: HKEY = ptr::null_mut();

            // SAFETY: subkey is null-terminated, key receives the handle
            let status = unsafe { RegOpenKeyExW(root, subkey.as_ptr(), 0, KEY_READ, &mut key) };
            if status != ERROR_SUCCESS {
                return None;
            }

            let mut max_name_len = 0u32;
            let mut max_data_len = 0u32;
            // SAFETY: key is open, unused outputs are null
            let status = unsafe {
                RegQueryInfoKeyW(
                    key,
                    ptr::null_mut(),
                    ptr::null_mut(),
                    ptr::null(),
                    ptr::null_mut(),
                    ptr::null_mut(),
                    ptr::null_mut(),
                    ptr::null_mut(),
                    &mut max_name_len,
                    &mut max_data_len,
                    ptr::null_mut(),
                    ptr::null_mut(),
                )
            };
            if status != ERROR_SUCCESS {
                unsafe { RegCloseKey(key) };
                return None;
            }

            Some(Self {
                key,
                index: 0,
                // max_name_len excludes the terminating null
                name_buffer: vec![0; max_name_len as usize + 1],
                data_buffer: vec![0; max_data_len as usize + 2],
            })
        }
    }

    impl Iterator for RegistryKeyValues {
        type Item = RegistryValue;

        fn next(&mut self) -> Option<RegistryValue> {
            loop {
                let mut name_len = self.name_buffer.len() as u32;
                let mut data_len = self.data_buffer.len() as u32;
                let mut value_type = 0u32;

                // SAFETY: buffer lengths are passed along, key is open
                let status = unsafe {
                    RegEnumValueW(
                        self.key,
                        self.index,
                        self.name_buffer.as_mut_ptr(),
                        &mut name_len,
                        ptr::null(),
                        &mut value_type,
                        self.data_buffer.as_mut_ptr(),
                        &mut data_len,
                    )
                };
                self.index += 1;

                match enumeration_step(status) {
                    EnumerationStep::Stop => return None,
                    EnumerationStep::Skip => continue,
                    EnumerationStep::Read if value_type != REG_SZ => continue,
                    EnumerationStep::Read => {}
                }

                let name = String::from_utf16_lossy(&self.name_buffer[..name_len as usize]);

                let data: Vec<u16> = self.data_buffer[..data_len as usize]
                    .chunks_exact(2)
                    .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                    .take_while(|unit| *unit != 0)
                    .collect();

                return Some(RegistryValue {
                    name,
                    data: String::from_utf16_lossy(&data),
                });
            }
        }
    }

    impl Drop for RegistryKeyValues {
        fn drop(&mut self) {
            // SAFETY: the key was opened by `open` and is closed exactly once
            unsafe { RegCloseKey(self.key) };
        }
    }
}
