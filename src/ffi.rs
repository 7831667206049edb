//! FFI bindings for rust-fontchain
//!
//! Strings handed out by this module are owned by the caller and must be
//! released with [`fc_string_free`] / [`fc_string_array_free`].

use std::ffi::{c_char, c_int, CStr, CString};
use std::path::Path;
use std::ptr;
use std::slice;

use crate::*;

/// Helper to convert a Rust string to a C char pointer, null if it
/// contains a null byte
fn string_to_c_char(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(c_str) => c_str.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

fn path_to_c_char(path: &Path) -> *mut c_char {
    #[cfg(unix)]
    {
        use std::os::unix::ffi::OsStrExt;
        match CString::new(path.as_os_str().as_bytes()) {
            Ok(c_str) => c_str.into_raw(),
            Err(_) => ptr::null_mut(),
        }
    }
    #[cfg(not(unix))]
    {
        string_to_c_char(&path.to_string_lossy())
    }
}

/// Helper to free C string
unsafe fn free_c_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = CString::from_raw(s);
    }
}

/// Helper to convert C string to Rust Option<String>
unsafe fn c_char_to_option_string(s: *const c_char) -> Option<String> {
    if s.is_null() {
        None
    } else {
        Some(CStr::from_ptr(s).to_string_lossy().into_owned())
    }
}

/// Hands an array of C strings to the caller, writing its length to `count`.
unsafe fn strings_to_c_array<I>(strings: I, count: *mut usize) -> *mut *mut c_char
where
    I: IntoIterator<Item = *mut c_char>,
{
    let array: Box<[*mut c_char]> = strings.into_iter().filter(|s| !s.is_null()).collect();

    if array.is_empty() {
        *count = 0;
        return ptr::null_mut();
    }

    *count = array.len();
    Box::into_raw(array) as *mut *mut c_char
}

/// Create a resolver on the system's fontconfig, null if fontconfig
/// cannot be loaded
#[no_mangle]
pub extern "C" fn fc_resolver_new() -> *mut FcFallbackResolver {
    match FcFallbackResolver::new() {
        Ok(resolver) => Box::into_raw(Box::new(resolver)),
        Err(e) => {
            log::error!("fc_resolver_new: {e}");
            ptr::null_mut()
        }
    }
}

/// Free a resolver
#[no_mangle]
pub extern "C" fn fc_resolver_free(resolver: *mut FcFallbackResolver) {
    if !resolver.is_null() {
        unsafe {
            let _ = Box::from_raw(resolver);
        }
    }
}

/// Resolve a fallback chain.
///
/// `weight` and `slant` are ignored when negative, `lang` when null.
/// Returns an array of `*out_count` paths, null if nothing matched.
#[no_mangle]
pub extern "C" fn fc_resolver_resolve(
    resolver: *const FcFallbackResolver,
    families: *const *const c_char,
    families_count: usize,
    weight: c_int,
    slant: c_int,
    lang: *const c_char,
    out_count: *mut usize,
) -> *mut *mut c_char {
    if out_count.is_null() {
        return ptr::null_mut();
    }
    unsafe { *out_count = 0 };

    if resolver.is_null() || (families.is_null() && families_count != 0) {
        return ptr::null_mut();
    }

    unsafe {
        let resolver = &*resolver;

        let families = if families_count == 0 {
            Vec::new()
        } else {
            slice::from_raw_parts(families, families_count)
                .iter()
                .filter_map(|family| c_char_to_option_string(*family))
                .collect()
        };

        let descriptor = FontDescriptor {
            families,
            weight: (weight >= 0).then_some(FcWeight(weight)),
            slant: (slant >= 0).then_some(FcSlant(slant)),
            language: c_char_to_option_string(lang),
        };

        let chain = resolver.resolve(&descriptor);
        strings_to_c_array(chain.iter().map(|path| path_to_c_char(path)), out_count)
    }
}

/// List the installed families supporting `lang`, sorted
#[no_mangle]
pub extern "C" fn fc_resolver_list_families(
    resolver: *const FcFallbackResolver,
    lang: *const c_char,
    out_count: *mut usize,
) -> *mut *mut c_char {
    if out_count.is_null() {
        return ptr::null_mut();
    }
    unsafe { *out_count = 0 };

    if resolver.is_null() || lang.is_null() {
        return ptr::null_mut();
    }

    unsafe {
        let resolver = &*resolver;
        let lang = CStr::from_ptr(lang).to_string_lossy();

        let families = resolver.list_families(&lang);
        strings_to_c_array(families.iter().map(|family| string_to_c_char(family)), out_count)
    }
}

/// Path of the installed font named `name`, null if it is not installed
#[no_mangle]
pub extern "C" fn fc_resolver_resolve_single(
    resolver: *const FcFallbackResolver,
    name: *const c_char,
) -> *mut c_char {
    if resolver.is_null() || name.is_null() {
        return ptr::null_mut();
    }

    unsafe {
        let resolver = &*resolver;
        let name = CStr::from_ptr(name).to_string_lossy();

        match resolver.resolve_single(&name) {
            Some(path) => path_to_c_char(&path),
            None => ptr::null_mut(),
        }
    }
}

/// Look `name` up in the Windows font registry, null if not installed
#[cfg(windows)]
#[no_mangle]
pub extern "C" fn fc_registry_lookup(name: *const c_char) -> *mut c_char {
    if name.is_null() {
        return ptr::null_mut();
    }

    let name = unsafe { CStr::from_ptr(name).to_string_lossy() };
    match FcRegistryResolver::new(WindowsRegistry::new()).lookup(&name) {
        Some(path) => path_to_c_char(&path),
        None => ptr::null_mut(),
    }
}

/// Free a string returned by this library
#[no_mangle]
pub extern "C" fn fc_string_free(s: *mut c_char) {
    unsafe { free_c_string(s) }
}

/// Free a string array returned by this library
#[no_mangle]
pub extern "C" fn fc_string_array_free(strings: *mut *mut c_char, count: usize) {
    if strings.is_null() || count == 0 {
        return;
    }

    unsafe {
        let array = Box::from_raw(slice::from_raw_parts_mut(strings, count));
        for s in array.iter() {
            free_c_string(*s);
        }
    }
}
