use std::ffi::CStr;
use std::ptr::NonNull;
use std::slice;

use super::bindings::{self, fcbool, FcLibrary};
use super::pattern::PatternRef;

/// An owned `FcFontSet` as returned by `FcFontSort` / `FcFontList`.
pub(crate) struct FontSet<'lib> {
    ptr: NonNull<bindings::FcFontSet>,
    lib: &'lib FcLibrary,
}

impl<'lib> FontSet<'lib> {
    /// Takes ownership of `ptr`, `None` for a null set.
    ///
    /// # Safety
    /// `ptr` must be null or a font set freshly returned by fontconfig.
    pub(crate) unsafe fn from_ptr(ptr: *mut bindings::FcFontSet, lib: &'lib FcLibrary) -> Option<Self> {
        NonNull::new(ptr).map(|ptr| Self { ptr, lib })
    }

    pub(crate) fn len(&self) -> usize {
        // SAFETY: self.ptr is valid while we own it
        let set = unsafe { self.ptr.as_ref() };
        usize::try_from(set.nfont).unwrap_or(0)
    }

    /// Fonts in the order fontconfig stored them (ranked for `FcFontSort`).
    pub(crate) fn iter(&self) -> impl Iterator<Item = PatternRef<'_>> + '_ {
        // SAFETY: self.ptr is valid while we own it
        let set = unsafe { self.ptr.as_ref() };
        let fonts: &[*mut bindings::FcPattern] = if set.fonts.is_null() || self.len() == 0 {
            &[]
        } else {
            // SAFETY: fontconfig guarantees `nfont` valid entries behind `fonts`
            unsafe { slice::from_raw_parts(set.fonts, self.len()) }
        };

        fonts
            .iter()
            .filter(|font| !font.is_null())
            // SAFETY: each entry is owned by the set, which outlives the iterator
            .map(move |font| unsafe { PatternRef::from_ptr(*font, self.lib) })
    }
}

impl Drop for FontSet<'_> {
    fn drop(&mut self) {
        // Destroys the contained patterns as well
        unsafe { (self.lib.FcFontSetDestroy)(self.ptr.as_ptr()) }
    }
}

/// An owned `FcObjectSet`: the properties `FcFontList` should report.
pub(crate) struct ObjectSet<'lib> {
    ptr: NonNull<bindings::FcObjectSet>,
    lib: &'lib FcLibrary,
}

impl<'lib> ObjectSet<'lib> {
    pub(crate) fn new(lib: &'lib FcLibrary) -> Option<Self> {
        let ptr = NonNull::new(unsafe { (lib.FcObjectSetCreate)() })?;
        Some(Self { ptr, lib })
    }

    pub(crate) fn add(&mut self, object: &CStr) -> bool {
        // fontconfig interns the object name, no need to keep `object` alive
        let success = unsafe { (self.lib.FcObjectSetAdd)(self.ptr.as_ptr(), object.as_ptr()) };
        fcbool(success)
    }

    pub(crate) fn as_ptr(&self) -> *mut bindings::FcObjectSet {
        self.ptr.as_ptr()
    }
}

impl Drop for ObjectSet<'_> {
    fn drop(&mut self) {
        unsafe { (self.lib.FcObjectSetDestroy)(self.ptr.as_ptr()) }
    }
}
