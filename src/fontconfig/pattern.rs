use std::ffi::{c_int, CStr, CString};
use std::marker::PhantomData;
use std::ptr::{self, NonNull};

use super::bindings::{self, fcbool, FcLibrary};
use crate::FontDescriptor;

/// An owned `FcPattern`, destroyed on drop.
pub(crate) struct Pattern<'lib> {
    ptr: NonNull<bindings::FcPattern>,
    lib: &'lib FcLibrary,
}

impl<'lib> Pattern<'lib> {
    /// Creates an empty pattern, `None` if fontconfig is out of memory.
    pub(crate) fn new(lib: &'lib FcLibrary) -> Option<Self> {
        // SAFETY: FcPatternCreate has no preconditions
        let ptr = NonNull::new(unsafe { (lib.FcPatternCreate)() })?;
        Some(Self { ptr, lib })
    }

    /// Builds a fresh working pattern from `descriptor`.
    ///
    /// The pattern shares nothing with the descriptor, so everything
    /// fontconfig later does to it stays invisible to the caller.
    pub(crate) fn from_descriptor(lib: &'lib FcLibrary, descriptor: &FontDescriptor) -> Option<Self> {
        let mut pattern = Self::new(lib)?;

        for family in &descriptor.families {
            pattern.add_string(bindings::objects::FC_FAMILY, family);
        }
        if let Some(weight) = descriptor.weight {
            pattern.add_int(bindings::objects::FC_WEIGHT, weight.0);
        }
        if let Some(slant) = descriptor.slant {
            pattern.add_int(bindings::objects::FC_SLANT, slant.0);
        }
        if let Some(language) = descriptor.language.as_deref() {
            pattern.add_string(bindings::objects::FC_LANG, language);
        }

        Some(pattern)
    }

    pub(crate) fn add_string(&mut self, object: &CStr, value: &str) -> bool {
        let Ok(c_string) = CString::new(value) else {
            log::warn!("Ignoring {object:?} value {value:?}: contains a null byte");
            return false;
        };

        // fontconfig copies the string, `c_string` may be dropped afterwards
        let success = unsafe {
            (self.lib.FcPatternAddString)(self.ptr.as_ptr(), object.as_ptr(), c_string.as_ptr())
        };

        if !fcbool(success) {
            log::error!("Failed to insert {object:?} = {value:?} into pattern");
        }
        fcbool(success)
    }

    pub(crate) fn add_int(&mut self, object: &CStr, value: i32) -> bool {
        let success =
            unsafe { (self.lib.FcPatternAddInteger)(self.ptr.as_ptr(), object.as_ptr(), value) };

        if !fcbool(success) {
            log::error!("Failed to insert {object:?} = {value} into pattern");
        }
        fcbool(success)
    }

    pub(crate) fn as_ptr(&self) -> *mut bindings::FcPattern {
        self.ptr.as_ptr()
    }
}

impl Drop for Pattern<'_> {
    fn drop(&mut self) {
        // SAFETY: we own the pattern and nothing else references it
        unsafe { (self.lib.FcPatternDestroy)(self.ptr.as_ptr()) }
    }
}

/// A pattern borrowed from a [`FontSet`](super::FontSet); valid while the set is.
#[derive(Clone, Copy)]
pub(crate) struct PatternRef<'set> {
    ptr: *const bindings::FcPattern,
    lib: &'set FcLibrary,
    _set: PhantomData<&'set bindings::FcFontSet>,
}

impl<'set> PatternRef<'set> {
    /// # Safety
    /// `ptr` must be a valid pattern that outlives `'set`.
    pub(crate) unsafe fn from_ptr(ptr: *const bindings::FcPattern, lib: &'set FcLibrary) -> Self {
        Self {
            ptr,
            lib,
            _set: PhantomData,
        }
    }

    /// Returns the `n`-th string value of `object`, `None` once `n` runs past
    /// the last value (or the object is absent).
    pub(crate) fn get_string(&self, object: &CStr, n: usize) -> Option<&'set CStr> {
        let n = c_int::try_from(n).ok()?;
        let mut value = ptr::null_mut();

        let result =
            unsafe { (self.lib.FcPatternGetString)(self.ptr, object.as_ptr(), n, &mut value) };

        if result != bindings::FC_RESULT_MATCH || value.is_null() {
            return None;
        }

        // SAFETY: the string is owned by the pattern, which lives for 'set
        Some(unsafe { CStr::from_ptr(value) })
    }

    /// Iterates every string value stored under `object`.
    pub(crate) fn strings(self, object: &'set CStr) -> impl Iterator<Item = &'set CStr> + 'set {
        (0..).map_while(move |n| self.get_string(object, n))
    }
}
