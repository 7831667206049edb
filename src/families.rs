//! Enumerates installed families by language.

use crate::fontconfig::bindings::objects;
use crate::fontconfig::{FontConfigHandle, FontSet, ObjectSet, Pattern};

/// Lists every installed family that declares support for `language`,
/// sorted and without duplicates.
///
/// Each font contributes one name: its family name localized for
/// `language` if it has one, otherwise its first-listed family name (see
/// [`pick_family_name`]).
pub fn list_families(handle: &FontConfigHandle, language: &str) -> Vec<String> {
    let mut names = handle.with_config(|lib, config| {
        let Some(mut pattern) = Pattern::new(lib) else {
            log::error!("fontconfig could not allocate a pattern");
            return Vec::new();
        };
        if !language.is_empty() && !pattern.add_string(objects::FC_LANG, language) {
            return Vec::new();
        }

        let Some(mut object_set) = ObjectSet::new(lib) else {
            log::error!("fontconfig could not allocate an object set");
            return Vec::new();
        };
        if !object_set.add(objects::FC_FAMILY) || !object_set.add(objects::FC_FAMILYLANG) {
            log::error!("fontconfig could not fill the object set");
            return Vec::new();
        }

        let listed = unsafe {
            let ptr = (lib.FcFontList)(config, pattern.as_ptr(), object_set.as_ptr());
            FontSet::from_ptr(ptr, lib)
        };
        let Some(listed) = listed else {
            return Vec::new();
        };

        let mut names = Vec::with_capacity(listed.len());
        for font in listed.iter() {
            // familylang runs parallel to family, index for index
            let localized: Vec<(String, Option<String>)> = font
                .strings(objects::FC_FAMILY)
                .enumerate()
                .map(|(n, family)| {
                    let family_language = font
                        .get_string(objects::FC_FAMILYLANG, n)
                        .map(|lang| lang.to_string_lossy().into_owned());
                    (family.to_string_lossy().into_owned(), family_language)
                })
                .collect();

            match pick_family_name(&localized, language) {
                Some(name) => {
                    log::trace!("{localized:?} -> {name:?}");
                    names.push(String::from(name));
                }
                None => log::trace!("Skipping a font without family name"),
            }
        }
        names
    });

    // Deduplicate only once every font has contributed
    names.sort();
    names.dedup();
    names
}

/// Picks the representative name of one font from its
/// `(family, family language)` pairs.
///
/// The first-listed family is the fallback. The first pair whose language
/// equals `language` exactly replaces it and ends the scan. Returns `None`
/// for a font without any family name.
pub fn pick_family_name<'a>(localized: &'a [(String, Option<String>)], language: &str) -> Option<&'a str> {
    let (first, _) = localized.first()?;
    let mut chosen = first.as_str();

    for (family, family_language) in localized {
        if family_language.as_deref() == Some(language) {
            chosen = family.as_str();
            break;
        }
    }

    Some(chosen)
}
