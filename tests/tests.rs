use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use rust_fontchain::*;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// The system resolver, or `None` (test skipped) where fontconfig is not
/// installed.
fn fontconfig() -> Option<FcFallbackResolver> {
    init_logging();
    match FcFallbackResolver::new() {
        Ok(resolver) => Some(resolver),
        Err(e) => {
            eprintln!("skipping, fontconfig unavailable: {e}");
            None
        }
    }
}

fn helvetica_zh() -> FontDescriptor {
    FontDescriptor::family("Helvetica").with_language("zh-cn")
}

#[test]
fn chain_has_no_duplicates_and_only_existing_files() {
    let Some(resolver) = fontconfig() else { return };

    for descriptor in [
        helvetica_zh(),
        FontDescriptor::family("monospace"),
        FontDescriptor::family("serif").with_weight(FcWeight::BOLD).with_slant(FcSlant::ITALIC),
        FontDescriptor::default(),
    ] {
        let chain = resolver.resolve(&descriptor);

        let unique: HashSet<&PathBuf> = chain.iter().collect();
        assert_eq!(unique.len(), chain.len(), "duplicate paths for {descriptor:?}");
        for path in &chain {
            assert!(path.exists(), "{} does not exist", path.display());
        }
    }
}

#[test]
fn chain_is_deterministic() {
    let Some(resolver) = fontconfig() else { return };

    let first = resolver.resolve(&helvetica_zh());
    let second = resolver.resolve(&helvetica_zh());
    assert_eq!(first, second);
}

#[test]
fn mutating_a_copy_leaves_the_original_alone() {
    let Some(resolver) = fontconfig() else { return };

    let original = helvetica_zh();
    let before = resolver.resolve(&original);

    let mut copy = original.clone();
    copy.families.insert(0, "monospace".to_string());
    copy.language = Some("ja".to_string());
    let _ = resolver.resolve(&copy);

    assert_eq!(original, helvetica_zh());
    assert_eq!(resolver.resolve(&original), before);
}

#[test]
fn empty_descriptor_yields_default_chain() {
    let Some(resolver) = fontconfig() else { return };

    let installed = resolver.list_families("");
    let chain = resolver.resolve(&FontDescriptor::default());
    if !installed.is_empty() {
        assert!(!chain.is_empty(), "fonts are installed but the default chain is empty");
    }
}

#[test]
fn untrimmed_chain_is_at_least_as_long() {
    let Some(trimmed) = fontconfig() else { return };
    let Ok(untrimmed) = FcFallbackResolver::with_options(FcResolverOptions {
        trim: false,
        ..Default::default()
    }) else {
        return;
    };

    let descriptor = helvetica_zh();
    assert!(untrimmed.resolve(&descriptor).len() >= trimmed.resolve(&descriptor).len());
}

#[test]
fn families_are_sorted_and_unique() {
    let Some(resolver) = fontconfig() else { return };

    for language in ["zh-cn", "en", ""] {
        let families = resolver.list_families(language);
        assert!(
            families.windows(2).all(|pair| pair[0] < pair[1]),
            "{language:?}: {families:?} is not strictly sorted"
        );
    }
}

#[test]
fn resolve_single_finds_installed_families() {
    let Some(resolver) = fontconfig() else { return };

    let Some(family) = resolver.list_families("").into_iter().next() else {
        return;
    };
    let path = resolver.resolve_single(&family);
    assert!(path.is_some(), "{family:?} is installed but was not found");

    let lowercase = resolver.resolve_single(&family.to_lowercase());
    assert!(lowercase.is_some());
}

#[test]
fn resolve_single_never_substitutes() {
    let Some(resolver) = fontconfig() else { return };

    assert_eq!(resolver.resolve_single("NoSuchFont-rust-fontchain"), None);
    assert_eq!(resolver.resolve_single(""), None);
}

#[test]
fn unencodable_family_matches_nothing() {
    let Some(resolver) = fontconfig() else { return };

    assert!(resolver.resolve(&FontDescriptor::family("a\0b")).is_empty());
    assert_eq!(resolver.resolve_single("a\0b"), None);

    // Encodable families alongside still resolve
    let mixed = FontDescriptor::family("a\0b").with_family("monospace");
    assert_eq!(
        resolver.resolve(&mixed),
        resolver.resolve(&FontDescriptor::family("monospace"))
    );
}

#[test]
fn resolver_is_shared_across_threads() {
    let Some(resolver) = fontconfig() else { return };
    let resolver = Arc::new(resolver);
    let expected = resolver.resolve(&helvetica_zh());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let resolver = Arc::clone(&resolver);
            thread::spawn(move || resolver.resolve(&helvetica_zh()))
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}

#[test]
fn version_is_reported() {
    let Some(resolver) = fontconfig() else { return };
    assert!(resolver.handle().version().major >= 2);
}

#[test]
fn resolvers_behind_the_trait() {
    let mut registry = MemoryRegistry::new(r"C:\Windows\Fonts");
    registry.insert(RegistryScope::LocalMachine, "SimSun & NSimSun (TrueType)", "simsun.ttc");

    let mut resolvers: Vec<Box<dyn FontResolver>> = vec![Box::new(FcRegistryResolver::new(registry))];
    if let Some(fontconfig) = fontconfig() {
        resolvers.push(Box::new(fontconfig));
    }

    for resolver in &resolvers {
        assert_eq!(resolver.resolve_single("NoSuchFont-rust-fontchain"), None);
        let _ = select_font(resolver.as_ref(), "SimSun");
    }
}

#[cfg(not(windows))]
#[test]
fn system_resolver_is_fontconfig() {
    init_logging();
    let resolver: Result<SystemResolver, FcError> = system_resolver();
    if let Ok(resolver) = resolver {
        let _ = resolver.resolve(&FontDescriptor::default());
    }
}

#[cfg(feature = "parsing")]
#[test]
fn monospace_font_metrics() {
    let Some(resolver) = fontconfig() else { return };

    let Some(path) = resolver
        .resolve(&FontDescriptor::family("monospace"))
        .into_iter()
        .find(|path| {
            let extension = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
            matches!(extension.to_ascii_lowercase().as_str(), "ttf" | "otf")
        })
    else {
        return;
    };

    let face = FontFace::open(&path).unwrap();
    let size = f32::from(face.units_per_em());

    assert!(face.line_height(16.0) > 0);
    assert_eq!(face.measure("", 16.0), 0);
    assert!(face.measure("ab", 16.0) >= face.measure("a", 16.0));

    if face.is_fixed_width() {
        assert_eq!(face.measure("ab", size), 2 * face.measure("a", size));
    }
}
