use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::registry::{is_absolute_registry_path, matches_display_name};
use crate::*;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn localized(pairs: &[(&str, Option<&str>)]) -> Vec<(String, Option<String>)> {
    pairs
        .iter()
        .map(|(family, lang)| (family.to_string(), lang.map(String::from)))
        .collect()
}

#[test]
fn descriptor_clone_is_independent() {
    let original = FontDescriptor::family("Helvetica").with_language("zh-cn");

    let mut copy = original.clone();
    copy.families.push("Consolas".to_string());
    copy.weight = Some(FcWeight::BOLD);
    copy.language = Some("ja".to_string());

    assert_eq!(original.families, vec!["Helvetica".to_string()]);
    assert_eq!(original.weight, None);
    assert_eq!(original.language.as_deref(), Some("zh-cn"));
    assert_ne!(original, copy);
}

#[test]
fn descriptor_builders() {
    let descriptor = FontDescriptor::family("Consolas")
        .with_family("monospace")
        .with_weight(FcWeight::BOLD)
        .with_slant(FcSlant::ITALIC);

    assert_eq!(descriptor.families, vec!["Consolas", "monospace"]);
    assert_eq!(descriptor.weight, Some(FcWeight(200)));
    assert_eq!(descriptor.slant, Some(FcSlant(100)));
    assert!(!descriptor.is_empty());
    assert!(FontDescriptor::default().is_empty());
}

#[test]
fn family_name_prefers_exact_language() {
    let names = localized(&[
        ("WenQuanYi Zen Hei", Some("en")),
        ("文泉驿正黑", Some("zh-cn")),
        ("文泉驛正黑", Some("zh-tw")),
    ]);
    assert_eq!(pick_family_name(&names, "zh-cn"), Some("文泉驿正黑"));
    assert_eq!(pick_family_name(&names, "zh-tw"), Some("文泉驛正黑"));
}

#[test]
fn family_name_falls_back_to_first() {
    let names = localized(&[("Noto Sans CJK SC", Some("en")), ("Noto Sans CJK", None)]);
    assert_eq!(pick_family_name(&names, "zh-cn"), Some("Noto Sans CJK SC"));

    // Language comparison is exact
    let names = localized(&[("DejaVu Sans", Some("en")), ("Other", Some("zh-CN"))]);
    assert_eq!(pick_family_name(&names, "zh-cn"), Some("DejaVu Sans"));
}

#[test]
fn family_name_first_exact_match_wins() {
    let names = localized(&[
        ("AR PL UMing", Some("en")),
        ("AR PL 明体", Some("zh-cn")),
        ("AR PL 新明体", Some("zh-cn")),
    ]);
    assert_eq!(pick_family_name(&names, "zh-cn"), Some("AR PL 明体"));
}

#[test]
fn family_name_of_unnamed_font() {
    assert_eq!(pick_family_name(&[], "zh-cn"), None);
}

#[test]
fn display_name_prefix_match() {
    assert!(matches_display_name("SimSun & NSimSun (TrueType)", "simsun"));
    assert!(matches_display_name("SimSun (TrueType)", "SIMSUN"));
    assert!(matches_display_name("Consolas", "Consolas"));
    assert!(!matches_display_name("Consolas", "Consolas Bold"));
    assert!(!matches_display_name("NSimSun", "SimSun"));
    assert!(!matches_display_name("Arial", ""));
}

#[test]
fn absolute_registry_paths() {
    assert!(is_absolute_registry_path(r"C:\Users\me\AppData\Local\Microsoft\Windows\Fonts\a.ttf"));
    assert!(is_absolute_registry_path("D:/fonts/b.otf"));
    assert!(is_absolute_registry_path(r"\\fileserver\fonts\c.ttf"));
    assert!(!is_absolute_registry_path("simsun.ttc"));
    assert!(!is_absolute_registry_path(r"sub\consola.ttf"));
    assert!(!is_absolute_registry_path("C:relative.ttf"));
}

fn sample_registry() -> MemoryRegistry {
    let mut registry = MemoryRegistry::new(r"C:\Windows\Fonts");
    registry
        .insert(RegistryScope::LocalMachine, "Arial (TrueType)", "arial.ttf")
        .insert(RegistryScope::LocalMachine, "SimSun & NSimSun (TrueType)", "simsun.ttc")
        .insert(RegistryScope::LocalMachine, "Consolas (TrueType)", "consola.ttf");
    registry
}

#[test]
fn registry_lookup_is_case_insensitive() {
    init_logging();
    let resolver = FcRegistryResolver::new(sample_registry());

    let path = resolver.lookup("simsun").unwrap();
    assert_eq!(path, Path::new(r"C:\Windows\Fonts").join("simsun.ttc"));
    assert_eq!(resolver.lookup("SimSun"), Some(path));
}

#[test]
fn registry_lookup_missing_font() {
    let resolver = FcRegistryResolver::new(sample_registry());
    assert_eq!(resolver.lookup("NoSuchFont"), None);
    assert_eq!(resolver.lookup(""), None);
}

#[test]
fn registry_per_user_overrides_machine() {
    let mut registry = sample_registry();
    registry.insert(
        RegistryScope::CurrentUser,
        "Consolas (TrueType)",
        r"C:\Users\me\AppData\Local\Microsoft\Windows\Fonts\consola.ttf",
    );

    let resolver = FcRegistryResolver::new(registry);
    assert_eq!(
        resolver.lookup("consolas"),
        Some(PathBuf::from(r"C:\Users\me\AppData\Local\Microsoft\Windows\Fonts\consola.ttf"))
    );
    // Not registered per user, found machine-wide
    assert_eq!(
        resolver.lookup("arial"),
        Some(Path::new(r"C:\Windows\Fonts").join("arial.ttf"))
    );
}

#[test]
fn registry_first_enumerated_match_wins() {
    let mut registry = MemoryRegistry::new("/fonts");
    registry
        .insert(RegistryScope::LocalMachine, "Sim Hei (TrueType)", "simhei.ttf")
        .insert(RegistryScope::LocalMachine, "Sim (TrueType)", "sim.ttf");

    let resolver = FcRegistryResolver::new(registry);
    assert_eq!(resolver.lookup("sim"), Some(PathBuf::from("/fonts/simhei.ttf")));
}

#[test]
fn registry_unopenable_scope_is_skipped() {
    // Only the machine-wide scope exists
    let resolver = FcRegistryResolver::new(sample_registry());
    assert!(resolver.source().open_scope(RegistryScope::CurrentUser).is_none());
    assert!(resolver.lookup("Consolas").is_some());

    let mut empty_user = sample_registry();
    empty_user.create_scope(RegistryScope::CurrentUser);
    assert!(empty_user.open_scope(RegistryScope::CurrentUser).is_some());
    assert!(FcRegistryResolver::new(empty_user).lookup("Consolas").is_some());
}

#[test]
fn registry_chain_keeps_order_and_skips_missing() {
    let resolver = FcRegistryResolver::new(sample_registry());
    let descriptor = FontDescriptor::family("Consolas")
        .with_family("NoSuchFont")
        .with_family("SimSun")
        .with_family("consolas");

    let chain = resolver.resolve_chain(&descriptor);
    let font_dir = Path::new(r"C:\Windows\Fonts");
    assert_eq!(chain, vec![font_dir.join("consola.ttf"), font_dir.join("simsun.ttc")]);
    assert!(resolver.resolve_chain(&FontDescriptor::default()).is_empty());
}

#[test]
fn version_unpacking() {
    let version = FcVersion::from_packed(21_401);
    assert_eq!(
        version,
        FcVersion {
            major: 2,
            minor: 14,
            revision: 1
        }
    );
    assert_eq!(version.to_string(), "2.14.1");
    assert_eq!(FcVersion::from_packed(-5).to_string(), "0.0.0");
}

#[test]
fn resolver_options_default() {
    let options = FcResolverOptions::default();
    assert!(options.suppress_warnings);
    assert!(options.trim);
    assert!(options.library_path.is_none());
}

/// Resolver over a fixed name -> path table, recording every request.
struct FixedResolver {
    fonts: BTreeMap<&'static str, PathBuf>,
    requests: RefCell<Vec<String>>,
}

impl FixedResolver {
    fn new(fonts: &[(&'static str, &str)]) -> Self {
        Self {
            fonts: fonts.iter().map(|(name, path)| (*name, PathBuf::from(path))).collect(),
            requests: RefCell::new(Vec::new()),
        }
    }
}

impl FontResolver for FixedResolver {
    fn resolve_single(&self, name: &str) -> Option<PathBuf> {
        self.requests.borrow_mut().push(name.to_string());
        self.fonts.get(name).cloned()
    }

    fn resolve_chain(&self, descriptor: &FontDescriptor) -> Vec<PathBuf> {
        descriptor
            .families
            .iter()
            .filter_map(|family| self.fonts.get(family.as_str()).cloned())
            .collect()
    }
}

#[test]
fn select_font_uses_requested_font() {
    let resolver = FixedResolver::new(&[("Consolas", "/fonts/consola.ttf"), ("SimSun", "/fonts/simsun.ttc")]);

    let path = select_font(&resolver, "Consolas").unwrap();
    assert_eq!(path, PathBuf::from("/fonts/consola.ttf"));
    assert_eq!(*resolver.requests.borrow(), vec!["Consolas"]);
}

#[test]
fn select_font_falls_back_to_default() {
    init_logging();
    let resolver = FixedResolver::new(&[("SimSun", "/fonts/simsun.ttc")]);

    let path = select_font(&resolver, "Fixedsys Excelsior").unwrap();
    assert_eq!(path, PathBuf::from("/fonts/simsun.ttc"));
    assert_eq!(*resolver.requests.borrow(), vec!["Fixedsys Excelsior", DEFAULT_FAMILY]);
}

#[test]
fn select_font_without_default_is_fatal() {
    let resolver = FixedResolver::new(&[("Arial", "/fonts/arial.ttf")]);

    match select_font(&resolver, "Consolas") {
        Err(FcError::DefaultFontMissing { requested, default }) => {
            assert_eq!(requested, "Consolas");
            assert_eq!(default, "SimSun");
        }
        other => panic!("expected DefaultFontMissing, got {other:?}"),
    }
}

#[test]
fn select_font_through_registry() {
    let resolver = FcRegistryResolver::new(sample_registry());
    let path = select_font(&resolver, "Fixedsys").unwrap();
    assert!(path.ends_with("simsun.ttc"));
}

#[cfg(feature = "parsing")]
#[test]
fn font_face_rejects_garbage() {
    let result = FontFace::parse(Path::new("garbage.ttf"), b"definitely not a font file");
    assert!(matches!(result, Err(FcError::FontParse { .. })), "{result:?}");
}

#[cfg(feature = "parsing")]
#[test]
fn font_face_missing_file() {
    let result = FontFace::open(Path::new("/nonexistent/rust-fontchain/missing.ttf"));
    assert!(matches!(result, Err(FcError::Io { .. })), "{result:?}");
}

#[test]
fn only_unencodable_families_match_nothing() {
    use crate::chain::names_only_unencodable_families;

    assert!(names_only_unencodable_families(&FontDescriptor::family("a\0b")));
    assert!(!names_only_unencodable_families(
        &FontDescriptor::family("a\0b").with_family("monospace")
    ));
    assert!(!names_only_unencodable_families(&FontDescriptor::default()));
    assert!(!names_only_unencodable_families(&FontDescriptor::family("SimSun")));
}

#[test]
fn registry_enumeration_stops_on_errors() {
    use crate::registry::{enumeration_step, EnumerationStep};

    assert_eq!(enumeration_step(0), EnumerationStep::Read);
    // ERROR_MORE_DATA
    assert_eq!(enumeration_step(234), EnumerationStep::Skip);
    // ERROR_NO_MORE_ITEMS, ERROR_INVALID_HANDLE, ERROR_ACCESS_DENIED
    assert_eq!(enumeration_step(259), EnumerationStep::Stop);
    assert_eq!(enumeration_step(6), EnumerationStep::Stop);
    assert_eq!(enumeration_step(5), EnumerationStep::Stop);
}

#[cfg(unix)]
fn fd_identity(fd: libc::c_int) -> (u64, u64) {
    let mut stat: libc::stat = unsafe { std::mem::zeroed() };
    assert_eq!(unsafe { libc::fstat(fd, &mut stat) }, 0);
    (stat.st_dev as u64, stat.st_ino as u64)
}

#[cfg(unix)]
fn null_device_identity() -> (u64, u64) {
    use std::os::unix::io::AsRawFd;

    let null = std::fs::OpenOptions::new().write(true).open("/dev/null").unwrap();
    fd_identity(null.as_raw_fd())
}

// fd 2 is process-wide: every check on it stays in this one test
#[cfg(unix)]
#[test]
fn stderr_is_restored_on_every_path() {
    use crate::fontconfig::QuietStderr;

    let original = fd_identity(libc::STDERR_FILENO);

    {
        let _quiet = QuietStderr::acquire();
        assert_eq!(fd_identity(libc::STDERR_FILENO), null_device_identity());
    }
    assert_eq!(fd_identity(libc::STDERR_FILENO), original);

    assert!(QuietStderr::acquire_if(false).is_none());
    assert_eq!(fd_identity(libc::STDERR_FILENO), original);

    let unwound = std::panic::catch_unwind(|| {
        let _quiet = QuietStderr::acquire();
        panic!("fontconfig blew up while stderr was redirected");
    });
    assert!(unwound.is_err());
    assert_eq!(fd_identity(libc::STDERR_FILENO), original);

    // The lock poisoned by the panic does not block later guards
    drop(QuietStderr::acquire());
    assert_eq!(fd_identity(libc::STDERR_FILENO), original);

    if let Ok(resolver) = FcFallbackResolver::new() {
        assert_eq!(fd_identity(libc::STDERR_FILENO), original);
        let _ = resolver.resolve(&FontDescriptor::family("Helvetica").with_language("zh-cn"));
        assert_eq!(fd_identity(libc::STDERR_FILENO), original);
        drop(resolver);
        assert_eq!(fd_identity(libc::STDERR_FILENO), original);
    }
}
