//! The font request value handed to every resolver.

/// fontconfig weight class (`FC_WEIGHT`).
///
/// Any integer is accepted; the constants are the classes fontconfig itself
/// defines.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct FcWeight(pub i32);

impl FcWeight {
    pub const THIN: Self = Self(0);
    pub const EXTRA_LIGHT: Self = Self(40);
    pub const LIGHT: Self = Self(50);
    pub const DEMI_LIGHT: Self = Self(55);
    pub const BOOK: Self = Self(75);
    pub const REGULAR: Self = Self(80);
    pub const MEDIUM: Self = Self(100);
    pub const DEMI_BOLD: Self = Self(180);
    pub const BOLD: Self = Self(200);
    pub const EXTRA_BOLD: Self = Self(205);
    pub const BLACK: Self = Self(210);
    pub const EXTRA_BLACK: Self = Self(215);
}

/// fontconfig slant class (`FC_SLANT`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct FcSlant(pub i32);

impl FcSlant {
    pub const ROMAN: Self = Self(0);
    pub const ITALIC: Self = Self(100);
    pub const OBLIQUE: Self = Self(110);
}

/// Describes the font a caller wants.
///
/// Every field is optional: an empty descriptor asks for the platform's
/// default fallback chain. Resolvers only ever borrow a descriptor, so a
/// value stays exactly as the caller built it. `Clone` is a deep copy.
///
/// ```rust
/// use rust_fontchain::{FcWeight, FontDescriptor};
///
/// let query = FontDescriptor {
///     families: vec!["Consolas".to_string(), "monospace".to_string()],
///     weight: Some(FcWeight::BOLD),
///     language: Some("zh-cn".to_string()),
///     ..Default::default()
/// };
/// assert_eq!(query.families[0], "Consolas");
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FontDescriptor {
    /// Family names, highest priority first. Later entries are explicit
    /// fallbacks requested by the caller.
    ///
    /// A name containing a null byte never matches an installed font.
    pub families: Vec<String>,
    /// `None` lets the platform default apply
    pub weight: Option<FcWeight>,
    /// `None` lets the platform default apply
    pub slant: Option<FcSlant>,
    /// Language tag such as `"zh-cn"`, influences substitution and ranking
    pub language: Option<String>,
}

impl FontDescriptor {
    /// Shorthand for a descriptor that only names one family.
    pub fn family(name: &str) -> Self {
        Self {
            families: vec![String::from(name)],
            ..Default::default()
        }
    }

    pub fn with_family(mut self, name: &str) -> Self {
        self.families.push(String::from(name));
        self
    }

    pub fn with_weight(mut self, weight: FcWeight) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn with_slant(mut self, slant: FcSlant) -> Self {
        self.slant = Some(slant);
        self
    }

    pub fn with_language(mut self, language: &str) -> Self {
        self.language = Some(String::from(language));
        self
    }

    /// True if no attribute at all was requested.
    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
            && self.weight.is_none()
            && self.slant.is_none()
            && self.language.is_none()
    }
}
