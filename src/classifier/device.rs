//! Platform type and device brand detection.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::util::compile_static_regex;

/// Coarse device category of a user agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformType {
    /// Desktop or laptop computer. Also accepted as `"pc"`.
    #[serde(alias = "pc")]
    Desktop,
    /// Phone.
    Mobile,
    /// Tablet.
    Tablet,
    /// Self-identified crawler.
    Bot,
    /// Anything else.
    Other,
}

impl PlatformType {
    /// Every variant, in classification priority order.
    pub const ALL: [Self; 5] = [
        Self::Mobile,
        Self::Tablet,
        Self::Desktop,
        Self::Bot,
        Self::Other,
    ];

    /// Lowercase name used in the JSON Lines dataset.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Desktop => "desktop",
            Self::Mobile => "mobile",
            Self::Tablet => "tablet",
            Self::Bot => "bot",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for PlatformType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a platform name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown platform type '{0}' (expected desktop, pc, mobile, tablet, bot, or other)")]
pub struct UnknownPlatform(pub String);

impl FromStr for PlatformType {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "desktop" | "pc" => Ok(Self::Desktop),
            "mobile" => Ok(Self::Mobile),
            "tablet" => Ok(Self::Tablet),
            "bot" => Ok(Self::Bot),
            "other" => Ok(Self::Other),
            _ => Err(UnknownPlatform(s.to_string())),
        }
    }
}

static BOT_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_static_regex(r"(?i)bot\b|crawler|spider|slurp|bingpreview|facebookexternalhit")
});
static MOBILE_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_static_regex(r"iPhone|iPod|Mobi|Windows Phone|IEMobile|Opera Mini|BlackBerry")
});
static TABLET_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"iPad|Tablet|Kindle|Silk/|PlayBook"));
static DESKTOP_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"Windows NT|Macintosh|X11|CrOS|Linux"));

/// Classifies the device category.
///
/// Categories are tested in the order mobile, tablet, desktop, bot, and the
/// first match wins. An iPad is a tablet even though its agent carries
/// `Mobile/`, and an Android agent without `Mobile` is a tablet. A crawler
/// carrying a desktop OS token is a desktop; only agents with no device token
/// fall through to bot.
#[must_use]
pub fn detect_platform(ua: &str) -> PlatformType {
    let android = ua.contains("Android");
    let tablet = TABLET_RE.is_match(ua) || (android && !ua.contains("Mobi"));
    if !tablet && MOBILE_RE.is_match(ua) {
        PlatformType::Mobile
    } else if tablet {
        PlatformType::Tablet
    } else if DESKTOP_RE.is_match(ua) {
        PlatformType::Desktop
    } else if BOT_RE.is_match(ua) {
        PlatformType::Bot
    } else {
        PlatformType::Other
    }
}

static BRAND_RULES: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    [
        ("Samsung", r"\bSM-[A-Z0-9]|\bGT-[A-Z0-9]|(?i:samsung)"),
        ("Google", r"\bPixel\b|\bNexus\b"),
        ("Xiaomi", r"(?i:\bredmi\b|\bxiaomi\b|\bpoco\b)|\bMi \d|\bM2\d{3}"),
        ("Huawei", r"(?i:huawei|\bhonor\b)"),
        ("OnePlus", r"(?i:oneplus)"),
        ("Motorola", r"(?i:motorola|\bmoto )|\bXT\d{4}"),
        ("LG", r"\bLG[-_ ]|\bLM-[A-Z0-9]"),
        ("Sony", r"(?i:\bsony\b|xperia)"),
    ]
    .into_iter()
    .map(|(brand, pattern)| (brand, compile_static_regex(pattern)))
    .collect()
});

/// Detects the device manufacturer.
///
/// Apple devices are recognized from their platform tokens. Android agents
/// are matched against known model prefixes and fall back to
/// `"Generic_Android"`. Desktop agents on other systems report no brand.
#[must_use]
pub fn detect_brand(ua: &str) -> Option<String> {
    if ["iPhone", "iPad", "iPod", "Macintosh"]
        .iter()
        .any(|token| ua.contains(token))
    {
        return Some("Apple".to_string());
    }
    if !ua.contains("Android") {
        return None;
    }
    let brand = BRAND_RULES
        .iter()
        .find(|(_, re)| re.is_match(ua))
        .map_or("Generic_Android", |(brand, _)| brand);
    Some(brand.to_string())
}
