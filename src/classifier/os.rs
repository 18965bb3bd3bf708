//! Operating system detection and canonicalization.

use std::sync::LazyLock;

use regex::Regex;

use crate::util::compile_static_regex;

/// A detected operating system, before canonicalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OsMatch {
    /// Family as the user agent spells it, e.g. `"Windows"` or `"Mac OS X"`.
    pub family: String,
    /// Dotted version, when one is present.
    pub version: Option<String>,
}

static WINDOWS_PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"Windows Phone(?: OS)? (\d+(?:\.\d+)?)"));
static IOS_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_static_regex(r"(?:iPhone|iPad|iPod).*?\bOS (\d+)(?:_(\d+))?(?:_(\d+))?")
});
static IOS_DEVICE_RE: LazyLock<Regex> = LazyLock::new(|| compile_static_regex(r"iPhone|iPad|iPod"));
static MAC_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"Mac OS X (\d+)(?:[_.](\d+))?(?:[_.](\d+))?"));
static ANDROID_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"Android[ /]?(\d+)?(?:\.(\d+))?(?:\.(\d+))?"));
static WINDOWS_NT_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"Windows NT (\d+\.\d+)"));
static LINUX_DISTRO_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_static_regex(r"(?i)\b(ubuntu|fedora|debian|mint|gentoo|opensuse|suse|arch linux)\b")
});
static LINUX_FAMILY_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_static_regex(
        r"^(?:linux|ubuntu|fedora|debian|mint|gentoo|opensuse|suse|arch linux|kubuntu|red hat)$",
    )
});

/// Detects the operating system family and version.
///
/// Platform tokens are checked from most to least specific: phone and tablet
/// systems first, then desktops, then bare `Linux`. Anything unrecognized is
/// reported as family `"Other"`.
#[must_use]
pub fn detect_os(ua: &str) -> OsMatch {
    if let Some(caps) = WINDOWS_PHONE_RE.captures(ua) {
        return OsMatch::new("Windows Phone", Some(caps[1].to_string()));
    }
    if let Some(caps) = IOS_RE.captures(ua) {
        return OsMatch::new("iOS", join_parts(&caps));
    }
    if IOS_DEVICE_RE.is_match(ua) {
        return OsMatch::new("iOS", None);
    }
    if let Some(caps) = ANDROID_RE.captures(ua) {
        return OsMatch::new("Android", join_parts(&caps));
    }
    if ua.contains("CrOS") {
        return OsMatch::new("Chrome OS", None);
    }
    if let Some(caps) = MAC_RE.captures(ua) {
        return OsMatch::new("Mac OS X", join_parts(&caps));
    }
    if ua.contains("Macintosh") {
        return OsMatch::new("Mac OS X", None);
    }
    if let Some(caps) = WINDOWS_NT_RE.captures(ua) {
        return OsMatch::new("Windows", Some(windows_release(&caps[1]).to_string()));
    }
    if ua.contains("Windows") {
        return OsMatch::new("Windows", None);
    }
    if let Some(caps) = LINUX_DISTRO_RE.captures(ua) {
        return OsMatch::new(&caps[1], None);
    }
    if ua.contains("Linux") || ua.contains("X11") {
        return OsMatch::new("Linux", None);
    }
    OsMatch::new("Other", None)
}

impl OsMatch {
    fn new(family: &str, version: Option<String>) -> Self {
        Self {
            family: family.to_string(),
            version,
        }
    }
}

/// Maps an NT kernel version to the marketing release.
fn windows_release(nt: &str) -> &str {
    match nt {
        "10.0" => "10",
        "6.3" => "8.1",
        "6.2" => "8",
        "6.1" => "7",
        "6.0" => "Vista",
        "5.1" | "5.2" => "XP",
        other => other,
    }
}

fn join_parts(caps: &regex::Captures<'_>) -> Option<String> {
    let parts: Vec<&str> = caps.iter().skip(1).flatten().map(|m| m.as_str()).collect();
    (!parts.is_empty()).then(|| parts.join("."))
}

/// Collapses an OS family and version into the short name stored in records.
///
/// Windows releases with a well-known filter name map to `win10`, `win8.1`,
/// `win8`, and `win7`; other Windows versions become `windows`. Linux
/// distributions collapse to `linux`. Unknown families are lowercased.
///
/// ```
/// use fakeua_core::classifier::canonicalize_os;
///
/// assert_eq!(canonicalize_os("Windows", Some("10")), "win10");
/// assert_eq!(canonicalize_os("Mac OS X", Some("10.15.7")), "macos");
/// assert_eq!(canonicalize_os("Ubuntu", None), "linux");
/// ```
#[must_use]
pub fn canonicalize_os(family: &str, version: Option<&str>) -> String {
    let lower = family.trim().to_lowercase();
    let canonical = match lower.as_str() {
        "windows" => match version {
            Some("10") => "win10",
            Some("8.1") => "win8.1",
            Some("8") => "win8",
            Some("7") => "win7",
            _ => "windows",
        },
        "ios" | "ipados" => "ios",
        "mac os x" | "macos" | "os x" => "macos",
        "android" => "android",
        "chrome os" | "chromeos" => "chromeos",
        "" => "other",
        name if LINUX_FAMILY_RE.is_match(name) => "linux",
        name => return name.to_string(),
    };
    canonical.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_windows_nt_versions() {
        let os = detect_os("Mozilla/5.0 (Windows NT 10.0; Win64; x64) Chrome/122.0.0.0");
        assert_eq!(os.family, "Windows");
        assert_eq!(os.version.as_deref(), Some("10"));

        let os = detect_os("Mozilla/5.0 (Windows NT 6.1; WOW64) Firefox/52.0");
        assert_eq!(canonicalize_os(&os.family, os.version.as_deref()), "win7");

        let os = detect_os("Mozilla/4.0 (compatible; MSIE 6.0; Windows NT 5.1)");
        assert_eq!(os.version.as_deref(), Some("XP"));
        assert_eq!(canonicalize_os(&os.family, os.version.as_deref()), "windows");
    }

    #[test]
    fn test_apple_platforms() {
        let os = detect_os("Mozilla/5.0 (iPhone; CPU iPhone OS 17_2_1 like Mac OS X) Mobile/15E148");
        assert_eq!(os.family, "iOS");
        assert_eq!(os.version.as_deref(), Some("17.2.1"));

        let os = detect_os("Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) Safari/605.1.15");
        assert_eq!(os.family, "Mac OS X");
        assert_eq!(os.version.as_deref(), Some("10.15.7"));
    }

    #[test]
    fn test_android_before_linux() {
        let os = detect_os("Mozilla/5.0 (Linux; Android 14; Pixel 8) Chrome/120.0.0.0 Mobile");
        assert_eq!(os.family, "Android");
        assert_eq!(os.version.as_deref(), Some("14"));
    }

    #[test]
    fn test_linux_distros_collapse() {
        let os = detect_os("Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:121.0) Firefox/121.0");
        assert_eq!(os.family, "Ubuntu");
        assert_eq!(canonicalize_os(&os.family, None), "linux");

        let os = detect_os("Mozilla/5.0 (X11; Linux x86_64) Chrome/120.0.0.0");
        assert_eq!(canonicalize_os(&os.family, None), "linux");
    }

    #[test]
    fn test_chrome_os_and_unknown() {
        let os = detect_os("Mozilla/5.0 (X11; CrOS x86_64 14541.0.0) Chrome/120.0.0.0");
        assert_eq!(canonicalize_os(&os.family, None), "chromeos");

        let os = detect_os("SomethingElse/1.0");
        assert_eq!(canonicalize_os(&os.family, None), "other");
    }

    #[test]
    fn test_canonicalize_windows_releases() {
        assert_eq!(canonicalize_os("Windows", Some("8.1")), "win8.1");
        assert_eq!(canonicalize_os("Windows", Some("8")), "win8");
        assert_eq!(canonicalize_os("Windows", None), "windows");
        assert_eq!(canonicalize_os("FreeBSD", None), "freebsd");
    }
}
