//! Request name resolution and OS filter expansion.

use std::collections::HashMap;

/// Tables that turn caller spellings into canonical browser and OS keys.
///
/// A browser request is first rewritten by the replacement table (spaces and
/// underscores removed by default), then lowercased, then looked up in the
/// shortcut table. So `"Internet_Explorer"`, `"ie"` and `"msie"` all become
/// `"internet explorer"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasTable {
    replacements: Vec<(String, String)>,
    shortcuts: HashMap<String, String>,
    os_expansions: HashMap<String, Vec<String>>,
}

const DEFAULT_SHORTCUTS: &[(&str, &str)] = &[
    ("internetexplorer", "internet explorer"),
    ("ie", "internet explorer"),
    ("msie", "internet explorer"),
    ("edge", "edge"),
    ("microsoftedge", "edge"),
    ("msedge", "edge"),
    ("google", "chrome"),
    ("googlechrome", "chrome"),
    ("ff", "firefox"),
    ("mozillafirefox", "firefox"),
    ("samsung", "samsung internet"),
    ("samsunginternet", "samsung internet"),
    ("yandex", "yandex browser"),
    ("yandexbrowser", "yandex browser"),
    ("ucbrowser", "uc browser"),
];

impl Default for AliasTable {
    fn default() -> Self {
        Self {
            replacements: vec![
                (" ".to_string(), String::new()),
                ("_".to_string(), String::new()),
            ],
            shortcuts: DEFAULT_SHORTCUTS
                .iter()
                .map(|(alias, canonical)| ((*alias).to_string(), (*canonical).to_string()))
                .collect(),
            os_expansions: HashMap::from([(
                "windows".to_string(),
                ["win10", "win7", "win8", "win8.1", "windows"]
                    .into_iter()
                    .map(String::from)
                    .collect(),
            )]),
        }
    }
}

impl AliasTable {
    /// A table that resolves nothing: requests are only lowercased.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            replacements: Vec::new(),
            shortcuts: HashMap::new(),
            os_expansions: HashMap::new(),
        }
    }

    /// Adds a substring replacement applied before lowercasing.
    #[must_use]
    pub fn with_replacement(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.replacements.push((from.into(), to.into()));
        self
    }

    /// Maps `alias` (as it looks after replacements and lowercasing) to `canonical`.
    #[must_use]
    pub fn with_shortcut(mut self, alias: impl Into<String>, canonical: impl Into<String>) -> Self {
        self.shortcuts.insert(alias.into(), canonical.into());
        self
    }

    /// Expands the OS filter value `name` into `targets`.
    #[must_use]
    pub fn with_os_expansion<I, S>(mut self, name: impl Into<String>, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.os_expansions
            .insert(name.into(), targets.into_iter().map(Into::into).collect());
        self
    }

    /// Resolves a browser request to its canonical key.
    #[must_use]
    pub fn resolve_browser(&self, request: &str) -> String {
        let mut key = request.trim().to_string();
        for (from, to) in &self.replacements {
            if !from.is_empty() {
                key = key.replace(from.as_str(), to);
            }
        }
        let key = key.to_lowercase();
        self.shortcuts.get(&key).cloned().unwrap_or(key)
    }

    /// Expands one OS filter value, e.g. `windows` into every Windows release key.
    #[must_use]
    pub fn expand_os(&self, os: &str) -> Vec<String> {
        let key = os.trim().to_lowercase();
        self.os_expansions
            .get(&key)
            .cloned()
            .unwrap_or_else(|| vec![key])
    }
}
