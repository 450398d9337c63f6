//! Dependency version gating.
//!
//! [`Dependencies`] is the merged `dependencies` + `devDependencies` view of a
//! manifest. Comparisons coerce specifiers such as `^18.2.0` or `~4.1` to a
//! plain `major.minor.patch` [`semver::Version`]. A specifier that cannot be
//! coerced never gates a feature on: ordering predicates answer `false` and
//! [`Dependencies::versions_consistent`] answers `true`.

use indexmap::IndexMap;
use regex::Regex;
use semver::Version;
use std::sync::LazyLock;

static COERCE_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^\d])(\d{1,16})(?:\.(\d{1,16}))?(?:\.(\d{1,16}))?(?:$|[^\d])").ok()
});

/// Coerces a version specifier to `major.minor.patch`.
///
/// The first run of up to three dot-separated numbers wins; missing parts
/// become zero. Returns `None` when the string holds no number at all.
///
/// ```
/// use capkit_workspaces::version::coerce;
/// use semver::Version;
///
/// assert_eq!(coerce("^18.2.0"), Some(Version::new(18, 2, 0)));
/// assert_eq!(coerce("~4.1"), Some(Version::new(4, 1, 0)));
/// assert_eq!(coerce(">=15 <17"), Some(Version::new(15, 0, 0)));
/// assert_eq!(coerce("latest"), None);
/// ```
#[must_use]
pub fn coerce(specifier: &str) -> Option<Version> {
    let pattern = COERCE_PATTERN.as_ref()?;
    let captures = pattern.captures(specifier)?;

    let part = |index: usize| -> Option<u64> {
        captures
            .get(index)
            .map_or(Some(0), |m| m.as_str().parse::<u64>().ok())
    };

    Some(Version::new(part(1)?, part(2)?, part(3)?))
}

/// True when the specifier points at a git repository or tarball URL.
#[must_use]
pub fn is_remote_specifier(specifier: &str) -> bool {
    specifier.starts_with("git") || specifier.starts_with("http")
}

/// Merged dependency view of one manifest, in manifest order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dependencies {
    entries: IndexMap<String, String>,
}

impl Dependencies {
    /// Merges `dependencies` with `devDependencies`.
    ///
    /// On a key collision the `devDependencies` specifier wins while the key
    /// keeps its first position.
    #[must_use]
    pub fn merge(
        dependencies: IndexMap<String, String>,
        dev_dependencies: IndexMap<String, String>,
    ) -> Self {
        let mut entries = dependencies;
        for (name, specifier) in dev_dependencies {
            entries.insert(name, specifier);
        }
        Self { entries }
    }

    /// True if `name` is declared at all.
    #[must_use]
    pub fn exists(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// The raw specifier string for `name`.
    #[must_use]
    pub fn version_of(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    /// The coerced version of `name`. Remote specifiers are never coerced.
    #[must_use]
    pub fn normalized_version_of(&self, name: &str) -> Option<Version> {
        self.version_of(name)
            .filter(|specifier| !is_remote_specifier(specifier))
            .and_then(coerce)
    }

    /// `name` is declared at `version` or newer.
    #[must_use]
    pub fn is_at_least(&self, name: &str, version: &str) -> bool {
        self.compare(name, version, |installed, wanted| installed >= wanted)
    }

    /// `name` is declared below `version`.
    #[must_use]
    pub fn is_below(&self, name: &str, version: &str) -> bool {
        self.compare(name, version, |installed, wanted| installed < wanted)
    }

    /// `name` is declared at `version` or older.
    #[must_use]
    pub fn is_at_most(&self, name: &str, version: &str) -> bool {
        self.compare(name, version, |installed, wanted| installed <= wanted)
    }

    /// Both packages resolve to the same version.
    ///
    /// Vacuously true when either side is missing or cannot be coerced, so
    /// drift is only reported when both versions are known.
    #[must_use]
    pub fn versions_consistent(&self, first: &str, second: &str) -> bool {
        match (
            self.normalized_version_of(first),
            self.normalized_version_of(second),
        ) {
            (Some(a), Some(b)) => a == b,
            _ => true,
        }
    }

    /// Names starting with `prefix`, in manifest order.
    #[must_use]
    pub fn matching_prefix(&self, prefix: &str) -> Vec<&str> {
        self.entries
            .keys()
            .filter(|name| name.starts_with(prefix))
            .map(String::as_str)
            .collect()
    }

    /// Names whose specifier is a git or http(s) URL.
    #[must_use]
    pub fn remote_specifiers(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(_, specifier)| is_remote_specifier(specifier))
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// All `@capacitor/*` packages the project declares.
    #[must_use]
    pub fn capacitor_packages(&self) -> Vec<&str> {
        self.matching_prefix("@capacitor/")
    }

    /// Iterates `(name, specifier)` pairs in manifest order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, specifier)| (name.as_str(), specifier.as_str()))
    }

    /// Number of declared dependencies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn compare(&self, name: &str, version: &str, predicate: fn(&Version, &Version) -> bool) -> bool {
        match (self.normalized_version_of(name), coerce(version)) {
            (Some(installed), Some(wanted)) => predicate(&installed, &wanted),
            _ => false,
        }
    }
}
