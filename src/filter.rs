use std::path::{Component, Path};

pub const CLASS_SUFFIX: &str = ".class";

/// Prefixes scanned when none are given on the command line.
pub const DEFAULT_PREFIXES: &[&str] = &["net/minecraft/", "com/mojang/"];

/// Accepts `.class` entries whose forward-slash relative path starts with one of
/// the configured prefixes. No prefixes means every `.class` entry matches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathFilter {
    prefixes: Vec<String>,
}

impl PathFilter {
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            prefixes: prefixes
                .into_iter()
                .map(|p| normalize_prefix(p.as_ref()))
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    pub fn matches(&self, relative: &str) -> bool {
        if !relative.ends_with(CLASS_SUFFIX) {
            return false;
        }
        self.prefixes.is_empty() || self.prefixes.iter().any(|p| relative.starts_with(p.as_str()))
    }
}

pub fn normalize_prefix(raw: &str) -> String {
    normalize_entry_name(raw.trim())
}

/// Forward slashes, no leading `./` or `/`. Archive entry names and prefixes
/// are compared in this form.
pub fn normalize_entry_name(raw: &str) -> String {
    let s = raw.replace('\\', "/");
    let mut s = s.as_str();
    loop {
        let stripped = s.trim_start_matches('/');
        match stripped.strip_prefix("./") {
            Some(rest) => s = rest,
            None => return stripped.to_string(),
        }
    }
}

/// Joins the normal components of `path` below `root` with `/`, whatever the
/// host separator is. Non-UTF-8 components are converted lossily, so the key
/// names the file but cannot always be turned back into its path.
pub fn relative_key(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn default_prefixes_pick_game_packages_only() {
        let filter = PathFilter::new(DEFAULT_PREFIXES.iter().copied());
        assert!(filter.matches("net/minecraft/Foo.class"));
        assert!(filter.matches("com/mojang/Baz.class"));
        assert!(!filter.matches("net/other/Bar.class"));
        assert!(!filter.matches("net/minecraft/readme.txt"));
        assert!(!filter.matches("readme.txt"));
    }

    #[test]
    fn empty_filter_accepts_any_class_file() {
        let filter = PathFilter::default();
        assert!(filter.matches("Top.class"));
        assert!(filter.matches("a/b/C$1.class"));
        assert!(!filter.matches("a/b/C.java"));
    }

    #[test]
    fn prefixes_are_normalized_to_forward_slashes() {
        let filter = PathFilter::new(["  .\\net\\minecraft\\", "/com/mojang/", "", "./"]);
        assert_eq!(filter.prefixes(), &["net/minecraft/", "com/mojang/"]);
    }

    #[test]
    fn entry_names_drop_dot_and_root_markers() {
        assert_eq!(normalize_entry_name("net\\minecraft\\Foo.class"), "net/minecraft/Foo.class");
        assert_eq!(normalize_entry_name("./net/Foo.class"), "net/Foo.class");
        assert_eq!(normalize_entry_name("/././/a/B.class"), "a/B.class");
        assert_eq!(normalize_entry_name(".hidden/C.class"), ".hidden/C.class");
    }

    #[test]
    fn relative_key_uses_forward_slashes() {
        let root = PathBuf::from("root");
        let path = root.join("net").join("minecraft").join("Foo.class");
        assert_eq!(
            relative_key(&root, &path).as_deref(),
            Some("net/minecraft/Foo.class")
        );
        assert_eq!(relative_key(&root, &root), None);
        assert_eq!(relative_key(&root, &PathBuf::from("elsewhere/x.class")), None);
    }
}
