//! Deterministic creation fingerprint over normalised download inputs.

use std::path::{Component, Path, PathBuf};

use sha2::{Digest, Sha256};

/// Normalise a user-supplied source: surrounding whitespace is trimmed,
/// case is preserved.
#[must_use]
pub fn normalise_source(source: &str) -> String {
    source.trim().to_string()
}

/// Normalise a target path: trim whitespace, collapse `.`/`..` segments
/// lexically, and strip trailing separators. Case is preserved because the
/// target filesystem is case-sensitive.
#[must_use]
pub fn normalise_target(target: &str) -> String {
    let trimmed = target.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    lexical_clean(Path::new(trimmed))
        .to_string_lossy()
        .into_owned()
}

/// Lexical path cleaning: collapse `.`/`..` segments and trailing
/// separators without touching the filesystem or resolving symlinks.
#[must_use]
pub fn lexical_clean(path: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                match cleaned.components().next_back() {
                    Some(Component::Normal(_)) => {
                        cleaned.pop();
                    }
                    Some(Component::RootDir) => {}
                    _ => cleaned.push(".."),
                }
            }
            other => cleaned.push(other),
        }
    }
    if cleaned.as_os_str().is_empty() {
        cleaned.push(".");
    }
    cleaned
}

/// Compute the creation fingerprint for a (source, target) pair:
/// `SHA-256(normalise(source) || 0x00 || normalise(target))`, hex-encoded.
#[must_use]
pub fn fingerprint(source: &str, target: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(normalise_source(source).as_bytes());
    hasher.update([0u8]);
    hasher.update(normalise_target(target).as_bytes());
    let digest = hasher.finalize();
    let mut encoded = String::with_capacity(digest.len() * 2);
    for byte in digest {
        encoded.push_str(&format!("{byte:02x}"));
    }
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_and_dot_segments_do_not_change_the_fingerprint() {
        let canonical = fingerprint("magnet:?xt=urn:btih:abcdef", "/tmp/x");
        assert_eq!(
            fingerprint(" magnet:?xt=urn:btih:abcdef ", " /tmp/./x "),
            canonical
        );
        assert_eq!(
            fingerprint("magnet:?xt=urn:btih:abcdef", "/tmp/x/"),
            canonical
        );
        assert_eq!(
            fingerprint("magnet:?xt=urn:btih:abcdef", "/tmp/y/../x"),
            canonical
        );
    }

    #[test]
    fn normalisation_is_idempotent() {
        for target in ["/tmp/./x", "/a/b/../c/", "relative/./path", "/"] {
            let once = normalise_target(target);
            assert_eq!(normalise_target(&once), once);
        }
        for source in [" magnet:?dn=x ", "https://example.org/file"] {
            let once = normalise_source(source);
            assert_eq!(normalise_source(&once), once);
        }
    }

    #[test]
    fn case_is_preserved() {
        assert_ne!(
            fingerprint("magnet:?xt=A", "/tmp/X"),
            fingerprint("magnet:?xt=a", "/tmp/x")
        );
    }

    #[test]
    fn parent_segments_collapse_lexically() {
        assert_eq!(normalise_target("/srv/downloads/../media"), "/srv/media");
        assert_eq!(normalise_target("/srv/.."), "/");
        assert_eq!(normalise_target("/.."), "/");
        assert_eq!(normalise_target("a/.."), ".");
    }

    #[test]
    fn distinct_inputs_do_not_collide_via_concatenation() {
        // The 0x00 separator keeps ("ab", "c") distinct from ("a", "bc").
        assert_ne!(fingerprint("ab", "c"), fingerprint("a", "bc"));
    }
}
