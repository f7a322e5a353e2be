//! Validated document names.

use std::fmt;

use crate::StorageError;

/// Longest name most filesystems accept for a single path component.
const MAX_NAME_BYTES: usize = 255;

/// A document name that is safe to use as a single path component.
///
/// Construction rejects empty names, `.` and `..`, path separators, and NUL
/// bytes. Surrounding whitespace is trimmed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentName(String);

impl DocumentName {
    /// Validate `raw` as a document name.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidName`] describing the first rule the
    /// name breaks.
    pub fn parse(raw: &str) -> Result<Self, StorageError> {
        let name = raw.trim();
        let invalid = |reason: &str| StorageError::InvalidName {
            name: raw.to_owned(),
            reason: reason.to_owned(),
        };

        if name.is_empty() {
            return Err(invalid("name is empty"));
        }
        if name == "." || name == ".." {
            return Err(invalid("name refers to a directory"));
        }
        if name.contains(['/', '\\']) {
            return Err(invalid("name contains a path separator"));
        }
        if name.contains('\0') {
            return Err(invalid("name contains a NUL byte"));
        }
        if name.len() > MAX_NAME_BYTES {
            return Err(invalid("name is too long"));
        }

        Ok(Self(name.to_owned()))
    }

    /// The name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The lowercase extension after the last `.`, if any.
    ///
    /// A leading dot does not start an extension (`.profile` has none).
    #[must_use]
    pub fn extension(&self) -> Option<String> {
        let (stem, ext) = self.0.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }
}

impl fmt::Display for DocumentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DocumentName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_names() {
        let name = DocumentName::parse("about.md").unwrap();
        assert_eq!(name.as_str(), "about.md");
    }

    #[test]
    fn trims_whitespace() {
        let name = DocumentName::parse("  notes.txt \n").unwrap();
        assert_eq!(name.as_str(), "notes.txt");
    }

    #[test]
    fn rejects_empty_and_blank() {
        assert!(matches!(
            DocumentName::parse(""),
            Err(StorageError::InvalidName { .. })
        ));
        assert!(matches!(
            DocumentName::parse("   "),
            Err(StorageError::InvalidName { .. })
        ));
    }

    #[test]
    fn rejects_traversal() {
        for raw in ["..", ".", "../secret.txt", "a/b.md", "..\\win.txt", "/etc/passwd"] {
            assert!(
                DocumentName::parse(raw).is_err(),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_nul_and_overlong() {
        assert!(DocumentName::parse("a\0b.txt").is_err());
        assert!(DocumentName::parse(&"x".repeat(256)).is_err());
        assert!(DocumentName::parse(&"x".repeat(255)).is_ok());
    }

    #[test]
    fn extension_is_lowercased() {
        let name = DocumentName::parse("README.MD").unwrap();
        assert_eq!(name.extension().as_deref(), Some("md"));
    }

    #[test]
    fn dotfiles_and_bare_names_have_no_extension() {
        assert_eq!(DocumentName::parse(".profile").unwrap().extension(), None);
        assert_eq!(DocumentName::parse("Makefile").unwrap().extension(), None);
        assert_eq!(DocumentName::parse("trailing.").unwrap().extension(), None);
    }
}
