use serde::{Deserialize, Serialize};

/// Identity of one source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentIdentity {
    /// Lowercase hex SHA-256 of the document bytes
    pub content_hash: String,
    /// Hash of the base document this one declares it extends
    pub base_hash: Option<String>,
    pub schema_version: String,
    /// Display name, usually the file name
    pub name: Option<String>,
}

impl DocumentIdentity {
    pub fn new(content_hash: impl Into<String>, schema_version: impl Into<String>) -> Self {
        Self {
            content_hash: content_hash.into(),
            base_hash: None,
            schema_version: schema_version.into(),
            name: None,
        }
    }

    pub fn with_base_hash(mut self, base_hash: impl Into<String>) -> Self {
        self.base_hash = Some(base_hash.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// True when this document is `base` itself or declares `base` as its
    /// base document.
    pub fn is_lineage_of(&self, base: &DocumentIdentity) -> bool {
        self.content_hash == base.content_hash
            || self.base_hash.as_deref() == Some(base.content_hash.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lineage() {
        let core = DocumentIdentity::new("aa", "12.0.0");
        let petal = DocumentIdentity::new("bb", "12.0.0").with_base_hash("aa");
        let stranger = DocumentIdentity::new("cc", "12.0.0").with_base_hash("zz");

        assert!(core.is_lineage_of(&core));
        assert!(petal.is_lineage_of(&core));
        assert!(!stranger.is_lineage_of(&core));
        assert!(!core.is_lineage_of(&petal));
    }
}
