use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use tracing::trace;
use walkdir::WalkDir;

use super::{relativize, FileClass, FileClasses, SearchBackend, SearchError, SearchHit};

const NAME: &str = "walk";

/// Bytes inspected for a NUL when deciding a file is binary.
const BINARY_SNIFF_LEN: usize = 8192;

/// In-process search: walks the tree and scans each file line by line.
///
/// Needs no external tools. The deadline is checked between files.
pub struct WalkBackend {
    classes: FileClasses,
    timeout: Duration,
}

impl WalkBackend {
    pub fn new(classes: FileClasses, timeout: Duration) -> Self {
        Self { classes, timeout }
    }
}

impl SearchBackend for WalkBackend {
    fn name(&self) -> &str {
        NAME
    }

    fn search(
        &self,
        pattern: &str,
        root: &Path,
        class: FileClass,
    ) -> Result<Vec<SearchHit>, SearchError> {
        let deadline = Instant::now() + self.timeout;
        let matcher = self
            .classes
            .matcher(class)
            .map_err(|e| SearchError::Failed {
                backend: NAME.to_string(),
                status: "invalid glob".to_string(),
                stderr: e.to_string(),
            })?;

        let mut hits = Vec::new();
        let walker = WalkDir::new(root).sort_by_file_name().into_iter();
        for entry in walker.filter_map(|e| e.ok()) {
            if Instant::now() >= deadline {
                return Err(SearchError::Timeout {
                    backend: NAME.to_string(),
                    after: self.timeout,
                });
            }
            if !entry.file_type().is_file() {
                continue;
            }

            let relative = relativize(root, entry.path());
            if let Some(matcher) = &matcher {
                if !matcher.is_match(&relative) {
                    continue;
                }
            }

            let bytes = match fs::read(entry.path()) {
                Ok(bytes) => bytes,
                Err(e) => {
                    trace!(path = %entry.path().display(), error = %e, "skipping unreadable file");
                    continue;
                }
            };
            if bytes[..bytes.len().min(BINARY_SNIFF_LEN)].contains(&0) {
                continue;
            }

            let content = String::from_utf8_lossy(&bytes);
            for (index, line) in content.lines().enumerate() {
                if line.contains(pattern) {
                    hits.push(SearchHit::new(relative.clone(), index + 1));
                }
            }
        }

        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tree() -> TempDir {
        let temp = TempDir::new().unwrap();
        let model = temp.path().join("module-customer/Model");
        let etc = temp.path().join("module-customer/etc");
        fs::create_dir_all(&model).unwrap();
        fs::create_dir_all(&etc).unwrap();
        fs::write(
            model.join("Customer.php"),
            "<?php\nnamespace Magento\\Customer\\Model;\n\nclass Customer\n{\n}\n",
        )
        .unwrap();
        fs::write(
            etc.join("events.xml"),
            "<config>\n  <event name=\"customer_login\"/>\n</config>\n",
        )
        .unwrap();
        fs::write(model.join("blob.php"), b"class Customer\0\x01\x02").unwrap();
        temp
    }

    fn backend() -> WalkBackend {
        WalkBackend::new(FileClasses::new(["php"], ["xml"]), Duration::from_secs(10))
    }

    #[test]
    fn test_finds_source_line() {
        let temp = tree();
        let hits = backend()
            .search("class Customer", temp.path(), FileClass::Source)
            .unwrap();
        // blob.php is binary and skipped
        assert_eq!(hits, vec![SearchHit::new("module-customer/Model/Customer.php", 4)]);
    }

    #[test]
    fn test_respects_file_class() {
        let temp = tree();
        let backend = backend();
        assert!(backend
            .search("customer_login", temp.path(), FileClass::Source)
            .unwrap()
            .is_empty());
        assert_eq!(
            backend
                .search("customer_login", temp.path(), FileClass::Markup)
                .unwrap(),
            vec![SearchHit::new("module-customer/etc/events.xml", 2)]
        );
        assert_eq!(
            backend
                .search("customer_login", temp.path(), FileClass::Any)
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn test_zero_timeout_expires() {
        let temp = tree();
        let backend = WalkBackend::new(FileClasses::default(), Duration::ZERO);
        let err = backend
            .search("class", temp.path(), FileClass::Any)
            .unwrap_err();
        assert!(matches!(err, SearchError::Timeout { .. }));
    }
}
