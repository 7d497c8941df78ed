use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use once_cell::sync::OnceCell;

use super::process::{locate, run_with_timeout};
use super::{relativize, FileClass, FileClasses, SearchBackend, SearchError, SearchHit};

const NAME: &str = "grep";

static GREP: OnceCell<Option<PathBuf>> = OnceCell::new();

/// Searches with recursive `grep`. Output is `path NUL line:text`.
pub struct GrepBackend {
    classes: FileClasses,
    timeout: Duration,
}

impl GrepBackend {
    pub fn new(classes: FileClasses, timeout: Duration) -> Self {
        Self { classes, timeout }
    }

    fn command(&self, program: &Path, pattern: &str, root: &Path, class: FileClass) -> Command {
        let mut command = Command::new(program);
        // -I skips binary files, --null puts a NUL after each file name.
        command.arg("-rnFI").arg("--null");
        for glob in self.classes.globs(class) {
            command.arg(format!("--include={}", glob));
        }
        command.arg("-e").arg(pattern).arg(root);
        command
    }
}

impl SearchBackend for GrepBackend {
    fn name(&self) -> &str {
        NAME
    }

    fn search(
        &self,
        pattern: &str,
        root: &Path,
        class: FileClass,
    ) -> Result<Vec<SearchHit>, SearchError> {
        let program = locate(&GREP, "grep").ok_or_else(|| SearchError::Unavailable {
            backend: NAME.to_string(),
        })?;

        let output = run_with_timeout(NAME, self.command(program, pattern, root, class), self.timeout)?;
        output.collect_hits(NAME, |stdout| parse_lines(stdout, root))
    }
}

fn parse_lines(stdout: &[u8], root: &Path) -> Result<Vec<SearchHit>, SearchError> {
    let mut hits = Vec::new();
    for record in stdout.split(|b| *b == b'\n') {
        if record.is_empty() {
            continue;
        }
        let nul = record.iter().position(|b| *b == 0).ok_or_else(|| SearchError::Parse {
            backend: NAME.to_string(),
            message: format!("missing file separator in {:?}", String::from_utf8_lossy(record)),
        })?;

        let path = String::from_utf8_lossy(&record[..nul]);
        let rest = &record[nul + 1..];
        let digits = rest.iter().take_while(|b| b.is_ascii_digit()).count();
        let line = std::str::from_utf8(&rest[..digits])
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .ok_or_else(|| SearchError::Parse {
                backend: NAME.to_string(),
                message: format!("missing line number after {}", path),
            })?;

        hits.push(SearchHit::new(relativize(root, Path::new(path.as_ref())), line));
    }
    Ok(hits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lines() {
        let stdout = b"/src/module-customer/etc/events.xml\x0014:    <event name=\"customer_login\">\n\
/src/module-customer/Model/My:odd.php\x003:customer_login\n";
        let hits = parse_lines(stdout, Path::new("/src")).unwrap();
        assert_eq!(
            hits,
            vec![
                SearchHit::new("module-customer/etc/events.xml", 14),
                SearchHit::new("module-customer/Model/My:odd.php", 3),
            ]
        );
    }

    #[test]
    fn test_parse_without_separator_fails() {
        let err = parse_lines(b"a.php:3:text\n", Path::new("/")).unwrap_err();
        assert!(matches!(err, SearchError::Parse { .. }));
    }

    #[test]
    fn test_command_shape() {
        let backend = GrepBackend::new(FileClasses::new(["php"], ["xml"]), Duration::from_secs(1));
        let command = backend.command(Path::new("grep"), "customer_login", Path::new("/src"), FileClass::Markup);
        let args: Vec<_> = command
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            vec!["-rnFI", "--null", "--include=*.xml", "-e", "customer_login", "/src"]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_status_two_keeps_printed_match() {
        // grep exits 2 when part of the tree is unreadable, after printing
        // the matches it did find.
        let mut command = Command::new("sh");
        command.arg("-c").arg(
            "printf '/src/module-customer/Model/Customer.php\\000'; printf '7:class Customer\\n'; \
             echo 'grep: /src/private: Permission denied' >&2; exit 2",
        );
        let output = run_with_timeout(NAME, command, Duration::from_secs(5)).unwrap();
        let hits = output
            .collect_hits(NAME, |stdout| parse_lines(stdout, Path::new("/src")))
            .unwrap();
        assert_eq!(hits, vec![SearchHit::new("module-customer/Model/Customer.php", 7)]);
    }
}
