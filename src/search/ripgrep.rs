use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use once_cell::sync::OnceCell;

use super::process::{locate, run_with_timeout};
use super::{relativize, FileClass, FileClasses, SearchBackend, SearchError, SearchHit};

const NAME: &str = "ripgrep";

static RG: OnceCell<Option<PathBuf>> = OnceCell::new();

/// Searches with `rg --json`, reading the structured match stream.
pub struct RipgrepBackend {
    classes: FileClasses,
    timeout: Duration,
}

impl RipgrepBackend {
    pub fn new(classes: FileClasses, timeout: Duration) -> Self {
        Self { classes, timeout }
    }

    fn command(&self, program: &Path, pattern: &str, root: &Path, class: FileClass) -> Command {
        let mut command = Command::new(program);
        command
            .arg("--json")
            .arg("--fixed-strings")
            .arg("--no-ignore")
            .arg("--hidden")
            .arg("--no-messages");
        for glob in self.classes.globs(class) {
            command.arg("--glob").arg(glob);
        }
        command.arg("-e").arg(pattern).arg(root);
        command
    }
}

impl SearchBackend for RipgrepBackend {
    fn name(&self) -> &str {
        NAME
    }

    fn search(
        &self,
        pattern: &str,
        root: &Path,
        class: FileClass,
    ) -> Result<Vec<SearchHit>, SearchError> {
        let program = locate(&RG, "rg").ok_or_else(|| SearchError::Unavailable {
            backend: NAME.to_string(),
        })?;

        let output = run_with_timeout(NAME, self.command(program, pattern, root, class), self.timeout)?;
        output.collect_hits(NAME, |stdout| parse_json_lines(stdout, root))
    }
}

#[derive(Deserialize)]
struct Message {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: serde_json::Value,
}

#[derive(Deserialize)]
struct MatchData {
    path: Data,
    line_number: Option<usize>,
}

/// rg reports non-UTF-8 paths as base64 `bytes` instead of `text`.
#[derive(Deserialize)]
struct Data {
    text: Option<String>,
}

fn parse_json_lines(stdout: &[u8], root: &Path) -> Result<Vec<SearchHit>, SearchError> {
    let parse_error = |e: serde_json::Error| SearchError::Parse {
        backend: NAME.to_string(),
        message: e.to_string(),
    };

    let mut hits = Vec::new();
    for line in stdout.split(|b| *b == b'\n') {
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }
        let message: Message = serde_json::from_slice(line).map_err(parse_error)?;
        if message.kind != "match" {
            continue;
        }
        let data: MatchData = serde_json::from_value(message.data).map_err(parse_error)?;
        if let (Some(path), Some(line)) = (data.path.text, data.line_number) {
            hits.push(SearchHit::new(relativize(root, Path::new(&path)), line));
        }
    }
    Ok(hits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_lines() {
        let stdout = br#"{"type":"begin","data":{"path":{"text":"/src/module-customer/Model/Customer.php"}}}
{"type":"match","data":{"path":{"text":"/src/module-customer/Model/Customer.php"},"lines":{"text":"class Customer\n"},"line_number":12,"absolute_offset":300,"submatches":[]}}
{"type":"match","data":{"path":{"bytes":"L3NyYy//"},"lines":{"text":"class Customer\n"},"line_number":3,"absolute_offset":0,"submatches":[]}}
{"type":"end","data":{"path":{"text":"/src/module-customer/Model/Customer.php"},"binary_offset":null,"stats":{}}}
{"type":"summary","data":{"elapsed_total":{"secs":0,"nanos":1,"human":"0s"},"stats":{}}}
"#;
        let hits = parse_json_lines(stdout, Path::new("/src")).unwrap();
        assert_eq!(hits, vec![SearchHit::new("module-customer/Model/Customer.php", 12)]);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = parse_json_lines(b"not json\n", Path::new("/")).unwrap_err();
        assert!(matches!(err, SearchError::Parse { .. }));
    }

    #[test]
    fn test_command_shape() {
        let backend = RipgrepBackend::new(FileClasses::new(["php"], ["xml"]), Duration::from_secs(1));
        let command = backend.command(Path::new("rg"), "-class Foo", Path::new("/src"), FileClass::Source);
        let args: Vec<_> = command
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            vec![
                "--json",
                "--fixed-strings",
                "--no-ignore",
                "--hidden",
                "--no-messages",
                "--glob",
                "*.php",
                "-e",
                "-class Foo",
                "/src"
            ]
        );
    }
}
