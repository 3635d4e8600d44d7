//! Loads a party's local element set from disk: one `u32` per line, blank
//! lines and `#`-prefixed comments ignored.
//!
//! Generating a *synthetic* set (shared/non-shared elements drawn from
//! `sameSeed`/`diffSeed`) is out of scope here; this binary only runs real
//! sets supplied by the operator.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use bloom::Element;

/// Reads `path` into a list of elements.
pub fn load(path: impl AsRef<Path>) -> Result<Vec<Element>> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| line.parse::<Element>().with_context(|| format!("invalid element {line:?} in {}", path.display())))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn skips_blank_lines_and_comments() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "1\n\n# a shared element\n2\n   \n3").unwrap();
        assert_eq!(load(file.path()).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn rejects_a_non_numeric_line() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "1\nnot-a-number").unwrap();
        assert!(load(file.path()).is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load("/nonexistent/path/to/elements.txt").is_err());
    }
}
