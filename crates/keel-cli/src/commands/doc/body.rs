use std::io::Read;

use anyhow::Context;

/// The markdown body from `--body`, or from `--file` where `-` reads stdin.
pub fn resolve(body: Option<&str>, file: Option<&str>) -> anyhow::Result<Option<String>> {
    match (body, file) {
        (Some(body), _) => Ok(Some(body.to_string())),
        (None, Some("-")) => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("failed to read document body from stdin")?;
            Ok(Some(text))
        }
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read document body from {path}"))
            .map(Some),
        (None, None) => Ok(None),
    }
}
