//! `mediator sanitize` - run the sanitizer over a piece of text.

use anyhow::{Context, Result};
use mediator_sanitizer::Sanitizer;
use serde_json::{Value, json};
use std::io::Read;
use std::path::Path;

pub fn run(text: Option<String>, file: Option<&Path>) -> Result<()> {
    let text = match (text, file) {
        (Some(text), _) => text,
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        (None, None) => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            buf
        }
    };

    println!("{}", serde_json::to_string_pretty(&render(&text))?);
    Ok(())
}

/// The sanitization result plus the labels of the patterns that matched.
fn render(text: &str) -> Value {
    let sanitizer = Sanitizer::new();
    let patterns = sanitizer.detect(text);
    let result = sanitizer.sanitize(text);
    json!({
        "text": result.text,
        "hits": result.hits,
        "patterns": patterns,
    })
}
