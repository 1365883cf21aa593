//! Lexical normalization.
//!
//! Strips `--` comments, collapses whitespace runs and puts every statement
//! on its own line, so the extractor's patterns never care how the source
//! was laid out.
use once_cell::sync::Lazy;
use regex::Regex;

const COMMENT_MARKER: &str = "--";

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern"));
static TERMINATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*;\s*").expect("terminator pattern"));

pub fn normalize(source: &str) -> String {
    let stripped = source
        .lines()
        .map(strip_comment)
        .collect::<Vec<_>>()
        .join("\n");
    let collapsed = WHITESPACE.replace_all(&stripped, " ");
    TERMINATOR.replace_all(&collapsed, ";\n").into_owned()
}

fn strip_comment(line: &str) -> &str {
    match line.find(COMMENT_MARKER) {
        Some(at) => &line[..at],
        None => line,
    }
}
