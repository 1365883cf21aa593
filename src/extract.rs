//! Declaration extraction over normalized text.
//!
//! Each declaration shape has its own pattern and its own pass over the same
//! text, so no pass depends on what another one found or on declaration
//! order. A snippet a pattern cannot match is simply not reported.
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::ir::Enumeration;

// ------------------------------- Patterns -------------------------------- //

static PACKAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bpackage\s+([\w.]+)\s+is\b").expect("package pattern")
});

static ENUMERATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\btype\s+(\w+)\s+is\s*\(([^)]+)\)\s*;").expect("enumeration pattern")
});

static ARRAY_ALIAS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\btype\s+(\w+)\s+is\s+array\s*\([^)]*\)\s+of\s+(?:aliased\s+)?([\w.]+)[^;]*;")
        .expect("array pattern")
});

static SUBTYPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bsubtype\s+(\w+)\s+is\s+(?:not\s+null\s+)?([\w.]+)[^;]*;").expect("subtype pattern")
});

static RECORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?is)\btype\s+(\w+)\s+is\s+(?:(?:abstract\s+)?tagged\s+)?(?:limited\s+)?record\b(.*?)\bend\s+record\s*;",
    )
    .expect("record pattern")
});

static NULL_RECORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\btype\s+(\w+)\s+is\s+(?:(?:abstract\s+)?tagged\s+)?(?:limited\s+)?null\s+record\s*;")
        .expect("null record pattern")
});

static NESTED_DECLARATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:sub)?type\s+\w+\s+is\b").expect("nested declaration pattern")
});

// -------------------------------- Output --------------------------------- //

/// A record whose body has not been classified yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub name: String,
    pub body: String,
}

/// Everything the patterns found, in discovery order per kind.
#[derive(Debug, Clone, Default)]
pub struct Declarations {
    pub package: Option<String>,
    pub enumerations: Vec<Enumeration>,
    pub array_aliases: Vec<(String, String)>,
    pub subtypes: Vec<(String, String)>,
    pub records: Vec<RawRecord>,
}

pub fn extract(normalized: &str) -> Declarations {
    let decls = Declarations {
        package: PACKAGE.captures(normalized).map(|c| c[1].to_string()),
        enumerations: enumerations(normalized),
        array_aliases: pairs(&ARRAY_ALIAS, normalized),
        subtypes: pairs(&SUBTYPE, normalized),
        records: records(normalized),
    };
    debug!(
        enumerations = decls.enumerations.len(),
        arrays = decls.array_aliases.len(),
        subtypes = decls.subtypes.len(),
        records = decls.records.len(),
        "extracted declarations"
    );
    decls
}

fn enumerations(text: &str) -> Vec<Enumeration> {
    ENUMERATION
        .captures_iter(text)
        .map(|c| Enumeration {
            name: c[1].to_string(),
            literals: c[2]
                .split(',')
                .map(str::trim)
                .filter(|lit| !lit.is_empty())
                .map(str::to_string)
                .collect(),
        })
        .collect()
}

fn pairs(pattern: &Regex, text: &str) -> Vec<(String, String)> {
    pattern
        .captures_iter(text)
        .map(|c| (c[1].to_string(), c[2].to_string()))
        .collect()
}

/// Bodied and `null record` declarations, merged back into source order.
fn records(text: &str) -> Vec<RawRecord> {
    let empty = NULL_RECORD.captures_iter(text).map(|c| {
        let at = c.get(0).map_or(0, |m| m.start());
        (at, RawRecord { name: c[1].to_string(), body: String::new() })
    });
    let mut found = bodied_records(text);
    found.extend(empty);
    found.sort_by_key(|(at, _)| *at);
    found.into_iter().map(|(_, record)| record).collect()
}

/// A record body never contains another type declaration. When the lazy
/// match for an unterminated record runs on into the next declaration, that
/// record is dropped and the search resumes at the declaration it swallowed.
fn bodied_records(text: &str) -> Vec<(usize, RawRecord)> {
    let mut found = Vec::new();
    let mut from = 0;
    while let Some(c) = RECORD.captures_at(text, from) {
        let (Some(whole), Some(body)) = (c.get(0), c.get(2)) else {
            break;
        };
        if let Some(inner) = NESTED_DECLARATION.find(body.as_str()) {
            debug!(record = &c[1], "skipping record without its own `end record`");
            from = body.start() + inner.start();
            continue;
        }
        found.push((whole.start(), RawRecord { name: c[1].to_string(), body: body.as_str().trim().to_string() }));
        from = whole.end();
    }
    found
}

// ------------------------------- Tests ------------------------------------ //
