// Name-keyed type graph. Entries refer to each other by name only, so
// forward references and cycles in the grammar need no fix-up pass.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::Serialize;

/// Built-in fixed-size text type.
pub const TEXT_TYPE: &str = "String";
/// Element type of [`TEXT_TYPE`].
pub const CHARACTER_TYPE: &str = "Character";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    pub name: String,
    /// Nominal type as written; may itself be an alias.
    pub declared_type: String,
    pub is_array: bool,
    /// Explicit bound list, verbatim. Only ever echoed back.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<String>,
    /// Nominal type is (or resolves to) the text type.
    pub is_text: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    pub name: String,
    pub fields: Vec<Field>, // declaration order
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Enumeration {
    pub name: String,
    pub literals: Vec<String>,
}

/// The resolved catalogs of one grammar. Built once, then only queried.
///
/// Every catalog keeps discovery order, which is what listings show and what
/// `--all` generation follows.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TypeGraph {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    pub enumerations: IndexMap<String, Enumeration>,
    /// array-alias name → element type
    pub array_aliases: IndexMap<String, String>,
    /// subtype name → base type
    pub subtypes: IndexMap<String, String>,
    pub records: IndexMap<String, Record>,
}

impl TypeGraph {
    pub fn record(&self, name: &str) -> Option<&Record> {
        self.records.get(name)
    }

    pub fn record_names(&self) -> Vec<&str> {
        self.records.keys().map(String::as_str).collect()
    }

    /// Follow the subtype chain starting at `name` to the first name that is
    /// not itself a subtype (or is an array alias, which takes precedence).
    ///
    /// Returns `None` when `name` is not a subtype or the chain loops.
    pub fn subtype_base(&self, name: &str) -> Option<&str> {
        let mut current = self.subtypes.get(name)?.as_str();
        let mut seen = HashSet::from([name]);
        loop {
            if self.array_aliases.contains_key(current) {
                return Some(current);
            }
            if !seen.insert(current) {
                return None;
            }
            match self.subtypes.get(current) {
                Some(next) => current = next.as_str(),
                None => return Some(current),
            }
        }
    }

    /// `name` itself, or the end of its subtype chain.
    pub fn ultimate_base<'a>(&'a self, name: &'a str) -> &'a str {
        self.subtype_base(name).unwrap_or(name)
    }

    pub fn is_text(&self, name: &str) -> bool {
        self.ultimate_base(name).eq_ignore_ascii_case(TEXT_TYPE)
    }

    /// Array-alias directly, or a subtype whose chain ends on one.
    pub fn is_array_type(&self, name: &str) -> bool {
        self.array_aliases.contains_key(name)
            || self
                .subtype_base(name)
                .is_some_and(|base| self.array_aliases.contains_key(base))
    }

    /// Element type of an array-ish nominal type.
    pub fn element_type<'a>(&'a self, name: &'a str) -> Option<&'a str> {
        if let Some(element) = self.array_aliases.get(name) {
            return Some(element.as_str());
        }
        if self.is_text(name) {
            return Some(CHARACTER_TYPE);
        }
        self.subtype_base(name)
            .and_then(|base| self.array_aliases.get(base))
            .map(String::as_str)
    }

    /// Record named `name`, directly or through its subtype chain.
    pub fn record_for(&self, name: &str) -> Option<&Record> {
        self.record(name)
            .or_else(|| self.subtype_base(name).and_then(|base| self.record(base)))
    }

    /// Names declared in more than one catalog, with the catalogs involved.
    pub fn ambiguities(&self) -> Vec<(&str, Vec<&'static str>)> {
        let mut seen: IndexMap<&str, Vec<&'static str>> = IndexMap::new();
        let kinds = [
            ("enumeration", self.enumerations.keys().collect::<Vec<_>>()),
            ("array", self.array_aliases.keys().collect()),
            ("subtype", self.subtypes.keys().collect()),
            ("record", self.records.keys().collect()),
        ];
        for (kind, names) in kinds {
            for name in names {
                seen.entry(name.as_str()).or_default().push(kind);
            }
        }
        seen.into_iter().filter(|(_, kinds)| kinds.len() > 1).collect()
    }
}
