//! Field classification and type graph assembly.
//!
//! Assembly is two-phase: every alias catalog is filled first, then record
//! bodies are classified against it. Classification never consults the record
//! catalog, so records may be declared in any order.
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::extract::Declarations;
use crate::ir::{Field, Record, TypeGraph};

/// `Base (bounds)` with the bound list kept verbatim.
static BOUNDED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([\w.]+)\s*\((.*)\)$").expect("bounded type pattern"));

/// Leading identifier of a type spec (drops `range ...` and the like).
static NOMINAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([\w.]+)").expect("nominal type pattern"));

static MODIFIERS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:aliased\s+)?(?:not\s+null\s+)?").expect("modifier pattern"));

pub fn build_graph(decls: Declarations) -> TypeGraph {
    let mut graph = TypeGraph { package: decls.package, ..TypeGraph::default() };

    for enumeration in decls.enumerations {
        if graph.enumerations.contains_key(&enumeration.name) {
            warn!(name = %enumeration.name, "duplicate enumeration ignored");
            continue;
        }
        graph.enumerations.insert(enumeration.name.clone(), enumeration);
    }
    for (name, element) in decls.array_aliases {
        insert_first(&mut graph.array_aliases, name, element, "array");
    }
    for (name, base) in decls.subtypes {
        insert_first(&mut graph.subtypes, name, base, "subtype");
    }

    // phase 2: aliases are complete
    let records = decls
        .records
        .into_iter()
        .map(|raw| {
            let fields = classify_fields(&raw.body, &graph);
            Record { name: raw.name, fields }
        })
        .collect::<Vec<_>>();
    for record in records {
        if graph.records.contains_key(&record.name) {
            warn!(name = %record.name, "duplicate record ignored");
            continue;
        }
        graph.records.insert(record.name.clone(), record);
    }
    graph
}

fn insert_first(
    catalog: &mut indexmap::IndexMap<String, String>,
    name: String,
    target: String,
    kind: &str,
) {
    if catalog.contains_key(&name) {
        warn!(%name, kind, "duplicate declaration ignored");
        return;
    }
    catalog.insert(name, target);
}

/// Classify every field declaration of one record body, in written order.
pub fn classify_fields(body: &str, graph: &TypeGraph) -> Vec<Field> {
    let mut fields = Vec::new();
    for decl in body.split(';').map(str::trim).filter(|d| !d.is_empty()) {
        let Some((names, spec)) = decl.split_once(':') else {
            debug!(decl, "skipping field declaration without a type");
            continue;
        };
        let Some(shape) = TypeShape::parse(spec) else {
            debug!(decl, "skipping field declaration with an unreadable type");
            continue;
        };
        for name in names.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            let field = shape.classify(name, graph);
            debug!(
                field = %field.name,
                ty = %field.declared_type,
                array = field.is_array,
                text = field.is_text,
                "classified"
            );
            fields.push(field);
        }
    }
    fields
}

/// The syntactic part of a type spec, before any catalog lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
struct TypeShape {
    nominal: String,
    bounds: Option<String>,
}

impl TypeShape {
    fn parse(spec: &str) -> Option<Self> {
        let spec = spec.split(":=").next().unwrap_or_default().trim();
        let spec = MODIFIERS.replace(spec, "");
        let spec = spec.trim();
        if let Some(c) = BOUNDED.captures(spec) {
            return Some(Self {
                nominal: c[1].to_string(),
                bounds: Some(c[2].trim().to_string()),
            });
        }
        NOMINAL.captures(spec).map(|c| Self { nominal: c[1].to_string(), bounds: None })
    }

    fn classify(&self, name: &str, graph: &TypeGraph) -> Field {
        let is_text = graph.is_text(&self.nominal);
        // explicit bounds make an array, except on text, which is checked whole
        let is_array = match self.bounds {
            Some(_) => !is_text,
            None => !is_text && graph.is_array_type(&self.nominal),
        };
        Field {
            name: name.to_string(),
            declared_type: self.nominal.clone(),
            is_array,
            bounds: self.bounds.clone(),
            is_text,
        }
    }
}
