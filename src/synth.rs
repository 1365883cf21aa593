//! Validity synthesis: a recursive walk over a record's classified fields.
//!
//! Array fields become loops, scalar fields of a known record type are
//! inlined in place, everything else gets one direct check. Loop variables
//! are derived from the accessor chain and the loop depth. Because field
//! names may themselves contain `_`, two chains can spell the same name; the
//! later one then gets a numeric suffix.
use std::collections::HashSet;

use tracing::warn;

use crate::ir::{Field, Record, TypeGraph, CHARACTER_TYPE};

/// How text-typed fields are checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum TextPolicy {
    /// One check on the whole value.
    #[default]
    Whole,
    /// Iterate the index range and check every character.
    PerCharacter,
}

/// One synthesized statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    /// Conjoin `path'Valid` onto the accumulator.
    Check { path: String },
    /// Iterate `array'Range` with `var`.
    Loop {
        var: String,
        array: String,
        bounds: Option<String>,
        body: Vec<Stmt>,
    },
}

pub struct Synthesizer<'g> {
    graph: &'g TypeGraph,
    text_policy: TextPolicy,
}

/// State for one `synthesize` call.
struct Walk<'g> {
    /// Records currently being inlined, outermost first.
    expanding: Vec<&'g str>,
    /// Loop variables already handed out in this function.
    taken: HashSet<String>,
}

impl Walk<'_> {
    fn loop_var(&mut self, scope: &str, depth: usize) -> String {
        let base = format!("I_{scope}{depth}");
        if self.taken.insert(base.clone()) {
            return base;
        }
        let mut n = 2;
        loop {
            let candidate = format!("{base}_{n}");
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}

impl<'g> Synthesizer<'g> {
    pub fn new(graph: &'g TypeGraph, text_policy: TextPolicy) -> Self {
        Self { graph, text_policy }
    }

    /// Statements checking every field of `record`, rooted at `root`.
    pub fn synthesize(&self, record: &'g Record, root: &str) -> Vec<Stmt> {
        let mut out = Vec::new();
        let mut walk = Walk { expanding: vec![record.name.as_str()], taken: HashSet::new() };
        self.walk(record, root, "", 0, &mut walk, &mut out);
        out
    }

    fn walk(
        &self,
        record: &'g Record,
        path: &str,
        scope: &str,
        depth: usize,
        state: &mut Walk<'g>,
        out: &mut Vec<Stmt>,
    ) {
        for field in &record.fields {
            let field_path = format!("{path}.{}", field.name);
            let field_scope = format!("{scope}{}_", field.name);

            if let Some(element) = self.element_of(field) {
                let var = state.loop_var(&field_scope, depth);
                let indexed = format!("{field_path}({var})");
                let mut body = Vec::new();
                match self.expandable(element, &state.expanding) {
                    Some(nested) => {
                        state.expanding.push(nested.name.as_str());
                        self.walk(nested, &indexed, &field_scope, depth + 1, state, &mut body);
                        state.expanding.pop();
                    }
                    None => body.push(Stmt::Check { path: indexed }),
                }
                out.push(Stmt::Loop {
                    var,
                    array: field_path,
                    bounds: field.bounds.clone(),
                    body,
                });
            } else if let Some(nested) = self.expandable(&field.declared_type, &state.expanding) {
                // scalar nested record: inline at the same depth
                state.expanding.push(nested.name.as_str());
                self.walk(nested, &field_path, &field_scope, depth, state, out);
                state.expanding.pop();
            } else {
                out.push(Stmt::Check { path: field_path });
            }
        }
    }

    /// Element type when `field` is iterated, `None` when it is checked as one value.
    fn element_of(&self, field: &'g Field) -> Option<&'g str> {
        if field.is_array {
            let element = self.graph.element_type(&field.declared_type);
            return Some(element.unwrap_or(field.declared_type.as_str()));
        }
        if field.is_text && self.text_policy == TextPolicy::PerCharacter {
            return Some(CHARACTER_TYPE);
        }
        None
    }

    /// The record to inline for `type_name`, unless it is already being expanded.
    fn expandable(&self, type_name: &str, expanding: &[&str]) -> Option<&'g Record> {
        let nested = self.graph.record_for(type_name)?;
        if expanding.contains(&nested.name.as_str()) {
            warn!(record = %nested.name, "recursive record reference, checking directly");
            return None;
        }
        Some(nested)
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::build_graph;
    use crate::extract::extract;
    use crate::normalize::normalize;

    fn synth(src: &str, record: &str, policy: TextPolicy) -> Vec<Stmt> {
        let graph = build_graph(extract(&normalize(src)));
        let record = graph.record(record).expect("record declared");
        Synthesizer::new(&graph, policy).synthesize(record, "Input")
    }

    fn check(path: &str) -> Stmt {
        Stmt::Check { path: path.to_string() }
    }

    fn vars(stmts: &[Stmt], out: &mut Vec<String>) {
        for stmt in stmts {
            if let Stmt::Loop { var, body, .. } = stmt {
                out.push(var.clone());
                vars(body, out);
            }
        }
    }

    const SHAPES: &str = r#"
        type Point is record X : Integer; Y : Integer; end record;
        type Shape is record
           Vertices : Point_Array (1 .. 4);
           Label    : String (1 .. 16);
        end record;
        type Point_Array is array (Positive range <>) of Point;
    "#;

    #[test]
    fn array_of_records_loops_with_inlined_checks() {
        let stmts = synth(SHAPES, "Shape", TextPolicy::Whole);
        assert_eq!(
            stmts,
            vec![
                Stmt::Loop {
                    var: "I_Vertices_0".into(),
                    array: "Input.Vertices".into(),
                    bounds: Some("1 .. 4".into()),
                    body: vec![
                        check("Input.Vertices(I_Vertices_0).X"),
                        check("Input.Vertices(I_Vertices_0).Y"),
                    ],
                },
                check("Input.Label"),
            ]
        );
    }

    #[test]
    fn scalar_nested_record_is_inlined_without_a_loop() {
        let src = "type Point is record X : Integer; Y : Integer; end record;\n\
                   type Segment is record From : Point; To : Point; end record;";
        let stmts = synth(src, "Segment", TextPolicy::Whole);
        assert_eq!(
            stmts,
            vec![
                check("Input.From.X"),
                check("Input.From.Y"),
                check("Input.To.X"),
                check("Input.To.Y"),
            ]
        );
    }

    #[test]
    fn scalar_array_elements_get_one_indexed_check() {
        let src = "type Samples is array (1 .. 8) of Float;\n\
                   type R is record Data : Samples; end record;";
        let stmts = synth(src, "R", TextPolicy::Whole);
        assert_eq!(
            stmts,
            vec![Stmt::Loop {
                var: "I_Data_0".into(),
                array: "Input.Data".into(),
                bounds: None,
                body: vec![check("Input.Data(I_Data_0)")],
            }]
        );
    }

    #[test]
    fn loop_variables_never_collide() {
        let src = r#"
            type Cell is record V : Integer; end record;
            type Row is record Cells : Cell_Array (1 .. 3); Tags : Tag_Array (1 .. 2); end record;
            type Cell_Array is array (Positive range <>) of Cell;
            type Tag_Array is array (Positive range <>) of Integer;
            type Wrapper is record Cells : Cell_Array (1 .. 2); end record;
            type Grid is record
               Rows  : Row_Array (1 .. 3);
               Spare : Row_Array (1 .. 3);
               Inner : Wrapper;
               Cells : Cell_Array (1 .. 5);
            end record;
            type Row_Array is array (Positive range <>) of Row;
        "#;
        let mut names = Vec::new();
        vars(&synth(src, "Grid", TextPolicy::Whole), &mut names);
        assert_eq!(names.len(), 8);
        let mut unique = names.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), names.len(), "{names:?}");
        assert!(names.contains(&"I_Rows_Cells_1".to_string()));
        assert!(names.contains(&"I_Inner_Cells_0".to_string()));
        assert!(names.contains(&"I_Cells_0".to_string()));
    }

    #[test]
    fn underscored_field_names_do_not_alias_loop_variables() {
        // A.B_C and A_B.C both spell the chain `A_B_C`
        let src = r#"
            type Arr is array (1 .. 2) of Integer;
            type P is record B_C : Arr; end record;
            type Q is record C : Arr; end record;
            type R is record A : P; A_B : Q; end record;
        "#;
        let stmts = synth(src, "R", TextPolicy::Whole);
        assert_eq!(
            stmts,
            vec![
                Stmt::Loop {
                    var: "I_A_B_C_0".into(),
                    array: "Input.A.B_C".into(),
                    bounds: None,
                    body: vec![check("Input.A.B_C(I_A_B_C_0)")],
                },
                Stmt::Loop {
                    var: "I_A_B_C_0_2".into(),
                    array: "Input.A_B.C".into(),
                    bounds: None,
                    body: vec![check("Input.A_B.C(I_A_B_C_0_2)")],
                },
            ]
        );
    }

    #[test]
    fn text_policy_controls_per_character_checks() {
        let src = "subtype Name is String (1 .. 8);\n\
                   type R is record Who : Name; Tag : String (1 .. 4); end record;";
        assert_eq!(
            synth(src, "R", TextPolicy::Whole),
            vec![check("Input.Who"), check("Input.Tag")]
        );
        let per_char = synth(src, "R", TextPolicy::PerCharacter);
        assert_eq!(
            per_char[0],
            Stmt::Loop {
                var: "I_Who_0".into(),
                array: "Input.Who".into(),
                bounds: None,
                body: vec![check("Input.Who(I_Who_0)")],
            }
        );
        assert!(matches!(&per_char[1], Stmt::Loop { bounds: Some(b), .. } if b == "1 .. 4"));
    }

    #[test]
    fn unresolvable_types_fail_closed_to_a_direct_check() {
        let stmts = synth("type R is record A : Unknown_Kind; end record;", "R", TextPolicy::Whole);
        assert_eq!(stmts, vec![check("Input.A")]);
    }

    #[test]
    fn records_reached_through_subtypes_are_inlined() {
        let src = "type Point is record X : Integer; end record;\n\
                   subtype Origin is Point;\n\
                   type R is record O : Origin; end record;";
        assert_eq!(synth(src, "R", TextPolicy::Whole), vec![check("Input.O.X")]);
    }

    #[test]
    fn self_reference_terminates() {
        let src = r#"
            type Node is record
               Value    : Integer;
               Children : Node_Array (1 .. 2);
               Parent   : Node;
            end record;
            type Node_Array is array (Positive range <>) of Node;
        "#;
        let stmts = synth(src, "Node", TextPolicy::Whole);
        assert_eq!(
            stmts,
            vec![
                check("Input.Value"),
                Stmt::Loop {
                    var: "I_Children_0".into(),
                    array: "Input.Children".into(),
                    bounds: Some("1 .. 2".into()),
                    body: vec![check("Input.Children(I_Children_0)")],
                },
                check("Input.Parent"),
            ]
        );
    }

    #[test]
    fn mutual_recursion_terminates() {
        let src = "type A is record B_Part : B; N : Integer; end record;\n\
                   type B is record A_Part : A; end record;";
        assert_eq!(
            synth(src, "A", TextPolicy::Whole),
            vec![check("Input.B_Part.A_Part"), check("Input.N")]
        );
    }
}
