//! Generates Ada validity functions for record types.
//!
//! Pipeline: grammar text → [`normalize`] → [`extract`] → [`classify`] (builds
//! the [`ir::TypeGraph`]) → [`synth`] → [`codegen`].
pub mod classify;
pub mod cli;
pub mod codegen;
pub mod error;
pub mod extract;
pub mod ir;
pub mod normalize;
pub mod source;
pub mod synth;

use rayon::prelude::*;
use tracing::{info, warn};

pub use codegen::EmitOptions;
pub use error::{GenerationError, LoadError};
pub use ir::TypeGraph;
pub use synth::TextPolicy;

// ------------------------------- Front API -------------------------------- //

/// One parsed grammar, ready to generate for any of its records.
pub struct Generator {
    graph: TypeGraph,
}

impl Generator {
    pub fn from_source(source: &str) -> Self {
        let normalized = normalize::normalize(source);
        let graph = classify::build_graph(extract::extract(&normalized));
        for (name, kinds) in graph.ambiguities() {
            warn!(%name, ?kinds, "name declared in several catalogs, array alias wins, then subtype, then record");
        }
        info!(records = graph.records.len(), "type graph built");
        Self { graph }
    }

    pub fn graph(&self) -> &TypeGraph {
        &self.graph
    }

    /// Record names in discovery order.
    pub fn record_names(&self) -> Vec<&str> {
        self.graph.record_names()
    }

    /// Check that `type_name` can be generated for.
    pub fn select(&self, type_name: &str) -> Result<&ir::Record, GenerationError> {
        if self.graph.records.is_empty() {
            return Err(GenerationError::NoRecords);
        }
        self.graph.record(type_name).ok_or_else(|| GenerationError::UnknownType {
            name: type_name.to_string(),
            available: self.graph.records.keys().cloned().collect(),
        })
    }

    /// Just the function for `type_name`.
    pub fn generate_function(
        &self,
        type_name: &str,
        options: &EmitOptions,
    ) -> Result<String, GenerationError> {
        let record = self.select(type_name)?;
        let stmts = synth::Synthesizer::new(&self.graph, options.text_policy)
            .synthesize(record, &options.parameter);
        let mut cg = codegen::Codegen::new(options);
        cg.emit(&stmts, &record.name);
        Ok(cg.into_string())
    }

    /// Complete file contents for `type_name`: header comments plus function.
    pub fn generate(&self, type_name: &str, options: &EmitOptions) -> Result<String, GenerationError> {
        let record = self.select(type_name)?;
        let stmts = synth::Synthesizer::new(&self.graph, options.text_policy)
            .synthesize(record, &options.parameter);
        let mut cg = codegen::Codegen::new(options);
        cg.emit_header(&record.name, self.graph.package.as_deref());
        cg.emit(&stmts, &record.name);
        Ok(cg.into_string())
    }

    /// `(type name, file contents)` for every record, in discovery order.
    ///
    /// Records are synthesized in parallel; the graph is only read.
    pub fn generate_all(&self, options: &EmitOptions) -> Result<Vec<(String, String)>, GenerationError> {
        let names = self.record_names();
        if names.is_empty() {
            return Err(GenerationError::NoRecords);
        }
        names
            .par_iter()
            .map(|name| self.generate(name, options).map(|text| (name.to_string(), text)))
            .collect()
    }
}

/// File name the output sink uses for `type_name`.
pub fn output_file_name(type_name: &str) -> String {
    format!("{}_validation.adb", type_name.to_lowercase())
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;

    const SHAPES: &str = r#"
-- Example from the design notes.
package Shapes is
   type Color_Kind is (Red, Green, Blue);
   type Int_Array is array (1 .. 10) of Integer;
   type Point is record
      X : Integer;
      Y : Integer;
   end record;
   type Shape is record
      Vertices : Point_Array (1 .. 4);
      Label    : String (1 .. 16);
   end record;
   type Point_Array is array (Positive range <>) of Point;
end Shapes;
"#;

    #[test]
    fn shape_example_end_to_end() {
        let generator = Generator::from_source(SHAPES);
        let text = generator.generate_function("Shape", &EmitOptions::default()).unwrap();
        assert_eq!(
            text,
            "function Is_Valid (Input : Shape) return Boolean is
   Valid : Boolean;
begin
   Valid := True;
   for I_Vertices_0 in Input.Vertices'Range loop -- 1 .. 4
      Valid := Valid and Input.Vertices(I_Vertices_0).X'Valid;
      Valid := Valid and Input.Vertices(I_Vertices_0).Y'Valid;
   end loop;
   Valid := Valid and Input.Label'Valid;
   return Valid;
end Is_Valid;
"
        );
    }

    #[test]
    fn output_is_deterministic() {
        let options = EmitOptions::default();
        let first = Generator::from_source(SHAPES).generate("Shape", &options).unwrap();
        for _ in 0..5 {
            assert_eq!(Generator::from_source(SHAPES).generate("Shape", &options).unwrap(), first);
        }
    }

    #[test]
    fn unknown_selection_fails_without_output() {
        let generator = Generator::from_source(SHAPES);
        let err = generator.generate("Circle", &EmitOptions::default()).unwrap_err();
        assert_eq!(
            err,
            GenerationError::UnknownType {
                name: "Circle".into(),
                available: vec!["Point".into(), "Shape".into()],
            }
        );
    }

    #[test]
    fn grammar_without_records_reports_no_records() {
        let generator = Generator::from_source("type Color_Kind is (Red, Green);");
        assert_eq!(
            generator.generate("Color_Kind", &EmitOptions::default()).unwrap_err(),
            GenerationError::NoRecords
        );
        assert_eq!(generator.generate_all(&EmitOptions::default()).unwrap_err(), GenerationError::NoRecords);
    }

    #[test]
    fn record_after_an_unterminated_one_still_generates() {
        let generator = Generator::from_source(
            "type Broken is record X : Integer;\ntype Good is record Y : Integer; end record;",
        );
        assert_eq!(generator.record_names(), vec!["Good"]);
        let text = generator.generate_function("Good", &EmitOptions::default()).unwrap();
        assert!(text.contains("   Valid := Valid and Input.Y'Valid;\n"));
        assert!(!text.contains("type"));
    }

    #[test]
    fn generate_all_keeps_discovery_order() {
        let generator = Generator::from_source(SHAPES);
        let options = EmitOptions::default();
        let all = generator.generate_all(&options).unwrap();
        let names = all.iter().map(|(n, _)| n.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["Point", "Shape"]);
        assert_eq!(all[1].1, generator.generate("Shape", &options).unwrap());
    }

    #[test]
    fn catalog_serializes_to_json() {
        let generator = Generator::from_source(SHAPES);
        let json = serde_json::to_value(generator.graph()).unwrap();
        assert_eq!(json["package"], "Shapes");
        assert_eq!(json["array_aliases"]["Point_Array"], "Point");
        assert_eq!(json["records"]["Shape"]["fields"][0]["is_array"], true);
        assert_eq!(json["enumerations"]["Color_Kind"]["literals"][2], "Blue");
    }

    #[test]
    fn output_file_is_named_after_the_type() {
        assert_eq!(output_file_name("Shape"), "shape_validation.adb");
    }
}
