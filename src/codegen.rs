//! Emitter: wraps synthesized statements in an Ada function template.
use crate::synth::{Stmt, TextPolicy};

/// Names and layout of the emitted function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitOptions {
    pub function_name: String,
    pub parameter: String,
    pub accumulator: String,
    /// Spaces per indentation level.
    pub indent: usize,
    pub text_policy: TextPolicy,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            function_name: "Is_Valid".to_string(),
            parameter: "Input".to_string(),
            accumulator: "Valid".to_string(),
            indent: 3,
            text_policy: TextPolicy::Whole,
        }
    }
}

pub struct Codegen<'a> {
    options: &'a EmitOptions,
    buffer: String,
}

impl<'a> Codegen<'a> {
    pub fn new(options: &'a EmitOptions) -> Self {
        Self { options, buffer: String::new() }
    }

    /// Comment block placed above the function in a generated file.
    pub fn emit_header(&mut self, type_name: &str, package: Option<&str>) {
        self.line(0, &format!("-- Generated validation function for {type_name}"));
        self.line(0, "-- This file contains a validation function template");
        self.buffer.push('\n');
        match package {
            Some(package) => {
                self.line(0, &format!("-- Add this function to the body of package {package}:"))
            }
            None => self.line(0, "-- Add this function to your package body:"),
        }
        self.buffer.push('\n');
    }

    /// The function itself. Statements are trusted as given.
    pub fn emit(&mut self, stmts: &[Stmt], type_name: &str) {
        let options = self.options;
        let EmitOptions { function_name, parameter, accumulator, .. } = options;
        self.line(
            0,
            &format!("function {function_name} ({parameter} : {type_name}) return Boolean is"),
        );
        self.line(1, &format!("{accumulator} : Boolean;"));
        self.line(0, "begin");
        self.line(1, &format!("{accumulator} := True;"));
        for stmt in stmts {
            self.emit_stmt(stmt, 1);
        }
        self.line(1, &format!("return {accumulator};"));
        self.line(0, &format!("end {function_name};"));
    }

    pub fn into_string(self) -> String {
        self.buffer
    }

    fn emit_stmt(&mut self, stmt: &Stmt, level: usize) {
        let options = self.options;
        let acc = &options.accumulator;
        match stmt {
            Stmt::Check { path } => {
                let text = format!("{acc} := {acc} and {path}'Valid;");
                self.line(level, &text);
            }
            Stmt::Loop { var, array, bounds, body } => {
                let header = match bounds {
                    Some(bounds) => format!("for {var} in {array}'Range loop -- {bounds}"),
                    None => format!("for {var} in {array}'Range loop"),
                };
                self.line(level, &header);
                for inner in body {
                    self.emit_stmt(inner, level + 1);
                }
                self.line(level, "end loop;");
            }
        }
    }

    fn line(&mut self, level: usize, text: &str) {
        self.buffer.push_str(&" ".repeat(level * self.options.indent));
        self.buffer.push_str(text);
        self.buffer.push('\n');
    }
}
