//! CLI: parse grammar → (list | generate)
use std::io::{BufRead, IsTerminal, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Args, Parser, Subcommand};
use colored::Colorize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::{EmitOptions, Generator, TextPolicy, output_file_name};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// generate Ada validity functions ('Valid checks over every field) for record types
#[derive(Parser, Debug)]
#[command(name = "ada-validgen", version)]
pub struct CommandLineInterface {
    /// more logging on stderr (-v info, -vv debug, -vvv trace); RUST_LOG wins when set
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// list the record types found in the input
    List(ListOut),
    /// generate the validation function for one record type (or all of them)
    Generate(GenerateOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// One or more Ada spec files. May be literal paths or quoted glob patterns;
    /// all of them are read as one grammar
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(clap::Parser, Debug)]
struct ListOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// dump the whole type graph as JSON instead
    #[arg(long)]
    json: bool,

    /// also list enumerations, array types and subtypes
    #[arg(long)]
    all_kinds: bool,
}

#[derive(clap::Parser, Debug)]
struct GenerateOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// record type to validate (prompted for when omitted)
    type_name: Option<String>,

    /// generate for every record type
    #[arg(long, conflicts_with = "type_name")]
    all: bool,

    /// directory for `<type>_validation.adb` files
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// print to stdout instead of writing files
    #[arg(long)]
    stdout: bool,

    /// name of the generated function
    #[arg(long, default_value = "Is_Valid")]
    function_name: String,

    /// name of the function's record parameter
    #[arg(long, default_value = "Input")]
    parameter: String,

    /// name of the boolean accumulator
    #[arg(long, default_value = "Valid")]
    accumulator: String,

    /// how text (String) fields are checked
    #[arg(long, value_enum, default_value_t = TextPolicy::Whole)]
    text_policy: TextPolicy,

    /// print the parsed command line to stderr and exit without reading any input
    #[arg(long)]
    no_op: bool,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn load_generator(&self) -> Result<Generator> {
        let source = crate::source::load_all(&self.input).context("failed to load grammar source")?;
        Ok(Generator::from_source(&source))
    }
}

impl GenerateOut {
    fn emit_options(&self) -> EmitOptions {
        EmitOptions {
            function_name: self.function_name.clone(),
            parameter: self.parameter.clone(),
            accumulator: self.accumulator.clone(),
            text_policy: self.text_policy,
            ..EmitOptions::default()
        }
    }

    fn write(&self, type_name: &str, contents: &str) -> Result<()> {
        if self.stdout {
            print!("{contents}");
            return Ok(());
        }
        std::fs::create_dir_all(&self.out_dir)
            .with_context(|| format!("failed to create {}", self.out_dir.display()))?;
        let out = self.out_dir.join(output_file_name(type_name));
        std::fs::write(&out, contents).with_context(|| format!("failed to write {}", out.display()))?;
        info!(path = %out.display(), "wrote validation function");
        println!("{} {}", "Output written to:".green(), out.display());
        Ok(())
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    /// Logging goes to stderr so generated text on stdout stays clean.
    pub fn init_logging(&self) {
        let level = match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    pub fn run(&self) -> Result<()> {
        match &self.cmd {
            Command::List(target) => {
                let generator = target.input_settings.load_generator()?;
                if target.json {
                    let json = serde_json::to_string_pretty(generator.graph())?;
                    println!("{json}");
                    return Ok(());
                }
                print_listing(&generator, target.all_kinds);
                Ok(())
            }
            Command::Generate(target) => {
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(());
                }

                let generator = target.input_settings.load_generator()?;
                let options = target.emit_options();

                if target.all {
                    for (type_name, contents) in generator.generate_all(&options)? {
                        target.write(&type_name, &contents)?;
                    }
                    return Ok(());
                }

                let type_name = match &target.type_name {
                    Some(name) => name.clone(),
                    None => prompt_for_type(&generator)?,
                };
                let contents = generator.generate(&type_name, &options)?;
                target.write(&type_name, &contents)
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn print_listing(generator: &Generator, all_kinds: bool) {
    let graph = generator.graph();
    if graph.records.is_empty() {
        println!("No record types found in the input");
    } else {
        println!("Found the following record types:");
        for (i, name) in graph.records.keys().enumerate() {
            println!("  {}. {}", i + 1, name.bold());
        }
    }
    if !all_kinds {
        return;
    }
    let sections = [
        ("Enumerations", graph.enumerations.keys().map(|n| n.to_string()).collect::<Vec<_>>()),
        (
            "Array types",
            graph.array_aliases.iter().map(|(n, e)| format!("{n} (of {e})")).collect(),
        ),
        ("Subtypes", graph.subtypes.iter().map(|(n, b)| format!("{n} (is {b})")).collect()),
    ];
    for (title, entries) in sections {
        if entries.is_empty() {
            continue;
        }
        println!("{title}:");
        for entry in entries {
            println!("  - {entry}");
        }
    }
}

/// Ask on the terminal until a known record name is entered.
fn prompt_for_type(generator: &Generator) -> Result<String> {
    let names = generator.record_names();
    if names.is_empty() {
        return Err(crate::GenerationError::NoRecords.into());
    }
    if !std::io::stdin().is_terminal() {
        bail!(
            "no type given and stdin is not interactive; available record types: {}",
            names.join(", ")
        );
    }
    print_listing(generator, false);

    let stdin = std::io::stdin();
    let mut lines = stdin.lock();
    loop {
        print!("\nEnter the name of the type to validate: ");
        std::io::stdout().flush()?;
        let mut line = String::new();
        if lines.read_line(&mut line)? == 0 {
            bail!("aborted");
        }
        let choice = line.trim();
        if names.contains(&choice) {
            debug!(choice, "type selected");
            return Ok(choice.to_string());
        }
        println!("Type '{}' not found. Please choose from the list above.", choice.yellow());
    }
}
