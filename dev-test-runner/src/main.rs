//! Regenerates every golden sample and diffs it against `samples/expected/`.
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use ada_validgen::{EmitOptions, Generator};
use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;

#[derive(Parser, Debug)]
struct Settings {
    /// directory holding `<stem>.ads` files and `expected/<stem>/<Type>.adb`
    #[arg(long, default_value = "samples")]
    samples: PathBuf,

    /// rewrite the expectations for every record instead of comparing
    #[arg(long)]
    bless: bool,
}

fn main() -> ExitCode {
    let settings = Settings::parse();
    match run(&settings) {
        Ok(0) => ExitCode::SUCCESS,
        Ok(failures) => {
            eprintln!("{} {failures} sample(s) differ", "✗".red());
            ExitCode::FAILURE
        }
        Err(error) => {
            eprintln!("{}: {error:#}", "error".bright_red());
            ExitCode::FAILURE
        }
    }
}

fn run(settings: &Settings) -> Result<usize> {
    let options = EmitOptions::default();
    let mut failures = 0;
    for source_path in files_with_extension(&settings.samples, "ads")? {
        let stem = source_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let source = ada_validgen::source::load(&source_path)?;
        let generator = Generator::from_source(&source);
        let expected_dir = settings.samples.join("expected").join(&stem);

        if settings.bless {
            std::fs::create_dir_all(&expected_dir)
                .with_context(|| format!("failed to create {}", expected_dir.display()))?;
            for (type_name, text) in generator.generate_all(&options)? {
                let path = expected_dir.join(format!("{type_name}.adb"));
                std::fs::write(&path, text).with_context(|| format!("failed to write {}", path.display()))?;
                println!("{} {stem}/{type_name}", "blessed".cyan());
            }
            continue;
        }

        if !expected_dir.is_dir() {
            println!("{} {stem} (no expectations)", "skip".yellow());
            continue;
        }
        for expected in files_with_extension(&expected_dir, "adb")? {
            let type_name = expected
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default();
            let want = std::fs::read_to_string(&expected)
                .with_context(|| format!("failed to read {}", expected.display()))?;
            let got = generator.generate(&type_name, &options)?;
            if got == want {
                println!("{} {stem}/{type_name}", "✓".green());
            } else {
                failures += 1;
                println!("{} {stem}/{type_name}", "✗".red());
                print_diff(&want, &got);
            }
        }
    }
    Ok(failures)
}

/// `dir/*.<extension>`, sorted.
fn files_with_extension(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let pattern = format!("{}/*.{extension}", glob::Pattern::escape(&dir.to_string_lossy()));
    let mut files = glob::glob(&pattern)
        .with_context(|| format!("invalid pattern {pattern}"))?
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("failed to read {}", dir.display()))?;
    files.sort();
    Ok(files)
}

// Line-by-line; good enough for a handful of short functions.
fn print_diff(want: &str, got: &str) {
    let want = want.lines().collect::<Vec<_>>();
    let got = got.lines().collect::<Vec<_>>();
    for i in 0..want.len().max(got.len()) {
        match (want.get(i), got.get(i)) {
            (Some(w), Some(g)) if w == g => {}
            (w, g) => {
                if let Some(w) = w {
                    println!("  {} {w}", "-".red());
                }
                if let Some(g) = g {
                    println!("  {} {g}", "+".green());
                }
            }
        }
    }
}
