//! The Quill compiler front-end CLI.
//!
//! Provides the `quillc` command:
//!
//! - `quillc check <files...>` - Lex, parse, and type-check Quill sources
//!
//! Options:
//! - `--print-ast` - Dump each file's syntax tree after checking
//! - `--print-symbols` - Dump the merged symbol table
//! - `--no-trivia` - Do not preserve whitespace/comment trivia
//! - `--emit-json` - Emit diagnostics as JSON on stdout
//!
//! The driver compiles files sequentially (each with its own arena, token
//! stream, and file-local symbol table), merges the symbol tables, runs
//! type resolution once over the merged program, and reports diagnostics
//! with ariadne. A cooperative cancel flag is checked between files.

use std::path::PathBuf;
use std::process;

use clap::{Parser as ClapParser, Subcommand};
use tracing_subscriber::EnvFilter;

use quill_common::cancel::CancelFlag;
use quill_common::diagnostics::Diagnostic;
use quill_lexer::LexerOptions;
use quill_parser::printer::AstPrinter;
use quill_parser::ParseResult;
use quill_sema::{check, FileId, SourceUnit};

#[derive(ClapParser)]
#[command(name = "quillc", version, about = "The Quill compiler front-end")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lex, parse, and type-check Quill source files
    Check {
        /// Source files to compile, in order
        files: Vec<PathBuf>,

        /// Dump each file's syntax tree after checking
        #[arg(long = "print-ast")]
        print_ast: bool,

        /// Dump the merged symbol table
        #[arg(long = "print-symbols")]
        print_symbols: bool,

        /// Do not preserve whitespace/comment trivia on tokens
        #[arg(long = "no-trivia")]
        no_trivia: bool,

        /// Emit diagnostics as JSON on stdout
        #[arg(long = "emit-json")]
        emit_json: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Check { files, print_ast, print_symbols, no_trivia, emit_json } => {
            if files.is_empty() {
                eprintln!("error: no input files");
                process::exit(2);
            }
            match run_check(&files, print_ast, print_symbols, no_trivia, emit_json) {
                Ok(true) => {}
                Ok(false) => process::exit(1),
                Err(message) => {
                    eprintln!("error: {message}");
                    process::exit(2);
                }
            }
        }
    }
}

struct CheckedFile {
    name: String,
    source: String,
    parse: ParseResult,
    diagnostics: Vec<Diagnostic>,
}

/// Run the whole front end over `files`. Returns `Ok(true)` when the
/// program checked cleanly.
fn run_check(
    files: &[PathBuf],
    print_ast: bool,
    print_symbols: bool,
    no_trivia: bool,
    emit_json: bool,
) -> Result<bool, String> {
    let cancel = CancelFlag::new();
    let options = LexerOptions { preserve_trivia: !no_trivia };

    // Per-file pipeline: lex and parse with independent arenas.
    let mut checked = Vec::new();
    for path in files {
        if cancel.is_cancelled() {
            return Err("compilation cancelled".into());
        }
        let source = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read '{}': {e}", path.display()))?;

        tracing::debug!(file = %path.display(), "compiling");
        let (tokens, lex_errors) = quill_lexer::tokenize(&source, options);
        let parse = quill_parser::parse(tokens, &source);

        let mut diagnostics: Vec<Diagnostic> =
            lex_errors.into_iter().map(|e| e.into_diagnostic()).collect();
        diagnostics.extend(parse.errors.iter().cloned().map(|e| e.into_diagnostic()));

        checked.push(CheckedFile {
            name: path.display().to_string(),
            source,
            parse,
            diagnostics,
        });
    }

    // Merge and resolve across all files.
    let units: Vec<SourceUnit> = checked
        .iter()
        .enumerate()
        .map(|(i, f)| SourceUnit {
            file: FileId(i as u32),
            ast: &f.parse.ast,
            unit: &f.parse.unit,
        })
        .collect();
    let analysis = check(&units);

    // Semantic diagnostics attach to the file their range points into;
    // merge conflicts have no range and report against the first file.
    let mut sema_diagnostics: Vec<Vec<Diagnostic>> = vec![Vec::new(); checked.len()];
    for error in &analysis.errors {
        let diag = error.clone().into_diagnostic();
        let file_index = file_for_diagnostic(&checked, &diag);
        sema_diagnostics[file_index].push(diag);
    }
    for (file, extra) in checked.iter_mut().zip(sema_diagnostics) {
        file.diagnostics.extend(extra);
    }

    let mut ok = true;
    for file in &checked {
        if !file.diagnostics.is_empty() {
            if file.diagnostics.iter().any(|d| d.is_error()) {
                ok = false;
            }
            if emit_json {
                emit_json_diagnostics(&file.name, &file.diagnostics)?;
            } else {
                report_diagnostics(&file.name, &file.source, &file.diagnostics);
            }
        }
    }

    if print_ast {
        for (i, file) in checked.iter().enumerate() {
            // Annotate expressions with their resolved types.
            let mut annotations = rustc_hash::FxHashMap::default();
            for (&(f, expr), &ty) in &analysis.type_map.expr_types {
                if f == FileId(i as u32) {
                    annotations.insert(expr, analysis.table.display_type(&analysis.types, ty));
                }
            }
            println!("// {}", file.name);
            print!(
                "{}",
                AstPrinter::new(&file.parse.ast)
                    .with_annotations(&annotations)
                    .print_unit(&file.parse.unit)
            );
        }
    }
    if print_symbols {
        print!("{}", analysis.table.dump(&analysis.types));
    }

    Ok(ok)
}

/// Best-effort assignment of a diagnostic to the file whose source its
/// range fits into. Ranges are byte offsets per file, so the first file
/// whose length covers the offset wins; rangeless diagnostics go first.
fn file_for_diagnostic(files: &[CheckedFile], diag: &Diagnostic) -> usize {
    for (i, file) in files.iter().enumerate() {
        if (diag.range.end_offset() as usize) <= file.source.len() {
            return i;
        }
    }
    0
}

/// Report diagnostics with ariadne, caret-underlining the offending span.
fn report_diagnostics(name: &str, source: &str, diagnostics: &[Diagnostic]) {
    use ariadne::{Label, Report, ReportKind, Source};
    for diag in diagnostics {
        let start = diag.range.start.offset as usize;
        let end = (diag.range.end_offset() as usize).max(start + 1);
        let kind = if diag.is_error() { ReportKind::Error } else { ReportKind::Warning };
        // Plain line for logs and tools, rich report for humans.
        eprintln!("{}", diag.format(name));
        let _ = Report::<std::ops::Range<usize>>::build(kind, start..end)
            .with_message(&diag.message)
            .with_label(Label::new(start..end).with_message(&diag.message))
            .finish()
            .eprint(Source::from(source));
    }
}

fn emit_json_diagnostics(name: &str, diagnostics: &[Diagnostic]) -> Result<(), String> {
    for diag in diagnostics {
        let value = serde_json::json!({
            "file": name,
            "severity": diag.severity.to_string(),
            "message": diag.message,
            "line": diag.range.start.line,
            "column": diag.range.start.column,
            "offset": diag.range.start.offset,
            "width": diag.range.width,
        });
        let line = serde_json::to_string(&value).map_err(|e| e.to_string())?;
        println!("{line}");
    }
    Ok(())
}

// Unused in the check pipeline but part of the front-end contract: a
// back-end would be driven here once one exists.
#[allow(dead_code)]
fn generate<B: quill_sema::backend::Backend>(
    mut backend: B,
    analysis: &quill_sema::Analysis,
    files: &[CheckedFile],
) -> Result<B::Module, quill_sema::backend::BackendError> {
    backend.declare_all_types(&analysis.table, &analysis.types)?;
    backend.declare_all_functions(&analysis.table, &analysis.types)?;
    for file in files {
        backend.generate_definitions(
            &file.parse.ast,
            &file.parse.unit,
            &analysis.table,
            &analysis.types,
            &analysis.type_map,
        )?;
    }
    Ok(backend.release_module())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostics_map_to_files_by_offset() {
        let mk = |name: &str, len: usize| CheckedFile {
            name: name.into(),
            source: "x".repeat(len),
            parse: quill_parser::parse_source(""),
            diagnostics: Vec::new(),
        };
        let files = vec![mk("a.quill", 10), mk("b.quill", 100)];
        let short = Diagnostic::error(
            "m",
            quill_common::span::SourceRange::new(
                quill_common::span::SourceLocation::new(5, 1, 6),
                2,
            ),
        );
        let long = Diagnostic::error(
            "m",
            quill_common::span::SourceRange::new(
                quill_common::span::SourceLocation::new(50, 3, 1),
                2,
            ),
        );
        assert_eq!(file_for_diagnostic(&files, &short), 0);
        assert_eq!(file_for_diagnostic(&files, &long), 1);
    }
}
