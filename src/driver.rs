//! Orquestación de fases.
//!
//! Cada fase corre solo si las anteriores no reportaron errores. El
//! progreso, los árboles solicitados y los diagnósticos se escriben en
//! una salida arbitraria, usualmente stdout.

use std::{
    io::{self, Write},
    path::Path,
    rc::Rc,
};

use anyhow::Context;
use bitflags::bitflags;

use crate::{
    codegen::{self, ObjectProgram},
    error::Reporter,
    fold::{self, FoldCounts},
    parse::parse,
    semantic::check,
    source::Source,
    summary::SummaryVisitor,
    tree,
};

pub const BANNER: &str = "********** Triangle Compiler (Rust Version 1.0) **********";

bitflags! {
    /// Fases y salidas opcionales.
    pub struct Options: u32 {
        /// Plegado de constantes tras el análisis contextual.
        const FOLD = 1 << 0;

        /// Muestra el árbol anotado tras el análisis contextual.
        const SHOW_TREE = 1 << 1;

        /// Muestra el árbol tras el plegado. Sin `FOLD` no tiene efecto.
        const SHOW_TREE_AFTER = 1 << 2;

        /// Estadísticas de literales, justo después del análisis sintáctico.
        const SHOW_STATS = 1 << 3;

        /// Detiene el registro de diagnósticos tras el primer error.
        const FAIL_FAST = 1 << 4;
    }
}

/// Resultado de una compilación.
pub struct Outcome {
    reporter: Reporter,
    object: Option<ObjectProgram>,
    stats: Option<SummaryVisitor>,
    folds: Option<FoldCounts>,
}

impl Outcome {
    pub fn successful(&self) -> bool {
        self.object.is_some()
    }

    pub fn reporter(&self) -> &Reporter {
        &self.reporter
    }

    /// Programa objeto, presente solo si no hubo errores.
    pub fn object(&self) -> Option<&ObjectProgram> {
        self.object.as_ref()
    }

    pub fn stats(&self) -> Option<&SummaryVisitor> {
        self.stats.as_ref()
    }

    pub fn folds(&self) -> Option<FoldCounts> {
        self.folds
    }
}

/// Compila un programa ya cargado.
///
/// Los errores de E/S provienen únicamente de `out`.
pub fn compile<W: Write>(source: &Rc<Source>, options: Options, out: &mut W) -> io::Result<Outcome> {
    let mut reporter = Reporter::new(options.contains(Options::FAIL_FAST));
    let mut outcome = Outcome {
        reporter: Reporter::default(),
        object: None,
        stats: None,
        folds: None,
    };

    writeln!(out, "{}", BANNER)?;
    writeln!(out, "Syntactic Analysis ...")?;

    let mut program = parse(source, &mut reporter);
    if reporter.errors() == 0 {
        if options.contains(Options::SHOW_STATS) {
            let stats = SummaryVisitor::summarize(&program);
            write!(out, "{}", stats)?;
            outcome.stats = Some(stats);
        }

        writeln!(out, "Contextual Analysis ...")?;
        let mut annotations = check(&program, &mut reporter);

        if options.contains(Options::SHOW_TREE) {
            write!(out, "{}", tree::render(&program, Some(&annotations)))?;
        }

        if options.contains(Options::FOLD) && reporter.errors() == 0 {
            let counts = fold::fold(&mut program, &mut annotations, &mut reporter);
            writeln!(
                out,
                "Folded {} integer and {} boolean expressions",
                counts.integers, counts.booleans
            )?;

            outcome.folds = Some(counts);
            if options.contains(Options::SHOW_TREE_AFTER) {
                write!(out, "{}", tree::render(&program, Some(&annotations)))?;
            }
        }

        if reporter.errors() == 0 {
            writeln!(out, "Code Generation ...")?;

            let object = codegen::encode(&program, &annotations, &mut reporter);
            if reporter.errors() == 0 {
                outcome.object = Some(object);
            }
        }
    }

    write!(out, "{}", reporter)?;
    outcome.reporter = reporter;

    Ok(outcome)
}

/// Compila un archivo y guarda el programa objeto si no hubo errores.
///
/// Retorna `false` si la compilación fracasó. Un archivo fuente ilegible
/// o un archivo objeto que no se puede escribir son errores fatales.
pub fn run<W: Write>(
    source_path: &Path,
    object_path: &Path,
    options: Options,
    out: &mut W,
) -> anyhow::Result<bool> {
    let source = Source::load(source_path)
        .with_context(|| format!("Can't access source file {}", source_path.display()))?;

    let outcome = compile(&source, options, out).context("Failed to write compiler output")?;
    match outcome.object() {
        Some(object) => {
            object
                .save(object_path)
                .with_context(|| format!("Failed to write object file: {}", object_path.display()))?;

            writeln!(out, "Compilation was successful.")?;
            Ok(true)
        }

        None => {
            writeln!(out, "Compilation was unsuccessful.")?;
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile_text(text: &str, options: Options) -> (Outcome, String) {
        let source = Source::new("test.tri", text);
        let mut out = Vec::new();

        let outcome = compile(&source, options, &mut out).unwrap();
        (outcome, String::from_utf8(out).unwrap())
    }

    #[test]
    fn clean_program_reaches_code_generation() {
        let (outcome, output) = compile_text("putint(1 + 2)", Options::empty());

        assert!(outcome.successful());
        assert!(output.starts_with(BANNER));
        assert!(output.contains("Syntactic Analysis ...\nContextual Analysis ...\nCode Generation ...\n"));
        assert!(outcome.folds().is_none());
    }

    #[test]
    fn syntax_errors_skip_later_phases() {
        let (outcome, output) = compile_text("begin putint(1) ", Options::SHOW_STATS);

        assert!(!outcome.successful());
        assert!(outcome.reporter().errors() > 0);
        assert!(outcome.stats().is_none());
        assert!(!output.contains("Contextual Analysis"));
        assert!(output.contains("syntax error"));
    }

    #[test]
    fn semantic_errors_skip_code_generation() {
        let (outcome, output) = compile_text("putint(y)", Options::FOLD);

        assert!(!outcome.successful());
        assert!(outcome.folds().is_none());
        assert!(!output.contains("Code Generation"));
        assert!(output.contains("semantic error: `y` is not declared"));
    }

    #[test]
    fn folding_is_reported() {
        let options = Options::FOLD | Options::SHOW_TREE_AFTER;
        let (outcome, output) = compile_text("putint(2 * 3)", options);

        assert!(outcome.successful());
        assert_eq!(
            outcome.folds(),
            Some(FoldCounts {
                integers: 1,
                booleans: 0
            })
        );

        assert!(output.contains("Folded 1 integer and 0 boolean expressions"));
        assert!(output.contains("IntegerLiteral 6"));
    }

    #[test]
    fn stats_run_before_contextual_analysis() {
        let (outcome, output) = compile_text("put('a')", Options::SHOW_STATS);

        let stats = outcome.stats().unwrap();
        assert_eq!((stats.characters(), stats.integers()), (1, 0));

        let stats_at = output.find("Summary statistics:").unwrap();
        let contextual_at = output.find("Contextual Analysis").unwrap();
        assert!(stats_at < contextual_at);
    }

    #[test]
    fn fail_fast_keeps_one_error() {
        let text = "begin putint(x); putint(y) end";

        let (outcome, _) = compile_text(text, Options::empty());
        assert_eq!(outcome.reporter().errors(), 2);

        let (outcome, _) = compile_text(text, Options::FAIL_FAST);
        assert_eq!(outcome.reporter().errors(), 1);
    }
}
