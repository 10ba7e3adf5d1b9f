//! Reporte de diagnósticos.
//!
//! Ninguna fase aborta la compilación al encontrar un error. En su
//! lugar, cada error se registra en un [`Reporter`] junto con su
//! ubicación y la fase continúa con algún valor centinela. El conteo
//! de errores del reporter decide si las fases posteriores se ejecutan.

use crate::source::{Located, Location};
use std::{
    error::Error,
    fmt::{self, Display},
};

/// Fase que originó un diagnóstico.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Kind {
    Lexical,
    Syntactic,
    Semantic,

    /// Límites de la máquina objetivo, detectados durante generación de código.
    Restriction,
}

impl Display for Kind {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.write_str(match self {
            Kind::Lexical => "lexical",
            Kind::Syntactic => "syntax",
            Kind::Semantic => "semantic",
            Kind::Restriction => "restriction",
        })
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl Display for Severity {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.write_str(match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        })
    }
}

/// Un diagnóstico individual.
pub struct Diagnostic {
    kind: Kind,
    severity: Severity,
    error: Box<dyn 'static + Error>,
    location: Location,
}

impl Diagnostic {
    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Mensaje legible del error original.
    pub fn message(&self) -> String {
        self.error.to_string()
    }
}

/// Sumidero de diagnósticos de una compilación.
///
/// Existe una instancia por compilación. En modo `fail_fast`, el
/// primer error detiene el registro de cualquier diagnóstico
/// posterior y [`Reporter::halted()`] pasa a ser verdadero.
pub struct Reporter {
    diagnostics: Vec<Diagnostic>,
    errors: usize,
    fail_fast: bool,
}

impl Reporter {
    pub fn new(fail_fast: bool) -> Self {
        Reporter {
            diagnostics: Vec::new(),
            errors: 0,
            fail_fast,
        }
    }

    /// Registra un error.
    pub fn report<E: 'static + Error>(&mut self, kind: Kind, error: Located<E>) {
        self.push(kind, Severity::Error, error);
    }

    /// Registra una advertencia. Las advertencias no cuentan como errores.
    pub fn warn<E: 'static + Error>(&mut self, kind: Kind, error: Located<E>) {
        self.push(kind, Severity::Warning, error);
    }

    /// Cantidad de errores registrados hasta el momento.
    pub fn errors(&self) -> usize {
        self.errors
    }

    /// Determina si ya no se aceptan más diagnósticos.
    pub fn halted(&self) -> bool {
        self.fail_fast && self.errors > 0
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    fn push<E: 'static + Error>(&mut self, kind: Kind, severity: Severity, error: Located<E>) {
        if self.halted() {
            return;
        }

        if severity == Severity::Error {
            self.errors += 1;
        }

        let (location, error) = error.split();
        self.diagnostics.push(Diagnostic {
            kind,
            severity,
            error: Box::new(error),
            location,
        });
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Reporter::new(false)
    }
}

impl Display for Reporter {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.diagnostics.is_empty() {
            return Ok(());
        }

        for diagnostic in &self.diagnostics {
            writeln!(
                fmt,
                "{} {}: {}",
                diagnostic.kind, diagnostic.severity, diagnostic.error
            )?;

            let location = &diagnostic.location;
            writeln!(fmt, " --> {}", location)?;

            let digits = location.end().line().to_string().chars().count();
            writeln!(fmt, "{:digits$} |", "", digits = digits)?;

            let source = location.source();
            for line_number in location.start().line()..=location.end().line() {
                source.with_line(line_number, |line| {
                    writeln!(fmt, "{:>digits$} | {}", line_number, line, digits = digits)
                })?
            }

            // El subrayado solo tiene sentido para rangos de una línea
            if location.start().line() == location.end().line() {
                let from = location.start().column();
                let to = location.end().column().max(from + 1);

                let skip = from.saturating_sub(1) as usize;
                let highlight = (to - from) as usize;

                writeln!(
                    fmt,
                    "{:digits$} | {:skip$}{:^<highlight$}",
                    "",
                    "",
                    "",
                    digits = digits,
                    skip = skip,
                    highlight = highlight
                )?;
            }

            writeln!(fmt)?;
        }

        let warnings = self.diagnostics.len() - self.errors;
        let plural = |count: usize| if count == 1 { "" } else { "s" };

        writeln!(
            fmt,
            "{} error{}, {} warning{} reported",
            self.errors,
            plural(self.errors),
            warnings,
            plural(warnings)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Source;
    use thiserror::Error;

    #[derive(Error, Debug)]
    #[error("something broke")]
    struct Broken;

    fn located() -> Located<Broken> {
        let source = Source::new("prog.tri", "let x in y");
        let mut cursor = source.cursor();
        let start = cursor.position();
        cursor.bump();
        cursor.bump();
        cursor.bump();

        Located::at(Broken, cursor.location_from(start))
    }

    #[test]
    fn counts_errors_but_not_warnings() {
        let mut reporter = Reporter::new(false);
        reporter.report(Kind::Semantic, located());
        reporter.warn(Kind::Semantic, located());
        reporter.report(Kind::Syntactic, located());

        assert_eq!(reporter.errors(), 2);
        assert_eq!(reporter.diagnostics().len(), 3);
        assert!(!reporter.halted());
    }

    #[test]
    fn fail_fast_drops_later_reports() {
        let mut reporter = Reporter::new(true);
        reporter.report(Kind::Lexical, located());
        reporter.report(Kind::Syntactic, located());

        assert!(reporter.halted());
        assert_eq!(reporter.errors(), 1);
        assert_eq!(reporter.diagnostics()[0].kind(), Kind::Lexical);
    }

    #[test]
    fn renders_header_and_excerpt() {
        let mut reporter = Reporter::default();
        reporter.report(Kind::Semantic, located());

        let rendered = reporter.to_string();
        assert!(rendered.starts_with("semantic error: something broke\n --> prog.tri:[1:1-1:3]\n"));
        assert!(rendered.contains("1 | let x in y"));
        assert!(rendered.contains("  | ^^^"));
        assert!(rendered.ends_with("1 error, 0 warnings reported\n"));
    }
}
