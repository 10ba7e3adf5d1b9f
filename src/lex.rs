//! Análisis léxico.
//!
//! # Tokenization
//! Esta es la primera fase del compilador. Descompone el texto de un
//! [`Source`](crate::source::Source) en unidades léxicas denominadas
//! tokens. Los espacios en blanco y los comentarios se descartan durante
//! esta operación. Cada token emitido está asociado a una ubicación en el
//! código fuente original, lo cual permite rastrear errores tanto en los
//! mismos como en constructos más elevados de fases posteriores.
//!
//! # Contenido de un token
//! Todo token incluye su clase ([`Kind`]) y su lexema tal como aparece en
//! el código fuente. Las constantes literales no se resuelven aquí; el
//! lexema de un literal de carácter incluye sus comillas.
//!
//! # Reglas importantes del lenguaje
//! - Los comentarios de línea inician con `!`, los de bloque con `/*`.
//! - Los operadores son secuencias maximales de caracteres de operador.
//! - El lenguaje distingue mayúsculas de minúsculas.
//!
//! # Errores
//! El scanner nunca se detiene ante un error. Cada error se reporta y
//! se emite un token [`Kind::Error`], de forma que el parser pueda
//! continuar y encontrar más errores en una misma ejecución.

use crate::{
    error::{Kind as ErrorKind, Reporter},
    source::{Cursor, Located, Position},
};

use std::{
    fmt::{self, Display},
    str::FromStr,
};

use thiserror::Error;

/// Literal entero máximo, igual a `maxint` en la máquina objetivo.
pub const INT_MAX: i32 = crate::machine::MAXINT;

/// Error de escaneo.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum LexicalError {
    /// Carácter desconocido o inesperado en el flujo de entrada.
    #[error("Bad character {0:?} in input stream")]
    BadChar(char),

    /// Una constante entera se encuentra fuera de rango.
    #[error("Integer literal overflow, valid range is [0, 32767]")]
    IntOverflow,

    /// Literal de carácter sin comilla de cierre.
    #[error("Malformed character literal, expected closing `'`")]
    UnterminatedChar,

    /// Secuencia de escape desconocida.
    #[error("Unknown escape sequence `\\{0}` in character literal")]
    BadEscape(char),

    /// Comentario de bloque sin `*/`.
    #[error("Unterminated block comment")]
    UnterminatedComment,
}

/// Clase léxica de un token.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Kind {
    IntLiteral,
    CharLiteral,
    Identifier,
    Operator,
    Keyword(Keyword),

    /// `.`
    Dot,

    /// `:`
    Colon,

    /// `;`
    Semicolon,

    /// `,`
    Comma,

    /// `:=`
    Becomes,

    /// `~`
    Is,

    /// `(`
    OpenParen,

    /// `)`
    CloseParen,

    /// `[`
    OpenSquare,

    /// `]`
    CloseSquare,

    /// `{`
    OpenCurly,

    /// `}`
    CloseCurly,

    /// Fin del texto. Se repite indefinidamente.
    EndOfText,

    /// Token ficticio emitido tras un error léxico.
    Error,
}

impl Display for Kind {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Kind::*;

        match self {
            IntLiteral => fmt.write_str("integer literal"),
            CharLiteral => fmt.write_str("character literal"),
            Identifier => fmt.write_str("identifier"),
            Operator => fmt.write_str("operator"),
            Keyword(keyword) => write!(fmt, "`{}`", keyword),
            Dot => fmt.write_str("`.`"),
            Colon => fmt.write_str("`:`"),
            Semicolon => fmt.write_str("`;`"),
            Comma => fmt.write_str("`,`"),
            Becomes => fmt.write_str("`:=`"),
            Is => fmt.write_str("`~`"),
            OpenParen => fmt.write_str("`(`"),
            CloseParen => fmt.write_str("`)`"),
            OpenSquare => fmt.write_str("`[`"),
            CloseSquare => fmt.write_str("`]`"),
            OpenCurly => fmt.write_str("`{`"),
            CloseCurly => fmt.write_str("`}`"),
            EndOfText => fmt.write_str("end of text"),
            Error => fmt.write_str("erroneous token"),
        }
    }
}

/// Objeto resultante del análisis léxico.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: Kind,
    pub spelling: String,
}

impl Display for Token {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            Kind::EndOfText => fmt.write_str("end of text"),
            _ => write!(fmt, "`{}`", self.spelling),
        }
    }
}

/// Una palabra clave.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Keyword {
    Array,
    Begin,
    Const,
    Do,
    Else,
    End,
    Func,
    If,
    In,
    Let,
    Loop,
    Of,
    Proc,
    Record,
    Then,
    Type,
    Var,
    While,
}

const KEYWORDS: &[(&str, Keyword)] = &[
    ("array",  Keyword::Array),
    ("begin",  Keyword::Begin),
    ("const",  Keyword::Const),
    ("do",     Keyword::Do),
    ("else",   Keyword::Else),
    ("end",    Keyword::End),
    ("func",   Keyword::Func),
    ("if",     Keyword::If),
    ("in",     Keyword::In),
    ("let",    Keyword::Let),
    ("loop",   Keyword::Loop),
    ("of",     Keyword::Of),
    ("proc",   Keyword::Proc),
    ("record", Keyword::Record),
    ("then",   Keyword::Then),
    ("type",   Keyword::Type),
    ("var",    Keyword::Var),
    ("while",  Keyword::While),
];

impl Display for Keyword {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let string = KEYWORDS
            .iter()
            .find(|&&(_, keyword)| keyword == *self)
            .map(|&(name, _)| name)
            .unwrap_or("?");

        fmt.write_str(string)
    }
}

impl FromStr for Keyword {
    type Err = ();

    fn from_str(string: &str) -> Result<Self, Self::Err> {
        KEYWORDS
            .iter()
            .find(|&&(name, _)| name == string)
            .map(|&(_, keyword)| keyword)
            .ok_or(())
    }
}

/// Determina si un carácter puede formar parte de un operador.
pub fn is_operator_char(c: char) -> bool {
    matches!(
        c,
        '+' | '-' | '*' | '/' | '=' | '<' | '>' | '\\' | '&' | '@' | '%' | '^' | '?'
    )
}

/// Resuelve el valor de un literal de carácter a partir de su lexema.
///
/// El lexema debe incluir ambas comillas, tal como lo emite el scanner.
pub fn char_value(spelling: &str) -> Option<char> {
    let inner = spelling.strip_prefix('\'')?.strip_suffix('\'')?;

    let mut chars = inner.chars();
    let value = match (chars.next()?, chars.next()) {
        (c, None) => c,
        ('\\', Some(escape)) => unescape(escape)?,
        _ => return None,
    };

    match chars.next() {
        None => Some(value),
        Some(_) => None,
    }
}

fn unescape(escape: char) -> Option<char> {
    match escape {
        'n' => Some('\n'),
        't' => Some('\t'),
        '0' => Some('\0'),
        '\\' => Some('\\'),
        '\'' => Some('\''),
        _ => None,
    }
}

/// Máquina de estados para análisis léxico.
///
/// Un scanner puede encontrarse en uno de diversos estados. La
/// salida del scanner, así como su siguiente estado, se define
/// a partir de tanto su estado actual como el siguiente carácter
/// encontrado en el cursor.
pub struct Scanner<'r> {
    cursor: Cursor,
    reporter: &'r mut Reporter,
    state: State,
    finished: bool,
}

/// Posibles estados del scanner.
enum State {
    /// Estado que ocurre antes de encontrar el inicio de un token.
    Start,

    /// Estado de completitud; siempre emite el token incluido
    /// y pasa a [`State::Start`].
    Complete(Kind),

    /// Se encontró `:`, puede seguir `=`.
    Colon,

    /// Comentario de línea.
    ///
    /// Este estado vuelve a [`State::Start`] al encontrar `'\n'`.
    Comment,

    /// Comentario de bloque. El booleano indica si el último
    /// carácter consumido fue `*`.
    Block(bool),

    /// Constante entera.
    Integer,

    /// Término que puede ser un identificador o una palabra clave.
    Word,

    /// Secuencia de caracteres de operador.
    Operator,
}

impl<'r> Scanner<'r> {
    /// Crea un scanner en estado inicial a partir de un cursor.
    pub fn new(cursor: Cursor, reporter: &'r mut Reporter) -> Self {
        Scanner {
            cursor,
            reporter,
            state: State::Start,
            finished: false,
        }
    }

    /// Obtiene el siguiente token.
    ///
    /// Al alcanzar el final del texto se emite [`Kind::EndOfText`]
    /// en esta y todas las invocaciones siguientes.
    pub fn next_token(&mut self) -> Located<Token> {
        use State::*;

        let mut start = self.cursor.position();
        let mut mark = self.cursor.mark();

        // En modo fail-fast un error previo clausura la entrada
        if self.reporter.halted() {
            self.state = Start;
        }

        let kind = loop {
            let next_char = if self.reporter.halted() {
                None
            } else {
                self.cursor.peek()
            };

            // La posición de origen se mueve junto al cursor
            // siempre que no se haya encontrado una frontera de token
            if let Start = self.state {
                start = self.cursor.position();
                mark = self.cursor.mark();
            }

            // Switch table principal, determina cambios de estado
            // y de salida del scanner a partir de combinaciones del
            // estado actual y el siguiente carácter
            match (&mut self.state, next_char) {
                (Start, None) => break Kind::EndOfText,

                // Tokens triviales
                (Start, Some('.')) => self.state = Complete(Kind::Dot),
                (Start, Some(';')) => self.state = Complete(Kind::Semicolon),
                (Start, Some(',')) => self.state = Complete(Kind::Comma),
                (Start, Some('~')) => self.state = Complete(Kind::Is),
                (Start, Some('(')) => self.state = Complete(Kind::OpenParen),
                (Start, Some(')')) => self.state = Complete(Kind::CloseParen),
                (Start, Some('[')) => self.state = Complete(Kind::OpenSquare),
                (Start, Some(']')) => self.state = Complete(Kind::CloseSquare),
                (Start, Some('{')) => self.state = Complete(Kind::OpenCurly),
                (Start, Some('}')) => self.state = Complete(Kind::CloseCurly),
                (Start, Some(':')) => self.state = Colon,
                (Start, Some('!')) => self.state = Comment,

                (Start, Some('\'')) => {
                    self.cursor.bump();
                    break self.char_literal(start);
                }

                // `/*` abre un comentario; cualquier otro `/` es operador
                (Start, Some('/')) => {
                    let before = self.cursor.mark();
                    self.cursor.bump();

                    if self.cursor.peek() == Some('*') {
                        self.state = Block(false);
                    } else {
                        self.cursor.rewind(before);
                        self.state = Operator;
                    }
                }

                (Start, Some(c)) if c.is_ascii_alphabetic() => self.state = Word,
                (Start, Some(c)) if c.is_ascii_digit() => self.state = Integer,
                (Start, Some(c)) if is_operator_char(c) => self.state = Operator,

                // Espacios en blanco y caracteres inesperados
                (Start, Some(c)) if c.is_whitespace() => (),
                (Start, Some(c)) => {
                    self.cursor.bump();

                    let location = self.cursor.location_from(start);
                    self.reporter
                        .report(ErrorKind::Lexical, Located::at(LexicalError::BadChar(c), location));

                    break Kind::Error;
                }

                // Emisión retardada de tokens cualesquiera
                (Complete(kind), _) => break *kind,

                (Colon, Some('=')) => self.state = Complete(Kind::Becomes),
                (Colon, _) => break Kind::Colon,

                // Los comentarios de línea descartan la línea donde ocurren
                (Comment, Some('\n')) | (Comment, None) => self.state = Start,
                (Comment, Some(_)) => (),

                (Block(true), Some('/')) => {
                    self.cursor.bump();
                    self.state = Start;
                    continue;
                }

                (Block(star), Some(c)) => *star = c == '*',
                (Block(_), None) => {
                    let location = self.cursor.location_from(start);
                    self.reporter.report(
                        ErrorKind::Lexical,
                        Located::at(LexicalError::UnterminatedComment, location),
                    );

                    self.state = Start;
                }

                (Integer, Some(c)) if c.is_ascii_digit() => (),
                (Integer, _) => break Kind::IntLiteral,

                (Word, Some(c)) if c.is_ascii_alphanumeric() => (),
                (Word, _) => {
                    break match Keyword::from_str(self.cursor.slice_from(mark)) {
                        Ok(keyword) => Kind::Keyword(keyword),
                        Err(()) => Kind::Identifier,
                    }
                }

                (Operator, Some(c)) if is_operator_char(c) => (),
                (Operator, _) => break Kind::Operator,
            }

            if next_char.is_some() {
                self.cursor.bump();
            }
        };

        self.state = State::Start;

        let spelling = match kind {
            Kind::EndOfText => {
                self.finished = true;
                String::new()
            }

            _ => self.cursor.slice_from(mark).to_owned(),
        };

        if kind == Kind::IntLiteral && spelling.parse::<i32>().map_or(true, |n| n > INT_MAX) {
            let location = self.cursor.location_from(start);
            self.reporter
                .report(ErrorKind::Lexical, Located::at(LexicalError::IntOverflow, location));
        }

        let location = self.cursor.location_from(start);
        Located::at(Token { kind, spelling }, location)
    }

    /// Escanea el resto de un literal de carácter tras la comilla inicial.
    ///
    /// `'\'` es el carácter `\` y no un escape sin cerrar; esto se
    /// decide retrocediendo el cursor si el escape no termina en comilla.
    fn char_literal(&mut self, start: Position) -> Kind {
        let error = match self.cursor.bump() {
            Some('\\') => {
                let after_backslash = self.cursor.mark();
                let escape = self.cursor.bump();

                match (escape, self.cursor.peek()) {
                    (Some(escape), Some('\'')) if unescape(escape).is_some() => {
                        self.cursor.bump();
                        return Kind::CharLiteral;
                    }

                    (Some('\''), _) => {
                        self.cursor.rewind(after_backslash);
                        self.cursor.bump();
                        return Kind::CharLiteral;
                    }

                    (Some(escape), Some('\'')) => {
                        self.cursor.bump();
                        LexicalError::BadEscape(escape)
                    }

                    _ => LexicalError::UnterminatedChar,
                }
            }

            Some('\n') | None => LexicalError::UnterminatedChar,

            Some(_) => match self.cursor.peek() {
                Some('\'') => {
                    self.cursor.bump();
                    return Kind::CharLiteral;
                }

                _ => LexicalError::UnterminatedChar,
            },
        };

        let location = self.cursor.location_from(start);
        self.reporter
            .report(ErrorKind::Lexical, Located::at(error, location));

        Kind::Error
    }

    /// Sumidero de diagnósticos compartido con las fases siguientes.
    pub fn reporter(&mut self) -> &mut Reporter {
        self.reporter
    }
}

impl Iterator for Scanner<'_> {
    type Item = Located<Token>;

    /// Emite los tokens del texto, incluyendo un único [`Kind::EndOfText`] final.
    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            None
        } else {
            Some(self.next_token())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Source;
    use proptest::prelude::*;

    fn kinds(text: &str) -> (Vec<(Kind, String)>, usize) {
        let source = Source::new("test", text);
        let mut reporter = Reporter::default();

        let tokens = Scanner::new(source.cursor(), &mut reporter)
            .map(|token| {
                let token = token.into_inner();
                (token.kind, token.spelling)
            })
            .collect();

        (tokens, reporter.errors())
    }

    fn k(kind: Kind, spelling: &str) -> (Kind, String) {
        (kind, spelling.to_owned())
    }

    #[test]
    fn scans_assignment() {
        let (tokens, errors) = kinds("x := x + 12;");
        assert_eq!(errors, 0);
        assert_eq!(
            tokens,
            vec![
                k(Kind::Identifier, "x"),
                k(Kind::Becomes, ":="),
                k(Kind::Identifier, "x"),
                k(Kind::Operator, "+"),
                k(Kind::IntLiteral, "12"),
                k(Kind::Semicolon, ";"),
                k(Kind::EndOfText, ""),
            ]
        );
    }

    #[test]
    fn keywords_and_operators_use_maximal_munch() {
        let (tokens, _) = kinds("while b /\\ \\c <= 3 do");
        assert_eq!(
            tokens,
            vec![
                k(Kind::Keyword(Keyword::While), "while"),
                k(Kind::Identifier, "b"),
                k(Kind::Operator, "/\\"),
                k(Kind::Operator, "\\"),
                k(Kind::Identifier, "c"),
                k(Kind::Operator, "<="),
                k(Kind::IntLiteral, "3"),
                k(Kind::Keyword(Keyword::Do), "do"),
                k(Kind::EndOfText, ""),
            ]
        );
    }

    #[test]
    fn skips_both_comment_styles() {
        let (tokens, errors) = kinds("a ! comment\n/* block\n * still */ b : c");
        assert_eq!(errors, 0);
        assert_eq!(
            tokens,
            vec![
                k(Kind::Identifier, "a"),
                k(Kind::Identifier, "b"),
                k(Kind::Colon, ":"),
                k(Kind::Identifier, "c"),
                k(Kind::EndOfText, ""),
            ]
        );
    }

    #[test]
    fn character_literals_and_escapes() {
        let (tokens, errors) = kinds(r"'a' '\n' '\'' '\'");
        assert_eq!(errors, 0);

        let values: Vec<_> = tokens
            .iter()
            .filter(|(kind, _)| *kind == Kind::CharLiteral)
            .map(|(_, spelling)| char_value(spelling))
            .collect();

        assert_eq!(values, vec![Some('a'), Some('\n'), Some('\''), Some('\\')]);
    }

    #[test]
    fn bad_character_yields_error_token_and_continues() {
        let (tokens, errors) = kinds("a # b");
        assert_eq!(errors, 1);
        assert_eq!(tokens[1].0, Kind::Error);
        assert_eq!(tokens[2], k(Kind::Identifier, "b"));
    }

    #[test]
    fn integer_overflow_is_reported() {
        let (tokens, errors) = kinds("32767 32768");
        assert_eq!(errors, 1);
        assert_eq!(tokens[1], k(Kind::IntLiteral, "32768"));
    }

    #[test]
    fn unterminated_comment_is_reported() {
        let (tokens, errors) = kinds("x /* never closed");
        assert_eq!(errors, 1);
        assert_eq!(tokens.last().map(|(kind, _)| *kind), Some(Kind::EndOfText));
    }

    #[test]
    fn end_of_text_repeats() {
        let source = Source::new("test", "");
        let mut reporter = Reporter::default();
        let mut scanner = Scanner::new(source.cursor(), &mut reporter);

        for _ in 0..3 {
            assert_eq!(scanner.next_token().val().kind, Kind::EndOfText);
        }
    }

    proptest! {
        #[test]
        fn scanner_always_terminates(text in "\\PC{0,64}") {
            let source = Source::new("test", text.as_str());
            let mut reporter = Reporter::default();

            let tokens: Vec<_> = Scanner::new(source.cursor(), &mut reporter).take(200).collect();
            prop_assert!(tokens.len() <= 66);
            prop_assert_eq!(tokens.last().map(|token| token.val().kind), Some(Kind::EndOfText));
        }
    }
}
