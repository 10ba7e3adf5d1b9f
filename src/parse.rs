//! Análisis sintáctico.
//!
//! Parser descendente recursivo con un único token de lookahead y sin
//! backtracking. Siempre se produce un árbol completo: ante un error se
//! reporta el problema y se sustituye la producción faltante por un nodo
//! vacío (o por un denotador de tipo erróneo), de forma que las fases
//! posteriores puedan recorrer el árbol sin casos especiales.
//!
//! # Recuperación
//! - Un token esperado que no aparece se reporta y se asume insertado;
//!   el token actual no se consume.
//! - Una producción que no puede iniciar en el token actual se reporta
//!   y descarta ese token, salvo que sea un token de sincronización
//!   (`;`, `end`, `in`, `then`, `else`, `do`, cierres o fin de texto).
//! - Los tokens erróneos del scanner se descartan sin reportar de nuevo.

use std::rc::Rc;
use thiserror::Error;

use crate::{
    ast::*,
    error::{Kind as ErrorKind, Reporter},
    lex::{Keyword, Kind, Scanner, Token},
    source::{Located, Location, Source},
};

/// Error de sintaxis.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SyntaxError {
    #[error("Expected {expected}, found {found} instead")]
    UnexpectedToken { expected: Kind, found: Token },

    #[error("Expected a command, found {0} instead")]
    ExpectedCommand(Token),

    #[error("Expected an expression, found {0} instead")]
    ExpectedExpression(Token),

    #[error("Expected a declaration, found {0} instead")]
    ExpectedDeclaration(Token),

    #[error("Expected a formal parameter, found {0} instead")]
    ExpectedParameter(Token),

    #[error("Expected a type denoter, found {0} instead")]
    ExpectedTypeDenoter(Token),

    #[error("Expected `do` or `{{` after loop condition, found {0} instead")]
    ExpectedLoopBody(Token),
}

/// Analiza un programa completo.
///
/// Los errores léxicos y sintácticos se registran en `reporter`; el
/// árbol resultante es válido estructuralmente en cualquier caso.
pub fn parse(source: &Rc<Source>, reporter: &mut Reporter) -> Program {
    Parser::new(source, reporter).program()
}

macro_rules! node {
    ($parser:expr, $start:expr, $family:ident, $kind:expr) => {{
        let kind = $kind;
        $family {
            id: $parser.ids.next(),
            location: $parser.finish($start),
            kind,
        }
    }};
}

struct Parser<'r> {
    scanner: Scanner<'r>,
    current: Located<Token>,
    previous: Location,
    ids: NodeIds,
}

impl<'r> Parser<'r> {
    fn new(source: &Rc<Source>, reporter: &'r mut Reporter) -> Self {
        let mut scanner = Scanner::new(source.cursor(), reporter);
        let current = significant(&mut scanner);
        let previous = current.location().clone();

        Parser {
            scanner,
            current,
            previous,
            ids: NodeIds::default(),
        }
    }

    fn program(mut self) -> Program {
        let start = self.start();
        let command = self.command();

        if !self.at(Kind::EndOfText) {
            self.unexpected(Kind::EndOfText);
        }

        Program {
            id: self.ids.next(),
            location: self.finish(start),
            command,
            ids: self.ids,
        }
    }

    fn command(&mut self) -> Command {
        let start = self.start();
        let first = self.single_command();

        if self.at(Kind::Semicolon) {
            self.next();

            let second = self.command();
            node!(
                self,
                start,
                Command,
                CommandKind::Sequential {
                    first: Box::new(first),
                    second: Box::new(second),
                }
            )
        } else {
            first
        }
    }

    fn single_command(&mut self) -> Command {
        let start = self.start();

        match self.current.val().kind {
            Kind::Identifier => {
                let name = self.terminal();

                if self.at(Kind::OpenParen) {
                    let arguments = self.call_arguments();
                    return node!(self, start, Command, CommandKind::Call { name, arguments });
                }

                let target = self.vname_from(name);
                if self.at(Kind::Comma) {
                    self.next();
                    let second = self.vname();

                    self.expect(Kind::Becomes);
                    let first_value = self.expression();

                    self.expect(Kind::Comma);
                    let second_value = self.expression();

                    node!(
                        self,
                        start,
                        Command,
                        CommandKind::DoubleAssign {
                            first: target,
                            second,
                            first_value,
                            second_value,
                        }
                    )
                } else {
                    self.expect(Kind::Becomes);
                    let value = self.expression();

                    node!(self, start, Command, CommandKind::Assign { target, value })
                }
            }

            Kind::Keyword(Keyword::Begin) => {
                self.next();
                let command = self.command();
                self.keyword(Keyword::End);

                command
            }

            Kind::Keyword(Keyword::Let) => {
                self.next();
                let declaration = Box::new(self.declaration());

                self.keyword(Keyword::In);
                let body = Box::new(self.single_command());

                node!(self, start, Command, CommandKind::Let { declaration, body })
            }

            Kind::Keyword(Keyword::If) => {
                self.next();
                let condition = self.expression();

                self.keyword(Keyword::Then);
                let then = Box::new(self.single_command());

                self.keyword(Keyword::Else);
                let otherwise = Box::new(self.single_command());

                node!(
                    self,
                    start,
                    Command,
                    CommandKind::If {
                        condition,
                        then,
                        otherwise,
                    }
                )
            }

            Kind::Keyword(Keyword::While) => {
                self.next();
                let condition = self.expression();

                match self.current.val().kind {
                    Kind::Keyword(Keyword::Do) => {
                        self.next();
                        let body = Box::new(self.single_command());

                        node!(self, start, Command, CommandKind::While { condition, body })
                    }

                    // `while E { C }` comparte el nodo de `loop ... while`
                    Kind::OpenCurly => {
                        self.next();
                        let prelude = Box::new(self.empty_command());
                        let body = Box::new(self.command());
                        self.expect(Kind::CloseCurly);

                        node!(
                            self,
                            start,
                            Command,
                            CommandKind::LoopWhile {
                                prelude,
                                condition,
                                body,
                            }
                        )
                    }

                    _ => {
                        let found = self.current.val().clone();
                        self.report(SyntaxError::ExpectedLoopBody(found));

                        let body = Box::new(self.empty_command());
                        node!(self, start, Command, CommandKind::While { condition, body })
                    }
                }
            }

            Kind::Keyword(Keyword::Loop) => {
                self.next();
                let prelude = Box::new(self.single_command());

                self.keyword(Keyword::While);
                let condition = self.expression();

                self.keyword(Keyword::Do);
                let body = Box::new(self.single_command());

                node!(
                    self,
                    start,
                    Command,
                    CommandKind::LoopWhile {
                        prelude,
                        condition,
                        body,
                    }
                )
            }

            Kind::Semicolon
            | Kind::CloseCurly
            | Kind::EndOfText
            | Kind::Keyword(Keyword::End)
            | Kind::Keyword(Keyword::Else)
            | Kind::Keyword(Keyword::In) => self.empty_command(),

            _ => {
                let found = self.current.val().clone();
                self.fail(SyntaxError::ExpectedCommand(found));

                self.empty_command()
            }
        }
    }

    fn empty_command(&mut self) -> Command {
        let start = self.start();
        node!(self, start, Command, CommandKind::Empty)
    }

    fn expression(&mut self) -> Expression {
        let start = self.start();

        match self.current.val().kind {
            Kind::Keyword(Keyword::Let) => {
                self.next();
                let declaration = Box::new(self.declaration());

                self.keyword(Keyword::In);
                let body = Box::new(self.expression());

                node!(self, start, Expression, ExpressionKind::Let { declaration, body })
            }

            Kind::Keyword(Keyword::If) => {
                self.next();
                let condition = Box::new(self.expression());

                self.keyword(Keyword::Then);
                let then = Box::new(self.expression());

                self.keyword(Keyword::Else);
                let otherwise = Box::new(self.expression());

                node!(
                    self,
                    start,
                    Expression,
                    ExpressionKind::If {
                        condition,
                        then,
                        otherwise,
                    }
                )
            }

            _ => self.secondary_expression(),
        }
    }

    /// Todos los operadores binarios comparten precedencia y asocian
    /// a la izquierda.
    fn secondary_expression(&mut self) -> Expression {
        let start = self.start();
        let mut expression = self.primary_expression();

        while self.at(Kind::Operator) {
            let operator = self.terminal();
            let right = self.primary_expression();

            expression = node!(
                self,
                start.clone(),
                Expression,
                ExpressionKind::Binary {
                    left: Box::new(expression),
                    operator,
                    right: Box::new(right),
                }
            );
        }

        expression
    }

    fn primary_expression(&mut self) -> Expression {
        let start = self.start();

        match self.current.val().kind {
            Kind::IntLiteral => {
                let literal = self.terminal();
                node!(self, start, Expression, ExpressionKind::Integer(literal))
            }

            Kind::CharLiteral => {
                let literal = self.terminal();
                node!(self, start, Expression, ExpressionKind::Character(literal))
            }

            Kind::Identifier => {
                let name = self.terminal();

                if self.at(Kind::OpenParen) {
                    let arguments = self.call_arguments();
                    node!(self, start, Expression, ExpressionKind::Call { name, arguments })
                } else {
                    let vname = self.vname_from(name);
                    node!(self, start, Expression, ExpressionKind::Vname(vname))
                }
            }

            Kind::Operator => {
                let operator = self.terminal();
                let operand = Box::new(self.primary_expression());

                node!(self, start, Expression, ExpressionKind::Unary { operator, operand })
            }

            Kind::OpenParen => {
                self.next();
                let expression = self.expression();
                self.expect(Kind::CloseParen);

                expression
            }

            Kind::OpenCurly => {
                self.next();
                let aggregate = Box::new(self.record_aggregate());
                self.expect(Kind::CloseCurly);

                node!(self, start, Expression, ExpressionKind::Record(aggregate))
            }

            Kind::OpenSquare => {
                self.next();
                let aggregate = Box::new(self.array_aggregate());
                self.expect(Kind::CloseSquare);

                node!(self, start, Expression, ExpressionKind::Array(aggregate))
            }

            _ => {
                let found = self.current.val().clone();
                self.fail(SyntaxError::ExpectedExpression(found));

                node!(self, start, Expression, ExpressionKind::Empty)
            }
        }
    }

    fn record_aggregate(&mut self) -> RecordAggregate {
        let start = self.start();

        let field = self.identifier();
        self.expect(Kind::Is);
        let value = self.expression();

        let kind = if self.at(Kind::Comma) {
            self.next();
            let rest = Box::new(self.record_aggregate());

            RecordAggregateKind::Multiple { field, value, rest }
        } else {
            RecordAggregateKind::Single { field, value }
        };

        node!(self, start, RecordAggregate, kind)
    }

    fn array_aggregate(&mut self) -> ArrayAggregate {
        let start = self.start();
        let first = self.expression();

        let kind = if self.at(Kind::Comma) {
            self.next();
            let rest = Box::new(self.array_aggregate());

            ArrayAggregateKind::Multiple { first, rest }
        } else {
            ArrayAggregateKind::Single(first)
        };

        node!(self, start, ArrayAggregate, kind)
    }

    fn vname(&mut self) -> Vname {
        let name = self.identifier();
        self.vname_from(name)
    }

    /// Continúa un V-name cuyo identificador raíz ya fue consumido.
    fn vname_from(&mut self, name: Identifier) -> Vname {
        let start = name.location.clone();
        let mut vname = node!(self, start.clone(), Vname, VnameKind::Simple(name));

        loop {
            match self.current.val().kind {
                Kind::Dot => {
                    self.next();
                    let field = self.identifier();

                    vname = node!(
                        self,
                        start.clone(),
                        Vname,
                        VnameKind::Dot {
                            record: Box::new(vname),
                            field,
                        }
                    );
                }

                Kind::OpenSquare => {
                    self.next();
                    let index = Box::new(self.expression());
                    self.expect(Kind::CloseSquare);

                    vname = node!(
                        self,
                        start.clone(),
                        Vname,
                        VnameKind::Subscript {
                            array: Box::new(vname),
                            index,
                        }
                    );
                }

                _ => break vname,
            }
        }
    }

    fn declaration(&mut self) -> Declaration {
        let start = self.start();
        let first = self.single_declaration();

        if self.at(Kind::Semicolon) {
            self.next();

            let second = self.declaration();
            node!(
                self,
                start,
                Declaration,
                DeclarationKind::Sequential {
                    first: Box::new(first),
                    second: Box::new(second),
                }
            )
        } else {
            first
        }
    }

    fn single_declaration(&mut self) -> Declaration {
        let start = self.start();

        let kind = match self.current.val().kind {
            Kind::Keyword(Keyword::Const) => {
                self.next();
                let name = self.identifier();

                self.expect(Kind::Is);
                let value = self.expression();

                DeclarationKind::Const { name, value }
            }

            Kind::Keyword(Keyword::Var) => {
                self.next();
                let name = self.identifier();

                self.expect(Kind::Colon);
                let denoter = self.type_denoter();

                DeclarationKind::Var { name, denoter }
            }

            Kind::Keyword(Keyword::Proc) => {
                self.next();
                let name = self.identifier();
                let parameters = self.formal_parameters();

                self.expect(Kind::Is);
                let body = self.single_command();

                DeclarationKind::Proc {
                    name,
                    parameters,
                    body,
                }
            }

            Kind::Keyword(Keyword::Func) => {
                self.next();
                let name = self.identifier();
                let parameters = self.formal_parameters();

                self.expect(Kind::Colon);
                let result = self.type_denoter();

                self.expect(Kind::Is);
                let body = self.expression();

                DeclarationKind::Func {
                    name,
                    parameters,
                    result,
                    body,
                }
            }

            Kind::Keyword(Keyword::Type) => {
                self.next();
                let name = self.identifier();

                self.expect(Kind::Is);
                let denoter = self.type_denoter();

                DeclarationKind::Type { name, denoter }
            }

            _ => {
                let found = self.current.val().clone();
                self.fail(SyntaxError::ExpectedDeclaration(found));

                let name = self.missing();
                let denoter = self.error_type_denoter();

                DeclarationKind::Type { name, denoter }
            }
        };

        node!(self, start, Declaration, kind)
    }

    /// `( FPS )`, incluyendo los paréntesis.
    fn formal_parameters(&mut self) -> Box<FormalParameterSequence> {
        self.expect(Kind::OpenParen);

        let start = self.start();
        let sequence = if self.at(Kind::CloseParen) {
            node!(self, start, FormalParameterSequence, FormalParameterSequenceKind::Empty)
        } else {
            self.proper_formal_parameters()
        };

        self.expect(Kind::CloseParen);
        Box::new(sequence)
    }

    fn proper_formal_parameters(&mut self) -> FormalParameterSequence {
        let start = self.start();
        let first = self.formal_parameter();

        let kind = if self.at(Kind::Comma) {
            self.next();
            let rest = Box::new(self.proper_formal_parameters());

            FormalParameterSequenceKind::Multiple { first, rest }
        } else {
            FormalParameterSequenceKind::Single(first)
        };

        node!(self, start, FormalParameterSequence, kind)
    }

    fn formal_parameter(&mut self) -> FormalParameter {
        let start = self.start();

        let kind = match self.current.val().kind {
            Kind::Identifier => {
                let name = self.terminal();

                self.expect(Kind::Colon);
                let denoter = self.type_denoter();

                FormalParameterKind::Const { name, denoter }
            }

            Kind::Keyword(Keyword::Var) => {
                self.next();
                let name = self.identifier();

                self.expect(Kind::Colon);
                let denoter = self.type_denoter();

                FormalParameterKind::Var { name, denoter }
            }

            Kind::Keyword(Keyword::Proc) => {
                self.next();
                let name = self.identifier();
                let parameters = self.formal_parameters();

                FormalParameterKind::Proc { name, parameters }
            }

            Kind::Keyword(Keyword::Func) => {
                self.next();
                let name = self.identifier();
                let parameters = self.formal_parameters();

                self.expect(Kind::Colon);
                let result = self.type_denoter();

                FormalParameterKind::Func {
                    name,
                    parameters,
                    result,
                }
            }

            _ => {
                let found = self.current.val().clone();
                self.fail(SyntaxError::ExpectedParameter(found));

                let name = self.missing();
                let denoter = self.error_type_denoter();

                FormalParameterKind::Const { name, denoter }
            }
        };

        node!(self, start, FormalParameter, kind)
    }

    /// `( APS )`, incluyendo los paréntesis.
    fn call_arguments(&mut self) -> Box<ActualParameterSequence> {
        self.expect(Kind::OpenParen);

        let start = self.start();
        let sequence = if self.at(Kind::CloseParen) {
            node!(self, start, ActualParameterSequence, ActualParameterSequenceKind::Empty)
        } else {
            self.proper_actual_parameters()
        };

        self.expect(Kind::CloseParen);
        Box::new(sequence)
    }

    fn proper_actual_parameters(&mut self) -> ActualParameterSequence {
        let start = self.start();
        let first = self.actual_parameter();

        let kind = if self.at(Kind::Comma) {
            self.next();
            let rest = Box::new(self.proper_actual_parameters());

            ActualParameterSequenceKind::Multiple { first, rest }
        } else {
            ActualParameterSequenceKind::Single(first)
        };

        node!(self, start, ActualParameterSequence, kind)
    }

    fn actual_parameter(&mut self) -> ActualParameter {
        let start = self.start();

        let kind = match self.current.val().kind {
            Kind::Keyword(Keyword::Var) => {
                self.next();
                ActualParameterKind::Var(self.vname())
            }

            Kind::Keyword(Keyword::Proc) => {
                self.next();
                ActualParameterKind::Proc(self.identifier())
            }

            Kind::Keyword(Keyword::Func) => {
                self.next();
                ActualParameterKind::Func(self.identifier())
            }

            _ => ActualParameterKind::Const(self.expression()),
        };

        node!(self, start, ActualParameter, kind)
    }

    fn type_denoter(&mut self) -> TypeDenoter {
        let start = self.start();

        match self.current.val().kind {
            Kind::Identifier => {
                let name = self.terminal();
                node!(self, start, TypeDenoter, TypeDenoterKind::Simple(name))
            }

            Kind::Keyword(Keyword::Array) => {
                self.next();

                let size = if self.at(Kind::IntLiteral) {
                    self.terminal()
                } else {
                    self.unexpected(Kind::IntLiteral);
                    self.missing()
                };

                self.keyword(Keyword::Of);
                let element = Box::new(self.type_denoter());

                node!(self, start, TypeDenoter, TypeDenoterKind::Array { size, element })
            }

            Kind::Keyword(Keyword::Record) => {
                self.next();
                let fields = Box::new(self.field_type_denoter());
                self.keyword(Keyword::End);

                node!(self, start, TypeDenoter, TypeDenoterKind::Record(fields))
            }

            _ => {
                let found = self.current.val().clone();
                self.fail(SyntaxError::ExpectedTypeDenoter(found));

                self.error_type_denoter()
            }
        }
    }

    fn error_type_denoter(&mut self) -> TypeDenoter {
        let start = self.start();
        node!(self, start, TypeDenoter, TypeDenoterKind::Error)
    }

    fn field_type_denoter(&mut self) -> FieldTypeDenoter {
        let start = self.start();

        let name = self.identifier();
        self.expect(Kind::Colon);
        let denoter = self.type_denoter();

        let kind = if self.at(Kind::Comma) {
            self.next();
            let rest = Box::new(self.field_type_denoter());

            FieldTypeDenoterKind::Multiple {
                name,
                denoter,
                rest,
            }
        } else {
            FieldTypeDenoterKind::Single { name, denoter }
        };

        node!(self, start, FieldTypeDenoter, kind)
    }

    fn identifier(&mut self) -> Identifier {
        if self.at(Kind::Identifier) {
            self.terminal()
        } else {
            self.unexpected(Kind::Identifier);
            self.missing()
        }
    }

    /// Consume el token actual como nodo terminal.
    fn terminal(&mut self) -> Terminal {
        let (location, token) = self.next().split();

        Terminal {
            id: self.ids.next(),
            location,
            spelling: token.spelling,
        }
    }

    /// Terminal ficticio para un identificador ausente.
    fn missing(&mut self) -> Terminal {
        Terminal {
            id: self.ids.next(),
            location: self.current.location().clone(),
            spelling: String::new(),
        }
    }

    fn keyword(&mut self, keyword: Keyword) -> bool {
        self.expect(Kind::Keyword(keyword))
    }

    fn expect(&mut self, kind: Kind) -> bool {
        if self.at(kind) {
            self.next();
            true
        } else {
            self.unexpected(kind);
            false
        }
    }

    fn at(&self, kind: Kind) -> bool {
        self.current.val().kind == kind
    }

    fn next(&mut self) -> Located<Token> {
        let following = significant(&mut self.scanner);
        let token = std::mem::replace(&mut self.current, following);

        self.previous = token.location().clone();
        token
    }

    fn start(&self) -> Location {
        self.current.location().clone()
    }

    /// Ubicación desde `start` hasta el último token consumido.
    fn finish(&self, start: Location) -> Location {
        if self.previous.end() > start.start() {
            Location::span(start, &self.previous)
        } else {
            start
        }
    }

    fn unexpected(&mut self, expected: Kind) {
        let found = self.current.val().clone();
        self.report(SyntaxError::UnexpectedToken { expected, found });
    }

    /// Reporta una producción imposible y descarta el token actual
    /// si no es de sincronización.
    fn fail(&mut self, error: SyntaxError) {
        self.report(error);

        let synchronizing = matches!(
            self.current.val().kind,
            Kind::Semicolon
                | Kind::CloseParen
                | Kind::CloseSquare
                | Kind::CloseCurly
                | Kind::EndOfText
                | Kind::Keyword(Keyword::End)
                | Kind::Keyword(Keyword::In)
                | Kind::Keyword(Keyword::Then)
                | Kind::Keyword(Keyword::Else)
                | Kind::Keyword(Keyword::Do)
        );

        if !synchronizing {
            self.next();
        }
    }

    fn report(&mut self, error: SyntaxError) {
        let location = self.current.location().clone();
        self.scanner
            .reporter()
            .report(ErrorKind::Syntactic, Located::at(error, location));
    }
}

/// Siguiente token que no sea producto de un error léxico.
fn significant(scanner: &mut Scanner<'_>) -> Located<Token> {
    loop {
        let token = scanner.next_token();
        if token.val().kind != Kind::Error {
            break token;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_text(text: &str) -> (Program, Reporter) {
        let source = Source::new("test.tri", text);
        let mut reporter = Reporter::default();
        let program = parse(&source, &mut reporter);

        (program, reporter)
    }

    fn clean(text: &str) -> Program {
        let (program, reporter) = parse_text(text);
        assert_eq!(reporter.errors(), 0, "{}", reporter);

        program
    }

    #[test]
    fn sequences_nest_to_the_right() {
        let program = clean("a := 1; b := 2; c := 3");

        match &program.command.kind {
            CommandKind::Sequential { first, second } => {
                assert!(matches!(first.kind, CommandKind::Assign { .. }));
                assert!(matches!(
                    second.kind,
                    CommandKind::Sequential { .. }
                ));
            }

            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn binary_operators_associate_left() {
        let program = clean("x := 1 + 2 * 3");

        let value = match &program.command.kind {
            CommandKind::Assign { value, .. } => value,
            other => panic!("unexpected command {:?}", other),
        };

        match &value.kind {
            ExpressionKind::Binary {
                left,
                operator,
                right,
            } => {
                assert_eq!(operator.spelling, "*");
                assert!(matches!(right.kind, ExpressionKind::Integer(_)));
                assert!(matches!(left.kind, ExpressionKind::Binary { .. }));
            }

            other => panic!("unexpected expression {:?}", other),
        }
    }

    #[test]
    fn unary_binds_tighter_than_binary() {
        let program = clean("x := \\a /\\ b");

        match &program.command.kind {
            CommandKind::Assign { value, .. } => match &value.kind {
                ExpressionKind::Binary { left, .. } => {
                    assert!(matches!(left.kind, ExpressionKind::Unary { .. }))
                }

                other => panic!("unexpected expression {:?}", other),
            },

            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn brace_while_becomes_loop_while() {
        let program = clean("while x < 3 { x := x + 1; putint(x) }");

        match &program.command.kind {
            CommandKind::LoopWhile { prelude, body, .. } => {
                assert!(matches!(prelude.kind, CommandKind::Empty));
                assert!(matches!(body.kind, CommandKind::Sequential { .. }));
            }

            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn loop_while_and_double_assign() {
        let program = clean("loop get(c) while c \\= 'x' do put(c); a, b := b, a");

        match &program.command.kind {
            CommandKind::Sequential { first, second } => {
                assert!(matches!(first.kind, CommandKind::LoopWhile { .. }));
                assert!(matches!(second.kind, CommandKind::DoubleAssign { .. }));
            }

            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn declarations_and_parameters() {
        clean(
            "let
                type Point ~ record x: Integer, y: Integer end;
                var p: Point;
                var v: array 4 of Char;
                const origin ~ {x ~ 0, y ~ 0};
                proc shift(var q: Point, dx: Integer) ~ q.x := q.x + dx;
                func twice(func f(n: Integer): Integer, n: Integer): Integer ~ f(f(n))
             in begin
                p := origin;
                shift(var p, 2);
                v[0] := 'a';
                v := ['a', 'b', 'c', 'd']
             end",
        );
    }

    #[test]
    fn locations_span_the_construct() {
        let program = clean("x := y");
        assert_eq!(program.command.location.to_string(), "test.tri:[1:1-1:6]");
    }

    #[test]
    fn errors_still_produce_a_tree() {
        let (program, reporter) = parse_text("begin x := ; if then y end");

        assert!(reporter.errors() >= 2);
        assert!(matches!(program.command.kind, CommandKind::Sequential { .. }));
    }

    #[test]
    fn missing_token_is_inserted() {
        let (_, reporter) = parse_text("let var x: Integer in x := 1 2");
        assert_eq!(reporter.errors(), 1);

        let message = reporter.diagnostics()[0].message();
        assert_eq!(message, "Expected end of text, found `2` instead");
    }

    #[test]
    fn lexical_errors_are_not_reported_twice() {
        let (_, reporter) = parse_text("x := 1 # 2");
        assert_eq!(reporter.errors(), 2);
        assert_eq!(reporter.diagnostics()[0].kind(), ErrorKind::Lexical);
    }

    #[test]
    fn fail_fast_collapses_parsing() {
        let source = Source::new("test.tri", "x := ; y := ; z := ;");
        let mut reporter = Reporter::new(true);
        parse(&source, &mut reporter);

        assert_eq!(reporter.errors(), 1);
    }
}
