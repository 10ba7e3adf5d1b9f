//! Análisis contextual.
//!
//! Resuelve cada uso de un nombre a su declaración y verifica las
//! reglas de tipos del lenguaje. El resultado son [`Annotations`]: tablas
//! laterales indexadas por [`NodeId`] que las fases posteriores consultan
//! sin modificar el árbol.
//!
//! Cada violación produce exactamente un diagnóstico. Tras un error, la
//! construcción afectada adopta [`Type::Error`], el cual es equivalente a
//! cualquier otro tipo y por tanto no provoca errores en cascada.

mod scope;
mod std_env;
mod types;

pub use scope::SymbolTable;
pub use std_env::StdDecl;
pub use types::{Field, Formal, Type};

use std::collections::{HashMap, HashSet};
use thiserror::Error;

use crate::{
    ast::{visit::*, *},
    error::{Kind, Reporter},
    source::{Located, Location},
};

use self::{scope::Binding, types::signatures_match};

#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SemanticError {
    #[error("`{0}` is not declared")]
    Undeclared(String),

    #[error("Identifier `{0}` is already declared in this scope")]
    Redeclared(String),

    #[error("Type mismatch: expected `{expected}`, found `{found}`")]
    TypeMismatch { expected: Type, found: Type },

    #[error("`{name}` is not a {expected}")]
    WrongKind { name: String, expected: &'static str },

    #[error("Incompatible argument types for `{operator}`: `{left}` and `{right}`")]
    IncompatibleOperands {
        operator: String,
        left: Type,
        right: Type,
    },

    #[error("Incompatible limbs in if-expression: `{0}` and `{1}`")]
    IncompatibleLimbs(Type, Type),

    #[error("Left-hand side of assignment is not a variable")]
    NotAVariable,

    #[error("Actual parameter for a var parameter is not a variable")]
    NotAVariableArgument,

    #[error("Too few actual parameters")]
    TooFewArguments,

    #[error("Too many actual parameters")]
    TooManyArguments,

    #[error("{found} actual parameter given where a {expected} parameter is expected")]
    ArgumentMode {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Wrong signature for routine `{0}`")]
    WrongSignature(String),

    #[error("Record expected here, found `{0}`")]
    NotARecord(Type),

    #[error("No field `{field}` in `{of}`")]
    NoSuchField { field: String, of: Type },

    #[error("Array expected here, found `{0}`")]
    NotAnArray(Type),

    #[error("Duplicate field `{0}` in record")]
    DuplicateField(String),

    #[error("Arrays must not be empty")]
    EmptyArray,
}

/// Origen de una asociación.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Decl {
    /// Nodo de declaración o de parámetro formal en el árbol.
    User(NodeId),

    /// Declaración del entorno estándar.
    Std(StdDecl),
}

/// Significado de un nombre.
#[derive(Clone, Debug)]
pub enum Meaning {
    Const(Type),
    Var(Type),
    Proc(Vec<Formal>),
    Func(Vec<Formal>, Type),
    Type(Type),
    Unary { operand: Type, result: Type },
    Binary { left: Type, right: Type, result: Type },
}

/// Resultados del análisis contextual.
#[derive(Debug, Default)]
pub struct Annotations {
    types: HashMap<NodeId, Type>,
    bindings: HashMap<NodeId, Decl>,
    variables: HashSet<NodeId>,
}

impl Annotations {
    /// Tipo de una expresión, V-name, denotador, declaración o parámetro.
    pub fn type_of(&self, id: NodeId) -> Option<&Type> {
        self.types.get(&id)
    }

    /// Declaración a la que refiere un identificador u operador.
    pub fn binding(&self, id: NodeId) -> Option<Decl> {
        self.bindings.get(&id).copied()
    }

    /// Determina si un V-name denota una variable.
    pub fn is_variable(&self, id: NodeId) -> bool {
        self.variables.contains(&id)
    }

    /// Tamaño en palabras del tipo asociado a un nodo.
    pub fn size_of(&self, id: NodeId) -> i32 {
        self.type_of(id).map_or(0, Type::size)
    }

    pub fn set_type(&mut self, id: NodeId, of: Type) {
        self.types.insert(id, of);
    }

    pub fn bind(&mut self, id: NodeId, decl: Decl) {
        self.bindings.insert(id, decl);
    }
}

/// Analiza un programa sobre el entorno estándar.
pub fn check(program: &Program, reporter: &mut Reporter) -> Annotations {
    let mut table = SymbolTable::new();
    std_env::populate(&mut table);

    let mut checker = Checker {
        table,
        annotations: Annotations::default(),
        reporter,
    };

    program.accept(&mut checker, ());
    checker.annotations
}

struct Checker<'r> {
    table: SymbolTable,
    annotations: Annotations,
    reporter: &'r mut Reporter,
}

impl Checker<'_> {
    fn report(&mut self, error: SemanticError, location: &Location) {
        self.reporter
            .report(Kind::Semantic, Located::at(error, location.clone()));
    }

    /// Exige que `found` sea equivalente a `expected`.
    fn expect(&mut self, expected: &Type, found: &Type, location: &Location) {
        if !found.equivalent(expected) {
            let error = SemanticError::TypeMismatch {
                expected: expected.clone(),
                found: found.clone(),
            };

            self.report(error, location);
        }
    }

    fn declare(&mut self, name: &Terminal, decl: Decl, meaning: Meaning) {
        let binding = Binding { decl, meaning };
        if self.table.enter(&name.spelling, binding).is_err() {
            self.report(SemanticError::Redeclared(name.spelling.clone()), &name.location);
        }
    }

    /// Resuelve un identificador u operador y registra la asociación.
    fn resolve(&mut self, name: &Terminal) -> Option<Meaning> {
        match self.table.retrieve(&name.spelling) {
            Some(binding) => {
                let (decl, meaning) = (binding.decl, binding.meaning.clone());
                self.annotations.bind(name.id, decl);

                Some(meaning)
            }

            None => {
                self.report(SemanticError::Undeclared(name.spelling.clone()), &name.location);
                None
            }
        }
    }

    fn wrong_kind(&mut self, name: &Terminal, expected: &'static str) {
        let error = SemanticError::WrongKind {
            name: name.spelling.clone(),
            expected,
        };

        self.report(error, &name.location);
    }

    /// Firma de un procedimiento, para uso en llamadas o parámetros `proc`.
    fn procedure(&mut self, name: &Identifier) -> Option<Vec<Formal>> {
        match self.resolve(name)? {
            Meaning::Proc(formals) => Some(formals),
            _ => {
                self.wrong_kind(name, "procedure identifier");
                None
            }
        }
    }

    fn function(&mut self, name: &Identifier) -> Option<(Vec<Formal>, Type)> {
        match self.resolve(name)? {
            Meaning::Func(formals, result) => Some((formals, result)),
            _ => {
                self.wrong_kind(name, "function identifier");
                None
            }
        }
    }

    /// Ámbito de una rutina: los parámetros se declaran en un ámbito
    /// propio, la rutina se declara afuera para permitir recursión y el
    /// cuerpo se analiza con ambos visibles.
    fn routine<F>(
        &mut self,
        name: &Identifier,
        decl: Decl,
        parameters: &FormalParameterSequence,
        meaning: impl FnOnce(Vec<Formal>) -> Meaning,
        body: F,
    ) where
        F: FnOnce(&mut Self),
    {
        self.table.open_scope();
        let formals = parameters.accept(self, ());
        let scope = self.table.close_scope();

        self.declare(name, decl, meaning(formals));

        self.table.restore_scope(scope);
        body(self);
        self.table.close_scope();
    }

    fn condition(&mut self, condition: &Expression) {
        let found = condition.accept(self, ());
        self.expect(&Type::Bool, &found, &condition.location);
    }

    fn assignment(&mut self, target: &Vname, value: &Expression) {
        let (target_type, variable) = target.accept(self, ());
        if !variable && !target_type.is_error() {
            self.report(SemanticError::NotAVariable, &target.location);
        }

        let value_type = value.accept(self, ());
        self.expect(&target_type, &value_type, &value.location);
    }
}

impl ProgramVisitor<(), ()> for Checker<'_> {
    fn visit_program(&mut self, _program: &Program, command: &Command, _: ()) {
        command.accept(self, ());
    }
}

impl CommandVisitor<(), ()> for Checker<'_> {
    fn visit_assign_command(&mut self, _: &Command, target: &Vname, value: &Expression, _: ()) {
        self.assignment(target, value);
    }

    fn visit_double_assign_command(
        &mut self,
        _: &Command,
        (first, second): (&Vname, &Vname),
        (first_value, second_value): (&Expression, &Expression),
        _: (),
    ) {
        self.assignment(first, first_value);
        self.assignment(second, second_value);
    }

    fn visit_call_command(
        &mut self,
        _: &Command,
        name: &Identifier,
        arguments: &ActualParameterSequence,
        _: (),
    ) {
        if let Some(formals) = self.procedure(name) {
            arguments.accept(self, &formals[..]);
        }
    }

    fn visit_empty_command(&mut self, _: &Command, _: ()) {}

    fn visit_if_command(
        &mut self,
        _: &Command,
        condition: &Expression,
        then: &Command,
        otherwise: &Command,
        _: (),
    ) {
        self.condition(condition);
        then.accept(self, ());
        otherwise.accept(self, ());
    }

    fn visit_let_command(
        &mut self,
        _: &Command,
        declaration: &Declaration,
        body: &Command,
        _: (),
    ) {
        self.table.open_scope();
        declaration.accept(self, ());
        body.accept(self, ());
        self.table.close_scope();
    }

    fn visit_sequential_command(
        &mut self,
        _: &Command,
        first: &Command,
        second: &Command,
        _: (),
    ) {
        first.accept(self, ());
        second.accept(self, ());
    }

    fn visit_while_command(
        &mut self,
        _: &Command,
        condition: &Expression,
        body: &Command,
        _: (),
    ) {
        self.condition(condition);
        body.accept(self, ());
    }

    fn visit_loop_while_command(
        &mut self,
        _: &Command,
        prelude: &Command,
        condition: &Expression,
        body: &Command,
        _: (),
    ) {
        prelude.accept(self, ());
        self.condition(condition);
        body.accept(self, ());
    }
}

impl Checker<'_> {
    fn expression(&mut self, expression: &Expression) -> Type {
        let found = expression.accept(self, ());
        self.annotations.set_type(expression.id, found.clone());

        found
    }
}

impl ExpressionVisitor<(), Type> for Checker<'_> {
    fn visit_array_expression(
        &mut self,
        expression: &Expression,
        aggregate: &ArrayAggregate,
        _: (),
    ) -> Type {
        let (element, length) = aggregate.accept(self, ());
        let found = Type::Array {
            length,
            element: Box::new(element),
        };

        self.annotations.set_type(expression.id, found.clone());
        found
    }

    fn visit_binary_expression(
        &mut self,
        expression: &Expression,
        left: &Expression,
        operator: &Operator,
        right: &Expression,
        _: (),
    ) -> Type {
        let left_type = self.expression(left);
        let right_type = self.expression(right);

        let found = match self.resolve(operator) {
            Some(Meaning::Binary {
                left: expected_left,
                right: expected_right,
                result,
            }) => {
                if expected_left == Type::Any {
                    if !left_type.equivalent(&right_type) {
                        let error = SemanticError::IncompatibleOperands {
                            operator: operator.spelling.clone(),
                            left: left_type,
                            right: right_type,
                        };

                        self.report(error, &expression.location);
                    }
                } else {
                    self.expect(&expected_left, &left_type, &left.location);
                    self.expect(&expected_right, &right_type, &right.location);
                }

                result
            }

            Some(_) => {
                self.wrong_kind(operator, "binary operator");
                Type::Error
            }

            None => Type::Error,
        };

        self.annotations.set_type(expression.id, found.clone());
        found
    }

    fn visit_call_expression(
        &mut self,
        expression: &Expression,
        name: &Identifier,
        arguments: &ActualParameterSequence,
        _: (),
    ) -> Type {
        let found = match self.function(name) {
            Some((formals, result)) => {
                arguments.accept(self, &formals[..]);
                result
            }

            None => Type::Error,
        };

        self.annotations.set_type(expression.id, found.clone());
        found
    }

    fn visit_character_expression(
        &mut self,
        expression: &Expression,
        _: &CharacterLiteral,
        _: (),
    ) -> Type {
        self.annotations.set_type(expression.id, Type::Char);
        Type::Char
    }

    fn visit_empty_expression(&mut self, expression: &Expression, _: ()) -> Type {
        self.annotations.set_type(expression.id, Type::Error);
        Type::Error
    }

    fn visit_if_expression(
        &mut self,
        expression: &Expression,
        condition: &Expression,
        then: &Expression,
        otherwise: &Expression,
        _: (),
    ) -> Type {
        self.condition(condition);

        let then_type = self.expression(then);
        let otherwise_type = self.expression(otherwise);

        if !then_type.equivalent(&otherwise_type) {
            let error = SemanticError::IncompatibleLimbs(then_type.clone(), otherwise_type);
            self.report(error, &expression.location);
        }

        self.annotations.set_type(expression.id, then_type.clone());
        then_type
    }

    fn visit_integer_expression(
        &mut self,
        expression: &Expression,
        _: &IntegerLiteral,
        _: (),
    ) -> Type {
        self.annotations.set_type(expression.id, Type::Int);
        Type::Int
    }

    fn visit_let_expression(
        &mut self,
        expression: &Expression,
        declaration: &Declaration,
        body: &Expression,
        _: (),
    ) -> Type {
        self.table.open_scope();
        declaration.accept(self, ());
        let found = self.expression(body);
        self.table.close_scope();

        self.annotations.set_type(expression.id, found.clone());
        found
    }

    fn visit_record_expression(
        &mut self,
        expression: &Expression,
        aggregate: &RecordAggregate,
        _: (),
    ) -> Type {
        let found = Type::Record(aggregate.accept(self, ()));

        self.annotations.set_type(expression.id, found.clone());
        found
    }

    fn visit_unary_expression(
        &mut self,
        expression: &Expression,
        operator: &Operator,
        operand: &Expression,
        _: (),
    ) -> Type {
        let operand_type = self.expression(operand);

        let found = match self.resolve(operator) {
            Some(Meaning::Unary {
                operand: expected,
                result,
            }) => {
                self.expect(&expected, &operand_type, &operand.location);
                result
            }

            Some(_) => {
                self.wrong_kind(operator, "unary operator");
                Type::Error
            }

            None => Type::Error,
        };

        self.annotations.set_type(expression.id, found.clone());
        found
    }

    fn visit_vname_expression(&mut self, expression: &Expression, vname: &Vname, _: ()) -> Type {
        let (found, _) = vname.accept(self, ());

        self.annotations.set_type(expression.id, found.clone());
        found
    }
}

impl DeclarationVisitor<(), ()> for Checker<'_> {
    fn visit_binary_operator_declaration(
        &mut self,
        declaration: &Declaration,
        operator: &Operator,
        (left, right): (&TypeDenoter, &TypeDenoter),
        result: &TypeDenoter,
        _: (),
    ) {
        let meaning = Meaning::Binary {
            left: left.accept(self, ()),
            right: right.accept(self, ()),
            result: result.accept(self, ()),
        };

        self.declare(operator, Decl::User(declaration.id), meaning);
    }

    fn visit_const_declaration(
        &mut self,
        declaration: &Declaration,
        name: &Identifier,
        value: &Expression,
        _: (),
    ) {
        let of = self.expression(value);
        self.annotations.set_type(declaration.id, of.clone());

        self.declare(name, Decl::User(declaration.id), Meaning::Const(of));
    }

    fn visit_func_declaration(
        &mut self,
        declaration: &Declaration,
        name: &Identifier,
        parameters: &FormalParameterSequence,
        result: &TypeDenoter,
        body: &Expression,
        _: (),
    ) {
        let result_type = result.accept(self, ());
        self.annotations.set_type(declaration.id, result_type.clone());

        let signature_result = result_type.clone();
        self.routine(
            name,
            Decl::User(declaration.id),
            parameters,
            |formals| Meaning::Func(formals, signature_result),
            |checker| {
                let body_type = checker.expression(body);
                checker.expect(&result_type, &body_type, &body.location);
            },
        );
    }

    fn visit_proc_declaration(
        &mut self,
        declaration: &Declaration,
        name: &Identifier,
        parameters: &FormalParameterSequence,
        body: &Command,
        _: (),
    ) {
        self.routine(
            name,
            Decl::User(declaration.id),
            parameters,
            Meaning::Proc,
            |checker| body.accept(checker, ()),
        );
    }

    fn visit_sequential_declaration(
        &mut self,
        _: &Declaration,
        first: &Declaration,
        second: &Declaration,
        _: (),
    ) {
        first.accept(self, ());
        second.accept(self, ());
    }

    fn visit_type_declaration(
        &mut self,
        declaration: &Declaration,
        name: &Identifier,
        denoter: &TypeDenoter,
        _: (),
    ) {
        let of = denoter.accept(self, ());
        self.annotations.set_type(declaration.id, of.clone());

        self.declare(name, Decl::User(declaration.id), Meaning::Type(of));
    }

    fn visit_unary_operator_declaration(
        &mut self,
        declaration: &Declaration,
        operator: &Operator,
        operand: &TypeDenoter,
        result: &TypeDenoter,
        _: (),
    ) {
        let meaning = Meaning::Unary {
            operand: operand.accept(self, ()),
            result: result.accept(self, ()),
        };

        self.declare(operator, Decl::User(declaration.id), meaning);
    }

    fn visit_var_declaration(
        &mut self,
        declaration: &Declaration,
        name: &Identifier,
        denoter: &TypeDenoter,
        _: (),
    ) {
        let of = denoter.accept(self, ());
        self.annotations.set_type(declaration.id, of.clone());

        self.declare(name, Decl::User(declaration.id), Meaning::Var(of));
    }
}

impl Checker<'_> {
    fn vname(&mut self, vname: &Vname, of: Type, variable: bool) -> (Type, bool) {
        self.annotations.set_type(vname.id, of.clone());
        if variable {
            self.annotations.variables.insert(vname.id);
        }

        (of, variable)
    }
}

impl VnameVisitor<(), (Type, bool)> for Checker<'_> {
    fn visit_dot_vname(
        &mut self,
        vname: &Vname,
        record: &Vname,
        field: &Identifier,
        _: (),
    ) -> (Type, bool) {
        let (record_type, variable) = record.accept(self, ());

        let of = match &record_type {
            Type::Error => Type::Error,
            Type::Record(_) => match record_type.field(&field.spelling) {
                Some((_, of)) => of.clone(),
                None => {
                    let error = SemanticError::NoSuchField {
                        field: field.spelling.clone(),
                        of: record_type.clone(),
                    };

                    self.report(error, &field.location);
                    Type::Error
                }
            },

            _ => {
                self.report(SemanticError::NotARecord(record_type.clone()), &record.location);
                Type::Error
            }
        };

        self.vname(vname, of, variable)
    }

    fn visit_simple_vname(&mut self, vname: &Vname, name: &Identifier, _: ()) -> (Type, bool) {
        let (of, variable) = match self.resolve(name) {
            Some(Meaning::Const(of)) => (of, false),
            Some(Meaning::Var(of)) => (of, true),
            Some(_) => {
                self.wrong_kind(name, "const or var identifier");
                (Type::Error, false)
            }

            None => (Type::Error, false),
        };

        self.vname(vname, of, variable)
    }

    fn visit_subscript_vname(
        &mut self,
        vname: &Vname,
        array: &Vname,
        index: &Expression,
        _: (),
    ) -> (Type, bool) {
        let (array_type, variable) = array.accept(self, ());

        let index_type = self.expression(index);
        self.expect(&Type::Int, &index_type, &index.location);

        let of = match array_type {
            Type::Error => Type::Error,
            Type::Array { element, .. } => *element,
            other => {
                self.report(SemanticError::NotAnArray(other), &array.location);
                Type::Error
            }
        };

        self.vname(vname, of, variable)
    }
}

impl FormalParameterVisitor<(), Formal> for Checker<'_> {
    fn visit_const_formal_parameter(
        &mut self,
        parameter: &FormalParameter,
        name: &Identifier,
        denoter: &TypeDenoter,
        _: (),
    ) -> Formal {
        let of = denoter.accept(self, ());
        self.annotations.set_type(parameter.id, of.clone());

        self.declare(name, Decl::User(parameter.id), Meaning::Const(of.clone()));
        Formal::Const(of)
    }

    fn visit_func_formal_parameter(
        &mut self,
        parameter: &FormalParameter,
        name: &Identifier,
        parameters: &FormalParameterSequence,
        result: &TypeDenoter,
        _: (),
    ) -> Formal {
        self.table.open_scope();
        let formals = parameters.accept(self, ());
        self.table.close_scope();

        let result = result.accept(self, ());
        self.annotations.set_type(parameter.id, result.clone());

        let meaning = Meaning::Func(formals.clone(), result.clone());
        self.declare(name, Decl::User(parameter.id), meaning);

        Formal::Func(formals, result)
    }

    fn visit_proc_formal_parameter(
        &mut self,
        parameter: &FormalParameter,
        name: &Identifier,
        parameters: &FormalParameterSequence,
        _: (),
    ) -> Formal {
        self.table.open_scope();
        let formals = parameters.accept(self, ());
        self.table.close_scope();

        self.declare(name, Decl::User(parameter.id), Meaning::Proc(formals.clone()));
        Formal::Proc(formals)
    }

    fn visit_var_formal_parameter(
        &mut self,
        parameter: &FormalParameter,
        name: &Identifier,
        denoter: &TypeDenoter,
        _: (),
    ) -> Formal {
        let of = denoter.accept(self, ());
        self.annotations.set_type(parameter.id, of.clone());

        self.declare(name, Decl::User(parameter.id), Meaning::Var(of.clone()));
        Formal::Var(of)
    }
}

impl FormalParameterSequenceVisitor<(), Vec<Formal>> for Checker<'_> {
    fn visit_empty_formal_parameter_sequence(
        &mut self,
        _: &FormalParameterSequence,
        _: (),
    ) -> Vec<Formal> {
        Vec::new()
    }

    fn visit_single_formal_parameter_sequence(
        &mut self,
        _: &FormalParameterSequence,
        parameter: &FormalParameter,
        _: (),
    ) -> Vec<Formal> {
        vec![parameter.accept(self, ())]
    }

    fn visit_multiple_formal_parameter_sequence(
        &mut self,
        _: &FormalParameterSequence,
        first: &FormalParameter,
        rest: &FormalParameterSequence,
        _: (),
    ) -> Vec<Formal> {
        let mut formals = vec![first.accept(self, ())];
        formals.extend(rest.accept(self, ()));

        formals
    }
}

impl<'f> ActualParameterVisitor<&'f Formal, ()> for Checker<'_> {
    fn visit_const_actual_parameter(
        &mut self,
        parameter: &ActualParameter,
        value: &Expression,
        formal: &'f Formal,
    ) {
        let found = self.expression(value);

        match formal {
            Formal::Const(expected) => self.expect(expected, &found, &value.location),
            _ => self.mode_mismatch(parameter, formal, "const"),
        }
    }

    fn visit_func_actual_parameter(
        &mut self,
        parameter: &ActualParameter,
        name: &Identifier,
        formal: &'f Formal,
    ) {
        let actual = match self.function(name) {
            Some((formals, result)) => Formal::Func(formals, result),
            None => return,
        };

        match formal {
            Formal::Func(_, _) if !actual.matches(formal) => {
                self.report(SemanticError::WrongSignature(name.spelling.clone()), &name.location)
            }

            Formal::Func(_, _) => (),
            _ => self.mode_mismatch(parameter, formal, "func"),
        }
    }

    fn visit_proc_actual_parameter(
        &mut self,
        parameter: &ActualParameter,
        name: &Identifier,
        formal: &'f Formal,
    ) {
        let formals = match self.procedure(name) {
            Some(formals) => formals,
            None => return,
        };

        match formal {
            Formal::Proc(expected) if !signatures_match(expected, &formals) => {
                self.report(SemanticError::WrongSignature(name.spelling.clone()), &name.location)
            }

            Formal::Proc(_) => (),
            _ => self.mode_mismatch(parameter, formal, "proc"),
        }
    }

    fn visit_var_actual_parameter(
        &mut self,
        parameter: &ActualParameter,
        vname: &Vname,
        formal: &'f Formal,
    ) {
        let (found, variable) = vname.accept(self, ());
        if !variable && !found.is_error() {
            self.report(SemanticError::NotAVariableArgument, &vname.location);
        }

        match formal {
            Formal::Var(expected) => self.expect(expected, &found, &vname.location),
            _ => self.mode_mismatch(parameter, formal, "var"),
        }
    }
}

impl Checker<'_> {
    fn mode_mismatch(&mut self, parameter: &ActualParameter, formal: &Formal, found: &'static str) {
        let error = SemanticError::ArgumentMode {
            expected: formal.mode(),
            found,
        };

        self.report(error, &parameter.location);
    }
}

impl<'f> ActualParameterSequenceVisitor<&'f [Formal], ()> for Checker<'_> {
    fn visit_empty_actual_parameter_sequence(
        &mut self,
        sequence: &ActualParameterSequence,
        formals: &'f [Formal],
    ) {
        if !formals.is_empty() {
            self.report(SemanticError::TooFewArguments, &sequence.location);
        }
    }

    fn visit_single_actual_parameter_sequence(
        &mut self,
        sequence: &ActualParameterSequence,
        parameter: &ActualParameter,
        formals: &'f [Formal],
    ) {
        match formals {
            [] => self.report(SemanticError::TooManyArguments, &sequence.location),
            [formal] => parameter.accept(self, formal),
            [formal, ..] => {
                parameter.accept(self, formal);
                self.report(SemanticError::TooFewArguments, &sequence.location);
            }
        }
    }

    fn visit_multiple_actual_parameter_sequence(
        &mut self,
        sequence: &ActualParameterSequence,
        first: &ActualParameter,
        rest: &ActualParameterSequence,
        formals: &'f [Formal],
    ) {
        match formals.split_first() {
            None => self.report(SemanticError::TooManyArguments, &sequence.location),
            Some((formal, others)) => {
                first.accept(self, formal);
                rest.accept(self, others);
            }
        }
    }
}

impl Checker<'_> {
    fn denoter(&mut self, denoter: &TypeDenoter, of: Type) -> Type {
        self.annotations.set_type(denoter.id, of.clone());
        of
    }
}

impl TypeDenoterVisitor<(), Type> for Checker<'_> {
    fn visit_any_type_denoter(&mut self, denoter: &TypeDenoter, _: ()) -> Type {
        self.denoter(denoter, Type::Any)
    }

    fn visit_array_type_denoter(
        &mut self,
        denoter: &TypeDenoter,
        size: &IntegerLiteral,
        element: &TypeDenoter,
        _: (),
    ) -> Type {
        let element = element.accept(self, ());

        let of = match size.integer_value() {
            Some(length) if length > 0 => Type::Array {
                length,
                element: Box::new(element),
            },

            Some(_) => {
                self.report(SemanticError::EmptyArray, &size.location);
                Type::Error
            }

            None => Type::Error,
        };

        self.denoter(denoter, of)
    }

    fn visit_bool_type_denoter(&mut self, denoter: &TypeDenoter, _: ()) -> Type {
        self.denoter(denoter, Type::Bool)
    }

    fn visit_char_type_denoter(&mut self, denoter: &TypeDenoter, _: ()) -> Type {
        self.denoter(denoter, Type::Char)
    }

    fn visit_error_type_denoter(&mut self, denoter: &TypeDenoter, _: ()) -> Type {
        self.denoter(denoter, Type::Error)
    }

    fn visit_int_type_denoter(&mut self, denoter: &TypeDenoter, _: ()) -> Type {
        self.denoter(denoter, Type::Int)
    }

    fn visit_record_type_denoter(
        &mut self,
        denoter: &TypeDenoter,
        fields: &FieldTypeDenoter,
        _: (),
    ) -> Type {
        let fields = fields.accept(self, ());
        self.denoter(denoter, Type::Record(fields))
    }

    fn visit_simple_type_denoter(
        &mut self,
        denoter: &TypeDenoter,
        name: &Identifier,
        _: (),
    ) -> Type {
        let of = match self.resolve(name) {
            Some(Meaning::Type(of)) => of,
            Some(_) => {
                self.wrong_kind(name, "type identifier");
                Type::Error
            }

            None => Type::Error,
        };

        self.denoter(denoter, of)
    }
}

impl Checker<'_> {
    /// Antepone un campo a los ya recolectados, rechazando duplicados.
    fn prepend_field(&mut self, name: &Identifier, of: Type, mut rest: Vec<Field>) -> Vec<Field> {
        if rest.iter().any(|field| field.name == name.spelling) {
            self.report(SemanticError::DuplicateField(name.spelling.clone()), &name.location);
        }

        rest.insert(
            0,
            Field {
                name: name.spelling.clone(),
                of,
            },
        );

        rest
    }
}

impl FieldTypeDenoterVisitor<(), Vec<Field>> for Checker<'_> {
    fn visit_single_field_type_denoter(
        &mut self,
        _: &FieldTypeDenoter,
        name: &Identifier,
        denoter: &TypeDenoter,
        _: (),
    ) -> Vec<Field> {
        let of = denoter.accept(self, ());
        self.prepend_field(name, of, Vec::new())
    }

    fn visit_multiple_field_type_denoter(
        &mut self,
        _: &FieldTypeDenoter,
        name: &Identifier,
        denoter: &TypeDenoter,
        rest: &FieldTypeDenoter,
        _: (),
    ) -> Vec<Field> {
        let of = denoter.accept(self, ());
        let rest = rest.accept(self, ());

        self.prepend_field(name, of, rest)
    }
}

impl ArrayAggregateVisitor<(), (Type, i32)> for Checker<'_> {
    fn visit_single_array_aggregate(
        &mut self,
        _: &ArrayAggregate,
        element: &Expression,
        _: (),
    ) -> (Type, i32) {
        (self.expression(element), 1)
    }

    fn visit_multiple_array_aggregate(
        &mut self,
        _: &ArrayAggregate,
        first: &Expression,
        rest: &ArrayAggregate,
        _: (),
    ) -> (Type, i32) {
        let element = self.expression(first);
        let (rest_element, count) = rest.accept(self, ());

        self.expect(&element, &rest_element, &rest.location);
        (element, count + 1)
    }
}

impl RecordAggregateVisitor<(), Vec<Field>> for Checker<'_> {
    fn visit_single_record_aggregate(
        &mut self,
        _: &RecordAggregate,
        field: &Identifier,
        value: &Expression,
        _: (),
    ) -> Vec<Field> {
        let of = self.expression(value);
        self.prepend_field(field, of, Vec::new())
    }

    fn visit_multiple_record_aggregate(
        &mut self,
        _: &RecordAggregate,
        field: &Identifier,
        value: &Expression,
        rest: &RecordAggregate,
        _: (),
    ) -> Vec<Field> {
        let of = self.expression(value);
        let rest = rest.accept(self, ());

        self.prepend_field(field, of, rest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse::parse, source::Source};

    fn check_text(text: &str) -> (Program, Annotations, Reporter) {
        let source = Source::new("test.tri", text);
        let mut reporter = Reporter::default();

        let program = parse(&source, &mut reporter);
        assert_eq!(reporter.errors(), 0, "{}", reporter);

        let annotations = check(&program, &mut reporter);
        (program, annotations, reporter)
    }

    fn errors(text: &str) -> Vec<String> {
        let (_, _, reporter) = check_text(text);
        reporter
            .diagnostics()
            .iter()
            .map(|diagnostic| diagnostic.message())
            .collect()
    }

    #[test]
    fn well_typed_program() {
        let found = errors(
            "let
                type Point ~ record x: Integer, y: Integer end;
                var p: Point;
                var a: array 3 of Integer;
                const c ~ 'z';
                func sq(n: Integer): Integer ~ n * n;
                proc bump(var n: Integer) ~ n := n + 1
             in begin
                p := {x ~ 1, y ~ sq(2)};
                a := [1, 2, p.y];
                bump(var a[0]);
                if a[0] = p.x then put(c) else puteol();
                while \\eof() do getint(var p.x)
             end",
        );

        assert!(found.is_empty(), "{:?}", found);
    }

    #[test]
    fn undeclared_identifier() {
        assert_eq!(errors("x := 1"), vec!["`x` is not declared"]);
    }

    #[test]
    fn erroneous_targets_report_once() {
        assert_eq!(errors("getint(var y)"), vec!["`y` is not declared"]);
        assert_eq!(
            errors("let proc p() ~ puteol() in p := 1"),
            vec!["`p` is not a const or var identifier"]
        );

        assert_eq!(
            errors("let const c ~ 1 in c := 2"),
            vec!["Left-hand side of assignment is not a variable"]
        );
    }

    #[test]
    fn let_scope_ends_with_its_command() {
        let found = errors("begin let var x: Integer in x := 1; x := 2 end");
        assert_eq!(found, vec!["`x` is not declared"]);
    }

    #[test]
    fn shadowing_resolves_to_innermost() {
        let (program, annotations, reporter) = check_text(
            "let var x: Integer in let var x: Char in x := 'a'",
        );

        assert_eq!(reporter.errors(), 0, "{}", reporter);

        fn assigned_vname(command: &Command) -> &Vname {
            match &command.kind {
                CommandKind::Let { body, .. } => assigned_vname(body),
                CommandKind::Assign { target, .. } => target,
                other => panic!("unexpected command {:?}", other),
            }
        }

        let target = assigned_vname(&program.command);
        assert_eq!(annotations.type_of(target.id), Some(&Type::Char));
        assert!(annotations.is_variable(target.id));
    }

    #[test]
    fn redeclaration_only_in_same_scope() {
        let same = errors("let var x: Integer; var x: Char in x := 1");
        assert_eq!(same, vec!["Identifier `x` is already declared in this scope"]);

        let nested = errors("let var x: Integer in let var x: Integer in x := 1");
        assert!(nested.is_empty());
    }

    #[test]
    fn type_mismatch_cites_both_types() {
        let found = errors("let var b: Boolean in b := 1 + 2");
        assert_eq!(found, vec!["Type mismatch: expected `Boolean`, found `Integer`"]);
    }

    #[test]
    fn error_type_does_not_cascade() {
        // Un único error: `y` no existe; la suma y la asignación lo absorben
        let found = errors("let var x: Integer in x := (y + 1) * 2");
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn equality_requires_equivalent_operands() {
        let found = errors("let var b: Boolean in b := 1 = 'a'");
        assert_eq!(found, vec!["Incompatible argument types for `=`: `Integer` and `Char`"]);
    }

    #[test]
    fn constants_are_not_assignable() {
        let found = errors("let const k ~ 3 in k := 4");
        assert_eq!(found, vec!["Left-hand side of assignment is not a variable"]);
    }

    #[test]
    fn argument_checks() {
        assert_eq!(errors("putint()"), vec!["Too few actual parameters"]);
        assert_eq!(errors("puteol(1)"), vec!["Too many actual parameters"]);
        assert_eq!(
            errors("getint(3)"),
            vec!["const actual parameter given where a var parameter is expected"]
        );
        assert_eq!(
            errors("let const k ~ 1 in getint(var k)"),
            vec!["Actual parameter for a var parameter is not a variable"]
        );
    }

    #[test]
    fn routine_parameters_and_recursion() {
        let found = errors(
            "let
                func fact(n: Integer): Integer ~ if n <= 1 then 1 else n * fact(n - 1);
                proc apply(func f(x: Integer): Integer) ~ putint(f(5))
             in apply(func fact)",
        );

        assert!(found.is_empty(), "{:?}", found);
    }

    #[test]
    fn record_and_array_access() {
        let found = errors(
            "let var p: record x: Integer end; var n: Integer in begin n := p.y; n := n[0] end",
        );

        assert_eq!(
            found,
            vec![
                "No field `y` in `record x: Integer end`",
                "Array expected here, found `Integer`",
            ]
        );
    }

    #[test]
    fn double_assignment_checks_each_pair() {
        let found = errors("let var a: Integer; var c: Char in a, c := 1, 2");
        assert_eq!(found, vec!["Type mismatch: expected `Char`, found `Integer`"]);
    }

    #[test]
    fn operator_declarations_are_entered() {
        let source = Source::new("test.tri", "");
        let cursor = source.cursor();
        let location = cursor.location_from(cursor.position());
        let mut ids = NodeIds::default();

        let terminal = |spelling: &str, ids: &mut NodeIds| Terminal {
            id: ids.next(),
            location: location.clone(),
            spelling: spelling.to_owned(),
        };

        let integer = |ids: &mut NodeIds, name: Terminal| TypeDenoter {
            id: ids.next(),
            location: name.location.clone(),
            kind: TypeDenoterKind::Simple(name),
        };

        let left = terminal("Integer", &mut ids);
        let right = terminal("Integer", &mut ids);
        let result = terminal("Integer", &mut ids);
        let operator = terminal("<>", &mut ids);

        let declaration = Declaration {
            id: ids.next(),
            location: location.clone(),
            kind: DeclarationKind::BinaryOperator {
                operator,
                left: integer(&mut ids, left),
                right: integer(&mut ids, right),
                result: integer(&mut ids, result),
            },
        };

        let mut reporter = Reporter::default();
        let mut table = SymbolTable::new();
        std_env::populate(&mut table);

        let mut checker = Checker {
            table,
            annotations: Annotations::default(),
            reporter: &mut reporter,
        };

        declaration.accept(&mut checker, ());
        assert!(matches!(
            checker.table.retrieve("<>").map(|binding| &binding.meaning),
            Some(Meaning::Binary {
                result: Type::Int,
                ..
            })
        ));

        assert_eq!(reporter.errors(), 0);
    }
}
