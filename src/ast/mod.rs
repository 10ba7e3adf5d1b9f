//! Árbol de sintaxis abstracta.
//!
//! El árbol se compone de familias cerradas de nodos. Cada nodo de una
//! familia es una estructura con identidad ([`NodeId`]), ubicación y una
//! variante de contenido (`kind`). Las identidades son estables durante
//! toda una compilación y permiten que las fases posteriores asocien
//! información a un nodo mediante tablas laterales, sin mutar el árbol.
//!
//! Las secuencias (comandos, declaraciones, parámetros, agregados y
//! campos) se representan anidadas a la derecha: `Sequential(first, rest)`
//! o `Multiple(first, rest)`.
//!
//! El recorrido uniforme de las familias se define en [`visit`].

pub mod visit;

use crate::{lex, source::Location};
use std::fmt::{self, Display};

/// Identidad de un nodo dentro de un programa.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl Display for NodeId {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "#{}", self.0)
    }
}

/// Generador de identidades frescas.
#[derive(Debug, Default)]
pub struct NodeIds {
    next: u32,
}

impl NodeIds {
    pub fn next(&mut self) -> NodeId {
        let id = NodeId(self.next);
        self.next += 1;

        id
    }

    /// Cantidad de identidades entregadas hasta ahora.
    pub fn issued(&self) -> u32 {
        self.next
    }
}

/// Nodo terminal: identificador, operador o literal.
///
/// Los terminales solo guardan su lexema tal como aparece en el código fuente.
#[derive(Debug, Clone)]
pub struct Terminal {
    pub id: NodeId,
    pub location: Location,
    pub spelling: String,
}

pub type Identifier = Terminal;
pub type Operator = Terminal;
pub type IntegerLiteral = Terminal;
pub type CharacterLiteral = Terminal;

impl Terminal {
    /// Valor de un literal entero, si es representable.
    pub fn integer_value(&self) -> Option<i32> {
        self.spelling
            .parse::<i32>()
            .ok()
            .filter(|&value| value <= crate::machine::MAXINT)
    }

    /// Valor de un literal de carácter.
    pub fn character_value(&self) -> Option<char> {
        lex::char_value(&self.spelling)
    }
}

/// Raíz del árbol.
#[derive(Debug)]
pub struct Program {
    pub id: NodeId,
    pub location: Location,
    pub command: Command,

    /// Generador que construyó el árbol; las fases que reemplazan
    /// nodos lo continúan para no repetir identidades.
    pub ids: NodeIds,
}

#[derive(Debug)]
pub struct Command {
    pub id: NodeId,
    pub location: Location,
    pub kind: CommandKind,
}

#[derive(Debug)]
pub enum CommandKind {
    /// `V := E`
    Assign { target: Vname, value: Expression },

    /// `V1, V2 := E1, E2`
    DoubleAssign {
        first: Vname,
        second: Vname,
        first_value: Expression,
        second_value: Expression,
    },

    /// `I(APS)`
    Call {
        name: Identifier,
        arguments: Box<ActualParameterSequence>,
    },

    Empty,

    /// `if E then C1 else C2`
    If {
        condition: Expression,
        then: Box<Command>,
        otherwise: Box<Command>,
    },

    /// `let D in C`
    Let {
        declaration: Box<Declaration>,
        body: Box<Command>,
    },

    /// `C1; C2`
    Sequential {
        first: Box<Command>,
        second: Box<Command>,
    },

    /// `while E do C`
    While {
        condition: Expression,
        body: Box<Command>,
    },

    /// `loop C1 while E do C2`, o bien `while E { C }` con `C1` vacío.
    LoopWhile {
        prelude: Box<Command>,
        condition: Expression,
        body: Box<Command>,
    },
}

#[derive(Debug)]
pub struct Expression {
    pub id: NodeId,
    pub location: Location,
    pub kind: ExpressionKind,
}

#[derive(Debug)]
pub enum ExpressionKind {
    /// `[AA]`
    Array(Box<ArrayAggregate>),

    /// `E1 O E2`
    Binary {
        left: Box<Expression>,
        operator: Operator,
        right: Box<Expression>,
    },

    /// `I(APS)`
    Call {
        name: Identifier,
        arguments: Box<ActualParameterSequence>,
    },

    Character(CharacterLiteral),
    Empty,

    /// `if E1 then E2 else E3`
    If {
        condition: Box<Expression>,
        then: Box<Expression>,
        otherwise: Box<Expression>,
    },

    Integer(IntegerLiteral),

    /// `let D in E`
    Let {
        declaration: Box<Declaration>,
        body: Box<Expression>,
    },

    /// `{RA}`
    Record(Box<RecordAggregate>),

    /// `O E`
    Unary {
        operator: Operator,
        operand: Box<Expression>,
    },

    Vname(Vname),
}

#[derive(Debug)]
pub struct Declaration {
    pub id: NodeId,
    pub location: Location,
    pub kind: DeclarationKind,
}

#[derive(Debug)]
pub enum DeclarationKind {
    /// Declaración de operador binario. Solo el entorno estándar las
    /// produce; no existe sintaxis para ellas.
    BinaryOperator {
        operator: Operator,
        left: TypeDenoter,
        right: TypeDenoter,
        result: TypeDenoter,
    },

    /// `const I ~ E`
    Const { name: Identifier, value: Expression },

    /// `func I(FPS): T ~ E`
    Func {
        name: Identifier,
        parameters: Box<FormalParameterSequence>,
        result: TypeDenoter,
        body: Expression,
    },

    /// `proc I(FPS) ~ C`
    Proc {
        name: Identifier,
        parameters: Box<FormalParameterSequence>,
        body: Command,
    },

    /// `D1; D2`
    Sequential {
        first: Box<Declaration>,
        second: Box<Declaration>,
    },

    /// `type I ~ T`
    Type { name: Identifier, denoter: TypeDenoter },

    /// Análoga a [`DeclarationKind::BinaryOperator`].
    UnaryOperator {
        operator: Operator,
        operand: TypeDenoter,
        result: TypeDenoter,
    },

    /// `var I : T`
    Var { name: Identifier, denoter: TypeDenoter },
}

impl Declaration {
    /// Identificador u operador que introduce esta declaración.
    pub fn name(&self) -> Option<&Terminal> {
        use DeclarationKind::*;

        match &self.kind {
            BinaryOperator { operator, .. } | UnaryOperator { operator, .. } => Some(operator),
            Const { name, .. }
            | Func { name, .. }
            | Proc { name, .. }
            | Type { name, .. }
            | Var { name, .. } => Some(name),
            Sequential { .. } => None,
        }
    }
}

/// Referencia a una ubicación con nombre: variable, campo o elemento.
#[derive(Debug)]
pub struct Vname {
    pub id: NodeId,
    pub location: Location,
    pub kind: VnameKind,
}

#[derive(Debug)]
pub enum VnameKind {
    /// `V.I`
    Dot { record: Box<Vname>, field: Identifier },

    /// `I`
    Simple(Identifier),

    /// `V[E]`
    Subscript {
        array: Box<Vname>,
        index: Box<Expression>,
    },
}

impl Vname {
    /// Identificador en la raíz de la cadena de accesos.
    pub fn root(&self) -> &Identifier {
        match &self.kind {
            VnameKind::Simple(name) => name,
            VnameKind::Dot { record, .. } => record.root(),
            VnameKind::Subscript { array, .. } => array.root(),
        }
    }
}

#[derive(Debug)]
pub struct FormalParameter {
    pub id: NodeId,
    pub location: Location,
    pub kind: FormalParameterKind,
}

#[derive(Debug)]
pub enum FormalParameterKind {
    Const {
        name: Identifier,
        denoter: TypeDenoter,
    },

    Func {
        name: Identifier,
        parameters: Box<FormalParameterSequence>,
        result: TypeDenoter,
    },

    Proc {
        name: Identifier,
        parameters: Box<FormalParameterSequence>,
    },

    Var {
        name: Identifier,
        denoter: TypeDenoter,
    },
}

impl FormalParameter {
    pub fn name(&self) -> &Identifier {
        use FormalParameterKind::*;

        match &self.kind {
            Const { name, .. } | Func { name, .. } | Proc { name, .. } | Var { name, .. } => name,
        }
    }
}

#[derive(Debug)]
pub struct FormalParameterSequence {
    pub id: NodeId,
    pub location: Location,
    pub kind: FormalParameterSequenceKind,
}

#[derive(Debug)]
pub enum FormalParameterSequenceKind {
    Empty,
    Single(FormalParameter),
    Multiple {
        first: FormalParameter,
        rest: Box<FormalParameterSequence>,
    },
}

#[derive(Debug)]
pub struct ActualParameter {
    pub id: NodeId,
    pub location: Location,
    pub kind: ActualParameterKind,
}

#[derive(Debug)]
pub enum ActualParameterKind {
    Const(Expression),
    Func(Identifier),
    Proc(Identifier),
    Var(Vname),
}

#[derive(Debug)]
pub struct ActualParameterSequence {
    pub id: NodeId,
    pub location: Location,
    pub kind: ActualParameterSequenceKind,
}

#[derive(Debug)]
pub enum ActualParameterSequenceKind {
    Empty,
    Single(ActualParameter),
    Multiple {
        first: ActualParameter,
        rest: Box<ActualParameterSequence>,
    },
}

#[derive(Debug)]
pub struct TypeDenoter {
    pub id: NodeId,
    pub location: Location,
    pub kind: TypeDenoterKind,
}

#[derive(Debug)]
pub enum TypeDenoterKind {
    /// Comodín de los operadores de igualdad.
    Any,

    /// `array IL of T`
    Array {
        size: IntegerLiteral,
        element: Box<TypeDenoter>,
    },

    Bool,
    Char,

    /// Centinela para denotadores ya reportados como erróneos.
    Error,

    Int,

    /// `record FT end`
    Record(Box<FieldTypeDenoter>),

    /// Referencia por nombre a una declaración de tipo.
    Simple(Identifier),
}

#[derive(Debug)]
pub struct FieldTypeDenoter {
    pub id: NodeId,
    pub location: Location,
    pub kind: FieldTypeDenoterKind,
}

#[derive(Debug)]
pub enum FieldTypeDenoterKind {
    Single {
        name: Identifier,
        denoter: TypeDenoter,
    },

    Multiple {
        name: Identifier,
        denoter: TypeDenoter,
        rest: Box<FieldTypeDenoter>,
    },
}

#[derive(Debug)]
pub struct ArrayAggregate {
    pub id: NodeId,
    pub location: Location,
    pub kind: ArrayAggregateKind,
}

#[derive(Debug)]
pub enum ArrayAggregateKind {
    Single(Expression),
    Multiple {
        first: Expression,
        rest: Box<ArrayAggregate>,
    },
}

#[derive(Debug)]
pub struct RecordAggregate {
    pub id: NodeId,
    pub location: Location,
    pub kind: RecordAggregateKind,
}

#[derive(Debug)]
pub enum RecordAggregateKind {
    Single {
        field: Identifier,
        value: Expression,
    },

    Multiple {
        field: Identifier,
        value: Expression,
        rest: Box<RecordAggregate>,
    },
}
