//! Plegado de constantes.
//!
//! Reemplaza expresiones unarias y binarias cuyos operandos son literales
//! por el literal resultante. El recorrido es de abajo hacia arriba, de
//! modo que una expresión compuesta se pliega completa en una pasada.
//! Los resultados booleanos se representan como referencias a `true` o
//! `false` del entorno estándar.

use thiserror::Error;

use crate::{
    ast::*,
    error::{Kind, Reporter},
    machine::MAXINT,
    semantic::{Annotations, Decl, StdDecl, Type},
    source::{Located, Location},
};

#[non_exhaustive]
#[derive(Error, Debug)]
pub enum FoldWarning {
    #[error("Constant {0} by zero left unfolded")]
    ByZero(&'static str),
}

/// Cantidad de expresiones plegadas, por tipo del resultado.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FoldCounts {
    pub integers: usize,
    pub booleans: usize,
}

impl FoldCounts {
    pub fn total(&self) -> usize {
        self.integers + self.booleans
    }
}

/// Pliega un programa en sitio.
///
/// Los nodos nuevos reciben identidades frescas de `program.ids` y se
/// anotan con su tipo y asociaciones, para que la generación de código
/// los trate igual que a cualquier otro literal.
pub fn fold(
    program: &mut Program,
    annotations: &mut Annotations,
    reporter: &mut Reporter,
) -> FoldCounts {
    let mut folder = Folder {
        ids: &mut program.ids,
        annotations,
        reporter,
        counts: FoldCounts::default(),
    };

    folder.command(&mut program.command);
    folder.counts
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Constant {
    Int(i32),
    Bool(bool),
}

struct Folder<'a> {
    ids: &'a mut NodeIds,
    annotations: &'a mut Annotations,
    reporter: &'a mut Reporter,
    counts: FoldCounts,
}

impl Folder<'_> {
    fn command(&mut self, command: &mut Command) {
        use CommandKind::*;

        match &mut command.kind {
            Assign { target, value } => {
                self.vname(target);
                self.expression(value);
            }

            DoubleAssign {
                first,
                second,
                first_value,
                second_value,
            } => {
                self.vname(first);
                self.vname(second);
                self.expression(first_value);
                self.expression(second_value);
            }

            Call { arguments, .. } => self.actual_parameters(arguments),
            Empty => (),

            If {
                condition,
                then,
                otherwise,
            } => {
                self.expression(condition);
                self.command(then);
                self.command(otherwise);
            }

            Let { declaration, body } => {
                self.declaration(declaration);
                self.command(body);
            }

            Sequential { first, second } => {
                self.command(first);
                self.command(second);
            }

            While { condition, body } => {
                self.expression(condition);
                self.command(body);
            }

            LoopWhile {
                prelude,
                condition,
                body,
            } => {
                self.command(prelude);
                self.expression(condition);
                self.command(body);
            }
        }
    }

    fn declaration(&mut self, declaration: &mut Declaration) {
        use DeclarationKind::*;

        match &mut declaration.kind {
            Const { value, .. } => self.expression(value),
            Func { body, .. } => self.expression(body),
            Proc { body, .. } => self.command(body),
            Sequential { first, second } => {
                self.declaration(first);
                self.declaration(second);
            }

            BinaryOperator { .. } | Type { .. } | UnaryOperator { .. } | Var { .. } => (),
        }
    }

    fn vname(&mut self, vname: &mut Vname) {
        match &mut vname.kind {
            VnameKind::Simple(_) => (),
            VnameKind::Dot { record, .. } => self.vname(record),
            VnameKind::Subscript { array, index } => {
                self.vname(array);
                self.expression(index);
            }
        }
    }

    fn actual_parameters(&mut self, sequence: &mut ActualParameterSequence) {
        let mut sequence = sequence;
        loop {
            sequence = match &mut sequence.kind {
                ActualParameterSequenceKind::Empty => return,
                ActualParameterSequenceKind::Single(parameter) => {
                    self.actual_parameter(parameter);
                    return;
                }

                ActualParameterSequenceKind::Multiple { first, rest } => {
                    self.actual_parameter(first);
                    rest
                }
            };
        }
    }

    fn actual_parameter(&mut self, parameter: &mut ActualParameter) {
        match &mut parameter.kind {
            ActualParameterKind::Const(value) => self.expression(value),
            ActualParameterKind::Var(vname) => self.vname(vname),
            ActualParameterKind::Func(_) | ActualParameterKind::Proc(_) => (),
        }
    }

    fn expression(&mut self, expression: &mut Expression) {
        use ExpressionKind::*;

        let folded = match &mut expression.kind {
            Array(aggregate) => {
                self.array_aggregate(aggregate);
                None
            }

            Binary {
                left,
                operator,
                right,
            } => {
                self.expression(left);
                self.expression(right);
                self.binary(operator, left, right)
            }

            Call { arguments, .. } => {
                self.actual_parameters(arguments);
                None
            }

            If {
                condition,
                then,
                otherwise,
            } => {
                self.expression(condition);
                self.expression(then);
                self.expression(otherwise);
                None
            }

            Let { declaration, body } => {
                self.declaration(declaration);
                self.expression(body);
                None
            }

            Record(aggregate) => {
                self.record_aggregate(aggregate);
                None
            }

            Unary { operator, operand } => {
                self.expression(operand);
                self.unary(operator, operand)
            }

            Vname(vname) => {
                self.vname(vname);
                None
            }

            Character(_) | Empty | Integer(_) => None,
        };

        if let Some(constant) = folded {
            *expression = self.literal(constant, &expression.location);
        }
    }

    fn array_aggregate(&mut self, aggregate: &mut ArrayAggregate) {
        match &mut aggregate.kind {
            ArrayAggregateKind::Single(element) => self.expression(element),
            ArrayAggregateKind::Multiple { first, rest } => {
                self.expression(first);
                self.array_aggregate(rest);
            }
        }
    }

    fn record_aggregate(&mut self, aggregate: &mut RecordAggregate) {
        match &mut aggregate.kind {
            RecordAggregateKind::Single { value, .. } => self.expression(value),
            RecordAggregateKind::Multiple { value, rest, .. } => {
                self.expression(value);
                self.record_aggregate(rest);
            }
        }
    }

    /// Declaración estándar a la que refiere un terminal.
    ///
    /// Sin anotaciones, el lexema decide.
    fn standard(&self, terminal: &Terminal) -> Option<StdDecl> {
        match self.annotations.binding(terminal.id) {
            Some(Decl::Std(decl)) => Some(decl),
            Some(Decl::User(_)) => None,
            None => StdDecl::lookup(&terminal.spelling),
        }
    }

    fn constant(&self, expression: &Expression) -> Option<Constant> {
        match &expression.kind {
            ExpressionKind::Integer(literal) => literal.integer_value().map(Constant::Int),
            ExpressionKind::Character(literal) => literal
                .character_value()
                .map(|value| Constant::Int(value as i32)),

            ExpressionKind::Vname(Vname {
                kind: VnameKind::Simple(name),
                ..
            }) => match self.standard(name)? {
                StdDecl::True => Some(Constant::Bool(true)),
                StdDecl::False => Some(Constant::Bool(false)),
                _ => None,
            },

            _ => None,
        }
    }

    fn unary(&mut self, operator: &Operator, operand: &Expression) -> Option<Constant> {
        match (self.standard(operator)?, self.constant(operand)?) {
            (StdDecl::Not, Constant::Bool(value)) => Some(Constant::Bool(!value)),
            _ => None,
        }
    }

    fn binary(&mut self, operator: &Operator, left: &Expression, right: &Expression) -> Option<Constant> {
        use Constant::*;

        let decl = self.standard(operator)?;
        let (left, right) = (self.constant(left), self.constant(right));

        // Absorción: el otro operando no necesita ser constante
        match (decl, left, right) {
            (StdDecl::And, Some(Bool(false)), _) | (StdDecl::And, _, Some(Bool(false))) => {
                return Some(Bool(false))
            }

            (StdDecl::Or, Some(Bool(true)), _) | (StdDecl::Or, _, Some(Bool(true))) => {
                return Some(Bool(true))
            }

            _ => (),
        }

        let folded = match (decl, left?, right?) {
            (StdDecl::And, Bool(left), Bool(right)) => Bool(left && right),
            (StdDecl::Or, Bool(left), Bool(right)) => Bool(left || right),

            (StdDecl::Eq, left, right) => Bool(left == right),
            (StdDecl::Ne, left, right) => Bool(left != right),

            (StdDecl::Lt, Int(left), Int(right)) => Bool(left < right),
            (StdDecl::Le, Int(left), Int(right)) => Bool(left <= right),
            (StdDecl::Gt, Int(left), Int(right)) => Bool(left > right),
            (StdDecl::Ge, Int(left), Int(right)) => Bool(left >= right),

            (StdDecl::Add, Int(left), Int(right)) => Int(in_range(left.checked_add(right))?),
            (StdDecl::Sub, Int(left), Int(right)) => Int(in_range(left.checked_sub(right))?),
            (StdDecl::Mult, Int(left), Int(right)) => Int(in_range(left.checked_mul(right))?),

            (StdDecl::Div, Int(_), Int(0)) => return self.by_zero("division", operator),
            (StdDecl::Mod, Int(_), Int(0)) => return self.by_zero("modulo", operator),
            (StdDecl::Div, Int(left), Int(right)) => Int(in_range(left.checked_div(right))?),
            (StdDecl::Mod, Int(left), Int(right)) => Int(in_range(left.checked_rem(right))?),

            _ => return None,
        };

        Some(folded)
    }

    fn by_zero(&mut self, operation: &'static str, operator: &Operator) -> Option<Constant> {
        let warning = Located::at(FoldWarning::ByZero(operation), operator.location.clone());
        self.reporter.warn(Kind::Semantic, warning);

        None
    }

    /// Construye el literal que reemplaza a una expresión plegada.
    fn literal(&mut self, constant: Constant, location: &Location) -> Expression {
        let id = self.ids.next();
        let terminal = |ids: &mut NodeIds, spelling: String| Terminal {
            id: ids.next(),
            location: location.clone(),
            spelling,
        };

        let kind = match constant {
            Constant::Int(value) => {
                self.counts.integers += 1;
                self.annotations.set_type(id, Type::Int);

                ExpressionKind::Integer(terminal(self.ids, value.to_string()))
            }

            Constant::Bool(value) => {
                self.counts.booleans += 1;
                self.annotations.set_type(id, Type::Bool);

                let decl = if value { StdDecl::True } else { StdDecl::False };
                let name = terminal(self.ids, decl.spelling().to_owned());
                self.annotations.bind(name.id, Decl::Std(decl));

                let vname = Vname {
                    id: self.ids.next(),
                    location: location.clone(),
                    kind: VnameKind::Simple(name),
                };

                self.annotations.set_type(vname.id, Type::Bool);
                ExpressionKind::Vname(vname)
            }
        };

        Expression {
            id,
            location: location.clone(),
            kind,
        }
    }
}

fn in_range(value: Option<i32>) -> Option<i32> {
    value.filter(|value| (-MAXINT..=MAXINT).contains(value))
}
