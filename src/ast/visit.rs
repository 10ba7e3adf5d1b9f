//! Protocolo de visita.
//!
//! Cada familia de nodos expone `accept(visitor, arg) -> R`, el cual
//! despacha según la variante del nodo a exactamente un método del
//! visitante. Un visitante implementa un trait por familia, con un
//! método por variante; el compilador verifica que ninguna variante
//! quede sin atender. Los tipos de argumento y resultado son genéricos
//! y pueden diferir entre familias de un mismo visitante.
//!
//! Los métodos reciben el nodo completo (para identidad y ubicación)
//! seguido de sus hijos ya desestructurados.

use super::*;

pub trait ProgramVisitor<A, R> {
    fn visit_program(&mut self, program: &Program, command: &Command, arg: A) -> R;
}

pub trait CommandVisitor<A, R> {
    fn visit_assign_command(
        &mut self,
        command: &Command,
        target: &Vname,
        value: &Expression,
        arg: A,
    ) -> R;

    fn visit_double_assign_command(
        &mut self,
        command: &Command,
        targets: (&Vname, &Vname),
        values: (&Expression, &Expression),
        arg: A,
    ) -> R;

    fn visit_call_command(
        &mut self,
        command: &Command,
        name: &Identifier,
        arguments: &ActualParameterSequence,
        arg: A,
    ) -> R;

    fn visit_empty_command(&mut self, command: &Command, arg: A) -> R;

    fn visit_if_command(
        &mut self,
        command: &Command,
        condition: &Expression,
        then: &Command,
        otherwise: &Command,
        arg: A,
    ) -> R;

    fn visit_let_command(
        &mut self,
        command: &Command,
        declaration: &Declaration,
        body: &Command,
        arg: A,
    ) -> R;

    fn visit_sequential_command(
        &mut self,
        command: &Command,
        first: &Command,
        second: &Command,
        arg: A,
    ) -> R;

    fn visit_while_command(
        &mut self,
        command: &Command,
        condition: &Expression,
        body: &Command,
        arg: A,
    ) -> R;

    fn visit_loop_while_command(
        &mut self,
        command: &Command,
        prelude: &Command,
        condition: &Expression,
        body: &Command,
        arg: A,
    ) -> R;
}

pub trait ExpressionVisitor<A, R> {
    fn visit_array_expression(
        &mut self,
        expression: &Expression,
        aggregate: &ArrayAggregate,
        arg: A,
    ) -> R;

    fn visit_binary_expression(
        &mut self,
        expression: &Expression,
        left: &Expression,
        operator: &Operator,
        right: &Expression,
        arg: A,
    ) -> R;

    fn visit_call_expression(
        &mut self,
        expression: &Expression,
        name: &Identifier,
        arguments: &ActualParameterSequence,
        arg: A,
    ) -> R;

    fn visit_character_expression(
        &mut self,
        expression: &Expression,
        literal: &CharacterLiteral,
        arg: A,
    ) -> R;

    fn visit_empty_expression(&mut self, expression: &Expression, arg: A) -> R;

    fn visit_if_expression(
        &mut self,
        expression: &Expression,
        condition: &Expression,
        then: &Expression,
        otherwise: &Expression,
        arg: A,
    ) -> R;

    fn visit_integer_expression(
        &mut self,
        expression: &Expression,
        literal: &IntegerLiteral,
        arg: A,
    ) -> R;

    fn visit_let_expression(
        &mut self,
        expression: &Expression,
        declaration: &Declaration,
        body: &Expression,
        arg: A,
    ) -> R;

    fn visit_record_expression(
        &mut self,
        expression: &Expression,
        aggregate: &RecordAggregate,
        arg: A,
    ) -> R;

    fn visit_unary_expression(
        &mut self,
        expression: &Expression,
        operator: &Operator,
        operand: &Expression,
        arg: A,
    ) -> R;

    fn visit_vname_expression(&mut self, expression: &Expression, vname: &Vname, arg: A) -> R;
}

pub trait DeclarationVisitor<A, R> {
    fn visit_binary_operator_declaration(
        &mut self,
        declaration: &Declaration,
        operator: &Operator,
        operands: (&TypeDenoter, &TypeDenoter),
        result: &TypeDenoter,
        arg: A,
    ) -> R;

    fn visit_const_declaration(
        &mut self,
        declaration: &Declaration,
        name: &Identifier,
        value: &Expression,
        arg: A,
    ) -> R;

    fn visit_func_declaration(
        &mut self,
        declaration: &Declaration,
        name: &Identifier,
        parameters: &FormalParameterSequence,
        result: &TypeDenoter,
        body: &Expression,
        arg: A,
    ) -> R;

    fn visit_proc_declaration(
        &mut self,
        declaration: &Declaration,
        name: &Identifier,
        parameters: &FormalParameterSequence,
        body: &Command,
        arg: A,
    ) -> R;

    fn visit_sequential_declaration(
        &mut self,
        declaration: &Declaration,
        first: &Declaration,
        second: &Declaration,
        arg: A,
    ) -> R;

    fn visit_type_declaration(
        &mut self,
        declaration: &Declaration,
        name: &Identifier,
        denoter: &TypeDenoter,
        arg: A,
    ) -> R;

    fn visit_unary_operator_declaration(
        &mut self,
        declaration: &Declaration,
        operator: &Operator,
        operand: &TypeDenoter,
        result: &TypeDenoter,
        arg: A,
    ) -> R;

    fn visit_var_declaration(
        &mut self,
        declaration: &Declaration,
        name: &Identifier,
        denoter: &TypeDenoter,
        arg: A,
    ) -> R;
}

pub trait VnameVisitor<A, R> {
    fn visit_dot_vname(&mut self, vname: &Vname, record: &Vname, field: &Identifier, arg: A)
        -> R;

    fn visit_simple_vname(&mut self, vname: &Vname, name: &Identifier, arg: A) -> R;

    fn visit_subscript_vname(
        &mut self,
        vname: &Vname,
        array: &Vname,
        index: &Expression,
        arg: A,
    ) -> R;
}

pub trait FormalParameterVisitor<A, R> {
    fn visit_const_formal_parameter(
        &mut self,
        parameter: &FormalParameter,
        name: &Identifier,
        denoter: &TypeDenoter,
        arg: A,
    ) -> R;

    fn visit_func_formal_parameter(
        &mut self,
        parameter: &FormalParameter,
        name: &Identifier,
        parameters: &FormalParameterSequence,
        result: &TypeDenoter,
        arg: A,
    ) -> R;

    fn visit_proc_formal_parameter(
        &mut self,
        parameter: &FormalParameter,
        name: &Identifier,
        parameters: &FormalParameterSequence,
        arg: A,
    ) -> R;

    fn visit_var_formal_parameter(
        &mut self,
        parameter: &FormalParameter,
        name: &Identifier,
        denoter: &TypeDenoter,
        arg: A,
    ) -> R;
}

pub trait FormalParameterSequenceVisitor<A, R> {
    fn visit_empty_formal_parameter_sequence(
        &mut self,
        sequence: &FormalParameterSequence,
        arg: A,
    ) -> R;

    fn visit_single_formal_parameter_sequence(
        &mut self,
        sequence: &FormalParameterSequence,
        parameter: &FormalParameter,
        arg: A,
    ) -> R;

    fn visit_multiple_formal_parameter_sequence(
        &mut self,
        sequence: &FormalParameterSequence,
        first: &FormalParameter,
        rest: &FormalParameterSequence,
        arg: A,
    ) -> R;
}

pub trait ActualParameterVisitor<A, R> {
    fn visit_const_actual_parameter(
        &mut self,
        parameter: &ActualParameter,
        value: &Expression,
        arg: A,
    ) -> R;

    fn visit_func_actual_parameter(
        &mut self,
        parameter: &ActualParameter,
        name: &Identifier,
        arg: A,
    ) -> R;

    fn visit_proc_actual_parameter(
        &mut self,
        parameter: &ActualParameter,
        name: &Identifier,
        arg: A,
    ) -> R;

    fn visit_var_actual_parameter(&mut self, parameter: &ActualParameter, vname: &Vname, arg: A)
        -> R;
}

pub trait ActualParameterSequenceVisitor<A, R> {
    fn visit_empty_actual_parameter_sequence(
        &mut self,
        sequence: &ActualParameterSequence,
        arg: A,
    ) -> R;

    fn visit_single_actual_parameter_sequence(
        &mut self,
        sequence: &ActualParameterSequence,
        parameter: &ActualParameter,
        arg: A,
    ) -> R;

    fn visit_multiple_actual_parameter_sequence(
        &mut self,
        sequence: &ActualParameterSequence,
        first: &ActualParameter,
        rest: &ActualParameterSequence,
        arg: A,
    ) -> R;
}

pub trait TypeDenoterVisitor<A, R> {
    fn visit_any_type_denoter(&mut self, denoter: &TypeDenoter, arg: A) -> R;

    fn visit_array_type_denoter(
        &mut self,
        denoter: &TypeDenoter,
        size: &IntegerLiteral,
        element: &TypeDenoter,
        arg: A,
    ) -> R;

    fn visit_bool_type_denoter(&mut self, denoter: &TypeDenoter, arg: A) -> R;
    fn visit_char_type_denoter(&mut self, denoter: &TypeDenoter, arg: A) -> R;
    fn visit_error_type_denoter(&mut self, denoter: &TypeDenoter, arg: A) -> R;
    fn visit_int_type_denoter(&mut self, denoter: &TypeDenoter, arg: A) -> R;

    fn visit_record_type_denoter(
        &mut self,
        denoter: &TypeDenoter,
        fields: &FieldTypeDenoter,
        arg: A,
    ) -> R;

    fn visit_simple_type_denoter(&mut self, denoter: &TypeDenoter, name: &Identifier, arg: A)
        -> R;
}

pub trait FieldTypeDenoterVisitor<A, R> {
    fn visit_single_field_type_denoter(
        &mut self,
        field: &FieldTypeDenoter,
        name: &Identifier,
        denoter: &TypeDenoter,
        arg: A,
    ) -> R;

    fn visit_multiple_field_type_denoter(
        &mut self,
        field: &FieldTypeDenoter,
        name: &Identifier,
        denoter: &TypeDenoter,
        rest: &FieldTypeDenoter,
        arg: A,
    ) -> R;
}

pub trait ArrayAggregateVisitor<A, R> {
    fn visit_single_array_aggregate(
        &mut self,
        aggregate: &ArrayAggregate,
        element: &Expression,
        arg: A,
    ) -> R;

    fn visit_multiple_array_aggregate(
        &mut self,
        aggregate: &ArrayAggregate,
        first: &Expression,
        rest: &ArrayAggregate,
        arg: A,
    ) -> R;
}

pub trait RecordAggregateVisitor<A, R> {
    fn visit_single_record_aggregate(
        &mut self,
        aggregate: &RecordAggregate,
        field: &Identifier,
        value: &Expression,
        arg: A,
    ) -> R;

    fn visit_multiple_record_aggregate(
        &mut self,
        aggregate: &RecordAggregate,
        field: &Identifier,
        value: &Expression,
        rest: &RecordAggregate,
        arg: A,
    ) -> R;
}

impl Program {
    pub fn accept<V, A, R>(&self, visitor: &mut V, arg: A) -> R
    where
        V: ProgramVisitor<A, R> + ?Sized,
    {
        visitor.visit_program(self, &self.command, arg)
    }
}

impl Command {
    pub fn accept<V, A, R>(&self, visitor: &mut V, arg: A) -> R
    where
        V: CommandVisitor<A, R> + ?Sized,
    {
        use CommandKind::*;

        match &self.kind {
            Assign { target, value } => visitor.visit_assign_command(self, target, value, arg),

            DoubleAssign {
                first,
                second,
                first_value,
                second_value,
            } => visitor.visit_double_assign_command(
                self,
                (first, second),
                (first_value, second_value),
                arg,
            ),

            Call { name, arguments } => visitor.visit_call_command(self, name, arguments, arg),
            Empty => visitor.visit_empty_command(self, arg),

            If {
                condition,
                then,
                otherwise,
            } => visitor.visit_if_command(self, condition, then, otherwise, arg),

            Let { declaration, body } => visitor.visit_let_command(self, declaration, body, arg),

            Sequential { first, second } => {
                visitor.visit_sequential_command(self, first, second, arg)
            }

            While { condition, body } => visitor.visit_while_command(self, condition, body, arg),

            LoopWhile {
                prelude,
                condition,
                body,
            } => visitor.visit_loop_while_command(self, prelude, condition, body, arg),
        }
    }
}

impl Expression {
    pub fn accept<V, A, R>(&self, visitor: &mut V, arg: A) -> R
    where
        V: ExpressionVisitor<A, R> + ?Sized,
    {
        use ExpressionKind::*;

        match &self.kind {
            Array(aggregate) => visitor.visit_array_expression(self, aggregate, arg),

            Binary {
                left,
                operator,
                right,
            } => visitor.visit_binary_expression(self, left, operator, right, arg),

            Call { name, arguments } => {
                visitor.visit_call_expression(self, name, arguments, arg)
            }

            Character(literal) => visitor.visit_character_expression(self, literal, arg),
            Empty => visitor.visit_empty_expression(self, arg),

            If {
                condition,
                then,
                otherwise,
            } => visitor.visit_if_expression(self, condition, then, otherwise, arg),

            Integer(literal) => visitor.visit_integer_expression(self, literal, arg),

            Let { declaration, body } => {
                visitor.visit_let_expression(self, declaration, body, arg)
            }

            Record(aggregate) => visitor.visit_record_expression(self, aggregate, arg),

            Unary { operator, operand } => {
                visitor.visit_unary_expression(self, operator, operand, arg)
            }

            Vname(vname) => visitor.visit_vname_expression(self, vname, arg),
        }
    }
}

impl Declaration {
    pub fn accept<V, A, R>(&self, visitor: &mut V, arg: A) -> R
    where
        V: DeclarationVisitor<A, R> + ?Sized,
    {
        use DeclarationKind::*;

        match &self.kind {
            BinaryOperator {
                operator,
                left,
                right,
                result,
            } => visitor.visit_binary_operator_declaration(
                self,
                operator,
                (left, right),
                result,
                arg,
            ),

            Const { name, value } => visitor.visit_const_declaration(self, name, value, arg),

            Func {
                name,
                parameters,
                result,
                body,
            } => visitor.visit_func_declaration(self, name, parameters, result, body, arg),

            Proc {
                name,
                parameters,
                body,
            } => visitor.visit_proc_declaration(self, name, parameters, body, arg),

            Sequential { first, second } => {
                visitor.visit_sequential_declaration(self, first, second, arg)
            }

            Type { name, denoter } => visitor.visit_type_declaration(self, name, denoter, arg),

            UnaryOperator {
                operator,
                operand,
                result,
            } => visitor.visit_unary_operator_declaration(self, operator, operand, result, arg),

            Var { name, denoter } => visitor.visit_var_declaration(self, name, denoter, arg),
        }
    }
}

impl Vname {
    pub fn accept<V, A, R>(&self, visitor: &mut V, arg: A) -> R
    where
        V: VnameVisitor<A, R> + ?Sized,
    {
        match &self.kind {
            VnameKind::Dot { record, field } => visitor.visit_dot_vname(self, record, field, arg),
            VnameKind::Simple(name) => visitor.visit_simple_vname(self, name, arg),
            VnameKind::Subscript { array, index } => {
                visitor.visit_subscript_vname(self, array, index, arg)
            }
        }
    }
}

impl FormalParameter {
    pub fn accept<V, A, R>(&self, visitor: &mut V, arg: A) -> R
    where
        V: FormalParameterVisitor<A, R> + ?Sized,
    {
        use FormalParameterKind::*;

        match &self.kind {
            Const { name, denoter } => {
                visitor.visit_const_formal_parameter(self, name, denoter, arg)
            }

            Func {
                name,
                parameters,
                result,
            } => visitor.visit_func_formal_parameter(self, name, parameters, result, arg),

            Proc { name, parameters } => {
                visitor.visit_proc_formal_parameter(self, name, parameters, arg)
            }

            Var { name, denoter } => visitor.visit_var_formal_parameter(self, name, denoter, arg),
        }
    }
}

impl FormalParameterSequence {
    pub fn accept<V, A, R>(&self, visitor: &mut V, arg: A) -> R
    where
        V: FormalParameterSequenceVisitor<A, R> + ?Sized,
    {
        use FormalParameterSequenceKind::*;

        match &self.kind {
            Empty => visitor.visit_empty_formal_parameter_sequence(self, arg),
            Single(parameter) => visitor.visit_single_formal_parameter_sequence(self, parameter, arg),
            Multiple { first, rest } => {
                visitor.visit_multiple_formal_parameter_sequence(self, first, rest, arg)
            }
        }
    }
}

impl ActualParameter {
    pub fn accept<V, A, R>(&self, visitor: &mut V, arg: A) -> R
    where
        V: ActualParameterVisitor<A, R> + ?Sized,
    {
        use ActualParameterKind::*;

        match &self.kind {
            Const(value) => visitor.visit_const_actual_parameter(self, value, arg),
            Func(name) => visitor.visit_func_actual_parameter(self, name, arg),
            Proc(name) => visitor.visit_proc_actual_parameter(self, name, arg),
            Var(vname) => visitor.visit_var_actual_parameter(self, vname, arg),
        }
    }
}

impl ActualParameterSequence {
    pub fn accept<V, A, R>(&self, visitor: &mut V, arg: A) -> R
    where
        V: ActualParameterSequenceVisitor<A, R> + ?Sized,
    {
        use ActualParameterSequenceKind::*;

        match &self.kind {
            Empty => visitor.visit_empty_actual_parameter_sequence(self, arg),
            Single(parameter) => visitor.visit_single_actual_parameter_sequence(self, parameter, arg),
            Multiple { first, rest } => {
                visitor.visit_multiple_actual_parameter_sequence(self, first, rest, arg)
            }
        }
    }
}

impl TypeDenoter {
    pub fn accept<V, A, R>(&self, visitor: &mut V, arg: A) -> R
    where
        V: TypeDenoterVisitor<A, R> + ?Sized,
    {
        use TypeDenoterKind::*;

        match &self.kind {
            Any => visitor.visit_any_type_denoter(self, arg),
            Array { size, element } => visitor.visit_array_type_denoter(self, size, element, arg),
            Bool => visitor.visit_bool_type_denoter(self, arg),
            Char => visitor.visit_char_type_denoter(self, arg),
            Error => visitor.visit_error_type_denoter(self, arg),
            Int => visitor.visit_int_type_denoter(self, arg),
            Record(fields) => visitor.visit_record_type_denoter(self, fields, arg),
            Simple(name) => visitor.visit_simple_type_denoter(self, name, arg),
        }
    }
}

impl FieldTypeDenoter {
    pub fn accept<V, A, R>(&self, visitor: &mut V, arg: A) -> R
    where
        V: FieldTypeDenoterVisitor<A, R> + ?Sized,
    {
        match &self.kind {
            FieldTypeDenoterKind::Single { name, denoter } => {
                visitor.visit_single_field_type_denoter(self, name, denoter, arg)
            }

            FieldTypeDenoterKind::Multiple {
                name,
                denoter,
                rest,
            } => visitor.visit_multiple_field_type_denoter(self, name, denoter, rest, arg),
        }
    }
}

impl ArrayAggregate {
    pub fn accept<V, A, R>(&self, visitor: &mut V, arg: A) -> R
    where
        V: ArrayAggregateVisitor<A, R> + ?Sized,
    {
        match &self.kind {
            ArrayAggregateKind::Single(element) => {
                visitor.visit_single_array_aggregate(self, element, arg)
            }

            ArrayAggregateKind::Multiple { first, rest } => {
                visitor.visit_multiple_array_aggregate(self, first, rest, arg)
            }
        }
    }
}

impl RecordAggregate {
    pub fn accept<V, A, R>(&self, visitor: &mut V, arg: A) -> R
    where
        V: RecordAggregateVisitor<A, R> + ?Sized,
    {
        match &self.kind {
            RecordAggregateKind::Single { field, value } => {
                visitor.visit_single_record_aggregate(self, field, value, arg)
            }

            RecordAggregateKind::Multiple { field, value, rest } => {
                visitor.visit_multiple_record_aggregate(self, field, value, rest, arg)
            }
        }
    }
}
