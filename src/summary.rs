//! Estadísticas de un árbol.
//!
//! Cuenta expresiones literales de carácter y de entero. No modifica el
//! árbol ni consulta anotaciones, por lo cual puede correr justo después
//! del análisis sintáctico.

use std::fmt::{self, Display};

use crate::ast::{visit::*, *};

#[derive(Debug, Default)]
pub struct SummaryVisitor {
    characters: usize,
    integers: usize,
}

impl SummaryVisitor {
    pub fn new() -> Self {
        SummaryVisitor::default()
    }

    /// Recorre un programa completo.
    pub fn summarize(program: &Program) -> Self {
        let mut visitor = SummaryVisitor::new();
        program.accept(&mut visitor, ());

        visitor
    }

    pub fn characters(&self) -> usize {
        self.characters
    }

    pub fn integers(&self) -> usize {
        self.integers
    }
}

impl Display for SummaryVisitor {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(fmt, "Summary statistics:")?;
        writeln!(fmt, "Character expressions: {}", self.characters)?;
        writeln!(fmt, "Integer expressions: {}", self.integers)
    }
}

impl ProgramVisitor<(), ()> for SummaryVisitor {
    fn visit_program(&mut self, _: &Program, command: &Command, _: ()) {
        command.accept(self, ());
    }
}

impl CommandVisitor<(), ()> for SummaryVisitor {
    fn visit_assign_command(&mut self, _: &Command, target: &Vname, value: &Expression, _: ()) {
        target.accept(self, ());
        value.accept(self, ());
    }

    fn visit_double_assign_command(
        &mut self,
        _: &Command,
        (first, second): (&Vname, &Vname),
        (first_value, second_value): (&Expression, &Expression),
        _: (),
    ) {
        first.accept(self, ());
        second.accept(self, ());
        first_value.accept(self, ());
        second_value.accept(self, ());
    }

    fn visit_call_command(
        &mut self,
        _: &Command,
        _: &Identifier,
        arguments: &ActualParameterSequence,
        _: (),
    ) {
        arguments.accept(self, ());
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
        condition.accept(self, ());
        then.accept(self, ());
        otherwise.accept(self, ());
    }

    fn visit_let_command(&mut self, _: &Command, declaration: &Declaration, body: &Command, _: ()) {
        declaration.accept(self, ());
        body.accept(self, ());
    }

    fn visit_sequential_command(&mut self, _: &Command, first: &Command, second: &Command, _: ()) {
        first.accept(self, ());
        second.accept(self, ());
    }

    fn visit_while_command(&mut self, _: &Command, condition: &Expression, body: &Command, _: ()) {
        condition.accept(self, ());
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
        condition.accept(self, ());
        body.accept(self, ());
    }
}

impl ExpressionVisitor<(), ()> for SummaryVisitor {
    fn visit_array_expression(&mut self, _: &Expression, aggregate: &ArrayAggregate, _: ()) {
        aggregate.accept(self, ());
    }

    fn visit_binary_expression(
        &mut self,
        _: &Expression,
        left: &Expression,
        _: &Operator,
        right: &Expression,
        _: (),
    ) {
        left.accept(self, ());
        right.accept(self, ());
    }

    fn visit_call_expression(
        &mut self,
        _: &Expression,
        _: &Identifier,
        arguments: &ActualParameterSequence,
        _: (),
    ) {
        arguments.accept(self, ());
    }

    fn visit_character_expression(&mut self, _: &Expression, _: &CharacterLiteral, _: ()) {
        self.characters += 1;
    }

    fn visit_empty_expression(&mut self, _: &Expression, _: ()) {}

    fn visit_if_expression(
        &mut self,
        _: &Expression,
        condition: &Expression,
        then: &Expression,
        otherwise: &Expression,
        _: (),
    ) {
        condition.accept(self, ());
        then.accept(self, ());
        otherwise.accept(self, ());
    }

    fn visit_integer_expression(&mut self, _: &Expression, _: &IntegerLiteral, _: ()) {
        self.integers += 1;
    }

    fn visit_let_expression(
        &mut self,
        _: &Expression,
        declaration: &Declaration,
        body: &Expression,
        _: (),
    ) {
        declaration.accept(self, ());
        body.accept(self, ());
    }

    fn visit_record_expression(&mut self, _: &Expression, aggregate: &RecordAggregate, _: ()) {
        aggregate.accept(self, ());
    }

    fn visit_unary_expression(&mut self, _: &Expression, _: &Operator, operand: &Expression, _: ()) {
        operand.accept(self, ());
    }

    fn visit_vname_expression(&mut self, _: &Expression, vname: &Vname, _: ()) {
        vname.accept(self, ());
    }
}

// Los denotadores de tipo y los parámetros formales no contienen expresiones
impl DeclarationVisitor<(), ()> for SummaryVisitor {
    fn visit_binary_operator_declaration(
        &mut self,
        _: &Declaration,
        _: &Operator,
        _: (&TypeDenoter, &TypeDenoter),
        _: &TypeDenoter,
        _: (),
    ) {
    }

    fn visit_const_declaration(&mut self, _: &Declaration, _: &Identifier, value: &Expression, _: ()) {
        value.accept(self, ());
    }

    fn visit_func_declaration(
        &mut self,
        _: &Declaration,
        _: &Identifier,
        _: &FormalParameterSequence,
        _: &TypeDenoter,
        body: &Expression,
        _: (),
    ) {
        body.accept(self, ());
    }

    fn visit_proc_declaration(
        &mut self,
        _: &Declaration,
        _: &Identifier,
        _: &FormalParameterSequence,
        body: &Command,
        _: (),
    ) {
        body.accept(self, ());
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

    fn visit_type_declaration(&mut self, _: &Declaration, _: &Identifier, _: &TypeDenoter, _: ()) {}

    fn visit_unary_operator_declaration(
        &mut self,
        _: &Declaration,
        _: &Operator,
        _: &TypeDenoter,
        _: &TypeDenoter,
        _: (),
    ) {
    }

    fn visit_var_declaration(&mut self, _: &Declaration, _: &Identifier, _: &TypeDenoter, _: ()) {}
}

impl VnameVisitor<(), ()> for SummaryVisitor {
    fn visit_dot_vname(&mut self, _: &Vname, record: &Vname, _: &Identifier, _: ()) {
        record.accept(self, ());
    }

    fn visit_simple_vname(&mut self, _: &Vname, _: &Identifier, _: ()) {}

    fn visit_subscript_vname(&mut self, _: &Vname, array: &Vname, index: &Expression, _: ()) {
        array.accept(self, ());
        index.accept(self, ());
    }
}

impl ActualParameterVisitor<(), ()> for SummaryVisitor {
    fn visit_const_actual_parameter(&mut self, _: &ActualParameter, value: &Expression, _: ()) {
        value.accept(self, ());
    }

    fn visit_func_actual_parameter(&mut self, _: &ActualParameter, _: &Identifier, _: ()) {}

    fn visit_proc_actual_parameter(&mut self, _: &ActualParameter, _: &Identifier, _: ()) {}

    fn visit_var_actual_parameter(&mut self, _: &ActualParameter, vname: &Vname, _: ()) {
        vname.accept(self, ());
    }
}

impl ActualParameterSequenceVisitor<(), ()> for SummaryVisitor {
    fn visit_empty_actual_parameter_sequence(&mut self, _: &ActualParameterSequence, _: ()) {}

    fn visit_single_actual_parameter_sequence(
        &mut self,
        _: &ActualParameterSequence,
        parameter: &ActualParameter,
        _: (),
    ) {
        parameter.accept(self, ());
    }

    fn visit_multiple_actual_parameter_sequence(
        &mut self,
        _: &ActualParameterSequence,
        first: &ActualParameter,
        rest: &ActualParameterSequence,
        _: (),
    ) {
        first.accept(self, ());
        rest.accept(self, ());
    }
}

impl ArrayAggregateVisitor<(), ()> for SummaryVisitor {
    fn visit_single_array_aggregate(&mut self, _: &ArrayAggregate, element: &Expression, _: ()) {
        element.accept(self, ());
    }

    fn visit_multiple_array_aggregate(
        &mut self,
        _: &ArrayAggregate,
        first: &Expression,
        rest: &ArrayAggregate,
        _: (),
    ) {
        first.accept(self, ());
        rest.accept(self, ());
    }
}

impl RecordAggregateVisitor<(), ()> for SummaryVisitor {
    fn visit_single_record_aggregate(
        &mut self,
        _: &RecordAggregate,
        _: &Identifier,
        value: &Expression,
        _: (),
    ) {
        value.accept(self, ());
    }

    fn visit_multiple_record_aggregate(
        &mut self,
        _: &RecordAggregate,
        _: &Identifier,
        value: &Expression,
        rest: &RecordAggregate,
        _: (),
    ) {
        value.accept(self, ());
        rest.accept(self, ());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::Reporter, parse::parse, source::Source};

    fn summarize(text: &str) -> SummaryVisitor {
        let source = Source::new("test.tri", text);
        let mut reporter = Reporter::default();

        let program = parse(&source, &mut reporter);
        assert_eq!(reporter.errors(), 0, "{}", reporter);

        SummaryVisitor::summarize(&program)
    }

    #[test]
    fn counts_literal_expressions_everywhere() {
        let found = summarize(
            "let
                const c ~ 'x';
                var a: array 2 of Integer;
                func f(n: Integer): Integer ~ n + 1
             in begin
                a := [f(2), 3];
                a[0] := let const k ~ 4 in k;
                if c = 'y' then put('z') else putint(a[5])
             end",
        );

        assert_eq!(found.characters(), 3);
        assert_eq!(found.integers(), 6);
    }

    #[test]
    fn report_format() {
        let found = summarize("put('a')");
        assert_eq!(
            found.to_string(),
            "Summary statistics:\nCharacter expressions: 1\nInteger expressions: 0\n"
        );
    }
}
