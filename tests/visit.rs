use std::{collections::HashSet, fs, path::Path};

use triangle::{
    ast::{visit::*, *},
    error::Reporter,
    parse::parse,
    source::Source,
};

/// Anota cada nodo alcanzado, terminales incluidos.
#[derive(Default)]
struct NodeCounter {
    visited: Vec<NodeId>,
}

impl NodeCounter {
    fn node(&mut self, id: NodeId) {
        self.visited.push(id);
    }

    fn terminal(&mut self, terminal: &Terminal) {
        self.visited.push(terminal.id);
    }
}

impl ProgramVisitor<(), ()> for NodeCounter {
    fn visit_program(&mut self, program: &Program, command: &Command, _: ()) {
        self.node(program.id);
        command.accept(self, ());
    }
}

impl CommandVisitor<(), ()> for NodeCounter {
    fn visit_assign_command(&mut self, command: &Command, target: &Vname, value: &Expression, _: ()) {
        self.node(command.id);
        target.accept(self, ());
        value.accept(self, ());
    }

    fn visit_double_assign_command(
        &mut self,
        command: &Command,
        (first, second): (&Vname, &Vname),
        (first_value, second_value): (&Expression, &Expression),
        _: (),
    ) {
        self.node(command.id);
        first.accept(self, ());
        second.accept(self, ());
        first_value.accept(self, ());
        second_value.accept(self, ());
    }

    fn visit_call_command(
        &mut self,
        command: &Command,
        name: &Identifier,
        arguments: &ActualParameterSequence,
        _: (),
    ) {
        self.node(command.id);
        self.terminal(name);
        arguments.accept(self, ());
    }

    fn visit_empty_command(&mut self, command: &Command, _: ()) {
        self.node(command.id);
    }

    fn visit_if_command(
        &mut self,
        command: &Command,
        condition: &Expression,
        then: &Command,
        otherwise: &Command,
        _: (),
    ) {
        self.node(command.id);
        condition.accept(self, ());
        then.accept(self, ());
        otherwise.accept(self, ());
    }

    fn visit_let_command(&mut self, command: &Command, declaration: &Declaration, body: &Command, _: ()) {
        self.node(command.id);
        declaration.accept(self, ());
        body.accept(self, ());
    }

    fn visit_sequential_command(&mut self, command: &Command, first: &Command, second: &Command, _: ()) {
        self.node(command.id);
        first.accept(self, ());
        second.accept(self, ());
    }

    fn visit_while_command(&mut self, command: &Command, condition: &Expression, body: &Command, _: ()) {
        self.node(command.id);
        condition.accept(self, ());
        body.accept(self, ());
    }

    fn visit_loop_while_command(
        &mut self,
        command: &Command,
        prelude: &Command,
        condition: &Expression,
        body: &Command,
        _: (),
    ) {
        self.node(command.id);
        prelude.accept(self, ());
        condition.accept(self, ());
        body.accept(self, ());
    }
}

impl ExpressionVisitor<(), ()> for NodeCounter {
    fn visit_array_expression(&mut self, expression: &Expression, aggregate: &ArrayAggregate, _: ()) {
        self.node(expression.id);
        aggregate.accept(self, ());
    }

    fn visit_binary_expression(
        &mut self,
        expression: &Expression,
        left: &Expression,
        operator: &Operator,
        right: &Expression,
        _: (),
    ) {
        self.node(expression.id);
        left.accept(self, ());
        self.terminal(operator);
        right.accept(self, ());
    }

    fn visit_call_expression(
        &mut self,
        expression: &Expression,
        name: &Identifier,
        arguments: &ActualParameterSequence,
        _: (),
    ) {
        self.node(expression.id);
        self.terminal(name);
        arguments.accept(self, ());
    }

    fn visit_character_expression(&mut self, expression: &Expression, literal: &CharacterLiteral, _: ()) {
        self.node(expression.id);
        self.terminal(literal);
    }

    fn visit_empty_expression(&mut self, expression: &Expression, _: ()) {
        self.node(expression.id);
    }

    fn visit_if_expression(
        &mut self,
        expression: &Expression,
        condition: &Expression,
        then: &Expression,
        otherwise: &Expression,
        _: (),
    ) {
        self.node(expression.id);
        condition.accept(self, ());
        then.accept(self, ());
        otherwise.accept(self, ());
    }

    fn visit_integer_expression(&mut self, expression: &Expression, literal: &IntegerLiteral, _: ()) {
        self.node(expression.id);
        self.terminal(literal);
    }

    fn visit_let_expression(
        &mut self,
        expression: &Expression,
        declaration: &Declaration,
        body: &Expression,
        _: (),
    ) {
        self.node(expression.id);
        declaration.accept(self, ());
        body.accept(self, ());
    }

    fn visit_record_expression(&mut self, expression: &Expression, aggregate: &RecordAggregate, _: ()) {
        self.node(expression.id);
        aggregate.accept(self, ());
    }

    fn visit_unary_expression(
        &mut self,
        expression: &Expression,
        operator: &Operator,
        operand: &Expression,
        _: (),
    ) {
        self.node(expression.id);
        self.terminal(operator);
        operand.accept(self, ());
    }

    fn visit_vname_expression(&mut self, expression: &Expression, vname: &Vname, _: ()) {
        self.node(expression.id);
        vname.accept(self, ());
    }
}

impl DeclarationVisitor<(), ()> for NodeCounter {
    fn visit_binary_operator_declaration(
        &mut self,
        declaration: &Declaration,
        operator: &Operator,
        (left, right): (&TypeDenoter, &TypeDenoter),
        result: &TypeDenoter,
        _: (),
    ) {
        self.node(declaration.id);
        self.terminal(operator);
        left.accept(self, ());
        right.accept(self, ());
        result.accept(self, ());
    }

    fn visit_const_declaration(&mut self, declaration: &Declaration, name: &Identifier, value: &Expression, _: ()) {
        self.node(declaration.id);
        self.terminal(name);
        value.accept(self, ());
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
        self.node(declaration.id);
        self.terminal(name);
        parameters.accept(self, ());
        result.accept(self, ());
        body.accept(self, ());
    }

    fn visit_proc_declaration(
        &mut self,
        declaration: &Declaration,
        name: &Identifier,
        parameters: &FormalParameterSequence,
        body: &Command,
        _: (),
    ) {
        self.node(declaration.id);
        self.terminal(name);
        parameters.accept(self, ());
        body.accept(self, ());
    }

    fn visit_sequential_declaration(
        &mut self,
        declaration: &Declaration,
        first: &Declaration,
        second: &Declaration,
        _: (),
    ) {
        self.node(declaration.id);
        first.accept(self, ());
        second.accept(self, ());
    }

    fn visit_type_declaration(&mut self, declaration: &Declaration, name: &Identifier, denoter: &TypeDenoter, _: ()) {
        self.node(declaration.id);
        self.terminal(name);
        denoter.accept(self, ());
    }

    fn visit_unary_operator_declaration(
        &mut self,
        declaration: &Declaration,
        operator: &Operator,
        operand: &TypeDenoter,
        result: &TypeDenoter,
        _: (),
    ) {
        self.node(declaration.id);
        self.terminal(operator);
        operand.accept(self, ());
        result.accept(self, ());
    }

    fn visit_var_declaration(&mut self, declaration: &Declaration, name: &Identifier, denoter: &TypeDenoter, _: ()) {
        self.node(declaration.id);
        self.terminal(name);
        denoter.accept(self, ());
    }
}

impl VnameVisitor<(), ()> for NodeCounter {
    fn visit_dot_vname(&mut self, vname: &Vname, record: &Vname, field: &Identifier, _: ()) {
        self.node(vname.id);
        record.accept(self, ());
        self.terminal(field);
    }

    fn visit_simple_vname(&mut self, vname: &Vname, name: &Identifier, _: ()) {
        self.node(vname.id);
        self.terminal(name);
    }

    fn visit_subscript_vname(&mut self, vname: &Vname, array: &Vname, index: &Expression, _: ()) {
        self.node(vname.id);
        array.accept(self, ());
        index.accept(self, ());
    }
}

impl FormalParameterVisitor<(), ()> for NodeCounter {
    fn visit_const_formal_parameter(
        &mut self,
        parameter: &FormalParameter,
        name: &Identifier,
        denoter: &TypeDenoter,
        _: (),
    ) {
        self.node(parameter.id);
        self.terminal(name);
        denoter.accept(self, ());
    }

    fn visit_func_formal_parameter(
        &mut self,
        parameter: &FormalParameter,
        name: &Identifier,
        parameters: &FormalParameterSequence,
        result: &TypeDenoter,
        _: (),
    ) {
        self.node(parameter.id);
        self.terminal(name);
        parameters.accept(self, ());
        result.accept(self, ());
    }

    fn visit_proc_formal_parameter(
        &mut self,
        parameter: &FormalParameter,
        name: &Identifier,
        parameters: &FormalParameterSequence,
        _: (),
    ) {
        self.node(parameter.id);
        self.terminal(name);
        parameters.accept(self, ());
    }

    fn visit_var_formal_parameter(
        &mut self,
        parameter: &FormalParameter,
        name: &Identifier,
        denoter: &TypeDenoter,
        _: (),
    ) {
        self.node(parameter.id);
        self.terminal(name);
        denoter.accept(self, ());
    }
}

impl FormalParameterSequenceVisitor<(), ()> for NodeCounter {
    fn visit_empty_formal_parameter_sequence(&mut self, sequence: &FormalParameterSequence, _: ()) {
        self.node(sequence.id);
    }

    fn visit_single_formal_parameter_sequence(
        &mut self,
        sequence: &FormalParameterSequence,
        parameter: &FormalParameter,
        _: (),
    ) {
        self.node(sequence.id);
        parameter.accept(self, ());
    }

    fn visit_multiple_formal_parameter_sequence(
        &mut self,
        sequence: &FormalParameterSequence,
        first: &FormalParameter,
        rest: &FormalParameterSequence,
        _: (),
    ) {
        self.node(sequence.id);
        first.accept(self, ());
        rest.accept(self, ());
    }
}

impl ActualParameterVisitor<(), ()> for NodeCounter {
    fn visit_const_actual_parameter(&mut self, parameter: &ActualParameter, value: &Expression, _: ()) {
        self.node(parameter.id);
        value.accept(self, ());
    }

    fn visit_func_actual_parameter(&mut self, parameter: &ActualParameter, name: &Identifier, _: ()) {
        self.node(parameter.id);
        self.terminal(name);
    }

    fn visit_proc_actual_parameter(&mut self, parameter: &ActualParameter, name: &Identifier, _: ()) {
        self.node(parameter.id);
        self.terminal(name);
    }

    fn visit_var_actual_parameter(&mut self, parameter: &ActualParameter, vname: &Vname, _: ()) {
        self.node(parameter.id);
        vname.accept(self, ());
    }
}

impl ActualParameterSequenceVisitor<(), ()> for NodeCounter {
    fn visit_empty_actual_parameter_sequence(&mut self, sequence: &ActualParameterSequence, _: ()) {
        self.node(sequence.id);
    }

    fn visit_single_actual_parameter_sequence(
        &mut self,
        sequence: &ActualParameterSequence,
        parameter: &ActualParameter,
        _: (),
    ) {
        self.node(sequence.id);
        parameter.accept(self, ());
    }

    fn visit_multiple_actual_parameter_sequence(
        &mut self,
        sequence: &ActualParameterSequence,
        first: &ActualParameter,
        rest: &ActualParameterSequence,
        _: (),
    ) {
        self.node(sequence.id);
        first.accept(self, ());
        rest.accept(self, ());
    }
}

impl TypeDenoterVisitor<(), ()> for NodeCounter {
    fn visit_any_type_denoter(&mut self, denoter: &TypeDenoter, _: ()) {
        self.node(denoter.id);
    }

    fn visit_array_type_denoter(
        &mut self,
        denoter: &TypeDenoter,
        size: &IntegerLiteral,
        element: &TypeDenoter,
        _: (),
    ) {
        self.node(denoter.id);
        self.terminal(size);
        element.accept(self, ());
    }

    fn visit_bool_type_denoter(&mut self, denoter: &TypeDenoter, _: ()) {
        self.node(denoter.id);
    }

    fn visit_char_type_denoter(&mut self, denoter: &TypeDenoter, _: ()) {
        self.node(denoter.id);
    }

    fn visit_error_type_denoter(&mut self, denoter: &TypeDenoter, _: ()) {
        self.node(denoter.id);
    }

    fn visit_int_type_denoter(&mut self, denoter: &TypeDenoter, _: ()) {
        self.node(denoter.id);
    }

    fn visit_record_type_denoter(&mut self, denoter: &TypeDenoter, fields: &FieldTypeDenoter, _: ()) {
        self.node(denoter.id);
        fields.accept(self, ());
    }

    fn visit_simple_type_denoter(&mut self, denoter: &TypeDenoter, name: &Identifier, _: ()) {
        self.node(denoter.id);
        self.terminal(name);
    }
}

impl FieldTypeDenoterVisitor<(), ()> for NodeCounter {
    fn visit_single_field_type_denoter(
        &mut self,
        field: &FieldTypeDenoter,
        name: &Identifier,
        denoter: &TypeDenoter,
        _: (),
    ) {
        self.node(field.id);
        self.terminal(name);
        denoter.accept(self, ());
    }

    fn visit_multiple_field_type_denoter(
        &mut self,
        field: &FieldTypeDenoter,
        name: &Identifier,
        denoter: &TypeDenoter,
        rest: &FieldTypeDenoter,
        _: (),
    ) {
        self.node(field.id);
        self.terminal(name);
        denoter.accept(self, ());
        rest.accept(self, ());
    }
}

impl ArrayAggregateVisitor<(), ()> for NodeCounter {
    fn visit_single_array_aggregate(&mut self, aggregate: &ArrayAggregate, element: &Expression, _: ()) {
        self.node(aggregate.id);
        element.accept(self, ());
    }

    fn visit_multiple_array_aggregate(
        &mut self,
        aggregate: &ArrayAggregate,
        first: &Expression,
        rest: &ArrayAggregate,
        _: (),
    ) {
        self.node(aggregate.id);
        first.accept(self, ());
        rest.accept(self, ());
    }
}

impl RecordAggregateVisitor<(), ()> for NodeCounter {
    fn visit_single_record_aggregate(
        &mut self,
        aggregate: &RecordAggregate,
        field: &Identifier,
        value: &Expression,
        _: (),
    ) {
        self.node(aggregate.id);
        self.terminal(field);
        value.accept(self, ());
    }

    fn visit_multiple_record_aggregate(
        &mut self,
        aggregate: &RecordAggregate,
        field: &Identifier,
        value: &Expression,
        rest: &RecordAggregate,
        _: (),
    ) {
        self.node(aggregate.id);
        self.terminal(field);
        value.accept(self, ());
        rest.accept(self, ());
    }
}

#[test]
fn every_node_is_visited_exactly_once() {
    let directory = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/programs");

    let mut checked = 0;
    for entry in fs::read_dir(directory).unwrap() {
        let path = entry.unwrap().path();
        if path.extension().map_or(true, |extension| extension != "tri") {
            continue;
        }

        let source = Source::load(&path).unwrap();
        let mut reporter = Reporter::default();
        let program = parse(&source, &mut reporter);
        assert_eq!(reporter.errors(), 0, "{}", reporter);

        let mut counter = NodeCounter::default();
        program.accept(&mut counter, ());

        let distinct: HashSet<_> = counter.visited.iter().copied().collect();
        assert_eq!(distinct.len(), counter.visited.len(), "{}", path.display());
        assert_eq!(
            counter.visited.len(),
            program.ids.issued() as usize,
            "{}",
            path.display()
        );

        checked += 1;
    }

    assert!(checked >= 6);
}
