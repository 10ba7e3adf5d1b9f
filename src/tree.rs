//! Representación textual del árbol.
//!
//! Cada nodo ocupa una línea, indentada según su profundidad. Si se
//! dispone de anotaciones, las expresiones y V-names muestran su tipo.

use std::fmt::Display;

use crate::{
    ast::{visit::*, *},
    semantic::Annotations,
};

pub struct TreePrinter<'a> {
    annotations: Option<&'a Annotations>,
    output: String,
}

/// Dibuja un programa completo.
pub fn render(program: &Program, annotations: Option<&Annotations>) -> String {
    let mut printer = TreePrinter::new(annotations);
    program.accept(&mut printer, 0);

    printer.finish()
}

impl<'a> TreePrinter<'a> {
    pub fn new(annotations: Option<&'a Annotations>) -> Self {
        TreePrinter {
            annotations,
            output: String::new(),
        }
    }

    pub fn finish(self) -> String {
        self.output
    }

    fn line<L: Display>(&mut self, depth: usize, label: L) {
        self.output
            .push_str(&format!("{:indent$}{}\n", "", label, indent = 2 * depth));
    }

    fn typed(&mut self, depth: usize, label: &str, id: NodeId) {
        match self.annotations.and_then(|annotations| annotations.type_of(id)) {
            Some(of) => self.line(depth, format_args!("{} : {}", label, of)),
            None => self.line(depth, label),
        }
    }

    fn terminal(&mut self, depth: usize, label: &str, terminal: &Terminal) {
        self.line(depth, format_args!("{} {}", label, terminal.spelling));
    }
}

impl ProgramVisitor<usize, ()> for TreePrinter<'_> {
    fn visit_program(&mut self, _: &Program, command: &Command, depth: usize) {
        self.line(depth, "Program");
        command.accept(self, depth + 1);
    }
}

impl CommandVisitor<usize, ()> for TreePrinter<'_> {
    fn visit_assign_command(&mut self, _: &Command, target: &Vname, value: &Expression, depth: usize) {
        self.line(depth, "AssignCommand");
        target.accept(self, depth + 1);
        value.accept(self, depth + 1);
    }

    fn visit_double_assign_command(
        &mut self,
        _: &Command,
        (first, second): (&Vname, &Vname),
        (first_value, second_value): (&Expression, &Expression),
        depth: usize,
    ) {
        self.line(depth, "DoubleAssignCommand");
        first.accept(self, depth + 1);
        second.accept(self, depth + 1);
        first_value.accept(self, depth + 1);
        second_value.accept(self, depth + 1);
    }

    fn visit_call_command(
        &mut self,
        _: &Command,
        name: &Identifier,
        arguments: &ActualParameterSequence,
        depth: usize,
    ) {
        self.line(depth, "CallCommand");
        self.terminal(depth + 1, "Identifier", name);
        arguments.accept(self, depth + 1);
    }

    fn visit_empty_command(&mut self, _: &Command, depth: usize) {
        self.line(depth, "EmptyCommand");
    }

    fn visit_if_command(
        &mut self,
        _: &Command,
        condition: &Expression,
        then: &Command,
        otherwise: &Command,
        depth: usize,
    ) {
        self.line(depth, "IfCommand");
        condition.accept(self, depth + 1);
        then.accept(self, depth + 1);
        otherwise.accept(self, depth + 1);
    }

    fn visit_let_command(&mut self, _: &Command, declaration: &Declaration, body: &Command, depth: usize) {
        self.line(depth, "LetCommand");
        declaration.accept(self, depth + 1);
        body.accept(self, depth + 1);
    }

    fn visit_sequential_command(&mut self, _: &Command, first: &Command, second: &Command, depth: usize) {
        self.line(depth, "SequentialCommand");
        first.accept(self, depth + 1);
        second.accept(self, depth + 1);
    }

    fn visit_while_command(&mut self, _: &Command, condition: &Expression, body: &Command, depth: usize) {
        self.line(depth, "WhileCommand");
        condition.accept(self, depth + 1);
        body.accept(self, depth + 1);
    }

    fn visit_loop_while_command(
        &mut self,
        _: &Command,
        prelude: &Command,
        condition: &Expression,
        body: &Command,
        depth: usize,
    ) {
        self.line(depth, "LoopWhileCommand");
        prelude.accept(self, depth + 1);
        condition.accept(self, depth + 1);
        body.accept(self, depth + 1);
    }
}

impl ExpressionVisitor<usize, ()> for TreePrinter<'_> {
    fn visit_array_expression(&mut self, expression: &Expression, aggregate: &ArrayAggregate, depth: usize) {
        self.typed(depth, "ArrayExpression", expression.id);
        aggregate.accept(self, depth + 1);
    }

    fn visit_binary_expression(
        &mut self,
        expression: &Expression,
        left: &Expression,
        operator: &Operator,
        right: &Expression,
        depth: usize,
    ) {
        self.typed(depth, "BinaryExpression", expression.id);
        left.accept(self, depth + 1);
        self.terminal(depth + 1, "Operator", operator);
        right.accept(self, depth + 1);
    }

    fn visit_call_expression(
        &mut self,
        expression: &Expression,
        name: &Identifier,
        arguments: &ActualParameterSequence,
        depth: usize,
    ) {
        self.typed(depth, "CallExpression", expression.id);
        self.terminal(depth + 1, "Identifier", name);
        arguments.accept(self, depth + 1);
    }

    fn visit_character_expression(&mut self, expression: &Expression, literal: &CharacterLiteral, depth: usize) {
        self.typed(depth, "CharacterExpression", expression.id);
        self.terminal(depth + 1, "CharacterLiteral", literal);
    }

    fn visit_empty_expression(&mut self, _: &Expression, depth: usize) {
        self.line(depth, "EmptyExpression");
    }

    fn visit_if_expression(
        &mut self,
        expression: &Expression,
        condition: &Expression,
        then: &Expression,
        otherwise: &Expression,
        depth: usize,
    ) {
        self.typed(depth, "IfExpression", expression.id);
        condition.accept(self, depth + 1);
        then.accept(self, depth + 1);
        otherwise.accept(self, depth + 1);
    }

    fn visit_integer_expression(&mut self, expression: &Expression, literal: &IntegerLiteral, depth: usize) {
        self.typed(depth, "IntegerExpression", expression.id);
        self.terminal(depth + 1, "IntegerLiteral", literal);
    }

    fn visit_let_expression(
        &mut self,
        expression: &Expression,
        declaration: &Declaration,
        body: &Expression,
        depth: usize,
    ) {
        self.typed(depth, "LetExpression", expression.id);
        declaration.accept(self, depth + 1);
        body.accept(self, depth + 1);
    }

    fn visit_record_expression(&mut self, expression: &Expression, aggregate: &RecordAggregate, depth: usize) {
        self.typed(depth, "RecordExpression", expression.id);
        aggregate.accept(self, depth + 1);
    }

    fn visit_unary_expression(
        &mut self,
        expression: &Expression,
        operator: &Operator,
        operand: &Expression,
        depth: usize,
    ) {
        self.typed(depth, "UnaryExpression", expression.id);
        self.terminal(depth + 1, "Operator", operator);
        operand.accept(self, depth + 1);
    }

    fn visit_vname_expression(&mut self, expression: &Expression, vname: &Vname, depth: usize) {
        self.typed(depth, "VnameExpression", expression.id);
        vname.accept(self, depth + 1);
    }
}

impl DeclarationVisitor<usize, ()> for TreePrinter<'_> {
    fn visit_binary_operator_declaration(
        &mut self,
        _: &Declaration,
        operator: &Operator,
        (left, right): (&TypeDenoter, &TypeDenoter),
        result: &TypeDenoter,
        depth: usize,
    ) {
        self.line(depth, "BinaryOperatorDeclaration");
        self.terminal(depth + 1, "Operator", operator);
        left.accept(self, depth + 1);
        right.accept(self, depth + 1);
        result.accept(self, depth + 1);
    }

    fn visit_const_declaration(&mut self, _: &Declaration, name: &Identifier, value: &Expression, depth: usize) {
        self.line(depth, "ConstDeclaration");
        self.terminal(depth + 1, "Identifier", name);
        value.accept(self, depth + 1);
    }

    fn visit_func_declaration(
        &mut self,
        _: &Declaration,
        name: &Identifier,
        parameters: &FormalParameterSequence,
        result: &TypeDenoter,
        body: &Expression,
        depth: usize,
    ) {
        self.line(depth, "FuncDeclaration");
        self.terminal(depth + 1, "Identifier", name);
        parameters.accept(self, depth + 1);
        result.accept(self, depth + 1);
        body.accept(self, depth + 1);
    }

    fn visit_proc_declaration(
        &mut self,
        _: &Declaration,
        name: &Identifier,
        parameters: &FormalParameterSequence,
        body: &Command,
        depth: usize,
    ) {
        self.line(depth, "ProcDeclaration");
        self.terminal(depth + 1, "Identifier", name);
        parameters.accept(self, depth + 1);
        body.accept(self, depth + 1);
    }

    fn visit_sequential_declaration(
        &mut self,
        _: &Declaration,
        first: &Declaration,
        second: &Declaration,
        depth: usize,
    ) {
        self.line(depth, "SequentialDeclaration");
        first.accept(self, depth + 1);
        second.accept(self, depth + 1);
    }

    fn visit_type_declaration(&mut self, _: &Declaration, name: &Identifier, denoter: &TypeDenoter, depth: usize) {
        self.line(depth, "TypeDeclaration");
        self.terminal(depth + 1, "Identifier", name);
        denoter.accept(self, depth + 1);
    }

    fn visit_unary_operator_declaration(
        &mut self,
        _: &Declaration,
        operator: &Operator,
        operand: &TypeDenoter,
        result: &TypeDenoter,
        depth: usize,
    ) {
        self.line(depth, "UnaryOperatorDeclaration");
        self.terminal(depth + 1, "Operator", operator);
        operand.accept(self, depth + 1);
        result.accept(self, depth + 1);
    }

    fn visit_var_declaration(&mut self, _: &Declaration, name: &Identifier, denoter: &TypeDenoter, depth: usize) {
        self.line(depth, "VarDeclaration");
        self.terminal(depth + 1, "Identifier", name);
        denoter.accept(self, depth + 1);
    }
}

impl VnameVisitor<usize, ()> for TreePrinter<'_> {
    fn visit_dot_vname(&mut self, vname: &Vname, record: &Vname, field: &Identifier, depth: usize) {
        self.typed(depth, "DotVname", vname.id);
        record.accept(self, depth + 1);
        self.terminal(depth + 1, "Identifier", field);
    }

    fn visit_simple_vname(&mut self, vname: &Vname, name: &Identifier, depth: usize) {
        self.typed(depth, "SimpleVname", vname.id);
        self.terminal(depth + 1, "Identifier", name);
    }

    fn visit_subscript_vname(&mut self, vname: &Vname, array: &Vname, index: &Expression, depth: usize) {
        self.typed(depth, "SubscriptVname", vname.id);
        array.accept(self, depth + 1);
        index.accept(self, depth + 1);
    }
}

impl FormalParameterVisitor<usize, ()> for TreePrinter<'_> {
    fn visit_const_formal_parameter(
        &mut self,
        _: &FormalParameter,
        name: &Identifier,
        denoter: &TypeDenoter,
        depth: usize,
    ) {
        self.line(depth, "ConstFormalParameter");
        self.terminal(depth + 1, "Identifier", name);
        denoter.accept(self, depth + 1);
    }

    fn visit_func_formal_parameter(
        &mut self,
        _: &FormalParameter,
        name: &Identifier,
        parameters: &FormalParameterSequence,
        result: &TypeDenoter,
        depth: usize,
    ) {
        self.line(depth, "FuncFormalParameter");
        self.terminal(depth + 1, "Identifier", name);
        parameters.accept(self, depth + 1);
        result.accept(self, depth + 1);
    }

    fn visit_proc_formal_parameter(
        &mut self,
        _: &FormalParameter,
        name: &Identifier,
        parameters: &FormalParameterSequence,
        depth: usize,
    ) {
        self.line(depth, "ProcFormalParameter");
        self.terminal(depth + 1, "Identifier", name);
        parameters.accept(self, depth + 1);
    }

    fn visit_var_formal_parameter(
        &mut self,
        _: &FormalParameter,
        name: &Identifier,
        denoter: &TypeDenoter,
        depth: usize,
    ) {
        self.line(depth, "VarFormalParameter");
        self.terminal(depth + 1, "Identifier", name);
        denoter.accept(self, depth + 1);
    }
}

impl FormalParameterSequenceVisitor<usize, ()> for TreePrinter<'_> {
    fn visit_empty_formal_parameter_sequence(&mut self, _: &FormalParameterSequence, depth: usize) {
        self.line(depth, "EmptyFormalParameterSequence");
    }

    fn visit_single_formal_parameter_sequence(
        &mut self,
        _: &FormalParameterSequence,
        parameter: &FormalParameter,
        depth: usize,
    ) {
        self.line(depth, "SingleFormalParameterSequence");
        parameter.accept(self, depth + 1);
    }

    fn visit_multiple_formal_parameter_sequence(
        &mut self,
        _: &FormalParameterSequence,
        first: &FormalParameter,
        rest: &FormalParameterSequence,
        depth: usize,
    ) {
        self.line(depth, "MultipleFormalParameterSequence");
        first.accept(self, depth + 1);
        rest.accept(self, depth + 1);
    }
}

impl ActualParameterVisitor<usize, ()> for TreePrinter<'_> {
    fn visit_const_actual_parameter(&mut self, _: &ActualParameter, value: &Expression, depth: usize) {
        self.line(depth, "ConstActualParameter");
        value.accept(self, depth + 1);
    }

    fn visit_func_actual_parameter(&mut self, _: &ActualParameter, name: &Identifier, depth: usize) {
        self.line(depth, "FuncActualParameter");
        self.terminal(depth + 1, "Identifier", name);
    }

    fn visit_proc_actual_parameter(&mut self, _: &ActualParameter, name: &Identifier, depth: usize) {
        self.line(depth, "ProcActualParameter");
        self.terminal(depth + 1, "Identifier", name);
    }

    fn visit_var_actual_parameter(&mut self, _: &ActualParameter, vname: &Vname, depth: usize) {
        self.line(depth, "VarActualParameter");
        vname.accept(self, depth + 1);
    }
}

impl ActualParameterSequenceVisitor<usize, ()> for TreePrinter<'_> {
    fn visit_empty_actual_parameter_sequence(&mut self, _: &ActualParameterSequence, depth: usize) {
        self.line(depth, "EmptyActualParameterSequence");
    }

    fn visit_single_actual_parameter_sequence(
        &mut self,
        _: &ActualParameterSequence,
        parameter: &ActualParameter,
        depth: usize,
    ) {
        self.line(depth, "SingleActualParameterSequence");
        parameter.accept(self, depth + 1);
    }

    fn visit_multiple_actual_parameter_sequence(
        &mut self,
        _: &ActualParameterSequence,
        first: &ActualParameter,
        rest: &ActualParameterSequence,
        depth: usize,
    ) {
        self.line(depth, "MultipleActualParameterSequence");
        first.accept(self, depth + 1);
        rest.accept(self, depth + 1);
    }
}

impl TypeDenoterVisitor<usize, ()> for TreePrinter<'_> {
    fn visit_any_type_denoter(&mut self, _: &TypeDenoter, depth: usize) {
        self.line(depth, "AnyTypeDenoter");
    }

    fn visit_array_type_denoter(
        &mut self,
        _: &TypeDenoter,
        size: &IntegerLiteral,
        element: &TypeDenoter,
        depth: usize,
    ) {
        self.line(depth, "ArrayTypeDenoter");
        self.terminal(depth + 1, "IntegerLiteral", size);
        element.accept(self, depth + 1);
    }

    fn visit_bool_type_denoter(&mut self, _: &TypeDenoter, depth: usize) {
        self.line(depth, "BoolTypeDenoter");
    }

    fn visit_char_type_denoter(&mut self, _: &TypeDenoter, depth: usize) {
        self.line(depth, "CharTypeDenoter");
    }

    fn visit_error_type_denoter(&mut self, _: &TypeDenoter, depth: usize) {
        self.line(depth, "ErrorTypeDenoter");
    }

    fn visit_int_type_denoter(&mut self, _: &TypeDenoter, depth: usize) {
        self.line(depth, "IntTypeDenoter");
    }

    fn visit_record_type_denoter(&mut self, _: &TypeDenoter, fields: &FieldTypeDenoter, depth: usize) {
        self.line(depth, "RecordTypeDenoter");
        fields.accept(self, depth + 1);
    }

    fn visit_simple_type_denoter(&mut self, _: &TypeDenoter, name: &Identifier, depth: usize) {
        self.line(depth, "SimpleTypeDenoter");
        self.terminal(depth + 1, "Identifier", name);
    }
}

impl FieldTypeDenoterVisitor<usize, ()> for TreePrinter<'_> {
    fn visit_single_field_type_denoter(
        &mut self,
        _: &FieldTypeDenoter,
        name: &Identifier,
        denoter: &TypeDenoter,
        depth: usize,
    ) {
        self.line(depth, "SingleFieldTypeDenoter");
        self.terminal(depth + 1, "Identifier", name);
        denoter.accept(self, depth + 1);
    }

    fn visit_multiple_field_type_denoter(
        &mut self,
        _: &FieldTypeDenoter,
        name: &Identifier,
        denoter: &TypeDenoter,
        rest: &FieldTypeDenoter,
        depth: usize,
    ) {
        self.line(depth, "MultipleFieldTypeDenoter");
        self.terminal(depth + 1, "Identifier", name);
        denoter.accept(self, depth + 1);
        rest.accept(self, depth + 1);
    }
}

impl ArrayAggregateVisitor<usize, ()> for TreePrinter<'_> {
    fn visit_single_array_aggregate(&mut self, _: &ArrayAggregate, element: &Expression, depth: usize) {
        self.line(depth, "SingleArrayAggregate");
        element.accept(self, depth + 1);
    }

    fn visit_multiple_array_aggregate(
        &mut self,
        _: &ArrayAggregate,
        first: &Expression,
        rest: &ArrayAggregate,
        depth: usize,
    ) {
        self.line(depth, "MultipleArrayAggregate");
        first.accept(self, depth + 1);
        rest.accept(self, depth + 1);
    }
}

impl RecordAggregateVisitor<usize, ()> for TreePrinter<'_> {
    fn visit_single_record_aggregate(
        &mut self,
        _: &RecordAggregate,
        field: &Identifier,
        value: &Expression,
        depth: usize,
    ) {
        self.line(depth, "SingleRecordAggregate");
        self.terminal(depth + 1, "Identifier", field);
        value.accept(self, depth + 1);
    }

    fn visit_multiple_record_aggregate(
        &mut self,
        _: &RecordAggregate,
        field: &Identifier,
        value: &Expression,
        rest: &RecordAggregate,
        depth: usize,
    ) {
        self.line(depth, "MultipleRecordAggregate");
        self.terminal(depth + 1, "Identifier", field);
        value.accept(self, depth + 1);
        rest.accept(self, depth + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::Reporter, parse::parse, semantic::check, source::Source};

    #[test]
    fn renders_indented_tree() {
        let source = Source::new("test.tri", "putint(1)");
        let mut reporter = Reporter::default();
        let program = parse(&source, &mut reporter);

        let expected = "\
Program
  CallCommand
    Identifier putint
    SingleActualParameterSequence
      ConstActualParameter
        IntegerExpression
          IntegerLiteral 1
";

        assert_eq!(render(&program, None), expected);
    }

    #[test]
    fn shows_types_after_checking() {
        let source = Source::new("test.tri", "let var c: Char in c := 'a'");
        let mut reporter = Reporter::default();

        let program = parse(&source, &mut reporter);
        let annotations = check(&program, &mut reporter);
        let rendered = render(&program, Some(&annotations));

        assert!(rendered.contains("  VarDeclaration\n"));
        assert!(rendered.contains("SimpleVname : Char\n"));
        assert!(rendered.contains("CharacterExpression : Char\n"));
    }
}
