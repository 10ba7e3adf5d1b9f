//! Generación de código TAM.
//!
//! El encoder recorre el árbol ya verificado una última vez. Cada
//! declaración recibe una [`Entity`] con su dirección `(nivel,
//! desplazamiento)`, asignada por un contador de frame que solo crece
//! mientras se visitan declaraciones de izquierda a derecha. Los saltos
//! hacia adelante se emiten con destino pendiente y se completan cuando
//! el código protegido ya fue emitido.
//!
//! Este módulo asume un árbol sin errores contextuales. Las violaciones
//! de los límites de la máquina se reportan como errores de restricción.

mod emitter;
mod entity;
mod frame;

pub use emitter::{Emitter, Label, ObjectProgram};
pub use entity::Entity;
pub use frame::{Address, Frame};

use std::collections::HashMap;
use thiserror::Error;

use crate::{
    ast::{visit::*, *},
    error::{Kind, Reporter},
    machine::{
        Instruction, Opcode, Primitive, Register, ADDRESS_SIZE, CLOSURE_SIZE, FALSE,
        LINK_DATA_SIZE, MAX_N, MAX_ROUTINE_LEVEL, PRIMITIVE_SIZE, TRUE,
    },
    semantic::{Annotations, Decl},
    source::{Located, Location},
};

#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RestrictionError {
    #[error("Program exceeds the code store of 1024 instructions")]
    CodeTooLarge,

    #[error("Can't move values larger than 255 words")]
    ValueTooLarge,

    #[error("Can't nest routines more than 7 deep")]
    NestingTooDeep,

    #[error("Can't access data more than 6 levels out")]
    OutOfReach,
}

/// Traduce un programa verificado a código TAM.
pub fn encode(program: &Program, annotations: &Annotations, reporter: &mut Reporter) -> ObjectProgram {
    let mut encoder = Encoder {
        emitter: Emitter::new(),
        entities: HashMap::new(),
        annotations,
        reporter,
    };

    program.accept(&mut encoder, ());
    if encoder.emitter.overflowed() {
        encoder.restrict(RestrictionError::CodeTooLarge, &program.location);
    }

    encoder.emitter.finish()
}

/// Resultado de recorrer un V-name: la entidad raíz, el desplazamiento
/// acumulado por campos y subíndices constantes, y si un índice calculado
/// quedó sobre la pila.
#[derive(Copy, Clone, Debug)]
struct Access {
    entity: Entity,
    offset: i32,
    indexed: bool,
}

struct Encoder<'a> {
    emitter: Emitter,
    entities: HashMap<NodeId, Entity>,
    annotations: &'a Annotations,
    reporter: &'a mut Reporter,
}

impl Encoder<'_> {
    fn emit(&mut self, instruction: Instruction) {
        self.emitter.emit(instruction);
    }

    fn forward(&mut self, opcode: Opcode, n: i32) -> Label {
        self.emitter
            .emit_forward(Instruction::new(opcode, Register::CB, n, 0))
    }

    fn restrict(&mut self, error: RestrictionError, location: &Location) {
        self.reporter
            .report(Kind::Restriction, Located::at(error, location.clone()));
    }

    fn size_of(&self, id: NodeId) -> i32 {
        self.annotations.size_of(id)
    }

    /// Acota un tamaño al campo `n` de una instrucción.
    fn limit(&mut self, size: i32, location: &Location) -> i32 {
        if size > MAX_N {
            self.restrict(RestrictionError::ValueTooLarge, location);
            MAX_N
        } else {
            size
        }
    }

    fn display(&mut self, frame: Frame, address: Address, location: &Location) -> Register {
        match frame.display(address) {
            Some(register) => register,
            None => {
                self.restrict(RestrictionError::OutOfReach, location);
                Register::L6
            }
        }
    }

    fn entity(&self, name: &Terminal) -> Entity {
        match self.annotations.binding(name.id) {
            Some(Decl::User(id)) => self
                .entities
                .get(&id)
                .copied()
                .unwrap_or(Entity::Unrepresented),

            Some(Decl::Std(decl)) => Entity::standard(decl),
            None => Entity::Unrepresented,
        }
    }

    fn call_primitive(&mut self, primitive: Primitive) {
        if primitive != Primitive::Id {
            emit!(self, Call(Register::SB as i32), Register::PB, primitive.displacement());
        }
    }

    /// Invoca una rutina cuyos argumentos, de tamaño total `arguments`,
    /// ya están sobre la pila.
    fn call(&mut self, entity: Entity, frame: Frame, arguments: i32, location: &Location) {
        match entity {
            Entity::KnownRoutine(address) => {
                let link = self.display(frame, address, location);
                emit!(self, Call(link as i32), Register::CB, address.displacement);
            }

            Entity::UnknownRoutine(address) => {
                let register = self.display(frame, address, location);
                emit!(self, Load(CLOSURE_SIZE), register, address.displacement);
                emit!(self, CallI, Register::CB, 0);
            }

            Entity::Primitive(primitive) => self.call_primitive(primitive),

            Entity::Equality(primitive) => {
                emit!(self, LoadL, Register::CB, arguments / 2);
                self.call_primitive(primitive);
            }

            _ => (),
        }
    }

    /// Empuja la clausura de una rutina pasada como argumento.
    fn fetch_routine(&mut self, entity: Entity, frame: Frame, location: &Location) {
        match entity {
            Entity::KnownRoutine(address) => {
                let link = self.display(frame, address, location);
                emit!(self, LoadA, link, 0);
                emit!(self, LoadA, Register::CB, address.displacement);
            }

            Entity::UnknownRoutine(address) => {
                let register = self.display(frame, address, location);
                emit!(self, Load(CLOSURE_SIZE), register, address.displacement);
            }

            Entity::Primitive(primitive) => {
                emit!(self, LoadA, Register::SB, 0);
                emit!(self, LoadA, Register::PB, primitive.displacement());
            }

            _ => (),
        }
    }

    /// Deja sobre la pila la dirección de un parámetro `var`, sin
    /// sumar desplazamiento ni índice.
    fn load_indirect(&mut self, address: Address, frame: Frame, location: &Location) {
        let register = self.display(frame, address, location);
        emit!(self, Load(ADDRESS_SIZE), register, address.displacement);
    }

    /// Suma a la dirección sobre la pila el índice y el desplazamiento
    /// pendientes de un acceso indirecto.
    fn adjust_indirect(&mut self, access: Access) {
        if access.indexed {
            self.call_primitive(Primitive::Add);
        }

        if access.offset != 0 {
            emit!(self, LoadL, Register::CB, access.offset);
            self.call_primitive(Primitive::Add);
        }
    }

    fn fetch(&mut self, access: Access, size: i32, frame: Frame, location: &Location) {
        let size = self.limit(size, location);

        match access.entity {
            Entity::KnownValue(value) => emit!(self, LoadL, Register::CB, value),

            Entity::UnknownValue(address) | Entity::KnownAddress(address) => {
                let register = self.display(frame, address, location);
                let displacement = address.displacement + access.offset;

                if access.indexed {
                    emit!(self, LoadA, register, displacement);
                    self.call_primitive(Primitive::Add);
                    emit!(self, LoadI(size), Register::CB, 0);
                } else {
                    emit!(self, Load(size), register, displacement);
                }
            }

            Entity::UnknownAddress(address) => {
                self.load_indirect(address, frame, location);
                self.adjust_indirect(access);
                emit!(self, LoadI(size), Register::CB, 0);
            }

            _ => (),
        }
    }

    fn store(&mut self, access: Access, size: i32, frame: Frame, location: &Location) {
        let size = self.limit(size, location);

        match access.entity {
            Entity::KnownAddress(address) => {
                let register = self.display(frame, address, location);
                let displacement = address.displacement + access.offset;

                if access.indexed {
                    emit!(self, LoadA, register, displacement);
                    self.call_primitive(Primitive::Add);
                    emit!(self, StoreI(size), Register::CB, 0);
                } else {
                    emit!(self, Store(size), register, displacement);
                }
            }

            Entity::UnknownAddress(address) => {
                self.load_indirect(address, frame, location);
                self.adjust_indirect(access);
                emit!(self, StoreI(size), Register::CB, 0);
            }

            _ => (),
        }
    }

    fn fetch_address(&mut self, access: Access, frame: Frame, location: &Location) {
        match access.entity {
            Entity::UnknownValue(address) | Entity::KnownAddress(address) => {
                let register = self.display(frame, address, location);
                emit!(self, LoadA, register, address.displacement + access.offset);

                if access.indexed {
                    self.call_primitive(Primitive::Add);
                }
            }

            Entity::UnknownAddress(address) => {
                self.load_indirect(address, frame, location);
                self.adjust_indirect(access);
            }

            _ => (),
        }
    }

    /// Deja en la pila la dirección de `vname`.
    fn address_of(&mut self, vname: &Vname, frame: Frame) {
        let access = vname.accept(self, frame);
        self.fetch_address(access, frame, &vname.location);
    }

    /// Evalúa `vname` y guarda en él un valor de tamaño `size` que ya
    /// forma parte de `frame`.
    fn assign(&mut self, vname: &Vname, size: i32, frame: Frame) {
        let access = vname.accept(self, frame);
        self.store(access, size, frame, &vname.location);
    }

    /// Código común a procedimientos y funciones: un salto sobre el
    /// cuerpo, el cuerpo en un frame nuevo y el retorno.
    fn routine<F>(
        &mut self,
        declaration: &Declaration,
        parameters: &FormalParameterSequence,
        frame: Frame,
        body: F,
    ) -> i32
    where
        F: FnOnce(&mut Self, Frame) -> i32,
    {
        let skip = self.forward(Opcode::Jump, 0);

        let entry = Address {
            level: frame.level,
            displacement: self.emitter.next_address(),
        };

        // Antes del cuerpo, para permitir recursión
        self.entities
            .insert(declaration.id, Entity::KnownRoutine(entry));

        let (mut arguments, mut result) = (0, 0);
        if frame.level >= MAX_ROUTINE_LEVEL {
            self.restrict(RestrictionError::NestingTooDeep, &declaration.location);
        } else {
            arguments = parameters.accept(self, frame.push(0));
            result = body(self, frame.push(LINK_DATA_SIZE));
        }

        let result = self.limit(result, &declaration.location);
        emit!(self, Return(result), Register::CB, arguments);

        self.emitter.patch(skip);
        0
    }

    /// Ubicación de un parámetro formal, debajo de la base del frame.
    fn parameter(frame: Frame, size: i32) -> Address {
        Address {
            level: frame.level,
            displacement: -frame.size - size,
        }
    }
}

impl ProgramVisitor<(), ()> for Encoder<'_> {
    fn visit_program(&mut self, _: &Program, command: &Command, _: ()) {
        command.accept(self, Frame::global());
        emit!(self, Halt, Register::CB, 0);
    }
}

impl CommandVisitor<Frame, ()> for Encoder<'_> {
    fn visit_assign_command(&mut self, _: &Command, target: &Vname, value: &Expression, frame: Frame) {
        let size = value.accept(self, frame);
        self.assign(target, size, frame.expand(size));
    }

    fn visit_double_assign_command(
        &mut self,
        _: &Command,
        (first, second): (&Vname, &Vname),
        (first_value, second_value): (&Expression, &Expression),
        frame: Frame,
    ) {
        // Cada valor queda debajo de la dirección de su destino
        let first_size = first_value.accept(self, frame);
        let frame = frame.expand(first_size);
        self.address_of(first, frame);

        let frame = frame.expand(ADDRESS_SIZE);
        let second_size = second_value.accept(self, frame);
        let frame = frame.expand(second_size);
        self.address_of(second, frame);

        // Ninguna dirección depende ya de los destinos
        let second_size = self.limit(second_size, &second.location);
        emit!(self, StoreI(second_size), Register::CB, 0);

        let first_size = self.limit(first_size, &first.location);
        emit!(self, StoreI(first_size), Register::CB, 0);
    }

    fn visit_call_command(
        &mut self,
        _: &Command,
        name: &Identifier,
        arguments: &ActualParameterSequence,
        frame: Frame,
    ) {
        let size = arguments.accept(self, frame);
        let entity = self.entity(name);

        self.call(entity, frame.expand(size), size, &name.location);
    }

    fn visit_empty_command(&mut self, _: &Command, _: Frame) {}

    fn visit_if_command(
        &mut self,
        _: &Command,
        condition: &Expression,
        then: &Command,
        otherwise: &Command,
        frame: Frame,
    ) {
        condition.accept(self, frame);
        let to_otherwise = self.forward(Opcode::JumpIf, FALSE);

        then.accept(self, frame);
        let to_end = self.forward(Opcode::Jump, 0);

        self.emitter.patch(to_otherwise);
        otherwise.accept(self, frame);
        self.emitter.patch(to_end);
    }

    fn visit_let_command(
        &mut self,
        _: &Command,
        declaration: &Declaration,
        body: &Command,
        frame: Frame,
    ) {
        let extra = declaration.accept(self, frame);
        body.accept(self, frame.expand(extra));

        if extra > 0 {
            emit!(self, Pop(0), Register::CB, extra);
        }
    }

    fn visit_sequential_command(
        &mut self,
        _: &Command,
        first: &Command,
        second: &Command,
        frame: Frame,
    ) {
        first.accept(self, frame);
        second.accept(self, frame);
    }

    fn visit_while_command(
        &mut self,
        _: &Command,
        condition: &Expression,
        body: &Command,
        frame: Frame,
    ) {
        let to_test = self.forward(Opcode::Jump, 0);
        let start = self.emitter.next_address();

        body.accept(self, frame);

        self.emitter.patch(to_test);
        condition.accept(self, frame);
        emit!(self, JumpIf(TRUE), Register::CB, start);
    }

    fn visit_loop_while_command(
        &mut self,
        _: &Command,
        prelude: &Command,
        condition: &Expression,
        body: &Command,
        frame: Frame,
    ) {
        let start = self.emitter.next_address();
        prelude.accept(self, frame);

        condition.accept(self, frame);
        let to_exit = self.forward(Opcode::JumpIf, FALSE);

        body.accept(self, frame);
        emit!(self, Jump, Register::CB, start);

        self.emitter.patch(to_exit);
    }
}

impl ExpressionVisitor<Frame, i32> for Encoder<'_> {
    fn visit_array_expression(&mut self, _: &Expression, aggregate: &ArrayAggregate, frame: Frame) -> i32 {
        aggregate.accept(self, frame)
    }

    fn visit_binary_expression(
        &mut self,
        expression: &Expression,
        left: &Expression,
        operator: &Operator,
        right: &Expression,
        frame: Frame,
    ) -> i32 {
        let left_size = left.accept(self, frame);
        let right_size = right.accept(self, frame.expand(left_size));

        let operands = left_size + right_size;
        let entity = self.entity(operator);
        self.call(entity, frame.expand(operands), operands, &operator.location);

        self.size_of(expression.id)
    }

    fn visit_call_expression(
        &mut self,
        expression: &Expression,
        name: &Identifier,
        arguments: &ActualParameterSequence,
        frame: Frame,
    ) -> i32 {
        let size = arguments.accept(self, frame);
        let entity = self.entity(name);
        self.call(entity, frame.expand(size), size, &name.location);

        self.size_of(expression.id)
    }

    fn visit_character_expression(
        &mut self,
        _: &Expression,
        literal: &CharacterLiteral,
        _: Frame,
    ) -> i32 {
        let value = literal.character_value().map_or(0, |value| value as i32);
        emit!(self, LoadL, Register::CB, value);

        PRIMITIVE_SIZE
    }

    fn visit_empty_expression(&mut self, _: &Expression, _: Frame) -> i32 {
        0
    }

    fn visit_if_expression(
        &mut self,
        _: &Expression,
        condition: &Expression,
        then: &Expression,
        otherwise: &Expression,
        frame: Frame,
    ) -> i32 {
        condition.accept(self, frame);
        let to_otherwise = self.forward(Opcode::JumpIf, FALSE);

        let size = then.accept(self, frame);
        let to_end = self.forward(Opcode::Jump, 0);

        self.emitter.patch(to_otherwise);
        otherwise.accept(self, frame);
        self.emitter.patch(to_end);

        size
    }

    fn visit_integer_expression(
        &mut self,
        _: &Expression,
        literal: &IntegerLiteral,
        _: Frame,
    ) -> i32 {
        emit!(self, LoadL, Register::CB, literal.integer_value().unwrap_or(0));
        PRIMITIVE_SIZE
    }

    fn visit_let_expression(
        &mut self,
        expression: &Expression,
        declaration: &Declaration,
        body: &Expression,
        frame: Frame,
    ) -> i32 {
        let extra = declaration.accept(self, frame);
        let size = body.accept(self, frame.expand(extra));

        if extra > 0 {
            let size = self.limit(size, &expression.location);
            emit!(self, Pop(size), Register::CB, extra);
        }

        size
    }

    fn visit_record_expression(
        &mut self,
        _: &Expression,
        aggregate: &RecordAggregate,
        frame: Frame,
    ) -> i32 {
        aggregate.accept(self, frame)
    }

    fn visit_unary_expression(
        &mut self,
        expression: &Expression,
        operator: &Operator,
        operand: &Expression,
        frame: Frame,
    ) -> i32 {
        let operand_size = operand.accept(self, frame);
        let entity = self.entity(operator);
        self.call(entity, frame.expand(operand_size), operand_size, &operator.location);

        self.size_of(expression.id)
    }

    fn visit_vname_expression(&mut self, expression: &Expression, vname: &Vname, frame: Frame) -> i32 {
        let size = self.size_of(expression.id);
        let access = vname.accept(self, frame);
        self.fetch(access, size, frame, &vname.location);

        size
    }
}

impl DeclarationVisitor<Frame, i32> for Encoder<'_> {
    fn visit_binary_operator_declaration(
        &mut self,
        _: &Declaration,
        _: &Operator,
        _: (&TypeDenoter, &TypeDenoter),
        _: &TypeDenoter,
        _: Frame,
    ) -> i32 {
        0
    }

    fn visit_const_declaration(
        &mut self,
        declaration: &Declaration,
        _: &Identifier,
        value: &Expression,
        frame: Frame,
    ) -> i32 {
        let known = match &value.kind {
            ExpressionKind::Integer(literal) => literal.integer_value(),
            ExpressionKind::Character(literal) => literal.character_value().map(|value| value as i32),
            _ => None,
        };

        if let Some(value) = known {
            self.entities.insert(declaration.id, Entity::KnownValue(value));
            return 0;
        }

        let size = value.accept(self, frame);
        self.entities
            .insert(declaration.id, Entity::UnknownValue(frame.top()));

        size
    }

    fn visit_func_declaration(
        &mut self,
        declaration: &Declaration,
        _: &Identifier,
        parameters: &FormalParameterSequence,
        _: &TypeDenoter,
        body: &Expression,
        frame: Frame,
    ) -> i32 {
        self.routine(declaration, parameters, frame, |encoder, frame| {
            body.accept(encoder, frame)
        })
    }

    fn visit_proc_declaration(
        &mut self,
        declaration: &Declaration,
        _: &Identifier,
        parameters: &FormalParameterSequence,
        body: &Command,
        frame: Frame,
    ) -> i32 {
        self.routine(declaration, parameters, frame, |encoder, frame| {
            body.accept(encoder, frame);
            0
        })
    }

    fn visit_sequential_declaration(
        &mut self,
        _: &Declaration,
        first: &Declaration,
        second: &Declaration,
        frame: Frame,
    ) -> i32 {
        let first_size = first.accept(self, frame);
        let second_size = second.accept(self, frame.expand(first_size));

        first_size + second_size
    }

    fn visit_type_declaration(
        &mut self,
        _: &Declaration,
        _: &Identifier,
        _: &TypeDenoter,
        _: Frame,
    ) -> i32 {
        0
    }

    fn visit_unary_operator_declaration(
        &mut self,
        _: &Declaration,
        _: &Operator,
        _: &TypeDenoter,
        _: &TypeDenoter,
        _: Frame,
    ) -> i32 {
        0
    }

    fn visit_var_declaration(
        &mut self,
        declaration: &Declaration,
        _: &Identifier,
        _: &TypeDenoter,
        frame: Frame,
    ) -> i32 {
        let size = self.size_of(declaration.id);
        emit!(self, Push, Register::CB, size);

        self.entities
            .insert(declaration.id, Entity::KnownAddress(frame.top()));

        size
    }
}

impl VnameVisitor<Frame, Access> for Encoder<'_> {
    fn visit_dot_vname(&mut self, _: &Vname, record: &Vname, field: &Identifier, frame: Frame) -> Access {
        let mut access = record.accept(self, frame);

        let offset = self
            .annotations
            .type_of(record.id)
            .and_then(|record| record.field(&field.spelling))
            .map_or(0, |(offset, _)| offset);

        access.offset += offset;
        access
    }

    fn visit_simple_vname(&mut self, _: &Vname, name: &Identifier, _: Frame) -> Access {
        Access {
            entity: self.entity(name),
            offset: 0,
            indexed: false,
        }
    }

    fn visit_subscript_vname(
        &mut self,
        vname: &Vname,
        array: &Vname,
        index: &Expression,
        frame: Frame,
    ) -> Access {
        let mut access = array.accept(self, frame);
        let element = self.size_of(vname.id);

        if let ExpressionKind::Integer(literal) = &index.kind {
            if let Some(value) = literal.integer_value() {
                access.offset += value * element;
                return access;
            }
        }

        let frame = if access.indexed {
            frame.expand(PRIMITIVE_SIZE)
        } else {
            frame
        };

        index.accept(self, frame);
        if element != 1 {
            emit!(self, LoadL, Register::CB, element);
            self.call_primitive(Primitive::Mult);
        }

        if access.indexed {
            self.call_primitive(Primitive::Add);
        } else {
            access.indexed = true;
        }

        access
    }
}

impl FormalParameterVisitor<Frame, i32> for Encoder<'_> {
    fn visit_const_formal_parameter(
        &mut self,
        parameter: &FormalParameter,
        _: &Identifier,
        _: &TypeDenoter,
        frame: Frame,
    ) -> i32 {
        let size = self.size_of(parameter.id);
        let address = Self::parameter(frame, size);
        self.entities
            .insert(parameter.id, Entity::UnknownValue(address));

        size
    }

    fn visit_func_formal_parameter(
        &mut self,
        parameter: &FormalParameter,
        _: &Identifier,
        _: &FormalParameterSequence,
        _: &TypeDenoter,
        frame: Frame,
    ) -> i32 {
        let address = Self::parameter(frame, CLOSURE_SIZE);
        self.entities
            .insert(parameter.id, Entity::UnknownRoutine(address));

        CLOSURE_SIZE
    }

    fn visit_proc_formal_parameter(
        &mut self,
        parameter: &FormalParameter,
        _: &Identifier,
        _: &FormalParameterSequence,
        frame: Frame,
    ) -> i32 {
        let address = Self::parameter(frame, CLOSURE_SIZE);
        self.entities
            .insert(parameter.id, Entity::UnknownRoutine(address));

        CLOSURE_SIZE
    }

    fn visit_var_formal_parameter(
        &mut self,
        parameter: &FormalParameter,
        _: &Identifier,
        _: &TypeDenoter,
        frame: Frame,
    ) -> i32 {
        let address = Self::parameter(frame, ADDRESS_SIZE);
        self.entities
            .insert(parameter.id, Entity::UnknownAddress(address));

        ADDRESS_SIZE
    }
}

impl FormalParameterSequenceVisitor<Frame, i32> for Encoder<'_> {
    fn visit_empty_formal_parameter_sequence(&mut self, _: &FormalParameterSequence, _: Frame) -> i32 {
        0
    }

    fn visit_single_formal_parameter_sequence(
        &mut self,
        _: &FormalParameterSequence,
        parameter: &FormalParameter,
        frame: Frame,
    ) -> i32 {
        parameter.accept(self, frame)
    }

    /// Los parámetros posteriores quedan más cerca de la base del frame,
    /// por lo cual se asignan primero.
    fn visit_multiple_formal_parameter_sequence(
        &mut self,
        _: &FormalParameterSequence,
        first: &FormalParameter,
        rest: &FormalParameterSequence,
        frame: Frame,
    ) -> i32 {
        let rest_size = rest.accept(self, frame);
        let first_size = first.accept(self, frame.expand(rest_size));

        first_size + rest_size
    }
}

impl ActualParameterVisitor<Frame, i32> for Encoder<'_> {
    fn visit_const_actual_parameter(&mut self, _: &ActualParameter, value: &Expression, frame: Frame) -> i32 {
        value.accept(self, frame)
    }

    fn visit_func_actual_parameter(&mut self, _: &ActualParameter, name: &Identifier, frame: Frame) -> i32 {
        let entity = self.entity(name);
        self.fetch_routine(entity, frame, &name.location);

        CLOSURE_SIZE
    }

    fn visit_proc_actual_parameter(&mut self, _: &ActualParameter, name: &Identifier, frame: Frame) -> i32 {
        let entity = self.entity(name);
        self.fetch_routine(entity, frame, &name.location);

        CLOSURE_SIZE
    }

    fn visit_var_actual_parameter(&mut self, _: &ActualParameter, vname: &Vname, frame: Frame) -> i32 {
        self.address_of(vname, frame);

        ADDRESS_SIZE
    }
}

impl ActualParameterSequenceVisitor<Frame, i32> for Encoder<'_> {
    fn visit_empty_actual_parameter_sequence(&mut self, _: &ActualParameterSequence, _: Frame) -> i32 {
        0
    }

    fn visit_single_actual_parameter_sequence(
        &mut self,
        _: &ActualParameterSequence,
        parameter: &ActualParameter,
        frame: Frame,
    ) -> i32 {
        parameter.accept(self, frame)
    }

    fn visit_multiple_actual_parameter_sequence(
        &mut self,
        _: &ActualParameterSequence,
        first: &ActualParameter,
        rest: &ActualParameterSequence,
        frame: Frame,
    ) -> i32 {
        let first_size = first.accept(self, frame);
        let rest_size = rest.accept(self, frame.expand(first_size));

        first_size + rest_size
    }
}

impl ArrayAggregateVisitor<Frame, i32> for Encoder<'_> {
    fn visit_single_array_aggregate(&mut self, _: &ArrayAggregate, element: &Expression, frame: Frame) -> i32 {
        element.accept(self, frame)
    }

    fn visit_multiple_array_aggregate(
        &mut self,
        _: &ArrayAggregate,
        first: &Expression,
        rest: &ArrayAggregate,
        frame: Frame,
    ) -> i32 {
        let first_size = first.accept(self, frame);
        let rest_size = rest.accept(self, frame.expand(first_size));

        first_size + rest_size
    }
}

impl RecordAggregateVisitor<Frame, i32> for Encoder<'_> {
    fn visit_single_record_aggregate(
        &mut self,
        _: &RecordAggregate,
        _: &Identifier,
        value: &Expression,
        frame: Frame,
    ) -> i32 {
        value.accept(self, frame)
    }

    fn visit_multiple_record_aggregate(
        &mut self,
        _: &RecordAggregate,
        _: &Identifier,
        value: &Expression,
        rest: &RecordAggregate,
        frame: Frame,
    ) -> i32 {
        let first_size = value.accept(self, frame);
        let rest_size = rest.accept(self, frame.expand(first_size));

        first_size + rest_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        machine::Opcode::*,
        machine::Register::{CB, LB, PB, SB},
        parse::parse,
        semantic::check,
        source::Source,
    };

    fn encode_text(text: &str) -> (ObjectProgram, Reporter) {
        let source = Source::new("test.tri", text);
        let mut reporter = Reporter::default();

        let program = parse(&source, &mut reporter);
        let annotations = check(&program, &mut reporter);
        assert_eq!(reporter.errors(), 0, "{}", reporter);

        let object = encode(&program, &annotations, &mut reporter);
        (object, reporter)
    }

    fn code(text: &str) -> Vec<Instruction> {
        let (object, reporter) = encode_text(text);
        assert_eq!(reporter.errors(), 0, "{}", reporter);

        object.instructions().to_vec()
    }

    fn i(op: Opcode, n: i32, r: Register, d: i32) -> Instruction {
        Instruction::new(op, r, n, d)
    }

    fn primitive(primitive: Primitive) -> Instruction {
        i(Call, SB as i32, PB, primitive.displacement())
    }

    #[test]
    fn parameters_and_locals_are_addressed_in_order() {
        let found = code(
            "let
                var g: Integer;
                proc p(a: Integer, var b: Integer) ~
                    let var v1: Integer; var v2: Char
                    in begin v1 := b; v2 := chr(a) end
             in p(1, var g)",
        );

        let expected = vec![
            i(Push, 0, CB, 1),
            i(Jump, 0, CB, 11),
            i(Push, 0, CB, 1),
            i(Push, 0, CB, 1),
            i(Load, 1, LB, -1),
            i(LoadI, 1, CB, 0),
            i(Store, 1, LB, 3),
            i(Load, 1, LB, -2),
            i(Store, 1, LB, 4),
            i(Pop, 0, CB, 2),
            i(Return, 0, CB, 2),
            i(LoadL, 0, CB, 1),
            i(LoadA, 0, SB, 0),
            i(Call, SB as i32, CB, 2),
            i(Pop, 0, CB, 1),
            i(Halt, 0, CB, 0),
        ];

        assert_eq!(found, expected);
    }

    #[test]
    fn while_jumps_to_test_first() {
        let found = code("let var x: Integer in while x < 3 do x := x + 1");

        let expected = vec![
            i(Push, 0, CB, 1),
            i(Jump, 0, CB, 6),
            i(Load, 1, SB, 0),
            i(LoadL, 0, CB, 1),
            primitive(Primitive::Add),
            i(Store, 1, SB, 0),
            i(Load, 1, SB, 0),
            i(LoadL, 0, CB, 3),
            primitive(Primitive::Lt),
            i(JumpIf, TRUE, CB, 2),
            i(Pop, 0, CB, 1),
            i(Halt, 0, CB, 0),
        ];

        assert_eq!(found, expected);
    }

    #[test]
    fn if_command_patches_both_jumps() {
        let found = code("if 1 < 2 then putint(1) else puteol()");

        let expected = vec![
            i(LoadL, 0, CB, 1),
            i(LoadL, 0, CB, 2),
            primitive(Primitive::Lt),
            i(JumpIf, FALSE, CB, 7),
            i(LoadL, 0, CB, 1),
            primitive(Primitive::PutInt),
            i(Jump, 0, CB, 8),
            primitive(Primitive::PutEol),
            i(Halt, 0, CB, 0),
        ];

        assert_eq!(found, expected);
    }

    #[test]
    fn loop_while_runs_prelude_before_test() {
        let found = code("let var c: Char in loop get(var c) while \\eol() do put(c)");

        let expected = vec![
            i(Push, 0, CB, 1),
            i(LoadA, 0, SB, 0),
            primitive(Primitive::Get),
            primitive(Primitive::Eol),
            primitive(Primitive::Not),
            i(JumpIf, FALSE, CB, 9),
            i(Load, 1, SB, 0),
            primitive(Primitive::Put),
            i(Jump, 0, CB, 1),
            i(Pop, 0, CB, 1),
            i(Halt, 0, CB, 0),
        ];

        assert_eq!(found, expected);
    }

    #[test]
    fn equality_pushes_operand_size() {
        let found = code("let var b: Boolean in b := 'a' = 'b'");

        let expected = vec![
            i(Push, 0, CB, 1),
            i(LoadL, 0, CB, 97),
            i(LoadL, 0, CB, 98),
            i(LoadL, 0, CB, 1),
            primitive(Primitive::Eq),
            i(Store, 1, SB, 0),
            i(Pop, 0, CB, 1),
            i(Halt, 0, CB, 0),
        ];

        assert_eq!(found, expected);
    }

    #[test]
    fn double_assignment_swaps() {
        let found = code("let var a: Integer; var b: Integer in a, b := b, a");

        let expected = vec![
            i(Push, 0, CB, 1),
            i(Push, 0, CB, 1),
            i(Load, 1, SB, 1),
            i(LoadA, 0, SB, 0),
            i(Load, 1, SB, 0),
            i(LoadA, 0, SB, 1),
            i(StoreI, 1, CB, 0),
            i(StoreI, 1, CB, 0),
            i(Pop, 0, CB, 2),
            i(Halt, 0, CB, 0),
        ];

        assert_eq!(found, expected);
    }

    #[test]
    fn double_assignment_addresses_precede_stores() {
        let found = code("let var a: array 3 of Integer; var i: Integer in a[i], i := 5, 0");

        let expected = vec![
            i(Push, 0, CB, 3),
            i(Push, 0, CB, 1),
            i(LoadL, 0, CB, 5),
            i(Load, 1, SB, 3),
            i(LoadA, 0, SB, 0),
            primitive(Primitive::Add),
            i(LoadL, 0, CB, 0),
            i(LoadA, 0, SB, 3),
            i(StoreI, 1, CB, 0),
            i(StoreI, 1, CB, 0),
            i(Pop, 0, CB, 4),
            i(Halt, 0, CB, 0),
        ];

        assert_eq!(found, expected);
    }

    #[test]
    fn fields_and_computed_subscripts() {
        let found = code(
            "let
                var r: record x: Integer, y: array 2 of Integer end;
                var i: Integer
             in begin r.y[i] := r.x; r.y[1] := 5 end",
        );

        let expected = vec![
            i(Push, 0, CB, 3),
            i(Push, 0, CB, 1),
            i(Load, 1, SB, 0),
            i(Load, 1, SB, 3),
            i(LoadA, 0, SB, 1),
            primitive(Primitive::Add),
            i(StoreI, 1, CB, 0),
            i(LoadL, 0, CB, 5),
            i(Store, 1, SB, 2),
            i(Pop, 0, CB, 4),
            i(Halt, 0, CB, 0),
        ];

        assert_eq!(found, expected);
    }

    #[test]
    fn known_constants_emit_literals() {
        let found = code("let const k ~ 7 in putint(k + maxint)");

        let expected = vec![
            i(LoadL, 0, CB, 7),
            i(LoadL, 0, CB, 32767),
            primitive(Primitive::Add),
            primitive(Primitive::PutInt),
            i(Halt, 0, CB, 0),
        ];

        assert_eq!(found, expected);
    }

    #[test]
    fn functions_return_their_result() {
        let found = code("let func twice(n: Integer): Integer ~ n * 2 in putint(twice(4))");

        let expected = vec![
            i(Jump, 0, CB, 5),
            i(Load, 1, LB, -1),
            i(LoadL, 0, CB, 2),
            primitive(Primitive::Mult),
            i(Return, 1, CB, 1),
            i(LoadL, 0, CB, 4),
            i(Call, SB as i32, CB, 1),
            primitive(Primitive::PutInt),
            i(Halt, 0, CB, 0),
        ];

        assert_eq!(found, expected);
    }

    #[test]
    fn encoding_is_deterministic() {
        let text = "let var x: Integer; proc p(n: Integer) ~ x := n in p(3)";
        let (first, _) = encode_text(text);
        let (second, _) = encode_text(text);

        assert_eq!(first, second);
    }

    #[test]
    fn nesting_limit_is_a_restriction() {
        let mut text = String::from("puteol()");
        for level in (1..=8).rev() {
            text = format!("let proc p{0}() ~ {1} in p{0}()", level, text);
        }

        let (_, reporter) = encode_text(&text);
        let messages: Vec<_> = reporter.diagnostics().iter().map(|d| d.message()).collect();

        assert_eq!(messages, vec!["Can't nest routines more than 7 deep"]);
    }
}
