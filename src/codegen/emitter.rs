//! Almacén de código y programa objeto.

use std::{
    fmt::{self, Display},
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

use crate::machine::{Instruction, CODE_SIZE};

/// Instrucción de salto cuyo destino aún no se conoce.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Label(usize);

/// Búfer de instrucciones en construcción.
///
/// Las instrucciones que exceden la capacidad del almacén de código se
/// descartan; [`Emitter::overflowed()`] indica si esto ocurrió.
#[derive(Debug, Default)]
pub struct Emitter {
    code: Vec<Instruction>,
    overflowed: bool,
}

impl Emitter {
    pub fn new() -> Self {
        Emitter::default()
    }

    /// Dirección que ocupará la siguiente instrucción.
    pub fn next_address(&self) -> i32 {
        self.code.len() as i32
    }

    pub fn emit(&mut self, instruction: Instruction) {
        if self.code.len() < CODE_SIZE {
            self.code.push(instruction);
        } else {
            self.overflowed = true;
        }
    }

    /// Emite un salto hacia adelante, a completar con [`Emitter::patch()`].
    pub fn emit_forward(&mut self, instruction: Instruction) -> Label {
        let label = Label(self.code.len());
        self.emit(instruction);

        label
    }

    /// Dirige un salto pendiente a la siguiente instrucción por emitir.
    pub fn patch(&mut self, Label(index): Label) {
        let target = self.next_address();
        if let Some(instruction) = self.code.get_mut(index) {
            instruction.d = target;
        }
    }

    pub fn overflowed(&self) -> bool {
        self.overflowed
    }

    pub fn finish(self) -> ObjectProgram {
        ObjectProgram { code: self.code }
    }
}

/// Programa TAM completo.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ObjectProgram {
    code: Vec<Instruction>,
}

impl ObjectProgram {
    pub fn instructions(&self) -> &[Instruction] {
        &self.code
    }

    /// Escribe la codificación binaria del programa.
    pub fn write<W: Write>(&self, output: &mut W) -> io::Result<()> {
        for instruction in &self.code {
            output.write_all(&instruction.encode())?;
        }

        Ok(())
    }

    /// Guarda el programa en un archivo, reemplazando su contenido previo.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let mut output = BufWriter::new(File::create(path)?);
        self.write(&mut output)?;

        output.flush()
    }
}

impl Display for ObjectProgram {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (address, instruction) in self.code.iter().enumerate() {
            writeln!(fmt, "{:4}:  {}", address, instruction)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::{Opcode, Register};

    fn jump(d: i32) -> Instruction {
        Instruction::new(Opcode::Jump, Register::CB, 0, d)
    }

    #[test]
    fn forward_jumps_are_patched() {
        let mut emitter = Emitter::new();

        let label = emitter.emit_forward(jump(0));
        emitter.emit(Instruction::new(Opcode::LoadL, Register::CB, 0, 7));
        emitter.emit(Instruction::new(Opcode::LoadL, Register::CB, 0, 8));
        emitter.patch(label);

        assert_eq!(emitter.finish().instructions()[0].d, 3);
    }

    #[test]
    fn code_store_limit() {
        let mut emitter = Emitter::new();
        for _ in 0..CODE_SIZE {
            emitter.emit(jump(0));
        }

        assert!(!emitter.overflowed());

        let label = emitter.emit_forward(jump(0));
        emitter.patch(label);

        assert!(emitter.overflowed());
        assert_eq!(emitter.finish().instructions().len(), CODE_SIZE);
    }

    #[test]
    fn object_file_layout() {
        let mut emitter = Emitter::new();
        emitter.emit(Instruction::new(Opcode::LoadL, Register::CB, 0, 65));
        emitter.emit(Instruction::new(Opcode::Halt, Register::CB, 0, 0));

        let mut bytes = Vec::new();
        emitter.finish().write(&mut bytes).unwrap();

        assert_eq!(bytes.len(), 2 * Instruction::ENCODED_SIZE);
        assert_eq!(&bytes[..4], &[0, 0, 0, 3]);
        assert_eq!(&bytes[12..16], &[0, 0, 0, 65]);
        assert_eq!(&bytes[16..20], &[0, 0, 0, 15]);
    }
}
