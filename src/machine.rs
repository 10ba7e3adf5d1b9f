//! Descripción de la máquina abstracta TAM.
//!
//! TAM es una máquina de pila con memoria de código y memoria de datos
//! separadas. Cada instrucción consta de cuatro campos: `op` (código de
//! operación), `r` (registro), `n` (tamaño o conteo) y `d` (desplazamiento
//! o literal). Este módulo define el conjunto de instrucciones, los
//! registros, las rutinas primitivas y los límites de la máquina; no
//! incluye un intérprete.

use std::fmt::{self, Display};

/// Máximo entero representable, expuesto como `maxint`.
pub const MAXINT: i32 = 32767;

/// Capacidad del almacén de código, en instrucciones.
pub const CODE_SIZE: usize = 1024;

/// Máximo valor del campo `n`.
pub const MAX_N: i32 = 255;

/// Máxima profundidad de anidamiento de rutinas.
pub const MAX_ROUTINE_LEVEL: u8 = 7;

/// Tamaño de los datos de enlace de un frame: enlace estático,
/// enlace dinámico y dirección de retorno.
pub const LINK_DATA_SIZE: i32 = 3;

/// Tamaño de una clausura: enlace estático y dirección de código.
pub const CLOSURE_SIZE: i32 = 2;

/// Tamaño de una dirección de datos.
pub const ADDRESS_SIZE: i32 = 1;

/// Tamaño de todo valor primitivo (`Boolean`, `Char`, `Integer`).
pub const PRIMITIVE_SIZE: i32 = 1;

/// Representación de `false`.
pub const FALSE: i32 = 0;

/// Representación de `true`.
pub const TRUE: i32 = 1;

/// Códigos de operación.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Opcode {
    Load = 0,
    LoadA = 1,
    LoadI = 2,
    LoadL = 3,
    Store = 4,
    StoreI = 5,
    Call = 6,
    CallI = 7,
    Return = 8,
    Push = 10,
    Pop = 11,
    Jump = 12,
    JumpI = 13,
    JumpIf = 14,
    Halt = 15,
}

impl Display for Opcode {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Opcode::*;

        fmt.pad(match self {
            Load => "LOAD",
            LoadA => "LOADA",
            LoadI => "LOADI",
            LoadL => "LOADL",
            Store => "STORE",
            StoreI => "STOREI",
            Call => "CALL",
            CallI => "CALLI",
            Return => "RETURN",
            Push => "PUSH",
            Pop => "POP",
            Jump => "JUMP",
            JumpI => "JUMPI",
            JumpIf => "JUMPIF",
            Halt => "HALT",
        })
    }
}

/// Registros de la máquina.
///
/// `L1` a `L6` son pseudo-registros que denotan el frame `n` niveles
/// hacia afuera del frame actual, siguiendo la cadena estática.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Register {
    CB = 0,
    CT = 1,
    PB = 2,
    PT = 3,
    SB = 4,
    ST = 5,
    HB = 6,
    HT = 7,
    LB = 8,
    L1 = 9,
    L2 = 10,
    L3 = 11,
    L4 = 12,
    L5 = 13,
    L6 = 14,
    CP = 15,
}

impl Register {
    /// Registro de display para alcanzar un frame `levels` niveles
    /// afuera del actual. `LB` corresponde a cero niveles.
    pub fn display(levels: u8) -> Option<Register> {
        use Register::*;

        [LB, L1, L2, L3, L4, L5, L6].get(levels as usize).copied()
    }

    /// Recupera un registro a partir de su número.
    pub fn from_code(code: i32) -> Option<Register> {
        use Register::*;

        const ALL: [Register; 16] = [
            CB, CT, PB, PT, SB, ST, HB, HT, LB, L1, L2, L3, L4, L5, L6, CP,
        ];

        usize::try_from(code).ok().and_then(|index| ALL.get(index).copied())
    }
}

impl Display for Register {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.pad(&format!("{:?}", self))
    }
}

/// Rutinas primitivas, direccionadas como desplazamientos sobre `PB`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Primitive {
    Id = 1,
    Not = 2,
    And = 3,
    Or = 4,
    Succ = 5,
    Pred = 6,
    Neg = 7,
    Add = 8,
    Sub = 9,
    Mult = 10,
    Div = 11,
    Mod = 12,
    Lt = 13,
    Le = 14,
    Ge = 15,
    Gt = 16,
    Eq = 17,
    Ne = 18,
    Eol = 19,
    Eof = 20,
    Get = 21,
    Put = 22,
    GetEol = 23,
    PutEol = 24,
    GetInt = 25,
    PutInt = 26,
    New = 27,
    Dispose = 28,
}

impl Primitive {
    /// Desplazamiento de la rutina respecto a `PB`.
    pub fn displacement(self) -> i32 {
        self as i32
    }
}

/// Una instrucción TAM.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Instruction {
    pub op: Opcode,
    pub r: Register,
    pub n: i32,
    pub d: i32,
}

impl Instruction {
    /// Cantidad de bytes por instrucción en un archivo objeto.
    pub const ENCODED_SIZE: usize = 16;

    pub fn new(op: Opcode, r: Register, n: i32, d: i32) -> Self {
        Instruction { op, r, n, d }
    }

    /// Codifica como cuatro enteros de 32 bits big-endian: `op`, `r`, `n`, `d`.
    pub fn encode(&self) -> [u8; Self::ENCODED_SIZE] {
        let mut bytes = [0; Self::ENCODED_SIZE];
        let fields = [self.op as i32, self.r as i32, self.n, self.d];

        for (chunk, field) in bytes.chunks_exact_mut(4).zip(fields) {
            chunk.copy_from_slice(&field.to_be_bytes());
        }

        bytes
    }
}

impl Display for Instruction {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Opcode::*;

        match self.op {
            Load | LoadA | Store | Jump | JumpIf | Call => {
                let n = match self.op {
                    Load | Store | JumpIf => format!("({})", self.n),
                    Call => match Register::from_code(self.n) {
                        Some(register) => format!("({})", register),
                        None => format!("({})", self.n),
                    },
                    _ => String::new(),
                };

                write!(fmt, "{:8}{:6} {}[{}]", self.op, n, self.d, self.r)
            }

            LoadI | StoreI | Pop | Return => {
                write!(fmt, "{:8}({}) {}", self.op, self.n, self.d)
            }

            LoadL | Push => write!(fmt, "{:8}{}", self.op, self.d),
            CallI | JumpI | Halt => write!(fmt, "{}", self.op),
        }
    }
}
