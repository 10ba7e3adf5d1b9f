/// Emite una instrucción TAM, con la misma forma que su disasembly:
/// `emit!(encoder, Load(n), register, d)` o `emit!(encoder, Jump, register, d)`
/// cuando `n` es cero.
macro_rules! emit {
    ($encoder:expr, $opcode:ident($n:expr), $register:expr, $d:expr) => {
        $encoder.emit(crate::machine::Instruction::new(
            crate::machine::Opcode::$opcode,
            $register,
            $n,
            $d,
        ))
    };

    ($encoder:expr, $opcode:ident, $register:expr, $d:expr) => {
        emit!($encoder, $opcode(0), $register, $d)
    };
}
