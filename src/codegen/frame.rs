use crate::machine::Register;

/// Dirección en tiempo de ejecución de una entidad.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Address {
    /// Nivel de rutina donde se declaró la entidad, 0 para el nivel global.
    pub level: u8,
    pub displacement: i32,
}

/// Estado de asignación de un frame durante la generación.
///
/// `size` es la cantidad de palabras ya ocupadas en el frame, incluyendo
/// los temporales que la evaluación actual dejó sobre la pila.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub level: u8,
    pub size: i32,
}

impl Frame {
    /// Frame global.
    pub fn global() -> Self {
        Frame { level: 0, size: 0 }
    }

    /// Frame de una rutina declarada en este frame.
    pub fn push(self, size: i32) -> Self {
        Frame {
            level: self.level + 1,
            size,
        }
    }

    pub fn expand(self, size: i32) -> Self {
        Frame {
            level: self.level,
            size: self.size + size,
        }
    }

    /// Dirección de la siguiente palabra libre.
    pub fn top(self) -> Address {
        Address {
            level: self.level,
            displacement: self.size,
        }
    }

    /// Registro de display para alcanzar una dirección desde este frame.
    ///
    /// Las entidades globales se alcanzan por `SB`; las demás, por `LB`
    /// o por la cadena estática. No existe registro para más de seis
    /// niveles hacia afuera.
    pub fn display(self, address: Address) -> Option<Register> {
        if address.level == 0 {
            Some(Register::SB)
        } else {
            Register::display(self.level.checked_sub(address.level)?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(level: u8) -> Address {
        Address {
            level,
            displacement: 0,
        }
    }

    #[test]
    fn display_registers() {
        let frame = Frame::global().push(3).push(3);

        assert_eq!(frame.level, 2);
        assert_eq!(frame.display(at(0)), Some(Register::SB));
        assert_eq!(frame.display(at(2)), Some(Register::LB));
        assert_eq!(frame.display(at(1)), Some(Register::L1));
    }

    #[test]
    fn display_out_of_reach() {
        let mut frame = Frame::global();
        for _ in 0..8 {
            frame = frame.push(3);
        }

        assert_eq!(frame.display(at(2)), Some(Register::L6));
        assert_eq!(frame.display(at(1)), None);
    }

    #[test]
    fn expansion_tracks_top() {
        let frame = Frame::global().expand(2).expand(3);
        assert_eq!(frame.top().displacement, 5);
        assert_eq!(frame.push(3).top(), Address { level: 1, displacement: 3 });
    }
}
