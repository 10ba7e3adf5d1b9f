//! Entidades de tiempo de ejecución.
//!
//! Cada declaración y cada parámetro formal se traduce a una entidad
//! que indica cómo obtener su valor, su dirección o cómo invocarlo.

use super::frame::Address;
use crate::{machine::Primitive, semantic::StdDecl};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Entity {
    /// Constante cuyo valor se conoce al compilar.
    KnownValue(i32),

    /// Constante calculada en tiempo de ejecución y guardada en el frame.
    UnknownValue(Address),

    /// Variable.
    KnownAddress(Address),

    /// Parámetro `var`: el frame guarda la dirección de la variable.
    UnknownAddress(Address),

    /// Rutina cuyo código se conoce; la dirección indica el nivel del
    /// enlace estático y la instrucción de entrada.
    KnownRoutine(Address),

    /// Parámetro `proc` o `func`: el frame guarda una clausura.
    UnknownRoutine(Address),

    Primitive(Primitive),

    /// `=` o `\=`, que reciben el tamaño de sus operandos.
    Equality(Primitive),

    /// Nombres sin representación, como los tipos.
    Unrepresented,
}

impl Entity {
    /// Entidad de una declaración del entorno estándar.
    pub fn standard(decl: StdDecl) -> Self {
        if let Some(value) = decl.value() {
            return Entity::KnownValue(value);
        }

        match (decl, decl.primitive()) {
            (StdDecl::Eq | StdDecl::Ne, Some(primitive)) => Entity::Equality(primitive),
            (_, Some(primitive)) => Entity::Primitive(primitive),
            (_, None) => Entity::Unrepresented,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_entities() {
        assert_eq!(Entity::standard(StdDecl::True), Entity::KnownValue(1));
        assert_eq!(Entity::standard(StdDecl::Maxint), Entity::KnownValue(32767));
        assert_eq!(Entity::standard(StdDecl::Ne), Entity::Equality(Primitive::Ne));
        assert_eq!(Entity::standard(StdDecl::PutInt), Entity::Primitive(Primitive::PutInt));
        assert_eq!(Entity::standard(StdDecl::Integer), Entity::Unrepresented);
    }
}
