//! Tipos semánticos.
//!
//! Los denotadores de tipo del árbol se reducen a [`Type`], siguiendo
//! alias por nombre. La equivalencia es estructural: arreglos por
//! longitud y tipo de elemento, registros por nombres y tipos de campo
//! en orden. [`Type::Error`] es equivalente a cualquier tipo.

use std::fmt::{self, Display};

use crate::machine::PRIMITIVE_SIZE;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Type {
    Bool,
    Char,
    Int,

    /// Operando de `=` y `\=`. No es equivalente a ningún tipo salvo
    /// [`Type::Error`]; el checker lo atiende como caso especial.
    Any,

    /// Centinela tras un error ya reportado.
    Error,

    Array { length: i32, element: Box<Type> },
    Record(Vec<Field>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub of: Type,
}

impl Type {
    pub fn equivalent(&self, other: &Type) -> bool {
        use Type::*;

        match (self, other) {
            (Error, _) | (_, Error) => true,
            (Bool, Bool) | (Char, Char) | (Int, Int) => true,

            (
                Array { length, element },
                Array {
                    length: other_length,
                    element: other_element,
                },
            ) => length == other_length && element.equivalent(other_element),

            (Record(fields), Record(other_fields)) => {
                fields.len() == other_fields.len()
                    && fields
                        .iter()
                        .zip(other_fields)
                        .all(|(field, other)| field.name == other.name && field.of.equivalent(&other.of))
            }

            _ => false,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Type::Error)
    }

    /// Tamaño en palabras de un valor de este tipo.
    pub fn size(&self) -> i32 {
        match self {
            Type::Bool | Type::Char | Type::Int => PRIMITIVE_SIZE,
            Type::Any | Type::Error => 0,
            Type::Array { length, element } => length * element.size(),
            Type::Record(fields) => fields.iter().map(|field| field.of.size()).sum(),
        }
    }

    /// Busca un campo de registro, junto con su desplazamiento.
    pub fn field(&self, name: &str) -> Option<(i32, &Type)> {
        let fields = match self {
            Type::Record(fields) => fields,
            _ => return None,
        };

        let mut offset = 0;
        for field in fields {
            if field.name == name {
                return Some((offset, &field.of));
            }

            offset += field.of.size();
        }

        None
    }
}

impl Display for Type {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Bool => fmt.write_str("Boolean"),
            Type::Char => fmt.write_str("Char"),
            Type::Int => fmt.write_str("Integer"),
            Type::Any => fmt.write_str("any"),
            Type::Error => fmt.write_str("<error>"),
            Type::Array { length, element } => write!(fmt, "array {} of {}", length, element),

            Type::Record(fields) => {
                fmt.write_str("record ")?;
                for (index, field) in fields.iter().enumerate() {
                    if index > 0 {
                        fmt.write_str(", ")?;
                    }

                    write!(fmt, "{}: {}", field.name, field.of)?;
                }

                fmt.write_str(" end")
            }
        }
    }
}

/// Parámetro formal, tal como aparece en la firma de una rutina.
#[derive(Clone, Debug)]
pub enum Formal {
    Const(Type),
    Var(Type),
    Proc(Vec<Formal>),
    Func(Vec<Formal>, Type),
}

impl Formal {
    /// Nombre del modo de paso, para mensajes de error.
    pub fn mode(&self) -> &'static str {
        match self {
            Formal::Const(_) => "const",
            Formal::Var(_) => "var",
            Formal::Proc(_) => "proc",
            Formal::Func(_, _) => "func",
        }
    }

    pub fn matches(&self, other: &Formal) -> bool {
        match (self, other) {
            (Formal::Const(this), Formal::Const(other)) => this.equivalent(other),
            (Formal::Var(this), Formal::Var(other)) => this.equivalent(other),
            (Formal::Proc(this), Formal::Proc(other)) => signatures_match(this, other),
            (Formal::Func(this, result), Formal::Func(other, other_result)) => {
                signatures_match(this, other) && result.equivalent(other_result)
            }

            _ => false,
        }
    }
}

pub fn signatures_match(this: &[Formal], other: &[Formal]) -> bool {
    this.len() == other.len() && this.iter().zip(other).all(|(this, other)| this.matches(other))
}
