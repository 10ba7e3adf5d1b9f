//! Entorno estándar.
//!
//! Estas declaraciones ocupan el ámbito más externo antes de analizar
//! cualquier programa. No tienen nodo en el árbol; se identifican por
//! [`StdDecl`] y la generación de código las resuelve directamente a
//! valores conocidos o a rutinas primitivas de la máquina.

use super::{
    scope::{Binding, SymbolTable},
    types::{Formal, Type},
    Decl, Meaning,
};

use crate::machine::{Primitive, FALSE, MAXINT, TRUE};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum StdDecl {
    Boolean,
    Char,
    Integer,

    False,
    True,
    Maxint,

    Not,
    And,
    Or,
    Add,
    Sub,
    Mult,
    Div,
    Mod,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,

    Chr,
    Ord,
    Eof,
    Eol,

    Get,
    Put,
    GetInt,
    PutInt,
    GetEol,
    PutEol,
}

impl StdDecl {
    pub const ALL: [StdDecl; 30] = {
        use StdDecl::*;

        [
            Boolean, Char, Integer, False, True, Maxint, Not, And, Or, Add, Sub, Mult, Div, Mod,
            Lt, Le, Gt, Ge, Eq, Ne, Chr, Ord, Eof, Eol, Get, Put, GetInt, PutInt, GetEol, PutEol,
        ]
    };

    pub fn spelling(self) -> &'static str {
        use StdDecl::*;

        match self {
            Boolean => "Boolean",
            Char => "Char",
            Integer => "Integer",
            False => "false",
            True => "true",
            Maxint => "maxint",
            Not => "\\",
            And => "/\\",
            Or => "\\/",
            Add => "+",
            Sub => "-",
            Mult => "*",
            Div => "/",
            Mod => "//",
            Lt => "<",
            Le => "<=",
            Gt => ">",
            Ge => ">=",
            Eq => "=",
            Ne => "\\=",
            Chr => "chr",
            Ord => "ord",
            Eof => "eof",
            Eol => "eol",
            Get => "get",
            Put => "put",
            GetInt => "getint",
            PutInt => "putint",
            GetEol => "geteol",
            PutEol => "puteol",
        }
    }

    pub fn meaning(self) -> Meaning {
        use StdDecl::*;

        let binary = |left, right, result| Meaning::Binary {
            left,
            right,
            result,
        };

        match self {
            Boolean => Meaning::Type(Type::Bool),
            Char => Meaning::Type(Type::Char),
            Integer => Meaning::Type(Type::Int),

            False | True => Meaning::Const(Type::Bool),
            Maxint => Meaning::Const(Type::Int),

            Not => Meaning::Unary {
                operand: Type::Bool,
                result: Type::Bool,
            },

            And | Or => binary(Type::Bool, Type::Bool, Type::Bool),
            Add | Sub | Mult | Div | Mod => binary(Type::Int, Type::Int, Type::Int),
            Lt | Le | Gt | Ge => binary(Type::Int, Type::Int, Type::Bool),
            Eq | Ne => binary(Type::Any, Type::Any, Type::Bool),

            Chr => Meaning::Func(vec![Formal::Const(Type::Int)], Type::Char),
            Ord => Meaning::Func(vec![Formal::Const(Type::Char)], Type::Int),
            Eof | Eol => Meaning::Func(vec![], Type::Bool),

            Get => Meaning::Proc(vec![Formal::Var(Type::Char)]),
            Put => Meaning::Proc(vec![Formal::Const(Type::Char)]),
            GetInt => Meaning::Proc(vec![Formal::Var(Type::Int)]),
            PutInt => Meaning::Proc(vec![Formal::Const(Type::Int)]),
            GetEol | PutEol => Meaning::Proc(vec![]),
        }
    }

    /// Valor de las constantes estándar.
    pub fn value(self) -> Option<i32> {
        match self {
            StdDecl::False => Some(FALSE),
            StdDecl::True => Some(TRUE),
            StdDecl::Maxint => Some(MAXINT),
            _ => None,
        }
    }

    /// Rutina primitiva que implementa un operador, función o procedimiento.
    pub fn primitive(self) -> Option<Primitive> {
        use StdDecl::*;

        let primitive = match self {
            Not => Primitive::Not,
            And => Primitive::And,
            Or => Primitive::Or,
            Add => Primitive::Add,
            Sub => Primitive::Sub,
            Mult => Primitive::Mult,
            Div => Primitive::Div,
            Mod => Primitive::Mod,
            Lt => Primitive::Lt,
            Le => Primitive::Le,
            Gt => Primitive::Gt,
            Ge => Primitive::Ge,
            Eq => Primitive::Eq,
            Ne => Primitive::Ne,
            Chr | Ord => Primitive::Id,
            Eof => Primitive::Eof,
            Eol => Primitive::Eol,
            Get => Primitive::Get,
            Put => Primitive::Put,
            GetInt => Primitive::GetInt,
            PutInt => Primitive::PutInt,
            GetEol => Primitive::GetEol,
            PutEol => Primitive::PutEol,
            Boolean | Char | Integer | False | True | Maxint => return None,
        };

        Some(primitive)
    }

    /// Busca un operador u otro nombre estándar por su lexema.
    pub fn lookup(spelling: &str) -> Option<StdDecl> {
        StdDecl::ALL
            .iter()
            .copied()
            .find(|decl| decl.spelling() == spelling)
    }
}

/// Siembra el ámbito más externo de una tabla de símbolos.
pub fn populate(table: &mut SymbolTable) {
    for decl in StdDecl::ALL {
        let binding = Binding {
            decl: Decl::Std(decl),
            meaning: decl.meaning(),
        };

        let entered = table.enter(decl.spelling(), binding);
        debug_assert!(entered.is_ok(), "duplicated standard spelling");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_standard_name_is_reachable() {
        let mut table = SymbolTable::new();
        populate(&mut table);

        for decl in StdDecl::ALL {
            let binding = table.retrieve(decl.spelling());
            assert!(matches!(binding, Some(Binding { decl: Decl::Std(found), .. }) if *found == decl));
        }
    }

    #[test]
    fn operators_map_to_primitives() {
        assert_eq!(StdDecl::lookup("//"), Some(StdDecl::Mod));
        assert_eq!(StdDecl::Mod.primitive(), Some(Primitive::Mod));
        assert_eq!(StdDecl::Chr.primitive(), Some(Primitive::Id));
        assert_eq!(StdDecl::Maxint.primitive(), None);
        assert_eq!(StdDecl::Maxint.value(), Some(32767));
    }
}
