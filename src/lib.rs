//! Compilador de Triangle a código de la máquina abstracta TAM.
//!
//! # Front end
//! Cada programa deriva de un único archivo de código fuente, descrito
//! en [`source`]. Este archivo se somete primero a análisis léxico en
//! [`lex`], de lo cual se obtiene un flujo de tokens. El flujo de tokens
//! se dispone en un AST ([`ast`]) por medio de análisis sintáctico en
//! [`parse`]. El árbol es luego verificado por análisis contextual en
//! [`semantic`], el cual produce anotaciones de tipos y asociaciones en
//! tablas laterales, sin mutar el árbol.
//!
//! # Back end
//! Opcionalmente, [`fold`] reemplaza subexpresiones constantes por
//! literales. La generación de código en [`codegen`] recorre el árbol
//! anotado, asigna direcciones en marcos de activación y emite
//! instrucciones de [`machine`]. Todas las fases reportan errores a un
//! [`error::Reporter`] compartido; [`driver`] decide qué fases corren
//! según el conteo de errores.
//!
//! [`summary`] y [`tree`] son visitantes de solo lectura para
//! diagnóstico.

#[macro_use]
mod macros;

pub mod ast;
pub mod codegen;
pub mod driver;
pub mod error;
pub mod fold;
pub mod lex;
pub mod machine;
pub mod parse;
pub mod semantic;
pub mod source;
pub mod summary;
pub mod tree;
