use std::collections::{hash_map::Entry, HashMap};

use super::{Decl, Meaning};

/// Asociación de un nombre en una tabla de símbolos.
#[derive(Clone, Debug)]
pub struct Binding {
    pub decl: Decl,
    pub meaning: Meaning,
}

/// Un nivel léxico de la tabla.
#[derive(Debug, Default)]
pub struct Scope(HashMap<String, Binding>);

/// Pila de ámbitos léxicos.
///
/// El ámbito más externo siempre existe y contiene al entorno estándar.
/// La búsqueda procede del ámbito más interno al más externo, por lo
/// cual una declaración interna oculta a cualquier homónimo externo.
#[derive(Debug, Default)]
pub struct SymbolTable {
    outermost: Scope,
    nested: Vec<Scope>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable::default()
    }

    pub fn open_scope(&mut self) {
        self.nested.push(Scope::default());
    }

    /// Cierra el ámbito más interno y lo entrega. El ámbito externo
    /// nunca se cierra.
    pub fn close_scope(&mut self) -> Scope {
        self.nested.pop().unwrap_or_default()
    }

    /// Reabre un ámbito previamente cerrado.
    pub fn restore_scope(&mut self, scope: Scope) {
        self.nested.push(scope);
    }

    /// Profundidad actual, donde el entorno estándar es 0.
    #[cfg(test)]
    pub fn depth(&self) -> usize {
        self.nested.len()
    }

    /// Introduce un nombre en el ámbito más interno.
    ///
    /// Si el nombre ya existía en ese mismo ámbito, la asociación previa
    /// se conserva y se retorna como error.
    pub fn enter(&mut self, name: &str, binding: Binding) -> Result<(), &Binding> {
        let Scope(scope) = match self.nested.last_mut() {
            Some(scope) => scope,
            None => &mut self.outermost,
        };

        match scope.entry(name.to_owned()) {
            Entry::Occupied(existing) => Err(&*existing.into_mut()),
            Entry::Vacant(vacant) => {
                vacant.insert(binding);
                Ok(())
            }
        }
    }

    pub fn retrieve(&self, name: &str) -> Option<&Binding> {
        self.nested
            .iter()
            .rev()
            .chain(std::iter::once(&self.outermost))
            .find_map(|Scope(scope)| scope.get(name))
    }
}
