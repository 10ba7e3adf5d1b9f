//! Rastreo de ubicaciones originales en código fuente.
//!
//! Los distintos objetos internos que el compilador construye
//! deben llevar cuenta de posiciones o rangos de ubicaciones en
//! el código fuente original, lo cual permite determinar un punto
//! exacto o aproximado en donde ocurre un error de abstracción
//! arbitraria.
//!
//! El programa fuente se lee completo antes de iniciar el análisis
//! léxico. Sobre ese texto se expone un [`Cursor`] que avanza carácter
//! por carácter, rastrea línea y columna, y puede retroceder a una
//! [`Mark`] previa.

use std::{
    fmt::{self, Debug, Display, Formatter},
    fs, io,
    ops::Range,
    path::Path,
    rc::Rc,
};

/// Ancho de los divisores de tabulador.
const TAB_STOP: u32 = 4;

/// Un objeto cualquiera con una posición original asociada.
#[derive(Debug, Clone)]
pub struct Located<T> {
    location: Location,
    value: T,
}

impl<T> Located<T> {
    /// Obtiene el valor.
    pub fn val(&self) -> &T {
        &self.value
    }

    /// Obtiene la ubicación.
    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Descarta la ubicación y toma ownership del valor.
    pub fn into_inner(self) -> T {
        self.value
    }

    /// Descompone y toma ownership de las dos partes.
    pub fn split(self) -> (Location, T) {
        (self.location, self.value)
    }

    /// Construye a partir de un valor y una ubicación.
    pub fn at(value: T, location: Location) -> Self {
        Located { value, location }
    }
}

impl<T> AsRef<T> for Located<T> {
    fn as_ref(&self) -> &T {
        &self.value
    }
}

/// Una ubicación está conformada por un origen y un rango de posiciones.
///
/// El final del rango es exclusivo.
#[derive(Clone)]
pub struct Location {
    from: Rc<Source>,
    position: Range<Position>,
}

impl Location {
    /// Unifica un rango de ubicaciones. Se asume el mismo origen.
    pub fn span(from: Location, to: &Location) -> Self {
        Location {
            from: from.from,
            position: from.position.start..to.position.end,
        }
    }

    /// Obtiene la posición de inicio.
    pub fn start(&self) -> Position {
        self.position.start
    }

    /// Obtiene la posición de fin.
    pub fn end(&self) -> Position {
        self.position.end
    }

    /// Obtiene el origen de la ubicación.
    pub fn source(&self) -> &Source {
        &self.from
    }
}

impl Display for Location {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}:", self.from.name)?;

        let Range { start, end } = self.position;
        if end <= start.advance() {
            // Solo se señala una columna en específico
            write!(formatter, "{}", start)
        } else {
            write!(formatter, "[{}-{}]", start, end.back())
        }
    }
}

impl Debug for Location {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        <Self as Display>::fmt(self, formatter)
    }
}

/// Una posición línea-columna en un archivo.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub struct Position {
    line: u32,
    column: u32,
}

impl Position {
    /// Obtiene el número de línea.
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Obtiene el número de columna.
    pub fn column(&self) -> u32 {
        self.column
    }

    /// Incrementa el número de columna.
    pub fn advance(self) -> Position {
        Position {
            line: self.line,
            column: self.column + 1,
        }
    }

    /// Decrementa el número de columna.
    pub fn back(self) -> Position {
        Position {
            line: self.line,
            column: self.column.saturating_sub(1).max(1),
        }
    }

    /// Incrementa el número de línea y retorna a la columna 1.
    pub fn newline(self) -> Position {
        Position {
            line: self.line + 1,
            column: 1,
        }
    }

    /// Ajusta la posición a la siguiente columna de tabulador.
    pub fn tab(self) -> Position {
        let column = 1 + ((self.column - 1) / TAB_STOP + 1) * TAB_STOP;
        Position {
            line: self.line,
            column,
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Position { line: 1, column: 1 }
    }
}

impl Display for Position {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}:{}", self.line, self.column)
    }
}

impl Debug for Position {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        <Self as Display>::fmt(self, formatter)
    }
}

/// Nombre de origen y texto completo del programa.
pub struct Source {
    name: String,
    text: String,
    lines: Vec<Range<usize>>,
}

impl Source {
    /// Construye un origen a partir de texto ya cargado.
    pub fn new<S, T>(name: S, text: T) -> Rc<Self>
    where
        S: Into<String>,
        T: Into<String>,
    {
        let text = text.into();

        let mut lines = Vec::new();
        let mut start = 0;
        for (index, c) in text.char_indices() {
            if c == '\n' {
                lines.push(start..index);
                start = index + 1;
            }
        }

        lines.push(start..text.len());

        Rc::new(Source {
            name: name.into(),
            text,
            lines,
        })
    }

    /// Lee un archivo completo.
    ///
    /// Un fallo aquí es fatal y ocurre antes de cualquier fase,
    /// por lo cual no pasa por el [`crate::error::Reporter`].
    pub fn load<P: AsRef<Path>>(path: P) -> io::Result<Rc<Self>> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;

        Ok(Source::new(path.display().to_string(), text))
    }

    /// Nombre del origen, usualmente una ruta.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invoca `callback` con el contenido de una línea, sin el salto final.
    ///
    /// Líneas fuera de rango se tratan como vacías.
    pub fn with_line<F, R>(&self, line: u32, callback: F) -> R
    where
        F: FnOnce(&str) -> R,
    {
        let line = (line as usize)
            .checked_sub(1)
            .and_then(|index| self.lines.get(index))
            .map(|range| self.text[range.clone()].trim_end_matches('\r'))
            .unwrap_or("");

        callback(line)
    }

    /// Crea un cursor al inicio del texto.
    pub fn cursor(self: &Rc<Self>) -> Cursor {
        Cursor {
            source: Rc::clone(self),
            offset: 0,
            position: Position::default(),
        }
    }
}

/// Cursor de caracteres sobre un [`Source`].
pub struct Cursor {
    source: Rc<Source>,
    offset: usize,
    position: Position,
}

/// Punto de retorno para [`Cursor::rewind()`].
#[derive(Copy, Clone, Debug)]
pub struct Mark {
    offset: usize,
    position: Position,
}

impl Cursor {
    /// Observa el siguiente carácter sin consumirlo.
    pub fn peek(&self) -> Option<char> {
        self.source.text[self.offset..].chars().next()
    }

    /// Consume un carácter, actualizando línea y columna.
    pub fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;

        self.offset += c.len_utf8();
        self.position = match c {
            '\n' => self.position.newline(),
            '\t' => self.position.tab(),
            _ => self.position.advance(),
        };

        Some(c)
    }

    /// Recuerda el punto actual.
    pub fn mark(&self) -> Mark {
        Mark {
            offset: self.offset,
            position: self.position,
        }
    }

    /// Retrocede a un punto previamente recordado.
    pub fn rewind(&mut self, mark: Mark) {
        self.offset = mark.offset;
        self.position = mark.position;
    }

    /// Posición del siguiente carácter.
    pub fn position(&self) -> Position {
        self.position
    }

    /// Ubicación desde `start` hasta la posición actual.
    pub fn location_from(&self, start: Position) -> Location {
        let end = if self.position > start {
            self.position
        } else {
            start.advance()
        };

        Location {
            from: Rc::clone(&self.source),
            position: start..end,
        }
    }

    /// Texto entre una marca y la posición actual.
    pub fn slice_from(&self, mark: Mark) -> &str {
        &self.source.text[mark.offset..self.offset]
    }
}
