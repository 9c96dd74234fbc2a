//! fixed-width tables, as printed by `wmic <class> get <properties>`.
//!
//! ```text
//! CurrentClockSpeed  LoadPercentage  Name
//! 3192               7               Intel(R) Core(TM) i7-8700 CPU @ 3.20GHz
//! ```
//!
//! each column starts where its header starts, and runs until the next column begins. values
//! may contain single spaces.

use {
    std::{collections::BTreeMap, str::FromStr},
    thiserror::Error,
};

/// one row of a table, keyed by lowercased column name.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    class: String,
    fields: BTreeMap<String, Field>,
}

/// the value of one cell.
#[derive(Clone, Debug, PartialEq)]
pub enum Field {
    Number(f64),
    Text(String),
}

#[derive(Debug, Error, PartialEq)]
pub enum TableError {
    #[error("table has no header")]
    MissingHeader,
    #[error("column `{0}` appears more than once")]
    DuplicateColumn(String),
    #[error("row {row} has text before the first column")]
    Misaligned { row: usize },
}

/// a column: its lowercased name, and the character offset it starts at.
struct Column {
    name: String,
    start: usize,
}

// === impl Record ===

impl Record {
    /// parses every row of a table printed for `class`.
    ///
    /// blank lines and carriage returns are ignored. empty cells are left out of their record.
    pub fn parse_table(class: &str, output: &str) -> Result<Vec<Self>, TableError> {
        let mut lines = output
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.trim().is_empty());

        let header = lines.next().ok_or(TableError::MissingHeader)?;
        let columns = Column::parse_header(header)?;

        lines
            .enumerate()
            .map(|(row, line)| Self::parse_row(class, &columns, row, line))
            .collect()
    }

    fn parse_row(class: &str, columns: &[Column], row: usize, line: &str) -> Result<Self, TableError> {
        let chars = line.chars().collect::<Vec<_>>();
        let cell = |start: usize, end: usize| -> String {
            let end = end.min(chars.len());
            let start = start.min(end);
            chars[start..end].iter().collect::<String>().trim().to_owned()
        };

        let first = columns.first().map_or(0, |c| c.start);
        if !cell(0, first).is_empty() {
            return Err(TableError::Misaligned { row });
        }

        let ends = columns.iter().skip(1).map(|c| c.start).chain([usize::MAX]);
        let fields = columns
            .iter()
            .zip(ends)
            .filter_map(|(column, end)| {
                let value = cell(column.start, end);
                (!value.is_empty()).then(|| (column.name.clone(), value.parse().unwrap_or(Field::Text(value))))
            })
            .collect();

        Ok(Self {
            class: class.to_owned(),
            fields,
        })
    }

    /// returns the class this record was queried from.
    pub fn class(&self) -> &str {
        &self.class
    }

    /// returns a field, by case-insensitive name.
    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.get(&name.to_lowercase())
    }

    /// returns a numeric field.
    pub fn number(&self, name: &str) -> Option<f64> {
        match self.get(name)? {
            Field::Number(n) => Some(*n),
            Field::Text(_) => None,
        }
    }

    /// returns a field as text. numbers are formatted.
    pub fn text(&self, name: &str) -> Option<String> {
        self.get(name).map(|field| match field {
            Field::Number(n) => n.to_string(),
            Field::Text(text) => text.clone(),
        })
    }
}

// === impl Field ===

impl FromStr for Field {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(Self::Number)
            .ok_or(())
    }
}

// === impl Column ===

impl Column {
    fn parse_header(header: &str) -> Result<Vec<Self>, TableError> {
        let mut columns = Vec::<Self>::new();
        let mut start = None;

        for (i, c) in header.chars().chain([' ']).enumerate() {
            match (c.is_whitespace(), start) {
                (false, None) => start = Some(i),
                (true, Some(s)) => {
                    let name = header.chars().skip(s).take(i - s).collect::<String>().to_lowercase();
                    if columns.iter().any(|c| c.name == name) {
                        return Err(TableError::DuplicateColumn(name));
                    }
                    columns.push(Self { name, start: s });
                    start = None;
                }
                _ => {}
            }
        }

        if columns.is_empty() {
            return Err(TableError::MissingHeader);
        }
        Ok(columns)
    }
}
