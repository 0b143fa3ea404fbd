//! Column-oriented review table.
//!
//! Every pipeline stage consumes a `Table` and returns a new one with extra
//! columns. Cells read from CSV start out as `Text` (or `Null` for empty
//! cells) and are parsed on demand through the typed accessors on `Value`.

use {
    std::{cmp::Ordering, fmt, fs::File, io::{Read, Write}, path::Path},
    tracing::warn,
    crate::error::{Error, Result},
};

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Text(String),
    Int(i64),
    Float(f64),
    List(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
struct Column {
    name: String,
    values: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<Column>,
    rows: usize,
}

impl Value {
    pub fn text(value: impl Into<String>) -> Self {
        Value::Text(value.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(v) => Some(v.as_str()),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::Float(v) if v.fract() == 0.0 => Some(*v as i64),
            Value::Text(v) => {
                let v = v.trim();
                v.parse::<i64>().ok().or_else(|| {
                    // pandas writes integer columns with nulls as floats ("5.0")
                    v.parse::<f64>().ok().filter(|f| f.fract() == 0.0).map(|f| f as i64)
                })
            },
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            Value::Text(v) => v.trim().parse().ok(),
            _ => None,
        }
    }

    /// Lists are kept as JSON arrays when written to CSV, so text cells are
    /// parsed back the same way.
    pub fn as_list(&self) -> Option<Vec<String>> {
        match self {
            Value::List(v) => Some(v.clone()),
            Value::Text(v) => serde_json::from_str(v).ok(),
            _ => None,
        }
    }

    fn to_cell(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Text(v) => v.clone(),
            Value::Int(v) => v.to_string(),
            Value::Float(v) => v.to_string(),
            Value::List(v) => serde_json::to_string(v).unwrap_or_default(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_cell())
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<Vec<String>> for Value {
    fn from(value: Vec<String>) -> Self {
        Value::List(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_columns<N: Into<String>>(columns: Vec<(N, Vec<Value>)>) -> Result<Self> {
        let mut table = Table::new();
        for (name, values) in columns {
            table.set_column(name, values)?;
        }
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|v| v.name.as_str()).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn column(&self, name: &str) -> Option<&[Value]> {
        self.position(name).map(|index| self.columns[index].values.as_slice())
    }

    pub fn value(&self, name: &str, row: usize) -> Option<&Value> {
        self.column(name).and_then(|values| values.get(row))
    }

    /// Text of every row in `name`. Null and non-text cells read as empty
    /// strings so a single malformed row can't fail a whole batch.
    pub fn texts(&self, name: &str) -> Result<Vec<&str>> {
        let values = self.column(name).ok_or_else(|| Error::MissingColumn(name.to_owned()))?;
        Ok(values.iter().map(|v| v.as_str().unwrap_or("")).collect())
    }

    /// Adds a column, or replaces the one with the same name in place.
    pub fn set_column(&mut self, name: impl Into<String>, values: Vec<Value>) -> Result<()> {
        let name = name.into();

        if self.columns.is_empty() {
            self.rows = values.len();
        } else if values.len() != self.rows {
            return Err(Error::ColumnLength {
                name,
                expected: self.rows,
                actual: values.len(),
            });
        }

        match self.position(&name) {
            Some(index) => self.columns[index].values = values,
            None => self.columns.push(Column { name, values }),
        }

        Ok(())
    }

    pub fn with_column(mut self, name: impl Into<String>, values: Vec<Value>) -> Result<Self> {
        self.set_column(name, values)?;
        Ok(self)
    }

    /// Rewrites every cell of `name`. Returns false when the column is absent.
    pub fn map_column<F>(&mut self, name: &str, f: F) -> bool where F: FnMut(&Value) -> Value {
        match self.position(name) {
            Some(index) => {
                let column = &mut self.columns[index];
                column.values = column.values.iter().map(f).collect();
                true
            },
            None => false,
        }
    }

    /// Keeps rows whose mask entry is true. Returns the number of rows removed.
    pub fn retain_rows(&mut self, mask: &[bool]) -> usize {
        let before = self.rows;

        for column in &mut self.columns {
            let mut keep = mask.iter();
            column.values.retain(|_| *keep.next().unwrap_or(&true));
        }
        self.rows = self.columns.first().map(|v| v.values.len()).unwrap_or(0);

        before - self.rows
    }

    /// Columns listed in `names` that exist in this table, in that order.
    pub fn select(&self, names: &[&str]) -> Table {
        Table {
            columns: names.iter()
                .filter_map(|name| self.position(name).map(|index| self.columns[index].clone()))
                .collect(),
            rows: self.rows,
        }
    }

    /// Stable sort of rows.
    pub fn sort_rows_by<F>(&mut self, mut compare: F) where F: FnMut(&Table, usize, usize) -> Ordering {
        let mut order: Vec<usize> = (0..self.rows).collect();
        {
            let table: &Table = self;
            order.sort_by(|a, b| compare(table, *a, *b));
        }

        for column in &mut self.columns {
            let values = std::mem::take(&mut column.values);
            let mut values: Vec<Option<Value>> = values.into_iter().map(Some).collect();
            column.values = order.iter().map(|i| values[*i].take().unwrap_or(Value::Null)).collect();
        }
    }

    pub fn read_csv<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        let mut columns: Vec<Column> = headers.iter()
            .map(|name| Column { name: name.to_owned(), values: Vec::new() })
            .collect();

        let mut rows = 0;
        for (line, record) in reader.records().enumerate() {
            let record = record?;
            if record.len() != columns.len() {
                warn!("csv record {} has {} fields, expected {}", line + 1, record.len(), columns.len());
            }

            for (index, column) in columns.iter_mut().enumerate() {
                column.values.push(match record.get(index) {
                    Some(field) if !field.is_empty() => Value::text(field),
                    _ => Value::Null,
                });
            }
            rows += 1;
        }

        Ok(Self { columns, rows })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::read_csv(File::open(path)?)
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut writer = csv::Writer::from_writer(writer);

        if !self.columns.is_empty() {
            writer.write_record(self.columns.iter().map(|v| v.name.as_str()))?;
        }
        for row in 0..self.rows {
            writer.write_record(self.columns.iter().map(|v| v.values[row].to_cell()))?;
        }

        writer.flush()?;
        Ok(())
    }

    pub fn to_path(&self, path: impl AsRef<Path>) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        self.write_csv(File::create(path)?)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|v| v.name == name)
    }
}
