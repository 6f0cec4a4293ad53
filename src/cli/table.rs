//! Schema-driven table rendering for command output
//!
//! Every command describes its output as an ordered list of [`SchemaField`]s
//! plus rows of [`CellValue`]s, and this module encodes them in the
//! requested [`OutputFormat`]:
//!
//! - `text`: bordered fixed-width table (field sizes are minimum widths,
//!   values are never truncated)
//! - `csv`: header of field names, one record per row
//! - `json` / `yaml`: array of objects keyed by field name, in schema order
//! - `md`: Markdown table
//!
//! Single-entity views use the transposed layout, which only changes the
//! orientation of the `text` output.
//!
//! Line breaks inside a value are shown as `\n` in `text` and `md` output so
//! each record stays on one line. CSV keeps them inside a quoted field, which
//! is valid CSV but means a record can span more than one physical line.

use serde_json::{Map, Number, Value};
use tabled::{builder::Builder, settings::Style};

use crate::cli::OutputFormat;
use crate::core::error::{CliError, Result};

/// Semantic type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Int,
    String,
    Float,
    Bool,
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldType::Int => write!(f, "int"),
            FieldType::String => write!(f, "string"),
            FieldType::Float => write!(f, "float"),
            FieldType::Bool => write!(f, "bool"),
        }
    }
}

/// Column definition: name, type and minimum display width
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaField {
    pub name: String,
    pub field_type: FieldType,
    pub size: usize,
}

impl SchemaField {
    pub fn new(name: impl Into<String>, field_type: FieldType, size: usize) -> Self {
        Self {
            name: name.into(),
            field_type,
            size,
        }
    }

    pub fn int(name: impl Into<String>, size: usize) -> Self {
        Self::new(name, FieldType::Int, size)
    }

    pub fn string(name: impl Into<String>, size: usize) -> Self {
        Self::new(name, FieldType::String, size)
    }
}

/// A typed cell value
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Int(i64),
    Text(String),
    Float(f64),
    Bool(bool),
}

impl CellValue {
    pub fn field_type(&self) -> FieldType {
        match self {
            CellValue::Int(_) => FieldType::Int,
            CellValue::Text(_) => FieldType::String,
            CellValue::Float(_) => FieldType::Float,
            CellValue::Bool(_) => FieldType::Bool,
        }
    }

    /// Get raw string value (no padding, used for CSV and Markdown)
    pub fn raw(&self) -> String {
        match self {
            CellValue::Int(n) => n.to_string(),
            CellValue::Text(s) => s.clone(),
            CellValue::Float(f) => f.to_string(),
            CellValue::Bool(b) => b.to_string(),
        }
    }

    /// Single-line form of the value, with line breaks escaped
    pub fn display(&self) -> String {
        match self {
            CellValue::Text(s) if s.contains(['\n', '\r']) => {
                s.replace('\r', "\\r").replace('\n', "\\n")
            }
            _ => self.raw(),
        }
    }

    /// Format for the text table, padded to `width`. Numbers align right.
    pub fn format_text(&self, width: usize) -> String {
        match self {
            CellValue::Int(_) | CellValue::Float(_) => {
                format!("{:>width$}", self.raw(), width = width)
            }
            _ => format!("{:<width$}", self.display(), width = width),
        }
    }

    /// Get the display width of this cell's content
    pub fn display_width(&self) -> usize {
        self.display().chars().count()
    }

    fn to_json(&self) -> Value {
        match self {
            CellValue::Int(n) => Value::Number((*n).into()),
            CellValue::Text(s) => Value::String(s.clone()),
            CellValue::Float(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
            CellValue::Bool(b) => Value::Bool(*b),
        }
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Int(n)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(f: f64) -> Self {
        CellValue::Float(f)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

/// A titled table: schema plus rows
#[derive(Debug, Clone)]
pub struct Table {
    pub title: String,
    pub caption: Option<String>,
    pub schema: Vec<SchemaField>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Table {
    pub fn new(title: impl Into<String>, schema: Vec<SchemaField>) -> Self {
        Self {
            title: title.into(),
            caption: None,
            schema,
            rows: Vec::new(),
        }
    }

    /// Secondary heading shown in the transposed layout
    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    pub fn push_row(&mut self, row: Vec<CellValue>) {
        self.rows.push(row);
    }

    /// Render one row per record
    pub fn render(&self, format: OutputFormat) -> Result<String> {
        self.validate()?;
        match format {
            OutputFormat::Text => Ok(self.to_text()),
            _ => self.encode(format),
        }
    }

    /// Render each record as field/value pairs. Only `text` differs from
    /// [`Table::render`].
    pub fn render_transposed(&self, format: OutputFormat) -> Result<String> {
        self.validate()?;
        match format {
            OutputFormat::Text => Ok(self.to_text_transposed()),
            _ => self.encode(format),
        }
    }

    fn encode(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Text => Ok(self.to_text()),
            OutputFormat::Csv => self.to_csv(),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&self.to_json_value())?),
            OutputFormat::Yaml => Ok(serde_yml::to_string(&self.to_json_value())?),
            OutputFormat::Md => Ok(self.to_md()),
        }
    }

    /// Every row must have one value per field, of the field's type
    fn validate(&self) -> Result<()> {
        for (idx, row) in self.rows.iter().enumerate() {
            if row.len() != self.schema.len() {
                return Err(CliError::SchemaMismatch {
                    row: idx,
                    reason: format!(
                        "expected {} values, found {}",
                        self.schema.len(),
                        row.len()
                    ),
                });
            }
            for (field, value) in self.schema.iter().zip(row) {
                if field.field_type != value.field_type() {
                    return Err(CliError::SchemaMismatch {
                        row: idx,
                        reason: format!(
                            "column '{}' is declared {} but holds {}",
                            field.name,
                            field.field_type,
                            value.field_type()
                        ),
                    });
                }
            }
        }
        Ok(())
    }

    /// Column widths: declared size, grown to fit header and content
    fn column_widths(&self) -> Vec<usize> {
        self.schema
            .iter()
            .enumerate()
            .map(|(i, field)| {
                let max_content = self
                    .rows
                    .iter()
                    .map(|r| r[i].display_width())
                    .max()
                    .unwrap_or(0);
                field.size.max(field.name.chars().count()).max(max_content)
            })
            .collect()
    }

    fn to_text(&self) -> String {
        let widths = self.column_widths();
        let border = border_line(&widths);
        let mut out = String::new();

        out.push_str(&format!("{} ({}):\n", self.title, self.rows.len()));
        out.push_str(&border);

        let headers: Vec<String> = self
            .schema
            .iter()
            .zip(&widths)
            .map(|(field, w)| format!("{:<width$}", field.name, width = *w))
            .collect();
        out.push_str(&format!("| {} |\n", headers.join(" | ")));
        out.push_str(&border);

        for row in &self.rows {
            let cells: Vec<String> = row
                .iter()
                .zip(&widths)
                .map(|(value, w)| value.format_text(*w))
                .collect();
            out.push_str(&format!("| {} |\n", cells.join(" | ")));
        }
        if !self.rows.is_empty() {
            out.push_str(&border);
        }

        out
    }

    fn to_text_transposed(&self) -> String {
        let label_width = self
            .schema
            .iter()
            .map(|f| f.name.chars().count())
            .max()
            .unwrap_or(0);
        let value_width = self
            .schema
            .iter()
            .enumerate()
            .map(|(i, field)| {
                self.rows
                    .iter()
                    .map(|r| r[i].display_width())
                    .max()
                    .unwrap_or(0)
                    .max(field.size)
            })
            .max()
            .unwrap_or(0);
        let widths = [label_width, value_width];
        let border = border_line(&widths);

        let mut out = String::new();
        out.push_str(&format!("{}\n", self.title));
        if let Some(ref caption) = self.caption {
            out.push_str(&format!("{}\n", caption));
        }

        for row in &self.rows {
            out.push_str(&border);
            for (field, value) in self.schema.iter().zip(row) {
                out.push_str(&format!(
                    "| {:<lw$} | {:<vw$} |\n",
                    field.name,
                    value.display(),
                    lw = label_width,
                    vw = value_width
                ));
            }
            out.push_str(&border);
        }

        out
    }

    fn to_csv(&self) -> Result<String> {
        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());

        writer.write_record(self.schema.iter().map(|f| f.name.as_str()))?;
        for row in &self.rows {
            writer.write_record(row.iter().map(CellValue::raw))?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| CliError::Serialize(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| CliError::Serialize(e.to_string()))
    }

    fn to_json_value(&self) -> Value {
        let records = self
            .rows
            .iter()
            .map(|row| {
                let mut object = Map::new();
                for (field, value) in self.schema.iter().zip(row) {
                    object.insert(field.name.clone(), value.to_json());
                }
                Value::Object(object)
            })
            .collect();
        Value::Array(records)
    }

    fn to_md(&self) -> String {
        let mut builder = Builder::default();
        builder.push_record(self.schema.iter().map(|f| f.name.clone()));
        for row in &self.rows {
            builder.push_record(row.iter().map(CellValue::display));
        }
        let mut out = builder.build().with(Style::markdown()).to_string();
        out.push('\n');
        out
    }
}

fn border_line(widths: &[usize]) -> String {
    let segments: Vec<String> = widths.iter().map(|w| "-".repeat(w + 2)).collect();
    format!("+{}+\n", segments.join("+"))
}

/// Builds a single record whose columns depend on which data is present.
///
/// Fields and values are appended pairwise, so the schema and the row can
/// never drift apart.
#[derive(Debug, Default)]
pub struct RecordBuilder {
    schema: Vec<SchemaField>,
    row: Vec<CellValue>,
}

impl RecordBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: SchemaField, value: impl Into<CellValue>) -> &mut Self {
        self.schema.push(field);
        self.row.push(value.into());
        self
    }

    pub fn into_table(self, title: impl Into<String>) -> Table {
        let mut table = Table::new(title, self.schema);
        table.push_row(self.row);
        table
    }
}
