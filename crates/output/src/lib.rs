use std::collections::BTreeSet;

use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use serde_json::{Map, Value};
use tabled::builder::Builder;
use tabled::settings::Style;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Yaml,
    /// Only issue keys (or ids), one per line.
    Quiet,
}

pub struct OutputRenderer {
    format: OutputFormat,
}

impl OutputRenderer {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn render<T: Serialize>(&self, value: &T) -> Result<()> {
        let json_value = serde_json::to_value(value)?;
        print!("{}", self.render_to_string(&json_value)?);
        Ok(())
    }

    /// Confirmation line for operations that return nothing worth rendering.
    pub fn success(&self, message: &str) {
        if self.format == OutputFormat::Table {
            println!("{} {}", "✔".green(), message);
        }
    }

    fn render_to_string(&self, value: &Value) -> Result<String> {
        let rendered = match self.format {
            OutputFormat::Table => match Self::table(value) {
                Some(table) => table,
                None => serde_json::to_string_pretty(value)?,
            },
            OutputFormat::Json => serde_json::to_string_pretty(value)?,
            OutputFormat::Yaml => serde_yaml::to_string(value)?,
            OutputFormat::Quiet => Self::identifiers(value).join("\n"),
        };

        if rendered.is_empty() || rendered.ends_with('\n') {
            Ok(rendered)
        } else {
            Ok(format!("{rendered}\n"))
        }
    }

    /// Arrays of objects become one row per element; a single object becomes
    /// a two-column field/value table.
    fn table(value: &Value) -> Option<String> {
        let (headers, rows) = match value {
            Value::Array(items) => Self::coerce_rows(items)?,
            Value::Object(obj) if !obj.is_empty() => Self::field_rows(obj),
            _ => return None,
        };

        let mut builder = Builder::default();
        builder.push_record(headers);
        for row in rows {
            builder.push_record(row);
        }

        Some(builder.build().with(Style::rounded()).to_string())
    }

    fn coerce_rows(items: &[Value]) -> Option<(Vec<String>, Vec<Vec<String>>)> {
        if items.is_empty() {
            return None;
        }

        let mut headers = BTreeSet::new();
        for item in items {
            if let Value::Object(obj) = item {
                headers.extend(obj.keys().cloned());
            }
        }

        if headers.is_empty() {
            return None;
        }

        let headers: Vec<String> = headers.into_iter().collect();
        let rows: Vec<Vec<String>> = items
            .iter()
            .filter_map(Value::as_object)
            .map(|obj| {
                headers
                    .iter()
                    .map(|header| obj.get(header).map(Self::cell).unwrap_or_default())
                    .collect()
            })
            .collect();

        Some((headers, rows))
    }

    fn field_rows(obj: &Map<String, Value>) -> (Vec<String>, Vec<Vec<String>>) {
        let rows = obj
            .iter()
            .map(|(field, value)| vec![field.clone(), Self::cell(value)])
            .collect();
        (vec!["field".to_string(), "value".to_string()], rows)
    }

    fn identifiers(value: &Value) -> Vec<String> {
        let pick = |item: &Value| -> Option<String> {
            match item {
                Value::Object(obj) => obj.get("key").or_else(|| obj.get("id")).map(Self::cell),
                Value::Null => None,
                other => Some(Self::cell(other)),
            }
        };

        match value {
            Value::Array(items) => items.iter().filter_map(pick).collect(),
            other => pick(other).into_iter().collect(),
        }
    }

    fn cell(value: &Value) -> String {
        match value {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Null => String::new(),
            Value::Object(obj) => {
                // Jira references such as {"name": "High"} read better flattened.
                match obj.get("name").or_else(|| obj.get("key")) {
                    Some(Value::String(s)) if obj.len() == 1 => s.clone(),
                    _ => serde_json::to_string(value).unwrap_or_default(),
                }
            }
            other => serde_json::to_string(other).unwrap_or_default(),
        }
    }
}
