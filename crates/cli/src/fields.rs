use std::fs;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use serde_json::{Map, Value};
use ticketbridge_jira::TicketData;

/// Build ticket data from an optional JSON file and `key=value` pairs.
/// Pairs are applied after the file, so they override it.
pub fn ticket_data(data_file: Option<&Path>, pairs: &[String]) -> Result<TicketData> {
    let mut map = match data_file {
        Some(path) => read_data_file(path)?,
        None => Map::new(),
    };

    for pair in pairs {
        let (key, value) = parse_pair(pair)?;
        insert_path(&mut map, &key, value)?;
    }

    Ok(TicketData::from(map))
}

fn read_data_file(path: &Path) -> Result<Map<String, Value>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Unable to read ticket data from {}", path.display()))?;
    match serde_json::from_str::<Value>(&raw)
        .with_context(|| format!("Invalid JSON in {}", path.display()))?
    {
        Value::Object(map) => Ok(map),
        _ => bail!("{} must contain a JSON object", path.display()),
    }
}

/// `name=Widget` → string, `product_id=3` → number, `tags=["a"]` → array.
fn parse_pair(pair: &str) -> Result<(String, Value)> {
    let (key, raw) = pair
        .split_once('=')
        .ok_or_else(|| anyhow!("Expected key=value, got '{pair}'"))?;
    let key = key.trim();
    if key.is_empty() {
        bail!("Field name cannot be empty in '{pair}'");
    }

    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}

/// Dotted keys build nested objects: `product.name=X` → `{"product": {"name": "X"}}`.
fn insert_path(map: &mut Map<String, Value>, key: &str, value: Value) -> Result<()> {
    match key.split_once('.') {
        None => {
            map.insert(key.to_string(), value);
            Ok(())
        }
        Some((head, rest)) => {
            let entry = map
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            match entry {
                Value::Object(child) => insert_path(child, rest, value),
                _ => bail!("Field '{head}' is already set to a non-object value"),
            }
        }
    }
}
