use std::collections::BTreeSet;

use serde_json::{json, Map, Value};
use ticketbridge_config::{FieldRule, InstanceConfig, IssueTypeSelector, ProjectSelector};

use crate::context::TicketRequestContext;
use crate::data::TicketData;

/// Build the body of `POST /rest/api/{v}/issue`.
///
/// Fields derived from configuration come first; every ticket data entry
/// that was not read by one of them and is not excluded is forwarded under
/// its own name. Missing data never fails here.
pub fn build_create_payload(
    instance: &InstanceConfig,
    context: &TicketRequestContext,
    data: &TicketData,
) -> Value {
    let mut fields = Map::new();
    let mut consumed: BTreeSet<String> = BTreeSet::new();

    let project = match &instance.project {
        ProjectSelector::Id { id } => Some(json!({ "id": id })),
        ProjectSelector::Key { key } => Some(json!({ "key": key })),
        ProjectSelector::Field { field } => {
            consume(&mut consumed, field);
            data.get_path(field).map(|value| json!({ "id": scalar_text(value) }))
        }
    };
    if let Some(project) = project {
        fields.insert("project".to_string(), project);
    }

    let issue_type = match &instance.issue_type {
        IssueTypeSelector::Id { id } => json!({ "id": id }),
        IssueTypeSelector::Name { name } => json!({ "name": name }),
    };
    fields.insert("issuetype".to_string(), issue_type);

    consume(&mut consumed, &instance.summary_field);
    if let Some(summary) = data.get_path(&instance.summary_field) {
        fields.insert("summary".to_string(), summary.clone());
    }

    if instance.reporter_from_context {
        fields.insert(
            "reporter".to_string(),
            json!({ "name": context.username }),
        );
    }

    for (name, rule) in &instance.fields {
        for source in rule.sources() {
            consume(&mut consumed, source);
        }
        if let Some(value) = apply_rule(rule, data) {
            fields.insert(name.clone(), value);
        }
    }

    for (name, value) in data.iter() {
        if consumed.contains(name)
            || instance.exclude.iter().any(|excluded| excluded == name)
            || fields.contains_key(name)
        {
            continue;
        }
        fields.insert(name.clone(), value.clone());
    }

    json!({ "fields": fields })
}

/// Marks the top-level key a path reads from.
fn consume(consumed: &mut BTreeSet<String>, path: &str) {
    consumed.insert(path.to_string());
    if let Some((root, _)) = path.split_once('.') {
        consumed.insert(root.to_string());
    }
}

fn apply_rule(rule: &FieldRule, data: &TicketData) -> Option<Value> {
    match rule {
        FieldRule::From { from } => data.get_path(from).cloned(),
        FieldRule::Const { value } => Some(value.clone()),
        FieldRule::Flag {
            flag,
            when_true,
            when_false,
        } => data.get_path(flag).map(|value| {
            if is_truthy(value) {
                when_true.clone()
            } else {
                when_false.clone()
            }
        }),
        FieldRule::Join { join, separator } => {
            let parts: Vec<String> = join
                .iter()
                .filter_map(|path| data.get_path(path))
                .map(scalar_text)
                .collect();
            if parts.is_empty() {
                None
            } else {
                Some(Value::String(parts.join(separator)))
            }
        }
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(false, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}
