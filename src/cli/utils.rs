use std::io::Read;

use serde_json::{json, Value};

use crate::cli::client::ApiResponse;
use crate::cli::OutputFormat;

/// Print a response body in the requested format
pub fn output_value(output_format: &OutputFormat, value: &Value) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(value)?),
        OutputFormat::Text => print!("{}", render_text(value)),
    }
    Ok(())
}

/// Output a success message in the appropriate format
pub fn output_success(output_format: &OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Text => println!("✓ {}", message),
        _ => {
            let mut response = json!({ "success": true, "message": message });
            if let (Some(target), Some(Value::Object(extra))) = (response.as_object_mut(), data) {
                target.extend(extra);
            }
            output_value(output_format, &response)?;
        }
    }
    Ok(())
}

/// Report the outcome of a create/update/delete call
pub fn output_mutation(output_format: &OutputFormat, action: &str, response: ApiResponse) -> anyhow::Result<()> {
    match response {
        ApiResponse::Created(Some(location)) => output_success(
            output_format,
            &format!("{} at {}", action, location),
            Some(json!({ "location": location })),
        ),
        ApiResponse::Body(value) => output_value(output_format, &value),
        _ => output_success(output_format, action, None),
    }
}

/// Read a JSON document from stdin
pub fn read_stdin_json() -> anyhow::Result<Value> {
    let mut input = String::new();
    std::io::stdin().read_to_string(&mut input)?;
    if input.trim().is_empty() {
        anyhow::bail!("expected a JSON document on stdin");
    }
    Ok(serde_json::from_str(&input)?)
}

/// Indented `key: value` rendering for terminals
pub fn render_text(value: &Value) -> String {
    let mut out = String::new();
    render_into(&mut out, value, 0);
    out
}

fn render_into(out: &mut String, value: &Value, indent: usize) {
    let pad = "  ".repeat(indent);
    match value {
        Value::Object(map) => {
            for (key, value) in map {
                match value {
                    Value::Object(_) | Value::Array(_) if !is_empty(value) => {
                        out.push_str(&format!("{}{}:\n", pad, key));
                        render_into(out, value, indent + 1);
                    }
                    _ => out.push_str(&format!("{}{}: {}\n", pad, key, scalar(value))),
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                match item {
                    Value::Object(_) | Value::Array(_) => {
                        out.push_str(&format!("{}-\n", pad));
                        render_into(out, item, indent + 1);
                    }
                    _ => out.push_str(&format!("{}- {}\n", pad, scalar(item))),
                }
            }
        }
        _ => out.push_str(&format!("{}{}\n", pad, scalar(value))),
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "-".to_string(),
        Value::Array(_) => "[]".to_string(),
        Value::Object(_) => "{}".to_string(),
        other => other.to_string(),
    }
}
