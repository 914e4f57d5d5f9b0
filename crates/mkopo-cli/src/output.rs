use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;
use serde_json::Value;
use tabled::builder::Builder;
use tabled::settings::Style;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Pretty,
    Table,
}

pub fn print_output(format: OutputFormat, value: &Value) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(value)?);
        }
        OutputFormat::Pretty => {
            print_pretty(value)?;
        }
        OutputFormat::Table => match render_table(value) {
            Some(table) => println!("{table}"),
            None => print_pretty(value)?,
        },
    }
    Ok(())
}

fn print_pretty(value: &Value) -> Result<()> {
    match value {
        Value::Object(map) => {
            for (key, val) in map {
                let key_colored = key.cyan().bold();
                match val {
                    Value::String(s) => {
                        println!("{}: {}", key_colored, s.green());
                    }
                    Value::Number(n) => {
                        println!("{}: {}", key_colored, n.to_string().yellow());
                    }
                    Value::Bool(b) => {
                        let val_colored = if *b { "true".green() } else { "false".red() };
                        println!("{}: {}", key_colored, val_colored);
                    }
                    Value::Null => {
                        println!("{}: {}", key_colored, "-".dimmed());
                    }
                    Value::Object(_) => {
                        println!("{}:", key_colored);
                        print_pretty(val)?;
                    }
                    _ => {
                        println!("{}: {}", key_colored, val);
                    }
                }
            }
        }
        Value::Array(arr) => {
            for (i, item) in arr.iter().enumerate() {
                println!("\n{}{}:", "Item ".cyan(), (i + 1).to_string().yellow());
                print_pretty(item)?;
            }
        }
        _ => {
            println!("{}", serde_json::to_string_pretty(value)?);
        }
    }
    Ok(())
}

fn cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Arrays of objects become one row per element; a single object becomes a
/// key/value listing. Anything else has no tabular form.
pub fn render_table(value: &Value) -> Option<String> {
    let mut builder = Builder::default();

    match value {
        Value::Array(rows) => {
            let first = rows.first()?.as_object()?;
            let headers: Vec<String> = first.keys().cloned().collect();
            builder.push_record(headers.clone());
            for row in rows {
                let row = row.as_object()?;
                builder.push_record(
                    headers
                        .iter()
                        .map(|h| row.get(h).map(cell).unwrap_or_default()),
                );
            }
        }
        Value::Object(map) => {
            builder.push_record(["field".to_string(), "value".to_string()]);
            for (key, val) in map {
                builder.push_record([key.clone(), cell(val)]);
            }
        }
        _ => return None,
    }

    let mut table = builder.build();
    table.with(Style::rounded());
    Some(table.to_string())
}
