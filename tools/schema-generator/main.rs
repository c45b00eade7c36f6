use clap::Parser;
use rand::rngs::ThreadRng;
use rand::Rng;
use serde_json::{json, Map, Value};
use std::fs;

/// A CLI tool to generate random schemas and matching value files for
/// large-form stress runs
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// The path to write the generated schema JSON file to
    #[arg(short, long, default_value = "generated_schema.json")]
    output: String,

    /// The path to write the matching values JSON file to
    #[arg(long, default_value = "generated_values.json")]
    values_output: String,

    /// How many fields to generate
    #[arg(long, default_value_t = 24)]
    fields: usize,
}

const TYPES: &[&str] = &[
    "STRING",
    "LONG_TEXT",
    "INTEGER",
    "FLOAT",
    "BOOLEAN",
    "ENUM",
    "STRING_ARRAY",
    "JSON",
];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut rng = rand::rng();

    if cli.fields == 0 {
        eprintln!("Error: --fields must be at least 1");
        std::process::exit(1);
    }

    println!("Generating schema with {} field(s)...", cli.fields);

    let mut fields = Vec::new();
    let mut values = Map::new();

    for index in 0..cli.fields {
        let field_type = TYPES[index % TYPES.len()];
        let key = format!("field_{:03}", index);
        fields.push(generate_field(&mut rng, &key, field_type));

        // Leave some fields unset so the form exercises its empty-value
        // normalization as well.
        if rng.random_range(0..10) < 7 {
            values.insert(key, generate_value(&mut rng, field_type));
        }
    }

    let schema = json!({ "fields": fields });

    fs::write(&cli.output, serde_json::to_string_pretty(&schema)?)?;
    fs::write(
        &cli.values_output,
        serde_json::to_string_pretty(&Value::Object(values))?,
    )?;

    println!(
        "Successfully generated schema '{}' and values '{}'",
        cli.output, cli.values_output
    );

    Ok(())
}

/// Generates one raw schema field of the given type.
fn generate_field(rng: &mut ThreadRng, key: &str, field_type: &str) -> Value {
    let mut field = json!({
        "key": key,
        "type": field_type,
        "nullable": rng.random_range(0..4) > 0,
    });

    if field_type == "ENUM" {
        let count = rng.random_range(2..6);
        let options: Vec<String> = (0..count).map(|i| format!("option_{}", i)).collect();
        field["enum_options"] = json!(options);
    }

    field
}

/// Generates a seed value matching the field type.
fn generate_value(rng: &mut ThreadRng, field_type: &str) -> Value {
    match field_type {
        "STRING" => json!(format!("value {}", rng.random_range(0..1000))),
        "LONG_TEXT" => json!("A longer piece of text\nspanning two lines"),
        "INTEGER" => json!(rng.random_range(-100..100)),
        "FLOAT" => json!(rng.random_range(0.0..100.0)),
        "BOOLEAN" => json!(rng.random_range(0..2) == 1),
        "ENUM" => json!(format!("option_{}", rng.random_range(0..2))),
        "STRING_ARRAY" => {
            let count = rng.random_range(0..4);
            let tags: Vec<String> = (0..count).map(|i| format!("tag_{}", i)).collect();
            json!(tags)
        }
        "JSON" => json!({ "nested": { "weight": rng.random_range(0..50) } }),
        _ => Value::Null,
    }
}
