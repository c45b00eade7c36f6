use clap::Parser;
use kinyu::prelude::*;
use serde::Deserialize;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Instant;

// --- JSON Deserialization Structs (Input Format Specific) ---
// These structs match the schema dump format and are only used here for
// conversion into Kinyu's canonical RawSchema.

#[derive(Deserialize)]
struct SchemaFile {
    entity: Option<String>,
    fields: Vec<FileField>,
    #[serde(default)]
    relations: Vec<FileRelation>,
}

#[derive(Deserialize)]
struct FileField {
    key: String,
    #[serde(rename = "type")]
    field_type: String,
    #[serde(default, alias = "enumOptions")]
    enum_options: Vec<String>,
    #[serde(default, alias = "isNullable")]
    nullable: bool,
    #[serde(default)]
    components: Vec<FileComponent>,
}

#[derive(Deserialize)]
struct FileComponent {
    component: String,
    #[serde(default)]
    options: Vec<String>,
    min: Option<f64>,
    max: Option<f64>,
    step: Option<f64>,
    language: Option<String>,
}

#[derive(Deserialize)]
struct FileRelation {
    #[serde(alias = "sourceKey")]
    source_key: String,
    #[serde(alias = "relationType")]
    relation_type: String,
    #[serde(alias = "targetEntityId")]
    target_entity_id: String,
}

// --- Converter Implementation ---
// This implements the conversion from the dump format to Kinyu's canonical
// RawSchema.

impl IntoSchema for SchemaFile {
    fn into_schema(self) -> Result<RawSchema, SchemaError> {
        let fields = self
            .fields
            .into_iter()
            .map(|field| kinyu::schema::RawField {
                key: field.key,
                field_type: field.field_type,
                enum_options: field.enum_options,
                nullable: field.nullable,
                components: field
                    .components
                    .into_iter()
                    .map(|c| kinyu::schema::RawComponent {
                        component: c.component,
                        options: c.options,
                        min: c.min,
                        max: c.max,
                        step: c.step,
                        language: c.language,
                    })
                    .collect(),
            })
            .collect();

        let relations = self
            .relations
            .into_iter()
            .map(|r| kinyu::schema::RawRelation {
                source_key: r.source_key,
                relation_type: r.relation_type,
                target_entity_id: r.target_entity_id,
            })
            .collect();

        Ok(RawSchema { fields, relations })
    }
}

/// Serves relation target schemas from a directory of `<entity>.json` files.
struct DirSource {
    root: PathBuf,
}

impl SchemaSource for DirSource {
    fn fetch(&self, entity_id: &str) -> std::result::Result<RawSchema, FetchError> {
        let path = self.root.join(format!("{}.json", entity_id));
        let json = fs::read_to_string(&path).map_err(|e| FetchError::Unavailable {
            entity_id: entity_id.to_string(),
            message: e.to_string(),
        })?;
        RawSchema::from_json(&json).map_err(|e| FetchError::Unavailable {
            entity_id: entity_id.to_string(),
            message: e.to_string(),
        })
    }
}

/// A schema-driven form plan, validation, and payload inspection CLI
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the schema JSON file
    schema_path: Option<String>,
    /// Optional path to a values JSON file used to seed the form
    values_path: Option<String>,

    /// Directory of `<entity>.json` relation target schemas
    #[arg(short, long)]
    relations: Option<String>,

    /// Entity name used in the submission request
    #[arg(short, long, default_value = "record")]
    entity: String,

    /// Run in interactive mode to be prompted for inputs
    #[arg(short = 'i', long, help = "Run in interactive 'human' mode")]
    human: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if cli.human {
        run_interactive(cli.entity);
    } else {
        run_non_interactive(cli);
    }
}

fn run_inspection(
    entity: String,
    schema_path: String,
    values_path: Option<String>,
    relations_dir: Option<String>,
) {
    let total_start = Instant::now();

    // --- 1. File Loading ---
    let load_start = Instant::now();
    let schema_json = fs::read_to_string(&schema_path).unwrap_or_else(|e| {
        exit_with_error(&format!(
            "Failed to read schema file '{}': {}",
            &schema_path, e
        ))
    });
    let seed = values_path.map(|path| {
        let json = fs::read_to_string(&path).unwrap_or_else(|e| {
            exit_with_error(&format!("Failed to read values file '{}': {}", path, e))
        });
        serde_json::from_str::<serde_json::Value>(&json).unwrap_or_else(|e| {
            exit_with_error(&format!("Failed to parse values file '{}': {}", path, e))
        })
    });
    let load_duration = load_start.elapsed();

    // --- 2. Parsing and Conversion ---
    let schema_file: SchemaFile = serde_json::from_str(&schema_json)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse schema JSON: {}", e)));
    let entity = schema_file.entity.clone().unwrap_or(entity);
    let raw = schema_file
        .into_schema()
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to convert schema: {}", e)));

    // --- 3. Session Assembly ---
    println!("\nBuilding form session for entity '{}'...", entity);
    let build_start = Instant::now();

    let dir_source = relations_dir.map(|dir| DirSource {
        root: PathBuf::from(dir),
    });
    let mut builder = SessionBuilder::new(&entity, raw);
    if let Some(source) = &dir_source {
        builder = builder.with_source(source);
    }
    if let Some(seed) = seed {
        builder = builder.with_values(seed);
    }
    let mut session = builder.build();
    let build_duration = build_start.elapsed();

    if !session.notices().is_empty() {
        println!("\nSchema notices:");
        for notice in session.notices() {
            println!("  - {}", notice.message);
        }
    }

    println!("\nResolved form plan:");
    print!("{}", session.plan().describe());

    // --- 4. Validation and Payload ---
    println!("\nRunning validation and payload normalization...");
    let submit_start = Instant::now();
    let outcome = session.begin_submit();
    let submit_duration = submit_start.elapsed();

    match outcome {
        Ok(request) => {
            println!("Validation passed.");
            println!("\nNormalized payload:");
            println!(
                "{}",
                serde_json::to_string_pretty(&request.payload)
                    .unwrap_or_else(|e| exit_with_error(&format!("Payload print failed: {}", e)))
            );
        }
        Err(SubmitError::ValidationFailed { issues }) => {
            println!("Validation failed with {} issue(s):", issues.len());
            for issue in issues {
                println!("  - {}", issue);
            }
        }
        Err(e) => exit_with_error(&format!("Submission gate failed: {}", e)),
    }

    let total_duration = total_start.elapsed();
    println!("\n--- Performance Summary ---");
    println!("File Loading:       {:?}", load_duration);
    println!("Session Assembly:   {:?}", build_duration);
    println!("Validate + Payload: {:?}", submit_duration);
    println!("---------------------------");
    println!("Total Execution:    {:?}", total_duration);
    println!();
}

/// Runs the CLI in non-interactive mode, taking all arguments from the command line.
fn run_non_interactive(cli: Cli) {
    let schema_path = cli.schema_path.unwrap_or_else(|| {
        exit_with_error("Schema path is required in non-interactive mode.");
    });
    run_inspection(cli.entity, schema_path, cli.values_path, cli.relations);
}

/// Runs the CLI in an interactive, human-friendly mode with prompts.
fn run_interactive(entity: String) {
    println!("--- Kinyu Interactive Mode ---");

    let schema_path = prompt_for_input("Enter schema path", Some("data/schema.json"));
    let values_path_str = prompt_for_input("Enter values path (optional)", None);
    let relations_dir_str = prompt_for_input("Enter relation schema directory (optional)", None);

    let values_path = if values_path_str.is_empty() {
        None
    } else {
        Some(values_path_str)
    };
    let relations_dir = if relations_dir_str.is_empty() {
        None
    } else {
        Some(relations_dir_str)
    };

    run_inspection(entity, schema_path, values_path, relations_dir);
}

/// A helper function to prompt the user and read a line of input.
fn prompt_for_input(prompt_text: &str, default: Option<&str>) -> String {
    let mut line = String::new();
    let default_prompt = default.map_or("".to_string(), |d| format!(" [default: {}]", d));

    print!("> {}{}: ", prompt_text, default_prompt);
    io::stdout().flush().unwrap();

    io::stdin()
        .read_line(&mut line)
        .expect("Failed to read line");
    let trimmed = line.trim().to_string();

    if trimmed.is_empty() {
        default.unwrap_or("").to_string()
    } else {
        trimmed
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
