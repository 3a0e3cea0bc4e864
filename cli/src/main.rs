use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use bitschema::{
    compute_layout, generate_accessor, generate_json_schema, is_identifier, load_schema,
    render_layout, SchemaError, SchemaErrorKind, TableFormat,
};

#[derive(Parser)]
#[command(name = "bitschema")]
#[command(about = "Compile bit-packed field schemas: codegen, JSON Schema export, layout tables", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a Rust accessor type with encode/decode methods
    Generate {
        /// Input schema file (JSON or YAML)
        schema_file: PathBuf,

        /// Output `.rs` file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Override the generated type name
        #[arg(long)]
        name: Option<String>,
    },

    /// Export a JSON Schema (Draft 2020-12) describing the record shape
    Jsonschema {
        /// Input schema file (JSON or YAML)
        schema_file: PathBuf,

        /// Output `.json` file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Indentation width of the emitted JSON
        #[arg(long, default_value_t = 2)]
        indent: usize,
    },

    /// Render the bit layout as a table
    Visualize {
        /// Input schema file (JSON or YAML)
        schema_file: PathBuf,

        /// Table flavor
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Ascii)]
        format: OutputFormat,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Ascii,
    Markdown,
}

impl From<OutputFormat> for TableFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Ascii => TableFormat::Ascii,
            OutputFormat::Markdown => TableFormat::Markdown,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    // No subcommand is not an error: show the help text and exit cleanly.
    let Some(command) = cli.command else {
        let _ = Cli::command().print_help();
        return ExitCode::SUCCESS;
    };
    match run(&command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: &Commands) -> Result<(), Box<dyn Error>> {
    match command {
        Commands::Generate {
            schema_file,
            output,
            name,
        } => {
            let mut schema = load_schema(schema_file)?;
            if let Some(name) = name {
                if !is_identifier(name) {
                    return Err(SchemaError::at(
                        "name",
                        SchemaErrorKind::InvalidIdentifier(name.clone()),
                    )
                    .into());
                }
                schema.name = name.clone();
            }
            let layout = compute_layout(&schema)?;
            let code = generate_accessor(&schema, &layout)?;
            write_artifact(output.as_deref(), &code, "Generated accessor")
        }

        Commands::Jsonschema {
            schema_file,
            output,
            indent,
        } => {
            let schema = load_schema(schema_file)?;
            let layout = compute_layout(&schema)?;
            let document = generate_json_schema(&schema, &layout);
            let text = to_pretty_json(&document, *indent)?;
            write_artifact(output.as_deref(), &text, "JSON Schema")
        }

        Commands::Visualize {
            schema_file,
            format,
            output,
        } => {
            let schema = load_schema(schema_file)?;
            let layout = compute_layout(&schema)?;
            let table = render_layout(&layout, (*format).into());
            write_artifact(output.as_deref(), &table, "Bit layout")
        }
    }
}

fn to_pretty_json(document: &serde_json::Value, indent: usize) -> Result<String, Box<dyn Error>> {
    let indent = " ".repeat(indent);
    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    document.serialize(&mut serializer)?;
    Ok(String::from_utf8(buffer)?)
}

/// Writes the artifact to the named file (with a note on stderr) or prints
/// it to stdout.
fn write_artifact(output: Option<&Path>, artifact: &str, label: &str) -> Result<(), Box<dyn Error>> {
    match output {
        Some(path) => {
            fs::write(path, artifact)?;
            eprintln!("{label} written to {}", path.display());
        }
        None => println!("{artifact}"),
    }
    Ok(())
}
