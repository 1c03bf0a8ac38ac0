//! gridsql CLI - compile grid queries to T-SQL
//!
//! Usage:
//!   gridsql compile <object> [--request <file> | --json <text>] [--query <odata>]
//!   gridsql filter <odata-filter>
//!   gridsql types
//!
//! Examples:
//!   gridsql compile dbo.GetOrders --kind function --param CustomerId \
//!       --json '{"take": 20, "userData": {"CustomerId": 42}}'
//!   gridsql compile sales.OpenOrders --query '$filter=Total gt 100&$orderby=Total desc&$take=10'
//!   gridsql filter "Status eq 'Active' and Age gt 18"

use clap::{Parser, Subcommand, ValueEnum};
use gridsql::catalog;
use gridsql::compile::{compile_grid_query, CompiledQuery, ObjectName, WhereCompiler};
use gridsql::config::Settings;
use gridsql::filter::parse_odata_filter;
use gridsql::metadata::{ObjectInfo, StaticSchemaProvider};
use gridsql::request::QueryRequest;
use gridsql::sql::{quote_literal, ParameterRegistry, SqlValue};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "gridsql")]
#[command(about = "gridsql - compile grid queries to parameterized T-SQL")]
#[command(version)]
struct Cli {
    /// Config file (defaults: $GRIDSQL_CONFIG, ./gridsql.toml, user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a grid request against a view or table-valued function
    Compile {
        /// Object name, `schema.name` or `name`
        object: String,

        /// Path to a JSON request body
        #[arg(short, long, conflicts_with = "json")]
        request: Option<PathBuf>,

        /// Inline JSON request body
        #[arg(short, long)]
        json: Option<String>,

        /// OData query string applied over the body
        #[arg(short, long)]
        query: Option<String>,

        /// Object kind; overrides the config's object table
        #[arg(short, long)]
        kind: Option<KindArg>,

        /// Function parameter, in call order (repeatable)
        #[arg(short, long = "param", requires = "kind")]
        params: Vec<String>,

        /// Output format
        #[arg(short, long, default_value = "sql")]
        format: OutputFormat,
    },

    /// Compile an OData filter to a WHERE expression
    Filter {
        /// Filter text, e.g. "Age gt 18"
        filter: String,

        /// Output format
        #[arg(short, long, default_value = "sql")]
        format: OutputFormat,
    },

    /// List the SQL type catalog
    Types,
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    View,
    Function,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// SQL text with bindings as comments
    Sql,
    /// `{"sql": ..., "params": {...}}`
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match Settings::load_from(cli.config.as_deref()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = gridsql::logging::init(&settings.logging) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    match cli.command {
        Commands::Compile {
            object,
            request,
            json,
            query,
            kind,
            params,
            format,
        } => cmd_compile(&settings, &object, request, json, query, kind, params, format),
        Commands::Filter { filter, format } => cmd_filter(&filter, format),
        Commands::Types => cmd_types(),
    }
}

fn read_request(
    request: Option<PathBuf>,
    json: Option<String>,
) -> Result<QueryRequest, String> {
    let body = match (request, json) {
        (Some(path), _) => fs::read_to_string(&path)
            .map_err(|e| format!("Error reading request '{}': {}", path.display(), e))?,
        (None, Some(text)) => text,
        (None, None) => return Ok(QueryRequest::default()),
    };
    QueryRequest::from_json(&body).map_err(|e| format!("Invalid request: {}", e))
}

#[allow(clippy::too_many_arguments)]
fn cmd_compile(
    settings: &Settings,
    object: &str,
    request: Option<PathBuf>,
    json: Option<String>,
    query: Option<String>,
    kind: Option<KindArg>,
    params: Vec<String>,
    format: OutputFormat,
) -> ExitCode {
    let mut request = match read_request(request, json) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Some(query) = &query {
        if let Err(e) = request.apply_odata_query(query) {
            eprintln!("Invalid query string: {}", e);
            return ExitCode::FAILURE;
        }
    }

    let options = settings.compile_options();

    let provider = match kind {
        Some(kind) => {
            let name = match ObjectName::parse(object, &options.default_schema) {
                Ok(n) => n,
                Err(e) => {
                    eprintln!("Compilation error: {}", e);
                    return ExitCode::FAILURE;
                }
            };
            let info = match kind {
                KindArg::View => ObjectInfo::view(),
                KindArg::Function => ObjectInfo::function(params),
            };
            StaticSchemaProvider::new().with_object(name, info)
        }
        None => match settings.schema_provider() {
            Ok(p) => p,
            Err(e) => {
                eprintln!("Configuration error: {}", e);
                return ExitCode::FAILURE;
            }
        },
    };

    match compile_grid_query(&provider, object, &request, &options) {
        Ok(compiled) => {
            print_compiled(&compiled, format);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Compilation error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_filter(filter: &str, format: OutputFormat) -> ExitCode {
    let node = match parse_odata_filter(filter) {
        Ok(n) => n,
        Err(e) => {
            eprintln!("Filter error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut params = ParameterRegistry::new();
    let compiled = WhereCompiler::new(&mut params).compile(&node);
    match compiled {
        Ok(sql) => {
            print_compiled(&CompiledQuery { sql, params }, format);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Compilation error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_types() -> ExitCode {
    println!("{:<18} {:<24} {:<8} canonical", "sql", "runtime", "wire");
    for entry in catalog::entries() {
        println!(
            "{:<18} {:<24} {:<8} {}",
            entry.sql_name,
            entry.runtime,
            entry.wire.as_str(),
            if entry.canonical { "yes" } else { "" }
        );
    }
    ExitCode::SUCCESS
}

fn print_compiled(compiled: &CompiledQuery, format: OutputFormat) {
    match format {
        OutputFormat::Sql => {
            for (name, value) in compiled.params.iter() {
                println!("{}", binding_comment(name, value));
            }
            println!("{}", compiled.sql.trim_end());
        }
        OutputFormat::Json => {
            match serde_json::to_string_pretty(&compiled.to_json()) {
                Ok(text) => println!("{}", text),
                Err(e) => eprintln!("Failed to render JSON: {}", e),
            }
        }
    }
}

/// One `-- @N = value` line. Control characters in the rendered value are
/// escaped so the comment cannot end early.
fn binding_comment(name: &str, value: &SqlValue) -> String {
    let shown = quote_literal(value).unwrap_or_else(|_| value.to_json().to_string());
    let mut line = format!("-- {} = ", name);
    for c in shown.chars() {
        if c.is_control() {
            line.extend(c.escape_default());
        } else {
            line.push(c);
        }
    }
    line
}
