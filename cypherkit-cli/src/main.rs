use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use cypherkit_query::{CompiledQuery, QueryBuilder};
use std::io::{Read, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod repl;

#[derive(Parser)]
#[command(name = "cypherkit", version, arg_required_else_help = true)]
struct Cli {
    /// Log filter (e.g. `debug`, `cypherkit_query=trace`); falls back to RUST_LOG
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile one JSON payload into a statement and its parameters
    Compile(CompileArgs),
    /// Build a statement interactively, one JSON payload per line
    Repl,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub(crate) enum OutputFormat {
    Ndjson,
    Pretty,
}

#[derive(Parser)]
struct CompileArgs {
    /// JSON payload: a single clause object or an array of them
    #[arg(long, conflicts_with = "file")]
    payload: Option<String>,

    /// Read the payload from a file (`-` for stdin)
    #[arg(long)]
    file: Option<PathBuf>,

    #[arg(long, value_enum, default_value = "ndjson")]
    format: OutputFormat,
}

fn init_tracing(level: Option<&str>) -> Result<()> {
    let filter = match level {
        Some(level) => {
            EnvFilter::try_new(level).with_context(|| format!("invalid log filter `{level}`"))?
        }
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();
    Ok(())
}

fn read_payload(args: &CompileArgs) -> Result<String> {
    if let Some(payload) = args.payload.as_ref() {
        return Ok(payload.clone());
    }
    let Some(path) = args.file.as_ref() else {
        bail!("either --payload or --file is required");
    };
    if path.as_os_str() == "-" {
        let mut payload = String::new();
        std::io::stdin()
            .read_to_string(&mut payload)
            .context("failed to read payload from stdin")?;
        return Ok(payload);
    }
    std::fs::read_to_string(path)
        .with_context(|| format!("failed to read payload file {}", path.display()))
}

pub(crate) fn write_compiled(
    out: &mut impl Write,
    compiled: &CompiledQuery,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Ndjson => serde_json::to_writer(&mut *out, compiled)?,
        OutputFormat::Pretty => serde_json::to_writer_pretty(&mut *out, compiled)?,
    }
    out.write_all(b"\n")?;
    Ok(())
}

fn run_compile(args: CompileArgs) -> Result<()> {
    let payload = read_payload(&args)?;
    let mut builder = QueryBuilder::new();
    builder
        .add_json_str(&payload)
        .context("payload rejected")?;
    let compiled = builder.compile().context("compilation failed")?;
    tracing::debug!(parameters = compiled.parameters.len(), "compiled payload");

    let mut stdout = std::io::stdout().lock();
    write_compiled(&mut stdout, &compiled, args.format)
}

fn main() {
    let cli = Cli::parse();
    let result = init_tracing(cli.log_level.as_deref()).and_then(|()| match cli.command {
        Commands::Compile(args) => run_compile(args),
        Commands::Repl => repl::run_repl(),
    });

    if let Err(err) = result {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ndjson_output_is_one_line_per_query() {
        let compiled = cypherkit_query::compile_json(&json!([
            { "match": { "identifier": "n", "where": { "id": 7 } } },
            { "return": ["n"] }
        ]))
        .expect("compiles");

        let mut out = Vec::new();
        write_compiled(&mut out, &compiled, OutputFormat::Ndjson).expect("writes");
        let text = String::from_utf8(out).expect("utf8");

        assert_eq!(text.lines().count(), 1);
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(&text).expect("json"),
            json!({ "statement": "MATCH (n { id: $id }) RETURN n", "parameters": { "id": 7 } })
        );
    }

    #[test]
    fn file_or_payload_is_required() {
        let args = CompileArgs {
            payload: None,
            file: None,
            format: OutputFormat::Ndjson,
        };
        assert!(read_payload(&args).is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
