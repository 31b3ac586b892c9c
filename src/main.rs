use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use dbf_reader::{DbfReader, DescribeFormat, describe, postgres_ddl};
use env_logger::{Builder, Env};
use log::error;

/// Inspect and dump dBASE (.dbf) table files.
#[derive(Debug, Parser)]
#[command(name = "dbf-reader", version, about)]
struct Cli {
    /// Path to the .dbf file
    path: PathBuf,

    /// Text encoding label used for field names and values
    #[arg(short, long, env = "DBF_ENCODING", default_value = "iso-8859-1")]
    encoding: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print header information (default)
    Info,
    /// Describe the table schema
    Describe {
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
        /// Schema name used by the DDL output
        #[arg(long, default_value = "schemaname")]
        schema: String,
        /// Table name used by the DDL output
        #[arg(long, default_value = "tablename")]
        table: String,
    },
    /// Print live records as JSON lines
    Rows {
        /// Stop after this many rows
        #[arg(short, long)]
        limit: Option<usize>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Markdown,
    Ddl,
}

fn init_logger() {
    // Level comes from RUST_LOG, info by default.
    Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut reader = DbfReader::open(&cli.path, Some(cli.encoding.as_str()))?;
    let name = cli
        .path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    match cli.command.unwrap_or(Command::Info) {
        Command::Info => {
            let header = reader.header();
            println!("Table: {}", name);
            println!("  Version: {:#04x} (level {})", header.version, header.version_number());
            match header.last_update {
                Some(date) => println!("  Last update: {}", date),
                None => println!("  Last update: unknown"),
            }
            println!("  Records: {}", header.record_count);
            println!("  Header length: {}", header.header_length);
            println!("  Fields: {}", header.field_count());
            println!("  Record size: {}", header.record_size);
            println!("  File size: {}", header.file_size());
            println!("  Encoding: {}", reader.encoding().name());
            for deviation in reader.deviations() {
                println!("  Deviation: {}", deviation);
            }
        }
        Command::Describe { format, schema, table } => {
            let out = match format {
                Format::Text => describe(reader.header(), &name, DescribeFormat::Text),
                Format::Markdown => describe(reader.header(), &name, DescribeFormat::Markdown),
                Format::Ddl => postgres_ddl(reader.header(), &schema, &table)?,
            };
            println!("{}", out);
        }
        Command::Rows { limit } => {
            let stdout = io::stdout();
            let mut out = BufWriter::new(stdout.lock());
            let limit = limit.unwrap_or(usize::MAX);
            for row in reader.records()?.take(limit) {
                serde_json::to_writer(&mut out, &row?)?;
                out.write_all(b"\n")?;
            }
            out.flush()?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    init_logger();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
