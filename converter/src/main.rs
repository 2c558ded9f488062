//! csvjson CLI - Convert CSV files to JSON
//!
//! ```bash
//! csvjson convert input.csv                # JSON to stdout
//! csvjson convert input.csv -o out.json    # Save to a file
//! csvjson preview input.csv -n 5           # Show the first parsed rows
//! csvjson detect input.csv                 # Print the detected delimiter
//! csvjson serve                            # Start HTTP server (port 3000)
//! ```
//!
//! `-` reads the CSV from stdin.

use clap::{Parser, Subcommand};
use csvjson::api::logs::LOG_BROADCASTER;
use csvjson::config::MAX_INDENT;
use csvjson::{
    convert_bytes, decode_auto, detect_delimiter, preview, ConvertError, ConvertOptions,
    Delimiter, PipelineError, Settings,
};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "csvjson")]
#[command(about = "Convert CSV files to JSON", long_about = None)]
struct Cli {
    /// Silence progress and warnings on stderr
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a CSV file to a JSON array
    Convert {
        /// Input CSV file ("-" for stdin)
        input: PathBuf,

        /// CSV delimiter: , ; tab | (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<Delimiter>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Spaces per indentation level (0-16)
        #[arg(long, value_parser = parse_indent)]
        indent: Option<usize>,
    },

    /// Show the detected delimiter, columns and first rows
    Preview {
        /// Input CSV file ("-" for stdin)
        input: PathBuf,

        /// CSV delimiter (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<Delimiter>,

        /// Number of data rows to show
        #[arg(short = 'n', long, default_value = "10")]
        rows: usize,
    },

    /// Print the detected delimiter
    Detect {
        /// Input CSV file ("-" for stdin)
        input: PathBuf,
    },

    /// Start HTTP server
    Serve {
        /// Port to listen on (default: CSVJSON_PORT or 3000)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() {
    let settings = Settings::from_env();
    let cli = Cli::parse();

    if cli.quiet {
        LOG_BROADCASTER.set_echo(false);
    }

    let result = match cli.command {
        Commands::Convert {
            input,
            delimiter,
            output,
            indent,
        } => {
            let options = ConvertOptions {
                delimiter,
                indent: indent.unwrap_or(settings.indent),
            };
            cmd_convert(&input, &options, output.as_deref(), cli.quiet)
        }

        Commands::Preview {
            input,
            delimiter,
            rows,
        } => {
            let options = ConvertOptions {
                delimiter,
                indent: settings.indent,
            };
            cmd_preview(&input, &options, rows)
        }

        Commands::Detect { input } => cmd_detect(&input),

        Commands::Serve { port } => {
            let settings = Settings {
                port: port.unwrap_or(settings.port),
                ..settings
            };
            csvjson::server::start_server(settings).await
        }
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        if is_delimiter_error(e.as_ref()) {
            eprintln!("   Use --delimiter to choose one explicitly");
        }
        std::process::exit(1);
    }
}

fn is_delimiter_error(e: &(dyn std::error::Error + 'static)) -> bool {
    matches!(e.downcast_ref::<ConvertError>(), Some(ConvertError::NoDelimiterDetected))
        || matches!(
            e.downcast_ref::<PipelineError>(),
            Some(PipelineError::Convert(ConvertError::NoDelimiterDetected))
        )
}

fn cmd_convert(
    input: &Path,
    options: &ConvertOptions,
    output: Option<&Path>,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !quiet {
        eprintln!("📄 Converting: {}", display_input(input));
    }

    let bytes = read_input(input)?;
    let conversion = convert_bytes(&bytes, options)?;

    if !quiet {
        eprintln!("   Columns: {}", conversion.headers.join(", "));
        if conversion.mismatches.is_empty() {
            eprintln!("✅ Converted {} records", conversion.row_count);
        } else {
            eprintln!(
                "⚠️  Converted {} records, {} with a column count mismatch",
                conversion.row_count,
                conversion.mismatches.len()
            );
        }
    }

    write_output(&conversion.json, output, quiet)
}

fn cmd_preview(
    input: &Path,
    options: &ConvertOptions,
    rows: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let (content, encoding) = decode_auto(&read_input(input)?);
    let preview = preview(&content, options, rows)?;

    eprintln!("   Encoding: {}", encoding);
    eprintln!("   Delimiter: '{}'", preview.delimiter);
    eprintln!("   Columns: {}", preview.headers.join(", "));
    eprintln!(
        "   Showing {} of {} rows",
        preview.rows.len(),
        preview.total_rows
    );

    for line in &preview.lines {
        println!("{}", line);
    }

    Ok(())
}

fn cmd_detect(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let (content, _) = decode_auto(&read_input(input)?);
    let delimiter = detect_delimiter(&content)?;
    println!("{}", delimiter);
    Ok(())
}

fn parse_indent(value: &str) -> Result<usize, String> {
    let indent: usize = value
        .parse()
        .map_err(|_| format!("'{}' is not a number", value))?;
    if indent > MAX_INDENT {
        return Err(format!("must be at most {}", MAX_INDENT));
    }
    Ok(indent)
}

fn read_input(input: &Path) -> io::Result<Vec<u8>> {
    if input.as_os_str() == "-" {
        let mut buf = Vec::new();
        io::stdin().read_to_end(&mut buf)?;
        Ok(buf)
    } else {
        fs::read(input)
    }
}

fn display_input(input: &Path) -> String {
    if input.as_os_str() == "-" {
        "<stdin>".to_string()
    } else {
        input.display().to_string()
    }
}

fn write_output(
    content: &str,
    path: Option<&Path>,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            if !quiet {
                eprintln!("💾 Output written to: {}", p.display());
            }
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
