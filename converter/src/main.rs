//! mplusprep CLI - convert survey exports to Mplus data and input files
//!
//! ```bash
//! mplusprep convert survey.txt            # writes survey.dat and survey.inp
//! mplusprep check survey.txt              # validate only
//! mplusprep defaults > mplusprep.json     # dump the default config
//! ```

use clap::{Args, Parser, Subcommand};
use mplusprep::logs::log_error;
use mplusprep::{check_file, convert_file, Config, ConvertOptions, OutputPaths, CONFIG_ENV_VAR};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "mplusprep")]
#[command(about = "Convert survey exports to Mplus data and input files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an export into a data file and an input script
    Convert {
        /// Input export file (first line holds the variable names)
        input: PathBuf,

        /// Data file path (default: <input>.dat)
        #[arg(long)]
        data_out: Option<PathBuf>,

        /// Input script path (default: <input>.inp)
        #[arg(long)]
        control_out: Option<PathBuf>,

        /// Overwrite existing output files
        #[arg(short, long)]
        force: bool,

        #[command(flatten)]
        options: ConfigArgs,
    },

    /// Validate an export without writing anything
    Check {
        /// Input export file
        input: PathBuf,

        #[command(flatten)]
        options: ConfigArgs,
    },

    /// Print the default configuration as JSON
    Defaults,
}

#[derive(Args)]
struct ConfigArgs {
    /// JSON config file (default: $MPLUSPREP_CONFIG if set)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Column splitter character ("tab" for a tab)
    #[arg(short, long, value_parser = parse_splitter)]
    splitter: Option<char>,

    /// Column joiner for the data file ("tab" for a tab)
    #[arg(short, long, value_parser = parse_joiner)]
    joiner: Option<String>,

    /// Keep lines with non-numerical values instead of failing
    #[arg(long)]
    ignore_non_numerical: bool,

    /// Token written for blank cells
    #[arg(long, conflicts_with = "no_missing")]
    missing: Option<String>,

    /// Leave blank cells as they are
    #[arg(long)]
    no_missing: bool,

    /// Mplus analysis type
    #[arg(long)]
    analysis_type: Option<String>,

    /// Longest variable name accepted without a warning
    #[arg(long)]
    max_header_length: Option<usize>,

    /// Wrap width for the input script
    #[arg(long)]
    max_line_length: Option<usize>,
}

impl ConfigArgs {
    /// Config file (or defaults) with command line values on top.
    fn resolve(self) -> Result<Config, Box<dyn std::error::Error>> {
        let path = self
            .config
            .or_else(|| std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from));

        let mut config = match path {
            Some(ref p) => Config::load(p)?,
            None => Config::default(),
        };

        if let Some(splitter) = self.splitter {
            config.column_splitter = splitter;
        }
        if let Some(joiner) = self.joiner {
            config.column_joiner = joiner;
        }
        if self.ignore_non_numerical {
            config.ignore_non_numerical = true;
        }
        if self.no_missing {
            config.empty_replacement = None;
        } else if let Some(token) = self.missing {
            config.empty_replacement = Some(token);
        }
        if let Some(analysis_type) = self.analysis_type {
            config.analysis_type = analysis_type;
        }
        if let Some(length) = self.max_header_length {
            config.max_header_length = length;
        }
        if let Some(length) = self.max_line_length {
            config.max_line_length = length;
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Convert {
            input,
            data_out,
            control_out,
            force,
            options,
        } => cmd_convert(&input, data_out, control_out, force, options),

        Commands::Check { input, options } => cmd_check(&input, options),

        Commands::Defaults => cmd_defaults(),
    };

    if let Err(e) = result {
        log_error(format!("Error: {}", e));
        std::process::exit(1);
    }
}

fn cmd_convert(
    input: &Path,
    data_out: Option<PathBuf>,
    control_out: Option<PathBuf>,
    force: bool,
    args: ConfigArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = ConvertOptions {
        config: args.resolve()?,
        outputs: OutputPaths::for_input(input).with_overrides(data_out, control_out),
        overwrite: force,
    };

    let report = convert_file(input, options)?;
    eprintln!(
        "\n✨ Converted {} rows of {} variables",
        report.row_count,
        report.variable_names.len()
    );
    Ok(())
}

fn cmd_check(input: &Path, args: ConfigArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = args.resolve()?;
    let conversion = check_file(input, &config)?;
    eprintln!(
        "\n✅ {} is valid: {} variables, {} data rows",
        input.display(),
        conversion.variable_names.len(),
        conversion.data_lines.len()
    );
    Ok(())
}

fn cmd_defaults() -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", Config::default().to_json()?);
    Ok(())
}

fn unescape(value: &str) -> String {
    match value {
        "tab" | "\\t" => "\t".to_string(),
        "space" => " ".to_string(),
        other => other.to_string(),
    }
}

fn parse_splitter(value: &str) -> Result<char, String> {
    let unescaped = unescape(value);
    let mut chars = unescaped.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(format!("splitter must be a single character, got '{}'", value)),
    }
}

fn parse_joiner(value: &str) -> Result<String, String> {
    Ok(unescape(value))
}
