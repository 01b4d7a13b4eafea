use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

mod filter;
mod hci;
mod power;

#[derive(Parser, Debug)]
#[command(name = "hciview")]
#[command(version)]
#[command(
    about = "Offline decoder for btsnoop HCI capture logs.",
    long_about = None,
    after_help = "Examples:\n  hciview hci summary capture.log\n  hciview hci extract capture.log -m json -o frames.json\n  hciview hci filter capture.log --set 1\n  hciview power summary trace.pt5"
)]
struct Cli {
    /// Enable debug logging on stderr (RUST_LOG overrides)
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Operations on btsnoop HCI capture logs.
    Hci {
        #[command(subcommand)]
        command: HciCommands,
    },
    /// Operations on PT5 power-trace files.
    Power {
        #[command(subcommand)]
        command: PowerCommands,
    },
}

#[derive(Subcommand, Debug)]
enum HciCommands {
    /// Classify every record and print aggregate counts.
    Summary {
        /// Path to a btsnoop capture file
        input: PathBuf,
    },
    /// List frame numbers per packet type.
    Extract {
        /// Path to a btsnoop capture file
        input: PathBuf,

        /// Output mode
        #[arg(short = 'm', long, value_enum, default_value = "console")]
        mode: OutputMode,

        /// Output file path (defaults to <input>.json)
        #[arg(short = 'o', long)]
        out: Option<PathBuf>,

        /// Packet types to include: cmd,acl,sco,evt,iso (comma-separated)
        #[arg(short = 't', long, default_value = "cmd,evt")]
        types: String,
    },
    /// Decode records matching command/event filters.
    Filter {
        /// Path to a btsnoop capture file
        input: PathBuf,

        /// Output mode
        #[arg(short = 'm', long, value_enum, default_value = "console")]
        mode: OutputMode,

        /// Output file path (defaults to <input>.hci.json)
        #[arg(short = 'o', long)]
        out: Option<PathBuf>,

        /// Predefined filter set id
        #[arg(long)]
        set: Option<u32>,

        /// OGF filter (comma-separated hex, e.g. 0x04)
        #[arg(long)]
        ogf: Option<String>,

        /// OCF filter (comma-separated hex, e.g. 0x0001)
        #[arg(long)]
        ocf: Option<String>,

        /// Opcode filter (comma-separated hex, e.g. 0x1001)
        #[arg(long)]
        opcode: Option<String>,

        /// Event code filter (comma-separated hex, e.g. 0x0E)
        #[arg(long)]
        eventcode: Option<String>,

        /// LE Meta subevent filter (comma-separated hex, e.g. 0x02)
        #[arg(long = "le-subevent")]
        le_subevent: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum PowerCommands {
    /// Print capture metadata of a PT5 file.
    Summary {
        /// Path to a PT5 power-trace file
        input: PathBuf,
    },
    /// Write timestamp/current rows as CSV.
    Extract {
        /// Path to a PT5 power-trace file
        input: PathBuf,

        /// Output file path (defaults to <input>.csv)
        #[arg(short = 'o', long)]
        out: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputMode {
    Console,
    Json,
}

#[derive(Debug)]
pub(crate) struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    pub(crate) fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(err.to_string(), None)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Hci { command } => match command {
            HciCommands::Summary { input } => hci::cmd_summary(&input),
            HciCommands::Extract {
                input,
                mode,
                out,
                types,
            } => hci::cmd_extract(&input, mode, out, &types),
            HciCommands::Filter {
                input,
                mode,
                out,
                set,
                ogf,
                ocf,
                opcode,
                eventcode,
                le_subevent,
            } => hci::cmd_filter(
                &input,
                mode,
                out,
                hci::FilterOptions {
                    set,
                    ogf,
                    ocf,
                    opcode,
                    eventcode,
                    le_subevent,
                },
            ),
        },
        Commands::Power { command } => match command {
            PowerCommands::Summary { input } => power::cmd_summary(&input),
            PowerCommands::Extract { input, out } => power::cmd_extract(&input, out),
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
