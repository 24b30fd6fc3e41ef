//! # Robbie CLI
//!
//! Runs Robbie scripts against a grid agent listening on a TCP port.
//!
//! Usage:
//!   robbie run <script> [--address A] [--port P] [--grid G] [--msg]
//!   robbie tokens <script>
//!
//! Examples:
//!   robbie run maze.robbie --grid maze1
//!   robbie run collect.robbie --config robbie.toml -vv
//!   robbie tokens maze.robbie

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use robbie_lexer::Tokenizer;
use robbie_runner::{read_script, ConfigError, Session, SessionConfig};
use robbie_types::{ErrorCode, Result, RobbieError, LEGACY_ROTATION_MODULUS};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::thread;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "robbie")]
#[command(author, version, about = "Run Robbie scripts against a grid agent")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// More logging on stderr (-v info, -vv debug, -vvv trace). RUST_LOG wins if set.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// How errors are written to stderr
    #[arg(long, value_enum, default_value = "text", global = true)]
    error_format: ErrorFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect to the agent and run a script
    Run(RunArgs),
    /// Print the script's tokens as JSON lines, without connecting
    Tokens {
        /// Path to the script
        script: PathBuf,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Path to the script
    script: PathBuf,

    /// TOML file with session settings; flags override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Agent host
    #[arg(short, long)]
    address: Option<String>,

    /// Agent port
    #[arg(short, long)]
    port: Option<u16>,

    /// Grid to load before the script starts
    #[arg(short, long)]
    grid: Option<String>,

    /// Ask the agent to display protocol messages
    #[arg(long)]
    msg: bool,

    /// Deadline for each response, in milliseconds
    #[arg(long)]
    message_timeout_ms: Option<u64>,

    /// Give up connecting after this many milliseconds
    #[arg(long)]
    connect_timeout_ms: Option<u64>,

    /// Nested procedure calls allowed
    #[arg(long)]
    max_call_depth: Option<u32>,

    /// Resolve relative directions the way older interpreters did
    #[arg(long)]
    legacy_rotation: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum ErrorFormat {
    Text,
    Json,
}

impl RunArgs {
    /// The config file (or defaults) with flags applied on top.
    fn session_config(&self) -> std::result::Result<SessionConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => SessionConfig::load(path)?,
            None => SessionConfig::default(),
        };
        if let Some(address) = &self.address {
            config.address = address.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(grid) = &self.grid {
            config.grid = Some(grid.clone());
        }
        if self.msg {
            config.show_messages = true;
        }
        if let Some(ms) = self.message_timeout_ms {
            config.message_timeout_ms = ms;
        }
        if let Some(ms) = self.connect_timeout_ms {
            config.connect_timeout_ms = Some(ms);
        }
        if let Some(depth) = self.max_call_depth {
            config.max_call_depth = depth;
        }
        if self.legacy_rotation {
            config.rotation_modulus = LEGACY_ROTATION_MODULUS;
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match &cli.command {
        Commands::Run(args) => run(args),
        Commands::Tokens { script } => tokens(script),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err, cli.error_format);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(args: &RunArgs) -> Result<()> {
    let config = args.session_config()?;
    tracing::debug!(?config, "session settings");
    let source = read_script(&args.script)?;

    // Procedure calls recurse; give them a stack sized to the depth limit.
    let stack = config.interpreter_stack_size();
    let worker = thread::Builder::new()
        .name("robbie-run".into())
        .stack_size(stack)
        .spawn(move || -> Result<()> {
            let mut session = Session::connect(&config)?;
            let stdout = io::stdout();
            let mut out = stdout.lock();
            let result = session.run(source, &mut out);
            let closed = session.close();
            result.and(closed)
        })
        .map_err(|err| {
            RobbieError::new(
                ErrorCode::INVALID_CONFIG,
                format!("cannot reserve {stack} bytes of stack for the interpreter: {err}"),
            )
        })?;
    match worker.join() {
        Ok(result) => result,
        Err(panic) => std::panic::resume_unwind(panic),
    }
}

fn tokens(script: &Path) -> Result<()> {
    let mut tokens = Tokenizer::new(read_script(script)?);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    loop {
        if tokens.peek()?.is_eof() {
            return Ok(());
        }
        let token = tokens.next()?;
        let line = serde_json::to_string(&token).map_err(|err| {
            RobbieError::new(ErrorCode::OUTPUT_FAILED, format!("cannot encode token: {err}"))
        })?;
        writeln!(out, "{line}").map_err(|err| {
            RobbieError::new(ErrorCode::OUTPUT_FAILED, format!("cannot write output: {err}"))
        })?;
    }
}

fn report(err: &RobbieError, format: ErrorFormat) {
    match format {
        ErrorFormat::Json => match serde_json::to_string(err) {
            Ok(json) => eprintln!("{json}"),
            Err(_) => eprintln!("error: {err}"),
        },
        ErrorFormat::Text => {
            eprintln!("error: {err}");
            if let (Some(location), Some(line)) = (&err.location, &err.source_line) {
                let pad = " ".repeat(location.column.saturating_sub(1) as usize);
                eprintln!("  | {line}");
                eprintln!("  | {pad}^");
            }
        }
    }
}
