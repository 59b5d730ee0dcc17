use std::io;
use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use warden::commands;
use warden::rpc::DaemonClient;
use warden::terminal::UnixTerminal;

#[derive(Parser, Debug)]
#[command(name = "warden", version, about = "client for the warden daemon")]
struct Cli {
    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to the warden daemon socket (default: $WARDEN_SOCKET, then
    /// $XDG_RUNTIME_DIR/warden/wardend.sock)
    #[arg(long = "socket", global = true, value_name = "PATH")]
    socket: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Register this client for connections to the warden daemon
    #[command(visible_alias = "authenticate")]
    Register {
        /// Trusted passphrase to send to the warden daemon. If omitted,
        /// a prompt will be displayed for entering the passphrase.
        #[arg(value_name = "passphrase", num_args = 0..)]
        passphrase: Vec<String>,
    },
    /// Change the passphrase the daemon requires from registering clients
    Passphrase {
        /// New passphrase. If omitted, a confirmed prompt will be
        /// displayed for entering the passphrase.
        #[arg(value_name = "passphrase", num_args = 0..)]
        passphrase: Vec<String>,
    },
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn socket_path(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| std::env::var_os("WARDEN_SOCKET").map(PathBuf::from))
        .unwrap_or_else(DaemonClient::default_socket_path)
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut term = UnixTerminal::new();
    let mut client = DaemonClient::new(socket_path(cli.socket));
    let mut cerr = io::stderr();

    let code = match cli.command {
        Commands::Register { passphrase } => commands::register(
            &passphrase,
            cli.verbose,
            &mut term,
            &mut client,
            &mut cerr,
        ),
        Commands::Passphrase { passphrase } => commands::set_passphrase(
            &passphrase,
            cli.verbose,
            &mut term,
            &mut client,
            &mut cerr,
        ),
    };

    std::process::exit(code.exit_code());
}
