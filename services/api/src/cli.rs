use crate::demo::{run_demo, run_permit_status, DemoArgs, PermitStatusArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use rcd_permits::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "RCD Permit Portal",
    about = "Run the RCD parking permit portal and its staff tooling from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Inspect permit expiry classification
    Permit {
        #[command(subcommand)]
        command: PermitCommand,
    },
    /// Walk a sample application from intake to an issued permit and print the reports
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum PermitCommand {
    /// Classify a permit expiry date as active, expiring, or expired
    Status(PermitStatusArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Permit {
            command: PermitCommand::Status(args),
        } => {
            run_permit_status(args);
            Ok(())
        }
        Command::Demo(args) => run_demo(args),
    }
}
