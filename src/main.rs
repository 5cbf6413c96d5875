use clap::Parser;
use miette::Result;
use roster::cli::{Cli, Commands, GlobalOpts};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// `--log-level` wins, then `RUST_LOG`, then `--verbose`
fn init_tracing(global: &GlobalOpts) {
    let filter = match &global.log_level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(if global.verbose { "roster=debug" } else { "warn" })
        }),
    };

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Terminate silently on a closed pipe (`roster emp list | head`).
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    init_tracing(&global);

    match cli.command {
        Commands::Emp(cmd) => roster::cli::commands::emp::run(cmd, &global).await,
        Commands::Qual(cmd) => roster::cli::commands::qual::run(cmd, &global).await,
        Commands::Import(args) => roster::cli::commands::import::run(args, &global).await,
        Commands::Seed(args) => roster::cli::commands::seed::run(args, &global).await,
        Commands::Config(cmd) => roster::cli::commands::config::run(cmd, &global),
        Commands::Completions(args) => roster::cli::commands::completions::run(args),
    }
}
