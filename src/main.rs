use clap::Parser;
use secretvault::cli::commands::add::AddArgs;
use secretvault::cli::commands::update::UpdateArgs;
use secretvault::cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { force } => secretvault::cli::commands::init::execute(&cli, force),
        Commands::Add {
            ref name,
            ref value,
            ref secret_type,
            ref tags,
            ref notes,
            ref expires,
            ref meta,
            generate,
        } => secretvault::cli::commands::add::execute(
            &cli,
            &AddArgs {
                name,
                value: value.as_deref(),
                secret_type: secret_type.as_deref(),
                tags,
                notes: notes.as_deref(),
                expires: expires.as_deref(),
                meta,
                generate,
            },
        ),
        Commands::Get { ref id, meta_only } => {
            secretvault::cli::commands::get::execute(&cli, id, meta_only)
        }
        Commands::List {
            ref secret_type,
            expired,
        } => secretvault::cli::commands::list::execute(&cli, secret_type.as_deref(), expired),
        Commands::Search { ref query } => secretvault::cli::commands::search::execute(&cli, query),
        Commands::Update {
            ref id,
            ref name,
            ref value,
            read_value,
            ref secret_type,
            ref tags,
            ref notes,
            ref expires,
            no_expiry,
            ref meta,
        } => secretvault::cli::commands::update::execute(
            &cli,
            &UpdateArgs {
                id,
                name: name.as_deref(),
                value: value.as_deref(),
                read_value,
                secret_type: secret_type.as_deref(),
                tags,
                notes: notes.as_deref(),
                expires: expires.as_deref(),
                no_expiry,
                meta,
            },
        ),
        Commands::Delete { ref id, force } => {
            secretvault::cli::commands::delete::execute(&cli, id, force)
        }
        Commands::Verify { ref id } => secretvault::cli::commands::verify::execute(&cli, id),
        Commands::Export { ref output } => {
            secretvault::cli::commands::export::execute(&cli, output.as_deref())
        }
        Commands::Import { ref file, force } => {
            secretvault::cli::commands::import_cmd::execute(&cli, file, force)
        }
        Commands::Generate { length } => {
            secretvault::cli::commands::generate::execute(&cli, length)
        }
        Commands::Completions { shell } => secretvault::cli::commands::completions::execute(shell),
    };

    if let Err(e) = result {
        secretvault::cli::output::error(&e.to_string());
        std::process::exit(e.exit_code());
    }
}

/// Log to stderr so stdout stays clean for values and exports.
/// Filter comes from `RUST_LOG`, defaulting to warnings only.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}
