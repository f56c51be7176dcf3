use clap::error::ErrorKind;
use clap::Parser;
use klog::application::{bootstrap, list_entries, repository, EditEntryService, Outcome};
use klog::cli::{format_entry_list, Cli};
use klog::domain::LogDate;
use klog::error::KlogError;
use klog::infrastructure::{Config, EditorSession, FileSystemStore, GitRepository, TerminalPrompter};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = parse_args();

    init_logging(cli.verbose);

    match run(cli) {
        Ok(_) => std::process::exit(0),
        Err(e) => {
            eprintln!("Error: {}", e.display_with_suggestions());
            std::process::exit(e.exit_code());
        }
    }
}

/// Parse the command line. A rejected DATE exits like [`KlogError::InvalidDate`].
fn parse_args() -> Cli {
    Cli::try_parse().unwrap_or_else(|e| {
        // DATE is the only argument with a value parser
        let code = match e.kind() {
            ErrorKind::ValueValidation => KlogError::InvalidDate(String::new()).exit_code(),
            _ => e.exit_code(),
        };
        let _ = e.print();
        std::process::exit(code);
    })
}

/// Log to stderr, filtered by `KLOG_LOG` when set
fn init_logging(verbose: bool) {
    let default = if verbose { "klog=debug" } else { "klog=warn" };
    let filter = EnvFilter::try_from_env("KLOG_LOG").unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<(), KlogError> {
    if cli.generate {
        return Err(KlogError::NotImplemented("generate"));
    }

    let editor = EditorSession::from_env();
    debug!("Editor: {}", editor.command());

    let config_path = Config::default_path()?;
    let config = bootstrap::load_or_create(&config_path, &editor)?;

    let sync = !cli.no_sync;
    let repo: GitRepository = repository::prepare(&config, sync, GitRepository::open)?;
    let mut store = FileSystemStore::new(repo.path().to_path_buf());

    if cli.list {
        let entries = list_entries(&store)?;
        println!("{}", format_entry_list(&entries).trim_end());
        return Ok(());
    }

    let date = cli.date.unwrap_or_else(LogDate::today);
    info!("Editing entries for {}", date);

    let mut prompter = TerminalPrompter::new();
    let outcome = EditEntryService::new(&mut store, &editor, &mut prompter, &repo)
        .with_sync(sync)
        .execute(date)?;

    match outcome {
        Outcome::Committed => println!("Entry for {} saved", date),
        Outcome::Removed => println!("Entry for {} removed", date),
        Outcome::Unchanged | Outcome::Aborted => {}
    }
    debug!("Outcome: {:?}", outcome);

    Ok(())
}
