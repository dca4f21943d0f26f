use anyhow::Context;
use clap::{Parser, Subcommand};
use rustyline::error::ReadlineError;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use partshop::access::{AccessChecker, Operation};
use partshop::config::{self, Settings, StoreArgs};
use partshop::demos::{self, crud::DEFAULT_ACTOR};
use partshop::error::AppError;
use partshop::render;
use partshop::shell::{self, ShellCommand};

#[derive(Parser)]
#[command(name = "partshop", version, about = "Auto-parts shop demos with role-based access checks")]
struct Cli {
    #[command(flatten)]
    store: StoreArgs,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Seed parts, customers and orders from the fixture directory
    Setup,
    /// Store the roles, run the standard access probes and row-level example
    Access,
    /// Create/read/update/delete walkthrough through access-checked collections
    Crud {
        /// User the walkthrough acts as
        #[arg(long, default_value = DEFAULT_ACTOR)]
        user: String,
    },
    /// Decide a single access question
    Check {
        user: String,
        resource: String,
        /// read, write or delete
        operation: String,
        /// Print the decision as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the role matrix as a table
    Roles,
    /// Interactive access shell
    Shell,
}

#[tokio::main]
async fn main() {
    config::load_dotenv();
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let settings = Settings::from(cli.store);
    let rust_log = std::env::var("RUST_LOG").unwrap_or_else(|_| "<unset>".to_string());
    info!(
        target: "partshop",
        "partshop starting: RUST_LOG='{}', db_root='{}', db='{}', fixtures='{}', persist={}",
        rust_log,
        settings.db_root.display(),
        settings.db_name,
        settings.fixtures_dir.display(),
        settings.persistence.enabled
    );

    if let Err(e) = run(cli.command, &settings).await {
        eprintln!("error: {:#}", e);
        let code = e.downcast_ref::<AppError>().map(AppError::exit_code).unwrap_or(1);
        std::process::exit(code);
    }
}

async fn run(command: Command, settings: &Settings) -> anyhow::Result<()> {
    match command {
        Command::Setup => {
            let (store, persist) = demos::open_store(settings).await?;
            let outcome = demos::setup::seed_collections(&store, &settings.fixtures_dir);
            let report = demos::finish(&store, persist, outcome).await.context("setup failed")?;
            for coll in &report.missing {
                println!("no seed file for '{}'", coll);
            }
        }
        Command::Access => {
            let (roles, users) = demos::load_tables(settings)?;
            let (store, persist) = demos::open_store(settings).await?;
            let outcome = demos::access::run(&store, &roles, &users);
            demos::finish(&store, persist, outcome).await.context("access demo failed")?;
        }
        Command::Crud { user } => {
            let (roles, users) = demos::load_tables(settings)?;
            let checker = AccessChecker::new(roles, users);
            let (store, persist) = demos::open_store(settings).await?;
            let outcome = demos::crud::run(&store, &checker, &user);
            demos::finish(&store, persist, outcome).await.with_context(|| format!("crud demo as '{}' failed", user))?;
        }
        Command::Check { user, resource, operation, json } => {
            let (roles, users) = demos::load_tables(settings)?;
            let checker = AccessChecker::new(roles, users);
            if operation.parse::<Operation>().is_err() {
                info!(target: "partshop::access", "operation '{}' is not read/write/delete", operation);
            }
            let decision = checker.check_access_raw(&user, &resource, &operation);
            if json {
                println!("{}", serde_json::to_string(&decision)?);
            } else {
                println!("{}", render::decision_line(&decision));
            }
        }
        Command::Roles => {
            let (roles, _) = demos::load_tables(settings)?;
            println!("{}", render::roles_table(&roles));
        }
        Command::Shell => {
            let (roles, users) = demos::load_tables(settings)?;
            run_shell(&AccessChecker::new(roles, users))?;
        }
    }
    Ok(())
}

fn run_shell(checker: &AccessChecker) -> anyhow::Result<()> {
    let mut rl = rustyline::DefaultEditor::new().context("cannot start line editor")?;
    println!("partshop access shell. Type 'help' for commands.");
    loop {
        let line = match rl.readline("> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };
        let _ = rl.add_history_entry(line.as_str());
        match shell::parse_line(&line) {
            Ok(ShellCommand::Quit) => break,
            Ok(ShellCommand::Empty) => continue,
            Ok(cmd) => println!("{}", shell::evaluate(checker, &cmd)),
            Err(msg) => eprintln!("{}", msg),
        }
    }
    Ok(())
}
