//! `mini-crm` command-line entry point.
//!
//! # Responsibility
//! - Load configuration, start logging and build exactly one contact store.
//! - Dispatch each subcommand to one `ContactService` call.
//!
//! # Invariants
//! - The store is constructed once and passed explicitly; no globals.
//! - Only this layer decides whether an error ends the process.

mod interactive;

use anyhow::Context;
use clap::builder::NonEmptyStringValueParser;
use clap::{Args, Parser, Subcommand};
use log::{error, warn};
use minicrm_core::{
    config_info, flush_logging, init_logging, load_config, open_store, Config, ContactId,
    ContactService, ContactStore, StoreError,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

/// A small command-line contact manager.
#[derive(Parser, Debug)]
#[command(name = "mini-crm")]
#[command(version)]
#[command(about = "A small command-line contact manager", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file (default: discover config.yaml)
    #[arg(long, global = true, env = "MINICRM_CONFIG")]
    config: Option<PathBuf>,

    /// Log level override (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the interactive menu
    Interactive(InteractiveArgs),
    /// Add a new contact
    Add(AddArgs),
    /// List all contacts
    List,
    /// Update an existing contact
    Update(UpdateArgs),
    /// Delete a contact
    Delete(DeleteArgs),
    /// Show the active configuration
    Config,
}

#[derive(Args, Debug)]
struct InteractiveArgs {
    /// Add one contact before the menu starts
    #[arg(long, requires = "name", requires = "email")]
    add: bool,

    #[arg(short, long, requires = "add", value_parser = NonEmptyStringValueParser::new())]
    name: Option<String>,

    #[arg(short, long, requires = "add", value_parser = NonEmptyStringValueParser::new())]
    email: Option<String>,
}

#[derive(Args, Debug)]
struct AddArgs {
    /// Contact name
    #[arg(short, long, value_parser = NonEmptyStringValueParser::new())]
    name: String,

    /// Contact email
    #[arg(short, long, value_parser = NonEmptyStringValueParser::new())]
    email: String,
}

#[derive(Args, Debug)]
struct UpdateArgs {
    /// Id of the contact to update
    #[arg(short, long, value_parser = clap::value_parser!(i64).range(1..))]
    id: ContactId,

    /// New name (unchanged when omitted)
    #[arg(short, long, default_value = "")]
    name: String,

    /// New email (unchanged when omitted)
    #[arg(short, long, default_value = "")]
    email: String,
}

#[derive(Args, Debug)]
struct DeleteArgs {
    /// Id of the contact to delete
    #[arg(short, long, value_parser = clap::value_parser!(i64).range(1..))]
    id: ContactId,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let code = match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=command module=cli status=error error={err:#}");
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    };

    flush_logging();
    code
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref()).context("failed to load configuration")?;
    start_logging(&config, cli.log_level.as_deref());

    let Some(command) = cli.command else {
        print_overview(&config);
        return Ok(());
    };

    match command {
        Commands::Config => {
            print_config(&config);
            Ok(())
        }
        Commands::Interactive(args) => run_interactive_command(&open_service(&config)?, args),
        Commands::Add(args) => {
            let contact = open_service(&config)?.add_contact(args.name, args.email)?;
            println!("Contact added successfully: {contact}");
            Ok(())
        }
        Commands::List => list_command(&open_service(&config)?, &mut io::stdout().lock()),
        Commands::Update(args) => update_command(&open_service(&config)?, &args),
        Commands::Delete(args) => {
            open_service(&config)?.remove_contact(args.id)?;
            println!("Contact removed successfully");
            Ok(())
        }
    }
}

fn open_service(config: &Config) -> anyhow::Result<ContactService<Box<dyn ContactStore>>> {
    let store = open_store(&config.storage).context("failed to open contact store")?;
    Ok(ContactService::new(store))
}

fn list_command<S: ContactStore, W: Write>(
    service: &ContactService<S>,
    output: &mut W,
) -> anyhow::Result<()> {
    let contacts = service.list_contacts()?;
    interactive::print_contacts(output, &contacts)?;
    Ok(())
}

fn update_command<S: ContactStore>(
    service: &ContactService<S>,
    args: &UpdateArgs,
) -> anyhow::Result<()> {
    match service.update_contact(args.id, &args.name, &args.email) {
        Ok(()) => {
            println!("Contact updated successfully");
            Ok(())
        }
        Err(StoreError::NotFound(_)) => anyhow::bail!("Contact not found"),
        Err(err) => Err(err.into()),
    }
}

fn run_interactive_command<S: ContactStore>(
    service: &ContactService<S>,
    args: InteractiveArgs,
) -> anyhow::Result<()> {
    if args.add {
        // clap guarantees both values when --add is set
        let name = args.name.unwrap_or_default();
        let email = args.email.unwrap_or_default();
        let contact = service.add_contact(name, email)?;
        println!("Contact added successfully: {contact}");
    }

    let mut stdin = io::stdin().lock();
    let mut stdout = io::stdout().lock();
    interactive::run_interactive(service, &mut stdin, &mut stdout)?;
    stdout.flush()?;
    Ok(())
}

/// Starts file logging. Failure is reported but never fatal.
fn start_logging(config: &Config, level_override: Option<&str>) {
    let level = level_override.unwrap_or(config.logging.level.as_str());
    let log_dir = match std::env::current_dir() {
        Ok(cwd) => cwd.join(&config.logging.dir),
        Err(err) => {
            eprintln!("warning: logging disabled, cannot resolve working directory: {err}");
            return;
        }
    };

    if let Err(err) = init_logging(level, &log_dir) {
        eprintln!("warning: logging disabled: {err}");
        return;
    }
    if config.source.is_none() {
        warn!("event=config_load module=cli status=defaults_only");
    }
}

fn print_overview(config: &Config) {
    println!("=== Mini-CRM ===");
    println!("A simple contact manager");
    println!();
    println!("Current configuration:");
    println!("{}", config_info(config));
    println!();
    println!("Available commands:");
    println!("  mini-crm interactive   - Start the interactive menu");
    println!("  mini-crm add           - Add a contact");
    println!("  mini-crm list          - List all contacts");
    println!("  mini-crm update        - Update a contact");
    println!("  mini-crm delete        - Delete a contact");
    println!("  mini-crm config        - Show the active configuration");
    println!("  mini-crm help          - Show help");
}

fn print_config(config: &Config) {
    println!("=== Mini-CRM configuration ===");
    println!("{}", config_info(config));
    if let Some(source) = &config.source {
        println!("Loaded from: {}", source.display());
    }
    println!();
    println!("Edit config.yaml to change the configuration.");
    println!("Available storage types: memory, json, gorm");
}
