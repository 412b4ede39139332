use anyhow::{Context, Result};
use clap::{Parser, Subcommand, builder::NonEmptyStringValueParser};
mod auth;
use passvault::{Vault, VaultError, crypto, default_path};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "passvault")]
#[command(
    version,
    about = "Local encrypted password vault protected by one master passphrase."
)]
struct Cli {
    /// Path to the vault file (default: ~/.vault/.passwdstore)
    #[arg(long, global = true, value_name = "PATH", env = "PASSVAULT_PATH")]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(flatten)]
    Vault(VaultCommand),

    /// Generates a random password of the given length
    #[command(arg_required_else_help = true)]
    Generate { length: usize },
}

/// Commands that open the vault file.
#[derive(Debug, Subcommand)]
enum VaultCommand {
    /// Prints the secret stored under a name
    #[command(arg_required_else_help = true)]
    Get {
        #[arg(value_parser = NonEmptyStringValueParser::new())]
        key: String,
    },

    /// Stores a secret under a name, prompting for its value
    #[command(arg_required_else_help = true)]
    Put {
        #[arg(value_parser = NonEmptyStringValueParser::new())]
        key: String,
    },

    /// Deletes the secret stored under a name
    #[command(arg_required_else_help = true)]
    Delete {
        #[arg(value_parser = NonEmptyStringValueParser::new())]
        key: String,
    },

    /// Lists stored secret names
    List {
        /// Print names and secrets
        #[arg(short, long, default_value_t = false)]
        all: bool,
    },

    /// Removes every secret, keeping the passphrase
    Clear,

    /// Sets or changes the vault passphrase
    Change,
}

fn resolve_vault(path: Option<PathBuf>) -> Result<Vault> {
    let path = match path {
        Some(p) => std::path::absolute(&p)
            .with_context(|| format!("cannot resolve vault path {}", p.display()))?,
        None => default_path().context("could not determine home directory")?,
    };
    Ok(Vault::init(path)?)
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_logging();
    let args = Cli::parse();

    match args.command {
        Commands::Generate { length } => {
            println!("{}", crypto::generate(length)?);
            Ok(())
        }
        Commands::Vault(command) => {
            let vault = resolve_vault(args.store)?;
            run(&vault, command).map_err(|e| {
                let not_set = matches!(
                    e.downcast_ref::<VaultError>(),
                    Some(VaultError::PassphraseNotSet)
                );
                if not_set {
                    e.context("run `passvault change` to set the vault passphrase first")
                } else {
                    e
                }
            })
        }
    }
}

fn run(vault: &Vault, command: VaultCommand) -> Result<()> {
    match command {
        VaultCommand::Get { key } => {
            let pw = auth::read_passphrase("Vault passphrase: ")?;
            let value = vault.get(&key, &pw)?;
            if value.is_empty() {
                println!("key not found");
            } else {
                println!("{value}");
            }
        }
        VaultCommand::Put { key } => {
            let value = auth::read_secret("Secret to store: ")?;
            let pw = auth::read_passphrase("Vault passphrase: ")?;
            vault.put(&key, &value, &pw)?;
            println!("stored secret '{key}'");
        }
        VaultCommand::Delete { key } => {
            let pw = auth::read_passphrase("Vault passphrase: ")?;
            vault.delete(&key, &pw)?;
            println!("secret '{key}' deleted");
        }
        VaultCommand::List { all } => {
            let pw = auth::read_passphrase("Vault passphrase: ")?;
            if all {
                let mut entries = vault.list_entries(&pw)?;
                if entries.is_empty() {
                    println!("No secrets stored.");
                    return Ok(());
                }
                entries.sort();

                let key_width = entries
                    .iter()
                    .map(|(k, _)| k.len())
                    .chain(std::iter::once("Key".len()))
                    .max()
                    .unwrap_or_default();

                println!("{:<key_width$}  Secret", "Key");
                println!("{:-<key_width$}  ------", "");
                for (k, v) in entries {
                    println!("{k:<key_width$}  {v}");
                }
            } else {
                let mut keys = vault.list_keys(&pw)?;
                keys.sort();
                for key in keys {
                    println!("{key}");
                }
            }
        }
        VaultCommand::Clear => {
            let pw = auth::read_passphrase("Vault passphrase: ")?;
            vault.clear(&pw)?;
            println!("vault cleared");
        }
        VaultCommand::Change => {
            let old = auth::read_passphrase("Current passphrase (empty for a new vault): ")?;
            let new = auth::read_new_passphrase_with_confirmation()?;
            vault.change_passphrase(&new, &old)?;
            println!("passphrase changed");
        }
    }

    Ok(())
}
