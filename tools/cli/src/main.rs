//! PassVault CLI - command line client and server for the password vault.
//!
//! Items are encrypted and decrypted locally with a key derived from the
//! master password; the server only stores opaque envelopes.

mod client;
mod commands;
mod session;
#[cfg(test)]
mod test_support;

use anyhow::{anyhow, Result};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{FieldArgs, PasswordSource, ServeOptions};
use passvault_vault::{GeneratorOptions, SaltPolicy};
use session::ClientSession;

#[derive(Parser)]
#[command(name = "passvault")]
#[command(about = "PassVault - Password manager with client-side encryption")]
#[command(version)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Session file (default: <config dir>/passvault/session.json).
    #[arg(long, global = true)]
    session_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the REST backend.
    Serve {
        /// JSON configuration file.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Host address to bind.
        #[arg(long)]
        host: Option<String>,

        /// Port to bind.
        #[arg(short, long)]
        port: Option<u16>,

        /// Data file for the local store.
        #[arg(short, long, conflicts_with = "memory")]
        data: Option<PathBuf>,

        /// Keep everything in memory (lost on exit).
        #[arg(long)]
        memory: bool,
    },

    /// Create an account.
    Signup {
        #[arg(short, long)]
        email: String,

        /// Server URL.
        #[arg(short, long, default_value = "http://127.0.0.1:5000")]
        server: String,
    },

    /// Log in to an existing account.
    Login {
        #[arg(short, long)]
        email: String,

        /// Server URL.
        #[arg(short, long, default_value = "http://127.0.0.1:5000")]
        server: String,
    },

    /// Forget the saved session.
    Logout,

    /// Add an item to the vault.
    Add {
        #[command(flatten)]
        fields: FieldFlags,

        /// Generate the item password instead of prompting for it.
        #[arg(short, long)]
        generate: bool,

        #[command(flatten)]
        generator: GeneratorFlags,

        /// Salt used to derive the item key.
        #[arg(long, value_enum, default_value_t = SaltPolicyArg::PerItem)]
        salt_policy: SaltPolicyArg,
    },

    /// List items (titles and usernames).
    List,

    /// Show one item.
    Show {
        /// Item ID.
        id: String,

        /// Print the password instead of masking it.
        #[arg(short, long)]
        reveal: bool,
    },

    /// Edit an item; every field is re-encrypted.
    Edit {
        /// Item ID.
        id: String,

        #[command(flatten)]
        fields: FieldFlags,

        /// Prompt for a new item password.
        #[arg(long, conflicts_with = "generate")]
        password: bool,

        /// Generate a new item password.
        #[arg(short, long)]
        generate: bool,

        #[command(flatten)]
        generator: GeneratorFlags,

        /// Salt used to derive the item key.
        #[arg(long, value_enum, default_value_t = SaltPolicyArg::PerItem)]
        salt_policy: SaltPolicyArg,
    },

    /// Remove an item.
    Remove {
        /// Item ID.
        id: String,
    },

    /// Re-encrypt every item under a new master password.
    Rekey {
        /// Salt used to derive the new item keys.
        #[arg(long, value_enum, default_value_t = SaltPolicyArg::PerItem)]
        salt_policy: SaltPolicyArg,
    },

    /// Print a random password.
    Generate {
        #[command(flatten)]
        generator: GeneratorFlags,
    },

    /// Print shell completions.
    Completions {
        shell: Shell,
    },
}

#[derive(Args, Debug, Default)]
struct FieldFlags {
    /// Item title.
    #[arg(short, long)]
    title: Option<String>,

    /// Login username.
    #[arg(short, long)]
    username: Option<String>,

    /// Site URL.
    #[arg(long)]
    url: Option<String>,

    /// Free-form notes.
    #[arg(short, long)]
    notes: Option<String>,
}

impl From<FieldFlags> for FieldArgs {
    fn from(f: FieldFlags) -> Self {
        FieldArgs {
            title: f.title,
            username: f.username,
            url: f.url,
            notes: f.notes,
        }
    }
}

#[derive(Args, Debug)]
struct GeneratorFlags {
    /// Generated password length.
    #[arg(short, long, default_value_t = 20)]
    length: usize,

    /// Leave out lowercase letters.
    #[arg(long)]
    no_lowercase: bool,

    /// Leave out uppercase letters.
    #[arg(long)]
    no_uppercase: bool,

    /// Leave out digits.
    #[arg(long)]
    no_digits: bool,

    /// Leave out symbols.
    #[arg(long)]
    no_symbols: bool,
}

impl From<&GeneratorFlags> for GeneratorOptions {
    fn from(f: &GeneratorFlags) -> Self {
        GeneratorOptions {
            length: f.length,
            lowercase: !f.no_lowercase,
            uppercase: !f.no_uppercase,
            digits: !f.no_digits,
            symbols: !f.no_symbols,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum SaltPolicyArg {
    /// Fresh random salt for every item.
    PerItem,
    /// The account's salt for every item.
    PerUser,
}

impl From<SaltPolicyArg> for SaltPolicy {
    fn from(p: SaltPolicyArg) -> Self {
        match p {
            SaltPolicyArg::PerItem => SaltPolicy::PerItem,
            SaltPolicyArg::PerUser => SaltPolicy::PerUser,
        }
    }
}

fn password_source(prompt: bool, generate: bool, generator: &GeneratorFlags) -> PasswordSource {
    if generate {
        PasswordSource::Generate(generator.into())
    } else if prompt {
        PasswordSource::Prompt
    } else {
        PasswordSource::Keep
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let session_file = match cli.session_file {
        Some(path) => path,
        None => ClientSession::default_path()
            .ok_or_else(|| anyhow!("No config directory; pass --session-file"))?,
    };

    match cli.command {
        Commands::Serve {
            config,
            host,
            port,
            data,
            memory,
        } => {
            commands::cmd_serve(&ServeOptions {
                config,
                host,
                port,
                data,
                memory,
            })
            .await
        }

        Commands::Signup { email, server } => {
            commands::cmd_signup(&server, &email, &session_file).await
        }

        Commands::Login { email, server } => {
            commands::cmd_login(&server, &email, &session_file).await
        }

        Commands::Logout => commands::cmd_logout(&session_file),

        Commands::Add {
            fields,
            generate,
            generator,
            salt_policy,
        } => {
            if fields.title.is_none() {
                anyhow::bail!("--title is required");
            }
            let source = password_source(true, generate, &generator);
            commands::cmd_add(&session_file, fields.into(), source, salt_policy.into()).await
        }

        Commands::List => commands::cmd_list(&session_file).await,

        Commands::Show { id, reveal } => commands::cmd_show(&session_file, &id, reveal).await,

        Commands::Edit {
            id,
            fields,
            password,
            generate,
            generator,
            salt_policy,
        } => {
            let source = password_source(password, generate, &generator);
            commands::cmd_edit(&session_file, &id, fields.into(), source, salt_policy.into())
                .await
        }

        Commands::Remove { id } => commands::cmd_remove(&session_file, &id).await,

        Commands::Rekey { salt_policy } => {
            commands::cmd_rekey(&session_file, salt_policy.into()).await
        }

        Commands::Generate { generator } => commands::cmd_generate(&(&generator).into()),

        Commands::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "passvault",
                &mut std::io::stdout(),
            );
            Ok(())
        }
    }
}
