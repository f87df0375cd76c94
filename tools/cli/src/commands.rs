//! Command implementations.
//!
//! Every encryption and decryption runs here, on the client, on a blocking
//! worker thread. The server only ever receives envelopes.

use anyhow::{anyhow, bail, Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::client::ApiClient;
use crate::session::ClientSession;
use passvault_common::{Error, ItemId, SECRET_FAILURE_MESSAGE};
use passvault_crypto::KdfParams;
use passvault_server::ServerConfig;
use passvault_storage::{ItemRecord, StoreConfig};
use passvault_vault::{
    decrypt_item, encrypt_item, generate_password, rekey_item, EncryptedItem, FieldName,
    GeneratorOptions, ItemUpdate, PlainFields, SaltPolicy, SessionContext,
};

/// Overrides for `passvault serve`.
#[derive(Debug, Default)]
pub struct ServeOptions {
    pub config: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub data: Option<PathBuf>,
    pub memory: bool,
}

/// Field values given on the command line for `add` / `edit`.
#[derive(Debug, Default)]
pub struct FieldArgs {
    pub title: Option<String>,
    pub username: Option<String>,
    pub url: Option<String>,
    pub notes: Option<String>,
}

/// How the item password is obtained for `add` / `edit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordSource {
    /// Keep the current one (edit only).
    Keep,
    Prompt,
    Generate(GeneratorOptions),
}

/// Build the effective server configuration: file, then flag overrides.
pub fn server_config(opts: &ServeOptions) -> Result<ServerConfig> {
    let mut config = match &opts.config {
        Some(path) => ServerConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ServerConfig::default(),
    };
    if let Some(host) = &opts.host {
        config.host = host.clone();
    }
    if let Some(port) = opts.port {
        config.port = port;
    }
    if let Some(path) = &opts.data {
        config.store = StoreConfig::Local { path: path.clone() };
    }
    if opts.memory {
        config.store = StoreConfig::Memory;
    }
    config.validate()?;
    Ok(config)
}

/// Run the backend.
pub async fn cmd_serve(opts: &ServeOptions) -> Result<()> {
    let config = server_config(opts)?;
    info!(store = ?config.store, "Starting server");
    passvault_server::start_server(&config)
        .await
        .context("Server failed")
}

/// Prompt for a secret without echo.
fn prompt_secret(prompt: &str) -> Result<Zeroizing<String>> {
    let secret = rpassword::prompt_password(prompt).context("Failed to read password")?;
    Ok(Zeroizing::new(secret))
}

fn prompt_new_secret(prompt: &str, confirm: &str) -> Result<Zeroizing<String>> {
    let secret = prompt_secret(prompt)?;
    if secret.is_empty() {
        bail!("Password cannot be empty");
    }
    if *prompt_secret(confirm)? != *secret {
        bail!("Passwords do not match");
    }
    Ok(secret)
}

fn prompt_master() -> Result<Zeroizing<Vec<u8>>> {
    let master = prompt_secret("Master password: ")?;
    Ok(Zeroizing::new(master.as_bytes().to_vec()))
}

/// Present vault errors; secret failures never say which part was wrong.
fn vault_error(e: Error) -> anyhow::Error {
    if e.is_secret_failure() {
        anyhow!(SECRET_FAILURE_MESSAGE)
    } else {
        anyhow!(e)
    }
}

async fn seal(
    fields: PlainFields,
    master: Zeroizing<Vec<u8>>,
    ctx: SessionContext,
) -> Result<EncryptedItem> {
    tokio::task::spawn_blocking(move || encrypt_item(&fields, &master, &ctx))
        .await?
        .map_err(vault_error)
}

async fn open(item: EncryptedItem, master: Zeroizing<Vec<u8>>) -> Result<PlainFields> {
    tokio::task::spawn_blocking(move || decrypt_item(&item, &master))
        .await?
        .map_err(vault_error)
}

fn session_context(session: &ClientSession, policy: SaltPolicy) -> Result<SessionContext> {
    SessionContext::from_account(&session.enc_salt, policy, KdfParams::default())
        .context("Session has an invalid encSalt; log in again")
}

fn authorized_client(session_file: &Path) -> Result<(ClientSession, ApiClient)> {
    let session = ClientSession::load(session_file)?;
    let client = ApiClient::new(&session.server)?.with_token(session.token.clone());
    Ok((session, client))
}

fn item_password(source: PasswordSource) -> Result<Option<Zeroizing<String>>> {
    match source {
        PasswordSource::Keep => Ok(None),
        PasswordSource::Prompt => prompt_secret("Item password: ").map(Some),
        PasswordSource::Generate(opts) => {
            let generated = generate_password(&opts)?;
            println!("Generated password: {}", generated);
            Ok(Some(Zeroizing::new(generated)))
        }
    }
}

/// Apply command-line values onto decrypted fields.
pub fn apply_fields(plain: &mut PlainFields, args: FieldArgs) {
    let FieldArgs {
        title,
        username,
        url,
        notes,
    } = args;
    for (name, value) in [
        (FieldName::Title, title),
        (FieldName::Username, username),
        (FieldName::Url, url),
        (FieldName::Notes, notes),
    ] {
        if let Some(value) = value {
            plain.set(name, value);
        }
    }
}

fn masked(secret: &str, reveal: bool) -> String {
    if reveal {
        secret.to_string()
    } else if secret.is_empty() {
        String::new()
    } else {
        "********".to_string()
    }
}

/// Create an account and save the session.
pub async fn cmd_signup(server: &str, email: &str, session_file: &Path) -> Result<()> {
    let password = prompt_new_secret("Login password: ", "Confirm login password: ")?;

    let client = ApiClient::new(server)?;
    let auth = client
        .signup(email, &password)
        .await
        .context("Signup failed")?;

    ClientSession::from_auth(server, auth).save(session_file)?;
    println!("Account created for {}.", email);
    println!("Choose a master password for your vault; it is never sent to the server");
    println!("and cannot be recovered.");
    Ok(())
}

/// Log in and save the session.
pub async fn cmd_login(server: &str, email: &str, session_file: &Path) -> Result<()> {
    let password = prompt_secret("Login password: ")?;

    let client = ApiClient::new(server)?;
    let auth = client
        .login(email, &password)
        .await
        .context("Login failed")?;

    ClientSession::from_auth(server, auth).save(session_file)?;
    println!("Logged in as {}.", email);
    Ok(())
}

/// Forget the saved session.
pub fn cmd_logout(session_file: &Path) -> Result<()> {
    if ClientSession::remove(session_file)? {
        println!("Logged out.");
    } else {
        println!("No saved session.");
    }
    Ok(())
}

/// Encrypt a new item locally and upload it.
pub async fn cmd_add(
    session_file: &Path,
    fields: FieldArgs,
    source: PasswordSource,
    policy: SaltPolicy,
) -> Result<()> {
    let (session, client) = authorized_client(session_file)?;

    let password = item_password(source)?.ok_or_else(|| anyhow!("Item password required"))?;
    let mut plain = PlainFields::new("", password.as_str());
    apply_fields(&mut plain, fields);
    plain.validate().map_err(vault_error)?;

    let master = prompt_master()?;
    let ctx = session_context(&session, policy)?;
    let item = seal(plain, master, ctx).await?;

    let record = client.create_item(&item).await?;
    println!("Added item {}", record.id);
    Ok(())
}

/// List items with their titles and usernames decrypted.
pub async fn cmd_list(session_file: &Path) -> Result<()> {
    let (_, client) = authorized_client(session_file)?;
    let records = client.list_items().await?;
    if records.is_empty() {
        println!("Vault is empty.");
        return Ok(());
    }

    let master = prompt_master()?;
    let total = records.len();
    let rows = tokio::task::spawn_blocking(move || {
        records
            .into_iter()
            .map(|r| {
                let plain = decrypt_item(&r.item, &master);
                (r, plain)
            })
            .collect::<Vec<_>>()
    })
    .await?;

    let mut failed = 0;
    for (record, plain) in &rows {
        match plain {
            Ok(p) if p.username.is_empty() => println!("{}  {}", record.id, p.title),
            Ok(p) => println!("{}  {}  ({})", record.id, p.title, p.username),
            Err(e) => {
                debug!(item_id = %record.id, error = %e, "item did not decrypt");
                failed += 1;
                println!("{}  [{}]", record.id, SECRET_FAILURE_MESSAGE);
            }
        }
    }

    if failed == total {
        bail!(SECRET_FAILURE_MESSAGE);
    }
    Ok(())
}

/// Decrypt and print one item.
pub async fn cmd_show(session_file: &Path, id: &str, reveal: bool) -> Result<()> {
    let id = ItemId::parse(id)?;
    let (_, client) = authorized_client(session_file)?;
    let record = client.get_item(&id).await?;

    let master = prompt_master()?;
    let plain = open(record.item.clone(), master).await?;
    print_item(&record, &plain, reveal);
    Ok(())
}

fn print_item(record: &ItemRecord, plain: &PlainFields, reveal: bool) {
    println!("ID:       {}", record.id);
    println!("Title:    {}", plain.title);
    println!("Username: {}", plain.username);
    println!("Password: {}", masked(&plain.password, reveal));
    println!("URL:      {}", plain.url);
    if !plain.notes.is_empty() {
        println!("Notes:    {}", plain.notes);
    }
    println!("Version:  {}", record.version);
    println!("Updated:  {}", record.updated_at.to_rfc3339());
}

/// Decrypt, modify, re-encrypt with fresh IVs and upload.
pub async fn cmd_edit(
    session_file: &Path,
    id: &str,
    fields: FieldArgs,
    source: PasswordSource,
    policy: SaltPolicy,
) -> Result<()> {
    let id = ItemId::parse(id)?;
    let (session, client) = authorized_client(session_file)?;
    let record = client.get_item(&id).await?;

    let master = prompt_master()?;
    let mut plain = open(record.item.clone(), master.clone()).await?;

    apply_fields(&mut plain, fields);
    if let Some(password) = item_password(source)? {
        plain.set(FieldName::Password, password.to_string());
    }
    plain.validate().map_err(vault_error)?;

    let ctx = session_context(&session, policy)?;
    let item = seal(plain, master, ctx).await?;
    let update = ItemUpdate {
        expected_version: record.version,
        item,
    };

    let updated = client.update_item(&id, &update).await?;
    println!("Updated item {} (version {})", updated.id, updated.version);
    Ok(())
}

/// Delete an item.
pub async fn cmd_remove(session_file: &Path, id: &str) -> Result<()> {
    let id = ItemId::parse(id)?;
    let (_, client) = authorized_client(session_file)?;
    client.delete_item(&id).await?;
    println!("Removed item {}", id);
    Ok(())
}

/// Re-encrypt every record under `new`, or fail without producing any update.
fn rekey_all(
    records: &[ItemRecord],
    old: &[u8],
    new: &[u8],
    ctx: &SessionContext,
) -> Result<Vec<(ItemId, ItemUpdate)>> {
    records
        .iter()
        .map(|record| -> Result<(ItemId, ItemUpdate)> {
            let item = rekey_item(&record.item, old, new, ctx)
                .map_err(vault_error)
                .with_context(|| {
                    format!(
                        "Item {} could not be re-encrypted; nothing was uploaded",
                        record.id
                    )
                })?;
            Ok((
                record.id,
                ItemUpdate {
                    expected_version: record.version,
                    item,
                },
            ))
        })
        .collect()
}

/// Re-encrypt the whole vault locally, then upload. Returns the item count.
///
/// Nothing is sent unless every item re-encrypts.
async fn rekey_vault(
    client: &ApiClient,
    old: Zeroizing<Vec<u8>>,
    new: Zeroizing<Vec<u8>>,
    ctx: SessionContext,
) -> Result<usize> {
    let records = client.list_items().await?;
    let updates =
        tokio::task::spawn_blocking(move || rekey_all(&records, &old, &new, &ctx)).await??;

    let total = updates.len();
    for (done, (id, update)) in updates.iter().enumerate() {
        client.update_item(id, update).await.with_context(|| {
            format!("Upload of item {} failed; {} of {} uploaded", id, done, total)
        })?;
        debug!(item_id = %id, "item re-encrypted");
    }
    Ok(total)
}

/// Re-encrypt every item under a new master password.
pub async fn cmd_rekey(session_file: &Path, policy: SaltPolicy) -> Result<()> {
    let (session, client) = authorized_client(session_file)?;

    let old = prompt_master()?;
    let new = prompt_new_secret("New master password: ", "Confirm new master password: ")?;
    let new = Zeroizing::new(new.as_bytes().to_vec());
    let ctx = session_context(&session, policy)?;

    let total = rekey_vault(&client, old, new, ctx).await?;
    println!("Re-encrypted {} item(s).", total);
    Ok(())
}

/// Print a random password.
pub fn cmd_generate(opts: &GeneratorOptions) -> Result<()> {
    let password = Zeroizing::new(generate_password(opts)?);
    println!("{}", password.as_str());
    Ok(())
}
