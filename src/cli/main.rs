//! syncpad command-line driver
//!
//! A thin presentation layer over the sync engine: it persists mutations
//! through the local store, requests reconciliation opportunistically after
//! each one, and prints the resulting snapshot. All logic lives in the
//! library; this binary only parses arguments and renders output.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use syncpad::config::Config;
use syncpad::error::SyncError;
use syncpad::local_db::LocalStore;
use syncpad::remote::HttpRemoteStore;
use syncpad::session::{AuthClient, SessionContext};
use syncpad::sync::{SyncCoordinator, SyncEngine};
use syncpad::types::TodoPatch;
use tracing_subscriber::EnvFilter;

/// Session persisted between CLI invocations
#[derive(Debug, Serialize, Deserialize)]
struct StoredSession {
    principal_id: String,
    email: String,
    token: String,
}

fn session_path() -> PathBuf {
    let mut path = dirs::data_dir().unwrap_or_else(std::env::temp_dir);
    path.push("syncpad");
    path.push("session.json");
    path
}

fn load_session() -> Option<SessionContext> {
    let raw = std::fs::read_to_string(session_path()).ok()?;
    let stored: StoredSession = serde_json::from_str(&raw).ok()?;
    Some(SessionContext::new(
        stored.principal_id,
        stored.email,
        stored.token,
    ))
}

fn save_session(session: &SessionContext) -> std::io::Result<()> {
    let path = session_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let stored = StoredSession {
        principal_id: session.principal_id().to_string(),
        email: session.email().to_string(),
        token: session.token().to_string(),
    };
    std::fs::write(path, serde_json::to_string(&stored).expect("session serializes"))
}

fn clear_session() {
    let _ = std::fs::remove_file(session_path());
}

fn usage() {
    eprintln!("usage: syncpad <command> [args]");
    eprintln!();
    eprintln!("  add <text>               create a todo");
    eprintln!("  list                     show all todos");
    eprintln!("  done <id> | undone <id>  toggle completion");
    eprintln!("  edit <id> <text>         change the text");
    eprintln!("  rm <id>                  delete a todo");
    eprintln!("  sync                     reconcile with the remote store");
    eprintln!("  status                   local store and sync state");
    eprintln!("  login <email> <pass>     sign in");
    eprintln!("  register <email> <pass>  create an account and sign in");
    eprintln!("  logout                   sign out");
}

async fn print_list(store: &LocalStore) -> syncpad::error::Result<()> {
    let todos = store.list_all().await?;
    if todos.is_empty() {
        println!("(no todos)");
        return Ok(());
    }
    for todo in todos {
        let check = if todo.done { "x" } else { " " };
        let pending = if todo.is_synced() { "" } else { " (not synced)" };
        println!("{:>4} [{}] {}{}", todo.local_id, check, todo.text, pending);
    }
    Ok(())
}

async fn run() -> Result<(), SyncError> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first().map(String::as_str) else {
        usage();
        return Ok(());
    };

    let config = Config::load().map_err(|e| SyncError::storage(e.to_string()))?;
    let store = LocalStore::open(config.db_path()).await?;
    let remote = Arc::new(HttpRemoteStore::new(config.clone()));
    let engine = SyncEngine::new(store.clone(), remote);
    let sync = SyncCoordinator::new(engine, config.debounce());
    sync.set_session(load_session()).await.ok();

    match (command, &args[1..]) {
        ("add", [text, ..]) => {
            store.create(text).await?;
            sync.request_sync().await?;
            print_list(&store).await?;
        }
        ("list", _) => {
            print_list(&store).await?;
        }
        ("done", [id, ..]) | ("undone", [id, ..]) => {
            let local_id: i64 = id
                .parse()
                .map_err(|_| SyncError::not_found(format!("todo {}", id)))?;
            let done = command == "done";
            store.update(local_id, &TodoPatch::done(done)).await?;
            sync.request_sync().await?;
            print_list(&store).await?;
        }
        ("edit", [id, text, ..]) => {
            let local_id: i64 = id
                .parse()
                .map_err(|_| SyncError::not_found(format!("todo {}", id)))?;
            store
                .update(local_id, &TodoPatch::text(text.clone()))
                .await?;
            sync.request_sync().await?;
            print_list(&store).await?;
        }
        ("rm", [id, ..]) => {
            let local_id: i64 = id
                .parse()
                .map_err(|_| SyncError::not_found(format!("todo {}", id)))?;
            store.delete(local_id).await?;
            sync.request_sync().await?;
            print_list(&store).await?;
        }
        ("sync", _) => match sync.request_sync().await? {
            Some(report) => println!(
                "synced {}, deferred {}, deletes {}",
                report.synced_count(),
                report.deferred_count(),
                report.deletes.len()
            ),
            None => println!("sync skipped (offline or signed out)"),
        },
        ("status", _) => {
            let stats = store.stats().await?;
            println!(
                "{} todos, {} awaiting push, {} awaiting remote delete",
                stats.total, stats.pending_push, stats.pending_delete
            );
            match store.last_sync_time().await? {
                Some(at) => println!("last sync: {}", at),
                None => println!("never synced"),
            }
            match load_session() {
                Some(session) => println!("signed in as {}", session.email()),
                None => println!("signed out"),
            }
        }
        ("login", [email, password, ..]) => {
            let auth = AuthClient::new(config);
            let session = auth.login(email, password).await?;
            save_session(&session).map_err(|e| SyncError::storage(e.to_string()))?;
            sync.set_session(Some(session.clone())).await?;
            let adopted = sync.import_remote().await?;
            println!("signed in as {} ({} todos adopted)", session.email(), adopted);
        }
        ("register", [email, password, ..]) => {
            let auth = AuthClient::new(config);
            let session = auth.register(email, password).await?;
            save_session(&session).map_err(|e| SyncError::storage(e.to_string()))?;
            sync.set_session(Some(session.clone())).await?;
            println!("account created, signed in as {}", session.email());
        }
        ("logout", _) => {
            clear_session();
            sync.set_session(None).await?;
            println!("signed out");
        }
        _ => usage(),
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(SyncError::InvalidCredentials) => {
            eprintln!("login failed: check your email and password");
            ExitCode::FAILURE
        }
        Err(SyncError::AccountExists) => {
            eprintln!("that email is already registered; try `syncpad login`");
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}
