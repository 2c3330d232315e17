//! tools/loadtest/src/main.rs
//!
//! Load driver for the notepad API. Each simulated user logs in once, then
//! loops a weighted mix of requests: listing notes (x4), creating a note
//! (x3), and a show/edit/delete cycle against an existing note (x2), with a
//! 5-9 second pause between iterations.
//!
//! Configuration via environment variables:
//!   LOADTEST_HOST        target base URL (default http://localhost:3000)
//!   LOADTEST_USERS       number of concurrent simulated users (default 4)
//!   LOADTEST_ITERATIONS  iterations per user (default 20)
//!   LOADTEST_MIN_WAIT_MS / LOADTEST_MAX_WAIT_MS  pause bounds per iteration

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use rand::Rng;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Clone, Debug)]
struct Options {
    host: String,
    users: usize,
    iterations: usize,
    min_wait: Duration,
    max_wait: Duration,
}

impl Options {
    fn from_env() -> Result<Self> {
        let host =
            std::env::var("LOADTEST_HOST").unwrap_or_else(|_| "http://localhost:3000".to_string());
        let users = std::env::var("LOADTEST_USERS")
            .unwrap_or_else(|_| "4".to_string())
            .parse()
            .context("LOADTEST_USERS must be an integer")?;
        let iterations = std::env::var("LOADTEST_ITERATIONS")
            .unwrap_or_else(|_| "20".to_string())
            .parse()
            .context("LOADTEST_ITERATIONS must be an integer")?;
        let min_wait = std::env::var("LOADTEST_MIN_WAIT_MS")
            .unwrap_or_else(|_| "5000".to_string())
            .parse()
            .map(Duration::from_millis)
            .context("LOADTEST_MIN_WAIT_MS must be an integer")?;
        let max_wait = std::env::var("LOADTEST_MAX_WAIT_MS")
            .unwrap_or_else(|_| "9000".to_string())
            .parse()
            .map(Duration::from_millis)
            .context("LOADTEST_MAX_WAIT_MS must be an integer")?;
        Ok(Self {
            host,
            users,
            iterations,
            min_wait,
            max_wait,
        })
    }
}

#[derive(Default)]
struct Tally {
    requests: AtomicU64,
    failures: AtomicU64,
}

impl Tally {
    fn record(&self, ok: bool) {
        self.requests.fetch_add(1, Ordering::Relaxed);
        if !ok {
            self.failures.fetch_add(1, Ordering::Relaxed);
        }
    }
}

fn check(tally: &Tally, what: &str, status: StatusCode) {
    let ok = status == StatusCode::OK;
    if !ok {
        warn!("{} answered {}", what, status);
    }
    tally.record(ok);
}

/// Same weights as the original scenario: 4 index, 3 create, 2 edit cycle.
fn pick_task() -> u32 {
    rand::thread_rng().gen_range(0..9)
}

fn pick_wait(opts: &Options) -> Duration {
    let (lo, hi) = (opts.min_wait.as_millis() as u64, opts.max_wait.as_millis() as u64);
    Duration::from_millis(rand::thread_rng().gen_range(lo..=hi))
}

async fn login(client: &Client, opts: &Options) -> Result<()> {
    // Each worker registers its own throwaway account, so no seed data is
    // required in the target database.
    let email = format!("loadtest-{}@example.com", Uuid::new_v4());
    let status = client
        .post(format!("{}/auth/signup", opts.host))
        .json(&json!({"email": email, "password": "test1234"}))
        .send()
        .await?
        .status();
    anyhow::ensure!(
        status == StatusCode::CREATED,
        "signup for {} answered {}",
        email,
        status
    );
    Ok(())
}

async fn index(client: &Client, opts: &Options, tally: &Tally) -> Result<()> {
    let status = client
        .get(format!("{}/notepad", opts.host))
        .send()
        .await?
        .status();
    check(tally, "notepad index", status);
    Ok(())
}

async fn create_note(client: &Client, opts: &Options, tally: &Tally) -> Result<()> {
    let n: u32 = rand::thread_rng().gen();
    let status = client
        .post(format!("{}/notepad/create", opts.host))
        .json(&json!({
            "title": format!("Nota {}", n),
            "body": format!("Contenido generado {}", n),
        }))
        .send()
        .await?
        .status();
    check(tally, "create notepad", status);
    Ok(())
}

async fn show_edit_delete(client: &Client, opts: &Options, tally: &Tally) -> Result<()> {
    // Fetch the list to find an id to operate on; nothing to do on an
    // empty notepad.
    let response = client.get(format!("{}/notepad", opts.host)).send().await?;
    if response.status() != StatusCode::OK {
        tally.record(false);
        return Ok(());
    }
    let notes: Value = response.json().await?;
    let Some(id) = notes
        .as_array()
        .and_then(|list| list.first())
        .and_then(|note| note["id"].as_str())
        .map(str::to_string)
    else {
        return Ok(());
    };

    let status = client
        .get(format!("{}/notepad/{}", opts.host, id))
        .send()
        .await?
        .status();
    check(tally, "show notepad", status);

    let n: u32 = rand::thread_rng().gen();
    let status = client
        .post(format!("{}/notepad/edit/{}", opts.host, id))
        .json(&json!({
            "title": format!("Editada {}", n),
            "body": format!("Contenido nuevo {}", n),
        }))
        .send()
        .await?
        .status();
    check(tally, "edit notepad", status);

    let status = client
        .post(format!("{}/notepad/delete/{}", opts.host, id))
        .send()
        .await?
        .status();
    check(tally, "delete notepad", status);
    Ok(())
}

async fn run_user(opts: Options, tally: Arc<Tally>) -> Result<()> {
    let client = Client::builder().cookie_store(true).build()?;
    login(&client, &opts).await?;

    for _ in 0..opts.iterations {
        match pick_task() {
            0..=3 => index(&client, &opts, &tally).await?,
            4..=6 => create_note(&client, &opts, &tally).await?,
            _ => show_edit_delete(&client, &opts, &tally).await?,
        }
        tokio::time::sleep(pick_wait(&opts)).await;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let opts = Options::from_env()?;
    info!(
        "Driving {} with {} users x {} iterations",
        opts.host, opts.users, opts.iterations
    );

    let tally = Arc::new(Tally::default());
    let mut workers = Vec::with_capacity(opts.users);
    for _ in 0..opts.users {
        workers.push(tokio::spawn(run_user(opts.clone(), tally.clone())));
    }
    for worker in workers {
        if let Err(e) = worker.await? {
            warn!("Worker aborted: {:#}", e);
        }
    }

    info!(
        "Done: {} requests, {} failures",
        tally.requests.load(Ordering::Relaxed),
        tally.failures.load(Ordering::Relaxed)
    );
    Ok(())
}
