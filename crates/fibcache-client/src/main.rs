//! fibcache load client
//!
//! Logs in as a user, then fires concurrent `/fib` requests with random
//! inputs and prints their sum.

use anyhow::{bail, Context, Result};
use clap::Parser;
use futures::future::join_all;
use rand::Rng;
use serde::Deserialize;
use std::time::Duration;
use tracing::{error, info, info_span, Instrument};

#[derive(Parser)]
#[command(name = "fibcache-client")]
#[command(author, version, about = "Exercise a fibcache server", long_about = None)]
struct Cli {
    /// Server base URL
    #[arg(long, env = "FIBCACHE_HOST", default_value = "http://localhost:9090")]
    host: String,

    /// User to log in as
    #[arg(long, default_value = "user1")]
    user: String,

    /// Number of concurrent fib requests
    #[arg(short, long, default_value_t = 2)]
    requests: usize,

    /// Per-request timeout in milliseconds
    #[arg(long, default_value_t = 1000)]
    timeout_ms: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Deserialize)]
struct User {
    id: String,
    key: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(if cli.verbose {
            "fibcache_client=debug"
        } else {
            "fibcache_client=info"
        })
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let client = reqwest::Client::new();
    let user = login(&client, &cli.host, &cli.user)
        .instrument(info_span!("login", user = %cli.user))
        .await?;
    info!("Logged in as {}", user.id);

    let timeout = Duration::from_millis(cli.timeout_ms);
    let inputs: Vec<u64> = {
        let mut rng = rand::thread_rng();
        (0..cli.requests).map(|_| rng.gen_range(20..50)).collect()
    };

    let results = join_all(inputs.into_iter().map(|n| {
        let client = &client;
        let host = cli.host.as_str();
        let key = user.key.as_str();
        async move {
            let result = get_fib(client, host, key, n, timeout).await;
            (n, result)
        }
        .instrument(info_span!("fib_client", fib_input = n))
    }))
    .await;

    let mut sum: i64 = 0;
    for (n, result) in results {
        match result {
            Ok(value) => {
                println!("fib({}) = {}", n, value);
                sum = sum.wrapping_add(value);
            }
            Err(e) => error!("fib({}) failed: {:#}", n, e),
        }
    }
    println!("Result: {}", sum);

    Ok(())
}

async fn login(client: &reqwest::Client, host: &str, user: &str) -> Result<User> {
    let response = client
        .get(format!("{}/login", host))
        .query(&[("user", user)])
        .send()
        .await
        .context("Error requesting login")?;
    if !response.status().is_success() {
        bail!("Login rejected: {}", response.status());
    }
    response.json().await.context("Invalid login response")
}

async fn get_fib(
    client: &reqwest::Client,
    host: &str,
    key: &str,
    n: u64,
    timeout: Duration,
) -> Result<i64> {
    let response = client
        .get(format!("{}/fib", host))
        .query(&[("n", n)])
        .header("Authorization", key)
        .timeout(timeout)
        .send()
        .await
        .context("Error requesting fib number")?;

    let status = response.status();
    let body = response.text().await.context("Error reading response")?;
    if !status.is_success() {
        bail!("Not OK response, error code: {} ({})", status, body.trim());
    }
    parse_fib_body(&body)
}

fn parse_fib_body(body: &str) -> Result<i64> {
    body.trim()
        .parse()
        .with_context(|| format!("Response is not a number: {:?}", body))
}
