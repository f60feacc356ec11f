use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::json;

use locale_gatekeeper::config::{load_config, load_from_env, GatekeeperConfig};
use locale_gatekeeper::gatekeeper::{Gatekeeper, RequestDescriptor};
use locale_gatekeeper::security::{LoginDecision, LoginRateLimiter};

#[derive(Parser)]
#[command(name = "gatekeeper-cli")]
#[command(about = "Offline inspection CLI for the locale gatekeeper", long_about = None)]
struct Cli {
    /// Config file; defaults plus GATEKEEPER_* overrides when absent.
    #[arg(short, long, env = "GATEKEEPER_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline against a synthetic request and print the outcome
    Gate {
        /// Request target, e.g. "/auth/signin?error=Denied"
        #[arg(short, long)]
        url: String,

        /// Cookie as name=value (repeatable)
        #[arg(long = "cookie")]
        cookies: Vec<String>,

        /// Header as "Name: value" (repeatable)
        #[arg(long = "header")]
        headers: Vec<String>,
    },
    /// Replay failed logins against a fresh limiter and print each decision
    LoginBurst {
        #[arg(short, long)]
        key: String,

        #[arg(short, long, default_value_t = 12)]
        attempts: u32,

        /// Treat every attempt after this many as a successful login
        #[arg(long)]
        succeed_after: Option<u32>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => load_from_env()?,
    };

    match cli.command {
        Commands::Gate { url, cookies, headers } => gate(&config, &url, &cookies, &headers)?,
        Commands::LoginBurst {
            key,
            attempts,
            succeed_after,
        } => login_burst(&config, &key, attempts, succeed_after)?,
    }
    Ok(())
}

fn gate(
    config: &GatekeeperConfig,
    url: &str,
    cookies: &[String],
    headers: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    let gatekeeper = Gatekeeper::from_config(config)?;
    let mut request = RequestDescriptor::parse(url);
    for cookie in cookies {
        let (name, value) = cookie
            .split_once('=')
            .ok_or_else(|| format!("cookie '{}' is not name=value", cookie))?;
        request = request.with_cookie(name.trim(), value.trim());
    }
    for header in headers {
        let (name, value) = header
            .split_once(':')
            .ok_or_else(|| format!("header '{}' is not 'Name: value'", header))?;
        request = request.with_header(name.trim(), value.trim());
    }

    let outcome = gatekeeper.evaluate(&request);
    println!("{}", serde_json::to_string_pretty(&outcome.to_json())?);
    Ok(())
}

fn login_burst(
    config: &GatekeeperConfig,
    key: &str,
    attempts: u32,
    succeed_after: Option<u32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let limiter = LoginRateLimiter::from_config(&config.rate_limit);
    for attempt in 1..=attempts {
        let decision = limiter.check_and_record_failure(key);
        let succeeded = decision.is_allowed() && succeed_after.is_some_and(|k| attempt > k);
        if succeeded {
            limiter.record_success(key);
        }
        let retry_after = match decision {
            LoginDecision::Denied { retry_after } => Some(retry_after.as_secs()),
            _ => None,
        };
        let line = json!({
            "attempt": attempt,
            "decision": decision.as_str(),
            "remaining": decision.remaining(),
            "retry_after_secs": retry_after,
            "login_succeeded": succeeded,
        });
        println!("{}", serde_json::to_string(&line)?);
    }
    Ok(())
}
