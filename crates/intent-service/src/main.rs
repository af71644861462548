//! Operator CLI for the hub/spoke intent relay.
//!
//! Resolves hub wallets, inspects and waits on relay packets, decodes call
//! batch payloads and builds unsigned spoke transactions from a deployment
//! configuration file. Results are printed as JSON on stdout; logs go to
//! stderr.

use clap::{Parser, Subcommand};
use intent_config::Config;
use intent_core::{IntentService, IntentServiceBuilder};
use std::path::PathBuf;

mod commands;

use commands::{PrepareArgs, WaitArgs};

/// Command-line arguments for the intent relay CLI.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml", env = "INTENT_CONFIG")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Print the hub wallet of a spoke user
	Resolve {
		#[arg(long)]
		chain: u64,
		#[arg(long)]
		user: String,
	},
	/// Read the relay status of a spoke transaction once
	Status {
		#[arg(long)]
		chain: u64,
		#[arg(long)]
		tx: String,
	},
	/// Wait until a spoke transaction is executed on the hub
	Wait {
		#[arg(long)]
		chain: u64,
		#[arg(long)]
		tx: String,
		/// Overrides the configured timeout, in seconds
		#[arg(long)]
		timeout: Option<u64>,
		/// Overrides the configured poll interval, in milliseconds
		#[arg(long)]
		poll_interval: Option<u64>,
		/// Submit the transaction to the relay before waiting
		#[arg(long)]
		submit: bool,
	},
	/// Decode a hex call batch payload
	Decode { payload: String },
	/// Build the unsigned spoke transaction for an intent
	Prepare {
		#[arg(long)]
		chain: u64,
		#[arg(long)]
		user: String,
		/// Token to deposit, in the chain's address format
		#[arg(long, requires = "amount")]
		token: Option<String>,
		/// Amount in token units, e.g. 1.5, scaled by the token's decimals
		#[arg(long, requires = "token")]
		amount: Option<String>,
		/// Hex encoded call batch executed by the hub wallet
		#[arg(long)]
		payload: Option<String>,
	},
}

/// Main entry point for the CLI.
///
/// This function:
/// 1. Parses command-line arguments
/// 2. Initializes logging infrastructure
/// 3. Loads configuration when the command needs it
/// 4. Runs the command and prints its JSON result
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	use tracing_subscriber::{fmt, EnvFilter};

	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

	fmt()
		.with_env_filter(env_filter)
		.with_writer(std::io::stderr)
		.with_thread_ids(true)
		.with_target(true)
		.init();

	let output = match args.command {
		Command::Decode { payload } => commands::decode(&payload)?,
		command => {
			let service = build_service(&args.config).await?;
			run(&service, command).await?
		},
	};

	println!("{}", serde_json::to_string_pretty(&output)?);
	Ok(())
}

async fn build_service(path: &std::path::Path) -> Result<IntentService, Box<dyn std::error::Error>> {
	let path = path
		.to_str()
		.ok_or_else(|| format!("Config path is not valid UTF-8: {}", path.display()))?;
	let config = Config::from_file(path).await?;
	tracing::info!(hub_chain_id = %config.hub_chain_id(), "Loaded configuration");

	Ok(IntentServiceBuilder::new(config).build()?)
}

async fn run(service: &IntentService, command: Command) -> commands::CommandResult {
	match command {
		Command::Resolve { chain, user } => commands::resolve(service, chain, &user).await,
		Command::Status { chain, tx } => commands::status(service, chain, &tx).await,
		Command::Wait {
			chain,
			tx,
			timeout,
			poll_interval,
			submit,
		} => {
			commands::wait(
				service,
				WaitArgs {
					chain_id: chain,
					tx_hash: tx,
					timeout,
					poll_interval,
					submit,
				},
			)
			.await
		},
		Command::Prepare {
			chain,
			user,
			token,
			amount,
			payload,
		} => {
			commands::prepare(
				service,
				PrepareArgs {
					chain_id: chain,
					user,
					token,
					amount,
					payload,
				},
			)
			.await
		},
		Command::Decode { payload } => commands::decode(&payload),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_wait_overrides() {
		let args = Args::try_parse_from([
			"intent-relay",
			"--config",
			"deploy.toml",
			"wait",
			"--chain",
			"42161",
			"--tx",
			"0xabc",
			"--timeout",
			"120",
			"--submit",
		])
		.unwrap();

		assert_eq!(args.config, PathBuf::from("deploy.toml"));
		match args.command {
			Command::Wait {
				chain,
				timeout,
				poll_interval,
				submit,
				..
			} => {
				assert_eq!(chain, 42161);
				assert_eq!(timeout, Some(120));
				assert_eq!(poll_interval, None);
				assert!(submit);
			},
			other => panic!("unexpected command {:?}", other),
		}
	}

	#[test]
	fn test_token_requires_amount() {
		let result = Args::try_parse_from([
			"intent-relay",
			"prepare",
			"--chain",
			"42161",
			"--user",
			"0x1234567890123456789012345678901234567890",
			"--token",
			"0x0000000000000000000000000000000000000000",
		]);
		assert!(result.is_err());
	}
}
