//! Paste Settings command line
//!
//! Inspects merge results natively; in the browser the library's wasm
//! bindings are the entry point.

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use clap::{Parser, Subcommand};
    use paste_settings::{
        ErasePolicy, ReconcilerConfig, SettingsReconciler, SettingsRecord, merge_with, update_json,
    };

    #[derive(Parser, Debug)]
    #[command(name = "paste-settings", version, about = "Merge and resolve paste settings")]
    pub struct Cli {
        #[command(subcommand)]
        pub command: Command,
    }

    #[derive(Subcommand, Debug)]
    pub enum Command {
        /// Merge NEW over OLD and print the result
        Merge {
            /// Stored settings as a JSON object
            old: String,
            /// Incoming changes as a JSON object
            new: String,
            /// Let `null` erase an existing key (same as `--policy honor`)
            #[arg(long, conflicts_with = "policy")]
            erase: bool,
            /// Erase policy: `ignore`/`keep` or `honor`/`erase`
            #[arg(long, value_parser = parse_policy)]
            policy: Option<ErasePolicy>,
        },
        /// Merge NEW over a JSON string and print the merged JSON
        UpdateJson {
            /// Stored JSON; empty or malformed text counts as no settings
            json: String,
            /// Incoming changes as a JSON object
            new: String,
        },
        /// Print the effective settings for a config
        Resolve {
            /// Reconciler config as a JSON object
            config: Option<String>,
        },
    }

    fn parse_policy(s: &str) -> Result<ErasePolicy, String> {
        ErasePolicy::from_str(s).ok_or_else(|| format!("unknown erase policy: {s}"))
    }

    fn record(json: &str) -> Result<SettingsRecord, String> {
        SettingsRecord::from_json(json).map_err(|e| e.to_string())
    }

    pub fn run(cli: Cli) -> Result<String, String> {
        match cli.command {
            Command::Merge {
                old,
                new,
                erase,
                policy,
            } => {
                let policy = match (erase, policy) {
                    (true, _) => ErasePolicy::Honor,
                    (false, Some(policy)) => policy,
                    (false, None) => ErasePolicy::Ignore,
                };
                log::debug!("Merging with erase policy {}", policy.as_str());
                Ok(merge_with(&record(&old)?, &record(&new)?, policy).to_json())
            }
            Command::UpdateJson { json, new } => Ok(update_json(&json, &record(&new)?)),
            Command::Resolve { config } => {
                let config = match config {
                    Some(json) => ReconcilerConfig::from_json(&json).map_err(|e| e.to_string())?,
                    None => ReconcilerConfig::default(),
                };
                let settings = SettingsReconciler::detect(config).resolve();
                serde_json::to_string(&settings).map_err(|e| e.to_string())
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    use clap::Parser;

    env_logger::init();

    match cli::run(cli::Cli::parse()) {
        Ok(output) => {
            println!("{output}");
            std::process::ExitCode::SUCCESS
        }
        Err(message) => {
            log::error!("Command failed");
            eprintln!("{message}");
            std::process::ExitCode::FAILURE
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is the library's wasm_start, this is just to satisfy the compiler
}
