//! `navlayer tokens`: issue and inspect billing tokens.

use chrono::Utc;
use clap::Subcommand;
use console::style;
use navlayer::accounts::{BillingModel, NavigationAccounts};
use navlayer::config::ConfigFile;

use super::common::{billing_model, open_accounts};
use crate::error::CliError;

/// Token subcommands.
#[derive(Debug, Subcommand)]
pub enum TokensAction {
    /// Issue a token for the billing model if the current one is missing or expired
    Refresh {
        /// Bill per trip (true) or per monthly active user (false)
        #[arg(long)]
        manage_sku: Option<bool>,
    },
    /// Show issued tokens for both billing models
    Show,
}

/// Run a tokens subcommand.
pub fn run(action: TokensAction) -> Result<(), CliError> {
    let config = ConfigFile::load()?;

    match action {
        TokensAction::Refresh { manage_sku } => {
            let model = billing_model(manage_sku, &config);
            let accounts = open_accounts(&config, model)?;
            let now = Utc::now();

            let issued = match model {
                BillingModel::Mau => accounts.initialize_sku(now),
                BillingModel::Trips => {
                    accounts.navigation_started(now);
                    true
                }
            };

            if issued {
                println!("Issued new {} token", style(model).green());
            } else {
                println!("{} token still valid", model);
            }
            print_token(&accounts, model);
            Ok(())
        }
        TokensAction::Show => {
            let accounts = open_accounts(&config, BillingModel::Mau)?;
            println!("Token store: {}", config.accounts.token_store.display());
            for model in [BillingModel::Mau, BillingModel::Trips] {
                print_token(&accounts, model);
            }
            Ok(())
        }
    }
}

fn print_token(accounts: &NavigationAccounts, model: BillingModel) {
    match accounts.token(model) {
        Some(token) => {
            let issued = accounts
                .issued_at(model)
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| "unknown".to_string());
            println!("  {:<6} {}  (issued {})", model.as_str(), token, issued);
        }
        None => println!("  {:<6} {}", model.as_str(), style("(none)").dim()),
    }
}
