//! `navlayer sku`: append the billing token to a resource URL.

use clap::Args;
use console::style;
use navlayer::config::ConfigFile;

use super::common::{billing_model, open_accounts};
use crate::error::CliError;

/// Arguments of the sku command.
#[derive(Debug, Args)]
pub struct SkuArgs {
    /// Resource URL to append the token to; prints the bare token if omitted
    #[arg(long)]
    pub url: Option<String>,

    /// Length of the URL's query string (0 when it has none, negative for
    /// the bare token)
    #[arg(long, allow_negative_numbers = true)]
    pub query_size: i32,

    /// Bill per trip (true) or per monthly active user (false); defaults to
    /// accounts.manage_sku
    #[arg(long)]
    pub manage_sku: Option<bool>,
}

/// Run the sku command.
pub fn run(args: SkuArgs) -> Result<(), CliError> {
    let config = ConfigFile::load()?;
    let model = billing_model(args.manage_sku, &config);
    let accounts = open_accounts(&config, model)?;

    if accounts.current_token().is_empty() {
        eprintln!(
            "{} no {} token issued yet; run 'navlayer tokens refresh'",
            style("warning:").yellow().bold(),
            model
        );
    }

    println!("{}", accounts.obtain_sku_token(args.url.as_deref(), args.query_size));
    Ok(())
}
