//! Helpers shared across CLI commands.

use std::sync::Arc;

use navlayer::accounts::{BillingModel, IniTokenStore, NavigationAccounts};
use navlayer::config::ConfigFile;

use crate::error::CliError;

/// Billing model from a CLI override, falling back to `accounts.manage_sku`.
pub fn billing_model(manage_sku: Option<bool>, config: &ConfigFile) -> BillingModel {
    BillingModel::from_manage_sku(manage_sku.or(config.accounts.manage_sku))
}

/// Accounts backed by the configured token store.
pub fn open_accounts(
    config: &ConfigFile,
    model: BillingModel,
) -> Result<NavigationAccounts, CliError> {
    let store = IniTokenStore::open(config.accounts.token_store.clone())?;
    Ok(NavigationAccounts::new(Arc::new(store), model))
}
