// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod fx;
pub mod goal;
pub mod reports;
pub mod transactions;

use anyhow::Result;
use tracing::warn;

use crate::config::Settings;
use crate::currency::{BASE_CURRENCY, RateTable};
use crate::prefs::Preferences;
use crate::service::Ledger;

/// Everything a command handler needs for one run of the binary.
pub struct Session {
    pub ledger: Ledger,
    pub prefs: Preferences,
    pub settings: Settings,
    pub currency_override: Option<String>,
}

impl Session {
    /// `--currency`, then the saved preference, then the base currency.
    pub fn display_currency(&self) -> String {
        self.currency_override
            .as_deref()
            .or_else(|| self.prefs.currency())
            .unwrap_or(BASE_CURRENCY)
            .to_uppercase()
    }

    /// Fetches the rate table. Failures degrade to a base-only table so
    /// amounts are still shown, unconverted.
    pub async fn rates(&self) -> RateTable {
        let provider = self.settings.rate_provider();
        let fetched = tokio::task::spawn_blocking(move || provider.fetch()).await;
        match fetched {
            Ok(Ok(table)) => table,
            Ok(Err(err)) => {
                warn!("exchange rates unavailable: {:#}", err);
                RateTable::default()
            }
            Err(err) => {
                warn!("exchange rate task failed: {}", err);
                RateTable::default()
            }
        }
    }

    /// Rates only when the display currency needs them.
    pub async fn rates_for_display(&self) -> RateTable {
        if self.display_currency() == BASE_CURRENCY {
            RateTable::default()
        } else {
            self.rates().await
        }
    }

    pub async fn close(self) -> Result<()> {
        self.ledger.close().await?;
        Ok(())
    }
}
