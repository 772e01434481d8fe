// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::PathBuf;

use anyhow::{Context, Result};

use nestegg::commands::{self, Session};
use nestegg::config::{self, Settings};
use nestegg::prefs::Preferences;
use nestegg::{ErrorKind, Ledger, LedgerError, cli};

#[tokio::main]
async fn main() -> Result<()> {
    config::init_tracing();

    let matches = cli::build_cli().get_matches();
    let data_dir = matches.get_one::<String>("data_dir").map(PathBuf::from);
    let rates_file = matches.get_one::<String>("rates_file").map(PathBuf::from);
    let settings = Settings::resolve(data_dir.as_deref(), rates_file.as_deref())?;

    let ledger = Ledger::open(&settings.db_path())
        .with_context(|| format!("Open ledger at {}", settings.db_path().display()))?;
    let prefs = Preferences::load(&settings.prefs_path())?;
    let mut session = Session {
        ledger,
        prefs,
        settings,
        currency_override: matches.get_one::<String>("currency").cloned(),
    };

    let outcome = match matches.subcommand() {
        Some(("init", _)) => {
            println!(
                "Database initialized at {}",
                session.settings.db_path().display()
            );
            Ok(())
        }
        Some(("goal", sub)) => commands::goal::handle(&mut session, sub).await,
        Some(("tx", sub)) => commands::transactions::handle(&session, sub).await,
        Some(("report", sub)) => commands::reports::handle(&session, sub).await,
        Some(("fx", sub)) => commands::fx::handle(&mut session, sub).await,
        _ => {
            cli::build_cli().print_help()?;
            println!();
            Ok(())
        }
    };
    session.close().await?;
    outcome.map_err(explain)
}

// Storage faults get a generic message; the rest read as corrective prompts.
fn explain(err: anyhow::Error) -> anyhow::Error {
    match err.downcast_ref::<LedgerError>().map(LedgerError::kind) {
        Some(ErrorKind::StorageFault) => err.context("Data unavailable, try again"),
        _ => err,
    }
}
