// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! BIM-Shell inspector: prints the element tree of a model and replays
//! isolation and search actions against it.
//!
//! Usage:
//!   bim-shell <elements.json> [options] [actions]

use std::env;
use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::Result;

mod cli;
mod render;
mod run;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            env::var("RUST_LOG").unwrap_or_else(|_| "warn,bim_shell=info".into()),
        )
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    match inspect(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn inspect(args: &[String]) -> Result<()> {
    let Some(args) = cli::parse(args)? else {
        print!("{}", cli::USAGE);
        return Ok(());
    };

    let config = run::load_config(&args)?;
    let elements = run::load_elements(&args.elements)?;
    tracing::info!(
        elements = elements.len(),
        levels = config.group_by.len(),
        "loaded model"
    );

    let (mut session, mut scene) = run::open(config, elements)?;
    for action in &args.actions {
        run::apply(&mut session, &mut scene, action)?;
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if args.json {
        render::write_json(&mut out, &session)?;
    } else {
        render::write_outline(&mut out, &session)?;
        render::write_summary(&mut out, &session)?;
    }
    out.flush()?;
    Ok(())
}
