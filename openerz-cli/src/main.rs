//! Command line frontend printing the next OpenERZ pickup date for an area.

mod cli;
mod logger;

use std::io::{self, Write};

use anyhow::Result;
use clap::Parser;
use openerz_provider_http as provider;

use crate::cli::Arguments;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Arguments::parse();
    logger::init(args.verbose);

    let base_url = args.resolve_base_url();
    tracing::debug!(%base_url, zip = %args.zip, waste_type = %args.waste_type, "starting lookup");

    let client = provider::client()?;
    let mut query = provider::connector(client, &base_url, args.zip, args.waste_type.clone());

    let next_pickup = query.find_next_pickup(args.days).await;

    let mut stdout = io::stdout().lock();
    match next_pickup {
        Some(date) => writeln!(
            stdout,
            "Next pickup date for {} in {} area: {date}",
            args.waste_type, args.zip
        )?,
        None => writeln!(
            stdout,
            "No pickup of {} found in {} area within {} days",
            args.waste_type, args.zip, args.days
        )?,
    }

    Ok(())
}
