use clap::Parser;
use openerz_core::{DEFAULT_DAY_OFFSET, PostalCode, WasteType};
use openerz_provider_http::BASE_URL;

/// Environment variable overriding the service root.
pub(crate) const BASE_URL_ENV: &str = "OPENERZ_URL";

/// Look up the next waste pickup date for a Zurich postal code.
#[derive(Debug, Parser)]
#[command(version, about)]
pub(crate) struct Arguments {
    /// postal code of the area of interest
    pub(crate) zip: PostalCode,
    /// waste type (paper, cardboard, waste, cargotram, etram, organic, textile)
    pub(crate) waste_type: WasteType,
    /// number of days to look ahead
    #[arg(long, short, default_value_t = DEFAULT_DAY_OFFSET, allow_negative_numbers = true)]
    pub(crate) days: i32,
    /// service root, overrides the OPENERZ_URL environment variable
    #[arg(long)]
    pub(crate) base_url: Option<String>,
    /// log request details
    #[arg(long, short)]
    pub(crate) verbose: bool,
}

impl Arguments {
    /// Service root from the flag, the environment, or the public default, in that order.
    pub(crate) fn resolve_base_url(&self) -> String {
        resolve_base_url(self.base_url.clone(), std::env::var(BASE_URL_ENV).ok())
    }
}

fn resolve_base_url(flag: Option<String>, env: Option<String>) -> String {
    flag.or(env)
        .filter(|url| !url.trim().is_empty())
        .unwrap_or_else(|| BASE_URL.to_owned())
}
