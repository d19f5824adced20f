//! Command-line argument definitions

use clap::Parser;

use linkcable_core::DEFAULT_UNIT_MARKER;

/// Exchange creature records with a nearby storage unit over BLE
#[derive(Parser, Debug)]
#[command(name = "linkcable", version, about)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Advertised-name marker identifying a storage unit
    #[arg(long, default_value = DEFAULT_UNIT_MARKER)]
    pub marker: String,

    /// Deduplicate sightings by peripheral identifier instead of name
    #[arg(long)]
    pub dedup_by_id: bool,

    /// How long to scan before picking a unit, in seconds
    #[arg(long, default_value_t = 10)]
    pub scan_secs: u64,

    /// Connect to the unit with this advertised name; defaults to the
    /// first unit surfaced
    #[arg(long)]
    pub unit: Option<String>,
}
