//! linkcable CLI - scan for a storage unit and run an exchange session

mod cli;

use std::time::Duration;

use clap::Parser;
use tracing::{error, info};

use linkcable_ble::BleTransport;
use linkcable_core::{
    event_channel, AlwaysGranted, CollectionSnapshot, ConnectionManager, DedupKey, ExchangeConfig,
    LinkState, TransportEvent,
};

use cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    let dedup_key = if cli.dedup_by_id {
        DedupKey::Id
    } else {
        DedupKey::Name
    };
    let config = ExchangeConfig::new()
        .with_unit_marker(cli.marker.clone())
        .with_dedup_key(dedup_key);

    let (event_tx, event_rx) = event_channel();
    let transport = BleTransport::new(config.clone(), event_tx);
    let mut manager = ConnectionManager::new(
        config,
        Box::new(transport),
        Box::new(AlwaysGranted),
        event_rx,
    );

    if let Err(e) = run_session(&mut manager, &cli).await {
        error!("session failed: {}", e);
        std::process::exit(1);
    }
}

async fn run_session(
    manager: &mut ConnectionManager,
    cli: &Cli,
) -> linkcable_core::Result<()> {
    manager.start_scan().await?;
    println!(
        "Scanning for storage units matching {:?} for {}s...",
        cli.marker, cli.scan_secs
    );

    // Drain sightings for the scan window
    let deadline = tokio::time::sleep(Duration::from_secs(cli.scan_secs));
    tokio::pin!(deadline);
    loop {
        tokio::select! {
            _ = &mut deadline => break,
            event = manager.next_event() => {
                match event {
                    Some(TransportEvent::Sighting(handle)) => {
                        info!("sighted {}", handle);
                    }
                    Some(_) => {}
                    None => break,
                }
            }
        }
    }

    let surfaced = manager.peripherals();
    if surfaced.is_empty() {
        println!("No storage units found.");
        manager.disconnect().await?;
        return Ok(());
    }

    println!("Found {} unit(s):", surfaced.len());
    for handle in &surfaced {
        println!("  {}", handle);
    }

    let chosen = match &cli.unit {
        Some(name) => manager.find_unit(name).ok_or_else(|| {
            linkcable_core::LinkcableError::connect_failed(name.clone(), "unit not surfaced")
        })?,
        None => surfaced[0].clone(),
    };

    println!("Connecting to {}...", chosen);
    manager.connect(&chosen).await?;
    println!("Link ready. Waiting for exchanges (Ctrl-C to quit).");
    print_snapshot(&manager.snapshot());

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                println!("Disconnecting...");
                manager.disconnect().await?;
                break;
            }
            event = manager.next_event() => {
                match event {
                    Some(TransportEvent::Frame(_)) => {
                        print_snapshot(&manager.snapshot());
                    }
                    Some(TransportEvent::Disconnected(reason)) => {
                        println!("Link dropped: {}", reason);
                        break;
                    }
                    Some(_) => {}
                    None => break,
                }
                if manager.state() == LinkState::Idle {
                    break;
                }
            }
        }
    }

    Ok(())
}

fn print_snapshot(snapshot: &CollectionSnapshot) {
    let party: Vec<String> = snapshot.party.iter().map(|r| r.to_string()).collect();
    let storage: Vec<String> = snapshot.storage.iter().map(|r| r.to_string()).collect();
    println!("  party:   [{}]", party.join(", "));
    println!("  storage: [{}]", storage.join(", "));
}

/// Setup logging based on verbosity level
fn setup_logging(verbose: bool) {
    let log_level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}
