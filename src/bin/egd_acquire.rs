// src/bin/egd_acquire.rs
//! Acquisition demo: drives a simulated device until Ctrl-C or end of data
//!
//! Usage: `egd-acquire [config.toml]`. Without an argument the default
//! configuration files and `EGD__*` environment variables are read.

use egd_acquisition::hal::simulator::SimulatorLayer;
use egd_acquisition::{AcqError, ConfigLoader, EgdAcquisition, NeuroFrame};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "egd_acquisition=info,egd_acquire=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let loader = match std::env::args().nth(1) {
        Some(path) => ConfigLoader::with_paths(vec![PathBuf::from(path)]),
        None => ConfigLoader::new(),
    };
    let config = loader.load()?;
    let store = loader.build_store()?;
    info!(version = egd_acquisition::VERSION, devarg = %config.device.devarg, "starting acquisition");

    let layer = SimulatorLayer::new(config.simulator.clone().unwrap_or_default());
    let device = EgdAcquisition::new(Box::new(layer), Box::new(store)).with_selector_rules(config.selector.clone());

    let running = Arc::new(AtomicBool::new(true));
    tokio::spawn({
        let running = Arc::clone(&running);
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("interrupt received, stopping");
                running.store(false, Ordering::Relaxed);
            }
        }
    });

    let framerate = config.framerate;
    let total = tokio::task::spawn_blocking(move || acquire(device, framerate, &running)).await??;
    info!(total, "acquisition finished");
    Ok(())
}

/// Run the device lifecycle on the calling thread, one frame per pull
fn acquire(mut device: EgdAcquisition, framerate: u32, running: &AtomicBool) -> Result<u64, AcqError> {
    device.try_configure(NeuroFrame::new(), framerate)?;
    device.try_open()?;
    device.try_setup()?;

    let identity = device.device_info();
    info!(
        model = %identity.model,
        id = %identity.id,
        samples_per_cycle = device.samples_per_cycle(),
        "device ready"
    );

    device.try_start()?;
    let mut total = 0u64;
    while running.load(Ordering::Relaxed) {
        let count = device.try_get()?;
        if count == 0 {
            info!("end of data");
            break;
        }
        total += count as u64;

        let frame = device.frame();
        let triggers = frame
            .tri
            .samples()
            .rows()
            .into_iter()
            .take(count)
            .filter(|row| row.iter().any(|&v| v != 0))
            .count();
        info!(count, total, triggers, "frame acquired");
        if count < device.samples_per_cycle() {
            warn!(count, "short read");
        }
    }

    device.try_stop()?;
    device.release();
    Ok(total)
}
