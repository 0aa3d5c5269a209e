use anyhow::Context;
use clap::{Parser, ValueEnum};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use raplcal::common::{cpuid, HardwareAccess, SystemMonotonic};
use raplcal::host::register_calibrator;
use raplcal::server::{self, AppState};
use raplcal::{CalibrationConfig, Calibrator};
use raplcal_raw::Vendor;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Once {
    Calibrate,
    Time,
}

#[derive(Parser, Debug)]
#[command(name = "raplcal")]
#[command(about = "RAPL energy counter calibration for AMD and Intel CPUs")]
struct Args {
    #[arg(
        long,
        default_value_t = raplcal_raw::DEFAULT_VENDOR,
        help = "Register layout to use (amd or intel)"
    )]
    vendor: Vendor,

    #[arg(long, default_value_t = 0, help = "CPU to pin to while sampling")]
    cpu: u32,

    #[arg(long, default_value = raplcal::config::DEFAULT_LISTEN, help = "Address to serve reports on")]
    listen: SocketAddr,

    #[arg(
        long,
        help = "Give up after this many polls without a counter change (default: wait forever)"
    )]
    sync_limit: Option<u64>,

    #[arg(long, value_enum, help = "Print a single report and exit instead of serving")]
    once: Option<Once>,

    #[arg(
        short,
        long,
        help = "Enable verbose logging (shows all CPUID/MSR accesses)"
    )]
    verbose: bool,
}

fn check_permissions(cpu: u32) -> anyhow::Result<()> {
    let msr_path = format!("/dev/cpu/{cpu}/msr");
    if std::fs::metadata(&msr_path).is_err() {
        anyhow::bail!(
            "Cannot access {msr_path}: the MSR kernel module may not be loaded (run: sudo modprobe msr)"
        );
    }

    if let Err(e) = std::fs::File::open(&msr_path) {
        if e.kind() == std::io::ErrorKind::PermissionDenied {
            anyhow::bail!("Permission denied accessing {msr_path}: run as root or grant CAP_SYS_RAWIO");
        }
    }

    Ok(())
}

async fn shutdown_signal(cancel_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::warn!("Shutdown triggered by Ctrl+C");
        },
        _ = terminate => {
            tracing::warn!("Shutdown triggered by SIGTERM");
        },
        _ = cancel_token.cancelled() => {},
    }

    cancel_token.cancel();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(log_level.into())
                .from_env_lossy(),
        )
        .init();

    let config = CalibrationConfig {
        vendor: args.vendor,
        cpu: args.cpu,
        sync_limit: args.sync_limit,
        listen: args.listen,
    };
    config.validate().context("invalid configuration")?;
    tracing::info!(
        "Configuration: {}",
        serde_json::to_string(&config).context("failed to encode configuration")?
    );

    check_permissions(config.cpu)?;

    match cpuid::detect_vendor() {
        Some(detected) if detected != config.vendor => tracing::warn!(
            "Running the {} register layout on a {} processor",
            config.vendor,
            detected
        ),
        Some(detected) => tracing::info!("Detected {} processor", detected),
        None => tracing::warn!("Unrecognized processor vendor: {}", cpuid::vendor_string()),
    }

    let calibrator = Arc::new(
        Calibrator::new(HardwareAccess::new(config.cpu), SystemMonotonic, config.clone())
            .context("failed to set up calibrator")?
            .pinned(),
    );

    if let Some(once) = args.once {
        let report = tokio::task::spawn_blocking(move || match once {
            Once::Calibrate => calibrator.calibrate().render(),
            Once::Time => calibrator.time().render(),
        })
        .await
        .context("report task failed")?;
        print!("{report}");
        return Ok(());
    }

    let state = Arc::new(AppState {
        registry: calibrator.metrics().registry(),
        attributes: register_calibrator(calibrator),
    });

    let cancel_token = CancellationToken::new();
    let app = server::router(Arc::clone(&state));

    let listener = tokio::net::TcpListener::bind(config.listen)
        .await
        .with_context(|| format!("failed to bind {}", config.listen))?;
    tracing::info!("Serving /rcal and /metrics on {}", config.listen);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel_token))
        .await?;

    tracing::info!("Server shutdown complete");
    // tears down the rcal object
    drop(state);

    Ok(())
}
