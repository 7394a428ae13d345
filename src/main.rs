use clap::Parser;
use style_transfer_server::app_state::{AppConfig, AppState};
use style_transfer_server::server::{periodic_logging, startup};
use tokio::signal;

#[derive(Parser, Debug)]
#[command(
    name = "style-transfer-server",
    about = "HTTP style transfer service with a statistical fallback engine"
)]
struct Args {
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    #[arg(long, env = "PORT", default_value_t = 8000)]
    port: u16,
    /// Base URL of the neural stylization backend. When unset, every
    /// request is served by the statistical fallback.
    #[arg(long, env = "STYLE_BACKEND_URL")]
    backend_url: Option<String>,
    /// Ceiling on one backend call, in seconds.
    #[arg(long, default_value_t = 30)]
    backend_timeout: u64,
    /// Seconds between transfer-stats log lines.
    #[arg(long, default_value_t = 60)]
    log_interval: u64,
    /// Per-file upload ceiling in bytes.
    #[arg(long, default_value_t = 10 * 1024 * 1024)]
    max_upload_bytes: usize,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = AppConfig {
        host: args.host,
        port: args.port,
        backend_url: args.backend_url,
        backend_timeout: args.backend_timeout,
        log_interval: args.log_interval,
        max_upload_bytes: args.max_upload_bytes,
    };
    let app_state = AppState::new(&config)?;

    let ret: anyhow::Result<()> = actix_web::rt::System::new().block_on(async move {
        tokio::select! {
            _ = periodic_logging(app_state.clone()) => {
                unreachable!()
            }
            res = startup(config, app_state) => {
                res?;
                unreachable!()
            }
            _ = signal::ctrl_c() => {
                println!("Received Ctrl+C, shutting down");
                std::process::exit(0);
            }
        }
    });
    ret
}
