use std::process::ExitCode;

use configs::AppConfig;
use tokio::runtime::Runtime;
use tracing::{error, info};
use uuid::Uuid;

/// Identifies this process in every lifecycle log line.
#[derive(Clone, Copy)]
struct Instance {
    id: Uuid,
    pid: u32,
}

fn main() -> ExitCode {
    // .env must be loaded before the subscriber reads RUST_LOG / LOG_FORMAT
    dotenvy::dotenv().ok();
    common::utils::logging::init_logging_from_env();

    let me = Instance { id: Uuid::new_v4(), pid: std::process::id() };
    std::panic::set_hook(Box::new(move |panic| {
        error!(service = "cms", event = "panic", instance = %me.id, pid = me.pid, message = %panic, "unhandled panic");
    }));

    // missing jwt secret or database url ends here
    let cfg = match AppConfig::load_and_validate() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(service = "cms", event = "config_invalid", error = %e, "configuration rejected");
            return ExitCode::FAILURE;
        }
    };
    let rt = match runtime(cfg.server.worker_threads) {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "cms", event = "runtime_build_failed", error = %e, "cannot start tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    info!(
        service = "cms",
        event = "start",
        instance = %me.id,
        pid = me.pid,
        version = env!("CARGO_PKG_VERSION"),
        host = %cfg.server.host,
        port = cfg.server.port,
        "cms server starting"
    );
    rt.block_on(serve_until_ctrl_c(cfg, me))
}

fn runtime(worker_threads: Option<usize>) -> std::io::Result<Runtime> {
    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(n) = worker_threads {
        builder.worker_threads(n);
    }
    builder.build()
}

async fn serve_until_ctrl_c(cfg: AppConfig, me: Instance) -> ExitCode {
    let server = tokio::spawn(server::run(cfg));
    tokio::select! {
        joined = server => match joined {
            Ok(Ok(())) => {
                info!(service = "cms", event = "stop", instance = %me.id, pid = me.pid, "server exited");
                ExitCode::SUCCESS
            }
            Ok(Err(e)) => {
                error!(service = "cms", event = "run_failed", error = %e, "server stopped with an error");
                ExitCode::FAILURE
            }
            Err(e) => {
                error!(service = "cms", event = "task_join_error", error = %e, "server task aborted");
                ExitCode::FAILURE
            }
        },
        _ = tokio::signal::ctrl_c() => {
            info!(service = "cms", event = "shutdown_signal", instance = %me.id, pid = me.pid, "ctrl-c received, shutting down");
            ExitCode::SUCCESS
        }
    }
}
