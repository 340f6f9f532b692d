use hyper::service::{make_service_fn, service_fn};
use hyper::Server;
use log::{error, info};

use std::convert::Infallible;
use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

use envmon_server::api::{self, ApiContext};
use envmon_server::config::Settings;
use envmon_server::health::{CpuTempSource, SystemProbe};
use envmon_server::logger::init_logger;
use envmon_server::persistence::SensorStore;
use envmon_server::shutdown_signal;

#[tokio::main]
async fn main() -> ExitCode {
    init_logger();

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            error!("invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let store = SensorStore::new(settings.database_path.clone());
    if let Err(e) = store.ensure_schema().await {
        error!("failed to prepare {}: {}", store.db_path().display(), e);
        return ExitCode::FAILURE;
    }

    let probe = SystemProbe::new(CpuTempSource::new(settings.thermal_zone_path.clone()));
    let ctx = Arc::new(ApiContext::new(&settings, store, Arc::new(probe)));

    let addr = SocketAddr::new(settings.bind_addr, settings.api_port);

    let server = match Server::try_bind(&addr) {
        Ok(builder) => builder,
        Err(e) => {
            error!("failed to bind {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    let server = server
        .serve(make_service_fn(move |_conn| {
            let ctx = Arc::clone(&ctx);
            async move {
                Ok::<_, Infallible>(service_fn(move |req| {
                    api::req_handler(req, Arc::clone(&ctx))
                }))
            }
        }))
        .with_graceful_shutdown(shutdown_signal());

    info!("{} listening on http://{}", settings.api_title, addr);

    if let Err(e) = server.await {
        error!("server error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("server stopped");

    ExitCode::SUCCESS
}
