use hyper::service::{make_service_fn, service_fn};
use hyper::Server;
use log::{error, info};

use std::convert::Infallible;
use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

use envmon_server::config::Settings;
use envmon_server::logger::init_logger;
use envmon_server::shutdown_signal;
use envmon_server::web::{self, WebContext};

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

    let ctx = Arc::new(WebContext::new(&settings));
    let addr = SocketAddr::new(settings.bind_addr, settings.web_port);

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
                    web::req_handler(req, Arc::clone(&ctx))
                }))
            }
        }))
        .with_graceful_shutdown(shutdown_signal());

    info!("dashboard listening on http://{}", addr);

    if let Err(e) = server.await {
        error!("server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
