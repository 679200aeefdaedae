use actix_web::dev::Service;
use actix_web::{App, HttpServer, web};
use anyhow::{Context, Result, bail};
use clap::Parser;
use cli::{Cli, DEFAULT_CONFIG_FILE};
use cpc_common::observability::init_logging;
use cpc_config::{AppConfig, AppConfigLoader};
use cpc_server::{AppState, configure};
use std::time::Instant;
mod cli;

#[actix_web::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1) Load config (env wins over file, flags win over both)
    let loader = match &cli.config {
        Some(path) => AppConfigLoader::new().with_file(path),
        None => AppConfigLoader::new().with_optional_file(DEFAULT_CONFIG_FILE),
    };
    let mut cfg: AppConfig = loader.load().context("loading configuration")?;
    if let Some(host) = cli.host {
        cfg.server.host = host;
    }
    if let Some(port) = cli.port {
        cfg.server.port = port;
    }

    let log_dir = init_logging(cfg.logging.to_log_config("cpc-server"))?;
    tracing::info!(log_dir = %log_dir.display(), "server.logging.ready");
    cfg.validate().context("invalid configuration")?;

    // 2) Shared clients
    let state = web::Data::new(AppState::from_config(&cfg)?);
    if cli.check_llm && !state.analyzer.llm().health_check().await? {
        bail!("LLM provider {} failed the health check", cfg.llm.model);
    }

    // 3) Serve
    let bind = (cfg.server.host.clone(), cfg.server.port);
    tracing::info!(host = %bind.0, port = bind.1, model = %cfg.llm.model, "server.start");
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap_fn(|req, srv| {
                let method = req.method().clone();
                let path = req.path().to_string();
                let started = Instant::now();
                let fut = srv.call(req);
                async move {
                    let res = fut.await?;
                    tracing::info!(
                        %method,
                        %path,
                        status = res.status().as_u16(),
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "http.server.request"
                    );
                    Ok(res)
                }
            })
            .configure(configure)
    })
    .bind(bind)
    .context("binding listener")?
    .run()
    .await?;

    tracing::info!("server.stop");
    Ok(())
}
