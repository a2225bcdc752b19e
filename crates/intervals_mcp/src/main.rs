use std::sync::Arc;

use intervals_api::config::Config;
use intervals_api::http_client::ReqwestIntervalsClient;
use intervals_mcp::IntervalsMcpHandler;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Logging from `RUST_LOG` when set, otherwise the configured level.
    // Per-target overrides keep rmcp internals quiet by default.
    let log_env =
        std::env::var("RUST_LOG").unwrap_or_else(|_| config.log.level.to_lowercase());
    let combined_filter = format!("{},rmcp=warn,serve_inner=warn", log_env);
    let env_filter = tracing_subscriber::EnvFilter::try_new(combined_filter)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,rmcp=warn,serve_inner=warn"));
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_env_filter(env_filter)
        .init();
    tracing::info!("intervals_mcp: log filter: {}", log_env);

    let client = ReqwestIntervalsClient::from_config(&config);
    let handler = IntervalsMcpHandler::new(Arc::new(client));
    tracing::info!("intervals_mcp: registered {} tools", handler.tool_count());

    // Stdio transport so the server is immediately usable with MCP clients.
    tracing::info!("intervals_mcp: starting stdio MCP server...");
    let transport = (tokio::io::stdin(), tokio::io::stdout());
    let server = rmcp::serve_server(handler, transport).await?;
    tracing::info!("intervals_mcp: service initialized as server");

    server.waiting().await?;

    Ok(())
}
