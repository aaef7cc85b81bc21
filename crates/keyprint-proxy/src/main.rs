use anyhow::Result;
use clap::Parser;
use keyprint_proxy::{UreqUpstream, serve};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "keyprint-proxy", about = "Image proxy for the print kiosk", version)]
struct Cli {
    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    host: IpAddr,

    /// Port to listen on
    #[arg(short, long, default_value = "8787")]
    port: u16,

    /// Upstream request timeout in seconds
    #[arg(long, default_value = "20")]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let upstream = Arc::new(UreqUpstream::new(Duration::from_secs(cli.timeout_secs)));
    serve(SocketAddr::new(cli.host, cli.port), upstream).await?;
    Ok(())
}
