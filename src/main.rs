use clap::Parser;
use snippet_exec::{
    AnonymousSession, ExecutionService, HttpSubmissionStore, ServiceConfig, SubmissionRecorder,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server address to listen on
    #[arg(short, long, default_value = "0.0.0.0:3000")]
    addr: SocketAddr,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut service = ExecutionService::new(ServiceConfig::default())?;

    // Submission recording is optional; without a configured store the
    // service still executes, it just keeps nothing.
    if let (Ok(url), Ok(key)) = (
        std::env::var("SUBMISSION_STORE_URL"),
        std::env::var("SUBMISSION_STORE_KEY"),
    ) {
        let store = HttpSubmissionStore::new(reqwest::Client::new(), url, key);
        let recorder = SubmissionRecorder::new(Arc::new(AnonymousSession), Arc::new(store));
        service = service.with_recorder(Arc::new(recorder));
    }

    snippet_exec::serve(Arc::new(service), args.addr).await?;
    Ok(())
}
