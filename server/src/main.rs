use anyhow::Result;
use axum::Router;
use clap::Parser;
use lyric_core::ingest::DEFAULT_TEXT_FIELD;
use lyric_core::{IngestOptions, SourceFormat};
use lyric_server::{build_app, CorpusConfig};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};
use tokio::net::TcpListener;

#[derive(Parser)]
struct Args {
    /// Corpus path, indexed in memory at startup
    #[arg(long, env = "LYRIC_CORPUS")]
    corpus: PathBuf,
    /// Input format (lines|csv); guessed from the extension when omitted
    #[arg(long)]
    format: Option<SourceFormat>,
    /// CSV column holding the document text
    #[arg(long, default_value = DEFAULT_TEXT_FIELD)]
    text_field: String,
    /// Drop the first token of every document
    #[arg(long, default_value_t = false)]
    strip_leading_token: bool,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let corpus = CorpusConfig {
        path: args.corpus,
        format: args.format,
        text_field: args.text_field,
        options: IngestOptions { strip_leading_token: args.strip_leading_token },
    };
    let app: Router = build_app(&corpus)?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
