mod app;
mod event;
mod ui;

use blogdesk::blog::{BlogCache, HttpBlogStore};
use blogdesk::browser::BlogBrowser;
use blogdesk::{config, logging};
use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "blogdesk")]
#[command(about = "A terminal browser for a JSON blog store")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/blogdesk/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Base URL of the record store (overrides config and BLOGDESK_STORE_URL)
  #[arg(short, long)]
  url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  let _guard = logging::init()?;

  let mut config = config::Config::load(args.config.as_deref())?;
  if let Some(url) = args.url {
    config.store.url = url;
  }
  info!(url = %config.store.url, "Starting blogdesk");

  let store = HttpBlogStore::new(&config.store)?;
  let cache = BlogCache::new()
    .with_stale_time(config.cache.stale_time())
    .with_gc_time(config.cache.gc_time());
  let browser = BlogBrowser::new(Arc::new(store), cache);

  let mut app = app::App::new(config, browser);
  app.run().await?;

  info!("Exiting");
  Ok(())
}
