use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use topcharts::catalog::ItunesCatalog;
use topcharts::prefs::FilePreferenceStore;
use topcharts::store::{ChartStore, LoadStatus};

#[derive(Parser)]
#[command(name = "topcharts", about = "Top albums by genre from the Apple catalog")]
struct Cli {
    /// Genre id to chart; defaults to the persisted selection, falling
    /// back to the catalog's first genre
    #[arg(long)]
    genre: Option<u64>,

    /// Storefront country code
    #[arg(long, default_value = "us")]
    storefront: String,

    /// Number of chart entries to fetch
    #[arg(long, default_value_t = 20)]
    limit: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let catalog = Arc::new(ItunesCatalog::new(cli.storefront.as_str(), cli.limit));
    let prefs = Arc::new(FilePreferenceStore::new());
    let store = ChartStore::new(catalog, prefs);

    let mut genre_status = store.genre_status();
    let mut album_status = store.album_status();

    match cli.genre {
        Some(genre_id) => store.request_album_load(genre_id),
        None => store.request_genre_load(),
    }

    loop {
        tokio::select! {
            changed = album_status.changed() => changed?,
            changed = genre_status.changed() => changed?,
        }
        if let LoadStatus::Failed { message } = &*genre_status.borrow() {
            anyhow::bail!("genre load failed: {message}");
        }
        let status = album_status.borrow().clone();
        match status {
            LoadStatus::Ready => break,
            LoadStatus::Failed { message } => anyhow::bail!("album load failed: {message}"),
            LoadStatus::Idle | LoadStatus::Loading => {}
        }
        // An empty genre list never cascades into an album load.
        if *genre_status.borrow() == LoadStatus::Ready && store.genres().borrow().is_empty() {
            break;
        }
    }

    let genres = store.genres().borrow().clone();
    if !genres.is_empty() {
        println!("Genres:");
        for genre in &genres {
            println!("  [{}] {}", genre.id, genre.title);
        }
        println!();
    }

    let items = store.album_list_items().borrow().clone();
    match store.current_genre().borrow().clone() {
        Some(genre) => println!("Top {} albums - {}:", items.len(), genre.title),
        None => println!("Top {} albums:", items.len()),
    }
    for (rank, item) in items.iter().enumerate() {
        println!("{:>3}. {} - {}", rank + 1, item.title, item.artist);
    }

    Ok(())
}
