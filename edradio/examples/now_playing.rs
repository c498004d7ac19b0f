//! Example: Poll every built-in station once
//!
//! Run with: cargo run -p edradio --example now_playing
//! Or for a single station: cargo run -p edradio --example now_playing -- sidewinder

use edradio::{default_stations, next_delay, scheduler::DEFAULT_MIN_REFRESH_MS};
use std::env;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let filter = env::args().nth(1);
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()?;

    let floor = Duration::from_millis(DEFAULT_MIN_REFRESH_MS);

    for station in default_stations(&client) {
        if filter.as_deref().is_some_and(|slug| slug != station.slug()) {
            continue;
        }

        println!("{} ({})", station.name(), station.slug());
        println!("  Stream: {}", station.stream_url());

        let now = edutils::now_millis();
        let song = station.fetch().await;
        match &song {
            Some(song) => {
                println!("  Now playing: {song}");
                if let Some(artwork) = song.artwork_url() {
                    println!("  Artwork: {artwork}");
                }
                match song.remaining_ms(now) {
                    Some(remaining) => {
                        println!(
                            "  Progress: {:.0}% ({}s left)",
                            song.progress_at(now) * 100.0,
                            remaining / 1000
                        );
                    }
                    None => println!("  Continuous stream"),
                }
            }
            None => println!("  No metadata available"),
        }

        match next_delay(song.as_ref(), now, floor) {
            Some(delay) => println!("  Next poll in {}s\n", delay.as_secs()),
            None => println!("  Never polled again\n"),
        }
    }

    Ok(())
}
