use journal_tail::{MemoryJournal, ReaderConfig, StartPosition, follow_journal};
use std::process;
use std::time::Duration;
use tokio_stream::StreamExt;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let journal = MemoryJournal::new();
    let writer = journal.writer();

    // Feed the demo store with one entry per second
    tokio::spawn(async move {
        let mut n = 0u64;
        loop {
            let message = format!("demo entry {n}");
            writer.append(&[("MESSAGE", message.as_str()), ("UNIT", "demo.service")]);
            n += 1;
            tokio::time::sleep(Duration::from_secs(1)).await;
        }
    });

    let config = ReaderConfig {
        start: StartPosition::FromTail(10),
        ..ReaderConfig::default()
    };

    match follow_journal(journal, config) {
        Ok(mut stream) => {
            println!("Following demo journal (ctrl-c to stop)");
            while let Some(entry) = stream.next().await {
                match entry {
                    Ok(entry) => println!("{}", entry.message().unwrap_or("<no message>")),
                    Err(e) => {
                        eprintln!("Error reading journal: {}", e);
                        process::exit(1);
                    }
                }
            }
        }
        Err(e) => {
            eprintln!("Error setting up journal reader: {}", e);
            process::exit(1);
        }
    }
}
