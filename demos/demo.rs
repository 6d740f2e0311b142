//! Demonstration harness: provision a mailbox, then poll it and print the
//! latest message's subject and body.
//!
//! Run with `cargo run --example demo`. Set `RUST_LOG=secmail_client=debug`
//! to watch individual request attempts.

use std::time::{Duration, Instant};

use secmail_client::{InboxReader, MailboxSession};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let session = MailboxSession::new().await?;
    println!("Provisioned mailbox: {}", session.address());
    println!("  local part: {}", session.local_part());
    println!("  domain:     {}", session.domain());

    let inbox = InboxReader::new(&session);
    println!("\nWaiting for mail (2 min max)... send something to {}", session.address());

    let start = Instant::now();
    let timeout = Duration::from_secs(120);
    loop {
        if let Some(id) = inbox.latest_message_id().await? {
            println!("\nMessage {id} arrived");
            println!("Subject: {:?}", inbox.latest_subject().await?);
            println!("Body:    {:?}", inbox.latest_body().await?);

            let mail = inbox.receive_mail().await?;
            println!("Combined: {mail:?}");
            break;
        }
        if start.elapsed() >= timeout {
            println!("\nTimeout: no messages received after 2 minutes");
            break;
        }
        tokio::time::sleep(Duration::from_secs(5)).await;
    }

    Ok(())
}
