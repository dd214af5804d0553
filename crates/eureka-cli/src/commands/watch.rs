//! Watch command: live tracking until the user quits.

use std::future::Future;
use std::io::Write;

use anyhow::Result;
use eureka_core::{EventClassifier, SessionCounters};
use eureka_feed::{Connector, FeedUpdate, StreamClient};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::Config;
use crate::session::Session;

/// Interactive commands read from the input stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Reset,
    Stats,
    Pause,
    Quit,
}

impl Command {
    fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "r" | "reset" => Some(Self::Reset),
            "s" | "stats" => Some(Self::Stats),
            "p" | "pause" => Some(Self::Pause),
            "q" | "quit" => Some(Self::Quit),
            _ => None,
        }
    }
}

fn render<W: Write>(writer: &mut W, session: &mut Session, update: &FeedUpdate) -> Result<()> {
    for line in session.apply(update) {
        writeln!(writer, "{line}")?;
    }
    Ok(())
}

/// Tracks until `input` says quit, reaches EOF, or `shutdown` resolves.
///
/// `p` stops the client and a second `p` starts it again; the session
/// counters carry over. The client is stopped before returning and every
/// update it produced is rendered, followed by the final summary.
pub async fn run<W, R, F>(
    writer: &mut W,
    config: &Config,
    connector: impl Connector,
    input: R,
    shutdown: F,
) -> Result<SessionCounters>
where
    W: Write,
    R: AsyncBufRead + Unpin,
    F: Future<Output = ()>,
{
    let classifier = EventClassifier::new(config.tracking.clone());
    let mut client = StreamClient::new(config.stream.clone(), classifier, connector);
    let mut session = Session::new(config.tracking.clone()).with_color(config.display.color);

    let (tx, mut rx) = mpsc::unbounded_channel();
    client.start(tx.clone());
    info!(url = %config.stream.url, "tracking started");

    writeln!(writer, "Commands: r(eset), s(tats), p(ause/resume), q(uit)")?;

    let mut lines = input.lines();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;

            Some(update) = rx.recv() => render(writer, &mut session, &update)?,
            line = lines.next_line() => {
                let Some(line) = line? else {
                    debug!("input closed");
                    break;
                };
                match Command::parse(&line) {
                    Some(Command::Reset) => {
                        session.reset();
                        writeln!(writer, "Counters reset")?;
                    }
                    Some(Command::Stats) => writeln!(writer, "{}", session.render_summary())?,
                    Some(Command::Pause) if client.is_running() => {
                        client.stop().await;
                        // Nothing more arrives once stop returns.
                        while let Ok(update) = rx.try_recv() {
                            render(writer, &mut session, &update)?;
                        }
                        info!("tracking paused");
                        writeln!(writer, "Tracking paused, p to resume")?;
                    }
                    Some(Command::Pause) => {
                        client.start(tx.clone());
                        info!("tracking resumed");
                        writeln!(writer, "Tracking resumed")?;
                    }
                    Some(Command::Quit) => break,
                    None if line.trim().is_empty() => {}
                    None => writeln!(writer, "Unknown command {:?}", line.trim())?,
                }
            }
            () = &mut shutdown => {
                debug!("shutdown requested");
                break;
            }
        }
    }

    client.stop().await;
    drop(client);
    drop(tx);
    while let Some(update) = rx.recv().await {
        render(writer, &mut session, &update)?;
    }

    writeln!(writer)?;
    writeln!(writer, "{}", session.render_summary())?;
    writer.flush()?;

    let counters = session.snapshot();
    info!(?counters, "tracking finished");
    Ok(counters)
}
