//! The scheduler loop.
//!
//! One task owns the [`Library`] and multiplexes three sources with
//! `tokio::select!`: a shutdown future, an interval timer that drives one
//! tick per period, and command lines from the operator. Ticks and commands
//! are therefore never concurrent. Missed ticks are delayed rather than
//! replayed in a burst.

use crate::error::SimError;
use crate::protocol::{parse_line, render, render_protocol_error};
use std::future::Future;
use std::time::Duration;
use tapelib_core::event::LibraryEvent;
use tapelib_core::executor::TickReport;
use tapelib_core::library::Library;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Counters reported when the loop stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Ticks that were not skipped.
    pub ticks: u64,
    /// Non-blank input lines.
    pub lines: u64,
    pub rejected: u64,
}

#[derive(Debug)]
pub struct Simulator {
    library: Library,
    tick_interval: Duration,
    summary: RunSummary,
}

impl Simulator {
    pub fn new(library: Library, tick_interval: Duration) -> Self {
        Self {
            library,
            tick_interval,
            summary: RunSummary::default(),
        }
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    pub fn summary(&self) -> RunSummary {
        self.summary
    }

    /// Advance the library by one tick.
    pub fn tick(&mut self) -> TickReport {
        let report = self.library.step();
        if report != TickReport::Skipped {
            self.summary.ticks += 1;
        }
        self.flush_events();
        report
    }

    /// Handle one input line, returning the response line if any.
    pub fn handle_line(&mut self, line: &str) -> Option<String> {
        let response = match parse_line(line) {
            Ok(None) => return None,
            Ok(Some(request)) => {
                let result = self.library.handle(&request);
                if result.is_err() {
                    self.summary.rejected += 1;
                }
                render(&result)
            }
            Err(err) => {
                warn!(%err, "malformed command line");
                self.summary.rejected += 1;
                render_protocol_error(&err)
            }
        };
        self.summary.lines += 1;
        self.flush_events();
        Some(response)
    }

    fn flush_events(&mut self) {
        for event in self.library.events_mut().drain() {
            match &event {
                LibraryEvent::TaskFailed { error, .. } => {
                    warn!(tick = event.tick(), %error, "task failed");
                }
                _ => debug!(tick = event.tick(), ?event, "library event"),
            }
        }
    }

    /// Run until `input` reaches end of file or `shutdown` completes.
    pub async fn run<R, W, S>(
        &mut self,
        input: R,
        mut output: W,
        shutdown: S,
    ) -> Result<RunSummary, SimError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
        S: Future<Output = ()>,
    {
        let mut lines = input.lines();
        let mut interval = tokio::time::interval(self.tick_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval.tick().await; // Skip first immediate tick
        tokio::pin!(shutdown);

        info!(
            interval_ms = self.tick_interval.as_millis() as u64,
            locations = self.library.topology().len(),
            "simulator started"
        );

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("shutdown requested");
                    break;
                }
                _ = interval.tick() => {
                    self.tick();
                }
                line = lines.next_line() => match line? {
                    Some(line) => {
                        if let Some(response) = self.handle_line(&line) {
                            output.write_all(response.as_bytes()).await?;
                            output.write_all(b"\n").await?;
                            output.flush().await?;
                        }
                    }
                    None => {
                        info!("input closed");
                        break;
                    }
                },
            }
        }

        info!(
            ticks = self.summary.ticks,
            lines = self.summary.lines,
            rejected = self.summary.rejected,
            "simulator stopped"
        );
        Ok(self.summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use tapelib_core::inventory::SlotState;
    use tapelib_core::library::LibraryConfig;
    use tokio::io::BufReader;

    fn simulator() -> Simulator {
        let library = Library::new(&LibraryConfig::default()).unwrap();
        Simulator::new(library, Duration::from_secs(1))
    }

    fn responses(output: &[u8]) -> Vec<Value> {
        String::from_utf8(output.to_vec())
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn handle_line_answers_and_counts() {
        let mut sim = simulator();
        assert_eq!(sim.handle_line("# comment"), None);

        let ok: Value = serde_json::from_str(&sim.handle_line("scan slot=s0000").unwrap()).unwrap();
        assert_eq!(ok["command"], "scan");
        assert_eq!(ok["tasks"], 2);

        let err: Value = serde_json::from_str(&sim.handle_line("scan slot=d0000").unwrap()).unwrap();
        assert_eq!(err["error"]["reason"], "notspecified");

        let err: Value = serde_json::from_str(&sim.handle_line("scan s0000").unwrap()).unwrap();
        assert_eq!(err["error"]["reason"], "malformed");

        assert_eq!(
            sim.summary(),
            RunSummary {
                ticks: 0,
                lines: 3,
                rejected: 2
            }
        );
    }

    #[test]
    fn tick_drains_event_log() {
        let mut sim = simulator();
        sim.handle_line("scan slot=s0000");
        assert!(sim.library().events().is_empty());
        sim.tick();
        assert!(sim.library().events().is_empty());
        assert_eq!(sim.summary().ticks, 1);
    }

    #[tokio::test]
    async fn run_stops_at_end_of_input() {
        let mut sim = simulator();
        let input: &[u8] = b"state\nlock\nload slot=s0000 drive=d0100\n\ninfo\n";
        let mut output = Vec::new();
        let summary = sim
            .run(input, &mut output, std::future::pending())
            .await
            .unwrap();

        let answers = responses(&output);
        assert_eq!(answers.len(), 4);
        assert_eq!(answers[0], serde_json::json!({"locked": false, "busy": false}));
        assert_eq!(answers[1], serde_json::json!({"locked": true}));
        assert_eq!(answers[2]["error"]["type"], "lock");
        assert!(answers[3]["info"].as_str().unwrap().starts_with("Running=False"));
        assert_eq!(summary.lines, 4);
        assert_eq!(summary.rejected, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn run_ticks_on_the_interval() {
        let mut sim = simulator();
        let (mut client, server) = tokio::io::duplex(1024);
        client
            .write_all(b"load slot=s0000 drive=d0100\n")
            .await
            .unwrap();

        let mut output = Vec::new();
        let shutdown = tokio::time::sleep(Duration::from_secs(60));
        let summary = sim
            .run(BufReader::new(server), &mut output, shutdown)
            .await
            .unwrap();
        drop(client);

        assert!(summary.ticks >= 50, "{summary:?}");
        assert_eq!(responses(&output)[0]["tasks"], 4);
        let library = sim.library();
        assert!(!library.is_busy());
        assert_eq!(library.inventory().by_name("s0000"), Some(&SlotState::Empty));
        assert!(matches!(
            library.inventory().by_name("d0100"),
            Some(SlotState::Occupied(_))
        ));
    }
}
