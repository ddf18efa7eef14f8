use std::io::Write;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{info, warn};

use super::handler::{ChatHandler, Outcome};
use crate::llm::ModelProvider;
use crate::utils::terminal::Terminal;

const QUIT_COMMAND: &str = "/quit";

/// Interactive loop: one line in, one outcome out, back to idle.
pub struct Session<'a, P, W: Write> {
    handler: &'a ChatHandler<P>,
    terminal: &'a mut Terminal<W>,
}

impl<'a, P: ModelProvider, W: Write> Session<'a, P, W> {
    pub fn new(handler: &'a ChatHandler<P>, terminal: &'a mut Terminal<W>) -> Self {
        Self { handler, terminal }
    }

    /// Submit one query and render its outcome.
    pub async fn ask(&mut self, input: &str) -> Result<Outcome> {
        let spinner = self.terminal.working();
        let outcome = self.handler.submit(input).await;
        spinner.finish_and_clear();

        self.terminal
            .outcome(&outcome)
            .context("Failed to render outcome")?;
        Ok(outcome)
    }

    /// Read lines until EOF or `/quit`. Returns the number of submissions.
    pub async fn run<R>(&mut self, input: R) -> Result<usize>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut input = input;
        let mut buf = Vec::new();
        let mut submitted = 0;

        loop {
            self.terminal.prompt().context("Failed to write prompt")?;
            buf.clear();
            let read = input
                .read_until(b'\n', &mut buf)
                .await
                .context("Failed to read input")?;
            if read == 0 {
                break;
            }
            let line = decode_line(&buf);
            if line.trim() == QUIT_COMMAND {
                break;
            }
            self.ask(&line).await?;
            submitted += 1;
        }

        info!("Session ended after {} submissions", submitted);
        Ok(submitted)
    }
}

/// One input line without its terminator. Invalid UTF-8 is replaced
/// rather than ending the session.
fn decode_line(buf: &[u8]) -> String {
    let line = String::from_utf8_lossy(buf);
    if let std::borrow::Cow::Owned(_) = line {
        warn!("Input line is not valid UTF-8, replacing invalid bytes");
    }
    line.trim_end_matches(&['\n', '\r'][..]).to_string()
}
