//! Event feeds delivering decoded logs in canonical chain order.

use crate::domain::LoggedEvent;
use futures::stream::{self, BoxStream, StreamExt};
use std::path::PathBuf;
use thiserror::Error;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("feed I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
}

/// Source of events for the indexer loop.
pub trait EventFeed: Send {
    fn events(&mut self) -> BoxStream<'_, Result<LoggedEvent, FeedError>>;
}

/// Events held in memory.
#[derive(Debug, Clone, Default)]
pub struct VecFeed {
    events: Vec<LoggedEvent>,
}

impl VecFeed {
    pub fn new(events: Vec<LoggedEvent>) -> Self {
        Self { events }
    }
}

impl EventFeed for VecFeed {
    fn events(&mut self) -> BoxStream<'_, Result<LoggedEvent, FeedError>> {
        stream::iter(self.events.clone().into_iter().map(Ok)).boxed()
    }
}

/// One JSON-encoded [`LoggedEvent`] per line. Blank lines are ignored.
#[derive(Debug, Clone)]
pub struct JsonLinesFeed {
    path: PathBuf,
}

impl JsonLinesFeed {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

struct LineState {
    lines: Option<tokio::io::Lines<BufReader<File>>>,
    path: PathBuf,
    line: usize,
    done: bool,
}

impl EventFeed for JsonLinesFeed {
    fn events(&mut self) -> BoxStream<'_, Result<LoggedEvent, FeedError>> {
        let state = LineState {
            lines: None,
            path: self.path.clone(),
            line: 0,
            done: false,
        };

        stream::unfold(state, |mut state| async move {
            if state.done {
                return None;
            }
            if state.lines.is_none() {
                match File::open(&state.path).await {
                    Ok(file) => state.lines = Some(BufReader::new(file).lines()),
                    Err(e) => {
                        state.done = true;
                        return Some((Err(FeedError::Io(e)), state));
                    }
                }
            }
            let lines = state.lines.as_mut()?;

            loop {
                match lines.next_line().await {
                    Ok(Some(text)) => {
                        state.line += 1;
                        if text.trim().is_empty() {
                            continue;
                        }
                        let parsed = serde_json::from_str::<LoggedEvent>(&text).map_err(|e| {
                            FeedError::Parse {
                                line: state.line,
                                message: e.to_string(),
                            }
                        });
                        return Some((parsed, state));
                    }
                    Ok(None) => return None,
                    Err(e) => {
                        state.done = true;
                        return Some((Err(FeedError::Io(e)), state));
                    }
                }
            }
        })
        .boxed()
    }
}
