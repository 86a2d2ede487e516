use crossterm::event::{Event as CrosstermEvent, EventStream, KeyEventKind};
use futures::StreamExt;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{self, Interval};

use crate::app::Event;

const TICK_INTERVAL_MS: u64 = 120;

/// Merges terminal input, app messages (fetch and geolocation outcomes), and
/// the spinner tick into a single stream of [`Event`]s.
pub struct Events {
    terminal: EventStream,
    app: mpsc::UnboundedReceiver<Event>,
    ticker: Interval,
}

impl Events {
    pub fn new(app: mpsc::UnboundedReceiver<Event>) -> Events {
        Events {
            terminal: EventStream::new(),
            app,
            ticker: time::interval(Duration::from_millis(TICK_INTERVAL_MS)),
        }
    }

    /// Next event to apply; `None` once the terminal input stream closes.
    pub async fn next(&mut self) -> Option<Event> {
        loop {
            tokio::select! {
                _ = self.ticker.tick() => return Some(Event::Tick),
                event = self.app.recv() => return event,
                event = self.terminal.next() => match event {
                    Some(Ok(CrosstermEvent::Key(key))) if key.kind == KeyEventKind::Press => {
                        return Some(Event::Key(key));
                    }
                    // Releases, resizes, and mouse noise redraw on the next tick.
                    Some(Ok(_)) => continue,
                    Some(Err(_)) | None => return None,
                },
            }
        }
    }
}
