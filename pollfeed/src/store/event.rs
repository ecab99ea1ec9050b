//! Events emitted when the store's observable outputs change.

use std::sync::Arc;

use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};
use tracing::warn;

use crate::cell::CellViewModel;
use crate::model::User;

use super::state::DisplayState;

/// Changes to the store's outputs.
///
/// Published synchronously by the operation that caused them.
#[derive(Debug, Clone)]
pub enum Event {
    /// The display state moved. Never emitted with `old == new`.
    StateChanged { old: DisplayState, new: DisplayState },
    /// Cells were rebuilt. Emitted on every rebuild, even if nothing changed.
    CellsChanged(Arc<Vec<CellViewModel>>),
    /// The voter identity changed.
    CurrentUserChanged(Option<User>),
}

impl Event {
    /// Short name of the output this event concerns.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::StateChanged { .. } => "state",
            Event::CellsChanged(_) => "cells",
            Event::CurrentUserChanged(_) => "current_user",
        }
    }
}

/// A live feed of [`Event`]s. Dropping it (or calling [`cancel`]) ends the
/// subscription.
///
/// [`cancel`]: Subscription::cancel
#[derive(Debug)]
pub struct Subscription {
    rx: broadcast::Receiver<Event>,
}

impl Subscription {
    pub(crate) fn new(rx: broadcast::Receiver<Event>) -> Self {
        Self { rx }
    }

    /// Wait for the next event. Returns `None` once the store is gone.
    ///
    /// If this subscriber fell behind, the missed events are skipped.
    pub async fn recv(&mut self) -> Option<Event> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(n)) => warn!("Subscriber lagged, skipped {} events", n),
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Next already-published event, if any.
    pub fn try_recv(&mut self) -> Option<Event> {
        loop {
            match self.rx.try_recv() {
                Ok(event) => return Some(event),
                Err(TryRecvError::Lagged(n)) => warn!("Subscriber lagged, skipped {} events", n),
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }

    /// Drain everything published so far.
    pub fn drain(&mut self) -> Vec<Event> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }

    pub fn cancel(self) {}

    /// Adapt into a `Stream`, dropping lag notifications.
    pub fn into_stream(self) -> impl Stream<Item = Event> {
        BroadcastStream::new(self.rx).filter_map(|event| event.ok())
    }
}
