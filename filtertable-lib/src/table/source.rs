//! Row sources a table can display.

use futures::StreamExt;
use futures::stream::BoxStream;
use tokio::task::JoinHandle;

use super::row::TableRow;
use super::view::TableView;

/// Where a table's rows come from.
pub enum DataSource<R> {
    /// A fixed collection. The table may page through it on its own.
    Static(Vec<R>),
    /// A stream of row collections, each replacing the previous one. Every
    /// item already is the current page; the total is supplied externally.
    Stream(BoxStream<'static, Vec<R>>),
}

impl<R> DataSource<R> {
    /// Returns `true` for a stream source.
    pub fn is_stream(&self) -> bool {
        matches!(self, Self::Stream(_))
    }
}

impl<R> From<Vec<R>> for DataSource<R> {
    fn from(rows: Vec<R>) -> Self {
        Self::Static(rows)
    }
}

impl<R> std::fmt::Debug for DataSource<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Static(rows) => f.debug_tuple("Static").field(&rows.len()).finish(),
            Self::Stream(_) => f.write_str("Stream"),
        }
    }
}

/// Task forwarding a stream source into a view. Aborted on drop.
#[derive(Debug)]
pub(crate) struct StreamTask(JoinHandle<()>);

impl StreamTask {
    /// Spawn the forwarding task on the current tokio runtime.
    pub(crate) fn spawn<R: TableRow>(
        mut stream: BoxStream<'static, Vec<R>>,
        view: TableView<R>,
    ) -> Self {
        Self(tokio::spawn(async move {
            while let Some(rows) = stream.next().await {
                let diff = view.replace_rows(rows);
                log::trace!(
                    "Stream source pushed rows: {} inserted, {} removed",
                    diff.inserted.len(),
                    diff.removed.len()
                );
            }
            log::debug!("Stream source ended");
        }))
    }
}

impl Drop for StreamTask {
    fn drop(&mut self) {
        self.0.abort();
    }
}
