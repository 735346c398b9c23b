//! Cache/restart adapter for single-pass streams.

use std::sync::Arc;

use common_display::TreeNode;
use common_error::RankleResult;

use rankle_core::{Record, Schema};

use crate::executor::EvalContext;

use super::{LazyExpr, RecordStream};

/// Stream plus a materialized replay buffer.
///
/// Records every record pulled from the inner stream into an append-only
/// buffer. While the cursor is inside the buffer, `next()` replays cached
/// records; past the end it pulls the inner stream live (appending as it
/// goes). [`ReplayExec::restart`] moves the cursor back to the start, so
/// the stream can be scanned any number of times even though the inner
/// source is single-pass. The nested-loop join uses this for its right
/// side: one live pass over the source, then pure buffer replays.
#[derive(Debug)]
pub struct ReplayExec {
    inner: LazyExpr,
    buffer: Vec<Record>,
    cursor: usize,
    inner_exhausted: bool,
}

impl ReplayExec {
    /// Wrap a single-pass stream.
    pub fn new(inner: LazyExpr) -> Self {
        Self {
            inner,
            buffer: Vec::new(),
            cursor: 0,
            inner_exhausted: false,
        }
    }

    /// Replay from the start of the buffer.
    pub fn restart(&mut self) {
        self.cursor = 0;
    }

    /// Number of records buffered so far.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }
}

impl TreeNode for ReplayExec {
    fn node_name(&self) -> &str {
        "Replay"
    }

    fn node_children(&self) -> Vec<&dyn TreeNode> {
        vec![&*self.inner]
    }

    fn node_details(&self) -> Option<String> {
        Some(format!("{} buffered", self.buffer.len()))
    }
}

impl RecordStream for ReplayExec {
    fn name(&self) -> &'static str {
        "Replay"
    }

    fn schema(&self) -> &Arc<Schema> {
        self.inner.schema()
    }

    fn next(&mut self, ctx: &EvalContext) -> RankleResult<Option<Record>> {
        if self.cursor < self.buffer.len() {
            let record = self.buffer[self.cursor].clone();
            self.cursor += 1;
            return Ok(Some(record));
        }
        if self.inner_exhausted {
            return Ok(None);
        }
        match self.inner.next(ctx)? {
            Some(record) => {
                self.buffer.push(record.clone());
                self.cursor += 1;
                Ok(Some(record))
            }
            None => {
                self.inner_exhausted = true;
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operators::TableScan;
    use rankle_core::testing::edge_table;

    #[test]
    fn test_replay_restarts() {
        let table = edge_table(&[(1, 2, 0.9), (2, 3, 0.8)]);
        let mut replay = ReplayExec::new(Box::new(TableScan::new(&table)));
        let ctx = EvalContext::new();

        let mut first_pass = Vec::new();
        while let Some(record) = replay.next(&ctx).unwrap() {
            first_pass.push(record);
        }
        assert_eq!(first_pass.len(), 2);
        assert_eq!(replay.buffered(), 2);

        replay.restart();
        let mut second_pass = Vec::new();
        while let Some(record) = replay.next(&ctx).unwrap() {
            second_pass.push(record);
        }
        assert_eq!(first_pass, second_pass);
    }

    #[test]
    fn test_restart_midway_replays_buffer_then_pulls_live() {
        let table = edge_table(&[(1, 2, 0.9), (2, 3, 0.8), (3, 4, 0.7)]);
        let mut replay = ReplayExec::new(Box::new(TableScan::new(&table)));
        let ctx = EvalContext::new();

        // Pull one record live, then restart
        let first = replay.next(&ctx).unwrap().unwrap();
        replay.restart();

        let replayed = replay.next(&ctx).unwrap().unwrap();
        assert_eq!(first, replayed);

        // Continue to the end: buffer + remaining live pulls
        let mut rest = 0;
        while replay.next(&ctx).unwrap().is_some() {
            rest += 1;
        }
        assert_eq!(rest, 2);
        assert_eq!(replay.buffered(), 3);

        // Full replay sees all three in original order
        replay.restart();
        let mut total = 0;
        while replay.next(&ctx).unwrap().is_some() {
            total += 1;
        }
        assert_eq!(total, 3);
    }
}
