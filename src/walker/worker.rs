//! Worker thread logic for parallel directory walking
//!
//! Each worker:
//! - Waits on either the stop signal or the work queue
//! - Runs the traversal step on each directory it receives
//! - Decrements the pending counter once per received directory
//! - Fires the stop signal if its decrement was the last one

use crate::fs::FileSystem;
use crate::walker::queue::WorkQueueReceiver;
use crate::walker::stop::StopOnPanic;
use crate::walker::traverse::{traverse, WalkContext};
use crossbeam_channel::select;
use std::sync::atomic::Ordering;
use tracing::debug;

/// Worker main loop. Returns the number of directories taken from the queue.
pub(crate) fn worker_loop<F: FileSystem>(
    id: usize,
    receiver: WorkQueueReceiver,
    ctx: WalkContext<'_, F>,
) -> u64 {
    let _guard = StopOnPanic(ctx.stop);
    let mut processed = 0u64;

    debug!("Worker {} started", id);

    loop {
        select! {
            recv(ctx.stop.receiver()) -> _ => {
                debug!("Worker {} stopping, {} directories", id, processed);
                return processed;
            }
            recv(receiver.channel()) -> msg => {
                let dir = match msg {
                    Ok(dir) => dir,
                    Err(_) => return processed,
                };
                receiver.record_dequeue();
                processed += 1;

                traverse(&dir, &ctx);

                if ctx.pending.fetch_sub(1, Ordering::SeqCst) == 1 {
                    if ctx.stop.fire() {
                        debug!("Worker {} observed last directory, stopping all workers", id);
                    }
                    return processed;
                }
            }
        }
    }
}
