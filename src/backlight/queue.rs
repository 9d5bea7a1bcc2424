//! Bounded hand-off of brightness commands to the backlight worker.
//!
//! Uses an `embassy-sync` bounded MPMC channel shared through an `Arc`.
//! Producers never block: when the queue is full the incoming command is
//! dropped and counted (drop-newest).  Older queued values are not
//! replaced, so up to [`QUEUE_DEPTH`] stale settings may still be applied
//! ahead of the newest accepted one.
//!
//! Shutdown order: [`BrightnessSender::close`] first refuses new
//! commands, then queues a terminal [`BacklightCommand::Shutdown`] behind
//! whatever is pending.  The worker returns when it dequeues it and never
//! waits on the channel again.  `close` itself never waits: on a full
//! queue it evicts the oldest pending command (counted as dropped) to make
//! room.  The closed check and the enqueue share one critical section
//! with `close`, so nothing can land behind `Shutdown`.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use futures_lite::future::block_on;
use log::{debug, info};

/// Channel depth for brightness commands.
pub const QUEUE_DEPTH: usize = 4;

/// Message consumed by the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BacklightCommand {
    /// Target brightness, 0..=100 (already clamped).
    Brightness(u8),
    /// Force the IC to standby and re-apply the last brightness.
    Resync,
    /// Terminal message; the worker exits after it.
    Shutdown,
}

/// Shared state behind every sender and the receiver.
pub struct BrightnessCommandQueue {
    channel: Channel<CriticalSectionRawMutex, BacklightCommand, QUEUE_DEPTH>,
    closed: AtomicBool,
    dropped: AtomicU32,
}

impl BrightnessCommandQueue {
    /// Create the queue and return its two ends.
    pub fn split() -> (BrightnessSender, BrightnessReceiver) {
        let queue = Arc::new(Self {
            channel: Channel::new(),
            closed: AtomicBool::new(false),
            dropped: AtomicU32::new(0),
        });
        (
            BrightnessSender {
                queue: Arc::clone(&queue),
            },
            BrightnessReceiver { queue },
        )
    }

    fn offer(&self, command: BacklightCommand) -> bool {
        let sent = critical_section::with(|_| {
            if self.closed.load(Ordering::Acquire) {
                return None;
            }
            Some(self.channel.try_send(command).is_ok())
        });
        match sent {
            None => {
                debug!("backlight: queue closed, {:?} ignored", command);
                false
            }
            Some(true) => true,
            Some(false) => {
                let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                debug!("backlight: queue full, {:?} dropped (total {})", command, dropped);
                false
            }
        }
    }

    /// Flip to closed and queue the terminal message, evicting the oldest
    /// pending command if there is no room.  `None` if already closed;
    /// otherwise the evicted command, if any.
    fn seal(&self) -> Option<Option<BacklightCommand>> {
        critical_section::with(|_| {
            if self.closed.swap(true, Ordering::AcqRel) {
                return None;
            }
            let mut evicted = None;
            while self.channel.try_send(BacklightCommand::Shutdown).is_err() {
                // Only the worker can race us here, and it only removes.
                if let Ok(oldest) = self.channel.try_receive() {
                    evicted = Some(oldest);
                }
            }
            Some(evicted)
        })
    }
}

/// Producer handle.  Cheap to clone; safe to use from any thread.
#[derive(Clone)]
pub struct BrightnessSender {
    queue: Arc<BrightnessCommandQueue>,
}

impl BrightnessSender {
    /// Best-effort request for a new brightness (clamped to 0..=100).
    ///
    /// Never blocks and never reports failure; a full queue drops the
    /// request.
    pub fn set_brightness(&self, percent: u8) {
        self.queue
            .offer(BacklightCommand::Brightness(percent.min(100)));
    }

    /// Best-effort request to re-synchronise the IC with the tracked step.
    pub fn request_resync(&self) {
        self.queue.offer(BacklightCommand::Resync);
    }

    /// Stop accepting commands and release the worker.
    ///
    /// Never blocks, whether or not a worker is draining.  Calling it again
    /// is a no-op.
    pub fn close(&self) {
        let Some(evicted) = self.queue.seal() else {
            return;
        };
        if let Some(oldest) = evicted {
            let dropped = self.queue.dropped.fetch_add(1, Ordering::Relaxed) + 1;
            debug!("backlight: {:?} evicted for shutdown (total {})", oldest, dropped);
        }
        info!("backlight: queue closed");
    }

    pub fn is_closed(&self) -> bool {
        self.queue.closed.load(Ordering::Acquire)
    }

    /// Commands discarded because the queue was full.
    pub fn dropped(&self) -> u32 {
        self.queue.dropped.load(Ordering::Relaxed)
    }

    /// Commands waiting for the worker.
    pub fn pending(&self) -> usize {
        self.queue.channel.len()
    }
}

/// Consumer handle, owned by the worker.
pub struct BrightnessReceiver {
    queue: Arc<BrightnessCommandQueue>,
}

impl BrightnessReceiver {
    /// Wait, without a timeout, for the next command.
    pub fn recv(&self) -> BacklightCommand {
        block_on(self.queue.channel.receive())
    }

    pub fn try_recv(&self) -> Option<BacklightCommand> {
        self.queue.channel.try_receive().ok()
    }
}
