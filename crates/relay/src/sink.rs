use engine::{EventSink, SinkError};
use tokio::sync::mpsc::{self, Receiver, Sender, error::TrySendError};

/// Upper bound on queued events; larger configured capacities are lowered.
pub(crate) const MAX_QUEUE_CAPACITY: usize = 1 << 20;

/// Event sink backed by a bounded queue.
///
/// Writing never blocks: a full or closed queue is reported as a [`SinkError`]
/// and the event is dropped.
#[derive(Clone, Debug)]
pub struct ChannelSink {
    sender: Sender<Vec<u8>>,
}

/// Create a sink together with the receiving end of its queue.
///
/// `capacity` is clamped to `1..=MAX_QUEUE_CAPACITY`.
pub fn channel(capacity: usize) -> (ChannelSink, Receiver<Vec<u8>>) {
    let bounded = capacity.clamp(1, MAX_QUEUE_CAPACITY);
    if bounded != capacity {
        tracing::warn!("event queue capacity {capacity} clamped to {bounded}");
    }
    let (sender, receiver) = mpsc::channel(bounded);
    (ChannelSink { sender }, receiver)
}

impl EventSink for ChannelSink {
    fn write(&self, data: &[u8]) -> Result<(), SinkError> {
        self.sender.try_send(data.to_vec()).map_err(|err| match err {
            TrySendError::Full(_) => SinkError("event queue is full".to_string()),
            TrySendError::Closed(_) => SinkError("event relay has stopped".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_queue_rejects_without_blocking() {
        let (sink, mut receiver) = channel(1);

        sink.write(b"one").unwrap();
        let err = sink.write(b"two").unwrap_err();
        assert_eq!(err.0, "event queue is full");

        assert_eq!(receiver.try_recv().unwrap(), b"one".to_vec());
        sink.write(b"three").unwrap();
    }

    #[test]
    fn closed_queue_is_an_error() {
        let (sink, receiver) = channel(4);
        drop(receiver);

        let err = sink.write(b"lost").unwrap_err();
        assert_eq!(err.0, "event relay has stopped");
    }

    #[test]
    fn zero_capacity_still_queues_one_event() {
        let (sink, mut receiver) = channel(0);
        sink.write(b"only").unwrap();
        assert_eq!(receiver.try_recv().unwrap(), b"only".to_vec());
    }

    #[test]
    fn huge_capacity_is_clamped() {
        let (sink, mut receiver) = channel(usize::MAX);
        sink.write(b"event").unwrap();
        assert_eq!(receiver.try_recv().unwrap(), b"event".to_vec());
        assert_eq!(receiver.max_capacity(), MAX_QUEUE_CAPACITY);
    }
}
