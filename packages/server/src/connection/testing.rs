//! In-process transport for exercising the connection loops.

use std::{
    pin::Pin,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    task::{Context, Poll},
    time::Duration,
};

use axum::extract::ws::Message;
use futures_util::{Sink, Stream};
use tokio::sync::mpsc;

/// Server side of the fake transport
pub struct TestSocket {
    incoming: mpsc::UnboundedReceiver<Result<Message, String>>,
    outgoing: mpsc::UnboundedSender<Message>,
    stalled: Arc<AtomicBool>,
}

/// Client side: feeds frames in and observes frames written out
pub struct TestSocketHandle {
    incoming: mpsc::UnboundedSender<Result<Message, String>>,
    outgoing: mpsc::UnboundedReceiver<Message>,
    stalled: Arc<AtomicBool>,
}

impl TestSocket {
    pub fn pair() -> (TestSocket, TestSocketHandle) {
        let (in_tx, in_rx) = mpsc::unbounded_channel();
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let stalled = Arc::new(AtomicBool::new(false));
        (
            TestSocket {
                incoming: in_rx,
                outgoing: out_tx,
                stalled: stalled.clone(),
            },
            TestSocketHandle {
                incoming: in_tx,
                outgoing: out_rx,
                stalled,
            },
        )
    }
}

impl Stream for TestSocket {
    type Item = Result<Message, String>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().incoming.poll_recv(cx)
    }
}

impl Sink<Message> for TestSocket {
    type Error = String;

    fn poll_ready(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        // A stalled peer never becomes writable again
        if self.stalled.load(Ordering::SeqCst) {
            return Poll::Pending;
        }
        Poll::Ready(Ok(()))
    }

    fn start_send(self: Pin<&mut Self>, item: Message) -> Result<(), Self::Error> {
        self.outgoing.send(item).map_err(|e| e.to_string())
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn poll_close(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }
}

impl TestSocketHandle {
    pub fn send(&self, message: Message) {
        let _ = self.incoming.send(Ok(message));
    }

    pub fn send_text(&self, text: String) {
        self.send(Message::Text(text.into()));
    }

    /// Make the next read fail like a reset connection
    pub fn fail(&self, reason: &str) {
        let _ = self.incoming.send(Err(reason.to_string()));
    }

    /// Stop accepting writes, as a peer that stopped reading would
    pub fn stall(&self) {
        self.stalled.store(true, Ordering::SeqCst);
    }

    pub async fn next_frame(&mut self) -> Message {
        tokio::time::timeout(Duration::from_secs(5), self.outgoing.recv())
            .await
            .expect("timed out waiting for a frame")
            .expect("transport closed")
    }

    /// Next frame written, waiting as long as it takes; `None` once the server side is gone
    pub async fn recv_frame(&mut self) -> Option<Message> {
        self.outgoing.recv().await
    }

    /// Next frame written, skipping liveness probes
    pub fn try_next_frame(&mut self) -> Option<Message> {
        loop {
            match self.outgoing.try_recv() {
                Ok(Message::Ping(_)) => continue,
                Ok(message) => return Some(message),
                Err(_) => return None,
            }
        }
    }

    /// Next frame written, probes included
    pub fn try_next_raw(&mut self) -> Option<Message> {
        self.outgoing.try_recv().ok()
    }
}
