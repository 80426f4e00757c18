//! Shared utilities for lifecycle integration tests.

#![allow(dead_code)]

use std::io::{self, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use graceful_app::lifecycle::{
    Lifecycle, LifecycleContext, ShutdownContext, ShutdownError, Shutdownable,
};
use graceful_app::observability::Reporter;

/// Cloneable in-memory sink for the lifecycle report.
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A controller with an unstyled, captured report.
pub fn lifecycle(deadline: Duration) -> (Lifecycle<SharedBuffer>, SharedBuffer) {
    let buffer = SharedBuffer::default();
    let reporter = Reporter::new(buffer.clone(), false);
    (Lifecycle::with_reporter(deadline, reporter), buffer)
}

/// How a [`Probe`] behaves when shut down.
#[derive(Clone, Copy)]
pub enum Behavior {
    Succeed,
    Fail(&'static str),
    Hang,
}

/// Capability that counts its shutdown calls and checks it runs after cancellation.
pub struct Probe {
    label: &'static str,
    behavior: Behavior,
    calls: Arc<AtomicUsize>,
    root: LifecycleContext,
}

impl Probe {
    pub fn boxed(
        label: &'static str,
        behavior: Behavior,
        root: &LifecycleContext,
        calls: &Arc<AtomicUsize>,
    ) -> Box<dyn Shutdownable> {
        Box::new(Self {
            label,
            behavior,
            calls: calls.clone(),
            root: root.clone(),
        })
    }
}

#[async_trait]
impl Shutdownable for Probe {
    fn name(&self) -> &str {
        self.label
    }

    async fn shutdown(&mut self, ctx: &ShutdownContext) -> Result<(), ShutdownError> {
        assert!(
            self.root.is_cancelled(),
            "drain must start after the lifecycle context is cancelled"
        );
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            Behavior::Succeed => Ok(()),
            Behavior::Fail(msg) => Err(ShutdownError::other(msg)),
            Behavior::Hang => {
                ctx.cancelled().await;
                Err(ctx.err().unwrap_or(ShutdownError::DeadlineExceeded))
            }
        }
    }
}

pub fn counters(n: usize) -> Vec<Arc<AtomicUsize>> {
    (0..n).map(|_| Arc::new(AtomicUsize::new(0))).collect()
}

pub fn calls(counters: &[Arc<AtomicUsize>]) -> Vec<usize> {
    counters.iter().map(|c| c.load(Ordering::SeqCst)).collect()
}
