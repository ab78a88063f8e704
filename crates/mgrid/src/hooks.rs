#![forbid(unsafe_code)]

//! Caller lifecycle hooks and their isolation.
//!
//! Hooks run synchronously inside session transitions. A hook that returns
//! an error or panics never aborts the transition: the failure is logged at
//! `warn`, recorded in the transition's [`HookReport`], and the session
//! carries on.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};

use mgrid_core::pointer::PointerEvent;
use mgrid_layout::GridItem;

use crate::error::HookError;

/// Lifecycle callbacks of a drag gesture. Every method defaults to a no-op.
pub trait DragHooks {
    /// The gesture crossed the movement threshold. Fires once per gesture.
    fn on_drag_start(&mut self, item: &GridItem) -> Result<(), HookError> {
        let _ = item;
        Ok(())
    }

    /// The dragged item followed a pointer move.
    fn on_drag(&mut self, item: &GridItem, event: &PointerEvent) -> Result<(), HookError> {
        let _ = (item, event);
        Ok(())
    }

    /// The item was dropped and committed.
    fn on_drag_end(&mut self, item: &GridItem) -> Result<(), HookError> {
        let _ = item;
        Ok(())
    }
}

/// Hooks that do nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl DragHooks for NoHooks {}

impl<H: DragHooks + ?Sized> DragHooks for Box<H> {
    fn on_drag_start(&mut self, item: &GridItem) -> Result<(), HookError> {
        (**self).on_drag_start(item)
    }

    fn on_drag(&mut self, item: &GridItem, event: &PointerEvent) -> Result<(), HookError> {
        (**self).on_drag(item, event)
    }

    fn on_drag_end(&mut self, item: &GridItem) -> Result<(), HookError> {
        (**self).on_drag_end(item)
    }
}

/// Hook failures collected during one transition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HookReport {
    pub invoked: u32,
    pub failures: Vec<HookError>,
}

impl HookReport {
    /// No hook failed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub(crate) fn merge(&mut self, other: HookReport) {
        self.invoked += other.invoked;
        self.failures.extend(other.failures);
    }
}

/// Run one hook with error and panic isolation.
pub(crate) fn invoke<F>(report: &mut HookReport, hook: &'static str, call: F)
where
    F: FnOnce() -> Result<(), HookError>,
{
    report.invoked += 1;
    let failure = match catch_unwind(AssertUnwindSafe(call)) {
        Ok(Ok(())) => return,
        Ok(Err(err)) => err,
        Err(payload) => HookError::Panicked {
            hook,
            message: panic_message(payload.as_ref()),
        },
    };
    tracing::warn!(target: "mgrid.drag", hook, error = %failure, "drag hook failed");
    report.failures.push(failure);
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_owned()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}
