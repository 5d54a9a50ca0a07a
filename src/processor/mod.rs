//! The staged event pipeline.
//!
//! [`GameProcessor::handle`] walks an event through the stages of its kind.
//! At every stage trigger resolution runs first; the caller's
//! [`StageHandler`] then performs the stage's own side effects and decides
//! whether the event goes on. Termination stops the walk at any point.
//!
//! Handlers and fired skills start nested pipelines of their own, so the
//! returned future is boxed.
//!
//! ## Key Types
//!
//! - `GameProcessor`: the pipeline entry point
//! - `StageHandler`: per-stage continuation supplied by the caller

use futures::future::BoxFuture;
use futures::FutureExt;
use tracing::{debug, trace};

use crate::core::EngineResult;
use crate::events::{Event, Stage};
use crate::room::Room;
use crate::triggers;

/// Side effects of one action, run once per stage after triggers.
pub trait StageHandler: Send {
    /// Handle `stage`. Returning `Ok(false)` stops the pipeline.
    fn on_stage<'a>(
        &'a mut self,
        room: &'a mut Room,
        event: &'a mut Event,
        stage: Stage,
    ) -> BoxFuture<'a, EngineResult<bool>>;
}

/// Stateless pipeline driver.
#[derive(Clone, Copy, Debug, Default)]
pub struct GameProcessor;

impl GameProcessor {
    /// Run `event` through every stage of its kind.
    ///
    /// Errors from the handler abort the pipeline and propagate. Errors
    /// from fired skills are isolated by trigger resolution.
    pub fn handle<'a>(
        room: &'a mut Room,
        event: &'a mut Event,
        mut handler: Option<&'a mut (dyn StageHandler + 'a)>,
    ) -> BoxFuture<'a, EngineResult<()>> {
        async move {
            let kind = event.kind();
            for &stage in kind.stages() {
                if room.is_over() {
                    trace!(%kind, %stage, "Game over, pipeline abandoned");
                    break;
                }
                debug!(%kind, %stage, "Stage");

                triggers::resolve_stage(room, event, stage).await;
                if event.is_terminated() {
                    debug!(%kind, %stage, "Terminated by trigger");
                    break;
                }

                if let Some(handler) = handler.as_deref_mut() {
                    let proceed = handler.on_stage(room, event, stage).await?;
                    if !proceed || event.is_terminated() {
                        debug!(%kind, %stage, proceed, "Stopped by handler");
                        break;
                    }
                }
            }
            Ok(())
        }
        .boxed()
    }
}
