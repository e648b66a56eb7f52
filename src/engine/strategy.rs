// src/engine/strategy.rs

//! The collaborator-supplied half of an engine.
//!
//! An engine does not know what an event means or where results go. Whoever
//! instantiates it provides an [`EventStrategy`]: either a type implementing
//! the trait, or three pieces glued together with [`FnStrategy`].

use crate::errors::ProcessError;
use crate::event::Event;
use crate::host::{CancelToken, FamilyTag};

/// Processing and flush hooks for one engine.
///
/// Both hooks only ever run on the worker, one call at a time.
pub trait EventStrategy<P>: Send + 'static {
    /// Handle one event, typically by accumulating results for the next flush.
    ///
    /// Return `ProcessError::Recoverable` to have the failure recorded while
    /// the pass moves on to the next event.
    fn process_event(&mut self, event: Event<P>, token: &CancelToken) -> Result<(), ProcessError>;

    /// Flush accumulated results downstream; report whether anything went out.
    ///
    /// Errors abort the current pass.
    fn dispatch_events(&mut self, token: &CancelToken) -> anyhow::Result<bool>;

    /// Grouping token used by the host scheduler.
    fn family_tag(&self) -> FamilyTag;
}

/// [`EventStrategy`] assembled from two closures and a family tag.
pub struct FnStrategy<Proc, Disp> {
    family: FamilyTag,
    process: Proc,
    dispatch: Disp,
}

impl<Proc, Disp> FnStrategy<Proc, Disp> {
    pub fn new<P>(family: FamilyTag, process: Proc, dispatch: Disp) -> Self
    where
        Proc: FnMut(Event<P>, &CancelToken) -> Result<(), ProcessError> + Send + 'static,
        Disp: FnMut(&CancelToken) -> anyhow::Result<bool> + Send + 'static,
    {
        Self {
            family,
            process,
            dispatch,
        }
    }
}

impl<P, Proc, Disp> EventStrategy<P> for FnStrategy<Proc, Disp>
where
    Proc: FnMut(Event<P>, &CancelToken) -> Result<(), ProcessError> + Send + 'static,
    Disp: FnMut(&CancelToken) -> anyhow::Result<bool> + Send + 'static,
{
    fn process_event(&mut self, event: Event<P>, token: &CancelToken) -> Result<(), ProcessError> {
        (self.process)(event, token)
    }

    fn dispatch_events(&mut self, token: &CancelToken) -> anyhow::Result<bool> {
        (self.dispatch)(token)
    }

    fn family_tag(&self) -> FamilyTag {
        self.family.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::Failure;

    #[test]
    fn closures_are_forwarded() {
        let mut seen = Vec::new();
        let mut strategy = FnStrategy::new(
            FamilyTag::new("fn"),
            |event: Event<u8>, _token: &CancelToken| {
                if event.kind() == 2 {
                    return Err(Failure::new("bad kind").into());
                }
                Ok(())
            },
            |_token: &CancelToken| Ok(true),
        );

        let strategy: &mut dyn EventStrategy<u8> = &mut strategy;
        let token = CancelToken::new();
        for k in 1..=3 {
            seen.push(strategy.process_event(Event::new(k), &token).is_ok());
        }

        assert_eq!(seen, vec![true, false, true]);
        assert!(strategy.dispatch_events(&token).unwrap());
        assert_eq!(strategy.family_tag(), FamilyTag::new("fn"));
    }
}
