//! Middleware Chain Composer.
//!
//! Decorates a previously registered [`MiddlewareChain`] with the entries of
//! a [`MiddlewareFragment`]. The previous chain is taken by value and the
//! decorated chain returned, so a caller that still holds a clone of the
//! original sees it unchanged.
//!
//! Registrations gated on a facility are checked first; an unavailable
//! facility is logged and the registration skipped, never a startup failure.

use tracing::{debug, instrument};

use crate::{
    application::ports::FacilityCheck,
    domain::{MiddlewareChain, MiddlewareFragment, Placement},
};

pub struct MiddlewareComposer {
    facilities: Box<dyn FacilityCheck>,
}

impl MiddlewareComposer {
    pub fn new(facilities: Box<dyn FacilityCheck>) -> Self {
        Self { facilities }
    }

    /// Apply `fragment` on top of `previous` (an empty chain when `None`).
    #[instrument(skip_all, fields(registrations = fragment.registrations().len()))]
    pub fn decorate(
        &self,
        previous: Option<MiddlewareChain>,
        fragment: &MiddlewareFragment,
    ) -> MiddlewareChain {
        let mut chain = previous.unwrap_or_default();

        for registration in fragment.registrations() {
            if let Some(facility) = &registration.requires {
                let id = registration.id.as_str();
                if let Err(unavailable) = self.facilities.require(id, facility) {
                    debug!(%unavailable, "Optional middleware not registered");
                    continue;
                }
            }

            match registration.placement {
                Placement::PreRouter => chain.add_pre_router(registration.id.clone()),
                Placement::PostRouter { priority } => {
                    chain.add_post_router(registration.id.clone(), priority)
                }
            }
        }

        debug!(entries = chain.len(), "Middleware chain decorated");
        chain
    }

    /// Decorate an empty chain with each fragment in turn.
    pub fn compose<'f>(
        &self,
        fragments: impl IntoIterator<Item = &'f MiddlewareFragment>,
    ) -> MiddlewareChain {
        fragments
            .into_iter()
            .fold(MiddlewareChain::new(), |chain, fragment| {
                self.decorate(Some(chain), fragment)
            })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::domain::{FacilityUnavailable, MiddlewareId};

    struct Available(HashSet<&'static str>);

    impl FacilityCheck for Available {
        fn require(&self, middleware: &str, facility: &str) -> Result<(), FacilityUnavailable> {
            if self.0.contains(facility) {
                Ok(())
            } else {
                Err(FacilityUnavailable {
                    middleware: middleware.to_owned(),
                    facility: facility.to_owned(),
                })
            }
        }
    }

    fn composer(facilities: &[&'static str]) -> MiddlewareComposer {
        MiddlewareComposer::new(Box::new(Available(facilities.iter().copied().collect())))
    }

    fn names(chain: &MiddlewareChain) -> Vec<String> {
        chain
            .execution_plan()
            .into_iter()
            .map(|e| e.id.to_string())
            .collect()
    }

    #[test]
    fn decorates_empty_default() {
        let chain = composer(&["error-display"]).decorate(None, &MiddlewareFragment::web_defaults());
        assert_eq!(
            names(&chain),
            ["error-display", "client-ip", "auth", "auth-aware-router"]
        );
    }

    #[test]
    fn unavailable_facility_is_skipped_not_fatal() {
        let chain = composer(&[]).decorate(None, &MiddlewareFragment::web_defaults());
        assert_eq!(names(&chain), ["client-ip", "auth", "auth-aware-router"]);
    }

    #[test]
    fn previous_chain_entries_come_first() {
        let mut previous = MiddlewareChain::new();
        previous.add_pre_router(MiddlewareId::new("session").unwrap());
        previous.add_post_router(MiddlewareId::new("cache").unwrap(), 3000);
        let original = previous.clone();

        let chain = composer(&[]).decorate(Some(previous), &MiddlewareFragment::web_defaults());

        assert_eq!(chain.pre_router()[0].as_str(), "session");
        let post: Vec<&str> = chain.post_router().iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(post, ["auth-aware-router", "cache"]);
        assert_eq!(original.len(), 2);
    }

    #[test]
    fn sequential_decoration_equals_single_pass() {
        let x = MiddlewareFragment::new()
            .pre_router("client-ip")
            .and_then(|f| f.post_router("router", 2001))
            .and_then(|f| f.post_router("audit", 50))
            .unwrap();
        let y = MiddlewareFragment::new()
            .pre_router("auth")
            .and_then(|f| f.post_router("metrics", 50))
            .and_then(|f| f.post_router("first", 1))
            .unwrap();

        let mut base = MiddlewareChain::new();
        base.add_pre_router(MiddlewareId::new("session").unwrap());

        let c = composer(&[]);
        let stepwise = c.decorate(Some(c.decorate(Some(base.clone()), &x)), &y);
        let one_pass = c.decorate(Some(base), &x.clone().then(y.clone()));

        assert_eq!(stepwise, one_pass);
        assert_eq!(
            names(&stepwise),
            ["session", "client-ip", "auth", "first", "audit", "metrics", "router"]
        );
    }

    #[test]
    fn compose_folds_fragments() {
        let a = MiddlewareFragment::new().pre_router("a").unwrap();
        let b = MiddlewareFragment::new().pre_router("b").unwrap();
        let chain = composer(&[]).compose([&a, &b]);
        assert_eq!(names(&chain), ["a", "b"]);
    }
}
