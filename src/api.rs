//! Catalogue of API endpoints exposed by this crate.
//!
//! Each [`Endpoint`] pairs a path template with its substitution arity:
//! a template either contains exactly one `{id}` slot or none. Resolution
//! enforces that a path parameter is supplied if and only if the template
//! has a slot.

/// Default production server.
pub const DEFAULT_SERVER: &str = "https://api.nylas.com";

/// A single API endpoint: a path template with zero or one `{id}` slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    template: &'static str,
}

impl Endpoint {
    const fn new(template: &'static str) -> Self {
        Self { template }
    }

    /// The raw path template, e.g. `/events/{id}`.
    pub fn template(&self) -> &'static str {
        self.template
    }

    /// Whether this endpoint requires a path parameter.
    pub fn takes_param(&self) -> bool {
        self.template.contains("{id}")
    }

    /// Substitute the path parameter into the template.
    ///
    /// # Panics
    ///
    /// Panics when a parameter is supplied for a slotless template or
    /// missing for a slotted one. Both indicate a bug in the calling
    /// resource module, not a runtime condition.
    pub fn resolve(&self, param: Option<&str>) -> String {
        match (self.takes_param(), param) {
            (true, Some(value)) => self.template.replace("{id}", value),
            (false, None) => self.template.to_string(),
            (true, None) => panic!("endpoint {} requires a path parameter", self.template),
            (false, Some(_)) => panic!("endpoint {} takes no path parameter", self.template),
        }
    }
}

pub const ACCOUNT: Endpoint = Endpoint::new("/account");

pub const EVENTS: Endpoint = Endpoint::new("/events");
pub const ONE_EVENT: Endpoint = Endpoint::new("/events/{id}");
pub const RSVP: Endpoint = Endpoint::new("/send-rsvp");

pub const SEARCH_THREADS: Endpoint = Endpoint::new("/threads/search");
pub const SEARCH_MESSAGES: Endpoint = Endpoint::new("/messages/search");

pub const DELTA: Endpoint = Endpoint::new("/delta");
pub const DELTA_LATEST_CURSOR: Endpoint = Endpoint::new("/delta/latest_cursor");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_substitutes_slot() {
        assert_eq!(ONE_EVENT.resolve(Some("evt_123")), "/events/evt_123");
        assert_eq!(EVENTS.resolve(None), "/events");
    }

    #[test]
    fn slot_detection() {
        assert!(ONE_EVENT.takes_param());
        assert!(!EVENTS.takes_param());
        assert!(!DELTA_LATEST_CURSOR.takes_param());
    }

    #[test]
    #[should_panic(expected = "requires a path parameter")]
    fn missing_param_panics() {
        ONE_EVENT.resolve(None);
    }

    #[test]
    #[should_panic(expected = "takes no path parameter")]
    fn unexpected_param_panics() {
        EVENTS.resolve(Some("evt_123"));
    }
}
