//! Registry options.
//!
//! Options are plain data so they can be loaded alongside other policy
//! files when the `serde` feature is enabled.
//!
//! ```
//! use ftui_binding::{BindingContext, ContextOptions, ScrubPolicy};
//!
//! let ctx = BindingContext::with_options(
//!     ContextOptions::default()
//!         .with_capacity(64)
//!         .with_scrub(ScrubPolicy::Manual),
//! );
//! assert_eq!(ctx.options().scrub, ScrubPolicy::Manual);
//! ```

/// When dead registry slots are purged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ScrubPolicy {
    /// Scrub after every resolve that stored a manager.
    #[default]
    AfterInsert,
    /// Scrub only on explicit calls and in count/enumeration accessors.
    Manual,
}

/// Construction options for [`BindingContext`](crate::BindingContext).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ContextOptions {
    /// Initial slot capacity.
    pub capacity: usize,
    /// Scrub policy.
    pub scrub: ScrubPolicy,
}

impl ContextOptions {
    #[must_use]
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    #[must_use]
    pub fn with_scrub(mut self, scrub: ScrubPolicy) -> Self {
        self.scrub = scrub;
        self
    }
}
