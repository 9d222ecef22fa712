#![forbid(unsafe_code)]

//! Pattern rules and the machinery that runs them

pub mod finder;
pub mod member_on_stack;
pub mod optional;
mod registry;
mod rule;
pub mod unique_ptr;
pub mod variant;

pub use finder::{MatchFinder, NodeKind, NodeMatcher, Registrar};
pub use member_on_stack::MemberOnStack;
pub use optional::OptionalGarbageCollected;
pub use registry::{RuleRegistry, find_bad_patterns};
pub use rule::{BoundNodes, PatternRule};
pub use unique_ptr::UniquePtrGarbageCollected;
pub use variant::VariantGarbageCollected;
