// Rule system
// - registry.rs: declarative rule table built from the style guide
// - engine.rs: RuleEngine, applies the table paragraph by paragraph
// - structural.rs: required sections, caption sequences and TOC consistency

pub mod engine;
pub mod registry;
pub mod structural;

pub use engine::{Evaluation, RuleEngine};
pub use registry::{Attribute, Comparison, Quantifier, Rule, RuleRegistry, RuleScope, Value};
pub use structural::{StructuralChecker, TocEntry};
