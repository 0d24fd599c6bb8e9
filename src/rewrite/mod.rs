//! Pre-analysis AST rewrites.
//!
//! Four in-place rewrites desugar surface patterns into the canonical form
//! the analyzer expects. All four preserve semantics modulo canonical form
//! and are idempotent.
//!
//! Ordering: simplified path patterns are rewritten first because they
//! create new element patterns; the property-predicate rewrite runs last so
//! it sees every element pattern. The bare-dash and element-`WHERE`
//! rewrites are independent of each other.

pub mod element_patterns;
pub mod element_where;
pub mod property_predicate;
pub mod simplified_path;

use crate::ast::pattern::Program;
use crate::semantic::error::Result;

pub use element_patterns::rewrite_element_patterns;
pub use element_where::rewrite_element_pattern_where;
pub use property_predicate::{rewrite_element_property_predicates, GENERATED_NAME_PREFIX};
pub use simplified_path::rewrite_simplified_path_patterns;

/// Runs every rewrite in canonical order.
pub fn rewrite_program(program: &mut Program) -> Result<()> {
    rewrite_simplified_path_patterns(program);
    rewrite_element_patterns(program);
    rewrite_element_pattern_where(program);
    rewrite_element_property_predicates(program)
}
