//! HTML tree construction.
//!
//! Implements [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction)
//! of the WHATWG HTML Living Standard.

/// Stack, scope, insertion and formatting-list algorithms.
mod algorithms;
/// The tree constructor and its token driver.
mod core;
/// SVG and MathML name and attribute adjustments.
pub mod foreign_content;
/// The insertion mode handlers.
mod phases;

pub use self::core::{Phase, TreeConstructor};
