//! Rationale domain
//!
//! A rationale is one independently generated reasoning chain. The generator
//! produces raw rationales; the corrector rewrites each one against fused
//! evidence into a corrected successor with the same id.

pub mod entities;
pub mod parsing;

pub use entities::{Rationale, RationaleId, RationaleOrigin};
pub use parsing::{answer_key, extract_answer};
