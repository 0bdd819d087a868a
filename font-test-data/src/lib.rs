//! test data shared between the ot-codec crates.

pub mod bebuffer;
pub mod fonts;
pub mod glyf;
pub mod layout;
