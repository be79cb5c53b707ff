//! Declaration model consumed by the harness generator.
//!
//! The front end lowers a translation unit into a [`TranslationUnitDecls`]:
//! a tree of [`ClassDecl`]s (nested classes hang off their enclosing class)
//! together with the quoted includes the unit pulls in.

mod class;
mod member;
mod unit;

pub use class::*;
pub use member::*;
pub use unit::*;
