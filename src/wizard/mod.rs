mod engine;
mod field;
mod matcher;
mod page;
mod state;

#[cfg(test)]
pub(crate) mod fake;

pub use engine::{FormWalker, WizardTimings};
pub use field::{FieldIdentity, FieldKind};
pub use matcher::{FieldMatcher, MatchRule, PreferredAnswerResolver, SecondOptionResolver};
pub use page::{Control, FormPage};

#[cfg(test)]
pub use field::FieldDescriptor;
#[cfg(test)]
pub use matcher::ProfileSlot;
