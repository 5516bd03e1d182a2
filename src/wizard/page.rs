use std::fmt;
use std::path::Path;
use std::time::Duration;

use crate::error::PageError;

use super::field::{FieldIdentity, FieldKind};

/// Wizard navigation controls, listed in probe priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    Next,
    Continue,
    Submit,
}

impl Control {
    /// Probe order used by [`advance`](super::FormWalker::advance).
    pub const PRIORITY: [Control; 3] = [Control::Next, Control::Continue, Control::Submit];
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Control::Next => write!(f, "next"),
            Control::Continue => write!(f, "continue"),
            Control::Submit => write!(f, "submit"),
        }
    }
}

/// A live page or frame holding an application form.
///
/// Whether this is the top-level document or an embedded frame is decided by
/// whoever hands it out; the wizard treats both the same. Element lookups that
/// find nothing return empty results rather than errors.
pub trait FormPage {
    type Handle: Clone + fmt::Debug;

    /// Fields of the given kind currently in the form, in document order.
    async fn fields(&mut self, kind: FieldKind) -> Result<Vec<Self::Handle>, PageError>;

    async fn identity(&mut self, field: &Self::Handle) -> Result<FieldIdentity, PageError>;

    /// Replaces the field content: select-all, delete, then type `value`.
    async fn overwrite_text(&mut self, field: &Self::Handle, value: &str) -> Result<(), PageError>;

    /// Option labels of a dropdown, in order.
    async fn options(&mut self, field: &Self::Handle) -> Result<Vec<String>, PageError>;

    /// Selects the option at `index` and fires a change notification.
    async fn select_option(&mut self, field: &Self::Handle, index: usize) -> Result<(), PageError>;

    async fn is_required(&mut self, field: &Self::Handle) -> Result<bool, PageError>;

    async fn is_checked(&mut self, field: &Self::Handle) -> Result<bool, PageError>;

    async fn attach_file(&mut self, field: &Self::Handle, path: &Path) -> Result<(), PageError>;

    async fn find_control(&mut self, control: Control) -> Result<Option<Self::Handle>, PageError>;

    async fn click(&mut self, target: &Self::Handle) -> Result<(), PageError>;

    /// Blocks until the UI had a chance to react to the last interaction.
    async fn settle(&mut self, delay: Duration);
}
