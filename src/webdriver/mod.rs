pub mod client;
pub mod page;
pub mod types;

pub use client::{Session, WebDriverClient};
pub use page::{FormSelectors, WebDriverPage};
pub use types::{BrowserOptions, ElementRef};
