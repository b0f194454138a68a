//! Configuration section definitions.

mod content;
mod redirect;
mod serve;

pub use content::ContentConfig;
pub use redirect::RedirectRule;
pub use serve::ServeConfig;
