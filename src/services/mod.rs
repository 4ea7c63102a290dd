pub mod diagnostics;
pub mod droid;
pub mod page;
pub mod price_locator;
pub mod site_extractor;

pub use diagnostics::*;
pub use droid::*;
pub use page::*;
pub use price_locator::*;
pub use site_extractor::*;
