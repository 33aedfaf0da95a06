//! Browser engine integration
//!
//! The flow only ever sees the [`PageDriver`] and [`ChallengeResolver`]
//! traits; the chromiumoxide implementation lives behind them.

pub mod chromium;
pub mod driver;
pub mod resolver;

pub use chromium::ChromiumDriver;
pub use driver::PageDriver;
pub use resolver::{ChallengeResolver, WaitingResolver};
