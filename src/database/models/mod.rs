pub mod event;
pub mod finance;
pub mod health;
pub mod state;

pub use event::*;
pub use finance::*;
pub use health::*;
pub use state::*;
