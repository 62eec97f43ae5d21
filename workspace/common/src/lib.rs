//! Small building blocks shared by the store and the server: the application
//! clock, fixed-precision money handling and id generation.

pub mod clock;
pub mod ids;
pub mod money;

pub use clock::{Clock, FixedClock, SystemClock};
pub use ids::new_id;
pub use money::MoneyError;
