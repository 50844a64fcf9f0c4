mod booking;
mod intake;
mod order;

pub use booking::*;
pub use intake::*;
pub use order::*;
