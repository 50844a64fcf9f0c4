mod google;

pub use google::*;
