pub mod certificate;
pub mod level;
pub mod probe;
pub mod tracker;
