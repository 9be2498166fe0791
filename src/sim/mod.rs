pub mod console;
pub mod event;
pub mod page;
pub mod session;
pub mod step;
pub mod storage;
