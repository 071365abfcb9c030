pub mod bus;
pub mod notify;
pub mod storage;
