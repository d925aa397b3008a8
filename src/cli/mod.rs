pub mod check;
pub mod init;
pub mod log;
pub mod review;
