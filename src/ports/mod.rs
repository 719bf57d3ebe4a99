pub mod backup;
pub mod notification;
pub mod source;
pub mod target;
