pub mod backup;
pub mod notification;
pub mod source_fallback;
pub mod spotify;
pub mod sync;
pub mod ytmusic;
