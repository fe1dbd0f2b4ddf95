pub mod avatar;
pub mod crypto;
pub mod db;
pub mod gateway;
pub mod storage;
