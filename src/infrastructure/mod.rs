pub mod db;
pub mod logging;
pub mod mail;
pub mod session;
pub mod utils;
