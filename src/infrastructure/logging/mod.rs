pub mod contact_log;
