///! Passpoint service modules
pub mod anqp;
pub mod events;
pub mod manager;
pub mod matching;
pub mod provider;
