pub mod client;
pub mod db;
pub mod models;
pub mod server;
pub mod web;
