// Service module exports

pub mod countdown;
pub mod database;
pub mod notification;
pub mod settings;
