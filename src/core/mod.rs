//! Core module - Application state, configuration, events and the worker

pub mod config;
pub mod controller;
pub mod events;
pub mod lock;
pub mod state;
