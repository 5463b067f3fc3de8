//! Configuration — collection file location and user settings.

pub mod settings;

pub use settings::{Settings, COLLECTION_ENV, SETTINGS_ENV};
