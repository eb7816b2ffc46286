//! The deployment settings row.

use std::sync::Mutex;

use crate::models::Settings;

pub struct SettingsStore {
    settings: Mutex<Settings>,
}

impl SettingsStore {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: Mutex::new(settings),
        }
    }

    pub fn snapshot(&self) -> Settings {
        self.settings.lock().expect("settings lock poisoned").clone()
    }

    /// Return the current guest counter and advance it.
    pub fn next_guest_number(&self) -> i64 {
        let mut settings = self.settings.lock().expect("settings lock poisoned");
        let n = settings.guest_number;
        settings.guest_number += 1;
        n
    }
}
