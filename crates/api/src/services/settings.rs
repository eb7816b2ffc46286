//! Deployment settings: wifi credentials and app version checks.

use curio_core::envelope::Envelope;
use serde::{Deserialize, Serialize};

use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppVersionRequest {
    pub version: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WifiData {
    pub ssid: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppVersionData {
    pub matches: bool,
    pub expected: String,
}

/// Wifi credentials for the on-site network.
pub fn wifi_credentials(state: &AppState) -> Envelope<WifiData> {
    let settings = state.store.settings.snapshot();
    Envelope::ok(
        WifiData {
            ssid: settings.wifi_ssid,
            password: settings.wifi_password,
        },
        "Wifi credentials found",
    )
}

/// Compare the client's app version against the expected one.
pub fn check_app_version(state: &AppState, req: AppVersionRequest) -> Envelope<AppVersionData> {
    let settings = state.store.settings.snapshot();
    let matches = req.version == settings.app_version;
    Envelope::ok(
        AppVersionData {
            matches,
            expected: settings.app_version,
        },
        "App version checked",
    )
}
