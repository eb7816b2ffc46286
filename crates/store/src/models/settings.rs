/// Deployment-wide settings row.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Counter feeding generated guest names ("Guest<n>").
    pub guest_number: i64,
    pub wifi_ssid: String,
    pub wifi_password: String,
    /// Client app version the backend expects.
    pub app_version: String,
}
