pub const APPLICATION_NAME: &str = "Vision Overlay - Desktop";

pub const CONFIG_DIR_NAME: &str = "vision-overlay-pc";
pub const SETTINGS_FILE_NAME: &str = "settings.json";

pub const DEFAULT_ANALYZE_PATH: &str = "/vision/analyze";
pub const DEFAULT_RECOGNIZE_TEXT_PATH: &str = "/vision/recognize-text";
pub const DEFAULT_OPERATION_STATUS_PATH: &str = "/vision/operations";
pub const DEFAULT_API_KEY_HEADER: &str = "X-Api-Key";
pub const DEFAULT_OPERATION_LOCATION_HEADER: &str = "Operation-Location";
pub const HTTP_TIMEOUT_SECONDS: u64 = 30;

pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 10;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;
pub const OPERATION_ID_LENGTH: usize = 36;

pub const DEFAULT_SOURCE_DPI: f64 = 96.0;
pub const DEFAULT_TARGET_DPI: f64 = 96.0;

pub const DEFAULT_OVERLAY_COLOR: [u8; 4] = [255, 64, 64, 255];
pub const DEFAULT_OVERLAY_STROKE_WIDTH: u32 = 2;
pub const DEFAULT_OVERLAY_FILE_NAME: &str = "vision_overlay.png";
pub const MAX_OVERLAY_PIXELS: u64 = 100_000_000;

pub const USER_MESSAGE_CANCELLED: &str = "[INFO] Request cancelled.";
pub const USER_MESSAGE_OVERLAY_SAVED: &str = "[SUCCESS] Overlay saved to";
pub const USER_MESSAGE_TEXT_INCOMPLETE: &str =
    "[WARN] Text recognition did not finish; showing the last status.";
