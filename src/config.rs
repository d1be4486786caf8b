// Tunables for the board. Everything here is compile-time; the only runtime
// configuration is the persisted `Customization`.

// ---------------- Viewport -----------------
pub const MIN_SCALE: f64 = 0.2;
pub const MAX_SCALE: f64 = 2.0;
/// Scale before the first focus lands.
pub const INITIAL_SCALE: f64 = 0.8;
pub const WHEEL_ZOOM_FACTOR: f64 = 1.1;
/// Fraction of the viewport a focused zone may occupy.
pub const FOCUS_PADDING: f64 = 0.9;
/// Fraction of the viewport that must keep overlapping the world.
pub const CLAMP_VISIBLE_FRACTION: f64 = 0.8;
/// Largest empty margin shown before the world's near edge.
pub const CLAMP_MARGIN_FRACTION: f64 = 0.2;
/// Two touches closer than this cannot anchor a pinch.
pub const MIN_PINCH_DISTANCE: f64 = 10.0;
/// Used until the host reports a real size.
pub const FALLBACK_VIEWPORT_WIDTH: f64 = 800.0;
pub const FALLBACK_VIEWPORT_HEIGHT: f64 = 600.0;

// ---------------- Auto-pan -----------------
pub const EDGE_MARGIN: f64 = 60.0;
pub const AUTO_PAN_STEP: f64 = 10.0;
pub const AUTO_PAN_TICK_MS: u32 = 16;

// ---------------- Persistence -----------------
pub const NOTES_KEY: &str = "corkboard-notes";
pub const CONNECTIONS_KEY: &str = "corkboard-connections";
pub const CUSTOMIZATION_KEY: &str = "corkboard-customization";
pub const SAVE_DEBOUNCE_MS: u32 = 500;

// ---------------- Board -----------------
pub const DEFAULT_ZONE: &str = "BRAIN_DUMP";
