//! Semantic action IDs for Pixel Clicker click targets.
//!
//! Each constant represents a distinct clickable action in the UI.
//! These IDs are registered during render and dispatched via `InputEvent::Click`.

// ── Core actions ────────────────────────────────────────────────
pub const CLICK_PIXEL: u16 = 0;
pub const TOGGLE_SHOP: u16 = 1;
pub const OPEN_MENU: u16 = 2;
pub const BACK: u16 = 3;
pub const SHOP_PREV: u16 = 4;
pub const SHOP_NEXT: u16 = 5;

// ── Menu entries ────────────────────────────────────────────────
pub const OPEN_PROFILES: u16 = 10;
pub const OPEN_CUSTOMIZE: u16 = 11;

// ── Profile management ──────────────────────────────────────────
pub const NEW_PROFILE: u16 = 20;
pub const DELETE_PROFILE: u16 = 21;

// ── Profile selection (base + profile index 0..4) ───────────────
pub const SELECT_PROFILE_BASE: u16 = 30;

// ── Shop purchase (base + catalog index) ────────────────────────
pub const BUY_ITEM_BASE: u16 = 100;

// ── Theme selection (base + theme index) ────────────────────────
pub const SELECT_THEME_BASE: u16 = 200;
