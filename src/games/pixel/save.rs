//! Pixel Clicker save/load.
//!
//! ## Versioning
//!
//! - `SAVE_VERSION`: current format. Bump when fields are added.
//! - `MIN_COMPATIBLE_VERSION`: oldest version that can still be read. Only
//!   bump on breaking changes (a field removed or its meaning changed).
//!
//! Versions 1 and 2 stored a single flat game under a `state` object. They
//! are migrated into one profile named "Profile 1". Version 3 introduced
//! profiles and the shared global-unlocks set. Versions newer than
//! `SAVE_VERSION` are read best-effort; unknown fields are ignored.
//!
//! The storage key never changed, so every version lives under the same key.
//!
//! Only durable progress is stored. The current view, shop cursor, flashes,
//! the click throttle window and mine schedules all start fresh on load.

#[cfg(any(target_arch = "wasm32", test))]
use std::collections::BTreeSet;

#[cfg(any(target_arch = "wasm32", test))]
use serde::de::DeserializeOwned;
#[cfg(any(target_arch = "wasm32", test))]
use serde::{Deserialize, Deserializer, Serialize};
#[cfg(any(target_arch = "wasm32", test))]
use serde_json::{Map, Value};
#[cfg(any(target_arch = "wasm32", test))]
use tracing::{debug, info, warn};

#[cfg(any(target_arch = "wasm32", test))]
use super::catalog::{self, Scope, SHOP_FEATURE_ID};
#[cfg(any(target_arch = "wasm32", test))]
use super::state::{PixelState, Profile, Theme, View, MAX_PROFILES};
#[cfg(any(target_arch = "wasm32", test))]
use crate::error::SaveError;

/// Current save format version.
#[cfg(any(target_arch = "wasm32", test))]
const SAVE_VERSION: u32 = 3;

/// Oldest version that can be loaded.
#[cfg(any(target_arch = "wasm32", test))]
const MIN_COMPATIBLE_VERSION: u32 = 1;

/// localStorage key. Unchanged since version 1.
#[cfg(target_arch = "wasm32")]
const STORAGE_KEY: &str = "pixel-save-v1";

// ── Debounce ───────────────────────────────────────────────────

/// Pending-save deadline. Queuing again pushes the deadline back, so a burst
/// of changes produces one write once things go quiet.
#[derive(Debug)]
pub struct SaveQueue {
    debounce_ms: f64,
    due_at: Option<f64>,
}

impl SaveQueue {
    pub fn new(debounce_ms: u32) -> Self {
        Self {
            debounce_ms: debounce_ms as f64,
            due_at: None,
        }
    }

    pub fn queue(&mut self, now_ms: f64) {
        self.due_at = Some(now_ms + self.debounce_ms);
    }

    pub fn is_pending(&self) -> bool {
        self.due_at.is_some()
    }

    /// True once the deadline has passed; clears the pending save.
    pub fn take_due(&mut self, now_ms: f64) -> bool {
        match self.due_at {
            Some(due) if now_ms >= due => {
                self.due_at = None;
                true
            }
            _ => false,
        }
    }

    /// Forget the pending save (an immediate write just happened).
    pub fn clear(&mut self) {
        self.due_at = None;
    }
}

// ── Format ─────────────────────────────────────────────────────

/// Every field tolerates a wrong JSON type by falling back to its default,
/// so one bad value never costs the rest of the save.
#[cfg(any(target_arch = "wasm32", test))]
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SaveData {
    #[serde(deserialize_with = "lenient_small")]
    version: u32,
    #[serde(deserialize_with = "lenient_or_default")]
    saved_at: f64,
    #[serde(deserialize_with = "lenient_small")]
    active_profile: usize,
    #[serde(deserialize_with = "lenient_ids")]
    global_unlocks: Vec<String>,
    #[serde(deserialize_with = "lenient_profiles")]
    profiles: Vec<ProfileSave>,
}

#[cfg(any(target_arch = "wasm32", test))]
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ProfileSave {
    #[serde(deserialize_with = "lenient_small")]
    id: u32,
    #[serde(deserialize_with = "lenient_or_default")]
    name: String,
    #[serde(deserialize_with = "lenient_count")]
    cash: u64,
    #[serde(deserialize_with = "lenient_ids")]
    purchased_items: Vec<String>,
    #[serde(deserialize_with = "lenient_or_default")]
    theme: String,
    #[serde(deserialize_with = "lenient_count")]
    total_clicks: u64,
    #[serde(deserialize_with = "lenient_count")]
    lifetime_cash: u64,
}

/// A count from any JSON value: negative, non-numeric or missing ⇒ 0,
/// fractions floored.
#[cfg(any(target_arch = "wasm32", test))]
fn count_from_value(value: &Value) -> u64 {
    let Value::Number(n) = value else {
        return 0;
    };
    if let Some(whole) = n.as_u64() {
        return whole;
    }
    match n.as_f64() {
        Some(f) if f.is_finite() && f > 0.0 => f.floor() as u64,
        _ => 0,
    }
}

/// String entries of a JSON array; anything else is dropped.
#[cfg(any(target_arch = "wasm32", test))]
fn ids_from_value(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(any(target_arch = "wasm32", test))]
fn lenient_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    Ok(count_from_value(&Value::deserialize(deserializer)?))
}

/// A count that must also fit `T`; out of range ⇒ default.
#[cfg(any(target_arch = "wasm32", test))]
fn lenient_small<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<u64> + Default,
{
    Ok(T::try_from(lenient_count(deserializer)?).unwrap_or_default())
}

#[cfg(any(target_arch = "wasm32", test))]
fn lenient_or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(serde_json::from_value(Value::deserialize(deserializer)?).unwrap_or_default())
}

#[cfg(any(target_arch = "wasm32", test))]
fn lenient_ids<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(ids_from_value(&Value::deserialize(deserializer)?))
}

/// Profile entries that are not objects are skipped.
#[cfg(any(target_arch = "wasm32", test))]
fn lenient_profiles<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<ProfileSave>, D::Error> {
    let Value::Array(entries) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    let total = entries.len();
    let profiles: Vec<ProfileSave> = entries
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|entry| serde_json::from_value(entry).ok())
        .collect();
    if profiles.len() < total {
        warn!(skipped = total - profiles.len(), "malformed profile entries skipped");
    }
    Ok(profiles)
}

#[cfg(any(target_arch = "wasm32", test))]
fn extract_save(state: &PixelState, saved_at: f64) -> SaveData {
    SaveData {
        version: SAVE_VERSION,
        saved_at,
        active_profile: state.active,
        global_unlocks: state.global_unlocks.iter().map(|id| id.to_string()).collect(),
        profiles: state
            .profiles
            .iter()
            .map(|p| ProfileSave {
                id: p.id,
                name: p.name.clone(),
                cash: p.cash,
                purchased_items: p.purchased.iter().map(|id| id.to_string()).collect(),
                theme: p.theme.key().to_string(),
                total_clicks: p.total_clicks,
                lifetime_cash: p.lifetime_cash,
            })
            .collect(),
    }
}

/// Serialize the durable parts of `state`.
#[cfg(any(target_arch = "wasm32", test))]
pub fn encode(state: &PixelState, saved_at: f64) -> Result<String, SaveError> {
    Ok(serde_json::to_string(&extract_save(state, saved_at))?)
}

/// Parse any supported save shape into the current format.
#[cfg(any(target_arch = "wasm32", test))]
fn decode(json: &str) -> Result<SaveData, SaveError> {
    let value: Value = serde_json::from_str(json)?;
    let Value::Object(map) = &value else {
        return Err(SaveError::UnknownShape);
    };

    let version = map
        .get("version")
        .and_then(Value::as_u64)
        .map(|v| v.min(u32::MAX as u64) as u32);
    if let Some(found) = version {
        if found < MIN_COMPATIBLE_VERSION {
            return Err(SaveError::TooOld {
                found,
                min: MIN_COMPATIBLE_VERSION,
            });
        }
        if found > SAVE_VERSION {
            warn!(found, current = SAVE_VERSION, "save is newer than this build; loading best-effort");
        }
    }

    if map.contains_key("profiles") {
        return Ok(serde_json::from_value(value)?);
    }
    if let Some(Value::Object(legacy)) = map.get("state") {
        let saved_at = map.get("savedAt").and_then(Value::as_f64).unwrap_or(0.0);
        info!(version = version.unwrap_or(0), "migrating flat save into Profile 1");
        return Ok(migrate_flat(legacy, saved_at));
    }
    Err(SaveError::UnknownShape)
}

/// Versions 1-2: `{"state": {"cash", "shopFeatureUnlocked", "purchasedItems",
/// "inShopView"}}`. Each field is taken only when it has the expected type.
#[cfg(any(target_arch = "wasm32", test))]
fn migrate_flat(legacy: &Map<String, Value>, saved_at: f64) -> SaveData {
    let cash = legacy.get("cash").map_or(0, count_from_value);
    let purchased_items = legacy.get("purchasedItems").map(ids_from_value).unwrap_or_default();
    let mut global_unlocks = Vec::new();
    if legacy.get("shopFeatureUnlocked").and_then(Value::as_bool) == Some(true) {
        global_unlocks.push(SHOP_FEATURE_ID.to_string());
    }
    // `inShopView` was UI state; views are no longer persisted.

    SaveData {
        version: SAVE_VERSION,
        saved_at,
        active_profile: 0,
        global_unlocks,
        profiles: vec![ProfileSave {
            id: 1,
            name: "Profile 1".into(),
            cash,
            purchased_items,
            theme: Theme::Classic.key().into(),
            total_clicks: 0,
            lifetime_cash: cash,
        }],
    }
}

/// Route an id to the scope it belongs in. Unknown ids are dropped.
#[cfg(any(target_arch = "wasm32", test))]
fn file_unlock(
    id: &str,
    purchased: &mut Vec<&'static str>,
    global: &mut BTreeSet<&'static str>,
) -> bool {
    if id == SHOP_FEATURE_ID {
        global.insert(SHOP_FEATURE_ID);
        return true;
    }
    let Some(item) = catalog::item_by_id(id) else {
        return false;
    };
    match item.scope {
        Scope::Global => {
            global.insert(item.id);
        }
        Scope::Profile => {
            if !purchased.contains(&item.id) {
                purchased.push(item.id);
            }
        }
    }
    true
}

/// Replace the durable parts of `state` with a sanitized copy of `save`.
#[cfg(any(target_arch = "wasm32", test))]
fn apply_save(state: &mut PixelState, save: &SaveData) {
    let mut global = BTreeSet::new();
    let mut dropped = 0usize;

    for id in &save.global_unlocks {
        let mut stray = Vec::new();
        if !file_unlock(id, &mut stray, &mut global) || !stray.is_empty() {
            dropped += 1;
        }
    }

    let mut profiles: Vec<Profile> = Vec::new();
    for saved in save.profiles.iter().take(MAX_PROFILES) {
        let id = if saved.id == 0 || profiles.iter().any(|p| p.id == saved.id) {
            (1..)
                .find(|candidate| profiles.iter().all(|p| p.id != *candidate))
                .unwrap_or(1)
        } else {
            saved.id
        };
        let mut profile = Profile::new(id);
        if !saved.name.trim().is_empty() {
            profile.name = saved.name.clone();
        }
        profile.cash = saved.cash;
        profile.theme = Theme::from_key(&saved.theme).unwrap_or(Theme::Classic);
        profile.total_clicks = saved.total_clicks;
        profile.lifetime_cash = saved.lifetime_cash.max(saved.cash);
        for item_id in &saved.purchased_items {
            if !file_unlock(item_id, &mut profile.purchased, &mut global) {
                dropped += 1;
            }
        }
        profiles.push(profile);
    }
    if save.profiles.len() > MAX_PROFILES {
        warn!(found = save.profiles.len(), max = MAX_PROFILES, "extra profiles dropped");
    }
    if profiles.is_empty() {
        profiles.push(Profile::new(1));
    }
    if dropped > 0 {
        debug!(dropped, "unknown ids dropped from save");
    }

    state.active = save.active_profile.min(profiles.len() - 1);
    state.profiles = profiles;
    state.global_unlocks = global;
    state.view = View::Game;
    state.shop_cursor = 0;
}

/// Decode `json` and apply it. On error `state` is left untouched.
#[cfg(any(target_arch = "wasm32", test))]
pub fn load_from_json(state: &mut PixelState, json: &str) -> Result<(), SaveError> {
    let save = decode(json)?;
    apply_save(state, &save);
    Ok(())
}

// ── Browser storage ────────────────────────────────────────────

#[cfg(target_arch = "wasm32")]
fn get_storage() -> Result<web_sys::Storage, SaveError> {
    web_sys::window()
        .and_then(|w| w.local_storage().ok().flatten())
        .ok_or(SaveError::StorageUnavailable)
}

/// Write the current state to localStorage.
#[cfg(target_arch = "wasm32")]
pub fn save_game(state: &PixelState) -> Result<(), SaveError> {
    let json = encode(state, crate::time::epoch_ms())?;
    get_storage()?
        .set_item(STORAGE_KEY, &json)
        .map_err(|e| SaveError::Storage(format!("{e:?}")))?;
    debug!(bytes = json.len(), "saved");
    Ok(())
}

/// Restore from localStorage. Returns false (keeping defaults) when there is
/// nothing to load or the stored data cannot be read. Unreadable data is left
/// in storage until the next save overwrites it.
#[cfg(target_arch = "wasm32")]
pub fn load_game(state: &mut PixelState) -> bool {
    let storage = match get_storage() {
        Ok(s) => s,
        Err(e) => {
            warn!("{e}");
            return false;
        }
    };
    let json = match storage.get_item(STORAGE_KEY) {
        Ok(Some(j)) => j,
        _ => return false,
    };
    match load_from_json(state, &json) {
        Ok(()) => {
            info!(profiles = state.profiles.len(), "save loaded");
            true
        }
        Err(e) => {
            warn!("ignoring stored save: {e}");
            false
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn arb_id() -> impl Strategy<Value = String> {
        prop_oneof![
            proptest::sample::select(
                catalog::CATALOG.iter().map(|i| i.id.to_string()).collect::<Vec<_>>()
            ),
            Just(SHOP_FEATURE_ID.to_string()),
            "[a-z-]{1,12}",
        ]
    }

    proptest! {
        #[test]
        fn prop_loaded_state_is_always_sane(
            globals in proptest::collection::vec(arb_id(), 0..10),
            profiles in proptest::collection::vec(
                (0u32..8, -1e6f64..1e12, proptest::collection::vec(arb_id(), 0..15)),
                0..9,
            ),
            active in 0usize..12,
        ) {
            let profiles_json: Vec<Value> = profiles
                .iter()
                .map(|(id, cash, items)| serde_json::json!({
                    "id": id, "cash": cash, "purchasedItems": items,
                }))
                .collect();
            let json = serde_json::json!({
                "version": 3,
                "activeProfile": active,
                "globalUnlocks": globals,
                "profiles": profiles_json,
            })
            .to_string();

            let mut state = PixelState::new(1);
            load_from_json(&mut state, &json).unwrap();

            prop_assert!(!state.profiles.is_empty());
            prop_assert!(state.profiles.len() <= MAX_PROFILES);
            prop_assert!(state.active < state.profiles.len());
            for id in &state.global_unlocks {
                let ok = *id == SHOP_FEATURE_ID
                    || catalog::item_by_id(id).is_some_and(|i| i.scope == Scope::Global);
                prop_assert!(ok, "bad global id {}", id);
            }
            let mut seen_ids = BTreeSet::new();
            for p in &state.profiles {
                prop_assert!(seen_ids.insert(p.id), "duplicate profile id {}", p.id);
                let mut seen = BTreeSet::new();
                for id in &p.purchased {
                    prop_assert!(seen.insert(*id), "duplicate item {}", id);
                    let item = catalog::item_by_id(id);
                    prop_assert!(item.is_some_and(|i| i.scope == Scope::Profile));
                }
            }
        }
    }
}
