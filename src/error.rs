//! Error types for purchases, profile management, persistence and config.

use thiserror::Error;

/// Why a shop purchase was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PurchaseError {
    #[error("the shop has not been unlocked yet")]
    ShopLocked,

    #[error("unknown shop item '{0}'")]
    UnknownItem(String),

    #[error("{0} is already owned")]
    AlreadyOwned(&'static str),

    #[error("{item} needs {missing} first")]
    Locked {
        item: &'static str,
        missing: &'static str,
    },

    #[error("not enough cash: {cost} needed, {cash} held")]
    InsufficientCash { cost: u64, cash: u64 },
}

/// Why a profile operation was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileError {
    #[error("save profiles are not unlocked")]
    FeatureLocked,

    #[error("profile limit of {0} reached")]
    LimitReached(usize),

    #[error("the last profile cannot be deleted")]
    LastProfile,

    #[error("no profile at slot {0}")]
    NoSuchProfile(usize),
}

/// Failures while reading or writing the save blob.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("save data is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("save data has no recognisable shape")]
    UnknownShape,

    #[error("save version {found} is older than the minimum supported {min}")]
    TooOld { found: u32, min: u32 },

    #[error("local storage is unavailable")]
    StorageUnavailable,

    #[error("local storage rejected the write: {0}")]
    Storage(String),
}

/// Failures while reading a configuration override.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config override is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config field '{field}' must be greater than zero")]
    Zero { field: &'static str },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn purchase_error_messages_name_the_item() {
        let err = PurchaseError::Locked {
            item: "Turbo Drill",
            missing: "Mine Drill",
        };
        assert_eq!(err.to_string(), "Turbo Drill needs Mine Drill first");

        let err = PurchaseError::InsufficientCash { cost: 250, cash: 12 };
        assert_eq!(err.to_string(), "not enough cash: 250 needed, 12 held");
    }

    #[test]
    fn save_error_wraps_json_errors() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: SaveError = json_err.into();
        assert!(matches!(err, SaveError::Json(_)));
    }
}
