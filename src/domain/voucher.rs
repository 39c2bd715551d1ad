//! Voucher catalog and redemption records.
//!
//! The catalog is the server-side truth for voucher prices; a
//! client-declared value is never consulted. It is loaded once at process
//! start and immutable afterward.

use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use uuid::Uuid;

use super::UserId;

/// One catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoucherOffer {
    pub brand: String,
    pub value: i64,
    #[serde(default)]
    pub desc: String,
}

/// Fixed voucher price list keyed by voucher id.
#[derive(Debug, Clone)]
pub struct VoucherCatalog {
    offers: BTreeMap<String, VoucherOffer>,
}

impl VoucherCatalog {
    /// The built-in catalog.
    pub fn builtin() -> Self {
        let mut offers = BTreeMap::new();
        let mut add = |id: &str, brand: &str, value: i64, desc: &str| {
            offers.insert(
                id.to_string(),
                VoucherOffer {
                    brand: brand.to_string(),
                    value,
                    desc: desc.to_string(),
                },
            );
        };
        add("V50", "Cafe Verde", 50, "Rs. 50 off - beverages");
        add("V75", "Eco Mart", 75, "Rs. 75 off - groceries");
        add("V100", "Green Bites", 100, "Rs. 100 off - snacks");
        add("V120", "Leaf n' Learn", 120, "Rs. 120 off - books");
        add("V150", "Urban Forest", 150, "Rs. 150 off - apparel");
        add("V200", "Planet Play", 200, "Rs. 200 off - games");
        Self { offers }
    }

    /// Load a catalog from a JSON file mapping voucher id to offer.
    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let offers: BTreeMap<String, VoucherOffer> = serde_json::from_str(&raw)?;
        if offers.is_empty() {
            anyhow::bail!("voucher catalog at {} is empty", path.display());
        }
        if let Some((id, offer)) = offers.iter().find(|(_, o)| o.value <= 0) {
            anyhow::bail!(
                "voucher {} has non-positive value {}",
                id,
                offer.value
            );
        }
        Ok(Self { offers })
    }

    pub fn get(&self, voucher_id: &str) -> Option<&VoucherOffer> {
        self.offers.get(voucher_id)
    }

    /// All offers, id-ordered.
    pub fn offers(&self) -> impl Iterator<Item = (&str, &VoucherOffer)> {
        self.offers.iter().map(|(id, o)| (id.as_str(), o))
    }

    pub fn len(&self) -> usize {
        self.offers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offers.is_empty()
    }
}

/// Generate a short redemption code, e.g. `V100-A3F29B`.
///
/// The code space is large enough that collisions are negligible; no
/// uniqueness check against history is performed, by design.
pub fn redemption_code(voucher_id: &str) -> String {
    let mut bytes = [0u8; 3];
    rand::thread_rng().fill_bytes(&mut bytes);
    format!("{}-{}", voucher_id, hex::encode(bytes).to_uppercase())
}

/// A persisted redemption. Immutable after creation.
#[derive(Debug, Clone, Serialize)]
pub struct VoucherRedemption {
    pub id: Uuid,
    pub owner_id: UserId,
    pub voucher_id: String,
    pub brand: String,
    pub value: i64,
    pub code: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_prices() {
        let catalog = VoucherCatalog::builtin();
        assert_eq!(catalog.len(), 6);
        assert_eq!(catalog.get("V100").unwrap().value, 100);
        assert_eq!(catalog.get("V100").unwrap().brand, "Green Bites");
        assert!(catalog.get("V999").is_none());
    }

    #[test]
    fn redemption_code_shape() {
        let code = redemption_code("V100");
        let (prefix, suffix) = code.split_once('-').unwrap();
        assert_eq!(prefix, "V100");
        assert_eq!(suffix.len(), 6);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(suffix, suffix.to_uppercase());
    }

    #[test]
    fn catalog_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(
            &path,
            r#"{"G10": {"brand": "Test Brand", "value": 10}}"#,
        )
        .unwrap();

        let catalog = VoucherCatalog::from_json_file(&path).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("G10").unwrap().value, 10);

        std::fs::write(&path, r#"{}"#).unwrap();
        assert!(VoucherCatalog::from_json_file(&path).is_err());

        std::fs::write(&path, r#"{"G0": {"brand": "Bad", "value": 0}}"#).unwrap();
        assert!(VoucherCatalog::from_json_file(&path).is_err());
    }
}
