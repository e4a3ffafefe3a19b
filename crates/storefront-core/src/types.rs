//! # Domain Types
//!
//! Core domain types shared by every storefront crate.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Bank       │   │   QrPayment     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  key            │   │  payment_url    │       │
//! │  │  name, category │   │  name           │   │  bank (key)     │       │
//! │  │  price (whole)  │   │  icon           │   │  amount         │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────────────────────────────┐     │
//! │  │   SessionId     │   │  BankDirectory (ordered key → Bank)     │     │
//! │  │  <millis><b36>  │   │  order = order returned by the backend  │     │
//! │  └─────────────────┘   └─────────────────────────────────────────┘     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Products and banks are read-only snapshots of backend data. The core never
//! mutates them; it only copies them into cart items and QR payments.

use std::fmt;

use chrono::Utc;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::ValidationError;
use crate::validation::ValidationResult;

// =============================================================================
// Product
// =============================================================================

/// A catalog product as served by the backend.
///
/// Prices are whole currency units (rubles); there is no minor unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    /// Stable unique identifier.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Category label used by the catalog filter.
    pub category: String,

    /// Price in whole currency units, never negative.
    pub price: i64,

    /// One-line description shown on product cards.
    pub short_description: String,

    /// Long description shown on the product page.
    pub full_description: String,

    /// Delivery estimate for display (e.g. "1-2 дня").
    pub delivery_time: String,

    /// Display glyph.
    pub icon: String,

    /// Optional illustration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    #[serde(default)]
    pub features: Vec<String>,

    #[serde(default)]
    pub technologies: Vec<String>,
}

// =============================================================================
// Session Id
// =============================================================================

/// Opaque per-profile session identifier.
///
/// Format: milliseconds since the Unix epoch followed by a 9 character
/// base-36 random suffix, e.g. `1718000000000k3j9x0a1b`. It is a correlation
/// key for optional server-side cart storage, never a security token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SessionId(String);

impl SessionId {
    /// Length of the random suffix.
    pub const SUFFIX_LEN: usize = 9;

    /// Generates a fresh identifier from the wall clock and a random UUID.
    pub fn generate() -> Self {
        Self::from_parts(Utc::now().timestamp_millis(), Uuid::new_v4().as_u128())
    }

    /// Builds an identifier from a timestamp and an entropy source.
    ///
    /// Deterministic, so id formatting can be tested without a clock.
    pub fn from_parts(millis: i64, entropy: u128) -> Self {
        let mut suffix = String::with_capacity(Self::SUFFIX_LEN);
        let mut rest = entropy;
        for _ in 0..Self::SUFFIX_LEN {
            let digit = (rest % 36) as u32;
            suffix.push(char::from_digit(digit, 36).unwrap_or('0'));
            rest /= 36;
        }
        SessionId(format!("{millis}{suffix}"))
    }

    /// Parses a persisted or externally supplied identifier.
    ///
    /// The id ends up in a URL path (`/cart/{session_id}`), so it must be
    /// non-empty and made of URL-safe characters only.
    pub fn parse(raw: &str) -> ValidationResult<Self> {
        let raw = raw.trim();

        if raw.is_empty() {
            return Err(ValidationError::Required {
                field: "session id".to_string(),
            });
        }

        if !raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ValidationError::InvalidFormat {
                field: "session id".to_string(),
                reason: "must contain only letters, digits, hyphens and underscores".to_string(),
            });
        }

        Ok(SessionId(raw.to_string()))
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Banks
// =============================================================================

/// A payment provider that can issue QR payments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Bank {
    /// Stable key used in QR requests (e.g. "sovcombank").
    pub key: String,
    /// Display name.
    pub name: String,
    /// Display glyph.
    pub icon: String,
}

/// Ordered bank directory.
///
/// The backend returns `{"sovcombank": {"name": ..., "icon": ...}, ...}` and
/// the first entry is the default selection, so entry order is significant
/// and is preserved exactly as received.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BankDirectory {
    banks: Vec<Bank>,
}

/// Key of the bank used when the directory cannot be loaded.
pub const FALLBACK_BANK_KEY: &str = "sovcombank";

impl BankDirectory {
    /// Creates a directory from banks in display order.
    ///
    /// A repeated key replaces the earlier entry's metadata in place.
    pub fn new(banks: impl IntoIterator<Item = Bank>) -> Self {
        let mut directory = BankDirectory::default();
        for bank in banks {
            directory.insert(bank);
        }
        directory
    }

    /// The single-entry directory used when the backend is unreachable.
    pub fn fallback() -> Self {
        BankDirectory::new([Bank {
            key: FALLBACK_BANK_KEY.to_string(),
            name: "Совкомбанк".to_string(),
            icon: "🏦".to_string(),
        }])
    }

    fn insert(&mut self, bank: Bank) {
        match self.banks.iter_mut().find(|b| b.key == bank.key) {
            Some(existing) => *existing = bank,
            None => self.banks.push(bank),
        }
    }

    /// Returns the default selection (first entry).
    pub fn first(&self) -> Option<&Bank> {
        self.banks.first()
    }

    /// Looks up a bank by key.
    pub fn get(&self, key: &str) -> Option<&Bank> {
        self.banks.iter().find(|b| b.key == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Iterates banks in directory order.
    pub fn iter(&self) -> impl Iterator<Item = &Bank> {
        self.banks.iter()
    }

    /// Bank keys in directory order.
    pub fn keys(&self) -> Vec<&str> {
        self.banks.iter().map(|b| b.key.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.banks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.banks.is_empty()
    }
}

/// Wire shape of a directory entry (the key lives in the map).
#[derive(Serialize, Deserialize)]
struct BankEntry {
    name: String,
    icon: String,
}

impl Serialize for BankDirectory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.banks.len()))?;
        for bank in &self.banks {
            map.serialize_entry(
                &bank.key,
                &BankEntry {
                    name: bank.name.clone(),
                    icon: bank.icon.clone(),
                },
            )?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for BankDirectory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DirectoryVisitor;

        impl<'de> Visitor<'de> for DirectoryVisitor {
            type Value = BankDirectory;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of bank key to {name, icon}")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut directory = BankDirectory::default();
                while let Some((key, entry)) = access.next_entry::<String, BankEntry>()? {
                    directory.insert(Bank {
                        key,
                        name: entry.name,
                        icon: entry.icon,
                    });
                }
                Ok(directory)
            }
        }

        deserializer.deserialize_map(DirectoryVisitor)
    }
}

// =============================================================================
// QR Payment
// =============================================================================

/// A QR payment artifact returned by the backend for a bank + amount.
///
/// `payment_url` is opaque: the presentation layer encodes it into a QR
/// image and offers it as an "open in the bank app" link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct QrPayment {
    #[serde(rename = "qr_url")]
    pub payment_url: String,
    /// Bank key echoed by the backend.
    pub bank: String,
    /// Amount echoed by the backend, whole currency units.
    pub amount: i64,
}

/// External service that renders a payment URL as a QR image.
pub const QR_IMAGE_SERVICE: &str = "https://api.qrserver.com/v1/create-qr-code/";

impl QrPayment {
    /// URL of a `size`×`size` QR image encoding the payment URL.
    pub fn image_url(&self, size: u32) -> String {
        let data: String = url::form_urlencoded::byte_serialize(self.payment_url.as_bytes()).collect();
        format!("{QR_IMAGE_SERVICE}?size={size}x{size}&data={data}")
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_wire_format_is_camel_case() {
        let json = r#"{
            "id": "p-1",
            "name": "Визитка сайт",
            "category": "Веб-разработка",
            "price": 5000,
            "shortDescription": "short",
            "fullDescription": "full",
            "deliveryTime": "3-5 дней",
            "icon": "💼",
            "imageUrl": null,
            "features": ["Адаптивный дизайн"],
            "technologies": ["HTML5", "CSS3"]
        }"#;

        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.short_description, "short");
        assert_eq!(product.delivery_time, "3-5 дней");
        assert_eq!(product.image_url, None);
        assert_eq!(product.technologies, vec!["HTML5", "CSS3"]);

        let value = serde_json::to_value(&product).unwrap();
        assert!(value.get("fullDescription").is_some());
        assert!(value.get("imageUrl").is_none());
    }

    #[test]
    fn test_session_id_format() {
        let id = SessionId::from_parts(1_718_000_000_000, 0);
        assert_eq!(id.as_str(), "1718000000000000000000");

        let id = SessionId::from_parts(1_718_000_000_000, 35);
        assert_eq!(id.as_str(), "1718000000000z00000000");
    }

    #[test]
    fn test_generated_session_ids_differ() {
        let a = SessionId::generate();
        let b = SessionId::generate();
        assert_ne!(a, b);
        assert!(SessionId::parse(a.as_str()).is_ok());
    }

    #[test]
    fn test_session_id_parse() {
        assert!(SessionId::parse("1718000000000abc123xyz").is_ok());
        assert!(SessionId::parse("").is_err());
        assert!(SessionId::parse("   ").is_err());
        assert!(SessionId::parse("../etc").is_err());
    }

    #[test]
    fn test_bank_directory_preserves_wire_order() {
        let json = r#"{
            "tbank": {"name": "Т-Банк", "icon": "⚡"},
            "sovcombank": {"name": "Совкомбанк", "icon": "🏦"},
            "sber": {"name": "Сбер", "icon": "💚"}
        }"#;

        let directory: BankDirectory = serde_json::from_str(json).unwrap();
        assert_eq!(directory.keys(), vec!["tbank", "sovcombank", "sber"]);
        assert_eq!(directory.first().unwrap().name, "Т-Банк");
        assert_eq!(directory.get("sber").unwrap().icon, "💚");

        let back = serde_json::to_string(&directory).unwrap();
        let again: BankDirectory = serde_json::from_str(&back).unwrap();
        assert_eq!(again, directory);
    }

    #[test]
    fn test_fallback_directory() {
        let directory = BankDirectory::fallback();
        assert_eq!(directory.len(), 1);
        assert_eq!(directory.first().unwrap().key, FALLBACK_BANK_KEY);
    }

    #[test]
    fn test_qr_payment_wire_format() {
        let payment: QrPayment = serde_json::from_str(
            r#"{"qr_url": "https://qr.nspk.ru/AD20", "bank": "sovcombank", "amount": 500}"#,
        )
        .unwrap();
        assert_eq!(payment.payment_url, "https://qr.nspk.ru/AD20");
        assert_eq!(payment.amount, 500);
    }

    #[test]
    fn test_qr_image_url_encodes_payment_url() {
        let payment = QrPayment {
            payment_url: "https://qr.nspk.ru/AD20?type=02&sum=500".to_string(),
            bank: "sovcombank".to_string(),
            amount: 500,
        };

        assert_eq!(
            payment.image_url(200),
            "https://api.qrserver.com/v1/create-qr-code/?size=200x200\
             &data=https%3A%2F%2Fqr.nspk.ru%2FAD20%3Ftype%3D02%26sum%3D500"
        );
    }
}
