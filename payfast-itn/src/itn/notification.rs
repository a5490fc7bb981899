//! Decoded ITN form body.
//!
//! Payfast posts `application/x-www-form-urlencoded` data. Fields are kept in
//! a `BTreeMap` so iteration order is already the sorted key order the
//! signature requires. Ordering is byte-wise over the UTF-8 key, which agrees
//! with a UTF-16 code unit sort for the ASCII field names Payfast sends.

use std::collections::BTreeMap;

use url::form_urlencoded;

use crate::error::ItnError;

/// Field carrying the claimed checksum.
pub const FIELD_SIGNATURE: &str = "signature";
/// Payment status field.
pub const FIELD_PAYMENT_STATUS: &str = "payment_status";
/// Caller-supplied application reference.
pub const FIELD_REFERENCE_ID: &str = "custom_str1";
pub const FIELD_EMAIL: &str = "email_address";
pub const FIELD_NAME_FIRST: &str = "name_first";
pub const FIELD_NAME_LAST: &str = "name_last";
pub const FIELD_AMOUNT_FEE: &str = "amount_fee";
pub const FIELD_PAYFAST_PAYMENT_ID: &str = "pf_payment_id";

/// The only status that is forwarded to the relay.
pub const PAYMENT_STATUS_COMPLETE: &str = "COMPLETE";

/// An inbound notification: field name to decoded value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Notification {
    fields: BTreeMap<String, String>,
}

impl Notification {
    /// Decode a raw form body.
    ///
    /// A key that appears more than once is rejected, since the provider
    /// never sends repeated fields and there is no single value to sign.
    pub fn parse(raw_body: &str) -> Result<Self, ItnError> {
        let mut fields = BTreeMap::new();

        for (key, value) in form_urlencoded::parse(raw_body.as_bytes()) {
            if fields.contains_key(&*key) {
                return Err(ItnError::MalformedRequest(format!(
                    "duplicate field '{}'",
                    key
                )));
            }
            fields.insert(key.into_owned(), value.into_owned());
        }

        Ok(Self { fields })
    }

    /// Raw value of a field, including empty strings.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Value of a field, treating the empty string as absent.
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    pub fn signature(&self) -> Option<&str> {
        self.get_non_empty(FIELD_SIGNATURE)
    }

    pub fn payment_status(&self) -> Option<&str> {
        self.get(FIELD_PAYMENT_STATUS)
    }

    pub fn reference_id(&self) -> Option<&str> {
        self.get_non_empty(FIELD_REFERENCE_ID)
    }

    /// Whether the payment reached the terminal `COMPLETE` state.
    pub fn is_complete(&self) -> bool {
        self.payment_status() == Some(PAYMENT_STATUS_COMPLETE)
    }

    /// Fields in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Notification
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
