//! Shipping address type.

use crate::CommerceError;
use serde::{Deserialize, Serialize};

/// Where an order is delivered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShippingAddress {
    /// Recipient name.
    pub full_name: String,
    /// Contact phone number.
    pub phone: String,
    /// Contact email.
    #[serde(default)]
    pub email: Option<String>,
    /// Address line 1.
    pub line1: String,
    /// Address line 2 (flat, landmark, etc.).
    #[serde(default)]
    pub line2: Option<String>,
    /// City.
    pub city: String,
    /// State.
    pub state: String,
    /// Postal/PIN code.
    pub postal_code: String,
    /// Country code (e.g., "IN").
    #[serde(default = "default_country")]
    pub country: String,
}

impl ShippingAddress {
    /// Check that every required field is filled in.
    pub fn validate(&self) -> Result<(), CommerceError> {
        let required = [
            ("full name", &self.full_name),
            ("phone", &self.phone),
            ("address line 1", &self.line1),
            ("city", &self.city),
            ("state", &self.state),
            ("postal code", &self.postal_code),
        ];
        for (label, value) in required {
            if value.trim().is_empty() {
                return Err(CommerceError::validation(format!(
                    "Shipping address {} is required",
                    label
                )));
            }
        }
        if !self
            .phone
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | ' ' | '-'))
        {
            return Err(CommerceError::validation("Phone number is not valid"));
        }
        Ok(())
    }

    /// Format as single line.
    pub fn one_line(&self) -> String {
        let mut parts = vec![self.line1.clone()];
        if let Some(ref line2) = self.line2 {
            parts.push(line2.clone());
        }
        parts.push(self.city.clone());
        parts.push(self.state.clone());
        parts.push(self.postal_code.clone());
        parts.push(self.country.clone());
        parts.join(", ")
    }
}

fn default_country() -> String {
    "IN".to_string()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn address() -> ShippingAddress {
        ShippingAddress {
            full_name: "Asha Rao".into(),
            phone: "+91 98450 00000".into(),
            email: None,
            line1: "12 MG Road".into(),
            line2: None,
            city: "Bengaluru".into(),
            state: "KA".into(),
            postal_code: "560001".into(),
            country: "IN".into(),
        }
    }

    #[test]
    fn test_valid_address() {
        assert!(address().validate().is_ok());
        assert_eq!(
            address().one_line(),
            "12 MG Road, Bengaluru, KA, 560001, IN"
        );
    }

    #[test]
    fn test_missing_field() {
        let mut a = address();
        a.city = " ".into();
        let err = a.validate().unwrap_err().to_string();
        assert!(err.contains("city"));
    }

    #[test]
    fn test_bad_phone() {
        let mut a = address();
        a.phone = "call me".into();
        assert!(a.validate().is_err());
    }
}
