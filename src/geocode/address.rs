use serde::{Deserialize, Serialize};

/// Structured address as returned by the gateway (Nominatim `address` object),
/// plus the place's human-readable label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressFields {
    pub display_name: Option<String>,
    pub house_number: Option<String>,
    pub road: Option<String>,
    pub neighbourhood: Option<String>,
    pub suburb: Option<String>,
    pub city: Option<String>,
    pub town: Option<String>,
    pub village: Option<String>,
    pub state: Option<String>,
    pub postcode: Option<String>,
    pub country: Option<String>,
    pub country_code: Option<String>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl AddressFields {
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn display_name(&self) -> Option<&str> {
        present(&self.display_name)
    }

    /// First address line: "house_number road", falling back to the
    /// neighbourhood, the suburb and finally the full label.
    pub fn line1(&self) -> String {
        let street = [present(&self.house_number), present(&self.road)]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        if !street.is_empty() {
            return street;
        }

        present(&self.neighbourhood)
            .or_else(|| present(&self.suburb))
            .or_else(|| self.display_name())
            .unwrap_or_default()
            .to_string()
    }

    /// City, town or village, whichever the gateway filled in first
    pub fn locality(&self) -> Option<&str> {
        present(&self.city)
            .or_else(|| present(&self.town))
            .or_else(|| present(&self.village))
    }

    pub fn state(&self) -> Option<&str> {
        present(&self.state)
    }

    pub fn postal_code(&self) -> Option<&str> {
        present(&self.postcode)
    }

    pub fn country(&self) -> Option<&str> {
        present(&self.country)
    }

    /// No label and no structured component at all
    pub fn is_empty(&self) -> bool {
        [
            &self.display_name,
            &self.house_number,
            &self.road,
            &self.neighbourhood,
            &self.suburb,
            &self.city,
            &self.town,
            &self.village,
            &self.state,
            &self.postcode,
            &self.country,
        ]
        .into_iter()
        .all(|field| present(field).is_none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connaught_place() -> AddressFields {
        serde_json::from_value(serde_json::json!({
            "house_number": "12",
            "road": "Janpath",
            "suburb": "Connaught Place",
            "city": "New Delhi",
            "state": "Delhi",
            "postcode": "110001",
            "country": "India",
            "country_code": "in"
        }))
        .unwrap()
    }

    #[test]
    fn test_line1_prefers_street() {
        assert_eq!(connaught_place().line1(), "12 Janpath");

        let no_number = AddressFields {
            house_number: None,
            ..connaught_place()
        };
        assert_eq!(no_number.line1(), "Janpath");
    }

    #[test]
    fn test_line1_fallbacks() {
        let suburb_only = AddressFields {
            suburb: Some("Connaught Place".into()),
            ..Default::default()
        };
        assert_eq!(suburb_only.line1(), "Connaught Place");

        let label_only = AddressFields::default().with_display_name("Somewhere, India");
        assert_eq!(label_only.line1(), "Somewhere, India");

        assert_eq!(AddressFields::default().line1(), "");
    }

    #[test]
    fn test_locality_order() {
        let town = AddressFields {
            town: Some("Gurugram".into()),
            village: Some("Sikanderpur".into()),
            ..Default::default()
        };
        assert_eq!(town.locality(), Some("Gurugram"));
        assert_eq!(connaught_place().locality(), Some("New Delhi"));
        assert_eq!(connaught_place().postal_code(), Some("110001"));
    }

    #[test]
    fn test_blank_fields_count_as_missing() {
        let blank = AddressFields {
            road: Some("  ".into()),
            city: Some(String::new()),
            ..Default::default()
        };
        assert!(blank.is_empty());
        assert!(!connaught_place().is_empty());
    }
}
