//! Raw property form and its validation rules.
//!
//! The form holds exactly what the user typed. [`PropertyForm::validate`]
//! turns it into a [`NewProperty`] or reports every invalid field at once.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{NewProperty, Property, PropertyType, StateCode};
use crate::calculations::money::parse_locale_number;

/// Fields of the property form, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FormField {
    PropertyType,
    Address,
    Neighborhood,
    City,
    State,
    Area,
    Owner,
    Cpf,
}

impl FormField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PropertyType => "property_type",
            Self::Address => "address",
            Self::Neighborhood => "neighborhood",
            Self::City => "city",
            Self::State => "state",
            Self::Area => "area",
            Self::Owner => "owner",
            Self::Cpf => "cpf",
        }
    }
}

/// One message per invalid field, ordered by [`FormField`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{}", join_messages(.0))]
pub struct ValidationErrors(BTreeMap<FormField, String>);

fn join_messages(errors: &BTreeMap<FormField, String>) -> String {
    errors.values().cloned().collect::<Vec<_>>().join("; ")
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(
        &self,
        field: FormField,
    ) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = FormField> + '_ {
        self.0.keys().copied()
    }

    fn insert(
        &mut self,
        field: FormField,
        message: impl Into<String>,
    ) {
        self.0.insert(field, message.into());
    }
}

/// Property form as entered; every field is free text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyForm {
    pub property_type: String,
    pub address: String,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
    pub area: String,
    pub owner: String,
    pub cpf: String,
}

impl PropertyForm {
    /// Checks every field and builds the record to persist.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationErrors`] naming each field that is blank or
    /// unparseable. The area must contain a number greater than zero.
    pub fn validate(&self) -> Result<NewProperty, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let property_type = required(
            &mut errors,
            FormField::PropertyType,
            &self.property_type,
            "Property type",
        )
        .and_then(|raw| {
            let parsed = PropertyType::parse(raw);
            if parsed.is_none() {
                errors.insert(
                    FormField::PropertyType,
                    format!("Unknown property type '{raw}'"),
                );
            }
            parsed
        });

        let address = required(&mut errors, FormField::Address, &self.address, "Address");
        let neighborhood = required(
            &mut errors,
            FormField::Neighborhood,
            &self.neighborhood,
            "Neighborhood",
        );
        let city = required(&mut errors, FormField::City, &self.city, "City");

        let state = required(&mut errors, FormField::State, &self.state, "State").and_then(|raw| {
            let parsed = StateCode::parse(raw);
            if parsed.is_none() {
                errors.insert(FormField::State, format!("Unknown state '{raw}'"));
            }
            parsed
        });

        let area = required(&mut errors, FormField::Area, &self.area, "Area").and_then(|raw| {
            let area = parse_area(raw);
            if area.is_none() {
                errors.insert(FormField::Area, "Area must be a valid number");
            }
            area
        });

        let owner = required(&mut errors, FormField::Owner, &self.owner, "Owner");
        let cpf = required(&mut errors, FormField::Cpf, &self.cpf, "CPF");

        match (property_type, address, neighborhood, city, state, area, owner, cpf) {
            (
                Some(property_type),
                Some(address),
                Some(neighborhood),
                Some(city),
                Some(state),
                Some(area),
                Some(owner),
                Some(cpf),
            ) if errors.is_empty() => Ok(NewProperty {
                property_type,
                address: address.to_string(),
                neighborhood: neighborhood.to_string(),
                city: city.to_string(),
                state,
                area,
                owner: owner.to_string(),
                cpf: cpf.to_string(),
            }),
            _ => Err(errors),
        }
    }
}

impl From<&Property> for PropertyForm {
    /// Pre-fills the form for editing an existing record.
    fn from(property: &Property) -> Self {
        Self {
            property_type: property.property_type.as_str().to_string(),
            address: property.address.clone(),
            neighborhood: property.neighborhood.clone(),
            city: property.city.clone(),
            state: property.state.as_str().to_string(),
            area: property.area.normalize().to_string().replace('.', ","),
            owner: property.owner.clone(),
            cpf: property.cpf.clone(),
        }
    }
}

/// Returns the trimmed value, or records a "required" error when blank.
fn required<'a>(
    errors: &mut ValidationErrors,
    field: FormField,
    value: &'a str,
    label: &str,
) -> Option<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.insert(field, format!("{label} is required"));
        None
    } else {
        Some(trimmed)
    }
}

fn parse_area(raw: &str) -> Option<Decimal> {
    let looks_numeric = raw
        .chars()
        .all(|c| c.is_ascii_digit() || c == ',' || c == '.' || c.is_whitespace())
        && raw.chars().any(|c| c.is_ascii_digit());
    if !looks_numeric {
        return None;
    }
    let area = parse_locale_number(raw);
    (area > Decimal::ZERO).then_some(area)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn valid_form() -> PropertyForm {
        PropertyForm {
            property_type: "apartamento".to_string(),
            address: "Rua das Flores, 123".to_string(),
            neighborhood: "Centro".to_string(),
            city: "Curitiba".to_string(),
            state: "PR".to_string(),
            area: "85,5".to_string(),
            owner: "Maria Silva".to_string(),
            cpf: "123.456.789-00".to_string(),
        }
    }

    #[test]
    fn validate_builds_new_property() {
        let property = valid_form().validate().unwrap();

        assert_eq!(
            property,
            NewProperty {
                property_type: PropertyType::Apartment,
                address: "Rua das Flores, 123".to_string(),
                neighborhood: "Centro".to_string(),
                city: "Curitiba".to_string(),
                state: StateCode::PR,
                area: dec!(85.5),
                owner: "Maria Silva".to_string(),
                cpf: "123.456.789-00".to_string(),
            }
        );
    }

    #[test]
    fn validate_trims_text_fields() {
        let form = PropertyForm {
            city: "  Curitiba ".to_string(),
            state: " pr".to_string(),
            ..valid_form()
        };

        let property = form.validate().unwrap();

        assert_eq!(property.city, "Curitiba");
        assert_eq!(property.state, StateCode::PR);
    }

    #[test]
    fn validate_empty_form_reports_every_field() {
        let errors = PropertyForm::default().validate().unwrap_err();

        assert_eq!(errors.len(), 8);
        assert_eq!(errors.get(FormField::Address), Some("Address is required"));
        assert_eq!(errors.get(FormField::Cpf), Some("CPF is required"));
    }

    #[test]
    fn validate_whitespace_only_is_blank() {
        let form = PropertyForm {
            owner: "   ".to_string(),
            ..valid_form()
        };

        let errors = form.validate().unwrap_err();

        assert_eq!(errors.fields().collect::<Vec<_>>(), vec![FormField::Owner]);
    }

    #[test]
    fn validate_rejects_non_numeric_area() {
        let form = PropertyForm {
            area: "abc".to_string(),
            ..valid_form()
        };

        let errors = form.validate().unwrap_err();

        assert_eq!(errors.get(FormField::Area), Some("Area must be a valid number"));
    }

    #[test]
    fn validate_rejects_zero_area() {
        let form = PropertyForm {
            area: "0".to_string(),
            ..valid_form()
        };

        assert!(form.validate().unwrap_err().get(FormField::Area).is_some());
    }

    #[test]
    fn validate_rejects_unknown_state_and_type() {
        let form = PropertyForm {
            state: "XX".to_string(),
            property_type: "castelo".to_string(),
            ..valid_form()
        };

        let errors = form.validate().unwrap_err();

        assert_eq!(
            errors.fields().collect::<Vec<_>>(),
            vec![FormField::PropertyType, FormField::State]
        );
        assert_eq!(errors.get(FormField::State), Some("Unknown state 'XX'"));
    }

    #[test]
    fn validation_errors_display_joins_messages_in_field_order() {
        let form = PropertyForm {
            city: String::new(),
            address: String::new(),
            ..valid_form()
        };

        let errors = form.validate().unwrap_err();

        assert_eq!(errors.to_string(), "Address is required; City is required");
    }

    #[test]
    fn form_from_property_round_trips() {
        let now = Utc::now();
        let new = valid_form().validate().unwrap();
        let property = Property {
            id: 7,
            property_type: new.property_type,
            address: new.address.clone(),
            neighborhood: new.neighborhood.clone(),
            city: new.city.clone(),
            state: new.state,
            area: new.area,
            owner: new.owner.clone(),
            cpf: new.cpf.clone(),
            created_at: now,
            updated_at: now,
        };

        let form = PropertyForm::from(&property);

        assert_eq!(form.area, "85,5");
        assert_eq!(form.validate().unwrap(), new);
    }

    #[test]
    fn property_type_parse_accepts_ids_and_labels() {
        assert_eq!(PropertyType::parse("Casa"), Some(PropertyType::House));
        assert_eq!(PropertyType::parse("sala_comercial"), Some(PropertyType::Office));
        assert_eq!(PropertyType::parse("chacara"), Some(PropertyType::SmallFarm));
        assert_eq!(
            PropertyType::parse("Prédio Comercial"),
            Some(PropertyType::CommercialBuilding)
        );
        assert_eq!(PropertyType::parse("castelo"), None);
    }
}
