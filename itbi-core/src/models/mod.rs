mod jurisdiction;
mod property;
mod property_form;

pub use jurisdiction::{Jurisdiction, RateTable, StateCode};
pub use property::{NewProperty, Property, PropertyType};
pub use property_form::{FormField, PropertyForm, ValidationErrors};
