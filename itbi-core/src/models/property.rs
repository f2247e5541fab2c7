use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::StateCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyType {
    House,
    Apartment,
    Land,
    Office,
    Store,
    SmallFarm,
    CommercialBuilding,
    Ranch,
    Farm,
    Other,
}

impl PropertyType {
    const ALL: [PropertyType; 10] = [
        Self::House,
        Self::Apartment,
        Self::Land,
        Self::Office,
        Self::Store,
        Self::SmallFarm,
        Self::CommercialBuilding,
        Self::Ranch,
        Self::Farm,
        Self::Other,
    ];

    pub fn all() -> &'static [PropertyType] {
        &Self::ALL
    }

    /// Identifier stored in the database and accepted in CSV files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::House => "casa",
            Self::Apartment => "apartamento",
            Self::Land => "terreno",
            Self::Office => "sala_comercial",
            Self::Store => "loja",
            Self::SmallFarm => "chácara",
            Self::CommercialBuilding => "predio",
            Self::Ranch => "sitio",
            Self::Farm => "fazenda",
            Self::Other => "outro",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::House => "Casa",
            Self::Apartment => "Apartamento",
            Self::Land => "Terreno",
            Self::Office => "Sala Comercial",
            Self::Store => "Loja",
            Self::SmallFarm => "Chácara",
            Self::CommercialBuilding => "Prédio Comercial",
            Self::Ranch => "Sítio",
            Self::Farm => "Fazenda",
            Self::Other => "Outro",
        }
    }

    /// Parses an identifier or a display label, case-insensitively.
    /// `chacara` is accepted without the accent.
    pub fn parse(s: &str) -> Option<Self> {
        let needle = s.trim().to_lowercase();
        if needle == "chacara" {
            return Some(Self::SmallFarm);
        }
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == needle || t.label().to_lowercase() == needle)
    }
}

impl std::fmt::Display for PropertyType {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub id: i64,
    pub property_type: PropertyType,
    pub address: String,
    pub neighborhood: String,
    pub city: String,
    pub state: StateCode,
    /// Area in m².
    pub area: Decimal,
    /// Owner's name.
    pub owner: String,
    /// Owner's CPF (taxpayer id), stored as entered.
    pub cpf: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// For creating new properties (no id or timestamps)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProperty {
    pub property_type: PropertyType,
    pub address: String,
    pub neighborhood: String,
    pub city: String,
    pub state: StateCode,
    pub area: Decimal,
    pub owner: String,
    pub cpf: String,
}

impl Property {
    /// Replaces every editable field with the values of `update`,
    /// keeping the id and timestamps.
    pub fn apply(
        &mut self,
        update: NewProperty,
    ) {
        self.property_type = update.property_type;
        self.address = update.address;
        self.neighborhood = update.neighborhood;
        self.city = update.city;
        self.state = update.state;
        self.area = update.area;
        self.owner = update.owner;
        self.cpf = update.cpf;
    }
}
