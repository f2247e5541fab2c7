use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Brazilian federative units (UF), keyed by their two-letter code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StateCode {
    AC,
    AL,
    AP,
    AM,
    BA,
    CE,
    DF,
    ES,
    GO,
    MA,
    MT,
    MS,
    MG,
    PA,
    PB,
    PR,
    PE,
    PI,
    RJ,
    RN,
    RS,
    RO,
    RR,
    SC,
    SP,
    SE,
    TO,
}

impl StateCode {
    const ALL: [StateCode; 27] = [
        Self::AC,
        Self::AL,
        Self::AP,
        Self::AM,
        Self::BA,
        Self::CE,
        Self::DF,
        Self::ES,
        Self::GO,
        Self::MA,
        Self::MT,
        Self::MS,
        Self::MG,
        Self::PA,
        Self::PB,
        Self::PR,
        Self::PE,
        Self::PI,
        Self::RJ,
        Self::RN,
        Self::RS,
        Self::RO,
        Self::RR,
        Self::SC,
        Self::SP,
        Self::SE,
        Self::TO,
    ];

    pub fn all() -> &'static [StateCode] {
        &Self::ALL
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AC => "AC",
            Self::AL => "AL",
            Self::AP => "AP",
            Self::AM => "AM",
            Self::BA => "BA",
            Self::CE => "CE",
            Self::DF => "DF",
            Self::ES => "ES",
            Self::GO => "GO",
            Self::MA => "MA",
            Self::MT => "MT",
            Self::MS => "MS",
            Self::MG => "MG",
            Self::PA => "PA",
            Self::PB => "PB",
            Self::PR => "PR",
            Self::PE => "PE",
            Self::PI => "PI",
            Self::RJ => "RJ",
            Self::RN => "RN",
            Self::RS => "RS",
            Self::RO => "RO",
            Self::RR => "RR",
            Self::SC => "SC",
            Self::SP => "SP",
            Self::SE => "SE",
            Self::TO => "TO",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::AC => "Acre",
            Self::AL => "Alagoas",
            Self::AP => "Amapá",
            Self::AM => "Amazonas",
            Self::BA => "Bahia",
            Self::CE => "Ceará",
            Self::DF => "Distrito Federal",
            Self::ES => "Espírito Santo",
            Self::GO => "Goiás",
            Self::MA => "Maranhão",
            Self::MT => "Mato Grosso",
            Self::MS => "Mato Grosso do Sul",
            Self::MG => "Minas Gerais",
            Self::PA => "Pará",
            Self::PB => "Paraíba",
            Self::PR => "Paraná",
            Self::PE => "Pernambuco",
            Self::PI => "Piauí",
            Self::RJ => "Rio de Janeiro",
            Self::RN => "Rio Grande do Norte",
            Self::RS => "Rio Grande do Sul",
            Self::RO => "Rondônia",
            Self::RR => "Roraima",
            Self::SC => "Santa Catarina",
            Self::SP => "São Paulo",
            Self::SE => "Sergipe",
            Self::TO => "Tocantins",
        }
    }

    /// Parses a UF code, ignoring case and surrounding whitespace.
    pub fn parse(s: &str) -> Option<Self> {
        let code = s.trim().to_ascii_uppercase();
        Self::ALL.iter().copied().find(|c| c.as_str() == code)
    }
}

impl std::fmt::Display for StateCode {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A state together with the ITBI rate configured for it, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jurisdiction {
    pub code: StateCode,
    pub name: String,
    /// Rate as a percentage (`2.5` means 2.5%). `None` when no rate is known.
    pub rate: Option<Decimal>,
}

/// Lookup table from UF to ITBI rate (percent).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateTable {
    rates: BTreeMap<StateCode, Decimal>,
}

impl RateTable {
    /// An empty table; every lookup returns `None`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reference rates shipped with the application, one per state.
    pub fn brazil_default() -> Self {
        use StateCode::*;

        let seed: [(StateCode, i64); 27] = [
            (AC, 20),
            (AL, 25),
            (AP, 30),
            (AM, 28),
            (BA, 22),
            (CE, 27),
            (DF, 35),
            (ES, 24),
            (GO, 26),
            (MA, 23),
            (MT, 30),
            (MS, 29),
            (MG, 21),
            (PA, 28),
            (PB, 25),
            (PR, 20),
            (PE, 26),
            (PI, 24),
            (RJ, 30),
            (RN, 27),
            (RS, 23),
            (RO, 29),
            (RR, 28),
            (SC, 22),
            (SP, 32),
            (SE, 25),
            (TO, 26),
        ];

        Self {
            rates: seed
                .into_iter()
                .map(|(code, tenths)| (code, Decimal::new(tenths, 1)))
                .collect(),
        }
    }

    pub fn rate_for(
        &self,
        code: StateCode,
    ) -> Option<Decimal> {
        self.rates.get(&code).copied()
    }

    /// Sets or replaces the rate for one state.
    pub fn set_rate(
        &mut self,
        code: StateCode,
        rate: Decimal,
    ) {
        self.rates.insert(code, rate);
    }

    pub fn jurisdiction(
        &self,
        code: StateCode,
    ) -> Jurisdiction {
        Jurisdiction {
            code,
            name: code.name().to_string(),
            rate: self.rate_for(code),
        }
    }

    /// Every state in UF order, including states without a rate.
    pub fn iter(&self) -> impl Iterator<Item = Jurisdiction> + '_ {
        let mut codes = StateCode::all().to_vec();
        codes.sort_unstable_by_key(|c| c.as_str());
        codes.into_iter().map(move |code| self.jurisdiction(code))
    }
}
