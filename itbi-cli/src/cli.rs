use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use itbi_core::PropertyForm;

// ─── CLI definition ──────────────────────────────────────────────────────────

/// ITBI (property-transfer tax) calculator and property register.
///
/// Amounts are written the Brazilian way: `250.000,00`, optionally with
/// an `R$` prefix. Rates accept either `3,2` or `3.2`.
#[derive(Debug, Parser)]
#[command(name = "itbi", version)]
pub struct Cli {
    /// Configuration file (TOML). Defaults to `$ITBI_CONFIG`, then `./itbi.toml`.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Database backend to use.
    #[arg(long, global = true)]
    pub backend: Option<String>,

    /// Database connection string.
    /// For SQLite this is a file path (e.g. `itbi.db`) or `:memory:`.
    #[arg(long, global = true)]
    pub db: Option<String>,

    /// Log filter, e.g. `debug` or `info,itbi_core=trace`.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Calculate the ITBI due on a transfer.
    Calc(CalcArgs),

    /// Estimate the venal value from areas and m² prices, then calculate the ITBI.
    Venal(VenalArgs),

    /// List every state with its ITBI rate.
    States,

    /// Manage registered properties.
    #[command(subcommand)]
    Property(PropertyCommand),
}

/// Either an explicit rate or the state whose rate to use.
#[derive(Debug, Clone, Args)]
#[group(required = true, multiple = false)]
pub struct RateArgs {
    /// Rate as a percentage, e.g. `2` or `3,2`.
    #[arg(long)]
    pub rate: Option<String>,

    /// State (UF) whose configured rate applies, e.g. `SP`.
    #[arg(long)]
    pub state: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct CalcArgs {
    /// Transaction (declared sale) value.
    #[arg(long)]
    pub transaction: String,

    /// Assessed (venal) value.
    #[arg(long)]
    pub assessed: String,

    #[command(flatten)]
    pub rate: RateArgs,

    /// Read amounts as typed digits in cents (`12345` is R$ 123,45).
    #[arg(long)]
    pub cents: bool,

    /// Refuse to calculate without a rate in (0, 100].
    #[arg(long)]
    pub strict: bool,
}

#[derive(Debug, Clone, Args)]
pub struct VenalArgs {
    /// Built area in m².
    #[arg(long)]
    pub built_area: String,

    /// Price per m² of construction.
    #[arg(long)]
    pub built_price: String,

    /// Land area in m².
    #[arg(long)]
    pub land_area: String,

    /// Price per m² of land.
    #[arg(long)]
    pub land_price: String,

    /// Correction factor applied to the estimate. Defaults to 1.
    #[arg(long)]
    pub factor: Option<String>,

    /// Transaction (declared sale) value.
    #[arg(long)]
    pub transaction: String,

    #[command(flatten)]
    pub rate: RateArgs,
}

#[derive(Debug, Subcommand)]
pub enum PropertyCommand {
    /// Register a new property.
    Add(PropertyFields),

    /// List registered properties.
    List {
        /// Only properties in this state (UF).
        #[arg(long)]
        state: Option<String>,
    },

    /// Show one property.
    Show { id: i64 },

    /// Change fields of a property. Omitted fields keep their value.
    Edit {
        id: i64,

        #[command(flatten)]
        fields: PropertyFields,
    },

    /// Delete a property.
    Delete { id: i64 },
}

/// Property fields as typed by the user; validated as a [`PropertyForm`].
#[derive(Debug, Clone, Default, Args)]
pub struct PropertyFields {
    /// Property type: casa, apartamento, terreno, sala_comercial, loja,
    /// chácara, predio, sitio, fazenda or outro.
    #[arg(long = "type")]
    pub property_type: Option<String>,

    #[arg(long)]
    pub address: Option<String>,

    #[arg(long)]
    pub neighborhood: Option<String>,

    #[arg(long)]
    pub city: Option<String>,

    /// State (UF), e.g. `SP`.
    #[arg(long)]
    pub state: Option<String>,

    /// Area in m², e.g. `85,5`.
    #[arg(long)]
    pub area: Option<String>,

    #[arg(long)]
    pub owner: Option<String>,

    #[arg(long)]
    pub cpf: Option<String>,
}

impl PropertyFields {
    /// Overwrites the form fields that were given.
    pub fn apply_to(
        &self,
        form: &mut PropertyForm,
    ) {
        let pairs = [
            (&self.property_type, &mut form.property_type),
            (&self.address, &mut form.address),
            (&self.neighborhood, &mut form.neighborhood),
            (&self.city, &mut form.city),
            (&self.state, &mut form.state),
            (&self.area, &mut form.area),
            (&self.owner, &mut form.owner),
            (&self.cpf, &mut form.cpf),
        ];
        for (value, slot) in pairs {
            if let Some(value) = value {
                *slot = value.clone();
            }
        }
    }

    pub fn to_form(&self) -> PropertyForm {
        let mut form = PropertyForm::default();
        self.apply_to(&mut form);
        form
    }
}
