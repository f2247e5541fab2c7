//! Command handlers. Each returns a value whose `Display` is the text
//! printed on stdout.

use std::fmt;

use anyhow::{Context, Result, anyhow};
use itbi_core::{
    Property, PropertyForm, PropertyRepository, RateTable, RepositoryError, StateCode,
    calculations::{
        EntryMode, ItbiCalculator, ItbiError, ItbiInput, ItbiResult, TaxCalculationInput,
        VenalEstimateInput, VenalItbiResult, checked_calculate, compute_tax_strict, format_brl,
        format_percent, parse_locale_number, try_estimate_and_compute,
    },
    db::RepositoryRegistry,
};
use itbi_db_sqlite::SqliteRepositoryFactory;
use rust_decimal::Decimal;
use tracing::debug;

use crate::{
    cli::{CalcArgs, Command, PropertyCommand, PropertyFields, RateArgs, VenalArgs},
    config::AppConfig,
    utils::{format_area, parse_factor, parse_rate},
};

/// Every storage backend this binary can open.
pub fn build_registry() -> RepositoryRegistry {
    RepositoryRegistry::new().with_factory(Box::new(SqliteRepositoryFactory))
}

/// Runs one command against the resolved configuration.
pub async fn execute(
    command: Command,
    config: &AppConfig,
) -> Result<Box<dyn fmt::Display>> {
    let output: Box<dyn fmt::Display> = match command {
        Command::Calc(args) => Box::new(run_calc(&args, &config.rate_table()?)?),
        Command::Venal(args) => Box::new(run_venal(&args, &config.rate_table()?)?),
        Command::States => Box::new(StatesReport(config.rate_table()?)),
        Command::Property(command) => {
            let db_config = config.db_config();
            debug!(backend = %db_config.backend, "opening property register");
            let repo = build_registry()
                .create(&db_config)
                .await
                .with_context(|| {
                    format!("cannot open database '{}'", db_config.connection_string)
                })?;
            run_property(command, &*repo).await?
        }
    };
    Ok(output)
}

// ─── rates ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RateSource {
    Explicit(Decimal),
    State(StateCode),
}

impl RateSource {
    fn from_args(args: &RateArgs) -> Result<Self> {
        match (&args.rate, &args.state) {
            (Some(rate), _) => Ok(Self::Explicit(parse_rate(rate)?)),
            (None, Some(state)) => StateCode::parse(state)
                .map(Self::State)
                .ok_or_else(|| anyhow!("unknown state '{state}'")),
            (None, None) => Err(ItbiError::MissingRate.into()),
        }
    }

    fn rate(
        self,
        rates: &RateTable,
    ) -> Option<Decimal> {
        match self {
            Self::Explicit(rate) => Some(rate),
            Self::State(state) => rates.rate_for(state),
        }
    }

    fn state(self) -> Option<StateCode> {
        match self {
            Self::State(state) => Some(state),
            Self::Explicit(_) => None,
        }
    }
}

// ─── calc ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalcReport {
    pub state: Option<StateCode>,
    pub input: ItbiInput,
    pub rate: Decimal,
    pub result: ItbiResult,
}

pub fn run_calc(
    args: &CalcArgs,
    rates: &RateTable,
) -> Result<CalcReport> {
    let mode = if args.cents {
        EntryMode::CentsEntry
    } else {
        EntryMode::DecimalString
    };
    let input = ItbiInput {
        transaction_value: mode.parse(&args.transaction),
        assessed_value: mode.parse(&args.assessed),
    };
    let source = RateSource::from_args(&args.rate)?;
    let rate = source.rate(rates);

    let result = match source {
        RateSource::State(state) if args.strict => {
            ItbiCalculator::new(rates).calculate_for_state(state, &input)?
        }
        RateSource::Explicit(_) if args.strict => compute_tax_strict(&input, rate)?,
        _ => checked_calculate(&TaxCalculationInput {
            transaction_value: input.transaction_value,
            assessed_value: input.assessed_value,
            rate: rate.unwrap_or(Decimal::ZERO),
        })?,
    };

    Ok(CalcReport {
        state: source.state(),
        input,
        rate: rate.unwrap_or(Decimal::ZERO),
        result,
    })
}

impl fmt::Display for CalcReport {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        if let Some(state) = self.state {
            writeln!(f, "State:             {} ({state})", state.name())?;
        }
        writeln!(f, "Transaction value: {}", format_brl(self.input.transaction_value))?;
        writeln!(f, "Assessed value:    {}", format_brl(self.input.assessed_value))?;
        writeln!(f, "Taxable base:      {}", format_brl(self.result.taxable_base))?;
        writeln!(f, "Rate:              {}", format_percent(self.rate))?;
        write!(f, "ITBI due:          {}", format_brl(self.result.tax_amount))
    }
}

// ─── venal ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VenalReport {
    pub state: Option<StateCode>,
    pub estimate: VenalEstimateInput,
    pub transaction_value: Decimal,
    pub rate: Decimal,
    pub result: VenalItbiResult,
}

pub fn run_venal(
    args: &VenalArgs,
    rates: &RateTable,
) -> Result<VenalReport> {
    let estimate = VenalEstimateInput {
        built_area: parse_locale_number(&args.built_area),
        price_per_sqm_built: parse_locale_number(&args.built_price),
        land_area: parse_locale_number(&args.land_area),
        price_per_sqm_land: parse_locale_number(&args.land_price),
        correction_factor: parse_factor(args.factor.as_deref())?,
    };
    let transaction_value = parse_locale_number(&args.transaction);

    let source = RateSource::from_args(&args.rate)?;
    let rate = match source {
        RateSource::State(state) => source
            .rate(rates)
            .ok_or(ItbiError::UnknownStateRate(state))?,
        RateSource::Explicit(rate) => rate,
    };

    Ok(VenalReport {
        state: source.state(),
        estimate,
        transaction_value,
        rate,
        result: try_estimate_and_compute(&estimate, transaction_value, rate)?,
    })
}

impl fmt::Display for VenalReport {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let e = &self.estimate;
        writeln!(
            f,
            "Built:             {} × {}",
            format_area(e.built_area),
            format_brl(e.price_per_sqm_built)
        )?;
        writeln!(
            f,
            "Land:              {} × {}",
            format_area(e.land_area),
            format_brl(e.price_per_sqm_land)
        )?;
        writeln!(f, "Correction factor: {}", e.correction_factor.normalize())?;
        writeln!(f, "Venal value:       {}", format_brl(self.result.assessed_value))?;
        writeln!(f, "Transaction value: {}", format_brl(self.transaction_value))?;
        writeln!(f, "Taxable base:      {}", format_brl(self.result.taxable_base))?;
        match self.state {
            Some(state) => {
                writeln!(f, "Rate:              {} ({state})", format_percent(self.rate))?
            }
            None => writeln!(f, "Rate:              {}", format_percent(self.rate))?,
        }
        write!(f, "ITBI due:          {}", format_brl(self.result.tax_amount))
    }
}

// ─── states ──────────────────────────────────────────────────────────────────

pub struct StatesReport(pub RateTable);

impl fmt::Display for StatesReport {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "UF  {:<20}  Rate", "State")?;
        for jurisdiction in self.0.iter() {
            let rate = jurisdiction
                .rate
                .map(format_percent)
                .unwrap_or_else(|| "-".to_string());
            write!(f, "\n{}  {:<20}  {rate}", jurisdiction.code, jurisdiction.name)?;
        }
        Ok(())
    }
}

// ─── property register ───────────────────────────────────────────────────────

pub struct PropertyReport(pub Property);

impl fmt::Display for PropertyReport {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let p = &self.0;
        writeln!(f, "Property #{}", p.id)?;
        writeln!(f, "  Type:         {}", p.property_type)?;
        writeln!(f, "  Address:      {}", p.address)?;
        writeln!(f, "  Neighborhood: {}", p.neighborhood)?;
        writeln!(f, "  City:         {} - {}", p.city, p.state)?;
        writeln!(f, "  Area:         {}", format_area(p.area))?;
        writeln!(f, "  Owner:        {} (CPF {})", p.owner, p.cpf)?;
        write!(
            f,
            "  Updated:      {}",
            p.updated_at.format("%d/%m/%Y %H:%M")
        )
    }
}

pub struct PropertyListReport(pub Vec<Property>);

impl fmt::Display for PropertyListReport {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "No properties registered.");
        }
        for (i, p) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(
                f,
                "#{:<4} {:<15} {}, {} - {} ({}) - {}",
                p.id,
                p.property_type.label(),
                p.address,
                p.city,
                p.state,
                format_area(p.area),
                p.owner
            )?;
        }
        Ok(())
    }
}

pub async fn add_property(
    repo: &dyn PropertyRepository,
    fields: &PropertyFields,
) -> Result<Property> {
    let property = fields.to_form().validate().context("invalid property")?;
    Ok(repo.create_property(property).await?)
}

/// Loads the record, overlays the given fields and validates the result.
pub async fn edit_property(
    repo: &dyn PropertyRepository,
    id: i64,
    fields: &PropertyFields,
) -> Result<Property> {
    let mut property = get_property(repo, id).await?;

    let mut form = PropertyForm::from(&property);
    fields.apply_to(&mut form);
    let update = form.validate().context("invalid property")?;

    property.apply(update);
    repo.update_property(&property).await?;
    get_property(repo, id).await
}

pub async fn get_property(
    repo: &dyn PropertyRepository,
    id: i64,
) -> Result<Property> {
    repo.get_property(id).await.map_err(|e| not_found(e, id))
}

pub async fn list_properties(
    repo: &dyn PropertyRepository,
    state: Option<&str>,
) -> Result<Vec<Property>> {
    let state = state
        .map(|s| StateCode::parse(s).ok_or_else(|| anyhow!("unknown state '{s}'")))
        .transpose()?;
    Ok(repo.list_properties(state).await?)
}

pub async fn delete_property(
    repo: &dyn PropertyRepository,
    id: i64,
) -> Result<()> {
    repo.delete_property(id).await.map_err(|e| not_found(e, id))
}

fn not_found(
    error: RepositoryError,
    id: i64,
) -> anyhow::Error {
    match error {
        RepositoryError::NotFound => anyhow!("property {id} not found"),
        other => other.into(),
    }
}

pub async fn run_property(
    command: PropertyCommand,
    repo: &dyn PropertyRepository,
) -> Result<Box<dyn fmt::Display>> {
    let output: Box<dyn fmt::Display> = match command {
        PropertyCommand::Add(fields) => {
            Box::new(PropertyReport(add_property(repo, &fields).await?))
        }
        PropertyCommand::List { state } => Box::new(PropertyListReport(
            list_properties(repo, state.as_deref()).await?,
        )),
        PropertyCommand::Show { id } => Box::new(PropertyReport(get_property(repo, id).await?)),
        PropertyCommand::Edit { id, fields } => {
            Box::new(PropertyReport(edit_property(repo, id, &fields).await?))
        }
        PropertyCommand::Delete { id } => {
            delete_property(repo, id).await?;
            Box::new(format!("Property {id} deleted."))
        }
    };
    Ok(output)
}
