//! Monthly registration records and the columns they expose.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// A numeric column of the record schema.
///
/// The `Display` form is the CSV header; the serde form is the snake case alias.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Id,
    Year,
    Month,
    Births,
    BoysBirthCertificates,
    GirlsBirthCertificates,
    Deaths,
    Marriages,
    Divorces,
    PaternityExaminations,
    Adoptions,
    NameChanges,
    TotalPopulation,
}

impl Column {
    pub const ALL: [Column; 13] = [
        Column::Id,
        Column::Year,
        Column::Month,
        Column::Births,
        Column::BoysBirthCertificates,
        Column::GirlsBirthCertificates,
        Column::Deaths,
        Column::Marriages,
        Column::Divorces,
        Column::PaternityExaminations,
        Column::Adoptions,
        Column::NameChanges,
        Column::TotalPopulation,
    ];

    /// The ten count columns, in outlier-policy order
    pub const MEASURES: [Column; 10] = [
        Column::Births,
        Column::BoysBirthCertificates,
        Column::GirlsBirthCertificates,
        Column::Deaths,
        Column::Marriages,
        Column::Divorces,
        Column::PaternityExaminations,
        Column::Adoptions,
        Column::NameChanges,
        Column::TotalPopulation,
    ];

    /// CSV header
    pub fn name(self) -> &'static str {
        match self {
            Column::Id => "ID",
            Column::Year => "Year",
            Column::Month => "Month",
            Column::Births => "StateRegistrationOfBirth",
            Column::BoysBirthCertificates => "NumberOfBirthCertificatesForBoys",
            Column::GirlsBirthCertificates => "NumberOfBirthCertificatesForGirls",
            Column::Deaths => "StateRegistrationOfDeath",
            Column::Marriages => "StateRegistrationOfMarriage",
            Column::Divorces => "StateRegistrationOfDivorce",
            Column::PaternityExaminations => "StateRegistrationOfPaternityExamination",
            Column::Adoptions => "StateRegistrationOfAdoption",
            Column::NameChanges => "StateRegistrationOfNameChange",
            Column::TotalPopulation => "TotalPopulationThisYear",
        }
    }

    pub fn alias(self) -> &'static str {
        match self {
            Column::Id => "id",
            Column::Year => "year",
            Column::Month => "month",
            Column::Births => "births",
            Column::BoysBirthCertificates => "boys_birth_certificates",
            Column::GirlsBirthCertificates => "girls_birth_certificates",
            Column::Deaths => "deaths",
            Column::Marriages => "marriages",
            Column::Divorces => "divorces",
            Column::PaternityExaminations => "paternity_examinations",
            Column::Adoptions => "adoptions",
            Column::NameChanges => "name_changes",
            Column::TotalPopulation => "total_population",
        }
    }

    pub fn is_measure(self) -> bool {
        !matches!(self, Column::Id | Column::Year | Column::Month)
    }
}

impl FromStr for Column {
    type Err = Error;

    fn from_str(s: &str) -> Result<Column, Error> {
        Column::ALL
            .iter()
            .copied()
            .find(|c| c.name() == s || c.alias() == s)
            .ok_or_else(|| Error::InvalidColumn(s.to_owned()))
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// One month of registrations. Empty CSV cells deserialize to `None`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "ID")]
    pub id: u64,
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Month")]
    pub month: u8,
    #[serde(rename = "StateRegistrationOfBirth")]
    pub births: Option<u64>,
    #[serde(rename = "NumberOfBirthCertificatesForBoys")]
    pub boys_birth_certificates: Option<u64>,
    #[serde(rename = "NumberOfBirthCertificatesForGirls")]
    pub girls_birth_certificates: Option<u64>,
    #[serde(rename = "StateRegistrationOfDeath")]
    pub deaths: Option<u64>,
    #[serde(rename = "StateRegistrationOfMarriage")]
    pub marriages: Option<u64>,
    #[serde(rename = "StateRegistrationOfDivorce")]
    pub divorces: Option<u64>,
    #[serde(rename = "StateRegistrationOfPaternityExamination")]
    pub paternity_examinations: Option<u64>,
    #[serde(rename = "StateRegistrationOfAdoption")]
    pub adoptions: Option<u64>,
    #[serde(rename = "StateRegistrationOfNameChange")]
    pub name_changes: Option<u64>,
    #[serde(rename = "TotalPopulationThisYear")]
    pub total_population: Option<u64>,
}

impl Record {
    /// Record with every measure missing
    pub fn empty(id: u64, year: i32, month: u8) -> Record {
        Record {
            id,
            year,
            month,
            births: None,
            boys_birth_certificates: None,
            girls_birth_certificates: None,
            deaths: None,
            marriages: None,
            divorces: None,
            paternity_examinations: None,
            adoptions: None,
            name_changes: None,
            total_population: None,
        }
    }

    /// Value of `column` as a float, `None` when missing
    pub fn get(&self, column: Column) -> Option<f64> {
        match column {
            Column::Id => Some(self.id as f64),
            Column::Year => Some(f64::from(self.year)),
            Column::Month => Some(f64::from(self.month)),
            _ => self.measure(column).map(|v| v as f64),
        }
    }

    /// Builder-style setter used to assemble records in code
    pub fn with(mut self, column: Column, value: u64) -> Record {
        if let Some(slot) = self.measure_mut(column) {
            *slot = Some(value);
        }
        self
    }

    fn measure(&self, column: Column) -> Option<u64> {
        match column {
            Column::Births => self.births,
            Column::BoysBirthCertificates => self.boys_birth_certificates,
            Column::GirlsBirthCertificates => self.girls_birth_certificates,
            Column::Deaths => self.deaths,
            Column::Marriages => self.marriages,
            Column::Divorces => self.divorces,
            Column::PaternityExaminations => self.paternity_examinations,
            Column::Adoptions => self.adoptions,
            Column::NameChanges => self.name_changes,
            Column::TotalPopulation => self.total_population,
            Column::Id | Column::Year | Column::Month => None,
        }
    }

    pub(crate) fn measure_mut(&mut self, column: Column) -> Option<&mut Option<u64>> {
        match column {
            Column::Births => Some(&mut self.births),
            Column::BoysBirthCertificates => Some(&mut self.boys_birth_certificates),
            Column::GirlsBirthCertificates => Some(&mut self.girls_birth_certificates),
            Column::Deaths => Some(&mut self.deaths),
            Column::Marriages => Some(&mut self.marriages),
            Column::Divorces => Some(&mut self.divorces),
            Column::PaternityExaminations => Some(&mut self.paternity_examinations),
            Column::Adoptions => Some(&mut self.adoptions),
            Column::NameChanges => Some(&mut self.name_changes),
            Column::TotalPopulation => Some(&mut self.total_population),
            Column::Id | Column::Year | Column::Month => None,
        }
    }
}
