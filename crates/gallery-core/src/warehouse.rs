//! Star-schema dimension and fact rows for the reporting warehouse.
//!
//! Facts reference dimensions through integer surrogate keys. Dates use the
//! conventional `YYYYMMDD` smart key so that reports can group by year
//! without joining `dim_date`.

use crate::artwork::Artwork;
use crate::exhibition::Exhibition;
use crate::insurance::Insurance;
use crate::loan::Loan;
use crate::restoration::Restoration;
use crate::visitor::Visit;
use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use uuid::Uuid;

/// Returns the `YYYYMMDD` key for a date.
pub fn date_key(date: NaiveDate) -> i32 {
    date.year() * 10_000 + date.month() as i32 * 100 + date.day() as i32
}

/// Extracts the year from a `YYYYMMDD` key.
pub fn year_of_key(key: i32) -> i32 {
    key / 10_000
}

/// Calendar dimension row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimDate {
    pub date_key: i32,
    pub full_date: NaiveDate,
    pub year: i32,
    pub quarter: i32,
    pub month: i32,
    pub day: i32,
    /// ISO day of week, Monday = 1.
    pub day_of_week: i32,
    pub month_name: String,
    pub is_weekend: bool,
}

impl DimDate {
    pub fn from_date(date: NaiveDate) -> Self {
        let month = date.month();
        let weekday = date.weekday();
        Self {
            date_key: date_key(date),
            full_date: date,
            year: date.year(),
            quarter: ((month - 1) / 3 + 1) as i32,
            month: month as i32,
            day: date.day() as i32,
            day_of_week: weekday.number_from_monday() as i32,
            month_name: month_name(month).to_string(),
            is_weekend: matches!(weekday, Weekday::Sat | Weekday::Sun),
        }
    }
}

fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        _ => "December",
    }
}

/// Artwork dimension row. The surrogate key is assigned on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimArtwork {
    pub artwork_key: i64,
    pub artwork_id: Uuid,
    pub title: String,
    pub artist: String,
    pub category: String,
    pub status: String,
    pub estimated_value: f64,
}

/// Exhibition dimension row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimExhibition {
    pub exhibition_key: i64,
    pub exhibition_id: Uuid,
    pub title: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactVisit {
    pub visit_id: Uuid,
    pub date_key: i32,
    pub exhibition_key: Option<i64>,
    pub ticket_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactLoan {
    pub loan_id: Uuid,
    pub artwork_key: i64,
    pub start_date_key: i32,
    pub status: String,
    pub direction: String,
    pub loan_fee: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactRestoration {
    pub restoration_id: Uuid,
    pub artwork_key: i64,
    pub start_date_key: i32,
    pub cost: f64,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactInsurance {
    pub insurance_id: Uuid,
    pub artwork_key: i64,
    pub provider: String,
    pub coverage_amount: f64,
    pub premium: f64,
    pub status: String,
}

/// Everything loaded by one full refresh.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WarehouseSnapshot {
    pub dates: Vec<DimDate>,
    pub artworks: Vec<DimArtwork>,
    pub exhibitions: Vec<DimExhibition>,
    pub visits: Vec<FactVisit>,
    pub loans: Vec<FactLoan>,
    pub restorations: Vec<FactRestoration>,
    pub insurances: Vec<FactInsurance>,
}

impl WarehouseSnapshot {
    /// Builds a snapshot from live operational rows.
    ///
    /// Surrogate keys start at 1 in input order. Loan, restoration and
    /// insurance facts whose artwork is not among `artworks` are skipped, and
    /// a visit to an unknown exhibition is kept without an exhibition key.
    pub fn build(
        artworks: &[Artwork],
        exhibitions: &[Exhibition],
        visits: &[Visit],
        loans: &[Loan],
        restorations: &[Restoration],
        insurances: &[Insurance],
    ) -> Self {
        let dim_artworks: Vec<DimArtwork> = artworks
            .iter()
            .zip(1_i64..)
            .map(|(artwork, key)| DimArtwork {
                artwork_key: key,
                artwork_id: artwork.id,
                title: artwork.title.clone(),
                artist: artwork.artist.clone(),
                category: artwork.category.clone(),
                status: artwork.status.as_db_str().to_string(),
                estimated_value: artwork.estimated_value,
            })
            .collect();
        let artwork_keys: HashMap<Uuid, i64> = dim_artworks
            .iter()
            .map(|dim| (dim.artwork_id, dim.artwork_key))
            .collect();

        let dim_exhibitions: Vec<DimExhibition> = exhibitions
            .iter()
            .zip(1_i64..)
            .map(|(exhibition, key)| DimExhibition {
                exhibition_key: key,
                exhibition_id: exhibition.id,
                title: exhibition.title.clone(),
                start_date: exhibition.start_date,
                end_date: exhibition.end_date,
                status: exhibition.status.as_db_str().to_string(),
            })
            .collect();
        let exhibition_keys: HashMap<Uuid, i64> = dim_exhibitions
            .iter()
            .map(|dim| (dim.exhibition_id, dim.exhibition_key))
            .collect();

        let mut days = BTreeSet::new();

        let fact_visits = visits
            .iter()
            .map(|visit| {
                days.insert(visit.visit_date);
                FactVisit {
                    visit_id: visit.id,
                    date_key: date_key(visit.visit_date),
                    exhibition_key: visit
                        .exhibition_id
                        .and_then(|id| exhibition_keys.get(&id).copied()),
                    ticket_price: visit.ticket_price,
                }
            })
            .collect();

        let fact_loans = loans
            .iter()
            .filter_map(|loan| {
                let artwork_key = *artwork_keys.get(&loan.artwork_id)?;
                days.insert(loan.start_date);
                Some(FactLoan {
                    loan_id: loan.id,
                    artwork_key,
                    start_date_key: date_key(loan.start_date),
                    status: loan.status.as_db_str().to_string(),
                    direction: loan.direction.as_db_str().to_string(),
                    loan_fee: loan.loan_fee,
                })
            })
            .collect();

        let fact_restorations = restorations
            .iter()
            .filter_map(|restoration| {
                let artwork_key = *artwork_keys.get(&restoration.artwork_id)?;
                days.insert(restoration.start_date);
                Some(FactRestoration {
                    restoration_id: restoration.id,
                    artwork_key,
                    start_date_key: date_key(restoration.start_date),
                    cost: restoration.cost,
                    status: restoration.status.as_db_str().to_string(),
                })
            })
            .collect();

        let fact_insurances = insurances
            .iter()
            .filter_map(|insurance| {
                let artwork_key = *artwork_keys.get(&insurance.artwork_id)?;
                Some(FactInsurance {
                    insurance_id: insurance.id,
                    artwork_key,
                    provider: insurance.provider.clone(),
                    coverage_amount: insurance.coverage_amount,
                    premium: insurance.premium,
                    status: insurance.status.as_db_str().to_string(),
                })
            })
            .collect();

        Self {
            dates: days.into_iter().map(DimDate::from_date).collect(),
            artworks: dim_artworks,
            exhibitions: dim_exhibitions,
            visits: fact_visits,
            loans: fact_loans,
            restorations: fact_restorations,
            insurances: fact_insurances,
        }
    }

    /// Total number of rows across all tables.
    pub fn row_count(&self) -> usize {
        self.dates.len()
            + self.artworks.len()
            + self.exhibitions.len()
            + self.visits.len()
            + self.loans.len()
            + self.restorations.len()
            + self.insurances.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_key() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(date_key(d), 20240309);
        assert_eq!(year_of_key(20240309), 2024);
    }

    #[test]
    fn test_dim_date_fields() {
        // 2024-03-09 is a Saturday
        let dim = DimDate::from_date(NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
        assert_eq!(dim.quarter, 1);
        assert_eq!(dim.month_name, "March");
        assert_eq!(dim.day_of_week, 6);
        assert!(dim.is_weekend);

        let dim = DimDate::from_date(NaiveDate::from_ymd_opt(2024, 10, 1).unwrap());
        assert_eq!(dim.quarter, 4);
        assert!(!dim.is_weekend);
    }

    #[test]
    fn test_build_assigns_keys_and_skips_orphans() {
        use crate::loan::LoanDirection;

        let day = |m, d| NaiveDate::from_ymd_opt(2024, m, d).unwrap();
        let artwork = Artwork::new("Storm", "Turner", "painting", 100.0);
        let exhibition = Exhibition::new("Sea", day(1, 1), day(3, 1));

        let mut visit = Visit::new(Uuid::new_v4(), day(2, 3), 12.5);
        visit.exhibition_id = Some(exhibition.id);
        let mut stray_visit = Visit::new(Uuid::new_v4(), day(2, 3), 8.0);
        stray_visit.exhibition_id = Some(Uuid::new_v4());

        let loan = Loan::new(artwork.id, "Tate", LoanDirection::Outgoing, day(5, 1), day(6, 1));
        let orphan = Loan::new(Uuid::new_v4(), "Met", LoanDirection::Outgoing, day(7, 1), day(8, 1));

        let snapshot = WarehouseSnapshot::build(
            &[artwork.clone()],
            &[exhibition],
            &[visit, stray_visit],
            &[loan, orphan],
            &[],
            &[],
        );

        assert_eq!(snapshot.artworks[0].artwork_key, 1);
        assert_eq!(snapshot.visits[0].exhibition_key, Some(1));
        assert_eq!(snapshot.visits[1].exhibition_key, None);
        assert_eq!(snapshot.loans.len(), 1);
        assert_eq!(snapshot.loans[0].artwork_key, 1);

        // 2024-02-03 appears once; the orphan loan's start date is not loaded.
        let keys: Vec<i32> = snapshot.dates.iter().map(|d| d.date_key).collect();
        assert_eq!(keys, vec![20240203, 20240501]);
        assert_eq!(snapshot.row_count(), 1 + 1 + 2 + 1 + 2);
    }
}
