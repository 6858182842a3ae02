//! # gallery-core
//!
//! Domain models, repositories and reporting for the gallery backend.
//!
//! This crate holds the collection and exhibition entities, the Oracle error
//! classification table, the report aggregation math, and (behind the
//! `database` feature) the sqlx repositories for the operational schema and
//! the reporting warehouse.

pub mod artwork;
pub mod error;
pub mod etl;
pub mod exhibition;
pub mod insurance;
pub mod loan;
pub mod oracle;
pub mod reports;
pub mod restoration;
pub mod staff;
pub mod visitor;
pub mod warehouse;

#[cfg(feature = "database")]
pub mod db;

pub use artwork::{Artwork, ArtworkStatus};
pub use error::DomainError;
pub use etl::{EtlSync, EtlSyncStatus};
pub use exhibition::{Exhibition, ExhibitionArtwork, ExhibitionStatus};
pub use insurance::{Insurance, InsuranceStatus};
pub use loan::{Loan, LoanDirection, LoanStatus};
pub use oracle::{classify, OraCategory, OraClassification};
pub use reports::{
    CollectionValueReport, ExhibitionPerformanceReport, GalleryStatistics,
    InsuranceCoverageReport, LoanSummaryReport, RestorationCostReport, VisitorGrowthReport,
};
pub use restoration::{Restoration, RestorationStatus};
pub use staff::{Staff, StaffRole};
pub use visitor::{MembershipType, Visit, Visitor};
