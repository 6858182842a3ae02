//! Request and response bodies.
//!
//! Bodies are camelCase JSON. Request types derive `Validate` for the
//! field-level rules; rules spanning several fields (date ranges, references
//! to other records) are checked in the handlers once the final values are
//! known.

use chrono::{DateTime, NaiveDate, Utc};
use gallery_core::{
    Artwork, ArtworkStatus, EtlSync, EtlSyncStatus, Exhibition, ExhibitionArtwork,
    ExhibitionStatus, Insurance, InsuranceStatus, Loan, LoanDirection, LoanStatus,
    MembershipType, Restoration, RestorationStatus, Staff, StaffRole, Visit, Visitor,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

// ============================================================================
// Common
// ============================================================================

/// Paging parameters shared by every list endpoint.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct PageQuery {
    #[validate(range(min = 1))]
    pub page: Option<u32>,
    #[validate(range(min = 1, max = 200))]
    pub per_page: Option<u32>,
}

// ============================================================================
// Health
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: DatabaseHealth,
    pub warehouse: DatabaseHealth,
    pub uptime_seconds: u64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseHealth {
    pub connected: bool,
    pub backend: String,
    pub pool_size: u32,
    pub idle_connections: usize,
}

// ============================================================================
// Artworks
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct ListArtworksQuery {
    #[validate(range(min = 1))]
    pub page: Option<u32>,
    #[validate(range(min = 1, max = 200))]
    pub per_page: Option<u32>,
    pub status: Option<ArtworkStatus>,
    pub category: Option<String>,
    pub artist: Option<String>,
    /// Matches title or artist.
    pub search: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateArtworkRequest {
    #[validate(length(min = 1, max = 255, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, max = 255, message = "Artist is required"))]
    pub artist: String,
    pub year_created: Option<i32>,
    #[validate(length(max = 255))]
    pub medium: Option<String>,
    #[validate(length(min = 1, max = 100, message = "Category is required"))]
    pub category: String,
    #[validate(range(min = 0.0, message = "Estimated value cannot be negative"))]
    pub estimated_value: f64,
    pub acquisition_date: Option<NaiveDate>,
    #[validate(length(max = 255))]
    pub location: Option<String>,
    pub description: Option<String>,
    pub status: Option<ArtworkStatus>,
}

impl CreateArtworkRequest {
    pub fn into_artwork(self) -> Artwork {
        let mut artwork = Artwork::new(self.title, self.artist, self.category, self.estimated_value);
        artwork.year_created = self.year_created;
        artwork.medium = self.medium;
        artwork.acquisition_date = self.acquisition_date;
        artwork.location = self.location;
        artwork.description = self.description;
        if let Some(status) = self.status {
            artwork.status = status;
        }
        artwork
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateArtworkRequest {
    #[validate(length(min = 1, max = 255, message = "Title cannot be empty"))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 255, message = "Artist cannot be empty"))]
    pub artist: Option<String>,
    pub year_created: Option<i32>,
    #[validate(length(max = 255))]
    pub medium: Option<String>,
    #[validate(length(min = 1, max = 100, message = "Category cannot be empty"))]
    pub category: Option<String>,
    #[validate(range(min = 0.0, message = "Estimated value cannot be negative"))]
    pub estimated_value: Option<f64>,
    pub acquisition_date: Option<NaiveDate>,
    #[validate(length(max = 255))]
    pub location: Option<String>,
    pub description: Option<String>,
    pub status: Option<ArtworkStatus>,
}

impl UpdateArtworkRequest {
    /// Overwrites the fields present in the request.
    pub fn apply_to(self, artwork: &mut Artwork) {
        if let Some(title) = self.title {
            artwork.title = title;
        }
        if let Some(artist) = self.artist {
            artwork.artist = artist;
        }
        if self.year_created.is_some() {
            artwork.year_created = self.year_created;
        }
        if self.medium.is_some() {
            artwork.medium = self.medium;
        }
        if let Some(category) = self.category {
            artwork.category = category;
        }
        if let Some(value) = self.estimated_value {
            artwork.estimated_value = value;
        }
        if self.acquisition_date.is_some() {
            artwork.acquisition_date = self.acquisition_date;
        }
        if self.location.is_some() {
            artwork.location = self.location;
        }
        if self.description.is_some() {
            artwork.description = self.description;
        }
        if let Some(status) = self.status {
            artwork.status = status;
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtworkResponse {
    pub id: Uuid,
    pub title: String,
    pub artist: String,
    pub year_created: Option<i32>,
    pub medium: Option<String>,
    pub category: String,
    pub estimated_value: f64,
    pub acquisition_date: Option<NaiveDate>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub status: ArtworkStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Artwork> for ArtworkResponse {
    fn from(a: Artwork) -> Self {
        Self {
            id: a.id,
            title: a.title,
            artist: a.artist,
            year_created: a.year_created,
            medium: a.medium,
            category: a.category,
            estimated_value: a.estimated_value,
            acquisition_date: a.acquisition_date,
            location: a.location,
            description: a.description,
            status: a.status,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}

// ============================================================================
// Exhibitions
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct ListExhibitionsQuery {
    #[validate(range(min = 1))]
    pub page: Option<u32>,
    #[validate(range(min = 1, max = 200))]
    pub per_page: Option<u32>,
    pub status: Option<ExhibitionStatus>,
    pub curator_id: Option<Uuid>,
    /// Only exhibitions open on this day.
    pub running_on: Option<NaiveDate>,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateExhibitionRequest {
    #[validate(length(min = 1, max = 255, message = "Title is required"))]
    pub title: String,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[validate(length(max = 100))]
    pub gallery_room: Option<String>,
    pub curator_id: Option<Uuid>,
    #[validate(range(min = 0.0, message = "Budget cannot be negative"))]
    pub budget: Option<f64>,
    pub status: Option<ExhibitionStatus>,
}

impl CreateExhibitionRequest {
    pub fn into_exhibition(self) -> Exhibition {
        let mut exhibition = Exhibition::new(self.title, self.start_date, self.end_date);
        exhibition.description = self.description;
        exhibition.gallery_room = self.gallery_room;
        exhibition.curator_id = self.curator_id;
        exhibition.budget = self.budget;
        if let Some(status) = self.status {
            exhibition.status = status;
        }
        exhibition
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateExhibitionRequest {
    #[validate(length(min = 1, max = 255, message = "Title cannot be empty"))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[validate(length(max = 100))]
    pub gallery_room: Option<String>,
    pub curator_id: Option<Uuid>,
    #[validate(range(min = 0.0, message = "Budget cannot be negative"))]
    pub budget: Option<f64>,
    pub status: Option<ExhibitionStatus>,
}

impl UpdateExhibitionRequest {
    pub fn apply_to(self, exhibition: &mut Exhibition) {
        if let Some(title) = self.title {
            exhibition.title = title;
        }
        if self.description.is_some() {
            exhibition.description = self.description;
        }
        if let Some(start) = self.start_date {
            exhibition.start_date = start;
        }
        if let Some(end) = self.end_date {
            exhibition.end_date = end;
        }
        if self.gallery_room.is_some() {
            exhibition.gallery_room = self.gallery_room;
        }
        if self.curator_id.is_some() {
            exhibition.curator_id = self.curator_id;
        }
        if self.budget.is_some() {
            exhibition.budget = self.budget;
        }
        if let Some(status) = self.status {
            exhibition.status = status;
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExhibitionResponse {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub gallery_room: Option<String>,
    pub curator_id: Option<Uuid>,
    pub budget: Option<f64>,
    pub status: ExhibitionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Exhibition> for ExhibitionResponse {
    fn from(e: Exhibition) -> Self {
        Self {
            id: e.id,
            title: e.title,
            description: e.description,
            start_date: e.start_date,
            end_date: e.end_date,
            gallery_room: e.gallery_room,
            curator_id: e.curator_id,
            budget: e.budget,
            status: e.status,
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddExhibitionArtworkRequest {
    pub artwork_id: Uuid,
    /// Defaults to the end of the current running order.
    #[validate(range(min = 0, message = "Display order cannot be negative"))]
    pub display_order: Option<i32>,
}

/// An artwork as placed in an exhibition.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExhibitionArtworkResponse {
    pub exhibition_id: Uuid,
    pub artwork_id: Uuid,
    pub display_order: i32,
    pub added_at: DateTime<Utc>,
    pub artwork: Option<ArtworkResponse>,
}

impl ExhibitionArtworkResponse {
    pub fn new(placement: ExhibitionArtwork, artwork: Option<Artwork>) -> Self {
        Self {
            exhibition_id: placement.exhibition_id,
            artwork_id: placement.artwork_id,
            display_order: placement.display_order,
            added_at: placement.added_at,
            artwork: artwork.map(ArtworkResponse::from),
        }
    }
}

// ============================================================================
// Visitors and visits
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct ListVisitorsQuery {
    #[validate(range(min = 1))]
    pub page: Option<u32>,
    #[validate(range(min = 1, max = 200))]
    pub per_page: Option<u32>,
    pub membership_type: Option<MembershipType>,
    /// Matches first name, last name or email.
    pub search: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateVisitorRequest {
    #[validate(length(min = 1, max = 100, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "Last name is required"))]
    pub last_name: String,
    #[validate(email(message = "Email address is not valid"))]
    pub email: String,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    pub membership_type: Option<MembershipType>,
}

impl CreateVisitorRequest {
    pub fn into_visitor(self) -> Visitor {
        let mut visitor = Visitor::new(self.first_name, self.last_name, self.email);
        visitor.phone = self.phone;
        if let Some(membership) = self.membership_type {
            visitor.membership_type = membership;
        }
        visitor
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVisitorRequest {
    #[validate(length(min = 1, max = 100, message = "First name cannot be empty"))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100, message = "Last name cannot be empty"))]
    pub last_name: Option<String>,
    #[validate(email(message = "Email address is not valid"))]
    pub email: Option<String>,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    pub membership_type: Option<MembershipType>,
}

impl UpdateVisitorRequest {
    pub fn apply_to(self, visitor: &mut Visitor) {
        if let Some(first) = self.first_name {
            visitor.first_name = first;
        }
        if let Some(last) = self.last_name {
            visitor.last_name = last;
        }
        if let Some(email) = self.email {
            visitor.email = email;
        }
        if self.phone.is_some() {
            visitor.phone = self.phone;
        }
        if let Some(membership) = self.membership_type {
            visitor.membership_type = membership;
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorResponse {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub membership_type: MembershipType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Visitor> for VisitorResponse {
    fn from(v: Visitor) -> Self {
        Self {
            id: v.id,
            first_name: v.first_name,
            last_name: v.last_name,
            email: v.email,
            phone: v.phone,
            membership_type: v.membership_type,
            created_at: v.created_at,
            updated_at: v.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct ListVisitsQuery {
    #[validate(range(min = 1))]
    pub page: Option<u32>,
    #[validate(range(min = 1, max = 200))]
    pub per_page: Option<u32>,
    pub exhibition_id: Option<Uuid>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateVisitRequest {
    pub exhibition_id: Option<Uuid>,
    pub visit_date: NaiveDate,
    #[validate(range(min = 0.0, message = "Ticket price cannot be negative"))]
    pub ticket_price: f64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitResponse {
    pub id: Uuid,
    pub visitor_id: Uuid,
    pub exhibition_id: Option<Uuid>,
    pub visit_date: NaiveDate,
    pub ticket_price: f64,
    pub created_at: DateTime<Utc>,
}

impl From<Visit> for VisitResponse {
    fn from(v: Visit) -> Self {
        Self {
            id: v.id,
            visitor_id: v.visitor_id,
            exhibition_id: v.exhibition_id,
            visit_date: v.visit_date,
            ticket_price: v.ticket_price,
            created_at: v.created_at,
        }
    }
}

// ============================================================================
// Staff
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct ListStaffQuery {
    #[validate(range(min = 1))]
    pub page: Option<u32>,
    #[validate(range(min = 1, max = 200))]
    pub per_page: Option<u32>,
    pub role: Option<StaffRole>,
    pub department: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateStaffRequest {
    #[validate(length(min = 1, max = 100, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "Last name is required"))]
    pub last_name: String,
    #[validate(email(message = "Email address is not valid"))]
    pub email: String,
    pub role: StaffRole,
    #[validate(length(max = 100))]
    pub department: Option<String>,
    pub hire_date: NaiveDate,
    #[validate(range(min = 0.0, message = "Salary cannot be negative"))]
    pub salary: Option<f64>,
}

impl CreateStaffRequest {
    pub fn into_staff(self) -> Staff {
        let mut staff = Staff::new(
            self.first_name,
            self.last_name,
            self.email,
            self.role,
            self.hire_date,
        );
        staff.department = self.department;
        staff.salary = self.salary;
        staff
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStaffRequest {
    #[validate(length(min = 1, max = 100, message = "First name cannot be empty"))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100, message = "Last name cannot be empty"))]
    pub last_name: Option<String>,
    #[validate(email(message = "Email address is not valid"))]
    pub email: Option<String>,
    pub role: Option<StaffRole>,
    #[validate(length(max = 100))]
    pub department: Option<String>,
    pub hire_date: Option<NaiveDate>,
    #[validate(range(min = 0.0, message = "Salary cannot be negative"))]
    pub salary: Option<f64>,
}

impl UpdateStaffRequest {
    pub fn apply_to(self, staff: &mut Staff) {
        if let Some(first) = self.first_name {
            staff.first_name = first;
        }
        if let Some(last) = self.last_name {
            staff.last_name = last;
        }
        if let Some(email) = self.email {
            staff.email = email;
        }
        if let Some(role) = self.role {
            staff.role = role;
        }
        if self.department.is_some() {
            staff.department = self.department;
        }
        if let Some(hire_date) = self.hire_date {
            staff.hire_date = hire_date;
        }
        if self.salary.is_some() {
            staff.salary = self.salary;
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffResponse {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: StaffRole,
    pub department: Option<String>,
    pub hire_date: NaiveDate,
    pub salary: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Staff> for StaffResponse {
    fn from(s: Staff) -> Self {
        Self {
            id: s.id,
            first_name: s.first_name,
            last_name: s.last_name,
            email: s.email,
            role: s.role,
            department: s.department,
            hire_date: s.hire_date,
            salary: s.salary,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

// ============================================================================
// Loans
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct ListLoansQuery {
    #[validate(range(min = 1))]
    pub page: Option<u32>,
    #[validate(range(min = 1, max = 200))]
    pub per_page: Option<u32>,
    pub artwork_id: Option<Uuid>,
    pub status: Option<LoanStatus>,
    pub direction: Option<LoanDirection>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateLoanRequest {
    pub artwork_id: Uuid,
    #[validate(length(min = 1, max = 255, message = "Institution is required"))]
    pub institution: String,
    pub direction: LoanDirection,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[validate(range(min = 0.0, message = "Loan fee cannot be negative"))]
    pub loan_fee: Option<f64>,
    pub status: Option<LoanStatus>,
    pub conditions: Option<String>,
}

impl CreateLoanRequest {
    pub fn into_loan(self) -> Loan {
        let mut loan = Loan::new(
            self.artwork_id,
            self.institution,
            self.direction,
            self.start_date,
            self.end_date,
        );
        if let Some(fee) = self.loan_fee {
            loan.loan_fee = fee;
        }
        if let Some(status) = self.status {
            loan.status = status;
        }
        loan.conditions = self.conditions;
        loan
    }
}

/// The artwork of a loan cannot be changed.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLoanRequest {
    #[validate(length(min = 1, max = 255, message = "Institution cannot be empty"))]
    pub institution: Option<String>,
    pub direction: Option<LoanDirection>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[validate(range(min = 0.0, message = "Loan fee cannot be negative"))]
    pub loan_fee: Option<f64>,
    pub status: Option<LoanStatus>,
    pub conditions: Option<String>,
}

impl UpdateLoanRequest {
    pub fn apply_to(self, loan: &mut Loan) {
        if let Some(institution) = self.institution {
            loan.institution = institution;
        }
        if let Some(direction) = self.direction {
            loan.direction = direction;
        }
        if let Some(start) = self.start_date {
            loan.start_date = start;
        }
        if let Some(end) = self.end_date {
            loan.end_date = end;
        }
        if let Some(fee) = self.loan_fee {
            loan.loan_fee = fee;
        }
        if let Some(status) = self.status {
            loan.status = status;
        }
        if self.conditions.is_some() {
            loan.conditions = self.conditions;
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanResponse {
    pub id: Uuid,
    pub artwork_id: Uuid,
    pub institution: String,
    pub direction: LoanDirection,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub loan_fee: f64,
    pub status: LoanStatus,
    pub conditions: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Loan> for LoanResponse {
    fn from(l: Loan) -> Self {
        Self {
            id: l.id,
            artwork_id: l.artwork_id,
            institution: l.institution,
            direction: l.direction,
            start_date: l.start_date,
            end_date: l.end_date,
            loan_fee: l.loan_fee,
            status: l.status,
            conditions: l.conditions,
            created_at: l.created_at,
            updated_at: l.updated_at,
        }
    }
}

// ============================================================================
// Insurance
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct ListInsurancesQuery {
    #[validate(range(min = 1))]
    pub page: Option<u32>,
    #[validate(range(min = 1, max = 200))]
    pub per_page: Option<u32>,
    pub artwork_id: Option<Uuid>,
    pub status: Option<InsuranceStatus>,
    pub provider: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateInsuranceRequest {
    pub artwork_id: Uuid,
    #[validate(length(min = 1, max = 255, message = "Provider is required"))]
    pub provider: String,
    #[validate(length(min = 1, max = 100, message = "Policy number is required"))]
    pub policy_number: String,
    #[validate(range(min = 0.0, message = "Coverage amount cannot be negative"))]
    pub coverage_amount: f64,
    #[validate(range(min = 0.0, message = "Premium cannot be negative"))]
    pub premium: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: Option<InsuranceStatus>,
}

impl CreateInsuranceRequest {
    pub fn into_insurance(self) -> Insurance {
        let mut insurance = Insurance::new(
            self.artwork_id,
            self.provider,
            self.policy_number,
            self.coverage_amount,
            self.premium,
            self.start_date,
            self.end_date,
        );
        if let Some(status) = self.status {
            insurance.status = status;
        }
        insurance
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInsuranceRequest {
    #[validate(length(min = 1, max = 255, message = "Provider cannot be empty"))]
    pub provider: Option<String>,
    #[validate(length(min = 1, max = 100, message = "Policy number cannot be empty"))]
    pub policy_number: Option<String>,
    #[validate(range(min = 0.0, message = "Coverage amount cannot be negative"))]
    pub coverage_amount: Option<f64>,
    #[validate(range(min = 0.0, message = "Premium cannot be negative"))]
    pub premium: Option<f64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<InsuranceStatus>,
}

impl UpdateInsuranceRequest {
    pub fn apply_to(self, insurance: &mut Insurance) {
        if let Some(provider) = self.provider {
            insurance.provider = provider;
        }
        if let Some(policy) = self.policy_number {
            insurance.policy_number = policy;
        }
        if let Some(coverage) = self.coverage_amount {
            insurance.coverage_amount = coverage;
        }
        if let Some(premium) = self.premium {
            insurance.premium = premium;
        }
        if let Some(start) = self.start_date {
            insurance.start_date = start;
        }
        if let Some(end) = self.end_date {
            insurance.end_date = end;
        }
        if let Some(status) = self.status {
            insurance.status = status;
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsuranceResponse {
    pub id: Uuid,
    pub artwork_id: Uuid,
    pub provider: String,
    pub policy_number: String,
    pub coverage_amount: f64,
    pub premium: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: InsuranceStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Insurance> for InsuranceResponse {
    fn from(i: Insurance) -> Self {
        Self {
            id: i.id,
            artwork_id: i.artwork_id,
            provider: i.provider,
            policy_number: i.policy_number,
            coverage_amount: i.coverage_amount,
            premium: i.premium,
            start_date: i.start_date,
            end_date: i.end_date,
            status: i.status,
            created_at: i.created_at,
            updated_at: i.updated_at,
        }
    }
}

// ============================================================================
// Restorations
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct ListRestorationsQuery {
    #[validate(range(min = 1))]
    pub page: Option<u32>,
    #[validate(range(min = 1, max = 200))]
    pub per_page: Option<u32>,
    pub artwork_id: Option<Uuid>,
    pub status: Option<RestorationStatus>,
    pub conservator_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRestorationRequest {
    pub artwork_id: Uuid,
    pub conservator_id: Option<Uuid>,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    #[validate(range(min = 0.0, message = "Cost cannot be negative"))]
    pub cost: Option<f64>,
    pub status: Option<RestorationStatus>,
}

impl CreateRestorationRequest {
    pub fn into_restoration(self) -> Restoration {
        let mut restoration = Restoration::new(self.artwork_id, self.description, self.start_date);
        restoration.conservator_id = self.conservator_id;
        restoration.end_date = self.end_date;
        if let Some(cost) = self.cost {
            restoration.cost = cost;
        }
        if let Some(status) = self.status {
            restoration.status = status;
        }
        restoration
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRestorationRequest {
    pub conservator_id: Option<Uuid>,
    #[validate(length(min = 1, message = "Description cannot be empty"))]
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[validate(range(min = 0.0, message = "Cost cannot be negative"))]
    pub cost: Option<f64>,
    pub status: Option<RestorationStatus>,
}

impl UpdateRestorationRequest {
    pub fn apply_to(self, restoration: &mut Restoration) {
        if self.conservator_id.is_some() {
            restoration.conservator_id = self.conservator_id;
        }
        if let Some(description) = self.description {
            restoration.description = description;
        }
        if let Some(start) = self.start_date {
            restoration.start_date = start;
        }
        if self.end_date.is_some() {
            restoration.end_date = self.end_date;
        }
        if let Some(cost) = self.cost {
            restoration.cost = cost;
        }
        if let Some(status) = self.status {
            restoration.status = status;
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestorationResponse {
    pub id: Uuid,
    pub artwork_id: Uuid,
    pub conservator_id: Option<Uuid>,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub cost: f64,
    pub status: RestorationStatus,
    pub duration_days: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Restoration> for RestorationResponse {
    fn from(r: Restoration) -> Self {
        Self {
            duration_days: r.duration_days(),
            id: r.id,
            artwork_id: r.artwork_id,
            conservator_id: r.conservator_id,
            description: r.description,
            start_date: r.start_date,
            end_date: r.end_date,
            cost: r.cost,
            status: r.status,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

// ============================================================================
// Warehouse sync
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EtlSyncResponse {
    pub id: Uuid,
    pub sync_type: String,
    pub status: EtlSyncStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub rows_processed: i64,
    pub error_message: Option<String>,
    pub duration_ms: Option<i64>,
}

impl From<EtlSync> for EtlSyncResponse {
    fn from(s: EtlSync) -> Self {
        Self {
            duration_ms: s.duration_ms(),
            id: s.id,
            sync_type: s.sync_type,
            status: s.status,
            started_at: s.started_at,
            finished_at: s.finished_at,
            rows_processed: s.rows_processed,
            error_message: s.error_message,
        }
    }
}
