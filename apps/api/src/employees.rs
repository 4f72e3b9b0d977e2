//! Minimal employee surface: the profile data the prompt context reads.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::employee::EmployeeRow;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateEmployeeRequest {
    pub name: String,
    pub birthday: Option<NaiveDate>,
    pub gender: Option<String>,
    pub marital_status: Option<String>,
    pub nationality: Option<String>,
    pub country_of_birth: Option<String>,
    pub job_title: Option<String>,
    pub department: Option<String>,
    pub emergency_contact: Option<String>,
    pub emergency_phone: Option<String>,
    pub children: Option<i32>,
    pub work_location: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
    pub notes: Option<String>,
}

/// POST /api/v1/employees
pub async fn handle_create_employee(
    State(state): State<AppState>,
    Json(req): Json<CreateEmployeeRequest>,
) -> Result<Json<EmployeeRow>, AppError> {
    if req.name.trim().is_empty() {
        return Err(AppError::Validation(
            "Employee name must not be empty".to_string(),
        ));
    }

    let row: EmployeeRow = sqlx::query_as(
        "INSERT INTO employees
            (name, birthday, gender, marital_status, nationality, country_of_birth,
             job_title, department, emergency_contact, emergency_phone, children,
             work_location, street, city, state, zip, country, notes)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
         RETURNING *",
    )
    .bind(&req.name)
    .bind(req.birthday)
    .bind(&req.gender)
    .bind(&req.marital_status)
    .bind(&req.nationality)
    .bind(&req.country_of_birth)
    .bind(&req.job_title)
    .bind(&req.department)
    .bind(&req.emergency_contact)
    .bind(&req.emergency_phone)
    .bind(req.children)
    .bind(&req.work_location)
    .bind(&req.street)
    .bind(&req.city)
    .bind(&req.state)
    .bind(&req.zip)
    .bind(&req.country)
    .bind(&req.notes)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(row))
}

/// GET /api/v1/employees/:id
pub async fn handle_get_employee(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<EmployeeRow>, AppError> {
    let row: EmployeeRow = sqlx::query_as("SELECT * FROM employees WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Employee {id} not found")))?;
    Ok(Json(row))
}
