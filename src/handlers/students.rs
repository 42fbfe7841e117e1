use axum::{
    extract::State,
    http::Method,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use super::utils::{
    payload, preflight, present, query_params, request_body, respond, AppState, BodyBytes, QueryPairs,
};
use crate::api::ApiResponse;
use crate::database::models::{NewStudent, PasswordChange, StudentChanges};
use crate::database::payload::text_key;
use crate::database::repository::StudentRepository;
use crate::database::RequestDb;
use crate::error::ApiError;
use crate::filter::ListFilter;

#[derive(Debug, Default, Deserialize)]
pub struct StudentQuery {
    pub student_id: Option<String>,
    pub action: Option<String>,
    pub search: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
}

impl StudentQuery {
    fn list_filter(&self) -> ListFilter {
        ListFilter {
            search: self.search.clone(),
            sort: self.sort.clone(),
            order: self.order.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StudentRoute {
    Preflight,
    List,
    Get,
    Create,
    Update,
    Delete,
    ChangePassword,
}

impl StudentRoute {
    fn resolve(method: &Method, query: &StudentQuery) -> Result<Self, ApiError> {
        Ok(match *method {
            Method::OPTIONS => Self::Preflight,
            Method::GET if present(&query.student_id) => Self::Get,
            Method::GET => Self::List,
            Method::POST if query.action.as_deref() == Some("change_password") => Self::ChangePassword,
            Method::POST => Self::Create,
            Method::PUT => Self::Update,
            Method::DELETE => Self::Delete,
            _ => return Err(ApiError::method_not_allowed()),
        })
    }
}

/// ANY /api/students
pub async fn handle(
    State(state): State<AppState>,
    method: Method,
    query: QueryPairs,
    body: BodyBytes,
) -> Response {
    respond(dispatch(state, method, query, body).await)
}

async fn dispatch(
    state: AppState,
    method: Method,
    query: QueryPairs,
    body: BodyBytes,
) -> Result<Response, ApiError> {
    let query: StudentQuery = query_params(query)?;
    let body = request_body(body)?;
    let route = StudentRoute::resolve(&method, &query)?;
    let mut db = RequestDb::new(state.pool);

    let response = match route {
        StudentRoute::Preflight => preflight(),
        StudentRoute::List => {
            let students = StudentRepository::new(db.conn().await?)
                .list(&query.list_filter())
                .await?;
            ApiResponse::list(students).into_response()
        }
        StudentRoute::Get => {
            let student_id = text_key("student_id", query.student_id.as_deref(), None)?;
            let student = StudentRepository::new(db.conn().await?).get(&student_id).await?;
            ApiResponse::success(student).into_response()
        }
        StudentRoute::Create => {
            let new = NewStudent::from_payload(&payload(&body)?)?;
            let student = StudentRepository::new(db.conn().await?).create(new).await?;
            ApiResponse::created(student)
                .with_message("Student created successfully")
                .into_response()
        }
        StudentRoute::Update => {
            let changes = StudentChanges::from_payload(&payload(&body)?)?;
            let student = StudentRepository::new(db.conn().await?).update(changes).await?;
            ApiResponse::success(student)
                .with_message("Student updated successfully")
                .into_response()
        }
        StudentRoute::Delete => {
            let body = payload(&body)?;
            let student_id = text_key("student_id", query.student_id.as_deref(), Some(&body))?;
            StudentRepository::new(db.conn().await?).delete(&student_id).await?;
            ApiResponse::message("Student deleted successfully").into_response()
        }
        StudentRoute::ChangePassword => {
            let change = PasswordChange::from_payload(&payload(&body)?)?;
            StudentRepository::new(db.conn().await?).change_password(change).await?;
            ApiResponse::message("Password changed successfully").into_response()
        }
    };

    Ok(response)
}
