use axum::{
    extract::State,
    http::Method,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use super::utils::{
    payload, preflight, present, query_params, request_body, respond, AppState, BodyBytes, QueryPairs,
};
use crate::api::{ApiResponse, WeekView};
use crate::database::models::{CommentThread, NewComment, NewWeek, WeekChanges, WeekThread};
use crate::database::payload::{id_key, text_key};
use crate::database::repository::{CommentRepository, WeekRepository};
use crate::database::RequestDb;
use crate::error::ApiError;
use crate::filter::ListFilter;

#[derive(Debug, Default, Deserialize)]
pub struct WeeklyQuery {
    pub resource: Option<String>,
    pub week_id: Option<String>,
    pub id: Option<String>,
    pub search: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
}

impl WeeklyQuery {
    fn list_filter(&self) -> ListFilter {
        ListFilter {
            search: self.search.clone(),
            sort: self.sort.clone(),
            order: self.order.clone(),
        }
    }
}

/// Resource types served under /api/weekly
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WeeklyResource {
    Weeks,
    Comments,
}

impl WeeklyResource {
    fn parse(raw: Option<&str>) -> Result<Self, ApiError> {
        match raw.map(str::trim) {
            None | Some("") | Some("weeks") => Ok(Self::Weeks),
            Some("comments") => Ok(Self::Comments),
            Some(_) => Err(ApiError::bad_request("Invalid resource type")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WeeklyRoute {
    Preflight,
    ListWeeks,
    GetWeek,
    CreateWeek,
    UpdateWeek,
    DeleteWeek,
    ListComments,
    AddComment,
    DeleteComment,
}

impl WeeklyRoute {
    fn resolve(method: &Method, query: &WeeklyQuery) -> Result<Self, ApiError> {
        if *method == Method::OPTIONS {
            return Ok(Self::Preflight);
        }
        let resource = WeeklyResource::parse(query.resource.as_deref())?;
        Ok(match (resource, method.clone()) {
            (WeeklyResource::Weeks, Method::GET) if present(&query.week_id) => Self::GetWeek,
            (WeeklyResource::Weeks, Method::GET) => Self::ListWeeks,
            (WeeklyResource::Weeks, Method::POST) => Self::CreateWeek,
            (WeeklyResource::Weeks, Method::PUT) => Self::UpdateWeek,
            (WeeklyResource::Weeks, Method::DELETE) => Self::DeleteWeek,
            (WeeklyResource::Comments, Method::GET) => Self::ListComments,
            (WeeklyResource::Comments, Method::POST) => Self::AddComment,
            (WeeklyResource::Comments, Method::DELETE) => Self::DeleteComment,
            _ => return Err(ApiError::method_not_allowed()),
        })
    }
}

/// ANY /api/weekly
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
    let query: WeeklyQuery = query_params(query)?;
    let body = request_body(body)?;
    let route = WeeklyRoute::resolve(&method, &query)?;
    let mut db = RequestDb::new(state.pool);

    let response = match route {
        WeeklyRoute::Preflight => preflight(),
        WeeklyRoute::ListWeeks => {
            let weeks = WeekRepository::new(db.conn().await?)
                .list(&query.list_filter())
                .await?;
            ApiResponse::list(weeks.into_iter().map(WeekView::from).collect::<Vec<_>>()).into_response()
        }
        WeeklyRoute::GetWeek => {
            let week_id = text_key("week_id", query.week_id.as_deref(), None)?;
            let week = WeekRepository::new(db.conn().await?).get(&week_id).await?;
            ApiResponse::success(WeekView::from(week)).into_response()
        }
        WeeklyRoute::CreateWeek => {
            let new = NewWeek::from_payload(&payload(&body)?)?;
            let week = WeekRepository::new(db.conn().await?).create(new).await?;
            ApiResponse::created(WeekView::from(week))
                .with_message("Week created successfully")
                .into_response()
        }
        WeeklyRoute::UpdateWeek => {
            let changes = WeekChanges::from_payload(&payload(&body)?)?;
            let week = WeekRepository::new(db.conn().await?).update(changes).await?;
            ApiResponse::success(WeekView::from(week))
                .with_message("Week updated successfully")
                .into_response()
        }
        WeeklyRoute::DeleteWeek => {
            let body = payload(&body)?;
            let week_id = text_key("week_id", query.week_id.as_deref(), Some(&body))?;
            WeekRepository::new(db.conn().await?).delete(&week_id).await?;
            ApiResponse::message("Week deleted successfully").into_response()
        }
        WeeklyRoute::ListComments => {
            let owner = WeekThread::owner_key(query.week_id.as_deref(), None)?;
            let comments = CommentRepository::<WeekThread>::new(db.conn().await?)
                .list_for_owner(owner)
                .await?;
            ApiResponse::list(comments).into_response()
        }
        WeeklyRoute::AddComment => {
            let new = NewComment::from_payload::<WeekThread>(&payload(&body)?)?;
            let comment = CommentRepository::<WeekThread>::new(db.conn().await?)
                .create(new)
                .await?;
            ApiResponse::created(comment)
                .with_message("Comment added successfully")
                .into_response()
        }
        WeeklyRoute::DeleteComment => {
            let body = payload(&body)?;
            let id = id_key("id", query.id.as_deref(), Some(&body))?;
            CommentRepository::<WeekThread>::new(db.conn().await?)
                .delete(id)
                .await?;
            ApiResponse::message("Comment deleted successfully").into_response()
        }
    };

    Ok(response)
}
