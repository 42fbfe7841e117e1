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
use crate::database::models::{CommentThread, NewComment, NewResource, ResourceChanges, ResourceThread};
use crate::database::payload::id_key;
use crate::database::repository::{CommentRepository, ResourceRepository};
use crate::database::RequestDb;
use crate::error::ApiError;
use crate::filter::ListFilter;

#[derive(Debug, Default, Deserialize)]
pub struct ResourceQuery {
    pub id: Option<String>,
    pub action: Option<String>,
    pub resource_id: Option<String>,
    pub comment_id: Option<String>,
    pub search: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
}

impl ResourceQuery {
    fn list_filter(&self) -> ListFilter {
        ListFilter {
            search: self.search.clone(),
            sort: self.sort.clone(),
            order: self.order.clone(),
        }
    }

    fn action_is(&self, action: &str) -> bool {
        self.action.as_deref() == Some(action)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResourceRoute {
    Preflight,
    List,
    Get,
    Create,
    Update,
    Delete,
    ListComments,
    AddComment,
    DeleteComment,
}

impl ResourceRoute {
    fn resolve(method: &Method, query: &ResourceQuery) -> Result<Self, ApiError> {
        Ok(match *method {
            Method::OPTIONS => Self::Preflight,
            Method::GET if query.action_is("comments") => Self::ListComments,
            Method::GET if present(&query.id) => Self::Get,
            Method::GET => Self::List,
            Method::POST if query.action_is("comment") => Self::AddComment,
            Method::POST => Self::Create,
            Method::PUT => Self::Update,
            Method::DELETE if query.action_is("delete_comment") => Self::DeleteComment,
            Method::DELETE => Self::Delete,
            _ => return Err(ApiError::method_not_allowed()),
        })
    }
}

/// ANY /api/resources
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
    let query: ResourceQuery = query_params(query)?;
    let body = request_body(body)?;
    let route = ResourceRoute::resolve(&method, &query)?;
    let mut db = RequestDb::new(state.pool);

    let response = match route {
        ResourceRoute::Preflight => preflight(),
        ResourceRoute::List => {
            let resources = ResourceRepository::new(db.conn().await?)
                .list(&query.list_filter())
                .await?;
            ApiResponse::list(resources).into_response()
        }
        ResourceRoute::Get => {
            let id = id_key("id", query.id.as_deref(), None)?;
            let resource = ResourceRepository::new(db.conn().await?).get(id).await?;
            ApiResponse::success(resource).into_response()
        }
        ResourceRoute::Create => {
            let new = NewResource::from_payload(&payload(&body)?)?;
            let resource = ResourceRepository::new(db.conn().await?).create(new).await?;
            ApiResponse::created(resource)
                .with_message("Resource created successfully")
                .into_response()
        }
        ResourceRoute::Update => {
            let changes = ResourceChanges::from_payload(&payload(&body)?)?;
            let resource = ResourceRepository::new(db.conn().await?).update(changes).await?;
            ApiResponse::success(resource)
                .with_message("Resource updated successfully")
                .into_response()
        }
        ResourceRoute::Delete => {
            let body = payload(&body)?;
            let id = id_key("id", query.id.as_deref(), Some(&body))?;
            ResourceRepository::new(db.conn().await?).delete(id).await?;
            ApiResponse::message("Resource deleted successfully").into_response()
        }
        ResourceRoute::ListComments => {
            let owner = ResourceThread::owner_key(query.resource_id.as_deref(), None)?;
            let comments = CommentRepository::<ResourceThread>::new(db.conn().await?)
                .list_for_owner(owner)
                .await?;
            ApiResponse::list(comments).into_response()
        }
        ResourceRoute::AddComment => {
            let new = NewComment::from_payload::<ResourceThread>(&payload(&body)?)?;
            let comment = CommentRepository::<ResourceThread>::new(db.conn().await?)
                .create(new)
                .await?;
            ApiResponse::created(comment)
                .with_message("Comment added successfully")
                .into_response()
        }
        ResourceRoute::DeleteComment => {
            let body = payload(&body)?;
            let id = id_key("comment_id", query.comment_id.as_deref(), Some(&body))?;
            CommentRepository::<ResourceThread>::new(db.conn().await?)
                .delete(id)
                .await?;
            ApiResponse::message("Comment deleted successfully").into_response()
        }
    };

    Ok(response)
}
