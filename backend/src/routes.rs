use rocket::{State, get, post, http::Status, serde::json::Json};
use shared::{AuthUser, CreatePollRequest, PollView, VoteReceipt, VoteRequest};
use tracing::{debug, instrument};
use crate::{
    error::EngineError,
    processor::PollProcessor,
    utils::parse_poll_id,
};

pub struct AppState {
    pub processor: PollProcessor,
}

fn viewer(user: &Option<AuthUser>) -> Option<&str> {
    user.as_ref().map(|u| u.id.as_str())
}

#[get("/polls")]
pub async fn list_polls(state: &State<AppState>, user: Option<AuthUser>) -> Result<Json<Vec<PollView>>, EngineError> {
    let polls = state.processor.list_polls().await?;
    Ok(Json(polls.into_iter().map(|poll| PollView::new(poll, viewer(&user))).collect()))
}

#[get("/polls/<id>")]
pub async fn get_poll(state: &State<AppState>, id: &str, user: Option<AuthUser>) -> Result<Json<PollView>, EngineError> {
    let poll_id = parse_poll_id(id)?;
    let poll = state.processor.get_poll(poll_id).await?;
    Ok(Json(PollView::new(poll, viewer(&user))))
}

#[rocket::options("/<_..>")]
pub async fn all_options() -> Status {
    Status::Ok
}

#[instrument(skip(state, request, user))]
#[post("/polls", format = "json", data = "<request>")]
pub async fn create_poll(
    state: &State<AppState>,
    request: Json<CreatePollRequest>,
    user: Option<AuthUser>,
) -> Result<(Status, Json<PollView>), EngineError> {
    let user = user.ok_or(EngineError::Unauthenticated)?;

    debug!(user = %user.id, options = request.options.len(), "Creating poll");
    let poll = state.processor.create_poll(Some(&user), request.into_inner()).await?;
    Ok((Status::Created, Json(PollView::new(poll, Some(&user.id)))))
}

#[instrument(skip(state, request, user), fields(poll_id = %id))]
#[post("/polls/<id>/vote", format = "json", data = "<request>")]
pub async fn cast_vote(
    state: &State<AppState>,
    id: &str,
    request: Json<VoteRequest>,
    user: Option<AuthUser>,
) -> Result<Json<VoteReceipt>, EngineError> {
    let user = user.ok_or(EngineError::Unauthenticated)?;
    let poll_id = parse_poll_id(id)?;

    state.processor
        .cast_vote(poll_id, Some(&user), request.option_index)
        .await
        .map(Json)
}
