use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;
use warp::Filter;
use warp::http::StatusCode;
use warp::reply::{Json, WithStatus};

use crate::game_service::GameService;
use game_types::{ErrorKind, GameError, HelpType, Letter, UserId};

pub mod config;
pub mod game_service;

#[derive(Deserialize)]
struct AnswerRequest {
    letter: Letter,
}

#[derive(Deserialize)]
struct HelpRequest {
    help_type: HelpType,
}

type JsonReply = WithStatus<Json>;

pub fn create_routes(
    game_service: Arc<GameService>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let service_filter = warp::any().map({
        let game_service = game_service.clone();
        move || game_service.clone()
    });

    // Caller identity is established upstream; we only read it.
    let user_header = warp::header::optional::<String>("x-user-id");

    // Health check endpoint
    let health = warp::path("health")
        .and(warp::get())
        .map(|| warp::reply::with_status("OK", StatusCode::OK));

    let create_game = warp::path!("games")
        .and(warp::post())
        .and(user_header.clone())
        .and(service_filter.clone())
        .and_then(handle_create_game);

    let show_game = warp::path!("games" / Uuid)
        .and(warp::get())
        .and(user_header.clone())
        .and(service_filter.clone())
        .and_then(handle_show_game);

    let answer = warp::path!("games" / Uuid / "answer")
        .and(warp::put())
        .and(user_header.clone())
        .and(warp::body::content_length_limit(1024))
        .and(warp::body::json::<AnswerRequest>())
        .and(service_filter.clone())
        .and_then(handle_answer);

    let help = warp::path!("games" / Uuid / "help")
        .and(warp::put())
        .and(user_header.clone())
        .and(warp::body::content_length_limit(1024))
        .and(warp::body::json::<HelpRequest>())
        .and(service_filter.clone())
        .and_then(handle_help);

    let take_money = warp::path!("games" / Uuid / "take_money")
        .and(warp::put())
        .and(user_header.clone())
        .and(service_filter.clone())
        .and_then(handle_take_money);

    let timeout = warp::path!("games" / Uuid / "timeout")
        .and(warp::put())
        .and(user_header)
        .and(service_filter.clone())
        .and_then(handle_timeout);

    let user = warp::path!("users" / Uuid)
        .and(warp::get())
        .and(service_filter.clone())
        .and_then(handle_show_user);

    let user_games = warp::path!("users" / Uuid / "games")
        .and(warp::get())
        .and(service_filter.clone())
        .and_then(handle_user_games);

    let cors = warp::cors()
        .allow_any_origin()
        .allow_headers(vec!["content-type", "x-user-id"])
        .allow_methods(vec!["GET", "POST", "PUT"]);

    health
        .or(create_game)
        .or(show_game)
        .or(answer)
        .or(help)
        .or(take_money)
        .or(timeout)
        .or(user)
        .or(user_games)
        .with(cors)
        .with(warp::log("millionaire"))
}

fn json_error(message: &str, status: StatusCode) -> JsonReply {
    warp::reply::with_status(
        warp::reply::json(&serde_json::json!({ "error": message })),
        status,
    )
}

fn error_reply(err: &GameError) -> JsonReply {
    let kind = err.kind();
    let status = match kind {
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::InvalidState => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::Internal => {
            tracing::error!("Request failed: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    warp::reply::with_status(
        warp::reply::json(&serde_json::json!({
            "error": err.to_string(),
            "kind": kind,
        })),
        status,
    )
}

fn ok_reply<T: serde::Serialize>(value: &T, status: StatusCode) -> JsonReply {
    warp::reply::with_status(warp::reply::json(value), status)
}

fn parse_user(header: Option<String>) -> Result<UserId, JsonReply> {
    let Some(raw) = header else {
        return Err(json_error("Authentication required", StatusCode::UNAUTHORIZED));
    };
    Uuid::parse_str(raw.trim())
        .map_err(|_| json_error("Invalid user ID format", StatusCode::BAD_REQUEST))
}

async fn handle_create_game(
    user_header: Option<String>,
    game_service: Arc<GameService>,
) -> Result<JsonReply, warp::Rejection> {
    let user_id = match parse_user(user_header) {
        Ok(user_id) => user_id,
        Err(reply) => return Ok(reply),
    };

    Ok(match game_service.create_game(user_id).await {
        Ok(view) => ok_reply(&view, StatusCode::CREATED),
        Err(err) => error_reply(&err),
    })
}

async fn handle_show_game(
    game_id: Uuid,
    user_header: Option<String>,
    game_service: Arc<GameService>,
) -> Result<JsonReply, warp::Rejection> {
    let user_id = match parse_user(user_header) {
        Ok(user_id) => user_id,
        Err(reply) => return Ok(reply),
    };

    Ok(match game_service.get_game(game_id, user_id).await {
        Ok(view) => ok_reply(&view, StatusCode::OK),
        Err(err) => error_reply(&err),
    })
}

async fn handle_answer(
    game_id: Uuid,
    user_header: Option<String>,
    request: AnswerRequest,
    game_service: Arc<GameService>,
) -> Result<JsonReply, warp::Rejection> {
    let user_id = match parse_user(user_header) {
        Ok(user_id) => user_id,
        Err(reply) => return Ok(reply),
    };

    Ok(
        match game_service
            .submit_answer(game_id, user_id, request.letter)
            .await
        {
            Ok(result) => ok_reply(&result, StatusCode::OK),
            Err(err) => error_reply(&err),
        },
    )
}

async fn handle_help(
    game_id: Uuid,
    user_header: Option<String>,
    request: HelpRequest,
    game_service: Arc<GameService>,
) -> Result<JsonReply, warp::Rejection> {
    let user_id = match parse_user(user_header) {
        Ok(user_id) => user_id,
        Err(reply) => return Ok(reply),
    };

    Ok(
        match game_service
            .use_help(game_id, user_id, request.help_type)
            .await
        {
            Ok(view) => ok_reply(&view, StatusCode::OK),
            Err(err) => error_reply(&err),
        },
    )
}

async fn handle_take_money(
    game_id: Uuid,
    user_header: Option<String>,
    game_service: Arc<GameService>,
) -> Result<JsonReply, warp::Rejection> {
    let user_id = match parse_user(user_header) {
        Ok(user_id) => user_id,
        Err(reply) => return Ok(reply),
    };

    Ok(match game_service.take_money(game_id, user_id).await {
        Ok(view) => ok_reply(&view, StatusCode::OK),
        Err(err) => error_reply(&err),
    })
}

async fn handle_timeout(
    game_id: Uuid,
    user_header: Option<String>,
    game_service: Arc<GameService>,
) -> Result<JsonReply, warp::Rejection> {
    let user_id = match parse_user(user_header) {
        Ok(user_id) => user_id,
        Err(reply) => return Ok(reply),
    };

    Ok(match game_service.notify_timeout(game_id, user_id).await {
        Ok(view) => ok_reply(&view, StatusCode::OK),
        Err(err) => error_reply(&err),
    })
}

async fn handle_show_user(
    user_id: Uuid,
    game_service: Arc<GameService>,
) -> Result<JsonReply, warp::Rejection> {
    Ok(match game_service.find_user(user_id).await {
        Ok(user) => ok_reply(&user, StatusCode::OK),
        Err(err) => error_reply(&err),
    })
}

async fn handle_user_games(
    user_id: Uuid,
    game_service: Arc<GameService>,
) -> Result<JsonReply, warp::Rejection> {
    Ok(match game_service.list_games(user_id).await {
        Ok(games) => ok_reply(&games, StatusCode::OK),
        Err(err) => error_reply(&err),
    })
}
