//! In-process records store
//!
//! A small axum application that honours the access-control contract the
//! harness checks: 401 before anything else for anonymous callers, 403 for
//! non-admin writes, then 422 for bad input and 404 for unknown records.
//! Each test gets its own server and its own in-memory data.

use super::constants::*;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{header::AUTHORIZATION, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post};
use axum::{Form, Json, Router};
use records_store_conformance::fixtures::Genre;
use records_store_conformance::models::{
    Album, AlbumPayload, Artist, ArtistPayload, RegisterRequest, RightsPatch, Token, User,
};
use records_store_conformance::HarnessConfig;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

/// Deliberate contract violations, for tests that need a misbehaving server.
#[derive(Debug, Clone, Copy, Default)]
pub struct ServerOptions {
    /// Serve list and read requests that carry no token.
    pub allow_anonymous_reads: bool,
}

type Shared = Arc<Mutex<Store>>;
type Handled = Result<Response, Response>;

struct Account {
    user: User,
    password: String,
}

#[derive(Default)]
struct Store {
    options: ServerOptions,
    accounts: Vec<Account>,
    tokens: HashMap<String, String>,
    tokens_issued: u64,
    artists: BTreeMap<i64, Artist>,
    albums: BTreeMap<i64, (i64, AlbumPayload)>,
    next_user_id: i64,
    next_artist_id: i64,
    next_album_id: i64,
}

fn detail(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "detail": message.into() }))).into_response()
}

fn reply<T: Serialize>(status: StatusCode, body: &T) -> Handled {
    Ok((status, Json(body)).into_response())
}

fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, Response> {
    serde_json::from_slice(body)
        .map_err(|err| detail(StatusCode::UNPROCESSABLE_ENTITY, err.to_string()))
}

fn parse_param<T: FromStr>(name: &str, raw: Option<&String>) -> Result<Option<T>, Response> {
    match raw {
        None => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(|_| {
            detail(
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("{} is not a valid number: {:?}", name, raw),
            )
        }),
    }
}

fn parse_id(raw: &str) -> Result<i64, Response> {
    raw.parse().map_err(|_| {
        detail(
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("id is not an integer: {:?}", raw),
        )
    })
}

fn page<T>(items: Vec<T>, query: &HashMap<String, String>) -> Result<Vec<T>, Response> {
    let skip: u32 = parse_param("skip", query.get("skip"))?.unwrap_or(0);
    let limit: u32 = parse_param("limit", query.get("limit"))?.unwrap_or(100);
    Ok(items
        .into_iter()
        .skip(skip as usize)
        .take(limit as usize)
        .collect())
}

fn validate_artist(payload: &ArtistPayload) -> Result<(), Response> {
    if payload.name.trim().is_empty() {
        return Err(detail(StatusCode::UNPROCESSABLE_ENTITY, "name must not be empty"));
    }
    Ok(())
}

fn validate_album(payload: &AlbumPayload) -> Result<(), Response> {
    let problem = if payload.title.trim().is_empty() {
        Some("title must not be empty")
    } else if !(1900..=2100).contains(&payload.release_year) {
        Some("release_year is out of range")
    } else if Genre::from_str(&payload.genre).is_none() {
        Some("genre is not supported")
    } else if payload.price < 0.0 || payload.stock < 0 {
        Some("price and stock must not be negative")
    } else {
        None
    };
    match problem {
        Some(message) => Err(detail(StatusCode::UNPROCESSABLE_ENTITY, message)),
        None => Ok(()),
    }
}

fn validate_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain
                    .split_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        }
        None => false,
    }
}

impl Store {
    fn seeded(options: ServerOptions) -> Self {
        let mut store = Store {
            options,
            next_user_id: 1,
            next_artist_id: 1,
            next_album_id: 1,
            ..Store::default()
        };
        store.add_account(ADMIN_USER, "admin@records.test", ADMIN_PASS, true);
        store.add_account(TEST_USER, "testuser@records.test", TEST_PASS, false);
        for n in 1..=SEEDED_ARTISTS {
            store.add_artist(ArtistPayload {
                name: format!("Seeded Artist {}", n),
                description: None,
            });
        }
        store
    }

    fn add_account(&mut self, username: &str, email: &str, password: &str, is_admin: bool) -> User {
        let user = User {
            id: self.next_user_id,
            email: email.to_lowercase(),
            username: username.to_string(),
            is_active: true,
            is_admin,
            created_at: chrono::Utc::now()
                .naive_utc()
                .format("%Y-%m-%dT%H:%M:%S")
                .to_string(),
        };
        self.next_user_id += 1;
        self.accounts.push(Account {
            user: user.clone(),
            password: password.to_string(),
        });
        user
    }

    fn add_artist(&mut self, payload: ArtistPayload) -> Artist {
        let artist = Artist {
            id: self.next_artist_id,
            name: payload.name,
            description: payload.description,
        };
        self.next_artist_id += 1;
        self.artists.insert(artist.id, artist.clone());
        artist
    }

    fn album(&self, id: i64) -> Option<Album> {
        let (artist_id, payload) = self.albums.get(&id)?;
        let artist = self.artists.get(artist_id)?.clone();
        Some(Album {
            id,
            title: payload.title.clone(),
            release_year: payload.release_year,
            genre: payload.genre.clone(),
            price: payload.price,
            stock: payload.stock,
            artist,
        })
    }

    // ------------------------------------------------------------------------
    // Access control
    // ------------------------------------------------------------------------

    fn caller(&self, headers: &HeaderMap) -> Result<&User, Response> {
        let unauthorized = || detail(StatusCode::UNAUTHORIZED, "Not authenticated");
        let token = headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(unauthorized)?;
        let username = self.tokens.get(token).ok_or_else(unauthorized)?;
        self.accounts
            .iter()
            .map(|account| &account.user)
            .find(|user| &user.username == username)
            .ok_or_else(unauthorized)
    }

    fn require_reader(&self, headers: &HeaderMap) -> Result<(), Response> {
        if self.options.allow_anonymous_reads && !headers.contains_key(AUTHORIZATION) {
            return Ok(());
        }
        self.caller(headers).map(|_| ())
    }

    fn require_admin(&self, headers: &HeaderMap) -> Result<String, Response> {
        let user = self.caller(headers)?;
        if !user.is_admin {
            return Err(detail(StatusCode::FORBIDDEN, "Admin rights required"));
        }
        Ok(user.username.clone())
    }

    // ------------------------------------------------------------------------
    // Auth
    // ------------------------------------------------------------------------

    fn issue_token(&mut self, form: &HashMap<String, String>) -> Handled {
        let username = form.get("username").map(String::as_str).unwrap_or_default();
        let password = form.get("password").map(String::as_str).unwrap_or_default();
        let valid = self
            .accounts
            .iter()
            .any(|account| account.user.username == username && account.password == password);
        if !valid {
            return Err(detail(
                StatusCode::UNAUTHORIZED,
                "Incorrect username or password",
            ));
        }

        self.tokens_issued += 1;
        let token = Token {
            access_token: format!("token-{}-{}", self.tokens_issued, username),
            token_type: "bearer".to_string(),
        };
        self.tokens
            .insert(token.access_token.clone(), username.to_string());
        reply(StatusCode::OK, &token)
    }

    fn register(&mut self, body: &[u8]) -> Handled {
        let request: RegisterRequest = parse_body(body)?;
        if request.username.trim().is_empty() || !validate_email(&request.email) {
            return Err(detail(
                StatusCode::UNPROCESSABLE_ENTITY,
                "username or email is invalid",
            ));
        }
        let taken = self.accounts.iter().any(|account| {
            account.user.username == request.username
                || account.user.email.eq_ignore_ascii_case(&request.email)
        });
        if taken {
            return Err(detail(StatusCode::BAD_REQUEST, "User already registered"));
        }
        let user = self.add_account(&request.username, &request.email, &request.password, false);
        reply(StatusCode::OK, &user)
    }

    fn change_rights(&mut self, headers: &HeaderMap, username: &str, body: &[u8]) -> Handled {
        let admin = self.require_admin(headers)?;
        let patch: RightsPatch = parse_body(body)?;
        let account = self
            .accounts
            .iter_mut()
            .find(|account| account.user.username == username)
            .ok_or_else(|| detail(StatusCode::NOT_FOUND, "User not found"))?;
        if account.user.username == admin {
            return Err(detail(
                StatusCode::BAD_REQUEST,
                "Admins cannot change their own rights",
            ));
        }
        account.user.is_admin = patch.is_admin;
        reply(StatusCode::OK, &account.user)
    }

    // ------------------------------------------------------------------------
    // Artists
    // ------------------------------------------------------------------------

    fn list_artists(&self, headers: &HeaderMap, query: &HashMap<String, String>) -> Handled {
        self.require_reader(headers)?;
        let search = query.get("search");
        let artists: Vec<&Artist> = self
            .artists
            .values()
            .filter(|artist| search.is_none_or(|term| artist.name.contains(term.as_str())))
            .collect();
        reply(StatusCode::OK, &page(artists, query)?)
    }

    fn create_artist(&mut self, headers: &HeaderMap, body: &[u8]) -> Handled {
        self.require_admin(headers)?;
        let payload: ArtistPayload = parse_body(body)?;
        validate_artist(&payload)?;
        let artist = self.add_artist(payload);
        reply(StatusCode::CREATED, &artist)
    }

    fn read_artist(&self, headers: &HeaderMap, id: &str) -> Handled {
        self.require_reader(headers)?;
        let id = parse_id(id)?;
        match self.artists.get(&id) {
            Some(artist) => reply(StatusCode::OK, artist),
            None => Err(detail(StatusCode::NOT_FOUND, "Artist not found")),
        }
    }

    fn update_artist(&mut self, headers: &HeaderMap, id: &str, body: &[u8]) -> Handled {
        self.require_admin(headers)?;
        let id = parse_id(id)?;
        let payload: ArtistPayload = parse_body(body)?;
        validate_artist(&payload)?;
        let artist = self
            .artists
            .get_mut(&id)
            .ok_or_else(|| detail(StatusCode::NOT_FOUND, "Artist not found"))?;
        artist.name = payload.name;
        artist.description = payload.description;
        reply(StatusCode::OK, artist)
    }

    fn delete_artist(&mut self, headers: &HeaderMap, id: &str) -> Handled {
        self.require_admin(headers)?;
        let id = parse_id(id)?;
        self.artists
            .remove(&id)
            .ok_or_else(|| detail(StatusCode::NOT_FOUND, "Artist not found"))?;
        self.albums.retain(|_, (artist_id, _)| *artist_id != id);
        Ok(StatusCode::NO_CONTENT.into_response())
    }

    // ------------------------------------------------------------------------
    // Albums
    // ------------------------------------------------------------------------

    fn list_albums(&self, headers: &HeaderMap, query: &HashMap<String, String>) -> Handled {
        self.require_reader(headers)?;
        let min_price: Option<f64> = parse_param("min_price", query.get("min_price"))?;
        let max_price: Option<f64> = parse_param("max_price", query.get("max_price"))?;
        let genre = query.get("genre");
        if genre.is_some_and(|genre| Genre::from_str(genre).is_none()) {
            return Err(detail(StatusCode::UNPROCESSABLE_ENTITY, "unknown genre"));
        }
        let search = query.get("search").map(|term| term.to_lowercase());

        let mut albums: Vec<Album> = self
            .albums
            .keys()
            .filter_map(|id| self.album(*id))
            .filter(|album| genre.is_none_or(|genre| &album.genre == genre))
            .filter(|album| min_price.is_none_or(|min| album.price >= min))
            .filter(|album| max_price.is_none_or(|max| album.price <= max))
            .filter(|album| {
                search
                    .as_ref()
                    .is_none_or(|term| album.title.to_lowercase().contains(term.as_str()))
            })
            .collect();

        match query.get("sort_by").map(String::as_str) {
            None => {}
            Some("price_asc") => albums.sort_by(|a, b| a.price.total_cmp(&b.price)),
            Some("price_desc") => albums.sort_by(|a, b| b.price.total_cmp(&a.price)),
            Some("title") => albums.sort_by(|a, b| a.title.cmp(&b.title)),
            Some("year") => albums.sort_by_key(|album| album.release_year),
            Some(other) => {
                return Err(detail(
                    StatusCode::UNPROCESSABLE_ENTITY,
                    format!("unknown sort order {:?}", other),
                ))
            }
        }
        reply(StatusCode::OK, &page(albums, query)?)
    }

    fn create_album(&mut self, headers: &HeaderMap, body: &[u8]) -> Handled {
        self.require_admin(headers)?;
        let payload: AlbumPayload = parse_body(body)?;
        validate_album(&payload)?;
        if !self.artists.contains_key(&payload.artist_id) {
            return Err(detail(StatusCode::NOT_FOUND, "Artist not found"));
        }
        let id = self.next_album_id;
        self.next_album_id += 1;
        self.albums.insert(id, (payload.artist_id, payload));
        reply(StatusCode::CREATED, &self.album(id))
    }

    fn read_album(&self, headers: &HeaderMap, id: &str) -> Handled {
        self.require_reader(headers)?;
        let id = parse_id(id)?;
        match self.album(id) {
            Some(album) => reply(StatusCode::OK, &album),
            None => Err(detail(StatusCode::NOT_FOUND, "Album not found")),
        }
    }

    fn update_album(&mut self, headers: &HeaderMap, id: &str, body: &[u8]) -> Handled {
        self.require_admin(headers)?;
        let id = parse_id(id)?;
        let payload: AlbumPayload = parse_body(body)?;
        validate_album(&payload)?;
        if !self.albums.contains_key(&id) {
            return Err(detail(StatusCode::NOT_FOUND, "Album not found"));
        }
        if !self.artists.contains_key(&payload.artist_id) {
            return Err(detail(StatusCode::NOT_FOUND, "Artist not found"));
        }
        self.albums.insert(id, (payload.artist_id, payload));
        reply(StatusCode::OK, &self.album(id))
    }

    fn delete_album(&mut self, headers: &HeaderMap, id: &str) -> Handled {
        self.require_admin(headers)?;
        let id = parse_id(id)?;
        self.albums
            .remove(&id)
            .ok_or_else(|| detail(StatusCode::NOT_FOUND, "Album not found"))?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }
}

fn respond(handled: Handled) -> Response {
    handled.unwrap_or_else(|rejection| rejection)
}

// ============================================================================
// Handlers
// ============================================================================

async fn token(State(store): State<Shared>, Form(form): Form<HashMap<String, String>>) -> Response {
    respond(store.lock().unwrap().issue_token(&form))
}

async fn register(State(store): State<Shared>, body: Bytes) -> Response {
    respond(store.lock().unwrap().register(&body))
}

async fn change_rights(
    State(store): State<Shared>,
    Path(username): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    respond(store.lock().unwrap().change_rights(&headers, &username, &body))
}

async fn list_artists(
    State(store): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    respond(store.lock().unwrap().list_artists(&headers, &query))
}

async fn create_artist(State(store): State<Shared>, headers: HeaderMap, body: Bytes) -> Response {
    respond(store.lock().unwrap().create_artist(&headers, &body))
}

async fn read_artist(
    State(store): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    respond(store.lock().unwrap().read_artist(&headers, &id))
}

async fn update_artist(
    State(store): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    respond(store.lock().unwrap().update_artist(&headers, &id, &body))
}

async fn delete_artist(
    State(store): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    respond(store.lock().unwrap().delete_artist(&headers, &id))
}

async fn list_albums(
    State(store): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    respond(store.lock().unwrap().list_albums(&headers, &query))
}

async fn create_album(State(store): State<Shared>, headers: HeaderMap, body: Bytes) -> Response {
    respond(store.lock().unwrap().create_album(&headers, &body))
}

async fn read_album(
    State(store): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    respond(store.lock().unwrap().read_album(&headers, &id))
}

async fn update_album(
    State(store): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    respond(store.lock().unwrap().update_album(&headers, &id, &body))
}

async fn delete_album(
    State(store): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    respond(store.lock().unwrap().delete_album(&headers, &id))
}

fn make_app(store: Shared) -> Router {
    let route = |path: &str| format!("{}{}", API_PREFIX, path);
    Router::new()
        .route(&route("/auth/token"), post(token))
        .route(&route("/auth/register"), post(register))
        .route(&route("/auth/users/{username}/rights"), patch(change_rights))
        .route(&route("/artists/"), get(list_artists).post(create_artist))
        .route(
            &route("/artists/{id}"),
            get(read_artist).put(update_artist).delete(delete_artist),
        )
        .route(&route("/albums/"), get(list_albums).post(create_album))
        .route(
            &route("/albums/{id}"),
            get(read_album).put(update_album).delete(delete_album),
        )
        .with_state(store)
}

// ============================================================================
// Lifecycle
// ============================================================================

/// Test server instance with its own in-memory records store
///
/// When dropped, the server gracefully shuts down.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    pub port: u16,

    store: Shared,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a contract-abiding server on a random port
    pub async fn spawn() -> Self {
        Self::spawn_with(ServerOptions::default()).await
    }

    /// Spawns a server with the given deviations from the contract
    ///
    /// # Panics
    ///
    /// Panics if the port cannot be bound or the server doesn't become ready
    /// within the timeout.
    pub async fn spawn_with(options: ServerOptions) -> Self {
        let store: Shared = Arc::new(Mutex::new(Store::seeded(options)));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();
        let base_url = format!("http://127.0.0.1:{}", port);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        let app = make_app(store.clone());
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            port,
            store,
            _shutdown_tx: Some(shutdown_tx),
        };
        server.wait_for_ready().await;
        server
    }

    /// Harness configuration pointed at this server, with the seeded identities
    pub fn harness_config(&self) -> HarnessConfig {
        let mut config = HarnessConfig::for_base_url(self.base_url.clone());
        config.api_prefix = API_PREFIX.to_string();
        config.scenarios.album_artist_id = ALBUM_ARTIST_ID;
        config.scenarios.missing_id = MISSING_ID;
        config
    }

    /// Stored user by username
    pub fn user(&self, username: &str) -> Option<User> {
        self.store
            .lock()
            .unwrap()
            .accounts
            .iter()
            .find(|account| account.user.username == username)
            .map(|account| account.user.clone())
    }

    /// Registers a user directly in the store
    pub fn add_user(&self, username: &str, password: &str) -> User {
        let email = format!("{}@records.test", username.to_lowercase());
        self.store
            .lock()
            .unwrap()
            .add_account(username, &email, password, false)
    }

    /// Gives an existing user admin rights directly in the store
    pub fn promote(&self, username: &str) {
        let mut store = self.store.lock().unwrap();
        if let Some(account) = store
            .accounts
            .iter_mut()
            .find(|account| account.user.username == username)
        {
            account.user.is_admin = true;
        }
    }

    pub fn artist_count(&self) -> usize {
        self.store.lock().unwrap().artists.len()
    }

    pub fn album_count(&self) -> usize {
        self.store.lock().unwrap().albums.len()
    }

    /// Number of successful credential exchanges so far
    pub fn tokens_issued(&self) -> u64 {
        self.store.lock().unwrap().tokens_issued
    }

    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);
        let probe = format!("{}{}/artists/", self.base_url, API_PREFIX);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            // Any response at all means the listener is serving.
            if client.get(&probe).send().await.is_ok() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
