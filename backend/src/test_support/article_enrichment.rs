//! Test doubles and fixtures for article enrichment.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use mockable::Clock;
use serde::Serialize;

use crate::domain::ports::{AuthorSource, UpstreamOutcome};
use crate::domain::{
    Article, ArticleId, AuthorId, AuthorView, BackoffSleeper, CallContext, Interrupted,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(_) => panic!("test double mutex poisoned"),
    }
}

fn fixed_instant() -> DateTime<Utc> {
    match Utc.with_ymd_and_hms(2025, 1, 15, 9, 30, 0).single() {
        Some(instant) => instant,
        None => panic!("fixture instant must be valid"),
    }
}

fn author_id(raw: i32) -> AuthorId {
    match AuthorId::new(i64::from(raw)) {
        Ok(id) => id,
        Err(error) => panic!("fixture author id {raw}: {error}"),
    }
}

/// Author record for identifier `id`.
pub fn sample_author(id: i32) -> AuthorView {
    let at = fixed_instant();
    AuthorView {
        id: author_id(id),
        name: format!("Author {id}"),
        email: format!("author{id}@example.com"),
        created_at: at,
        updated_at: at,
    }
}

/// Stored article `id` owned by `author`.
pub fn sample_article(id: i32, author: i32) -> Article {
    let at = fixed_instant();
    let article_id = match ArticleId::new(i64::from(id)) {
        Ok(article_id) => article_id,
        Err(error) => panic!("fixture article id {id}: {error}"),
    };
    Article {
        id: article_id,
        title: format!("Title {id}"),
        content: format!("Content {id}"),
        author_id: author_id(author),
        created_at: at,
        updated_at: at,
    }
}

/// Clock whose time only moves when told to.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl Default for MutableClock {
    fn default() -> Self {
        Self::new(fixed_instant())
    }
}

impl MutableClock {
    /// Clock frozen at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    /// Move the clock forward.
    pub fn advance(&self, delta: Duration) {
        let delta = match TimeDelta::from_std(delta) {
            Ok(delta) => delta,
            Err(error) => panic!("failed to convert {delta:?} to TimeDelta: {error}"),
        };
        *lock(&self.0) += delta;
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *lock(&self.0)
    }
}

/// Sleeper that returns immediately and remembers requested delays.
#[derive(Default)]
pub struct RecordingSleeper(Mutex<Vec<Duration>>);

impl RecordingSleeper {
    /// Delays requested so far, in order.
    pub fn delays(&self) -> Vec<Duration> {
        lock(&self.0).clone()
    }
}

#[async_trait]
impl BackoffSleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        lock(&self.0).push(duration);
    }
}

/// Author source that replays scripted outcomes per author.
///
/// Authors without a script, or whose script is exhausted, get the
/// fallback outcome. A `Found` fallback answers with the requested id.
pub struct ScriptedAuthorSource {
    scripts: Mutex<HashMap<AuthorId, VecDeque<UpstreamOutcome>>>,
    fallback: UpstreamOutcome,
    calls: Mutex<Vec<AuthorId>>,
}

impl ScriptedAuthorSource {
    /// Source answering `fallback` to every lookup.
    pub fn new(fallback: UpstreamOutcome) -> Self {
        Self {
            scripts: Mutex::new(HashMap::new()),
            fallback,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Source that finds every author.
    pub fn always_found() -> Self {
        Self::new(UpstreamOutcome::Found(sample_author(1)))
    }

    /// Queue outcomes for one author.
    #[must_use]
    pub fn script(self, author: i32, outcomes: Vec<UpstreamOutcome>) -> Self {
        lock(&self.scripts).insert(author_id(author), outcomes.into());
        self
    }

    /// Authors looked up so far, in call order.
    pub fn calls(&self) -> Vec<AuthorId> {
        lock(&self.calls).clone()
    }

    /// Number of lookups so far.
    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }
}

#[async_trait]
impl AuthorSource for ScriptedAuthorSource {
    async fn fetch_author(
        &self,
        id: AuthorId,
        ctx: &CallContext,
    ) -> Result<UpstreamOutcome, Interrupted> {
        ctx.check()?;
        lock(&self.calls).push(id);
        let scripted = lock(&self.scripts)
            .get_mut(&id)
            .and_then(VecDeque::pop_front);
        Ok(match scripted {
            Some(outcome) => outcome,
            None => match &self.fallback {
                UpstreamOutcome::Found(_) => UpstreamOutcome::Found(sample_author(id.get())),
                other => other.clone(),
            },
        })
    }
}

#[derive(Serialize)]
struct TestClaims<'a> {
    user_id: i64,
    email: &'a str,
    exp: i64,
}

/// HS256 credential for `user_id` expiring `expires_in_secs` from now;
/// negative values produce an already expired credential.
pub fn signed_token(secret: &str, user_id: i64, expires_in_secs: i64) -> String {
    let claims = TestClaims {
        user_id,
        email: "author@example.com",
        exp: Utc::now().timestamp() + expires_in_secs,
    };
    match encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    ) {
        Ok(token) => token,
        Err(error) => panic!("failed to sign test token: {error}"),
    }
}
