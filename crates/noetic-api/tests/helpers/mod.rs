//! Test helpers for orchestrator and handler tests.
//!
//! In-memory implementations of every collaborator trait, each with switches
//! to inject failures, plus a [`TestApp`] wiring them into the services.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use noetic_api::services::{
    AdminService, ApiKeyService, AuthService, AuthSettings, IdentityStores, KnowledgeService,
};
use noetic_api::AppState;
use noetic_core::{
    ApiKey, ApiKeyRepository, AuthProviderRecord, AuthProviderRepository, ClientInfo, Credential,
    CredentialRepository, EmailMessage, Error, Knowledge, KnowledgeForm, KnowledgeRepository,
    KnowledgeUpdate, NewApiKey, NewUser, Notifier, Result, SessionCache, UniqueField, User,
    UserRepository, UserRole, Vector, VectorIndex, VectorPoint,
};
use noetic_crypto::{AccessTokenIssuer, Argon2Hasher, HashParams};
use noetic_inference::MockEmbeddingBackend;

pub const JWT_SECRET: &[u8] = b"test-secret-with-enough-entropy-0123456789";
pub const PASSWORD: &str = "correct horse battery";

fn injected(what: &str) -> Error {
    Error::Internal(format!("injected {} failure", what))
}

/// A failure switch.
#[derive(Default)]
pub struct Switch(AtomicBool);

impl Switch {
    pub fn set(&self, on: bool) {
        self.0.store(on, Ordering::SeqCst);
    }

    pub fn on(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// =============================================================================
// IDENTITY STORES
// =============================================================================

#[derive(Default)]
pub struct InMemoryUsers {
    rows: Mutex<Vec<User>>,
    pub fail: Switch,
}

impl InMemoryUsers {
    pub fn count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn set_role(&self, id: Uuid, role: UserRole) {
        let mut rows = self.rows.lock().unwrap();
        if let Some(user) = rows.iter_mut().find(|u| u.id == id) {
            user.role = role;
        }
    }

    pub fn set_active(&self, id: Uuid, active: bool) {
        let mut rows = self.rows.lock().unwrap();
        if let Some(user) = rows.iter_mut().find(|u| u.id == id) {
            user.is_active = active;
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn insert(&self, user: NewUser) -> Result<User> {
        if self.fail.on() {
            return Err(injected("user store"));
        }
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|u| u.email == user.email) {
            return Err(Error::DuplicateField(UniqueField::Email));
        }
        if rows.iter().any(|u| u.name == user.name) {
            return Err(Error::DuplicateField(UniqueField::Name));
        }
        let now = Utc::now();
        let row = User {
            id: Uuid::now_v7(),
            email: user.email,
            name: user.name,
            role: user.role,
            is_active: true,
            is_verified: false,
            created_at: now,
            updated_at: now,
        };
        rows.push(row.clone());
        Ok(row)
    }

    async fn get(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.rows.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        if self.fail.on() {
            return Err(injected("user store"));
        }
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<User>> {
        Ok(self.rows.lock().unwrap().clone())
    }

    async fn mark_verified(&self, id: Uuid) -> Result<Option<User>> {
        let mut rows = self.rows.lock().unwrap();
        Ok(rows.iter_mut().find(|u| u.id == id).map(|u| {
            u.is_verified = true;
            u.updated_at = Utc::now();
            u.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|u| u.id != id);
        Ok(rows.len() != before)
    }
}

#[derive(Default)]
pub struct InMemoryCredentials {
    rows: Mutex<HashMap<Uuid, Credential>>,
    pub fail_insert: Switch,
}

impl InMemoryCredentials {
    pub fn get_sync(&self, user_id: Uuid) -> Option<Credential> {
        self.rows.lock().unwrap().get(&user_id).cloned()
    }

    pub fn set_active(&self, user_id: Uuid, active: bool) {
        if let Some(cred) = self.rows.lock().unwrap().get_mut(&user_id) {
            cred.is_active = active;
        }
    }
}

#[async_trait]
impl CredentialRepository for InMemoryCredentials {
    async fn insert(&self, user_id: Uuid, password_hash: &str) -> Result<()> {
        if self.fail_insert.on() {
            return Err(injected("credential store"));
        }
        self.rows.lock().unwrap().insert(
            user_id,
            Credential {
                user_id,
                password_hash: password_hash.to_string(),
                is_active: true,
                password_changed_at: Utc::now(),
            },
        );
        Ok(())
    }

    async fn get_by_user_id(&self, user_id: Uuid) -> Result<Option<Credential>> {
        Ok(self.get_sync(user_id))
    }

    async fn update_password(
        &self,
        user_id: Uuid,
        password_hash: &str,
        changed_at: DateTime<Utc>,
    ) -> Result<bool> {
        let mut rows = self.rows.lock().unwrap();
        Ok(match rows.get_mut(&user_id) {
            Some(cred) => {
                cred.password_hash = password_hash.to_string();
                cred.password_changed_at = changed_at;
                true
            }
            None => false,
        })
    }
}

#[derive(Default)]
pub struct InMemoryProviders {
    rows: Mutex<Vec<AuthProviderRecord>>,
    pub fail_insert: Switch,
}

impl InMemoryProviders {
    pub fn for_user(&self, user_id: Uuid) -> Vec<AuthProviderRecord> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl AuthProviderRepository for InMemoryProviders {
    async fn insert(
        &self,
        user_id: Uuid,
        provider: &str,
        provider_subject: &str,
    ) -> Result<AuthProviderRecord> {
        if self.fail_insert.on() {
            return Err(injected("provider store"));
        }
        let record = AuthProviderRecord {
            id: Uuid::now_v7(),
            user_id,
            provider: provider.to_string(),
            provider_subject: provider_subject.to_string(),
            last_login_at: None,
            last_login_ip: None,
            last_login_user_agent: None,
            created_at: Utc::now(),
        };
        self.rows.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn record_login(
        &self,
        user_id: Uuid,
        provider: &str,
        at: DateTime<Utc>,
        client: &ClientInfo,
    ) -> Result<()> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(record) = rows
            .iter_mut()
            .find(|r| r.user_id == user_id && r.provider == provider)
        {
            record.last_login_at = Some(at);
            record.last_login_ip = client.address.clone();
            record.last_login_user_agent = client.user_agent.clone();
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryApiKeys {
    rows: Mutex<Vec<ApiKey>>,
    pub fail_record_use: Switch,
}

impl InMemoryApiKeys {
    pub fn get(&self, id: Uuid) -> Option<ApiKey> {
        self.rows.lock().unwrap().iter().find(|k| k.id == id).cloned()
    }
}

#[async_trait]
impl ApiKeyRepository for InMemoryApiKeys {
    async fn insert(&self, key: NewApiKey) -> Result<ApiKey> {
        let row = ApiKey {
            id: Uuid::now_v7(),
            user_id: key.user_id,
            name: key.name,
            access_key: key.access_key,
            secret_hash: key.secret_hash,
            total_requests: 0,
            is_active: true,
            last_used_at: None,
            created_at: Utc::now(),
        };
        self.rows.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn list(&self, user_id: Uuid) -> Result<Vec<ApiKey>> {
        let mut keys: Vec<ApiKey> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|k| k.user_id == user_id)
            .cloned()
            .collect();
        keys.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(keys)
    }

    async fn get_by_access_key(&self, access_key: &str) -> Result<Option<ApiKey>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|k| k.access_key == access_key)
            .cloned())
    }

    async fn set_active(
        &self,
        user_id: Uuid,
        id: Uuid,
        is_active: bool,
    ) -> Result<Option<ApiKey>> {
        let mut rows = self.rows.lock().unwrap();
        Ok(rows
            .iter_mut()
            .find(|k| k.id == id && k.user_id == user_id)
            .map(|k| {
                k.is_active = is_active;
                k.clone()
            }))
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|k| !(k.id == id && k.user_id == user_id));
        Ok(rows.len() < before)
    }

    async fn record_use(&self, id: Uuid, at: DateTime<Utc>) -> Result<()> {
        if self.fail_record_use.on() {
            return Err(injected("api key store"));
        }
        if let Some(k) = self.rows.lock().unwrap().iter_mut().find(|k| k.id == id) {
            k.total_requests += 1;
            k.last_used_at = Some(at);
        }
        Ok(())
    }
}

// =============================================================================
// KNOWLEDGE STORE
// =============================================================================

#[derive(Default)]
pub struct InMemoryKnowledge {
    rows: Mutex<HashMap<Uuid, Knowledge>>,
    pub fail_update: Switch,
    pub fail_restore: Switch,
    pub fail_get: Switch,
}

impl InMemoryKnowledge {
    pub fn get_sync(&self, id: Uuid) -> Option<Knowledge> {
        self.rows.lock().unwrap().get(&id).cloned()
    }

    pub fn count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    /// Drop a row behind the orchestrator's back.
    pub fn remove_raw(&self, id: Uuid) {
        self.rows.lock().unwrap().remove(&id);
    }

    fn owned_by(&self, owner: Uuid, pred: impl Fn(&Knowledge) -> bool) -> Vec<Knowledge> {
        let mut out: Vec<Knowledge> = self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|k| k.user_id == owner && pred(k))
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        out
    }
}

#[async_trait]
impl KnowledgeRepository for InMemoryKnowledge {
    async fn insert(&self, owner: Uuid, form: KnowledgeForm) -> Result<Knowledge> {
        let mut rows = self.rows.lock().unwrap();
        if rows.values().any(|k| k.title == form.title) {
            return Err(Error::DuplicateField(UniqueField::Title));
        }
        let now = Utc::now();
        let row = Knowledge {
            id: Uuid::now_v7(),
            user_id: owner,
            topic: form.topic,
            tags: form.tags,
            title: form.title,
            content: form.content,
            created_at: now,
            updated_at: now,
        };
        rows.insert(row.id, row.clone());
        Ok(row)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Knowledge>> {
        if self.fail_get.on() {
            return Err(injected("knowledge read"));
        }
        Ok(self.get_sync(id))
    }

    async fn get_by_title(&self, title: &str) -> Result<Option<Knowledge>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .find(|k| k.title == title)
            .cloned())
    }

    async fn list(&self, owner: Uuid) -> Result<Vec<Knowledge>> {
        Ok(self.owned_by(owner, |_| true))
    }

    async fn list_by_topic(&self, owner: Uuid, topic: &str) -> Result<Vec<Knowledge>> {
        Ok(self.owned_by(owner, |k| k.topic == topic))
    }

    async fn list_by_tag(&self, owner: Uuid, tag: &str) -> Result<Vec<Knowledge>> {
        Ok(self.owned_by(owner, |k| k.has_tag(tag)))
    }

    async fn list_ids_by_owner(&self, owner: Uuid) -> Result<Vec<Uuid>> {
        Ok(self.owned_by(owner, |_| true).into_iter().map(|k| k.id).collect())
    }

    async fn update(&self, id: Uuid, update: KnowledgeUpdate) -> Result<Option<Knowledge>> {
        if self.fail_update.on() {
            return Err(injected("knowledge update"));
        }
        let mut rows = self.rows.lock().unwrap();
        if let Some(title) = &update.title {
            if rows.values().any(|k| k.id != id && &k.title == title) {
                return Err(Error::DuplicateField(UniqueField::Title));
            }
        }
        Ok(rows.get_mut(&id).map(|k| {
            if let Some(topic) = update.topic {
                k.topic = topic;
            }
            if let Some(tags) = update.tags {
                k.tags = tags;
            }
            if let Some(title) = update.title {
                k.title = title;
            }
            if let Some(content) = update.content {
                k.content = content;
            }
            k.updated_at = Utc::now();
            k.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        Ok(self.rows.lock().unwrap().remove(&id).is_some())
    }

    async fn restore(&self, knowledge: &Knowledge) -> Result<Knowledge> {
        if self.fail_restore.on() {
            return Err(injected("knowledge restore"));
        }
        self.rows
            .lock()
            .unwrap()
            .insert(knowledge.id, knowledge.clone());
        Ok(knowledge.clone())
    }
}

// =============================================================================
// SESSION CACHE
// =============================================================================

#[derive(Default)]
pub struct InMemoryCache {
    entries: Mutex<HashMap<String, (String, Instant)>>,
    pub fail: Switch,
}

impl InMemoryCache {
    fn live(&self, key: &str) -> Option<String> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get(key) {
            Some((value, expires)) if *expires > Instant::now() => Some(value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn peek(&self, key: &str) -> Option<String> {
        self.live(key)
    }

    /// Write a key with a one-hour TTL, bypassing failure switches.
    pub fn set_ex_sync(&self, key: &str, value: &str) {
        self.entries.lock().unwrap().insert(
            key.to_string(),
            (value.to_string(), Instant::now() + Duration::from_secs(3600)),
        );
    }

    /// Expire a key immediately, as if its TTL had elapsed.
    pub fn expire(&self, key: &str) {
        self.entries.lock().unwrap().remove(key);
    }

    pub fn ttl(&self, key: &str) -> Option<Duration> {
        self.entries
            .lock()
            .unwrap()
            .get(key)
            .map(|(_, expires)| expires.saturating_duration_since(Instant::now()))
    }

    pub fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.entries
            .lock()
            .unwrap()
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl SessionCache for InMemoryCache {
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        if self.fail.on() {
            return Err(Error::Cache("injected cache failure".to_string()));
        }
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), (value.to_string(), Instant::now() + ttl));
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        if self.fail.on() {
            return Err(Error::Cache("injected cache failure".to_string()));
        }
        Ok(self.live(key))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        if self.fail.on() {
            return Err(Error::Cache("injected cache failure".to_string()));
        }
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }

    async fn incr_with_expiry(&self, key: &str, ttl: Duration) -> Result<i64> {
        if self.fail.on() {
            return Err(Error::Cache("injected cache failure".to_string()));
        }
        let mut entries = self.entries.lock().unwrap();
        let now = Instant::now();
        let current = match entries.get(key) {
            Some((value, expires)) if *expires > now => Some((value.parse::<i64>().unwrap_or(0), *expires)),
            _ => None,
        };
        let (count, expires) = match current {
            Some((count, expires)) => (count + 1, expires),
            None => (1, now + ttl),
        };
        entries.insert(key.to_string(), (count.to_string(), expires));
        Ok(count)
    }
}

// =============================================================================
// VECTOR INDEX
// =============================================================================

#[derive(Default)]
pub struct InMemoryVectorIndex {
    points: Mutex<HashMap<(String, Uuid), (Vec<f32>, String, serde_json::Value)>>,
    pub fail_upsert: Switch,
    pub fail_delete: Switch,
    pub fail_search: Switch,
}

impl InMemoryVectorIndex {
    pub fn contains(&self, collection: &str, id: Uuid) -> bool {
        self.points
            .lock()
            .unwrap()
            .contains_key(&(collection.to_string(), id))
    }

    pub fn metadata(&self, collection: &str, id: Uuid) -> Option<serde_json::Value> {
        self.points
            .lock()
            .unwrap()
            .get(&(collection.to_string(), id))
            .map(|(_, _, meta)| meta.clone())
    }

    pub fn vector(&self, collection: &str, id: Uuid) -> Option<Vec<f32>> {
        self.points
            .lock()
            .unwrap()
            .get(&(collection.to_string(), id))
            .map(|(v, _, _)| v.clone())
    }

    pub fn count(&self) -> usize {
        self.points.lock().unwrap().len()
    }
}

#[async_trait]
impl VectorIndex for InMemoryVectorIndex {
    async fn upsert(&self, collection: &str, points: Vec<VectorPoint>) -> Result<()> {
        if self.fail_upsert.on() {
            return Err(Error::VectorIndex("injected upsert failure".to_string()));
        }
        let mut map = self.points.lock().unwrap();
        for p in points {
            map.insert(
                (collection.to_string(), p.id),
                (p.vector.to_vec(), p.text, p.metadata),
            );
        }
        Ok(())
    }

    async fn delete(&self, collection: &str, ids: &[Uuid]) -> Result<()> {
        if self.fail_delete.on() {
            return Err(Error::VectorIndex("injected delete failure".to_string()));
        }
        let mut map = self.points.lock().unwrap();
        for id in ids {
            map.remove(&(collection.to_string(), *id));
        }
        Ok(())
    }

    async fn search(&self, collection: &str, vector: &Vector, limit: i64) -> Result<Vec<Uuid>> {
        if self.fail_search.on() {
            return Err(Error::VectorIndex("injected search failure".to_string()));
        }
        let query = vector.as_slice();
        let map = self.points.lock().unwrap();
        let mut scored: Vec<(f32, Uuid)> = map
            .iter()
            .filter(|((c, _), _)| c == collection)
            .map(|((_, id), (v, _, _))| {
                let score: f32 = v.iter().zip(query).map(|(a, b)| a * b).sum();
                (score, *id)
            })
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));
        Ok(scored
            .into_iter()
            .take(limit.max(0) as usize)
            .map(|(_, id)| id)
            .collect())
    }
}

// =============================================================================
// NOTIFIER
// =============================================================================

#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<EmailMessage>>,
    pub fail: Switch,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }

    /// Wait for spawned dispatches to land.
    pub async fn wait_for(&self, count: usize) -> Vec<EmailMessage> {
        for _ in 0..100 {
            if self.sent.lock().unwrap().len() >= count {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        self.sent()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, message: EmailMessage) -> Result<()> {
        if self.fail.on() {
            return Err(Error::Notification("injected notifier failure".to_string()));
        }
        self.sent.lock().unwrap().push(message);
        Ok(())
    }
}

/// Pull the `token=` query value out of an emailed link.
pub fn token_from_email(message: &EmailMessage) -> String {
    let start = message
        .text
        .find("token=")
        .map(|i| i + "token=".len())
        .expect("email carries a token link");
    message.text[start..]
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_string()
}

// =============================================================================
// WIRING
// =============================================================================

/// Services wired to in-memory collaborators.
pub struct TestApp {
    pub auth: AuthService,
    pub knowledge: KnowledgeService,
    pub admin: AdminService,
    pub api_keys: ApiKeyService,
    pub users: Arc<InMemoryUsers>,
    pub credentials: Arc<InMemoryCredentials>,
    pub providers: Arc<InMemoryProviders>,
    pub api_key_repo: Arc<InMemoryApiKeys>,
    pub knowledge_repo: Arc<InMemoryKnowledge>,
    pub cache: Arc<InMemoryCache>,
    pub index: Arc<InMemoryVectorIndex>,
    pub embedder: Arc<MockEmbeddingBackend>,
    pub notifier: Arc<RecordingNotifier>,
    pub issuer: AccessTokenIssuer,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_settings(AuthSettings::default())
    }

    pub fn with_settings(settings: AuthSettings) -> Self {
        let users = Arc::new(InMemoryUsers::default());
        let credentials = Arc::new(InMemoryCredentials::default());
        let providers = Arc::new(InMemoryProviders::default());
        let api_key_repo = Arc::new(InMemoryApiKeys::default());
        let knowledge_repo = Arc::new(InMemoryKnowledge::default());
        let cache = Arc::new(InMemoryCache::default());
        let index = Arc::new(InMemoryVectorIndex::default());
        let embedder = Arc::new(MockEmbeddingBackend::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let issuer = AccessTokenIssuer::new(JWT_SECRET, chrono::Duration::minutes(60));

        let auth = AuthService::new(
            IdentityStores {
                users: users.clone(),
                credentials: credentials.clone(),
                providers: providers.clone(),
            },
            cache.clone(),
            notifier.clone(),
            issuer.clone(),
            Argon2Hasher::new(HashParams::insecure_fast()),
            settings,
        );
        let knowledge = KnowledgeService::new(knowledge_repo.clone(), embedder.clone(), index.clone());
        let admin = AdminService::new(
            users.clone(),
            knowledge_repo.clone(),
            index.clone(),
            cache.clone(),
        );
        let api_keys = ApiKeyService::new(api_key_repo.clone(), users.clone(), issuer.clone());

        Self {
            auth,
            knowledge,
            admin,
            api_keys,
            users,
            credentials,
            providers,
            api_key_repo,
            knowledge_repo,
            cache,
            index,
            embedder,
            notifier,
            issuer,
        }
    }

    pub fn state(&self) -> AppState {
        AppState {
            auth: self.auth.clone(),
            knowledge: self.knowledge.clone(),
            admin: self.admin.clone(),
            api_keys: self.api_keys.clone(),
        }
    }

    /// Sign up a user with [`PASSWORD`].
    pub async fn signup(&self, name: &str) -> User {
        let email = format!("{}@example.com", name);
        let response = self
            .auth
            .signup(&email, PASSWORD, name)
            .await
            .expect("signup succeeds");
        self.users
            .get(response.id)
            .await
            .unwrap()
            .expect("user row exists")
    }

    /// Sign up and log in, returning the user and its access token.
    pub async fn login_as(&self, name: &str) -> (User, String) {
        let user = self.signup(name).await;
        let response = self
            .auth
            .login(&user.email, PASSWORD, &ClientInfo::default())
            .await
            .expect("login succeeds");
        (user, response.access_token)
    }
}

pub fn knowledge_form(title: &str, topic: &str, tags: &[&str], content: &str) -> KnowledgeForm {
    KnowledgeForm {
        topic: topic.to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        title: title.to_string(),
        content: content.to_string(),
    }
}
