//! Postgres-backed storage (spec §3). Each submodule is a narrow repository
//! over one aggregate, following the teacher's `XRepository { pool: PgPool }`
//! shape; [`Store`] is the single handle `http` and the domain modules share.

pub mod auth_tokens;
pub mod blocks;
pub mod credits;
pub mod image_permissions;
pub mod keys;
pub mod likes;
pub mod matches;
pub mod messages;
pub mod notification_settings;
pub mod passes;
pub mod photos;
pub mod preferences;
pub mod profiles;
pub mod push_tokens;
pub mod reports;
pub mod users;

use sqlx::PgPool;

#[derive(Clone)]
pub struct Store {
    pub pool: PgPool,
    pub users: users::UserRepository,
    pub profiles: profiles::ProfileRepository,
    pub photos: photos::PhotoRepository,
    pub preferences: preferences::PreferenceRepository,
    pub likes: likes::LikeRepository,
    pub passes: passes::PassRepository,
    pub matches: matches::MatchRepository,
    pub messages: messages::MessageRepository,
    pub image_permissions: image_permissions::ImagePermissionRepository,
    pub blocks: blocks::BlockRepository,
    pub credits: credits::CreditRepository,
    pub push_tokens: push_tokens::PushTokenRepository,
    pub auth_tokens: auth_tokens::AuthTokenRepository,
    pub notification_settings: notification_settings::NotificationSettingsRepository,
    pub reports: reports::ReportRepository,
    pub public_keys: keys::PublicKeyRepository,
}

impl Store {
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: users::UserRepository::new(pool.clone()),
            profiles: profiles::ProfileRepository::new(pool.clone()),
            photos: photos::PhotoRepository::new(pool.clone()),
            preferences: preferences::PreferenceRepository::new(pool.clone()),
            likes: likes::LikeRepository::new(pool.clone()),
            passes: passes::PassRepository::new(pool.clone()),
            matches: matches::MatchRepository::new(pool.clone()),
            messages: messages::MessageRepository::new(pool.clone()),
            image_permissions: image_permissions::ImagePermissionRepository::new(pool.clone()),
            blocks: blocks::BlockRepository::new(pool.clone()),
            credits: credits::CreditRepository::new(pool.clone()),
            push_tokens: push_tokens::PushTokenRepository::new(pool.clone()),
            auth_tokens: auth_tokens::AuthTokenRepository::new(pool.clone()),
            notification_settings: notification_settings::NotificationSettingsRepository::new(
                pool.clone(),
            ),
            reports: reports::ReportRepository::new(pool.clone()),
            public_keys: keys::PublicKeyRepository::new(pool.clone()),
            pool,
        }
    }
}
