use async_trait::async_trait;

use super::InMemoryStore;
use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, UserId};
use crate::domain::settings::UserSettings;
use crate::ports::SettingsRepository;

#[async_trait]
impl SettingsRepository for InMemoryStore {
    async fn get_or_create(
        &self,
        user_id: &UserId,
        now: Timestamp,
    ) -> Result<UserSettings, DomainError> {
        let mut state = self.state.write().await;
        if !state.users.contains_key(user_id) {
            return Err(DomainError::new(ErrorCode::UserNotFound, "User not found"));
        }
        Ok(state
            .settings
            .entry(*user_id)
            .or_insert_with(|| UserSettings::defaults(*user_id, now))
            .clone())
    }

    async fn save(&self, settings: &UserSettings) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        if !state.users.contains_key(&settings.user_id) {
            return Err(DomainError::new(ErrorCode::UserNotFound, "User not found"));
        }
        state.settings.insert(settings.user_id, settings.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_user_has_no_settings() {
        let store = InMemoryStore::new();
        let err = store
            .get_or_create(&UserId::new(), Timestamp::now())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::UserNotFound);
    }
}
