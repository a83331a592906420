use tracing::info;

use crate::error::{AppError, AppResult};
use crate::guard::Redirect;
use crate::models::{EducationLevel, NewProfile, Profile, Role};
use crate::session::SessionProvider;
use crate::store::Store;

/// Fields collected by the completion form.
#[derive(Debug, Clone, Default)]
pub struct ProfileForm {
    pub full_name: String,
    pub age: Option<i32>,
    pub role: Option<Role>,
    pub education_level: Option<EducationLevel>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    Created(Profile),
    Redirect(Redirect),
}

impl ProfileForm {
    fn validate(&self) -> AppResult<Role> {
        let Some(role) = self.role else {
            return Err(AppError::validation("select whether you are a student or a tutor"));
        };
        if self.full_name.trim().is_empty() {
            return Err(AppError::validation("full name is required"));
        }
        if let Some(age) = self.age {
            if !(1..=120).contains(&age) {
                return Err(AppError::validation(format!("age {age} is out of range")));
            }
        }
        Ok(role)
    }
}

/// Creates the one profile a verified account gets. An account that already
/// has a profile is sent to its dashboard instead; roles never change.
pub async fn complete_profile(
    session: &dyn SessionProvider,
    store: &dyn Store,
    form: &ProfileForm,
) -> AppResult<Completion> {
    let Some(user) = session.current_user().await? else {
        return Ok(Completion::Redirect(Redirect::Login));
    };

    if let Some(existing) = store.fetch_profile(user.id).await? {
        return Ok(Completion::Redirect(Redirect::Home(existing.role)));
    }

    let role = form.validate()?;
    // The level picker is only offered to students.
    let education_level = match role {
        Role::Student => form.education_level,
        Role::Tutor => None,
    };

    let profile = store
        .insert_profile(&NewProfile {
            id: user.id,
            email: user.email,
            full_name: form.full_name.trim().to_string(),
            age: form.age,
            role,
            education_level,
        })
        .await?;

    info!(user_id = %profile.id, role = %profile.role, "profile completed");
    Ok(Completion::Created(profile))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::session::StaticSession;
    use uuid::Uuid;

    fn form(role: Option<Role>) -> ProfileForm {
        ProfileForm {
            full_name: " Ana Lopez ".to_string(),
            age: Some(14),
            role,
            education_level: Some(EducationLevel::Basicos),
        }
    }

    #[tokio::test]
    async fn creates_profile_from_session_identity() {
        let store = MemoryStore::default();
        let id = Uuid::new_v4();
        let session = StaticSession::signed_in(id, "ana@example.com");

        let completion = complete_profile(&session, &store, &form(Some(Role::Student)))
            .await
            .unwrap();
        let Completion::Created(profile) = completion else {
            panic!("expected a new profile, got {completion:?}");
        };
        assert_eq!(profile.id, id);
        assert_eq!(profile.email, "ana@example.com");
        assert_eq!(profile.full_name, "Ana Lopez");
        assert_eq!(profile.education_level, Some(EducationLevel::Basicos));
    }

    #[tokio::test]
    async fn missing_role_is_rejected() {
        let store = MemoryStore::default();
        let session = StaticSession::signed_in(Uuid::new_v4(), "ana@example.com");

        let err = complete_profile(&session, &store, &form(None))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(store.profiles.lock().await.is_empty());
    }

    #[tokio::test]
    async fn existing_profile_redirects_home() {
        let store = MemoryStore::default();
        let id = Uuid::new_v4();
        let session = StaticSession::signed_in(id, "tomas@example.com");
        complete_profile(&session, &store, &form(Some(Role::Tutor)))
            .await
            .unwrap();

        let again = complete_profile(&session, &store, &form(Some(Role::Student)))
            .await
            .unwrap();
        assert_eq!(again, Completion::Redirect(Redirect::Home(Role::Tutor)));

        let stored = store.fetch_profile(id).await.unwrap().unwrap();
        assert_eq!(stored.role, Role::Tutor);
        assert_eq!(stored.education_level, None);
    }

    #[tokio::test]
    async fn anonymous_is_sent_to_login() {
        let store = MemoryStore::default();
        let session = StaticSession::anonymous();
        let completion = complete_profile(&session, &store, &form(Some(Role::Student)))
            .await
            .unwrap();
        assert_eq!(completion, Completion::Redirect(Redirect::Login));
    }

    #[test]
    fn age_must_be_plausible() {
        let mut form = form(Some(Role::Student));
        form.age = Some(0);
        assert!(form.validate().is_err());
        form.age = None;
        assert_eq!(form.validate().unwrap(), Role::Student);
    }
}
