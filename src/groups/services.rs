use tracing::{info, instrument, warn};

use super::{
    dto::CreateGroupRequest,
    repo_types::{Group, NewGroup},
};
use crate::{
    auth::AuthUser,
    error::{AppError, ErrorDetail},
    state::AppState,
};

#[instrument(skip(st))]
pub async fn list_groups(st: &AppState) -> Result<Vec<Group>, AppError> {
    Ok(st.groups.list().await?)
}

#[instrument(skip(st))]
pub async fn find_group_by_id(st: &AppState, id: i64) -> Result<Group, AppError> {
    st.groups
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("group not found".into()))
}

#[instrument(skip(st, req), fields(user_id = user.id))]
pub async fn create_group(
    st: &AppState,
    user: &AuthUser,
    req: CreateGroupRequest,
) -> Result<Group, AppError> {
    let title = req.title.trim();
    if title.is_empty() {
        warn!("group without title rejected");
        return Err(AppError::validation(
            "validation error",
            vec![ErrorDetail::required("title")],
        ));
    }

    let group = st
        .groups
        .create(&NewGroup {
            title: title.to_string(),
            description: req.description,
            profile_picture: req.profile_picture.filter(|p| !p.is_empty()),
            created_by: user.id,
        })
        .await?;
    info!(group_id = group.id, "group created");
    Ok(group)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> AuthUser {
        AuthUser {
            id: 7,
            username: "owner".into(),
        }
    }

    #[tokio::test]
    async fn create_and_fetch_group() {
        let st = AppState::fake();
        let created = create_group(
            &st,
            &owner(),
            CreateGroupRequest {
                title: " Rustaceans ".into(),
                description: "crabs".into(),
                profile_picture: Some(String::new()),
            },
        )
        .await
        .unwrap();
        assert_eq!(created.title, "Rustaceans");
        assert_eq!(created.created_by, 7);
        assert_eq!(created.profile_picture, None);

        let found = find_group_by_id(&st, created.id).await.unwrap();
        assert_eq!(found, created);
        assert_eq!(list_groups(&st).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn title_is_required() {
        let st = AppState::fake();
        let err = create_group(&st, &owner(), CreateGroupRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
        assert!(list_groups(&st).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_group_is_not_found() {
        let st = AppState::fake();
        assert!(matches!(
            find_group_by_id(&st, 99).await,
            Err(AppError::NotFound(_))
        ));
    }
}
