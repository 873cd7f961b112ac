//! Who may edit a book: administrators always, publishers only their own.

use kniga_authz::{Principal, Role};

use crate::services::{PublisherId, UsersService};

pub async fn can_edit_book(
    principal: &Principal,
    users: &dyn UsersService,
    owner: &PublisherId,
) -> anyhow::Result<bool> {
    let Some(user_name) = principal.name() else {
        return Ok(false);
    };

    if principal.has_role(Role::Administrator) {
        return Ok(true);
    }

    let publisher_id = users.get_publisher_id_by_user_name(user_name).await?;
    Ok(publisher_id.as_ref() == Some(owner))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::memory::InMemoryStore;
    use crate::services::NewPublisher;
    use kniga_authz::RoleSet;
    use kniga_kernel::settings::{SeedSettings, UserSeed};

    fn user_seed(name: &str, roles: &[&str], publisher: Option<&str>) -> UserSeed {
        UserSeed {
            name: name.to_string(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
            publisher: publisher.map(str::to_string),
        }
    }

    async fn directory() -> (InMemoryStore, PublisherId) {
        let store = InMemoryStore::seeded(&SeedSettings {
            users: vec![
                user_seed("admin", &["administrator"], None),
                user_seed("ciela", &[], Some("Ciela")),
                user_seed("janet", &[], Some("Janet 45")),
                user_seed("reader", &[], None),
            ],
            ..SeedSettings::default()
        })
        .unwrap();
        let owner = store
            .get_publisher_id_by_user_name("ciela")
            .await
            .unwrap()
            .unwrap();
        (store, owner)
    }

    async fn principal_for(store: &InMemoryStore, name: &str) -> Principal {
        let roles = store
            .find_user(name)
            .await
            .unwrap()
            .map(|u| u.roles)
            .unwrap_or_else(RoleSet::new);
        Principal::user(name, roles)
    }

    #[tokio::test]
    async fn anonymous_callers_cannot_edit() {
        let (store, owner) = directory().await;
        assert!(!can_edit_book(&Principal::Anonymous, &store, &owner)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn administrators_edit_any_book() {
        let (store, owner) = directory().await;
        let admin = principal_for(&store, "admin").await;
        assert!(can_edit_book(&admin, &store, &owner).await.unwrap());
        assert!(can_edit_book(&admin, &store, &PublisherId::from("someone-else"))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn publishers_edit_only_their_own_books() {
        let (store, owner) = directory().await;
        let ciela = principal_for(&store, "ciela").await;
        let janet = principal_for(&store, "janet").await;
        let reader = principal_for(&store, "reader").await;

        assert!(can_edit_book(&ciela, &store, &owner).await.unwrap());
        assert!(!can_edit_book(&janet, &store, &owner).await.unwrap());
        assert!(!can_edit_book(&reader, &store, &owner).await.unwrap());
    }

    #[tokio::test]
    async fn newly_provisioned_publishers_own_nothing_yet() {
        let (store, owner) = directory().await;
        store
            .create_publisher(NewPublisher {
                name: "Reader Press".to_string(),
                user_name: "reader".to_string(),
            })
            .await
            .unwrap()
            .unwrap();

        let reader = principal_for(&store, "reader").await;
        assert!(reader.has_role(Role::Publisher));
        assert!(!can_edit_book(&reader, &store, &owner).await.unwrap());
    }
}
