use std::path::Path;

use anyhow::Result;
use orderdesk_core::UserId;
use orderdesk_core::store::{AddOutcome, AdminStore, RemoveOutcome};

pub async fn list_admins(path: &Path) -> Result<()> {
    let store = AdminStore::open(path).await?;
    let admins = store.list().await;
    if admins.is_empty() {
        println!("No admins in {}", path.display());
    }
    for id in admins {
        println!("{}", id);
    }
    Ok(())
}

pub async fn add_admin(path: &Path, id: UserId) -> Result<()> {
    let store = AdminStore::open(path).await?;
    match store.add(id).await? {
        AddOutcome::Added => println!("✅ Added {} to {}", id, path.display()),
        AddOutcome::AlreadyPresent => println!("{} is already an admin", id),
    }
    Ok(())
}

pub async fn remove_admin(path: &Path, id: UserId) -> Result<()> {
    let store = AdminStore::open(path).await?;
    match store.remove(id).await? {
        RemoveOutcome::Removed { remaining } => {
            println!("✅ Removed {} ({} left)", id, remaining);
            if remaining == 0 {
                println!("⚠️  The admin list is empty, orders will not be delivered");
            }
        }
        RemoveOutcome::NotPresent => println!("{} is not an admin", id),
    }
    Ok(())
}
