//! Customer accounts.

use super::Store;
use crate::customer::{normalize_username, CustomerAccount};
use crate::ids::UserId;
use crate::CommerceError;
use hearth_db::{params, Row};

impl Store {
    /// Insert a new account. Taken usernames or emails are a conflict.
    pub async fn insert_customer(&self, account: &CustomerAccount) -> Result<(), CommerceError> {
        self.db
            .execute(
                "INSERT INTO customers (id, username, email, password_hash, created_at) VALUES (?, ?, ?, ?, ?)",
                params![
                    account.id.as_str(),
                    &account.username,
                    &account.email,
                    &account.password_hash,
                    account.created_at
                ],
            )
            .await
            .map_err(|e| {
                if e.is_unique_violation() {
                    CommerceError::Conflict("Username or email is already registered".into())
                } else {
                    e.into()
                }
            })?;
        tracing::info!(user_id = %account.id, "customer registered");
        Ok(())
    }

    /// Find an account by username or email.
    pub async fn customer_by_login(&self, login: &str) -> Result<Option<CustomerAccount>, CommerceError> {
        let login = normalize_username(login);
        let row = self
            .db
            .query_row(
                "SELECT * FROM customers WHERE username = ? OR email = ? LIMIT 1",
                params![&login, &login],
            )
            .await?;
        row.as_ref().map(customer_from_row).transpose()
    }

    pub async fn get_customer(&self, id: &UserId) -> Result<CustomerAccount, CommerceError> {
        let row = self
            .db
            .query_row("SELECT * FROM customers WHERE id = ?", params![id.as_str()])
            .await?
            .ok_or_else(|| CommerceError::not_found("Customer", id.as_str()))?;
        customer_from_row(&row)
    }
}

fn customer_from_row(row: &Row) -> Result<CustomerAccount, CommerceError> {
    Ok(CustomerAccount {
        id: UserId::new(row.text("id")?),
        username: row.text("username")?,
        email: row.text("email")?,
        password_hash: row.text("password_hash")?,
        created_at: row.integer("created_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_register_and_lookup() {
        let store = Store::in_memory().await.unwrap();
        let account = CustomerAccount::new("asha", "asha@example.com", "hash").unwrap();
        store.insert_customer(&account).await.unwrap();

        let by_name = store.customer_by_login("ASHA").await.unwrap().unwrap();
        assert_eq!(by_name.id, account.id);
        assert_eq!(by_name.password_hash, "hash");
        let by_email = store.customer_by_login("Asha@Example.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, account.id);
        assert!(store.customer_by_login("nobody").await.unwrap().is_none());

        let dup = CustomerAccount::new("asha", "other@example.com", "hash").unwrap();
        assert!(matches!(
            store.insert_customer(&dup).await,
            Err(CommerceError::Conflict(_))
        ));
    }
}
