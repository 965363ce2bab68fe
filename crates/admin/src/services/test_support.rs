//! In-memory stores for service and handler tests.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicI32, Ordering};

use chrono::Utc;
use open_bar_core::{AdminRole, AdminUserId, Cpf, Drink, DrinkDraft, DrinkId, Email};

use super::auth;
use crate::db::{AdminDirectory, DrinkCatalog, RepositoryError};
use crate::models::{AdminUser, AdminUserChanges, NewAdminUser};

/// A valid CPF derived from `seed`.
pub fn cpf_for(seed: i32) -> Cpf {
    let base = format!("{:09}", 123_456_000 + seed * 97);
    let mut digits: Vec<u32> = base.chars().filter_map(|c| c.to_digit(10)).collect();
    for len in [9_u32, 10] {
        let sum: u32 = digits
            .iter()
            .zip((2..=len + 1).rev())
            .map(|(d, w)| d * w)
            .sum();
        let check = (sum * 10) % 11;
        digits.push(if check == 10 { 0 } else { check });
    }
    let raw: String = digits.iter().map(u32::to_string).collect();
    Cpf::parse(&raw).unwrap()
}

#[derive(Default)]
pub struct InMemoryDirectory {
    admins: Mutex<Vec<(AdminUser, String)>>,
    next_id: AtomicI32,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an admin with a hashed `password`.
    pub fn seed(&self, email: &str, role: AdminRole, password: &str) -> AdminUser {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let now = Utc::now();
        let admin = AdminUser {
            id: AdminUserId::new(id),
            full_name: format!("Admin {id}"),
            cpf: cpf_for(id),
            email: Email::parse(email).unwrap(),
            role,
            created_at: now,
            updated_at: now,
        };
        let hash = auth::hash_password(password).unwrap();
        self.admins.lock().unwrap().push((admin.clone(), hash));
        admin
    }

    pub fn get(&self, id: AdminUserId) -> Option<AdminUser> {
        self.admins
            .lock()
            .unwrap()
            .iter()
            .find(|(a, _)| a.id == id)
            .map(|(a, _)| a.clone())
    }

    fn check_unique(
        admins: &[(AdminUser, String)],
        except: Option<AdminUserId>,
        cpf: Option<&Cpf>,
        email: Option<&Email>,
    ) -> Result<(), RepositoryError> {
        for (admin, _) in admins.iter().filter(|(a, _)| Some(a.id) != except) {
            if cpf == Some(&admin.cpf) {
                return Err(RepositoryError::Conflict("CPF já cadastrado".to_owned()));
            }
            if email == Some(&admin.email) {
                return Err(RepositoryError::Conflict("Email já cadastrado".to_owned()));
            }
        }
        Ok(())
    }
}

impl AdminDirectory for InMemoryDirectory {
    async fn find(&self, id: AdminUserId) -> Result<Option<AdminUser>, RepositoryError> {
        Ok(self.get(id))
    }

    async fn find_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<(AdminUser, String)>, RepositoryError> {
        Ok(self
            .admins
            .lock()
            .unwrap()
            .iter()
            .find(|(a, _)| &a.email == email)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<AdminUser>, RepositoryError> {
        Ok(self
            .admins
            .lock()
            .unwrap()
            .iter()
            .rev()
            .map(|(a, _)| a.clone())
            .collect())
    }

    async fn create(&self, new_admin: &NewAdminUser) -> Result<AdminUser, RepositoryError> {
        let mut admins = self.admins.lock().unwrap();
        Self::check_unique(&admins, None, Some(&new_admin.cpf), Some(&new_admin.email))?;

        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let now = Utc::now();
        let admin = AdminUser {
            id: AdminUserId::new(id),
            full_name: new_admin.full_name.clone(),
            cpf: new_admin.cpf.clone(),
            email: new_admin.email.clone(),
            role: new_admin.role,
            created_at: now,
            updated_at: now,
        };
        admins.push((admin.clone(), new_admin.password_hash.clone()));
        Ok(admin)
    }

    async fn update(
        &self,
        id: AdminUserId,
        changes: &AdminUserChanges,
    ) -> Result<Option<AdminUser>, RepositoryError> {
        let mut admins = self.admins.lock().unwrap();
        Self::check_unique(&admins, Some(id), changes.cpf.as_ref(), changes.email.as_ref())?;

        let Some((admin, hash)) = admins.iter_mut().find(|(a, _)| a.id == id) else {
            return Ok(None);
        };
        changes.apply(admin);
        admin.updated_at = Utc::now();
        if let Some(new_hash) = &changes.password_hash {
            hash.clone_from(new_hash);
        }
        Ok(Some(admin.clone()))
    }

    async fn delete(&self, id: AdminUserId) -> Result<bool, RepositoryError> {
        let mut admins = self.admins.lock().unwrap();
        let before = admins.len();
        admins.retain(|(a, _)| a.id != id);
        Ok(admins.len() < before)
    }
}

#[derive(Default)]
pub struct InMemoryCatalog {
    drinks: Mutex<BTreeMap<String, Drink>>,
}

impl InMemoryCatalog {
    pub fn len(&self) -> usize {
        self.drinks.lock().unwrap().len()
    }
}

impl DrinkCatalog for InMemoryCatalog {
    async fn list(&self) -> Result<Vec<Drink>, RepositoryError> {
        let mut drinks: Vec<Drink> = self.drinks.lock().unwrap().values().cloned().collect();
        drinks.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(drinks)
    }

    async fn create(&self, drink: &Drink) -> Result<Drink, RepositoryError> {
        let mut drinks = self.drinks.lock().unwrap();
        if drinks.contains_key(drink.id.as_str()) {
            return Err(RepositoryError::Conflict(format!(
                "Já existe um drink com id {}",
                drink.id
            )));
        }
        drinks.insert(drink.id.as_str().to_owned(), drink.clone());
        Ok(drink.clone())
    }

    async fn update(
        &self,
        id: &DrinkId,
        draft: &DrinkDraft,
    ) -> Result<Option<Drink>, RepositoryError> {
        let mut drinks = self.drinks.lock().unwrap();
        let Some(slot) = drinks.get_mut(id.as_str()) else {
            return Ok(None);
        };
        *slot = Drink::from_draft(id.clone(), draft.clone());
        Ok(Some(slot.clone()))
    }

    async fn delete(&self, id: &DrinkId) -> Result<bool, RepositoryError> {
        Ok(self.drinks.lock().unwrap().remove(id.as_str()).is_some())
    }
}

#[test]
fn test_generated_cpfs_are_valid_and_distinct() {
    assert_ne!(cpf_for(1), cpf_for(2));
    for seed in 0..50 {
        let _ = cpf_for(seed);
    }
}
