//! In-memory [`AdminBackend`] for router tests.

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bazaar_core::models::{Category, NewCategory, Profile, Report};
use bazaar_core::{
    CategoryId, Price, ProductId, ProductStatus, ReportId, ReportStatus, UserId, UserStatus,
};
use bazaar_supabase::SupabaseError;
use chrono::{DateTime, Utc};
use secrecy::SecretString;

use crate::backend::{AdminBackend, AdminProduct, ProductRecord};
use crate::config::AdminConfig;
use crate::state::AppState;

pub const ADMIN_TOKEN: &str = "admin-token";
pub const USER_TOKEN: &str = "user-token";

#[derive(Default)]
pub struct FakeBackend {
    pub tokens: HashMap<String, UserId>,
    pub admins: Vec<UserId>,
    pub failing: bool,
    pub profiles: Mutex<Vec<Profile>>,
    pub products: Mutex<Vec<AdminProduct>>,
    pub reports: Mutex<Vec<Report>>,
    pub categories: Mutex<Vec<Category>>,
}

impl FakeBackend {
    /// One admin and one regular user, each with a token.
    pub fn with_users() -> (Self, UserId, UserId) {
        let admin = UserId::random();
        let user = UserId::random();
        let backend = Self {
            tokens: HashMap::from([
                (ADMIN_TOKEN.to_string(), admin),
                (USER_TOKEN.to_string(), user),
            ]),
            admins: vec![admin],
            profiles: Mutex::new(vec![profile(admin), profile(user)]),
            ..Self::default()
        };
        (backend, admin, user)
    }

    pub fn add_product(&self, seller_id: UserId) -> ProductId {
        let id = ProductId::random();
        self.products.lock().unwrap().push(AdminProduct {
            id,
            seller_id,
            title: "Велосипед".to_string(),
            price: Price::rubles(15_000),
            status: ProductStatus::Active,
            category: Some("Спорт".to_string()),
            images: vec![],
            created_at: Utc::now(),
            seller: None,
        });
        id
    }

    pub fn product_status(&self, id: ProductId) -> Option<ProductStatus> {
        self.products
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.status)
    }

    pub fn into_state(self) -> AppState {
        AppState::with_backend(config(), Arc::new(self))
    }

    fn check(&self) -> Result<(), SupabaseError> {
        if self.failing {
            Err(SupabaseError::Api {
                status: 500,
                code: None,
                message: "connection reset".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

/// The stored row behind a console listing, with the columns the console
/// does not show.
fn record(product: &AdminProduct) -> ProductRecord {
    let mut row = serde_json::to_value(product).unwrap();
    let columns = row.as_object_mut().unwrap();
    columns.remove("seller");
    columns.insert("description".to_string(), "Почти новый".into());
    columns.insert("category_id".to_string(), CategoryId::random().to_string().into());
    serde_json::from_value(row).unwrap()
}

pub fn profile(id: UserId) -> Profile {
    Profile {
        id,
        name: Some("Иван".to_string()),
        avatar_url: None,
        bio: None,
        location: None,
        status: UserStatus::Active,
        is_admin: false,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        avg_rating: None,
        total_ratings: None,
    }
}

pub fn config() -> AdminConfig {
    AdminConfig {
        host: "127.0.0.1".parse().unwrap(),
        port: 3001,
        supabase_url: "http://localhost:54321".to_string(),
        service_role_key: SecretString::from("test-service-role-key"),
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

#[async_trait]
impl AdminBackend for FakeBackend {
    async fn user_for_token(&self, access_token: &str) -> Result<Option<UserId>, SupabaseError> {
        Ok(self.tokens.get(access_token).copied())
    }

    async fn is_admin(&self, user_id: UserId) -> Result<bool, SupabaseError> {
        Ok(self.admins.contains(&user_id))
    }

    async fn users(&self) -> Result<Vec<Profile>, SupabaseError> {
        self.check()?;
        Ok(self.profiles.lock().unwrap().clone())
    }

    async fn products(&self) -> Result<Vec<AdminProduct>, SupabaseError> {
        self.check()?;
        Ok(self.products.lock().unwrap().clone())
    }

    async fn reports(&self) -> Result<Vec<Report>, SupabaseError> {
        self.check()?;
        Ok(self.reports.lock().unwrap().clone())
    }

    async fn categories(&self) -> Result<Vec<Category>, SupabaseError> {
        self.check()?;
        Ok(self.categories.lock().unwrap().clone())
    }

    async fn set_user_status(
        &self,
        user_id: UserId,
        status: UserStatus,
    ) -> Result<Option<Profile>, SupabaseError> {
        self.check()?;
        let mut profiles = self.profiles.lock().unwrap();
        Ok(profiles.iter_mut().find(|p| p.id == user_id).map(|p| {
            p.status = status;
            p.clone()
        }))
    }

    async fn set_admin(
        &self,
        user_id: UserId,
        is_admin: bool,
    ) -> Result<Option<Profile>, SupabaseError> {
        self.check()?;
        let mut profiles = self.profiles.lock().unwrap();
        Ok(profiles.iter_mut().find(|p| p.id == user_id).map(|p| {
            p.is_admin = is_admin;
            p.clone()
        }))
    }

    async fn set_product_status(
        &self,
        product_id: ProductId,
        status: ProductStatus,
    ) -> Result<Option<ProductRecord>, SupabaseError> {
        self.check()?;
        let mut products = self.products.lock().unwrap();
        Ok(products.iter_mut().find(|p| p.id == product_id).map(|p| {
            p.status = status;
            record(p)
        }))
    }

    async fn set_report_status(
        &self,
        report_id: ReportId,
        status: ReportStatus,
        resolved_at: Option<DateTime<Utc>>,
    ) -> Result<Option<Report>, SupabaseError> {
        self.check()?;
        let mut reports = self.reports.lock().unwrap();
        Ok(reports.iter_mut().find(|r| r.id == report_id).map(|r| {
            r.status = status;
            r.resolved_at = resolved_at;
            r.clone()
        }))
    }

    async fn create_category(&self, category: &NewCategory) -> Result<Category, SupabaseError> {
        self.check()?;
        let mut categories = self.categories.lock().unwrap();
        if categories.iter().any(|c| c.slug == category.slug) {
            return Err(SupabaseError::Api {
                status: 409,
                code: Some("23505".to_string()),
                message: "duplicate key value violates unique constraint".to_string(),
            });
        }
        let created = Category {
            id: CategoryId::random(),
            name: category.name.clone(),
            slug: category.slug.clone(),
            description: category.description.clone(),
            product_count: None,
        };
        categories.push(created.clone());
        Ok(created)
    }

    async fn update_category(
        &self,
        id: CategoryId,
        category: &NewCategory,
    ) -> Result<Option<Category>, SupabaseError> {
        self.check()?;
        let mut categories = self.categories.lock().unwrap();
        Ok(categories.iter_mut().find(|c| c.id == id).map(|c| {
            c.name.clone_from(&category.name);
            c.slug.clone_from(&category.slug);
            c.description.clone_from(&category.description);
            c.clone()
        }))
    }

    async fn delete_category(&self, id: CategoryId) -> Result<(), SupabaseError> {
        self.check()?;
        self.categories.lock().unwrap().retain(|c| c.id != id);
        Ok(())
    }
}
