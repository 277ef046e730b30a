//! Business logic services

pub mod audit;
pub mod books;
pub mod email;
pub mod storage;
pub mod users;

use crate::{
    config::{AuthConfig, EmailConfig, ServerConfig, StorageConfig},
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub books: books::BooksService,
    pub users: users::UsersService,
    pub audit: audit::AuditService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(
        repository: Repository,
        auth_config: AuthConfig,
        email_config: EmailConfig,
        storage_config: StorageConfig,
        server_config: &ServerConfig,
    ) -> Self {
        let email = email::EmailService::new(email_config);
        let storage = storage::StorageService::new(&storage_config);
        let audit = audit::AuditService::new(repository.clone());

        Self {
            books: books::BooksService::new(repository.clone(), audit.clone(), storage),
            users: users::UsersService::new(
                repository.clone(),
                auth_config,
                email,
                server_config.public_url.clone(),
            ),
            audit,
        }
    }
}
